use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use console::style;

use multihook::cli::{closest_hooks, edit_file, Prompter};
use multihook::config::{self, CliOverrides};
use multihook::error::{HookError, Result};
use multihook::hooks::engine::{EnableOutcome, Engine};
use multihook::hooks::entries::{self, AddOutcome, HookReport};
use multihook::hooks::lifecycle::{self, TrackedLinkAction};
use multihook::hooks::resolve::Placement;
use multihook::registry::HookRegistry;
use multihook::repo::{Layout, Repo};

#[derive(Parser)]
#[command(name = "multihook")]
#[command(version, about = "Multiplexed git hooks — many scripts per event, one dispatcher")]
struct Cli {
    /// Repository directory (default: current dir)
    #[arg(short = 'C', long = "dir", global = true, default_value = ".")]
    dir: String,

    /// Answer yes to every confirmation prompt
    #[arg(short = 'y', long = "yes", global = true)]
    yes: bool,

    /// Tracked share directory, relative to the work tree (overrides config)
    #[arg(long = "tracked-dir", global = true)]
    tracked_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up the hook structure: dispatcher, tracked link, adopt existing hooks
    Init,
    /// Tear the structure down, restoring migrated single-file hooks
    Destroy,
    /// Report structure and per-hook state
    Status {
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// List registered scripts for one hook, or all hooks
    List {
        /// Hook name (default: every hook with scripts)
        hook: Option<String>,
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Wire a hook's entry point to the dispatcher
    Enable {
        /// Hook name (e.g. pre-commit)
        hook: String,
        /// Also set up the tracked placement
        #[arg(long)]
        tracked: bool,
    },
    /// Unwire a hook's entry point (scripts are kept)
    Disable {
        /// Hook name
        hook: String,
    },
    /// Register a new script for a hook
    Add {
        /// Hook name
        hook: String,
        /// Script file name within the hook's container
        file: String,
        /// Place it in the tracked share instead of the local store
        #[arg(long)]
        tracked: bool,
    },
    /// Open a hook script in $EDITOR
    Edit {
        /// Hook name
        hook: String,
        /// Script file name
        file: String,
        /// Edit the tracked placement
        #[arg(long)]
        tracked: bool,
        /// Create the script first if it doesn't exist
        #[arg(long)]
        create: bool,
    },
    /// Delete a hook script (cleans up orphaned hooks)
    Remove {
        /// Hook name
        hook: String,
        /// Script file name
        file: String,
        /// Delete from the tracked placement
        #[arg(long)]
        tracked: bool,
    },
}

fn main() {
    multihook::logging::init_logging();
    let cli = Cli::parse();

    let repo = Repo::discover(&PathBuf::from(&cli.dir)).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });
    let overrides = CliOverrides {
        tracked_dir: cli.tracked_dir.clone(),
    };
    let config = config::load_config(Some(&repo.work_tree), &overrides);
    let layout = Layout::new(&repo, &config);
    let registry = HookRegistry::load(&layout).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });
    let engine = Engine::new(&layout, &registry);
    let prompter = Prompter::new(cli.yes);

    if let Err(e) = run(&cli.command, &engine, &prompter) {
        report_error(&e, &registry);
        process::exit(1);
    }
}

fn run(command: &Commands, engine: &Engine<'_>, prompter: &Prompter) -> Result<()> {
    match command {
        Commands::Init => cmd_init(engine),
        Commands::Destroy => cmd_destroy(engine, prompter),
        Commands::Status { json } => cmd_status(engine, *json),
        Commands::List { hook, json } => cmd_list(engine, hook.as_deref(), *json),
        Commands::Enable { hook, tracked } => cmd_enable(engine, prompter, hook, *tracked),
        Commands::Disable { hook } => cmd_disable(engine, hook),
        Commands::Add { hook, file, tracked } => {
            cmd_add(engine, prompter, hook, file, placement(*tracked))
        }
        Commands::Edit {
            hook,
            file,
            tracked,
            create,
        } => cmd_edit(engine, prompter, hook, file, placement(*tracked), *create),
        Commands::Remove { hook, file, tracked } => {
            cmd_remove(engine, prompter, hook, file, placement(*tracked))
        }
    }
}

fn placement(tracked: bool) -> Placement {
    if tracked {
        Placement::Tracked
    } else {
        Placement::Local
    }
}

/// Pretty-print an error, with close-match suggestions where they help.
fn report_error(err: &HookError, registry: &HookRegistry) {
    eprintln!("{} {err}", style("Error:").red().bold());
    match err {
        HookError::UnknownHook(name) => {
            let matches = closest_hooks(name, registry.names());
            if !matches.is_empty() {
                eprintln!("  did you mean: {}", matches.join(", "));
            }
        }
        HookError::ScriptNotFound { suggestions, .. } if !suggestions.is_empty() => {
            eprintln!("  existing scripts: {}", suggestions.join(", "));
        }
        _ => {}
    }
}

/// `StructureNotInitialized` is the one recoverable error: offer to run
/// init, then retry once.
fn with_init_remediation<T>(
    engine: &Engine<'_>,
    prompter: &Prompter,
    f: impl Fn() -> Result<T>,
) -> Result<T> {
    match f() {
        Err(HookError::StructureNotInitialized) => {
            let run_init =
                prompter.confirm("Hook structure is not initialized. Run init now?", true);
            if !run_init {
                return Err(HookError::StructureNotInitialized);
            }
            cmd_init(engine)?;
            f()
        }
        other => other,
    }
}

// ---------------------------------------------------------------------------
// CLI command implementations
// ---------------------------------------------------------------------------

fn cmd_init(engine: &Engine<'_>) -> Result<()> {
    let report = lifecycle::init(engine)?;

    if report.dispatcher_written {
        eprintln!("[multihook] Dispatcher written.");
    }
    match &report.tracked_link {
        TrackedLinkAction::NotConfigured | TrackedLinkAction::Unchanged => {}
        TrackedLinkAction::Created => eprintln!("[multihook] Tracked link created."),
        TrackedLinkAction::Replaced => eprintln!("[multihook] Stale tracked link replaced."),
        TrackedLinkAction::BackedUp { backup } => eprintln!(
            "[multihook] Tracked link path was occupied — backed up to {}",
            backup.display()
        ),
    }
    for hook in &report.enabled {
        println!("  {} {} enabled", style("✓").green(), hook);
    }
    for hook in &report.pruned {
        println!("  {} {} pruned (no scripts)", style("-").dim(), hook);
    }
    println!("{}", style("Hook structure ready.").green().bold());
    Ok(())
}

fn cmd_destroy(engine: &Engine<'_>, prompter: &Prompter) -> Result<()> {
    let go = prompter.confirm(
        "Unwire all managed hooks and remove the dispatcher?",
        false,
    );
    if !go {
        println!("Aborted.");
        return Ok(());
    }

    let report = lifecycle::destroy(engine)?;

    for hook in &report.unhooked {
        let restored = report.restored.iter().any(|h| h == hook);
        if restored {
            println!("  {} {} restored to single-file hook", style("✓").green(), hook);
        } else {
            println!("  {} {} unwired", style("✓").green(), hook);
        }
    }
    for (hook, scripts) in &report.leftovers {
        eprintln!(
            "{} {hook}: scripts no longer active (left in {hook}.d/): {}",
            style("warning:").yellow().bold(),
            scripts.join(", ")
        );
    }
    if report.tracked_link_removed {
        eprintln!("[multihook] Tracked link removed.");
    }
    if report.tracked_backup_restored {
        eprintln!("[multihook] Tracked link backup restored.");
    }
    println!("{}", style("Hook structure removed.").green().bold());
    Ok(())
}

fn cmd_status(engine: &Engine<'_>, json: bool) -> Result<()> {
    let report = lifecycle::status(engine)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).map_err(|e| HookError::Other(e.to_string()))?
        );
        return Ok(());
    }

    let init_mark = if report.initialized {
        style("initialized").green().to_string()
    } else {
        style("not initialized").red().to_string()
    };
    println!("Structure: {init_mark}");
    if let Some(ok) = report.tracked_link_ok {
        let link_mark = if ok {
            style("ok").green().to_string()
        } else {
            style("missing or stale (run init)").yellow().to_string()
        };
        println!("Tracked link: {link_mark}");
    }

    let interesting: Vec<&HookReport> =
        report.hooks.iter().filter(|h| h.is_interesting()).collect();
    if interesting.is_empty() {
        println!("No hooks managed yet.");
        return Ok(());
    }
    for hook in interesting {
        print_hook_report(hook);
    }
    Ok(())
}

fn cmd_list(engine: &Engine<'_>, hook: Option<&str>, json: bool) -> Result<()> {
    let reports = entries::list(engine, hook)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&reports).map_err(|e| HookError::Other(e.to_string()))?
        );
        return Ok(());
    }

    // a named hook prints even when empty; the overview only shows
    // hooks with something to say
    let show_all = hook.is_some();
    let mut shown = false;
    for report in &reports {
        if show_all || report.is_interesting() {
            print_hook_report(report);
            shown = true;
        }
    }
    if !shown {
        println!("No hooks managed yet.");
    }
    Ok(())
}

fn print_hook_report(report: &HookReport) {
    println!(
        "{} [{}]",
        style(&report.hook).bold(),
        serde_plain_state(report)
    );
    for script in &report.local {
        println!("    local    {script}");
    }
    for script in &report.tracked {
        println!("    tracked  {script}");
    }
}

fn serde_plain_state(report: &HookReport) -> String {
    // kebab-case to match the JSON output
    serde_json::to_value(report.state)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{:?}", report.state))
}

fn cmd_enable(engine: &Engine<'_>, prompter: &Prompter, hook: &str, tracked: bool) -> Result<()> {
    let placements: &[Placement] = if tracked {
        &[Placement::Local, Placement::Tracked]
    } else {
        &[Placement::Local]
    };

    let outcomes = with_init_remediation(engine, prompter, || {
        engine.enable(hook, placements, false)
    })?;

    for (placement, outcome) in &outcomes {
        match outcome {
            EnableOutcome::Enabled { container } => {
                println!(
                    "  {} {hook} ({placement}) → {}",
                    style("✓").green(),
                    container.display()
                );
            }
            EnableOutcome::Unavailable => {
                eprintln!(
                    "{} tracked placement unavailable — configure tracked_dir first",
                    style("warning:").yellow().bold()
                );
            }
            EnableOutcome::Skipped => {}
        }
    }
    Ok(())
}

fn cmd_disable(engine: &Engine<'_>, hook: &str) -> Result<()> {
    if engine.disable(hook, false)? {
        println!("  {} {hook} disabled (scripts kept)", style("✓").green());
    } else {
        println!("{hook} is not wired to the dispatcher — nothing to do.");
    }
    Ok(())
}

fn cmd_add(
    engine: &Engine<'_>,
    prompter: &Prompter,
    hook: &str,
    file: &str,
    placement: Placement,
) -> Result<()> {
    let outcome = with_init_remediation(engine, prompter, || {
        entries::add(engine, hook, file, placement, &mut prompter.as_decider())
    })?;

    match outcome {
        AddOutcome::Created(path) => {
            println!("  {} created {}", style("✓").green(), path.display());
            println!("Edit it with: multihook edit {hook} {file}");
        }
        AddOutcome::Overwritten(path) => {
            println!("  {} reset {}", style("✓").green(), path.display());
        }
        AddOutcome::Declined => println!("Aborted."),
    }
    Ok(())
}

fn cmd_edit(
    engine: &Engine<'_>,
    prompter: &Prompter,
    hook: &str,
    file: &str,
    placement: Placement,
    create: bool,
) -> Result<()> {
    let path = with_init_remediation(engine, prompter, || {
        entries::edit(
            engine,
            hook,
            file,
            placement,
            create,
            &mut prompter.as_decider(),
            &mut |p: &std::path::Path| edit_file(p),
        )
    })?;
    eprintln!("[multihook] Edited {}", path.display());
    Ok(())
}

fn cmd_remove(
    engine: &Engine<'_>,
    prompter: &Prompter,
    hook: &str,
    file: &str,
    placement: Placement,
) -> Result<()> {
    let outcome = with_init_remediation(engine, prompter, || {
        entries::delete(engine, hook, file, placement)
    })?;

    println!("  {} removed {file}", style("✓").green());
    if outcome.container_removed {
        eprintln!("[multihook] Container emptied and removed.");
    }
    if outcome.disabled {
        eprintln!("[multihook] {hook} had no scripts left — entry point unwired.");
    }
    Ok(())
}
