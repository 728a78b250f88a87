//! Structure lifecycle — init, destroy, status.
//!
//! `init` and `destroy` are bulk orchestration over every hook name in the
//! registry; both aggregate per-hook results into a report instead of
//! aborting halfway, so a single odd hook never leaves the rest of the
//! repository untouched.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::fsops;
use crate::repo::Layout;

use super::dispatch;
use super::engine::{EnableOutcome, Engine};
use super::entries::{self, HookReport};
use super::resolve::Placement;

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

/// What `init` did to the tracked-share link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackedLinkAction {
    /// No tracked root configured.
    NotConfigured,
    /// Link already pointed at the tracked root.
    Unchanged,
    Created,
    /// A link pointing elsewhere was replaced (stale links get no backup).
    Replaced,
    /// A non-link occupied the path and was renamed aside first.
    BackedUp { backup: PathBuf },
}

#[derive(Debug, Serialize)]
pub struct InitReport {
    /// The dispatcher artifact was written or rewritten.
    pub dispatcher_written: bool,
    pub tracked_link: TrackedLinkAction,
    /// Hooks wired by this run (and still wired after pruning).
    pub enabled: Vec<String>,
    /// Hooks whose orphaned entry point was removed.
    pub pruned: Vec<String>,
}

/// Initialize (or repair) the hook structure.
///
/// Regenerates the dispatcher, establishes the tracked link, then makes two
/// passes over every hook name: `enable` with the evidence guard to pick up
/// hooks with prior use, `disable` with the orphan guard to prune hooks
/// with no scripts left. The two passes together re-enable hooks that
/// regained scripts through the tracked share and clean up hooks that lost
/// their last script.
pub fn init(engine: &Engine<'_>) -> Result<InitReport> {
    let layout = engine.layout();

    let dispatcher_written = dispatch::generate(layout)?;
    let tracked_link = establish_tracked_link(layout)?;

    let mut enabled = Vec::new();
    let mut pruned = Vec::new();
    for hook in engine.registry().names() {
        let outcomes = engine.enable(hook, &Placement::ALL, true)?;
        let wired = outcomes
            .iter()
            .any(|(_, o)| matches!(o, EnableOutcome::Enabled { .. }));

        if engine.disable(hook, true)? {
            pruned.push(hook.to_string());
        } else if wired {
            enabled.push(hook.to_string());
        }
    }

    Ok(InitReport {
        dispatcher_written,
        tracked_link,
        enabled,
        pruned,
    })
}

/// Establish or repair the symlink from the hooks directory to the tracked
/// root. Three repair cases: absent → create; occupied by a non-link →
/// rename aside, then create; a link pointing elsewhere → replace.
fn establish_tracked_link(layout: &Layout) -> Result<TrackedLinkAction> {
    let root = match &layout.tracked_root {
        Some(root) => root,
        None => return Ok(TrackedLinkAction::NotConfigured),
    };
    fs::create_dir_all(root)?;

    let link = layout.tracked_link();
    let target = fsops::relative_from(&layout.hooks_root, root);

    let action = match fs::symlink_metadata(&link) {
        Err(_) => {
            std::os::unix::fs::symlink(&target, &link)?;
            TrackedLinkAction::Created
        }
        Ok(md) if md.file_type().is_symlink() => {
            if fs::read_link(&link)? == target {
                TrackedLinkAction::Unchanged
            } else {
                fs::remove_file(&link)?;
                std::os::unix::fs::symlink(&target, &link)?;
                TrackedLinkAction::Replaced
            }
        }
        Ok(_) => {
            let backup = layout.backup_path(&link);
            fsops::backup_rename(&link, &backup)?;
            std::os::unix::fs::symlink(&target, &link)?;
            TrackedLinkAction::BackedUp { backup }
        }
    };
    debug!(?action, link = %link.display(), "tracked link");
    Ok(action)
}

// ---------------------------------------------------------------------------
// destroy
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize)]
pub struct DestroyReport {
    /// Hooks whose dispatcher symlink was removed.
    pub unhooked: Vec<String>,
    /// Hooks whose migrated default script went back to single-file form.
    pub restored: Vec<String>,
    /// Scripts left behind per hook: still on disk, but no longer active.
    pub leftovers: Vec<(String, Vec<String>)>,
    pub tracked_link_removed: bool,
    pub tracked_backup_restored: bool,
    pub dispatcher_removed: bool,
}

/// Best-effort inverse of `init` plus accumulated `enable` calls.
///
/// For every hook wired to the dispatcher: unwire it, restore a migrated
/// default script to its original single-file location, and remove the
/// local container when that leaves it empty. Scripts under non-default
/// names are never deleted — they stay in the container and are reported
/// as leftovers for the caller to warn about. Tracked containers are
/// repository content and are never touched.
pub fn destroy(engine: &Engine<'_>) -> Result<DestroyReport> {
    let layout = engine.layout();
    let mut report = DestroyReport::default();

    for hook in engine.registry().names() {
        let entry = layout.entry_point(hook);
        if !dispatch::is_dispatcher_link(layout, &entry) {
            continue;
        }
        fs::remove_file(&entry)?;
        report.unhooked.push(hook.to_string());

        let container = layout.local_container(hook);
        let default = container.join(layout.default_entry_name(hook));
        if default.is_file() {
            // rename preserves the original mode, so an executable hook
            // comes back executable
            fs::rename(&default, &entry)?;
            report.restored.push(hook.to_string());
        }

        if container.is_dir() {
            if fsops::has_entries(&container) {
                report
                    .leftovers
                    .push((hook.to_string(), fsops::container_entries(&container)?));
            } else {
                fs::remove_dir_all(&container)?;
            }
        }
    }

    let link = layout.tracked_link();
    if fs::symlink_metadata(&link)
        .map(|md| md.file_type().is_symlink())
        .unwrap_or(false)
    {
        fs::remove_file(&link)?;
        report.tracked_link_removed = true;
    }
    let link_backup = layout.backup_path(&link);
    if fs::symlink_metadata(&link_backup).is_ok() && fs::symlink_metadata(&link).is_err() {
        fs::rename(&link_backup, &link)?;
        report.tracked_backup_restored = true;
    }

    let dispatcher = layout.dispatcher_path();
    if dispatcher.is_file() {
        fs::remove_file(&dispatcher)?;
        report.dispatcher_removed = true;
    }

    Ok(report)
}

// ---------------------------------------------------------------------------
// status
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct StatusReport {
    /// Whether the dispatcher artifact exists.
    pub initialized: bool,
    /// Tracked-link health: `None` when no tracked root is configured.
    pub tracked_link_ok: Option<bool>,
    pub hooks: Vec<HookReport>,
}

/// Read-only snapshot of the whole structure.
pub fn status(engine: &Engine<'_>) -> Result<StatusReport> {
    let layout = engine.layout();
    let tracked_link_ok = layout.tracked_root.as_ref().map(|root| {
        let expected = fsops::relative_from(&layout.hooks_root, root);
        fsops::symlink_points_to(&layout.tracked_link(), &expected)
    });

    Ok(StatusReport {
        initialized: dispatch::exists(layout),
        tracked_link_ok,
        hooks: entries::list(engine, None)?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
