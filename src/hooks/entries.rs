//! Script entry operations — add, edit, delete, list.
//!
//! Built on the activation engine: entries are only ever created or removed
//! through the engine's resolved container paths, and removing the last
//! entry of a hook hands the orphaned entry point back to the engine for
//! cleanup. Interactive concerns (the overwrite prompt, the editor) are
//! injected as closures so this layer stays promptless.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{HookError, Result};
use crate::fsops;

use super::engine::{EnableOutcome, Engine, HookState};
use super::resolve::{resolve, Placement};

// ---------------------------------------------------------------------------
// Entry name validation
// ---------------------------------------------------------------------------

/// Reject names that would escape the container or collide with
/// housekeeping filtering. Runs before any filesystem write.
pub fn validate_entry_name(name: &str) -> Result<()> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || fsops::HOUSEKEEPING.contains(&name);
    if bad {
        return Err(HookError::Other(format!("invalid script name '{name}'")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// add
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq)]
pub enum AddOutcome {
    Created(PathBuf),
    Overwritten(PathBuf),
    /// An entry of that name existed and the decision source said no.
    Declined,
}

/// Register a new script entry. Auto-enables the placement (no
/// `check_first` guard), so the container always exists afterwards. An
/// existing entry is only overwritten when `decide` says yes.
pub fn add(
    engine: &Engine<'_>,
    hook: &str,
    file: &str,
    placement: Placement,
    decide: &mut dyn FnMut(&str) -> bool,
) -> Result<AddOutcome> {
    engine.registry().validate(hook)?;
    validate_entry_name(file)?;

    let outcomes = engine.enable(hook, &[placement], false)?;
    let container = match &outcomes[0].1 {
        EnableOutcome::Enabled { container } => container.clone(),
        EnableOutcome::Unavailable => return Err(HookError::InvalidPlacement),
        // unreachable without check_first, but keep the match total
        EnableOutcome::Skipped => return Err(HookError::InvalidPlacement),
    };

    let path = container.join(file);
    if fs::symlink_metadata(&path).is_ok() {
        let prompt = format!("{placement} script '{file}' already exists for {hook} — overwrite?");
        if !decide(&prompt) {
            return Ok(AddOutcome::Declined);
        }
        fsops::create_executable(&path)?;
        return Ok(AddOutcome::Overwritten(path));
    }

    fsops::create_executable(&path)?;
    Ok(AddOutcome::Created(path))
}

// ---------------------------------------------------------------------------
// edit
// ---------------------------------------------------------------------------

/// Open an existing entry with the caller-supplied edit action.
///
/// The placement must already show evidence of use (`check_first` enable);
/// a missing file either fails with `ScriptNotFound` — suggestions drawn
/// from the container's executable entries — or, with `allow_create`, is
/// first registered via [`add`].
pub fn edit(
    engine: &Engine<'_>,
    hook: &str,
    file: &str,
    placement: Placement,
    allow_create: bool,
    decide: &mut dyn FnMut(&str) -> bool,
    edit_action: &mut dyn FnMut(&Path) -> Result<()>,
) -> Result<PathBuf> {
    engine.registry().validate(hook)?;
    validate_entry_name(file)?;

    let loc = match resolve(engine.layout(), hook, placement) {
        Some(loc) => loc,
        None => return Err(HookError::InvalidPlacement),
    };
    engine.enable(hook, &[placement], true)?;

    let path = loc.container.join(file);
    if fs::symlink_metadata(&path).is_err() {
        if !allow_create {
            return Err(HookError::ScriptNotFound {
                name: file.to_string(),
                suggestions: fsops::executable_entries(&loc.container)?,
            });
        }
        add(engine, hook, file, placement, decide)?;
    }

    edit_action(&path)?;
    Ok(path)
}

// ---------------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// The emptied container was removed.
    pub container_removed: bool,
    /// The orphaned entry point was unwired as well.
    pub disabled: bool,
}

/// Remove a script entry. Removing the last entry removes the container
/// and prunes the hook's entry point if no other placement still has
/// scripts.
pub fn delete(
    engine: &Engine<'_>,
    hook: &str,
    file: &str,
    placement: Placement,
) -> Result<DeleteOutcome> {
    engine.registry().validate(hook)?;
    validate_entry_name(file)?;

    let loc = match resolve(engine.layout(), hook, placement) {
        Some(loc) => loc,
        None => return Err(HookError::InvalidPlacement),
    };

    let path = loc.container.join(file);
    if fs::symlink_metadata(&path).is_err() {
        return Err(HookError::ScriptNotFound {
            name: file.to_string(),
            suggestions: fsops::executable_entries(&loc.container)?,
        });
    }
    fs::remove_file(&path)?;

    let mut outcome = DeleteOutcome::default();
    if !fsops::has_entries(&loc.container) {
        fs::remove_dir_all(&loc.container)?;
        outcome.container_removed = true;
        outcome.disabled = engine.disable(hook, true)?;
    }
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

/// Read-only report of one hook: its state and the scripts the dispatcher
/// would run per placement.
#[derive(Debug, Serialize)]
pub struct HookReport {
    pub hook: String,
    pub state: HookState,
    pub local: Vec<String>,
    pub tracked: Vec<String>,
}

impl HookReport {
    /// Whether there is anything to show: a managed state or any scripts.
    pub fn is_interesting(&self) -> bool {
        self.state != HookState::Uninitialized || !self.local.is_empty() || !self.tracked.is_empty()
    }
}

/// List one hook, or every hook in registry order.
pub fn list(engine: &Engine<'_>, hook: Option<&str>) -> Result<Vec<HookReport>> {
    let names: Vec<&str> = match hook {
        Some(name) => vec![engine.registry().validate(name)?],
        None => engine.registry().names().collect(),
    };

    let mut reports = Vec::with_capacity(names.len());
    for name in names {
        let local = fsops::executable_entries(&engine.layout().local_container(name))?;
        let tracked = match engine.layout().tracked_container(name) {
            Some(container) => fsops::executable_entries(&container)?,
            None => Vec::new(),
        };
        reports.push(HookReport {
            hook: name.to_string(),
            state: engine.state(name)?,
            local,
            tracked,
        });
    }
    Ok(reports)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
