//! Hook activation engine — the state transitions behind every other
//! operation.
//!
//! The filesystem is the persisted representation of a small state machine
//! per hook: the entry point is absent, a legacy single-file hook, or a
//! symlink to the dispatcher, and each placement's container directory
//! exists or not. This module is the only writer of entry points and
//! container existence; script entries themselves belong to
//! [`super::entries`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{HookError, Result};
use crate::fsops;
use crate::registry::HookRegistry;
use crate::repo::Layout;

use super::dispatch;
use super::resolve::{resolve, Location, Placement};

// ---------------------------------------------------------------------------
// States and outcomes
// ---------------------------------------------------------------------------

/// Observable state of one hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookState {
    /// Nothing managed: entry point absent or a plain legacy hook, no
    /// containers.
    Uninitialized,
    /// Containers exist but the entry point is not wired to the dispatcher.
    DisabledClean,
    EnabledLocal,
    EnabledTracked,
    EnabledBoth,
}

impl HookState {
    pub fn is_enabled(&self) -> bool {
        matches!(
            self,
            HookState::EnabledLocal | HookState::EnabledTracked | HookState::EnabledBoth
        )
    }
}

/// Per-placement result of an `enable` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnableOutcome {
    /// Placement wired; the resolved container path for caller use.
    Enabled { container: PathBuf },
    /// `check_first` was set and no evidence of prior use was found.
    Skipped,
    /// Tracked placement with no tracked root configured.
    Unavailable,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The activation engine for one repository layout.
pub struct Engine<'a> {
    layout: &'a Layout,
    registry: &'a HookRegistry,
}

impl<'a> Engine<'a> {
    pub fn new(layout: &'a Layout, registry: &'a HookRegistry) -> Self {
        Self { layout, registry }
    }

    pub fn layout(&self) -> &Layout {
        self.layout
    }

    pub fn registry(&self) -> &HookRegistry {
        self.registry
    }

    /// Whether the hook's entry point is currently wired to the dispatcher.
    pub fn is_enabled(&self, hook: &str) -> bool {
        dispatch::is_dispatcher_link(self.layout, &self.layout.entry_point(hook))
    }

    /// Derive the hook's state from the filesystem.
    pub fn state(&self, hook: &str) -> Result<HookState> {
        self.registry.validate(hook)?;

        let local = self.layout.local_container(hook).is_dir();
        let tracked = self
            .layout
            .tracked_container(hook)
            .map(|c| c.is_dir())
            .unwrap_or(false);

        if self.is_enabled(hook) {
            return Ok(match (local, tracked) {
                (true, true) => HookState::EnabledBoth,
                (false, true) => HookState::EnabledTracked,
                // an orphaned entry point reads as an empty local enable
                _ => HookState::EnabledLocal,
            });
        }

        if local || tracked {
            Ok(HookState::DisabledClean)
        } else {
            Ok(HookState::Uninitialized)
        }
    }

    /// Enable a hook for the requested placements.
    ///
    /// With `check_first`, a placement is only wired when evidence of prior
    /// use exists: a legacy single-file hook at the entry point for Local,
    /// a pre-existing tracked container for Tracked. Without it, the
    /// placement is always set up.
    ///
    /// Idempotent: repeating a call changes nothing and reports the same
    /// outcomes. Validation happens before any write.
    pub fn enable(
        &self,
        hook: &str,
        placements: &[Placement],
        check_first: bool,
    ) -> Result<Vec<(Placement, EnableOutcome)>> {
        self.registry.validate(hook)?;
        if !dispatch::exists(self.layout) {
            return Err(HookError::StructureNotInitialized);
        }

        let mut outcomes = Vec::with_capacity(placements.len());
        for &placement in placements {
            let outcome = self.enable_one(hook, placement, check_first)?;
            outcomes.push((placement, outcome));
        }
        Ok(outcomes)
    }

    fn enable_one(
        &self,
        hook: &str,
        placement: Placement,
        check_first: bool,
    ) -> Result<EnableOutcome> {
        let loc = match resolve(self.layout, hook, placement) {
            Some(loc) => loc,
            None => return Ok(EnableOutcome::Unavailable),
        };

        if check_first && !self.evidence(hook, placement, &loc) {
            return Ok(EnableOutcome::Skipped);
        }

        self.ensure_container(&loc.container)?;
        self.migrate_legacy(hook)?;
        fsops::symlink_force(&dispatch::link_target(self.layout), &loc.entry_point)?;
        debug!(hook, placement = %placement, "enabled");

        Ok(EnableOutcome::Enabled {
            container: loc.container,
        })
    }

    /// Evidence of prior use, for the `check_first` guard.
    fn evidence(&self, hook: &str, placement: Placement, loc: &Location) -> bool {
        match placement {
            Placement::Local => self.has_legacy_file(hook),
            Placement::Tracked => loc.exists,
        }
    }

    /// A legacy hook is anything occupying the entry point that is not our
    /// dispatcher symlink.
    fn has_legacy_file(&self, hook: &str) -> bool {
        let entry = self.layout.entry_point(hook);
        fs::symlink_metadata(&entry).is_ok() && !dispatch::is_dispatcher_link(self.layout, &entry)
    }

    /// Make sure the container directory exists; a non-directory occupying
    /// its path is renamed aside first, never destroyed.
    fn ensure_container(&self, container: &Path) -> Result<()> {
        if let Ok(md) = fs::symlink_metadata(container) {
            if !md.is_dir() {
                let backup = self.layout.backup_path(container);
                debug!(path = %container.display(), backup = %backup.display(),
                    "non-directory occupies container path, renaming aside");
                fsops::backup_rename(container, &backup)?;
            }
        }
        fs::create_dir_all(container)?;
        Ok(())
    }

    /// Move a legacy single-file hook into the local container under the
    /// reserved default name, freeing the entry point for the dispatcher
    /// symlink. Migration always targets the local container — publishing a
    /// private hook into the tracked share would leak it to every clone.
    fn migrate_legacy(&self, hook: &str) -> Result<bool> {
        if !self.has_legacy_file(hook) {
            return Ok(false);
        }
        let entry = self.layout.entry_point(hook);
        let local = self.layout.local_container(hook);
        fs::create_dir_all(&local)?;

        let target = local.join(self.layout.default_entry_name(hook));
        fsops::rename_with_backup_of_target(&entry, &target, &self.layout.backup_path(&target))?;
        debug!(hook, to = %target.display(), "migrated legacy hook");
        Ok(true)
    }

    /// Remove the entry-point symlink — only ever ours. With `check_first`,
    /// removal is skipped while any container still holds entries, so only
    /// orphaned hooks get unwired. Returns whether the symlink was removed.
    pub fn disable(&self, hook: &str, check_first: bool) -> Result<bool> {
        self.registry.validate(hook)?;

        let entry = self.layout.entry_point(hook);
        if !dispatch::is_dispatcher_link(self.layout, &entry) {
            return Ok(false);
        }

        if check_first {
            let local_busy = fsops::has_entries(&self.layout.local_container(hook));
            let tracked_busy = self
                .layout
                .tracked_container(hook)
                .map(|c| fsops::has_entries(&c))
                .unwrap_or(false);
            if local_busy || tracked_busy {
                return Ok(false);
            }
        }

        fs::remove_file(&entry)?;
        debug!(hook, "disabled");
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MultihookConfig;
    use crate::repo::Repo;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        layout: Layout,
        registry: HookRegistry,
    }

    impl Fixture {
        fn new(tracked: Option<&str>) -> Self {
            let tmp = TempDir::new().unwrap();
            fs::create_dir_all(tmp.path().join(".git").join("hooks")).unwrap();
            let repo = Repo::discover(tmp.path()).unwrap();
            let mut config = MultihookConfig::default();
            config.tracked_dir = tracked.map(str::to_string);
            let layout = Layout::new(&repo, &config);
            Self {
                _tmp: tmp,
                layout,
                registry: HookRegistry::builtin(),
            }
        }

        fn with_dispatcher(tracked: Option<&str>) -> Self {
            let fx = Self::new(tracked);
            dispatch::generate(&fx.layout).unwrap();
            fx
        }

        fn engine(&self) -> Engine<'_> {
            Engine::new(&self.layout, &self.registry)
        }

        /// Full sorted listing of the hooks dir, as (name, symlink target).
        fn hooks_dir_snapshot(&self) -> Vec<(String, Option<PathBuf>)> {
            let mut out: Vec<_> = fs::read_dir(&self.layout.hooks_root)
                .unwrap()
                .map(|e| {
                    let e = e.unwrap();
                    let name = e.file_name().to_string_lossy().into_owned();
                    let target = fs::read_link(e.path()).ok();
                    (name, target)
                })
                .collect();
            out.sort();
            out
        }
    }

    #[test]
    fn enable_unknown_hook_fails_without_writes() {
        let fx = Fixture::with_dispatcher(None);
        let before = fx.hooks_dir_snapshot();

        let err = fx
            .engine()
            .enable("not-a-real-hook", &[Placement::Local], false)
            .unwrap_err();

        assert!(matches!(err, HookError::UnknownHook(_)));
        assert_eq!(fx.hooks_dir_snapshot(), before, "no filesystem writes");
    }

    #[test]
    fn enable_without_dispatcher_is_not_initialized() {
        let fx = Fixture::new(None);
        let err = fx
            .engine()
            .enable("pre-commit", &[Placement::Local], false)
            .unwrap_err();
        assert!(matches!(err, HookError::StructureNotInitialized));
    }

    #[test]
    fn enable_wires_container_and_symlink() {
        let fx = Fixture::with_dispatcher(None);
        let outcomes = fx
            .engine()
            .enable("pre-commit", &[Placement::Local], false)
            .unwrap();

        assert!(matches!(
            outcomes[0].1,
            EnableOutcome::Enabled { ref container } if container.ends_with("pre-commit.d")
        ));
        assert!(fx.layout.local_container("pre-commit").is_dir());
        assert_eq!(
            fs::read_link(fx.layout.entry_point("pre-commit")).unwrap(),
            PathBuf::from("dispatch")
        );
    }

    #[test]
    fn enable_twice_changes_nothing() {
        let fx = Fixture::with_dispatcher(None);
        let engine = fx.engine();

        let first = engine
            .enable("pre-commit", &[Placement::Local], false)
            .unwrap();
        let snapshot = fx.hooks_dir_snapshot();

        let second = engine
            .enable("pre-commit", &[Placement::Local], false)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(fx.hooks_dir_snapshot(), snapshot);
    }

    #[test]
    fn enable_migrates_legacy_hook() {
        let fx = Fixture::with_dispatcher(None);
        let entry = fx.layout.entry_point("pre-commit");
        fs::write(&entry, "#!/bin/sh\necho legacy\n").unwrap();
        fs::set_permissions(&entry, fs::Permissions::from_mode(0o700)).unwrap();

        fx.engine()
            .enable("pre-commit", &[Placement::Local], false)
            .unwrap();

        let migrated = fx
            .layout
            .local_container("pre-commit")
            .join("pre-commit.00default");
        assert_eq!(
            fs::read_to_string(&migrated).unwrap(),
            "#!/bin/sh\necho legacy\n"
        );
        // rename keeps the original permissions
        assert_eq!(
            fs::metadata(&migrated).unwrap().permissions().mode() & 0o777,
            0o700
        );
        assert!(dispatch::is_dispatcher_link(&fx.layout, &entry));
    }

    #[test]
    fn enable_check_first_skips_without_evidence() {
        let fx = Fixture::with_dispatcher(None);
        let outcomes = fx
            .engine()
            .enable("pre-commit", &[Placement::Local], true)
            .unwrap();

        assert_eq!(outcomes[0].1, EnableOutcome::Skipped);
        assert!(!fx.layout.local_container("pre-commit").exists());
        assert!(!fx.layout.entry_point("pre-commit").exists());
    }

    #[test]
    fn enable_check_first_proceeds_on_legacy_file() {
        let fx = Fixture::with_dispatcher(None);
        fs::write(fx.layout.entry_point("pre-commit"), "#!/bin/sh\n").unwrap();

        let outcomes = fx
            .engine()
            .enable("pre-commit", &[Placement::Local], true)
            .unwrap();
        assert!(matches!(outcomes[0].1, EnableOutcome::Enabled { .. }));
    }

    #[test]
    fn enable_tracked_without_root_is_unavailable() {
        let fx = Fixture::with_dispatcher(None);
        let outcomes = fx
            .engine()
            .enable("pre-commit", &[Placement::Tracked], false)
            .unwrap();

        assert_eq!(outcomes[0].1, EnableOutcome::Unavailable);
        assert!(!fx.layout.entry_point("pre-commit").exists(), "no path created");
    }

    #[test]
    fn enable_tracked_check_first_uses_container_as_evidence() {
        let fx = Fixture::with_dispatcher(Some(".githooks"));
        let engine = fx.engine();

        // no tracked container yet: skipped
        let outcomes = engine
            .enable("pre-push", &[Placement::Tracked], true)
            .unwrap();
        assert_eq!(outcomes[0].1, EnableOutcome::Skipped);

        // pre-existing tracked container: wired
        fs::create_dir_all(fx.layout.tracked_container("pre-push").unwrap()).unwrap();
        let outcomes = engine
            .enable("pre-push", &[Placement::Tracked], true)
            .unwrap();
        assert!(matches!(outcomes[0].1, EnableOutcome::Enabled { .. }));
        assert!(engine.is_enabled("pre-push"));
    }

    #[test]
    fn enable_renames_aside_file_occupying_container_path() {
        let fx = Fixture::with_dispatcher(None);
        let container = fx.layout.local_container("pre-commit");
        fs::write(&container, "i am in the way").unwrap();

        fx.engine()
            .enable("pre-commit", &[Placement::Local], false)
            .unwrap();

        assert!(container.is_dir());
        let backup = fx.layout.backup_path(&container);
        assert_eq!(fs::read_to_string(backup).unwrap(), "i am in the way");
    }

    #[test]
    fn legacy_migration_backs_up_occupied_default_name() {
        let fx = Fixture::with_dispatcher(None);
        let container = fx.layout.local_container("pre-commit");
        fs::create_dir_all(&container).unwrap();
        fs::write(container.join("pre-commit.00default"), "earlier").unwrap();
        fs::write(fx.layout.entry_point("pre-commit"), "legacy").unwrap();

        fx.engine()
            .enable("pre-commit", &[Placement::Local], false)
            .unwrap();

        assert_eq!(
            fs::read_to_string(container.join("pre-commit.00default")).unwrap(),
            "legacy"
        );
        assert_eq!(
            fs::read_to_string(container.join("pre-commit.00default.bak")).unwrap(),
            "earlier"
        );
    }

    #[test]
    fn disable_removes_only_our_symlink() {
        let fx = Fixture::with_dispatcher(None);
        let engine = fx.engine();
        engine
            .enable("pre-commit", &[Placement::Local], false)
            .unwrap();

        assert!(engine.disable("pre-commit", false).unwrap());
        assert!(!fx.layout.entry_point("pre-commit").exists());

        // a foreign hook file is never touched
        let foreign = fx.layout.entry_point("pre-push");
        fs::write(&foreign, "#!/bin/sh\n").unwrap();
        assert!(!engine.disable("pre-push", false).unwrap());
        assert!(foreign.exists());
    }

    #[test]
    fn disable_check_first_keeps_hooks_with_scripts() {
        let fx = Fixture::with_dispatcher(None);
        let engine = fx.engine();
        engine
            .enable("pre-commit", &[Placement::Local], false)
            .unwrap();
        fs::write(
            fx.layout.local_container("pre-commit").join("10-lint"),
            "",
        )
        .unwrap();

        assert!(!engine.disable("pre-commit", true).unwrap());
        assert!(engine.is_enabled("pre-commit"));

        // empty container: orphan, pruned
        fs::remove_file(fx.layout.local_container("pre-commit").join("10-lint")).unwrap();
        assert!(engine.disable("pre-commit", true).unwrap());
    }

    #[test]
    fn state_reflects_filesystem() {
        let fx = Fixture::with_dispatcher(Some(".githooks"));
        let engine = fx.engine();

        assert_eq!(engine.state("pre-commit").unwrap(), HookState::Uninitialized);

        engine
            .enable("pre-commit", &[Placement::Local], false)
            .unwrap();
        assert_eq!(engine.state("pre-commit").unwrap(), HookState::EnabledLocal);

        engine
            .enable("pre-commit", &[Placement::Tracked], false)
            .unwrap();
        assert_eq!(engine.state("pre-commit").unwrap(), HookState::EnabledBoth);

        engine.disable("pre-commit", false).unwrap();
        assert_eq!(engine.state("pre-commit").unwrap(), HookState::DisabledClean);
    }

    #[test]
    fn state_of_plain_legacy_hook_is_uninitialized() {
        let fx = Fixture::with_dispatcher(None);
        fs::write(fx.layout.entry_point("pre-commit"), "#!/bin/sh\n").unwrap();
        assert_eq!(
            fx.engine().state("pre-commit").unwrap(),
            HookState::Uninitialized
        );
    }
}
