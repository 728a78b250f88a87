//! End-to-end lifecycle flows over a real temporary repository: adopt,
//! add, prune, destroy — and a full wiring check that runs the dispatcher
//! through an entry point produced by the normal API.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::process::Command;

use tempfile::TempDir;

use multihook::config::MultihookConfig;
use multihook::error::HookError;
use multihook::hooks::engine::{Engine, HookState};
use multihook::hooks::entries::{self, AddOutcome};
use multihook::hooks::lifecycle;
use multihook::hooks::resolve::Placement;
use multihook::registry::HookRegistry;
use multihook::repo::{Layout, Repo};

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

    fn engine(&self) -> Engine<'_> {
        Engine::new(&self.layout, &self.registry)
    }
}

fn yes() -> impl FnMut(&str) -> bool {
    |_: &str| true
}

#[test]
fn full_cycle_init_add_run_destroy() {
    let fx = Fixture::new(None);
    let engine = fx.engine();

    // adopt a pre-existing hook
    let entry = fx.layout.entry_point("pre-commit");
    fs::write(&entry, "#!/bin/sh\nexit 0\n").unwrap();
    fs::set_permissions(&entry, fs::Permissions::from_mode(0o755)).unwrap();

    lifecycle::init(&engine).unwrap();
    assert_eq!(engine.state("pre-commit").unwrap(), HookState::EnabledLocal);

    // register a second script next to the migrated one
    let marker = fx._tmp.path().join("ran");
    let outcome = entries::add(&engine, "pre-commit", "10-mark", Placement::Local, &mut yes())
        .unwrap();
    let script = match outcome {
        AddOutcome::Created(p) => p,
        other => panic!("expected Created, got {other:?}"),
    };
    fs::write(
        &script,
        format!("#!/bin/sh\ntouch '{}'\n", marker.display()),
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    // the entry point now fans out to both scripts
    let status = Command::new(&entry)
        .stdin(std::process::Stdio::null())
        .status()
        .unwrap();
    assert!(status.success());
    assert!(marker.exists());

    // destroy restores the migrated hook and reports the extra script
    let report = lifecycle::destroy(&engine).unwrap();
    assert_eq!(report.restored, vec!["pre-commit"]);
    assert_eq!(
        report.leftovers,
        vec![("pre-commit".to_string(), vec!["10-mark".to_string()])]
    );
    assert_eq!(fs::read_to_string(&entry).unwrap(), "#!/bin/sh\nexit 0\n");
    assert!(!fx.layout.dispatcher_path().exists());
}

#[test]
fn init_evidence_property_across_hooks() {
    let fx = Fixture::new(Some(".githooks"));

    // pre-commit: legacy file. pre-push: non-empty tracked container.
    // post-merge: empty tracked container. commit-msg: nothing.
    fs::write(fx.layout.entry_point("pre-commit"), "#!/bin/sh\n").unwrap();
    let pushd = fx.layout.tracked_container("pre-push").unwrap();
    fs::create_dir_all(&pushd).unwrap();
    fs::write(pushd.join("10-check"), "").unwrap();
    fs::create_dir_all(fx.layout.tracked_container("post-merge").unwrap()).unwrap();

    let engine = fx.engine();
    lifecycle::init(&engine).unwrap();

    assert!(engine.is_enabled("pre-commit"), "legacy file is evidence");
    assert!(engine.is_enabled("pre-push"), "non-empty tracked container is evidence");
    assert!(!engine.is_enabled("post-merge"), "empty tracked container is pruned");
    assert!(!engine.is_enabled("commit-msg"), "no evidence, no enable");
}

#[test]
fn orphan_cleanup_on_last_delete() {
    let fx = Fixture::new(None);
    let engine = fx.engine();
    lifecycle::init(&engine).unwrap();

    entries::add(&engine, "commit-msg", "10-check", Placement::Local, &mut yes()).unwrap();
    entries::add(&engine, "commit-msg", "20-spell", Placement::Local, &mut yes()).unwrap();
    assert!(engine.is_enabled("commit-msg"));

    entries::delete(&engine, "commit-msg", "10-check", Placement::Local).unwrap();
    assert!(engine.is_enabled("commit-msg"), "one script left");

    let outcome = entries::delete(&engine, "commit-msg", "20-spell", Placement::Local).unwrap();
    assert!(outcome.container_removed);
    assert!(outcome.disabled);
    assert_eq!(
        engine.state("commit-msg").unwrap(),
        HookState::Uninitialized,
        "no trace left"
    );
}

#[test]
fn entry_operations_before_init_are_recoverable() {
    let fx = Fixture::new(None);
    let engine = fx.engine();

    let err = entries::add(&engine, "pre-commit", "10-lint", Placement::Local, &mut yes())
        .unwrap_err();
    assert!(matches!(err, HookError::StructureNotInitialized));

    // the documented remediation: run init, retry
    lifecycle::init(&engine).unwrap();
    entries::add(&engine, "pre-commit", "10-lint", Placement::Local, &mut yes()).unwrap();
    assert!(engine.is_enabled("pre-commit"));
}

#[test]
fn tracked_share_enables_hooks_on_a_second_clone() {
    // clone A adds a tracked script; clone B inits against the same share
    // layout and picks the hook up
    let fx_a = Fixture::new(Some("shared-hooks"));
    let engine_a = fx_a.engine();
    lifecycle::init(&engine_a).unwrap();
    entries::add(&engine_a, "pre-push", "10-ci", Placement::Tracked, &mut yes()).unwrap();

    // "clone B": a fresh hooks dir, same work tree and share
    fs::remove_dir_all(&fx_a.layout.hooks_root).unwrap();
    fs::create_dir_all(&fx_a.layout.hooks_root).unwrap();

    let engine_b = fx_a.engine();
    assert!(!engine_b.is_enabled("pre-push"));
    lifecycle::init(&engine_b).unwrap();
    assert!(
        engine_b.is_enabled("pre-push"),
        "tracked scripts re-enable the hook after re-init"
    );
}

#[test]
fn unknown_hook_fails_before_touching_the_filesystem() {
    let fx = Fixture::new(None);
    let engine = fx.engine();
    lifecycle::init(&engine).unwrap();

    let snapshot = || {
        let mut names: Vec<String> = fs::read_dir(&fx.layout.hooks_root)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    };
    let before = snapshot();

    assert!(matches!(
        engine.enable("not-a-real-hook", &[Placement::Local], false),
        Err(HookError::UnknownHook(_))
    ));
    assert!(matches!(
        entries::add(&engine, "not-a-real-hook", "x", Placement::Local, &mut yes()),
        Err(HookError::UnknownHook(_))
    ));

    assert_eq!(snapshot(), before);
}
