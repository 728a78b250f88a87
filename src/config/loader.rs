//! Multi-source config loading with priority merging.
//!
//! Priority order (highest wins):
//!   CLI flags > Environment vars > Project config > User config > Defaults

use std::path::Path;

use super::schema::MultihookConfig;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// CLI-level overrides, collected by `main` and applied last.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub tracked_dir: Option<String>,
}

/// Load configuration from all available sources and merge them.
///
/// Sources (low → high priority):
///   1. Built-in defaults
///   2. User config (`~/.config/multihook/config.yaml`)
///   3. Project config (`.multihook.yaml` in the repository work tree)
///   4. Environment variables (`MULTIHOOK_TRACKED_DIR`, ...)
///   5. CLI flags
pub fn load_config(work_tree: Option<&Path>, cli: &CliOverrides) -> MultihookConfig {
    // Start from defaults
    let mut config = MultihookConfig::default();

    // Layer 2: user config
    if let Some(user) = load_user_config() {
        config = merge_configs(config, user);
    }

    // Layer 3: project config
    if let Some(dir) = work_tree {
        if let Some(project) = load_project_config(dir) {
            config = merge_configs(config, project);
        }
    }

    // Layer 4: environment variables
    load_env_overrides(&mut config);

    // Layer 5: CLI flags (highest priority)
    if let Some(dir) = &cli.tracked_dir {
        config.tracked_dir = Some(dir.clone());
    }

    config
}

/// Load user config from the platform-specific config directory.
///
/// - macOS: `~/Library/Application Support/multihook/config.yaml`
/// - Linux: `~/.config/multihook/config.yaml`
///
/// Returns `None` if the file does not exist or is unparseable.
pub fn load_user_config() -> Option<MultihookConfig> {
    let path = user_config_path()?;
    load_config_file(&path)
}

/// Load project config from `.multihook.yaml` in the given directory.
///
/// Returns `None` if the file does not exist or is unparseable.
pub fn load_project_config(dir: &Path) -> Option<MultihookConfig> {
    let path = dir.join(".multihook.yaml");
    load_config_file(&path)
}

/// Apply environment variable overrides to a config in place.
///
/// Supported variables:
/// - `MULTIHOOK_TRACKED_DIR` — tracked share directory (empty string clears it)
/// - `MULTIHOOK_DISPATCHER_NAME` — dispatcher file name
/// - `MULTIHOOK_HOOK_NAMES_FILE` — registry override file
pub fn load_env_overrides(config: &mut MultihookConfig) {
    if let Ok(val) = std::env::var("MULTIHOOK_TRACKED_DIR") {
        config.tracked_dir = if val.is_empty() { None } else { Some(val) };
    }

    if let Ok(val) = std::env::var("MULTIHOOK_DISPATCHER_NAME") {
        if !val.is_empty() {
            config.dispatcher_name = val;
        }
    }

    if let Ok(val) = std::env::var("MULTIHOOK_HOOK_NAMES_FILE") {
        if !val.is_empty() {
            config.hook_names_file = Some(val);
        }
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Platform-specific user config path via the `directories` crate.
fn user_config_path() -> Option<std::path::PathBuf> {
    directories::ProjectDirs::from("dev", "multihook", "multihook")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
}

/// Try to load and parse a YAML config file. Returns `None` on any error.
fn load_config_file(path: &Path) -> Option<MultihookConfig> {
    let contents = std::fs::read_to_string(path).ok()?;
    serde_yaml::from_str(&contents).ok()
}

/// Merge two configs: `overlay` fields take priority over `base` when they
/// differ from the defaults.
fn merge_configs(mut base: MultihookConfig, overlay: MultihookConfig) -> MultihookConfig {
    let defaults = MultihookConfig::default();

    if overlay.tracked_dir.is_some() {
        base.tracked_dir = overlay.tracked_dir;
    }
    if overlay.dispatcher_name != defaults.dispatcher_name {
        base.dispatcher_name = overlay.dispatcher_name;
    }
    if overlay.tracked_link_name != defaults.tracked_link_name {
        base.tracked_link_name = overlay.tracked_link_name;
    }
    if overlay.default_suffix != defaults.default_suffix {
        base.default_suffix = overlay.default_suffix;
    }
    if overlay.backup_suffix != defaults.backup_suffix {
        base.backup_suffix = overlay.backup_suffix;
    }
    if overlay.hook_names_file.is_some() {
        base.hook_names_file = overlay.hook_names_file;
    }

    base
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
