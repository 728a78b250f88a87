//! Configuration data structures for multihook.
//!
//! Defines the YAML config format: the tracked share directory and the
//! reserved names the hook layout is built from. Designed for multi-source
//! loading with serde; every field is optional in the file and falls back
//! to a well-known default.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for multihook.
///
/// Loaded from YAML files, environment variables, and CLI flags.
/// Multiple sources are merged with well-defined priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultihookConfig {
    /// Repository-relative directory holding the version-tracked hook
    /// containers (e.g. `".githooks"`). `None` disables the Tracked
    /// placement entirely.
    #[serde(default)]
    pub tracked_dir: Option<String>,

    /// File name of the generated dispatcher inside the hooks directory.
    #[serde(default = "default_dispatcher_name")]
    pub dispatcher_name: String,

    /// Name of the symlink inside the hooks directory that points at the
    /// tracked share.
    #[serde(default = "default_tracked_link_name")]
    pub tracked_link_name: String,

    /// Suffix of the reserved entry a migrated single-file hook is stored
    /// under. The `00` prefix keeps it first in lexicographic dispatch
    /// order, so migrated hooks keep running before any added script.
    #[serde(default = "default_default_suffix")]
    pub default_suffix: String,

    /// Suffix appended when an occupied path has to be renamed aside
    /// instead of destroyed.
    #[serde(default = "default_backup_suffix")]
    pub backup_suffix: String,

    /// Optional file overriding the built-in hook name registry, one name
    /// per line (`#` comments ignored). Repository-relative unless
    /// absolute.
    #[serde(default)]
    pub hook_names_file: Option<String>,
}

impl Default for MultihookConfig {
    fn default() -> Self {
        Self {
            tracked_dir: None,
            dispatcher_name: default_dispatcher_name(),
            tracked_link_name: default_tracked_link_name(),
            default_suffix: default_default_suffix(),
            backup_suffix: default_backup_suffix(),
            hook_names_file: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_dispatcher_name() -> String {
    "dispatch".to_string()
}

fn default_tracked_link_name() -> String {
    "tracked".to_string()
}

fn default_default_suffix() -> String {
    "00default".to_string()
}

fn default_backup_suffix() -> String {
    "bak".to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
