//! Unified error type for multihook.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HookError {
    #[error("unknown hook '{0}'")]
    UnknownHook(String),

    #[error("hook name registry unavailable: {0}")]
    RegistryUnavailable(String),

    /// Edit/delete target missing. `suggestions` holds the executable
    /// entries that do exist in the same container, for the CLI to print.
    #[error("no script named '{name}'")]
    ScriptNotFound {
        name: String,
        suggestions: Vec<String>,
    },

    #[error("tracked placement requested but no tracked directory is configured")]
    InvalidPlacement,

    #[error("hook structure not initialized (no dispatcher) — run `multihook init` first")]
    StructureNotInitialized,

    #[error("not a git repository (or any parent): {}", .0.display())]
    NotAGitRepo(std::path::PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, HookError>;
