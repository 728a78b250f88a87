//! Hook name registry — the closed set of valid hook event names.
//!
//! Built once per invocation and passed by reference everywhere, so every
//! operation in one run validates against the same set. The default set is
//! git's documented client- and server-side hooks; a configured override
//! file (one name per line, `#` comments) replaces it, and an unreadable
//! override fails with `RegistryUnavailable` rather than silently accepting
//! unknown names.

use crate::error::{HookError, Result};
use crate::repo::Layout;

/// Git's documented hook names, in `githooks(5)` order.
const BUILTIN_HOOKS: &[&str] = &[
    "applypatch-msg",
    "pre-applypatch",
    "post-applypatch",
    "pre-commit",
    "pre-merge-commit",
    "prepare-commit-msg",
    "commit-msg",
    "post-commit",
    "pre-rebase",
    "post-checkout",
    "post-merge",
    "pre-push",
    "pre-receive",
    "update",
    "proc-receive",
    "post-receive",
    "post-update",
    "reference-transaction",
    "push-to-checkout",
    "pre-auto-gc",
    "post-rewrite",
    "sendemail-validate",
    "fsmonitor-watchman",
    "post-index-change",
];

/// The ordered, closed set of valid hook names for one invocation.
#[derive(Debug, Clone)]
pub struct HookRegistry {
    names: Vec<String>,
}

impl HookRegistry {
    /// Build the registry for a layout: the override file when configured,
    /// the built-in list otherwise.
    pub fn load(layout: &Layout) -> Result<Self> {
        match &layout.hook_names_file {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    HookError::RegistryUnavailable(format!("{}: {e}", path.display()))
                })?;
                let names: Vec<String> = contents
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty() && !l.starts_with('#'))
                    .map(str::to_string)
                    .collect();
                if names.is_empty() {
                    return Err(HookError::RegistryUnavailable(format!(
                        "{}: no hook names",
                        path.display()
                    )));
                }
                Ok(Self { names })
            }
            None => Ok(Self::builtin()),
        }
    }

    /// The built-in registry, independent of any layout.
    pub fn builtin() -> Self {
        Self {
            names: BUILTIN_HOOKS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Ordered hook names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn is_valid(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Validate a name, failing with `UnknownHook` before any caller write.
    pub fn validate<'a>(&self, name: &'a str) -> Result<&'a str> {
        if self.is_valid(name) {
            Ok(name)
        } else {
            Err(HookError::UnknownHook(name.to_string()))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
