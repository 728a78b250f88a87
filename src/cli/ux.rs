//! Interactive collaborators the hook core stays agnostic of: the yes/no
//! decision source, the external editor, and close-match suggestions for
//! mistyped hook names.

use std::path::Path;
use std::process::Command;

use dialoguer::Confirm;

use crate::error::{HookError, Result};

// ---------------------------------------------------------------------------
// Prompter
// ---------------------------------------------------------------------------

/// Yes/no decision source. With `assume_yes` (the `--yes` flag) every
/// question is pre-answered, which also covers non-interactive use.
pub struct Prompter {
    pub assume_yes: bool,
}

impl Prompter {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    /// Ask for confirmation. Falls back to `default` when no terminal is
    /// available.
    pub fn confirm(&self, message: &str, default: bool) -> bool {
        if self.assume_yes {
            return true;
        }
        Confirm::new()
            .with_prompt(message)
            .default(default)
            .interact()
            .unwrap_or(default)
    }

    /// Adapter for the core's `decide` closures.
    pub fn as_decider(&self) -> impl FnMut(&str) -> bool + '_ {
        move |message: &str| self.confirm(message, false)
    }
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

/// Open `path` in the user's editor (`$VISUAL`, then `$EDITOR`, then `vi`).
/// The variable may carry arguments (`"code -w"`).
pub fn edit_file(path: &Path) -> Result<()> {
    let editor = std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string());

    let mut parts = editor.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| HookError::Other("empty $EDITOR".to_string()))?;

    let status = Command::new(program).args(parts).arg(path).status()?;
    if !status.success() {
        return Err(HookError::Other(format!(
            "editor '{editor}' exited with {status}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Suggestions
// ---------------------------------------------------------------------------

/// Close matches for a mistyped hook name, best first. Anything further
/// than a third of the name away is noise and dropped.
pub fn closest_hooks<'a>(name: &str, candidates: impl Iterator<Item = &'a str>) -> Vec<String> {
    let cutoff = (name.len() / 3).max(2);
    let mut scored: Vec<(usize, &str)> = candidates
        .map(|c| (levenshtein(name, c), c))
        .filter(|(d, _)| *d <= cutoff)
        .collect();
    scored.sort_by_key(|(d, c)| (*d, *c));
    scored.into_iter().take(3).map(|(_, c)| c.to_string()).collect()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
