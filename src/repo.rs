//! Git repository discovery and the resolved hook layout.
//!
//! [`Repo::discover`] walks up from a starting directory until it finds a
//! `.git` entry — either the usual directory, or the `gitdir: <path>` file a
//! linked worktree carries. [`Layout`] then combines the discovered roots
//! with the loaded configuration into one immutable value that every other
//! component borrows; nothing in this crate reads ambient process state for
//! paths or reserved names.

use std::path::{Path, PathBuf};

use crate::config::MultihookConfig;
use crate::error::{HookError, Result};

/// Directory suffix of a hook's script container (`pre-commit` →
/// `pre-commit.d`). Fixed convention, not configurable.
pub const CONTAINER_SUFFIX: &str = ".d";

// ---------------------------------------------------------------------------
// Repo
// ---------------------------------------------------------------------------

/// A discovered git repository.
#[derive(Debug, Clone)]
pub struct Repo {
    /// The work tree root (directory containing `.git`).
    pub work_tree: PathBuf,
    /// The actual git directory (`.git`, or the worktree's private gitdir).
    pub git_dir: PathBuf,
}

impl Repo {
    /// Walk up from `start` looking for a `.git` directory or gitfile.
    pub fn discover(start: &Path) -> Result<Self> {
        let start = start
            .canonicalize()
            .map_err(|_| HookError::NotAGitRepo(start.to_path_buf()))?;

        let mut dir = start.as_path();
        loop {
            let dot_git = dir.join(".git");
            if dot_git.is_dir() {
                return Ok(Self {
                    work_tree: dir.to_path_buf(),
                    git_dir: dot_git,
                });
            }
            if dot_git.is_file() {
                // Linked worktree: `.git` is a file containing `gitdir: <path>`.
                let git_dir = read_gitfile(&dot_git)?;
                return Ok(Self {
                    work_tree: dir.to_path_buf(),
                    git_dir,
                });
            }
            match dir.parent() {
                Some(parent) => dir = parent,
                None => return Err(HookError::NotAGitRepo(start)),
            }
        }
    }

    /// The hooks directory of this repository (`<git-dir>/hooks`).
    pub fn hooks_dir(&self) -> PathBuf {
        self.git_dir.join("hooks")
    }
}

/// Parse a worktree gitfile (`gitdir: <path>`), resolving a relative path
/// against the gitfile's directory.
fn read_gitfile(path: &Path) -> Result<PathBuf> {
    let contents = std::fs::read_to_string(path)?;
    let target = contents
        .strip_prefix("gitdir:")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| HookError::Other(format!("malformed gitfile: {}", path.display())))?;

    let target = PathBuf::from(target);
    if target.is_absolute() {
        Ok(target)
    } else {
        // parent() is always Some here: the gitfile lives inside the work tree
        Ok(path.parent().unwrap_or(Path::new(".")).join(target))
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// The resolved hook layout of one repository: where everything lives and
/// what the reserved names are. Built once from a [`Repo`] and a
/// [`MultihookConfig`], then passed by reference into every component.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Work tree root.
    pub work_tree: PathBuf,
    /// The hooks directory all entry points and local containers live in.
    pub hooks_root: PathBuf,
    /// Absolute path of the version-tracked share, when configured.
    pub tracked_root: Option<PathBuf>,
    /// File name of the generated dispatcher inside `hooks_root`.
    pub dispatcher_name: String,
    /// Name of the symlink inside `hooks_root` pointing at `tracked_root`.
    pub tracked_link_name: String,
    /// Suffix of the reserved default entry a migrated legacy hook becomes.
    pub default_suffix: String,
    /// Suffix appended when an occupied path is renamed aside.
    pub backup_suffix: String,
    /// Optional registry override file (absolute).
    pub hook_names_file: Option<PathBuf>,
}

impl Layout {
    pub fn new(repo: &Repo, config: &MultihookConfig) -> Self {
        let absolutize = |rel: &String| {
            let p = PathBuf::from(rel);
            if p.is_absolute() {
                p
            } else {
                repo.work_tree.join(p)
            }
        };

        Self {
            work_tree: repo.work_tree.clone(),
            hooks_root: repo.hooks_dir(),
            tracked_root: config.tracked_dir.as_ref().map(&absolutize),
            dispatcher_name: config.dispatcher_name.clone(),
            tracked_link_name: config.tracked_link_name.clone(),
            default_suffix: config.default_suffix.clone(),
            backup_suffix: config.backup_suffix.clone(),
            hook_names_file: config.hook_names_file.as_ref().map(&absolutize),
        }
    }

    /// Path of the generated dispatcher artifact.
    pub fn dispatcher_path(&self) -> PathBuf {
        self.hooks_root.join(&self.dispatcher_name)
    }

    /// Path of the tracked-share symlink inside the hooks directory.
    pub fn tracked_link(&self) -> PathBuf {
        self.hooks_root.join(&self.tracked_link_name)
    }

    /// Entry point path for a hook (`<hooks-root>/<hook>`).
    pub fn entry_point(&self, hook: &str) -> PathBuf {
        self.hooks_root.join(hook)
    }

    /// Local container path for a hook (`<hooks-root>/<hook>.d`).
    pub fn local_container(&self, hook: &str) -> PathBuf {
        self.hooks_root.join(format!("{hook}{CONTAINER_SUFFIX}"))
    }

    /// Tracked container path for a hook (`<tracked-root>/<hook>.d`), when
    /// a tracked root is configured.
    pub fn tracked_container(&self, hook: &str) -> Option<PathBuf> {
        self.tracked_root
            .as_ref()
            .map(|root| root.join(format!("{hook}{CONTAINER_SUFFIX}")))
    }

    /// Reserved name of the migrated legacy entry (`<hook>.<suffix>`).
    pub fn default_entry_name(&self, hook: &str) -> String {
        format!("{hook}.{}", self.default_suffix)
    }

    /// Sibling backup path for an occupied location (`<path>.<suffix>`).
    pub fn backup_path(&self, path: &Path) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".");
        name.push(&self.backup_suffix);
        path.with_file_name(name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
