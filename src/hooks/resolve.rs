//! Location resolution — where a hook's entry point and script container
//! live for a given placement. Pure over the layout; never mutates.

use std::path::PathBuf;

use serde::Serialize;

use crate::repo::Layout;

/// Where a hook's scripts are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Inside the private hooks directory; not versioned with the repository.
    Local,
    /// Inside the version-tracked share, reached through the tracked link.
    Tracked,
}

impl Placement {
    pub const ALL: [Placement; 2] = [Placement::Local, Placement::Tracked];

    pub fn as_str(&self) -> &'static str {
        match self {
            Placement::Local => "local",
            Placement::Tracked => "tracked",
        }
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved paths for one hook in one placement.
#[derive(Debug, Clone)]
pub struct Location {
    /// The file git actually invokes (`<hooks-root>/<hook>`). Identical for
    /// both placements.
    pub entry_point: PathBuf,
    /// The script container directory for this placement.
    pub container: PathBuf,
    /// Whether the container directory currently exists.
    pub exists: bool,
}

/// Resolve a hook's paths for a placement. `None` means the Tracked
/// placement is unavailable because no tracked root is configured — an
/// expected state, not an error.
pub fn resolve(layout: &Layout, hook: &str, placement: Placement) -> Option<Location> {
    let container = match placement {
        Placement::Local => layout.local_container(hook),
        Placement::Tracked => layout.tracked_container(hook)?,
    };
    let exists = container.is_dir();
    Some(Location {
        entry_point: layout.entry_point(hook),
        container,
        exists,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MultihookConfig;
    use crate::repo::Repo;
    use tempfile::TempDir;

    fn layout(tmp: &TempDir, tracked: Option<&str>) -> Layout {
        std::fs::create_dir_all(tmp.path().join(".git").join("hooks")).unwrap();
        let repo = Repo::discover(tmp.path()).unwrap();
        let mut config = MultihookConfig::default();
        config.tracked_dir = tracked.map(str::to_string);
        Layout::new(&repo, &config)
    }

    #[test]
    fn local_resolution_reports_existence() {
        let tmp = TempDir::new().unwrap();
        let layout = layout(&tmp, None);

        let loc = resolve(&layout, "pre-commit", Placement::Local).unwrap();
        assert!(!loc.exists);
        assert!(loc.container.ends_with("pre-commit.d"));
        assert!(loc.entry_point.ends_with("hooks/pre-commit"));

        std::fs::create_dir_all(&loc.container).unwrap();
        let loc = resolve(&layout, "pre-commit", Placement::Local).unwrap();
        assert!(loc.exists);
    }

    #[test]
    fn tracked_without_root_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        let layout = layout(&tmp, None);
        assert!(resolve(&layout, "pre-commit", Placement::Tracked).is_none());
    }

    #[test]
    fn tracked_with_root_resolves_into_share() {
        let tmp = TempDir::new().unwrap();
        let layout = layout(&tmp, Some(".githooks"));

        let loc = resolve(&layout, "pre-push", Placement::Tracked).unwrap();
        assert!(loc.container.ends_with(".githooks/pre-push.d"));
        assert!(!loc.exists);
    }

    #[test]
    fn resolve_never_creates_paths() {
        let tmp = TempDir::new().unwrap();
        let layout = layout(&tmp, Some(".githooks"));

        resolve(&layout, "pre-commit", Placement::Local).unwrap();
        resolve(&layout, "pre-commit", Placement::Tracked).unwrap();
        assert!(!layout.local_container("pre-commit").exists());
        assert!(!tmp.path().join(".githooks").exists());
    }

    #[test]
    fn placement_display() {
        assert_eq!(Placement::Local.to_string(), "local");
        assert_eq!(Placement::Tracked.to_string(), "tracked");
    }
}
