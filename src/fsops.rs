//! Filesystem primitives the hook engine is built on.
//!
//! Every mutation here uses its atomic form where the platform provides one
//! (rename, symlink, mkdir); nothing in this module decides *policy* — it
//! only supplies the backup-aware rename, existence-checking symlink, and
//! container-listing semantics the engine and lifecycle layers compose.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Files ignored when deciding whether a container is empty. Finder and
/// Explorer drop these into directories behind the user's back.
pub const HOUSEKEEPING: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

// ---------------------------------------------------------------------------
// Symlinks
// ---------------------------------------------------------------------------

/// Create `link` pointing at `target`, with existence-checking semantics:
/// an existing symlink with the right target is left alone, a symlink with
/// the wrong target is replaced, and anything else is an error for the
/// caller to resolve first. Returns whether the filesystem changed.
pub fn symlink_force(target: &Path, link: &Path) -> Result<bool> {
    match fs::symlink_metadata(link) {
        Ok(md) if md.file_type().is_symlink() => {
            if fs::read_link(link)? == target {
                return Ok(false);
            }
            fs::remove_file(link)?;
        }
        Ok(_) => {
            return Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("refusing to replace non-symlink {}", link.display()),
            )
            .into());
        }
        Err(_) => {}
    }
    std::os::unix::fs::symlink(target, link)?;
    Ok(true)
}

/// Whether `link` is a symlink whose target is exactly `target`.
pub fn symlink_points_to(link: &Path, target: &Path) -> bool {
    fs::symlink_metadata(link)
        .map(|md| md.file_type().is_symlink())
        .unwrap_or(false)
        && fs::read_link(link).map(|t| t == target).unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Backup-aware rename
// ---------------------------------------------------------------------------

/// Rename `path` to `backup` (replacing any stale backup of the same name).
/// Returns the backup path for reporting.
pub fn backup_rename(path: &Path, backup: &Path) -> Result<PathBuf> {
    // rename replaces an existing file atomically; an existing backup
    // *directory* has to go first
    if backup.is_dir() {
        fs::remove_dir_all(backup)?;
    }
    fs::rename(path, backup)?;
    Ok(backup.to_path_buf())
}

/// Rename that frees the destination first by backing it up: used when a
/// migrated legacy script would land on an already-occupied default name.
pub fn rename_with_backup_of_target(src: &Path, dst: &Path, backup: &Path) -> Result<()> {
    if fs::symlink_metadata(dst).is_ok() {
        backup_rename(dst, backup)?;
    }
    fs::rename(src, dst)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Executables
// ---------------------------------------------------------------------------

pub fn is_executable(md: &fs::Metadata) -> bool {
    md.is_file() && md.permissions().mode() & 0o111 != 0
}

/// Create an empty file with mode 0755.
pub fn create_executable(path: &Path) -> Result<()> {
    fs::write(path, "")?;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

/// Names of the regular files in `dir`, lexicographically sorted, skipping
/// housekeeping files. Missing directory reads as empty.
pub fn container_entries(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let iter = match fs::read_dir(dir) {
        Ok(it) => it,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(names),
        Err(e) => return Err(e.into()),
    };
    for entry in iter {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if HOUSEKEEPING.contains(&name.as_str()) {
            continue;
        }
        if entry.file_type()?.is_file() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Like [`container_entries`], restricted to executable files. These are
/// the entries the dispatcher would actually run.
pub fn executable_entries(dir: &Path) -> Result<Vec<String>> {
    let mut names = container_entries(dir)?;
    names.retain(|n| {
        fs::metadata(dir.join(n))
            .map(|md| is_executable(&md))
            .unwrap_or(false)
    });
    Ok(names)
}

/// Whether `dir` holds any entries worth keeping (anything but
/// housekeeping files).
pub fn has_entries(dir: &Path) -> bool {
    match fs::read_dir(dir) {
        Ok(iter) => iter.filter_map(|e| e.ok()).any(|e| {
            let name = e.file_name();
            !HOUSEKEEPING.contains(&name.to_string_lossy().as_ref())
        }),
        Err(_) => false,
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// Relative path from `from_dir` to `to`, for symlink targets that survive
/// the repository being moved. Falls back to the absolute `to` when the two
/// share no common prefix.
pub fn relative_from(from_dir: &Path, to: &Path) -> PathBuf {
    let mut from_parts: Vec<_> = from_dir.components().collect();
    let mut to_parts: Vec<_> = to.components().collect();

    let common = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 {
        return to.to_path_buf();
    }

    let mut rel = PathBuf::new();
    for _ in from_parts.drain(..).skip(common) {
        rel.push("..");
    }
    for part in to_parts.drain(..).skip(common) {
        rel.push(part);
    }
    if rel.as_os_str().is_empty() {
        rel.push(".");
    }
    rel
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
