//! Dispatcher generation — the one executable every active hook entry
//! point symlinks to.
//!
//! The artifact is plain POSIX sh so it runs wherever git itself does. Its
//! runtime behavior is a contract, not an implementation detail:
//!
//! 1. The invoked hook name is the basename it was called as.
//! 2. Candidate containers, in order: local `<hook>.d`, then the tracked
//!    share's `<hook>.d` behind the tracked link.
//! 3. Per container, regular executable files run in lexicographic order;
//!    everything else is skipped.
//! 4. Scripts run sequentially, receiving the dispatcher's arguments and a
//!    replay of its stdin. A non-zero exit never stops later scripts.
//! 5. After the last script: one stderr line per failure (path relative to
//!    the hooks directory, plus the exit code), in execution order, and the
//!    dispatcher exits with the first non-zero status seen — 0 otherwise.
//!
//! Regeneration is pure templating over the layout's reserved names and
//! must never alter that contract.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::repo::{Layout, CONTAINER_SUFFIX};

/// Render the dispatcher script for a layout.
pub fn dispatcher_script(layout: &Layout) -> String {
    format!(
        r#"#!/bin/sh
# Generated by multihook — do not edit; `multihook init` regenerates this file.
#
# Runs every executable in <hook>{csuf}/ and {tracked}/<hook>{csuf}/, in
# lexicographic order, forwarding arguments and standard input. A failing
# script never stops the rest; the final exit status is the first non-zero
# status seen.

hook=$(basename "$0")
hooks_dir=$(CDPATH= cd -- "$(dirname -- "$0")" && pwd)

stdin_copy=
if ! [ -t 0 ]; then
    stdin_copy=$(mktemp "${{TMPDIR:-/tmp}}/multihook.XXXXXX") || exit 1
    trap 'rm -f "$stdin_copy"' EXIT
    cat >"$stdin_copy"
fi

first_status=0
failures=

for dir in "$hooks_dir/$hook{csuf}" "$hooks_dir/{tracked}/$hook{csuf}"; do
    [ -d "$dir" ] || continue
    for script in "$dir"/*; do
        [ -f "$script" ] && [ -x "$script" ] || continue
        if [ -n "$stdin_copy" ]; then
            "$script" "$@" <"$stdin_copy"
        else
            "$script" "$@"
        fi
        status=$?
        if [ "$status" -ne 0 ]; then
            [ "$first_status" -eq 0 ] && first_status=$status
            failures="$failures${{script#"$hooks_dir"/}}: exited with status $status
"
        fi
    done
done

if [ -n "$failures" ]; then
    printf '%s' "$failures" >&2
fi
exit "$first_status"
"#,
        csuf = CONTAINER_SUFFIX,
        tracked = layout.tracked_link_name,
    )
}

/// Write the dispatcher artifact, creating the hooks directory if needed.
/// Idempotent: an up-to-date artifact is left untouched. Returns whether
/// the filesystem changed.
pub fn generate(layout: &Layout) -> Result<bool> {
    let path = layout.dispatcher_path();
    let body = dispatcher_script(layout);

    fs::create_dir_all(&layout.hooks_root)?;

    let up_to_date = fs::read_to_string(&path)
        .map(|current| current == body)
        .unwrap_or(false);
    if !up_to_date {
        fs::write(&path, &body)?;
    }
    // exec bit enforced even when content matched
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(!up_to_date)
}

/// Whether the dispatcher artifact exists.
pub fn exists(layout: &Layout) -> bool {
    layout.dispatcher_path().is_file()
}

/// The symlink target entry points are wired to: the bare dispatcher name,
/// relative, so the repository can be moved without breaking hooks.
pub fn link_target(layout: &Layout) -> PathBuf {
    PathBuf::from(&layout.dispatcher_name)
}

/// Whether `entry` is a symlink to this layout's dispatcher (relative or
/// absolute target both count).
pub fn is_dispatcher_link(layout: &Layout, entry: &Path) -> bool {
    let md = match fs::symlink_metadata(entry) {
        Ok(md) => md,
        Err(_) => return false,
    };
    if !md.file_type().is_symlink() {
        return false;
    }
    match fs::read_link(entry) {
        Ok(target) => target == link_target(layout) || target == layout.dispatcher_path(),
        Err(_) => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
