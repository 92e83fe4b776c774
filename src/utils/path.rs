//! Path utilities for configured locations.

use std::path::{Path, PathBuf};

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let rest = match path {
        "~" => Some(""),
        p => p.strip_prefix("~/").or_else(|| p.strip_prefix("~\\")),
    };
    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Resolve `path` next to `anchor_file` unless it is already absolute.
pub fn resolve_beside(anchor_file: &Path, path: &str) -> PathBuf {
    let expanded = expand_tilde(path);
    if expanded.is_absolute() {
        return expanded;
    }
    match anchor_file.parent() {
        Some(dir) => dir.join(expanded),
        None => expanded,
    }
}
