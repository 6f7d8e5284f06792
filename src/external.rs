//! Resolving a command name to an executable file.

use std::fs;
use std::path::{Path, PathBuf};

/// Resolve a command name the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returned if it names an executable file.
/// - Name with multiple components (e.g. `bin/tool` or `./tool`): resolved
///   against the filesystem as given.
/// - Bare name: each directory of `search_dirs` is tried in order and the
///   first executable match wins.
/// - Empty name: not found.
///
/// The search list is injected rather than read from `PATH` here, so the
/// resolver can be exercised against a hand-built directory list.
pub fn find_executable(search_dirs: &[PathBuf], name: &str) -> Option<PathBuf> {
    let path = Path::new(name);
    if name.is_empty() {
        return None;
    }
    if path.is_absolute() || path.components().count() > 1 {
        return is_executable(path).then(|| path.to_path_buf());
    }

    for dir in search_dirs {
        let candidate = dir.join(name);
        if is_executable(&candidate) {
            return Some(candidate);
        }
    }
    None
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    fs::metadata(path).map(|meta| meta.is_file()).unwrap_or(false)
}
