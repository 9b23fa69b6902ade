//! Zip-slip protection for archive entry paths.

use std::path::{Component, Path, PathBuf};

use crate::error::ExtractError;

/// Join an archive entry name onto `root`, refusing anything that would land
/// outside of it.
///
/// `.` segments are dropped and `..` segments pop the previous segment. A
/// leading `/` or drive prefix is ignored, so `/var/log/app.log` lands at
/// `root/var/log/app.log`. Only a `..` that climbs above `root` fails with
/// [`ExtractError::PathTraversal`]. Backslashes are treated as separators since
/// Windows-made ZIP files use them.
pub fn resolve_entry_path(root: &Path, entry: &str) -> Result<PathBuf, ExtractError> {
    let traversal = || ExtractError::PathTraversal {
        entry: entry.to_string(),
    };

    let normalized = entry.replace('\\', "/");
    let mut relative = PathBuf::new();
    let mut depth = 0usize;

    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) => {
                relative.push(part);
                depth += 1;
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(traversal());
                }
                relative.pop();
                depth -= 1;
            }
        }
    }

    let resolved = root.join(relative);
    if !resolved.starts_with(root) {
        return Err(traversal());
    }
    Ok(resolved)
}
