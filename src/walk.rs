use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Visit `root` and everything below it in pre-order, siblings sorted by
/// file name, calling `visit(path, is_dir)` for each node.
///
/// The first error from `visit`, or from reading a directory, stops the walk
/// and is returned as is. Symlinks are reported but never followed.
pub fn walk<F>(root: &Path, mut visit: F) -> Result<()>
where
    F: FnMut(&Path, bool) -> Result<()>,
{
    if !root.exists() {
        return Err(Error::NotFound {
            path: root.to_path_buf(),
        });
    }

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf());
            Error::Read {
                path,
                source: e.into(),
            }
        })?;
        visit(entry.path(), entry.file_type().is_dir())?;
    }

    Ok(())
}
