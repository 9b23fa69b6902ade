//! Extract, walk, scan, clean up.

use std::io::Write;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::extract::extract;
use crate::format::ArchiveFormat;
use crate::scan::scan;
use crate::walk::walk;

/// File extensions (lowercase, without the dot) whose contents get scanned.
pub const SCANNED_EXTENSIONS: [&str; 2] = ["log", "txt"];

/// Totals for one pipeline run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub files_visited: usize,
    pub files_scanned: usize,
    pub lines_read: usize,
    pub matches: usize,
}

/// Whether a file at `path` is a text log worth scanning.
pub fn is_scannable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SCANNED_EXTENSIONS
                .iter()
                .any(|wanted| ext.eq_ignore_ascii_case(wanted))
        })
}

/// Runs archives through extraction and scanning, writing report lines to
/// `out`.
pub struct Pipeline<W: Write> {
    out: W,
}

impl<W: Write> Pipeline<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Extract `archive`, report every keyword line of its `.log`/`.txt`
    /// files, and delete the extracted copy.
    ///
    /// The scratch directory is removed whether or not scanning succeeds.
    /// Matches written before a failure stay written.
    pub fn run(&mut self, archive: &Path) -> Result<RunSummary> {
        let format = ArchiveFormat::from_path(archive)?;
        let tree = extract(archive, format)?;

        let result = writeln!(self.out, "Extracted directory: {}", tree.path().display())
            .map_err(Error::Output)
            .and_then(|()| self.scan_tree(tree.path()));

        let dest = tree.path().to_path_buf();
        if let Err(e) = tree.close() {
            warn!(dir = %dest.display(), error = %e, "failed to remove extracted directory");
        }
        result
    }

    fn scan_tree(&mut self, root: &Path) -> Result<RunSummary> {
        if !root.exists() {
            return Err(Error::NotFound {
                path: root.to_path_buf(),
            });
        }

        let mut summary = RunSummary::default();
        let out = &mut self.out;

        walk(root, |path, is_dir| {
            if is_dir {
                return Ok(());
            }
            summary.files_visited += 1;
            if !is_scannable(path) {
                debug!(file = %path.display(), "not a text log, skipping");
                return Ok(());
            }

            let mut matches = scan(path)?;
            let mut found = 0;
            for found_match in matches.by_ref() {
                writeln!(out, "{}", found_match?).map_err(Error::Output)?;
                found += 1;
            }

            debug!(file = %path.display(), lines = matches.lines_read(), matches = found, "scanned");
            summary.files_scanned += 1;
            summary.lines_read += matches.lines_read();
            summary.matches += found;
            Ok(())
        })
        .map_err(|e| Error::Traversal(Box::new(e)))?;

        out.flush().map_err(Error::Output)?;
        Ok(summary)
    }
}
