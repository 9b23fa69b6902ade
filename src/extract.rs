//! Materializing an archive into a scratch directory.
//!
//! Both container formats go through [`Extractor`]; [`extract`] picks the
//! implementation, creates the scratch directory, and hands back an
//! [`ExtractedTree`] that deletes everything it holds once dropped.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read};
use std::path::Path;

use tempfile::TempDir;
use tracing::{debug, info};

use crate::error::ExtractError;
use crate::format::ArchiveFormat;
use crate::tar::TarExtractor;
use crate::zip::ZipExtractor;

/// Counters collected while materializing one archive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractStats {
    pub directories: usize,
    pub files: usize,
    pub skipped: usize,
    pub bytes: u64,
}

/// A format-specific archive reader able to write its entries under a root.
///
/// Implementations must route every entry name through
/// [`resolve_entry_path`](crate::sandbox::resolve_entry_path) before touching
/// the filesystem and skip anything that is neither a directory nor a regular
/// file.
pub trait Extractor {
    fn extract_into(&mut self, root: &Path) -> Result<ExtractStats, ExtractError>;
}

/// Scratch directory holding one extracted archive.
///
/// The directory and its contents are removed when this value is dropped;
/// [`ExtractedTree::close`] does the same but reports failures.
#[derive(Debug)]
pub struct ExtractedTree {
    dir: TempDir,
    stats: ExtractStats,
}

impl ExtractedTree {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn stats(&self) -> ExtractStats {
        self.stats
    }

    /// Remove the directory now.
    pub fn close(self) -> io::Result<()> {
        self.dir.close()
    }
}

/// Extract `archive` into a fresh temporary directory.
///
/// The archive is opened before the directory is created, so an unreadable
/// archive leaves nothing behind. A failure part-way through removes the
/// partially populated directory as well.
pub fn extract(archive: &Path, format: ArchiveFormat) -> Result<ExtractedTree, ExtractError> {
    let mut extractor: Box<dyn Extractor> = match format {
        ArchiveFormat::Zip => Box::new(ZipExtractor::open(archive)?),
        ArchiveFormat::Tar => Box::new(TarExtractor::open(archive)?),
    };

    let dir = tempfile::Builder::new()
        .prefix(format.temp_prefix())
        .tempdir()
        .map_err(|e| ExtractError::io("failed to create temporary directory", e))?;

    debug!(archive = %archive.display(), dest = %dir.path().display(), ?format, "extracting");
    let stats = extractor.extract_into(dir.path())?;
    info!(
        archive = %archive.display(),
        files = stats.files,
        directories = stats.directories,
        skipped = stats.skipped,
        bytes = stats.bytes,
        "archive extracted"
    );

    Ok(ExtractedTree { dir, stats })
}

/// Create a directory entry and any missing parents with default permissions.
pub(crate) fn create_entry_dir(path: &Path) -> Result<(), ExtractError> {
    fs::create_dir_all(path)
        .map_err(|e| ExtractError::io(format!("failed to create '{}'", path.display()), e))
}

/// Copy `content` into a newly created file at `path`.
///
/// `mode` is applied on Unix with owner read/write forced on, so the scratch
/// copy can always be scanned and removed. Returns the number of bytes written.
pub(crate) fn write_entry_file<R: Read + ?Sized>(
    path: &Path,
    mode: u32,
    content: &mut R,
) -> Result<u64, ExtractError> {
    let context = || format!("failed to write '{}'", path.display());
    let mut file = create_file(path, mode).map_err(|e| ExtractError::io(context(), e))?;
    let written = io::copy(content, &mut file).map_err(|e| ExtractError::io(context(), e))?;
    file.sync_all().map_err(|e| ExtractError::io(context(), e))?;
    Ok(written)
}

fn create_file(path: &Path, mode: u32) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode((mode & 0o777) | 0o600);
    }
    #[cfg(not(unix))]
    let _ = mode;

    options.open(path)
}
