//! TAR extraction over the `tar` crate's sequential entry stream.
//!
//! A tar file is a run of 512-byte headers each followed by its payload, so
//! entries are visited strictly in archive order and every payload is copied
//! while the stream is positioned on it. GNU long names and PAX records are
//! folded into the following entry by the `tar` crate.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use ::tar::EntryType;
use tracing::debug;

use crate::error::ExtractError;
use crate::extract::{ExtractStats, Extractor, create_entry_dir, write_entry_file};
use crate::sandbox::resolve_entry_path;

/// Mode for regular files whose header mode field is unreadable.
const DEFAULT_FILE_MODE: u32 = 0o644;

/// Errors raised by the OS are I/O failures; anything the `tar` crate made up
/// itself (bad checksum, bad octal field) means the archive is damaged.
fn stream_err(source: io::Error) -> ExtractError {
    if source.raw_os_error().is_some() {
        ExtractError::io("failed to read archive", source)
    } else {
        ExtractError::Corrupt(source.to_string())
    }
}

/// TAR file extractor
pub struct TarExtractor<R: Read> {
    archive: ::tar::Archive<R>,
}

impl TarExtractor<File> {
    /// Open a TAR archive on the local filesystem.
    pub fn open(path: &Path) -> Result<Self, ExtractError> {
        let file = File::open(path).map_err(|e| {
            ExtractError::io(format!("failed to open '{}'", path.display()), e)
        })?;
        Ok(Self::new(file))
    }
}

impl<R: Read> TarExtractor<R> {
    pub fn new(reader: R) -> Self {
        Self {
            archive: ::tar::Archive::new(reader),
        }
    }
}

impl<R: Read> Extractor for TarExtractor<R> {
    fn extract_into(&mut self, root: &Path) -> Result<ExtractStats, ExtractError> {
        let mut stats = ExtractStats::default();

        for entry in self.archive.entries().map_err(stream_err)? {
            let mut entry = entry.map_err(stream_err)?;
            let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
            let entry_type = entry.header().entry_type();

            match entry_type {
                EntryType::Directory => {
                    let target = resolve_entry_path(root, &name)?;
                    create_entry_dir(&target)?;
                    stats.directories += 1;
                }
                EntryType::Regular | EntryType::Continuous => {
                    let target = resolve_entry_path(root, &name)?;
                    if let Some(parent) = target.parent() {
                        create_entry_dir(parent)?;
                    }
                    let mode = entry.header().mode().unwrap_or(DEFAULT_FILE_MODE);
                    let expected = entry.size();
                    let written = write_entry_file(&target, mode, &mut entry)?;
                    if written != expected {
                        return Err(ExtractError::Corrupt(format!(
                            "'{name}' is truncated: {written} of {expected} bytes"
                        )));
                    }
                    stats.bytes += written;
                    stats.files += 1;
                }
                other => {
                    debug!(entry = %name, kind = ?other, "skipping non-regular tar entry");
                    stats.skipped += 1;
                }
            }
        }

        Ok(stats)
    }
}
