use std::io::{self, Read};
use std::path::Path;

use flate2::CrcReader;
use flate2::read::DeflateDecoder;
use tracing::debug;

use crate::error::ExtractError;
use crate::extract::{ExtractStats, Extractor, create_entry_dir, write_entry_file};
use crate::io::{LocalFileReader, ReadAt, SectionReader};
use crate::sandbox::resolve_entry_path;

use super::parser::ZipParser;
use super::structures::{CompressionMethod, ZipFileEntry};

/// Mode for files whose entry carries no Unix permissions.
const DEFAULT_FILE_MODE: u32 = 0o644;

/// ZIP file extractor
pub struct ZipExtractor<R: ReadAt> {
    reader: R,
}

impl ZipExtractor<LocalFileReader> {
    /// Open a ZIP archive on the local filesystem.
    pub fn open(path: &Path) -> Result<Self, ExtractError> {
        let reader = LocalFileReader::new(path).map_err(|e| {
            ExtractError::io(format!("failed to open '{}'", path.display()), e)
        })?;
        Ok(Self::new(reader))
    }
}

impl<R: ReadAt> ZipExtractor<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// List all entries in the archive
    pub fn list_files(&self) -> Result<Vec<ZipFileEntry>, ExtractError> {
        ZipParser::new(&self.reader).list_files()
    }

    /// Decode one entry's payload into `output_path`, checking size and CRC.
    pub fn extract_to_file(
        &self,
        entry: &ZipFileEntry,
        output_path: &Path,
    ) -> Result<u64, ExtractError> {
        let parser = ZipParser::new(&self.reader);
        let data_offset = parser.get_data_offset(entry)?;
        let section = SectionReader::new(parser.reader(), data_offset, entry.compressed_size);

        let decoded: Box<dyn Read + '_> = match entry.compression_method {
            CompressionMethod::Stored => Box::new(section),
            CompressionMethod::Deflate => Box::new(DeflateDecoder::new(section)),
            CompressionMethod::Unknown(method) => {
                return Err(ExtractError::UnsupportedCompression {
                    entry: entry.file_name.clone(),
                    method,
                });
            }
        };

        // Cap at the declared size so a lying header can't fill the disk
        let mut checked = CrcReader::new(decoded.take(entry.uncompressed_size.saturating_add(1)));
        let mode = entry.unix_mode().unwrap_or(DEFAULT_FILE_MODE);
        let written = write_entry_file(output_path, mode, &mut checked).map_err(|e| match e {
            ExtractError::Io { source, .. }
                if matches!(
                    source.kind(),
                    io::ErrorKind::InvalidInput
                        | io::ErrorKind::InvalidData
                        | io::ErrorKind::UnexpectedEof
                ) =>
            {
                ExtractError::Corrupt(format!(
                    "invalid compressed data for '{}'",
                    entry.file_name
                ))
            }
            other => other,
        })?;

        if written != entry.uncompressed_size {
            return Err(ExtractError::Corrupt(format!(
                "'{}' decoded to {} bytes, expected {}",
                entry.file_name, written, entry.uncompressed_size
            )));
        }

        let actual = checked.crc().sum();
        if actual != entry.crc32 {
            return Err(ExtractError::ChecksumMismatch {
                entry: entry.file_name.clone(),
                expected: entry.crc32,
                actual,
            });
        }

        Ok(written)
    }
}

impl<R: ReadAt> Extractor for ZipExtractor<R> {
    fn extract_into(&mut self, root: &Path) -> Result<ExtractStats, ExtractError> {
        let mut stats = ExtractStats::default();

        for entry in self.list_files()? {
            if entry.is_special() {
                debug!(entry = %entry.file_name, "skipping non-regular zip entry");
                stats.skipped += 1;
                continue;
            }

            let target = resolve_entry_path(root, &entry.file_name)?;

            if entry.is_directory {
                create_entry_dir(&target)?;
                stats.directories += 1;
                continue;
            }

            if let Some(parent) = target.parent() {
                create_entry_dir(parent)?;
            }
            stats.bytes += self.extract_to_file(&entry, &target)?;
            stats.files += 1;
        }

        Ok(stats)
    }
}
