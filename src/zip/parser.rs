//! Low-level ZIP archive parser.
//!
//! This module handles the binary parsing of ZIP file structures,
//! reading from any source that implements the [`ReadAt`] trait.
//!
//! ## Parsing Strategy
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) at the file's end
//! 2. If ZIP64, read the ZIP64 EOCD for large file support
//! 3. Read the Central Directory to get metadata for all files
//! 4. For extraction, read each file's Local File Header and data

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

use crate::error::ExtractError;
use crate::io::ReadAt;

use super::structures::*;

type Result<T> = std::result::Result<T, ExtractError>;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for EOCD with a comment.
const MAX_COMMENT_SIZE: u64 = 65535;

fn read_err(source: std::io::Error) -> ExtractError {
    ExtractError::io("failed to read archive", source)
}

fn truncated(_: std::io::Error) -> ExtractError {
    ExtractError::Corrupt("truncated central directory".to_string())
}

/// Low-level ZIP file parser.
///
/// Generic over the reader so tests can parse in-memory archives.
/// Typically used through [`ZipExtractor`](super::ZipExtractor).
pub struct ZipParser<'a, R: ReadAt + ?Sized> {
    /// The underlying data source
    reader: &'a R,
    /// Total size of the archive in bytes
    size: u64,
}

impl<'a, R: ReadAt + ?Sized> ZipParser<'a, R> {
    pub fn new(reader: &'a R) -> Self {
        let size = reader.size();
        Self { reader, size }
    }

    /// Find and parse the End of Central Directory record.
    ///
    /// Handles both the simple case (no comment) and archives with
    /// comments by searching backwards for the signature.
    ///
    /// Returns the EOCD record and its offset in the file.
    pub fn find_eocd(&self) -> Result<(EndOfCentralDirectory, u64)> {
        if self.size < EndOfCentralDirectory::SIZE as u64 {
            return Err(ExtractError::Corrupt("not a valid ZIP file".to_string()));
        }

        // Common case: no comment, EOCD is the last 22 bytes
        let offset = self.size - EndOfCentralDirectory::SIZE as u64;
        let mut buf = vec![0u8; EndOfCentralDirectory::SIZE];
        self.reader.read_exact_at(offset, &mut buf).map_err(read_err)?;

        if &buf[0..4] == EndOfCentralDirectory::SIGNATURE && &buf[20..22] == b"\x00\x00" {
            let eocd = EndOfCentralDirectory::from_bytes(&buf)?;
            return Ok((eocd, offset));
        }

        // The EOCD could be earlier if there's a ZIP comment.
        let search_size = (MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE as u64).min(self.size);
        let search_start = self.size - search_size;

        let mut buf = vec![0u8; search_size as usize];
        self.reader
            .read_exact_at(search_start, &mut buf)
            .map_err(read_err)?;

        // Search backwards for EOCD signature (PK\x05\x06)
        for i in (0..=buf.len() - EndOfCentralDirectory::SIZE).rev() {
            if &buf[i..i + 4] == EndOfCentralDirectory::SIGNATURE {
                // The comment length field must account for the remaining bytes
                let comment_len = u16::from_le_bytes([buf[i + 20], buf[i + 21]]) as usize;

                if comment_len == buf.len() - i - EndOfCentralDirectory::SIZE {
                    let eocd = EndOfCentralDirectory::from_bytes(
                        &buf[i..i + EndOfCentralDirectory::SIZE],
                    )?;
                    return Ok((eocd, search_start + i as u64));
                }
            }
        }

        Err(ExtractError::Corrupt("not a valid ZIP file".to_string()))
    }

    /// Read the ZIP64 End of Central Directory record.
    ///
    /// Called when the regular EOCD has fields saturated at 0xFFFF or
    /// 0xFFFFFFFF.
    pub fn read_zip64_eocd(&self, eocd_offset: u64) -> Result<Zip64EOCD> {
        // The locator sits immediately before the regular EOCD
        let locator_offset = eocd_offset
            .checked_sub(Zip64EOCDLocator::SIZE as u64)
            .ok_or_else(|| ExtractError::Corrupt("missing ZIP64 locator".to_string()))?;
        let mut locator_buf = vec![0u8; Zip64EOCDLocator::SIZE];
        self.reader
            .read_exact_at(locator_offset, &mut locator_buf)
            .map_err(read_err)?;

        let locator = Zip64EOCDLocator::from_bytes(&locator_buf)?;

        let mut eocd64_buf = vec![0u8; Zip64EOCD::MIN_SIZE];
        self.reader
            .read_exact_at(locator.eocd64_offset, &mut eocd64_buf)
            .map_err(read_err)?;

        Zip64EOCD::from_bytes(&eocd64_buf)
    }

    /// List all entries in the ZIP archive, in central directory order.
    pub fn list_files(&self) -> Result<Vec<ZipFileEntry>> {
        let (eocd, eocd_offset) = self.find_eocd()?;

        let (cd_offset, cd_size, total_entries) = if eocd.is_zip64() {
            let eocd64 = self.read_zip64_eocd(eocd_offset)?;
            (eocd64.cd_offset, eocd64.cd_size, eocd64.total_entries)
        } else {
            (
                eocd.cd_offset as u64,
                eocd.cd_size as u64,
                eocd.total_entries as u64,
            )
        };

        let cd_end = cd_offset.checked_add(cd_size);
        if cd_end.is_none_or(|end| end > self.size)
            || total_entries.saturating_mul(CDFH_MIN_SIZE as u64) > cd_size
        {
            return Err(ExtractError::Corrupt(
                "central directory lies outside the archive".to_string(),
            ));
        }

        // Read the entire Central Directory in one go
        let mut cd_data = vec![0u8; cd_size as usize];
        self.reader
            .read_exact_at(cd_offset, &mut cd_data)
            .map_err(read_err)?;

        let mut entries = Vec::with_capacity(total_entries as usize);
        let mut cursor = Cursor::new(cd_data.as_slice());

        for _ in 0..total_entries {
            let entry = self.parse_cdfh(&mut cursor)?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Parse a Central Directory File Header from a cursor.
    fn parse_cdfh(&self, cursor: &mut Cursor<&[u8]>) -> Result<ZipFileEntry> {
        let mut sig = [0u8; 4];
        cursor.read_exact(&mut sig).map_err(truncated)?;
        if sig != CDFH_SIGNATURE {
            return Err(ExtractError::Corrupt(
                "invalid central directory file header".to_string(),
            ));
        }

        let version_made_by = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
        let _version_needed = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
        let _flags = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
        let compression_method = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
        let _last_mod_time = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
        let _last_mod_date = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
        let crc32 = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
        let mut compressed_size = cursor.read_u32::<LittleEndian>().map_err(truncated)? as u64;
        let mut uncompressed_size = cursor.read_u32::<LittleEndian>().map_err(truncated)? as u64;
        let file_name_length = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
        let extra_field_length = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
        let file_comment_length = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
        let _disk_number_start = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
        let _internal_attrs = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
        let external_attrs = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
        let mut lfh_offset = cursor.read_u32::<LittleEndian>().map_err(truncated)? as u64;

        let mut file_name_bytes = vec![0u8; file_name_length as usize];
        cursor.read_exact(&mut file_name_bytes).map_err(truncated)?;
        // Lossy conversion keeps non-UTF8 names usable
        let file_name = String::from_utf8_lossy(&file_name_bytes).to_string();

        // Directory entries end with '/', or say so in their Unix mode
        let is_directory = file_name.ends_with('/')
            || file_name.ends_with('\\')
            || is_unix_directory(version_made_by, external_attrs);

        // ZIP64 extended information lives in extra field 0x0001
        let extra_field_end = cursor.position() + extra_field_length as u64;

        while cursor.position() + 4 <= extra_field_end {
            let header_id = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
            let field_size = cursor.read_u16::<LittleEndian>().map_err(truncated)?;
            let field_end = cursor.position() + field_size as u64;

            if header_id == 0x0001 {
                // Present only when the matching header field is saturated
                if uncompressed_size == 0xFFFFFFFF && cursor.position() + 8 <= field_end {
                    uncompressed_size = cursor.read_u64::<LittleEndian>().map_err(truncated)?;
                }
                if compressed_size == 0xFFFFFFFF && cursor.position() + 8 <= field_end {
                    compressed_size = cursor.read_u64::<LittleEndian>().map_err(truncated)?;
                }
                if lfh_offset == 0xFFFFFFFF && cursor.position() + 8 <= field_end {
                    lfh_offset = cursor.read_u64::<LittleEndian>().map_err(truncated)?;
                }
            }
            cursor.set_position(field_end);
        }

        cursor.set_position(extra_field_end + file_comment_length as u64);

        Ok(ZipFileEntry {
            file_name,
            version_made_by,
            compression_method: CompressionMethod::from_u16(compression_method),
            compressed_size,
            uncompressed_size,
            crc32,
            external_attrs,
            lfh_offset,
            is_directory,
        })
    }

    /// Get the offset where an entry's compressed data begins.
    ///
    /// The Local File Header has its own variable-length name and extra
    /// field, which may differ from the Central Directory entry.
    pub fn get_data_offset(&self, entry: &ZipFileEntry) -> Result<u64> {
        let mut lfh_buf = vec![0u8; LFH_SIZE];
        self.reader
            .read_exact_at(entry.lfh_offset, &mut lfh_buf)
            .map_err(read_err)?;

        if &lfh_buf[0..4] != LFH_SIGNATURE {
            return Err(ExtractError::Corrupt(format!(
                "invalid local file header for '{}'",
                entry.file_name
            )));
        }

        let mut cursor = Cursor::new(&lfh_buf);
        cursor.set_position(26); // Offset to filename length field

        let file_name_length = cursor.read_u16::<LittleEndian>().map_err(truncated)? as u64;
        let extra_field_length = cursor.read_u16::<LittleEndian>().map_err(truncated)? as u64;

        let data_offset =
            entry.lfh_offset + LFH_SIZE as u64 + file_name_length + extra_field_length;

        if data_offset.saturating_add(entry.compressed_size) > self.size {
            return Err(ExtractError::Corrupt(format!(
                "data for '{}' runs past the end of the archive",
                entry.file_name
            )));
        }

        Ok(data_offset)
    }

    /// Get a reference to the underlying reader.
    pub fn reader(&self) -> &'a R {
        self.reader
    }
}
