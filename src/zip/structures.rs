use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::error::ExtractError;

type Result<T> = std::result::Result<T, ExtractError>;

fn corrupt(what: &str) -> ExtractError {
    ExtractError::Corrupt(what.to_string())
}

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }
}

/// End of Central Directory (EOCD) - 22 bytes minimum
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(corrupt("invalid end of central directory"));
        }

        let mut cursor = Cursor::new(&data[4..]);
        let eof = |_: std::io::Error| corrupt("truncated end of central directory");

        Ok(Self {
            disk_number: cursor.read_u16::<LittleEndian>().map_err(eof)?,
            disk_with_cd: cursor.read_u16::<LittleEndian>().map_err(eof)?,
            disk_entries: cursor.read_u16::<LittleEndian>().map_err(eof)?,
            total_entries: cursor.read_u16::<LittleEndian>().map_err(eof)?,
            cd_size: cursor.read_u32::<LittleEndian>().map_err(eof)?,
            cd_offset: cursor.read_u32::<LittleEndian>().map_err(eof)?,
            comment_len: cursor.read_u16::<LittleEndian>().map_err(eof)?,
        })
    }

    pub fn is_zip64(&self) -> bool {
        self.disk_entries == 0xFFFF
            || self.total_entries == 0xFFFF
            || self.cd_size == 0xFFFFFFFF
            || self.cd_offset == 0xFFFFFFFF
    }
}

/// ZIP64 End of Central Directory Locator - 20 bytes
pub struct Zip64EOCDLocator {
    pub disk_with_eocd64: u32,
    pub eocd64_offset: u64,
    pub total_disks: u32,
}

impl Zip64EOCDLocator {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x07";
    pub const SIZE: usize = 20;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(corrupt("invalid ZIP64 locator"));
        }

        let mut cursor = Cursor::new(&data[4..]);
        let eof = |_: std::io::Error| corrupt("truncated ZIP64 locator");

        Ok(Self {
            disk_with_eocd64: cursor.read_u32::<LittleEndian>().map_err(eof)?,
            eocd64_offset: cursor.read_u64::<LittleEndian>().map_err(eof)?,
            total_disks: cursor.read_u32::<LittleEndian>().map_err(eof)?,
        })
    }
}

/// ZIP64 End of Central Directory - 56 bytes minimum
pub struct Zip64EOCD {
    pub eocd64_size: u64,
    pub version_made_by: u16,
    pub version_needed: u16,
    pub disk_number: u32,
    pub disk_with_cd: u32,
    pub disk_entries: u64,
    pub total_entries: u64,
    pub cd_size: u64,
    pub cd_offset: u64,
}

impl Zip64EOCD {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x06";
    pub const MIN_SIZE: usize = 56;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::MIN_SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(corrupt("invalid ZIP64 end of central directory"));
        }

        let mut cursor = Cursor::new(&data[4..]);
        let eof = |_: std::io::Error| corrupt("truncated ZIP64 end of central directory");

        Ok(Self {
            eocd64_size: cursor.read_u64::<LittleEndian>().map_err(eof)?,
            version_made_by: cursor.read_u16::<LittleEndian>().map_err(eof)?,
            version_needed: cursor.read_u16::<LittleEndian>().map_err(eof)?,
            disk_number: cursor.read_u32::<LittleEndian>().map_err(eof)?,
            disk_with_cd: cursor.read_u32::<LittleEndian>().map_err(eof)?,
            disk_entries: cursor.read_u64::<LittleEndian>().map_err(eof)?,
            total_entries: cursor.read_u64::<LittleEndian>().map_err(eof)?,
            cd_size: cursor.read_u64::<LittleEndian>().map_err(eof)?,
            cd_offset: cursor.read_u64::<LittleEndian>().map_err(eof)?,
        })
    }
}

/// Central Directory File Header (CDFH) - 46 bytes minimum
pub const CDFH_SIGNATURE: &[u8] = b"PK\x01\x02";
pub const CDFH_MIN_SIZE: usize = 46;

/// Local File Header (LFH) - 30 bytes
pub const LFH_SIGNATURE: &[u8] = b"PK\x03\x04";
pub const LFH_SIZE: usize = 30;

/// Host system value in the high byte of "version made by" for Unix.
const HOST_UNIX: u8 = 3;

/// File type mask and values of `st_mode`.
const S_IFMT: u32 = 0o170000;
const S_IFREG: u32 = 0o100000;
const S_IFDIR: u32 = 0o040000;

/// Whether a Unix host recorded the entry as a directory in its external
/// attributes.
pub(crate) fn is_unix_directory(version_made_by: u16, external_attrs: u32) -> bool {
    (version_made_by >> 8) as u8 == HOST_UNIX && (external_attrs >> 16) & S_IFMT == S_IFDIR
}

/// Parsed ZIP file entry information
#[derive(Debug, Clone)]
pub struct ZipFileEntry {
    pub file_name: String,
    pub version_made_by: u16,
    pub compression_method: CompressionMethod,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub crc32: u32,
    pub external_attrs: u32,
    pub lfh_offset: u64,
    pub is_directory: bool,
}

impl ZipFileEntry {
    /// Unix permission bits, when the archive was written on a Unix host and
    /// recorded them.
    pub fn unix_mode(&self) -> Option<u32> {
        if (self.version_made_by >> 8) as u8 != HOST_UNIX {
            return None;
        }
        match self.external_attrs >> 16 {
            0 => None,
            mode => Some(mode & 0o7777),
        }
    }

    /// Whether the entry is something other than a directory or regular
    /// file (symlink, device, fifo...) according to its Unix file type.
    pub fn is_special(&self) -> bool {
        if (self.version_made_by >> 8) as u8 != HOST_UNIX {
            return false;
        }
        let file_type = (self.external_attrs >> 16) & S_IFMT;
        file_type != 0 && file_type != S_IFREG && file_type != S_IFDIR
    }
}
