//! In-memory ZIP writer for tests, shared with the integration tests.

#![allow(dead_code)]

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::Crc;
use flate2::write::DeflateEncoder;

const SATURATED: u32 = 0xFFFF_FFFF;

struct Pending {
    name: String,
    method: u16,
    crc: u32,
    size: u32,
    payload: Vec<u8>,
    mode: Option<u32>,
}

/// Writes small archives in memory, including names a well-behaved
/// writer would refuse.
#[derive(Default)]
pub struct ZipBuilder {
    entries: Vec<Pending>,
    comment: Vec<u8>,
    zip64: bool,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, name: &str, method: u16, data: &[u8], mode: Option<u32>) -> Self {
        let mut crc = Crc::new();
        crc.update(data);
        let payload = if method == 8 {
            let mut encoder = DeflateEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(data).unwrap();
            encoder.finish().unwrap()
        } else {
            data.to_vec()
        };
        self.entries.push(Pending {
            name: name.to_string(),
            method,
            crc: crc.sum(),
            size: data.len() as u32,
            payload,
            mode,
        });
        self
    }

    pub fn dir(self, name: &str) -> Self {
        self.push(name, 0, b"", None)
    }

    pub fn stored(self, name: &str, data: &[u8]) -> Self {
        self.push(name, 0, data, None)
    }

    pub fn deflated(self, name: &str, data: &[u8]) -> Self {
        self.push(name, 8, data, None)
    }

    /// Entry carrying a full Unix `st_mode` in its external attributes.
    pub fn unix(self, name: &str, data: &[u8], st_mode: u32) -> Self {
        self.push(name, 0, data, Some(st_mode))
    }

    /// Entry with an arbitrary compression method id.
    pub fn method(self, name: &str, method: u16, data: &[u8]) -> Self {
        self.push(name, method, data, None)
    }

    /// Entry whose payload is written as given, claiming `size` decoded
    /// bytes and a zero CRC.
    pub fn raw(mut self, name: &str, method: u16, payload: &[u8], size: u32) -> Self {
        self.entries.push(Pending {
            name: name.to_string(),
            method,
            crc: 0,
            size,
            payload: payload.to_vec(),
            mode: None,
        });
        self
    }

    pub fn comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }

    /// Write every size and offset through ZIP64 records: saturated 32-bit
    /// fields, a 0x0001 extra field per entry, and a ZIP64 end record plus
    /// locator ahead of the regular one.
    pub fn zip64(mut self) -> Self {
        self.zip64 = true;
        self
    }

    /// Flip the stored CRC of the last entry.
    pub fn corrupt_crc(mut self) -> Self {
        if let Some(last) = self.entries.last_mut() {
            last.crc ^= 0xFFFF_FFFF;
        }
        self
    }

    pub fn finish(self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut central = Vec::new();

        for entry in &self.entries {
            let offset = out.len() as u64;
            let name = entry.name.as_bytes();
            let compressed = entry.payload.len() as u64;

            let (lfh_sizes, lfh_extra) = if self.zip64 {
                let mut extra = Vec::new();
                extra.write_u16::<LittleEndian>(0x0001).unwrap();
                extra.write_u16::<LittleEndian>(16).unwrap();
                extra.write_u64::<LittleEndian>(entry.size as u64).unwrap();
                extra.write_u64::<LittleEndian>(compressed).unwrap();
                ((SATURATED, SATURATED), extra)
            } else {
                ((compressed as u32, entry.size), Vec::new())
            };

            out.write_all(b"PK\x03\x04").unwrap();
            out.write_u16::<LittleEndian>(if self.zip64 { 45 } else { 20 }).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            out.write_u16::<LittleEndian>(entry.method).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            out.write_u16::<LittleEndian>(0x21).unwrap();
            out.write_u32::<LittleEndian>(entry.crc).unwrap();
            out.write_u32::<LittleEndian>(lfh_sizes.0).unwrap();
            out.write_u32::<LittleEndian>(lfh_sizes.1).unwrap();
            out.write_u16::<LittleEndian>(name.len() as u16).unwrap();
            out.write_u16::<LittleEndian>(lfh_extra.len() as u16).unwrap();
            out.write_all(name).unwrap();
            out.write_all(&lfh_extra).unwrap();
            out.write_all(&entry.payload).unwrap();

            let (made_by, attrs) = match entry.mode {
                Some(mode) => (0x031E, mode << 16),
                None => (0x0014, 0),
            };
            let (cd_fields, cd_extra) = if self.zip64 {
                let mut extra = Vec::new();
                extra.write_u16::<LittleEndian>(0x0001).unwrap();
                extra.write_u16::<LittleEndian>(24).unwrap();
                extra.write_u64::<LittleEndian>(entry.size as u64).unwrap();
                extra.write_u64::<LittleEndian>(compressed).unwrap();
                extra.write_u64::<LittleEndian>(offset).unwrap();
                ((SATURATED, SATURATED, SATURATED), extra)
            } else {
                ((compressed as u32, entry.size, offset as u32), Vec::new())
            };

            central.write_all(b"PK\x01\x02").unwrap();
            central.write_u16::<LittleEndian>(made_by).unwrap();
            central.write_u16::<LittleEndian>(if self.zip64 { 45 } else { 20 }).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u16::<LittleEndian>(entry.method).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u16::<LittleEndian>(0x21).unwrap();
            central.write_u32::<LittleEndian>(entry.crc).unwrap();
            central.write_u32::<LittleEndian>(cd_fields.0).unwrap();
            central.write_u32::<LittleEndian>(cd_fields.1).unwrap();
            central.write_u16::<LittleEndian>(name.len() as u16).unwrap();
            central.write_u16::<LittleEndian>(cd_extra.len() as u16).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u16::<LittleEndian>(0).unwrap();
            central.write_u32::<LittleEndian>(attrs).unwrap();
            central.write_u32::<LittleEndian>(cd_fields.2).unwrap();
            central.write_all(name).unwrap();
            central.write_all(&cd_extra).unwrap();
        }

        let cd_offset = out.len() as u64;
        let count = self.entries.len() as u64;
        out.write_all(&central).unwrap();

        if self.zip64 {
            let eocd64_offset = out.len() as u64;
            out.write_all(b"PK\x06\x06").unwrap();
            out.write_u64::<LittleEndian>(44).unwrap();
            out.write_u16::<LittleEndian>(45).unwrap();
            out.write_u16::<LittleEndian>(45).unwrap();
            out.write_u32::<LittleEndian>(0).unwrap();
            out.write_u32::<LittleEndian>(0).unwrap();
            out.write_u64::<LittleEndian>(count).unwrap();
            out.write_u64::<LittleEndian>(count).unwrap();
            out.write_u64::<LittleEndian>(central.len() as u64).unwrap();
            out.write_u64::<LittleEndian>(cd_offset).unwrap();

            out.write_all(b"PK\x06\x07").unwrap();
            out.write_u32::<LittleEndian>(0).unwrap();
            out.write_u64::<LittleEndian>(eocd64_offset).unwrap();
            out.write_u32::<LittleEndian>(1).unwrap();
        }

        let (eocd_count, eocd_size, eocd_offset) = if self.zip64 {
            (0xFFFF, SATURATED, SATURATED)
        } else {
            (count as u16, central.len() as u32, cd_offset as u32)
        };
        out.write_all(b"PK\x05\x06").unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(eocd_count).unwrap();
        out.write_u16::<LittleEndian>(eocd_count).unwrap();
        out.write_u32::<LittleEndian>(eocd_size).unwrap();
        out.write_u32::<LittleEndian>(eocd_offset).unwrap();
        out.write_u16::<LittleEndian>(self.comment.len() as u16).unwrap();
        out.write_all(&self.comment).unwrap();
        out
    }
}
