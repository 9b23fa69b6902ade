#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tar::{Builder, EntryType, Header};

#[path = "../../src/zip/builder.rs"]
mod zip_builder;

pub use zip_builder::ZipBuilder;

/// Write a ZIP of `(name, contents)` pairs; names ending in `/` are
/// directories. Non-empty files are deflated, and names are written verbatim.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    entries
        .iter()
        .fold(ZipBuilder::new(), |zip, (name, data)| {
            if data.is_empty() {
                zip.stored(name, data)
            } else {
                zip.deflated(name, data)
            }
        })
        .finish()
}

/// Write a TAR of `(name, contents)` pairs; names ending in `/` are
/// directories. Names are written into the header verbatim.
pub fn tar_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = Builder::new(Vec::new());
    for (name, data) in entries {
        let mut header = Header::new_old();
        if name.ends_with('/') {
            header.set_entry_type(EntryType::Directory);
            header.set_mode(0o755);
        } else {
            header.set_entry_type(EntryType::Regular);
            header.set_mode(0o644);
        }
        header.set_size(data.len() as u64);
        let raw = name.as_bytes();
        header.as_old_mut().name[..raw.len()].copy_from_slice(raw);
        header.set_cksum();
        builder.append(&header, *data).unwrap();
    }
    builder.into_inner().unwrap()
}

pub fn write_archive(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// The scratch directory announced on the first output line.
pub fn announced_dir(output: &str) -> PathBuf {
    let first = output.lines().next().expect("no output");
    let dir = first
        .strip_prefix("Extracted directory: ")
        .expect("first line announces the extracted directory");
    PathBuf::from(dir)
}

/// Output lines after the announcement.
pub fn match_lines(output: &str) -> Vec<&str> {
    output.lines().skip(1).collect()
}
