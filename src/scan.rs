//! Streaming keyword search over text files.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Words whose presence marks a line as interesting. Matched case-insensitively.
pub const KEYWORDS: [&str; 2] = ["error", "timeout"];

/// Longest line, in bytes and excluding its terminator, a scan will buffer.
pub const MAX_LINE_LEN: usize = 1024 * 1024;

/// One line of a scanned file that mentions a keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanMatch {
    pub source_path: PathBuf,
    /// 1-based physical line number.
    pub line_number: usize,
    pub line_text: String,
}

impl fmt::Display for ScanMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}]: {}",
            self.source_path.display(),
            self.line_number,
            self.line_text
        )
    }
}

/// Whether `line` contains any of [`KEYWORDS`], ignoring case.
pub fn is_match(line: &str) -> bool {
    let lowered = line.to_lowercase();
    KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

/// Open `path` for scanning.
///
/// Nothing is read until the returned iterator is advanced.
pub fn scan(path: &Path) -> Result<Matches<BufReader<File>>> {
    let file = File::open(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Matches::new(path, BufReader::new(file)))
}

/// Lazy, single-pass iterator over the matching lines of one file.
///
/// Lines are split on `\n` with a trailing `\r` dropped; invalid UTF-8 is
/// replaced rather than rejected. A line longer than [`MAX_LINE_LEN`] is a
/// read error (`InvalidData`) instead of being buffered whole. After a read
/// error the iterator yields that error once and then ends.
pub struct Matches<R> {
    path: PathBuf,
    reader: R,
    buf: Vec<u8>,
    line_number: usize,
    done: bool,
}

impl<R: BufRead> Matches<R> {
    pub fn new(path: &Path, reader: R) -> Self {
        Self {
            path: path.to_path_buf(),
            reader,
            buf: Vec::new(),
            line_number: 0,
            done: false,
        }
    }

    /// Number of lines consumed so far.
    pub fn lines_read(&self) -> usize {
        self.line_number
    }

    fn next_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        let limit = MAX_LINE_LEN as u64 + 2;
        if (&mut self.reader).take(limit).read_until(b'\n', &mut self.buf)? == 0 {
            return Ok(None);
        }
        let content_len = match self.buf.last() {
            Some(b'\n') if self.buf.ends_with(b"\r\n") => self.buf.len() - 2,
            Some(b'\n') => self.buf.len() - 1,
            _ => self.buf.len(),
        };
        if content_len > MAX_LINE_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "line {} is longer than {MAX_LINE_LEN} bytes",
                    self.line_number + 1
                ),
            ));
        }
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

impl<R: BufRead> Iterator for Matches<R> {
    type Item = Result<ScanMatch>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.next_line() {
                Ok(Some(line)) => {
                    self.line_number += 1;
                    if is_match(&line) {
                        return Some(Ok(ScanMatch {
                            source_path: self.path.clone(),
                            line_number: self.line_number,
                            line_text: line,
                        }));
                    }
                }
                Ok(None) => self.done = true,
                Err(source) => {
                    self.done = true;
                    return Some(Err(Error::Read {
                        path: self.path.clone(),
                        source,
                    }));
                }
            }
        }
        None
    }
}
