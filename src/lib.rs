//! # logsift
//!
//! Extracts a ZIP or TAR archive into a scratch directory, walks the
//! extracted tree and reports every line of its `.log` / `.txt` files that
//! mentions `error` or `timeout`.
//!
//! ## Features
//!
//! - ZIP archives, including ZIP64, with STORED and DEFLATE entries checked against their CRC-32
//! - Plain (uncompressed) TAR archives
//! - Entries that would land outside the scratch directory abort the extraction
//! - Log files are streamed line by line, never loaded whole
//! - The scratch directory is always removed, whatever the outcome
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use logsift::Pipeline;
//!
//! fn main() -> anyhow::Result<()> {
//!     let stdout = std::io::stdout();
//!     let mut pipeline = Pipeline::new(stdout.lock());
//!     let summary = pipeline.run(Path::new("support-bundle.zip"))?;
//!     eprintln!("{} matching lines", summary.matches);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod extract;
pub mod format;
pub mod io;
pub mod pipeline;
pub mod sandbox;
pub mod scan;
pub mod tar;
pub mod walk;
pub mod zip;

pub use cli::Cli;
pub use error::{Error, ExtractError, Result};
pub use extract::{ExtractStats, ExtractedTree, Extractor, extract};
pub use format::ArchiveFormat;
pub use pipeline::{Pipeline, RunSummary};
pub use scan::{KEYWORDS, MAX_LINE_LEN, Matches, ScanMatch, scan};
pub use crate::tar::TarExtractor;
pub use walk::walk;
pub use crate::zip::{ZipExtractor, ZipFileEntry};
