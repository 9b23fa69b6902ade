use std::io;
use std::path::PathBuf;

/// Failure of a whole pipeline run, tagged with the stage that failed.
///
/// `Display` names the stage only; the underlying cause is reached through
/// [`source`](std::error::Error::source), so a chain renders each cause once.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported file type '{}': only .zip and .tar are supported", .path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("extraction error")]
    Extraction(#[from] ExtractError),

    #[error("destination directory does not exist: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("read error in '{}'", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("traversal error")]
    Traversal(#[source] Box<Error>),

    #[error("output error")]
    Output(#[source] io::Error),
}

/// Failure while materializing archive entries on disk.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("corrupt archive: {0}")]
    Corrupt(String),

    #[error("entry '{entry}' resolves outside the destination directory")]
    PathTraversal { entry: String },

    #[error("entry '{entry}' uses unsupported compression method {method}")]
    UnsupportedCompression { entry: String, method: u16 },

    #[error("checksum mismatch for '{entry}': expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        entry: String,
        expected: u32,
        actual: u32,
    },
}

impl ExtractError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
