use std::path::Path;

use crate::error::{Error, Result};

/// Archive container formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
}

impl ArchiveFormat {
    /// Pick the format from the final extension of `path`.
    ///
    /// The match is exact: `logs.zip` is a ZIP archive, `logs.ZIP` and
    /// `logs.tar.gz` are rejected.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("zip") => Ok(Self::Zip),
            Some("tar") => Ok(Self::Tar),
            _ => Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Prefix for the scratch directory an archive of this format lands in.
    pub fn temp_prefix(self) -> &'static str {
        match self {
            Self::Zip => "logs_unzip_",
            Self::Tar => "logs_untar_",
        }
    }
}
