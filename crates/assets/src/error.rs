//! Asset collection error types.

use std::path::PathBuf;

/// Errors produced while collecting assets.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("error reading directory ({}): {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error reading file ({}): {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AssetError {
    /// The underlying I/O error.
    pub fn io(&self) -> &std::io::Error {
        match self {
            AssetError::ReadDir { source, .. } | AssetError::ReadFile { source, .. } => source,
        }
    }
}
