// Storage error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while resolving or accessing stored files
#[derive(Error, Debug)]
pub enum StorageError {
    /// The requested name would not resolve to a single file inside the base directory.
    #[error("invalid file name '{name}': {reason}")]
    InvalidName {
        /// The name as received from the client.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Any filesystem failure other than a missing file on read.
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        /// The resolved path the operation targeted.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
