//! Error types for the flat-file stores.
//!
//! All errors are propagated via [`StoreError`], which carries the path of
//! the file involved so log lines point at something an operator can open.

use std::path::PathBuf;

/// Errors that can occur reading or writing the flat files.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A filesystem operation failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File the operation targeted.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A JSON document could not be parsed or written.
    #[error("JSON error in {path}: {source}")]
    Json {
        /// File the document came from.
        path: PathBuf,
        /// The underlying serialization error.
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a JSON error with the path it happened on.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
