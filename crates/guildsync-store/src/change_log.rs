//! Append-only change log, one timestamped line per notification.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::io::AsyncWriteExt;

use crate::error::StoreError;

/// The change log text file.
#[derive(Debug, Clone)]
pub struct ChangeLog {
    path: PathBuf,
}

impl ChangeLog {
    /// Create a log appending to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `message` stamped with `at`, creating the file if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be opened or written.
    pub async fn append(&self, message: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        file.write_all(format_line(message, at).as_bytes())
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        file.flush().await.map_err(|e| StoreError::io(&self.path, e))
    }
}

/// Render one log line, newline included.
pub fn format_line(message: &str, at: DateTime<Utc>) -> String {
    format!("[{}] {message}\n", at.to_rfc3339_opts(SecondsFormat::Millis, true))
}
