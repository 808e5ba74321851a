//! Error types for the sync runner.
//!
//! Uses `thiserror` for typed errors that surface through the whole run:
//! configuration, game API calls, chat API calls and the flat-file stores.
//! Every error has a [`Severity`]; only fatal errors end a run.

use guildsync_store::StoreError;

/// How far an error propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Log it, fall back to a default or skip the step, and keep going.
    Recoverable,
    /// Abort the run and exit non-zero.
    Fatal,
}

/// Errors that can occur during a sync run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// The configured game guild does not exist.
    #[error("guild not found: {0}")]
    GuildNotFound(String),

    /// The guild roster could not be fetched or was malformed.
    #[error("roster fetch failed: {0}")]
    Roster(String),

    /// An HTTP call failed or returned a non-success status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// An API answered successfully but not in the expected shape.
    #[error("unexpected API response: {0}")]
    Api(String),

    /// The chat bot lacks a permission for the attempted mutation.
    #[error("missing chat permission: {0}")]
    ChatPermission(String),

    /// A flat-file store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A message pattern failed to compile.
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

impl RunnerError {
    /// Whether this error ends the run.
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Config(_) | Self::GuildNotFound(_) | Self::Roster(_) => Severity::Fatal,
            Self::Http(_)
            | Self::Api(_)
            | Self::ChatPermission(_)
            | Self::Store(_)
            | Self::Serde(_)
            | Self::Pattern(_) => Severity::Recoverable,
        }
    }

    /// Shorthand for `severity() == Severity::Fatal`.
    pub const fn is_fatal(&self) -> bool {
        matches!(self.severity(), Severity::Fatal)
    }
}

/// Turn a recoverable failure into `fallback`, passing fatal ones through.
///
/// The recoverable error is logged at `warn` with `context`.
pub fn recover<T>(result: Result<T, RunnerError>, fallback: T, context: &str) -> Result<T, RunnerError> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            tracing::warn!(error = %e, context, "recoverable failure, using fallback");
            Ok(fallback)
        }
    }
}
