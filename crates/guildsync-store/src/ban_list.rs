//! The ban list: a JSON array of player ids maintained by hand.
//!
//! This process only reads it. When the file is missing it is created empty
//! so operators have something to edit.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use guildsync_types::PlayerId;
use tracing::{info, warn};

use crate::error::StoreError;

/// The banned-player JSON file.
#[derive(Debug, Clone)]
pub struct BanListStore {
    path: PathBuf,
}

impl BanListStore {
    /// Create a store over `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the ban list file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the banned ids, creating an empty list if the file is missing.
    ///
    /// A file that exists but cannot be parsed is left untouched and treated
    /// as empty for this run.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be read, or
    /// if the missing file cannot be created.
    pub async fn load_or_init(&self) -> Result<BTreeSet<PlayerId>, StoreError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tokio::fs::write(&self.path, "[]")
                    .await
                    .map_err(|e| StoreError::io(&self.path, e))?;
                info!(path = %self.path.display(), "created empty ban list");
                return Ok(BTreeSet::new());
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        match parse_ban_list(&text) {
            Ok(banned) => {
                info!(path = %self.path.display(), banned = banned.len(), "loaded ban list");
                Ok(banned)
            }
            Err(e) => {
                let e = StoreError::json(&self.path, e);
                warn!(error = %e, "ignoring unreadable ban list");
                Ok(BTreeSet::new())
            }
        }
    }
}

/// Parse a JSON array of player id strings.
pub fn parse_ban_list(text: &str) -> Result<BTreeSet<PlayerId>, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dashless_and_dashed_ids() {
        let text = r#"["069a79f444e94726a5befca90e38aaf5", "853c80ef-3c37-49fd-aa49-938b674adae6"]"#;
        let banned = parse_ban_list(text).unwrap_or_default();
        assert_eq!(banned.len(), 2);
        let steve: Option<PlayerId> = "069a79f444e94726a5befca90e38aaf5".parse().ok();
        assert!(steve.is_some_and(|id| banned.contains(&id)));
    }

    #[test]
    fn empty_array_is_empty_set() {
        assert_eq!(parse_ban_list("[]").map(|b| b.len()).ok(), Some(0));
    }

    #[test]
    fn rejects_non_ids() {
        assert!(parse_ban_list(r#"["nope"]"#).is_err());
        assert!(parse_ban_list("{").is_err());
    }
}
