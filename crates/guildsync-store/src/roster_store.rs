//! Roster snapshot persistence as a flat CSV file.
//!
//! One header line followed by one row per member:
//!
//! ```text
//! uuid,ign,catacombs,skyblock_bracket,discord_username
//! 069a79f444e94726a5befca90e38aaf5,Steve,30-35,120-159,steve
//! ```
//!
//! The chat handle column holds the literal `null` when no account is
//! linked. Older files stored the raw skyblock level in the fourth column;
//! those values are normalized to bracket labels on load.
//!
//! The file is rewritten wholesale every run. The previous contents are
//! copied to a backup path first, on a best-effort basis.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use guildsync_core::skyblock_bracket;
use guildsync_types::{CatacombsBracket, PlayerId, PlayerRecord, RosterSnapshot, SkyblockBracket};
use tracing::{debug, info, warn};

use crate::error::StoreError;

/// Header line of the roster file.
pub const CSV_HEADER: &str = "uuid,ign,catacombs,skyblock_bracket,discord_username";

/// Chat handle column value meaning "no linked account".
pub const NULL_HANDLE: &str = "null";

/// The roster CSV file and its backup.
#[derive(Debug, Clone)]
pub struct RosterStore {
    path: PathBuf,
    backup_path: PathBuf,
}

impl RosterStore {
    /// Create a store over `path`, backing up to `backup_path` before writes.
    pub fn new(path: impl Into<PathBuf>, backup_path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup_path: backup_path.into(),
        }
    }

    /// Path of the live roster file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path the previous roster is copied to before each write.
    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Load the previous run's snapshot.
    ///
    /// A missing or unreadable file yields an empty snapshot: the first run
    /// simply treats everyone as new.
    pub async fn load(&self) -> RosterSnapshot {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => {
                let snapshot = parse_roster(&text);
                info!(
                    path = %self.path.display(),
                    members = snapshot.len(),
                    "loaded previous roster"
                );
                snapshot
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no previous roster, starting empty");
                RosterSnapshot::new()
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to read previous roster, starting empty"
                );
                RosterSnapshot::new()
            }
        }
    }

    /// Back up the current file, then overwrite it with `csv`.
    ///
    /// A failed backup is logged and does not prevent the write.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the new roster cannot be written.
    pub async fn persist(&self, csv: &RosterCsv) -> Result<(), StoreError> {
        match tokio::fs::copy(&self.path, &self.backup_path).await {
            Ok(bytes) => debug!(
                backup = %self.backup_path.display(),
                bytes,
                "backed up previous roster"
            ),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no previous roster to back up");
            }
            Err(e) => warn!(
                path = %self.path.display(),
                backup = %self.backup_path.display(),
                error = %e,
                "roster backup failed, overwriting anyway"
            ),
        }

        tokio::fs::write(&self.path, csv.render())
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;

        info!(
            path = %self.path.display(),
            rows = csv.row_count(),
            "wrote roster"
        );
        Ok(())
    }
}

/// In-memory roster file, filled in member processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterCsv {
    lines: Vec<String>,
}

impl RosterCsv {
    /// A buffer holding only the header line.
    pub fn new() -> Self {
        Self {
            lines: vec![CSV_HEADER.to_owned()],
        }
    }

    /// Append the row for `record`.
    pub fn push(&mut self, record: &PlayerRecord) {
        self.lines.push(format_row(record));
    }

    /// Number of member rows (header excluded).
    pub fn row_count(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    /// The full file contents.
    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

impl Default for RosterCsv {
    fn default() -> Self {
        Self::new()
    }
}

/// Render one member row.
pub fn format_row(record: &PlayerRecord) -> String {
    format!(
        "{},{},{},{},{}",
        record.id,
        record.display_name,
        record.catacombs,
        record.skyblock,
        record.chat_handle.as_deref().unwrap_or(NULL_HANDLE),
    )
}

/// Parse roster file contents into a snapshot.
///
/// The first line is the header. Rows that cannot be used are skipped with a
/// warning; a later row for the same id replaces an earlier one.
pub fn parse_roster(text: &str) -> RosterSnapshot {
    text.trim()
        .lines()
        .skip(1)
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| {
            let record = parse_row(line);
            if record.is_none() {
                warn!(row = index.saturating_add(1), line, "skipping malformed roster row");
            }
            record
        })
        .collect()
}

/// Parse a single row, or `None` if it lacks a usable id.
fn parse_row(line: &str) -> Option<PlayerRecord> {
    let columns: Vec<&str> = line.trim_end_matches('\r').split(',').collect();
    let [id, name, catacombs, skyblock, rest @ ..] = columns.as_slice() else {
        return None;
    };

    let id: PlayerId = id.parse().ok()?;

    let catacombs = catacombs.parse::<CatacombsBracket>().unwrap_or_else(|e| {
        warn!(%id, error = %e, "unknown catacombs bracket, using lowest");
        CatacombsBracket::default()
    });

    let skyblock = parse_skyblock_column(skyblock).unwrap_or_else(|| {
        warn!(%id, value = *skyblock, "unknown skyblock bracket, using lowest");
        SkyblockBracket::default()
    });

    let chat_handle = rest
        .first()
        .map(|h| h.trim())
        .filter(|h| !h.is_empty() && *h != NULL_HANDLE)
        .map(ToOwned::to_owned);

    Some(PlayerRecord {
        id,
        display_name: (*name).to_owned(),
        catacombs,
        skyblock,
        chat_handle,
    })
}

/// Accept either a bracket label or a legacy raw level.
fn parse_skyblock_column(value: &str) -> Option<SkyblockBracket> {
    value
        .parse::<SkyblockBracket>()
        .ok()
        .or_else(|| value.trim().parse::<u32>().ok().map(skyblock_bracket))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEVE: &str = "069a79f444e94726a5befca90e38aaf5";

    #[test]
    fn parses_current_format() {
        let text = format!("{CSV_HEADER}\n{STEVE},Steve,30-35,120-159,steve\n");
        let snapshot = parse_roster(&text);
        assert_eq!(snapshot.len(), 1);
        let record = snapshot.iter().next();
        assert_eq!(record.map(|r| r.catacombs), Some(CatacombsBracket::From30));
        assert_eq!(record.map(|r| r.skyblock.to_string()), Some("120-159".to_owned()));
        assert_eq!(record.and_then(|r| r.chat_handle.clone()), Some("steve".to_owned()));
    }

    #[test]
    fn normalizes_legacy_levels_and_null_handles() {
        let text = format!("{CSV_HEADER}\n{STEVE},Steve,Below 30,243,null");
        let snapshot = parse_roster(&text);
        let record = snapshot.iter().next();
        assert_eq!(record.map(|r| r.skyblock.to_string()), Some("240-279".to_owned()));
        assert_eq!(record.and_then(|r| r.chat_handle.clone()), None);
    }

    #[test]
    fn four_column_rows_have_no_handle() {
        let text = format!("{CSV_HEADER}\r\n{STEVE},Steve,MAX,0-39\r\n");
        let snapshot = parse_roster(&text);
        let record = snapshot.iter().next();
        assert_eq!(record.map(|r| r.catacombs), Some(CatacombsBracket::Max));
        assert_eq!(record.and_then(|r| r.chat_handle.clone()), None);
    }

    #[test]
    fn skips_rows_without_a_valid_id() {
        let text = format!("{CSV_HEADER}\nnot-a-uuid,Steve,MAX,0-39,null\n{STEVE},Steve\n");
        assert!(parse_roster(&text).is_empty());
    }

    #[test]
    fn header_only_file_is_empty() {
        assert!(parse_roster(CSV_HEADER).is_empty());
        assert!(parse_roster("").is_empty());
    }

    #[test]
    fn rows_round_trip_through_the_buffer() {
        let record = PlayerRecord {
            id: STEVE.parse().unwrap_or_else(|_| PlayerId(uuid::Uuid::nil())),
            display_name: "Steve".to_owned(),
            catacombs: CatacombsBracket::From45,
            skyblock: SkyblockBracket::containing(481),
            chat_handle: None,
        };
        let mut csv = RosterCsv::new();
        csv.push(&record);
        assert_eq!(csv.row_count(), 1);
        assert_eq!(
            csv.render(),
            format!("{CSV_HEADER}\n{STEVE},Steve,45-50,480-519,null")
        );
        let parsed = parse_roster(&csv.render());
        assert_eq!(parsed.get(&record.id), Some(&record));
    }
}
