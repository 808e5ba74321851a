//! Flat-file persistence for the guild roster sync.
//!
//! Three files live in the data directory, none of them transactional: a
//! crash mid-run leaves the previous roster in place.
//!
//! ```text
//! DATA_DIR/
//!     guild_members.csv       roster snapshot   (RosterStore)
//!     guild_members_old.csv   previous roster   (RosterStore backup)
//!     banned_players.json     banned player ids (BanListStore)
//!     changes_log.txt         notifications     (ChangeLog)
//! ```
//!
//! # Modules
//!
//! - [`roster_store`] -- Roster CSV load, render and backup-then-write
//! - [`ban_list`] -- Read-only JSON ban list, initialized empty if missing
//! - [`change_log`] -- Append-only change log
//! - [`error`] -- Shared error types

pub mod ban_list;
pub mod change_log;
pub mod error;
pub mod roster_store;

use std::path::Path;

// Re-export primary types for convenience.
pub use ban_list::BanListStore;
pub use change_log::ChangeLog;
pub use error::StoreError;
pub use roster_store::{CSV_HEADER, RosterCsv, RosterStore};

/// Roster file name inside the data directory.
pub const ROSTER_FILE: &str = "guild_members.csv";

/// Roster backup file name inside the data directory.
pub const ROSTER_BACKUP_FILE: &str = "guild_members_old.csv";

/// Ban list file name inside the data directory.
pub const BAN_LIST_FILE: &str = "banned_players.json";

/// Change log file name inside the data directory.
pub const CHANGE_LOG_FILE: &str = "changes_log.txt";

/// All stores, rooted at one data directory.
#[derive(Debug, Clone)]
pub struct DataDir {
    /// Roster snapshot and its backup.
    pub roster: RosterStore,
    /// Banned player ids.
    pub ban_list: BanListStore,
    /// Notification log.
    pub change_log: ChangeLog,
}

impl DataDir {
    /// Lay out the standard file names under `dir`.
    pub fn new(dir: &Path) -> Self {
        Self {
            roster: RosterStore::new(dir.join(ROSTER_FILE), dir.join(ROSTER_BACKUP_FILE)),
            ban_list: BanListStore::new(dir.join(BAN_LIST_FILE)),
            change_log: ChangeLog::new(dir.join(CHANGE_LOG_FILE)),
        }
    }
}
