//! Roster records and snapshots.

use std::collections::BTreeMap;

use crate::brackets::{CatacombsBracket, SkyblockBracket};
use crate::ids::PlayerId;

/// Display name stored when the identity resolver could not name a player.
pub const UNRESOLVED_NAME: &str = "unresolved";

/// One guild member as known at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRecord {
    /// Stable player identifier.
    pub id: PlayerId,
    /// In-game name, or [`UNRESOLVED_NAME`].
    pub display_name: String,
    /// Catacombs level bracket.
    pub catacombs: CatacombsBracket,
    /// Skyblock level bracket.
    pub skyblock: SkyblockBracket,
    /// Username of the linked chat account, if any.
    pub chat_handle: Option<String>,
}

impl PlayerRecord {
    /// Whether the display name was resolved this run.
    pub fn has_resolved_name(&self) -> bool {
        is_resolved_name(&self.display_name)
    }
}

/// Whether `name` is a real display name rather than the sentinel.
pub fn is_resolved_name(name: &str) -> bool {
    !name.is_empty() && name != UNRESOLVED_NAME
}

/// The full roster as of one run, keyed by player id.
///
/// The key set defines membership: absent from the current snapshot means
/// the player left, absent from the previous one means they joined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterSnapshot {
    records: BTreeMap<PlayerId, PlayerRecord>,
}

impl RosterSnapshot {
    /// Create an empty snapshot.
    pub const fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// Insert or replace the record for its player id.
    pub fn insert(&mut self, record: PlayerRecord) -> Option<PlayerRecord> {
        self.records.insert(record.id, record)
    }

    /// Look up a player's record.
    pub fn get(&self, id: &PlayerId) -> Option<&PlayerRecord> {
        self.records.get(id)
    }

    /// Whether the player is a member in this snapshot.
    pub fn contains(&self, id: &PlayerId) -> bool {
        self.records.contains_key(id)
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot has no members.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in player id order.
    pub fn iter(&self) -> impl Iterator<Item = &PlayerRecord> {
        self.records.values()
    }
}

impl FromIterator<PlayerRecord> for RosterSnapshot {
    fn from_iter<I: IntoIterator<Item = PlayerRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().map(|r| (r.id, r)).collect(),
        }
    }
}
