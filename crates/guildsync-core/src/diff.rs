//! Snapshot differ and the change events it produces.
//!
//! Comparing the previous run's roster with the current one yields an
//! ordered list of [`ChangeEvent`]s. Emission order is fixed so that runs
//! are reproducible:
//!
//! 1. arrivals (in the current snapshot only)
//! 2. departures (in the previous snapshot only)
//! 3. bracket changes for players in both, catacombs before skyblock
//!
//! Field comparison is exact; a bracket read back with a different label is
//! a change.

use core::fmt;

use guildsync_types::{CatacombsBracket, PlayerId, RosterSnapshot, SkyblockBracket};
use tracing::debug;

/// A notable roster change, rendered as one notification line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A player joined the guild since the previous run.
    Joined {
        /// Player that joined.
        id: PlayerId,
        /// Their display name this run.
        name: String,
    },
    /// A player left the guild since the previous run.
    Left {
        /// Player that left.
        id: PlayerId,
        /// Their last known display name.
        name: String,
    },
    /// A member moved into a different catacombs bracket.
    CatacombsReached {
        /// Member concerned.
        id: PlayerId,
        /// Their display name this run.
        name: String,
        /// The bracket they are now in.
        bracket: CatacombsBracket,
    },
    /// A member moved into a different skyblock bracket.
    SkyblockReached {
        /// Member concerned.
        id: PlayerId,
        /// Their display name this run.
        name: String,
        /// The bracket they are now in.
        bracket: SkyblockBracket,
    },
    /// A linked member changed their in-game name.
    NameChanged {
        /// Member concerned.
        id: PlayerId,
        /// Name recorded by the previous run.
        old_name: String,
        /// Name resolved this run.
        new_name: String,
    },
    /// A player on the ban list is in the guild.
    BannedMemberDetected {
        /// Banned player.
        id: PlayerId,
        /// Their display name this run.
        name: String,
    },
}

impl ChangeEvent {
    /// The player the event concerns.
    pub const fn player(&self) -> PlayerId {
        match self {
            Self::Joined { id, .. }
            | Self::Left { id, .. }
            | Self::CatacombsReached { id, .. }
            | Self::SkyblockReached { id, .. }
            | Self::NameChanged { id, .. }
            | Self::BannedMemberDetected { id, .. } => *id,
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Joined { name, .. } => {
                write!(f, "Welcome {name}! Glad to have you in the guild.")
            }
            Self::Left { name, .. } => write!(f, "{name} left the guild."),
            Self::CatacombsReached { name, bracket, .. } => write!(
                f,
                "Congratulations {name} on reaching catacombs bracket {bracket}! Enjoy your new role!"
            ),
            Self::SkyblockReached { name, bracket, .. } => write!(
                f,
                "Congratulations {name} on reaching skyblock bracket {bracket}! Enjoy your new role!"
            ),
            Self::NameChanged {
                old_name, new_name, ..
            } => write!(f, "{old_name} changed their display name to {new_name}."),
            Self::BannedMemberDetected { id, name } => {
                write!(f, "Banned player detected in guild: {name} ({id})")
            }
        }
    }
}

/// Compare two roster snapshots and list the changes between them.
///
/// Identical snapshots produce no events.
pub fn diff_snapshots(previous: &RosterSnapshot, current: &RosterSnapshot) -> Vec<ChangeEvent> {
    let mut events = Vec::new();

    events.extend(
        current
            .iter()
            .filter(|record| !previous.contains(&record.id))
            .map(|record| ChangeEvent::Joined {
                id: record.id,
                name: record.display_name.clone(),
            }),
    );

    events.extend(
        previous
            .iter()
            .filter(|record| !current.contains(&record.id))
            .map(|record| ChangeEvent::Left {
                id: record.id,
                name: record.display_name.clone(),
            }),
    );

    for now in current.iter() {
        let Some(before) = previous.get(&now.id) else {
            continue;
        };
        if before.catacombs != now.catacombs {
            events.push(ChangeEvent::CatacombsReached {
                id: now.id,
                name: now.display_name.clone(),
                bracket: now.catacombs,
            });
        }
        if before.skyblock != now.skyblock {
            events.push(ChangeEvent::SkyblockReached {
                id: now.id,
                name: now.display_name.clone(),
                bracket: now.skyblock,
            });
        }
    }

    debug!(
        previous = previous.len(),
        current = current.len(),
        events = events.len(),
        "snapshot diff computed"
    );
    events
}

#[cfg(test)]
mod tests {
    use guildsync_types::PlayerRecord;
    use uuid::Uuid;

    use super::*;

    fn record(n: u128, name: &str, catacombs: CatacombsBracket, level: u32) -> PlayerRecord {
        PlayerRecord {
            id: PlayerId(Uuid::from_u128(n)),
            display_name: name.to_owned(),
            catacombs,
            skyblock: SkyblockBracket::containing(level),
            chat_handle: None,
        }
    }

    #[test]
    fn identical_snapshots_produce_nothing() {
        let snapshot: RosterSnapshot = [
            record(1, "Steve", CatacombsBracket::From30, 120),
            record(2, "Alex", CatacombsBracket::Below30, 10),
        ]
        .into_iter()
        .collect();
        assert!(diff_snapshots(&snapshot, &snapshot).is_empty());
    }

    #[test]
    fn single_bracket_change_is_one_event() {
        let previous: RosterSnapshot =
            [record(1, "Steve", CatacombsBracket::From30, 120)].into_iter().collect();
        let current: RosterSnapshot =
            [record(1, "Steve", CatacombsBracket::From35, 120)].into_iter().collect();

        let events = diff_snapshots(&previous, &current);
        assert_eq!(events.len(), 1);
        assert_eq!(
            events.first(),
            Some(&ChangeEvent::CatacombsReached {
                id: PlayerId(Uuid::from_u128(1)),
                name: "Steve".to_owned(),
                bracket: CatacombsBracket::From35,
            })
        );
        let message = events.first().map(ToString::to_string).unwrap_or_default();
        assert!(message.contains("35-40"));
    }

    #[test]
    fn both_axes_can_fire_for_one_member() {
        let previous: RosterSnapshot =
            [record(1, "Steve", CatacombsBracket::From30, 120)].into_iter().collect();
        let current: RosterSnapshot =
            [record(1, "Steve", CatacombsBracket::From35, 160)].into_iter().collect();

        let events = diff_snapshots(&previous, &current);
        assert_eq!(events.len(), 2);
        assert!(matches!(events.first(), Some(ChangeEvent::CatacombsReached { .. })));
        assert!(matches!(events.get(1), Some(ChangeEvent::SkyblockReached { .. })));
    }

    #[test]
    fn phases_are_ordered_arrivals_departures_changes() {
        let previous: RosterSnapshot = [
            record(1, "Stays", CatacombsBracket::Below30, 0),
            record(2, "Leaves", CatacombsBracket::Below30, 0),
        ]
        .into_iter()
        .collect();
        let current: RosterSnapshot = [
            record(1, "Stays", CatacombsBracket::Max, 0),
            record(3, "Arrives", CatacombsBracket::Below30, 0),
        ]
        .into_iter()
        .collect();

        let rendered: Vec<String> = diff_snapshots(&previous, &current)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            rendered,
            vec![
                "Welcome Arrives! Glad to have you in the guild.".to_owned(),
                "Leaves left the guild.".to_owned(),
                "Congratulations Stays on reaching catacombs bracket MAX! Enjoy your new role!"
                    .to_owned(),
            ]
        );
    }

    #[test]
    fn arrival_from_empty_previous() {
        let current: RosterSnapshot =
            [record(7, "Steve", CatacombsBracket::Below30, 0)].into_iter().collect();
        let events = diff_snapshots(&RosterSnapshot::new(), &current);
        assert_eq!(events.len(), 1);
        let message = events.first().map(ToString::to_string).unwrap_or_default();
        assert!(message.starts_with("Welcome Steve!"));
    }
}
