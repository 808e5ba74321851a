//! Shared type definitions for the guild roster synchronization job.
//!
//! Every crate in the workspace speaks in these types: the store reads and
//! writes them, the core computes and diffs them, and the runner fills them
//! from the game and chat APIs.
//!
//! # Modules
//!
//! - [`ids`] -- Player UUIDs and Discord snowflake wrappers
//! - [`brackets`] -- Catacombs and skyblock level brackets
//! - [`record`] -- Per-player records and roster snapshots

pub mod brackets;
pub mod ids;
pub mod record;

// Re-export all public types at crate root for convenience.
pub use brackets::{BracketParseError, CatacombsBracket, SKYBLOCK_BRACKET_WIDTH, SkyblockBracket};
pub use ids::{ChannelId, ChatUserId, IdParseError, MessageId, PlayerId, RoleId, ServerId};
pub use record::{PlayerRecord, RosterSnapshot, UNRESOLVED_NAME, is_resolved_name};
