//! Collaborator contracts consumed by the runner.
//!
//! The reconciler and the puzzle reply only talk to the outside world
//! through these traits. The HTTP clients in [`crate::hypixel`],
//! [`crate::mojang`] and [`crate::discord`] implement them for production;
//! tests substitute in-memory fakes. Dispatch is static (generics), so the
//! async methods need no boxing.

use guildsync_types::{ChannelId, ChatUserId, MessageId, PlayerId, RoleId};

use crate::directory::{ChatDirectory, ChatMessage};
use crate::error::RunnerError;

/// Raw progression numbers for one player, maximized over their profiles.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerStats {
    /// Catacombs dungeon experience.
    pub catacombs_experience: f64,
    /// Skyblock leveling experience.
    pub skyblock_experience: f64,
}

/// Source of the authoritative guild roster.
pub trait RosterProvider {
    /// Resolve a guild name to its id. Not found is fatal.
    async fn find_guild_id(&self, name: &str) -> Result<String, RunnerError>;

    /// List the members of a guild. Failure is fatal.
    async fn guild_members(&self, guild_id: &str) -> Result<Vec<PlayerId>, RunnerError>;
}

/// Source of per-player progression statistics.
pub trait StatsProvider {
    /// Fetch a player's stats; `None` when the player has no profiles.
    async fn player_stats(&self, player: PlayerId) -> Result<Option<PlayerStats>, RunnerError>;
}

/// Resolves player ids to current display names.
pub trait IdentityResolver {
    /// Current in-game name of `player`.
    async fn resolve_name(&self, player: PlayerId) -> Result<String, RunnerError>;
}

/// The chat server: directory reads, role/nickname mutations, messaging.
pub trait ChatPlatform {
    /// Fetch every account and role on the server.
    async fn directory(&self) -> Result<ChatDirectory, RunnerError>;

    /// Give `user` the role `role`.
    async fn add_role(&self, user: ChatUserId, role: RoleId) -> Result<(), RunnerError>;

    /// Take the role `role` from `user`.
    async fn remove_role(&self, user: ChatUserId, role: RoleId) -> Result<(), RunnerError>;

    /// Set `user`'s server nickname.
    async fn set_nickname(&self, user: ChatUserId, nickname: &str) -> Result<(), RunnerError>;

    /// The most recent `limit` messages of `channel`, newest first.
    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<ChatMessage>, RunnerError>;

    /// Post `content` to `channel`.
    async fn post_message(&self, channel: ChannelId, content: &str) -> Result<(), RunnerError>;

    /// Post `content` to `channel` as a reply to `message`.
    async fn reply(
        &self,
        channel: ChannelId,
        message: MessageId,
        content: &str,
    ) -> Result<(), RunnerError>;
}
