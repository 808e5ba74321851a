//! In-memory collaborators for runner tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use guildsync_types::{ChannelId, ChatUserId, MessageId, PlayerId, RoleId};

use crate::directory::{ChatAccount, ChatDirectory, ChatMessage, ServerRole};
use crate::error::RunnerError;
use crate::provider::{ChatPlatform, IdentityResolver, PlayerStats, RosterProvider, StatsProvider};

/// Game API fake: one guild, fixed members, stats per member.
///
/// Members without stats make `player_stats` fail with a recoverable error.
#[derive(Default)]
pub struct FakeGame {
    pub guild: Option<String>,
    pub members: Vec<PlayerId>,
    pub stats: BTreeMap<PlayerId, PlayerStats>,
}

impl RosterProvider for FakeGame {
    async fn find_guild_id(&self, name: &str) -> Result<String, RunnerError> {
        self.guild
            .clone()
            .ok_or_else(|| RunnerError::GuildNotFound(name.to_owned()))
    }

    async fn guild_members(&self, _guild_id: &str) -> Result<Vec<PlayerId>, RunnerError> {
        Ok(self.members.clone())
    }
}

impl StatsProvider for FakeGame {
    async fn player_stats(&self, player: PlayerId) -> Result<Option<PlayerStats>, RunnerError> {
        self.stats
            .get(&player)
            .map(|stats| Some(*stats))
            .ok_or_else(|| RunnerError::Http(format!("no stats for {player}")))
    }
}

/// Name resolver fake; unknown ids fail with a recoverable error.
#[derive(Default)]
pub struct FakeIdentity {
    pub names: BTreeMap<PlayerId, String>,
}

impl IdentityResolver for FakeIdentity {
    async fn resolve_name(&self, player: PlayerId) -> Result<String, RunnerError> {
        self.names
            .get(&player)
            .cloned()
            .ok_or_else(|| RunnerError::Http(format!("profile lookup for {player} timed out")))
    }
}

/// Chat fake recording every mutation and post.
#[derive(Default)]
pub struct FakeChat {
    pub accounts: Vec<ChatAccount>,
    pub roles: Vec<ServerRole>,
    pub messages: Vec<ChatMessage>,
    pub deny_mutations: bool,
    pub deny_posts: bool,
    pub calls: Mutex<Vec<String>>,
    pub posts: Mutex<Vec<String>>,
}

impl FakeChat {
    fn record(&self, entry: String) -> Result<(), RunnerError> {
        if self.deny_mutations {
            return Err(RunnerError::ChatPermission(format!("denied: {entry}")));
        }
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(entry);
        }
        Ok(())
    }

    /// Mutations and replies, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Channel posts, in call order.
    pub fn posts(&self) -> Vec<String> {
        self.posts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl ChatPlatform for FakeChat {
    async fn directory(&self) -> Result<ChatDirectory, RunnerError> {
        Ok(ChatDirectory::new(self.accounts.clone(), self.roles.clone()))
    }

    async fn add_role(&self, user: ChatUserId, role: RoleId) -> Result<(), RunnerError> {
        self.record(format!("add {user} {role}"))
    }

    async fn remove_role(&self, user: ChatUserId, role: RoleId) -> Result<(), RunnerError> {
        self.record(format!("remove {user} {role}"))
    }

    async fn set_nickname(&self, user: ChatUserId, nickname: &str) -> Result<(), RunnerError> {
        self.record(format!("nick {user} {nickname}"))
    }

    async fn recent_messages(
        &self,
        _channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<ChatMessage>, RunnerError> {
        Ok(self.messages.iter().take(usize::from(limit)).cloned().collect())
    }

    async fn post_message(&self, _channel: ChannelId, content: &str) -> Result<(), RunnerError> {
        if self.deny_posts {
            return Err(RunnerError::ChatPermission(format!("denied post: {content}")));
        }
        if let Ok(mut posts) = self.posts.lock() {
            posts.push(content.to_owned());
        }
        Ok(())
    }

    async fn reply(
        &self,
        _channel: ChannelId,
        message: MessageId,
        content: &str,
    ) -> Result<(), RunnerError> {
        self.record(format!("reply {message} {content}"))
    }
}

/// A chat account holding `roles`.
pub fn account(id: u64, username: &str, display: &str, roles: &[u64]) -> ChatAccount {
    ChatAccount {
        user_id: ChatUserId(id),
        username: username.to_owned(),
        display_name: display.to_owned(),
        role_ids: roles.iter().map(|r| RoleId(*r)).collect(),
    }
}

/// A server role.
pub fn role(id: u64, name: &str) -> ServerRole {
    ServerRole {
        id: RoleId(id),
        name: name.to_owned(),
    }
}
