//! In-memory view of the chat server: accounts, roles and a name index.
//!
//! Accounts are looked up case-insensitively by display name or username,
//! the same way members are matched to in-game names. When a display name
//! and another account's username collide, the later account wins.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use guildsync_types::{ChatUserId, MessageId, RoleId};

/// One member of the chat server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatAccount {
    /// Account id.
    pub user_id: ChatUserId,
    /// Unique account username.
    pub username: String,
    /// Server nickname, falling back to the global display name or username.
    pub display_name: String,
    /// Roles held on the server, `@everyone` excluded.
    pub role_ids: BTreeSet<RoleId>,
}

/// A role defined on the chat server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerRole {
    /// Role id.
    pub id: RoleId,
    /// Role name as shown on the server.
    pub name: String,
}

/// A message read from a chat channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Message id, used to reply.
    pub id: MessageId,
    /// Raw message text.
    pub content: String,
    /// When the message was posted.
    pub timestamp: DateTime<Utc>,
}

/// Snapshot of the chat server's accounts and roles.
#[derive(Debug, Clone, Default)]
pub struct ChatDirectory {
    accounts: Vec<ChatAccount>,
    roles: Vec<ServerRole>,
    index: BTreeMap<String, usize>,
}

impl ChatDirectory {
    /// Build the directory and its lowercase name index.
    pub fn new(accounts: Vec<ChatAccount>, roles: Vec<ServerRole>) -> Self {
        let mut directory = Self {
            accounts,
            roles,
            index: BTreeMap::new(),
        };
        for position in 0..directory.accounts.len() {
            directory.index_account(position);
        }
        directory
    }

    fn index_account(&mut self, position: usize) {
        let Some(account) = self.accounts.get(position) else {
            return;
        };
        let display = account.display_name.to_lowercase();
        let username = account.username.to_lowercase();
        self.index.insert(display.clone(), position);
        if username != display {
            self.index.insert(username, position);
        }
    }

    /// Number of accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Position of the account named `name` (display name or username).
    pub fn find(&self, name: &str) -> Option<usize> {
        self.index.get(&name.to_lowercase()).copied()
    }

    /// The account at `position`.
    pub fn account(&self, position: usize) -> Option<&ChatAccount> {
        self.accounts.get(position)
    }

    /// Names of the roles `account` holds.
    pub fn held_role_names(&self, account: &ChatAccount) -> BTreeSet<String> {
        self.roles
            .iter()
            .filter(|role| account.role_ids.contains(&role.id))
            .map(|role| role.name.clone())
            .collect()
    }

    /// Names of every role on the server.
    pub fn server_role_names(&self) -> BTreeSet<String> {
        self.roles.iter().map(|role| role.name.clone()).collect()
    }

    /// Id of the first server role called `name`.
    pub fn role_id(&self, name: &str) -> Option<RoleId> {
        self.roles.iter().find(|role| role.name == name).map(|role| role.id)
    }

    /// Ids of the roles called `name` that `account` holds.
    pub fn held_role_ids(&self, account: &ChatAccount, name: &str) -> Vec<RoleId> {
        self.roles
            .iter()
            .filter(|role| role.name == name && account.role_ids.contains(&role.id))
            .map(|role| role.id)
            .collect()
    }

    /// Record that the account at `position` gained or lost `role`.
    pub fn set_role(&mut self, position: usize, role: RoleId, held: bool) {
        if let Some(account) = self.accounts.get_mut(position) {
            if held {
                account.role_ids.insert(role);
            } else {
                account.role_ids.remove(&role);
            }
        }
    }

    /// Record a nickname change, dropping the old name from the index.
    pub fn set_display_name(&mut self, position: usize, name: &str) {
        let Some(account) = self.accounts.get_mut(position) else {
            return;
        };
        let old = account.display_name.to_lowercase();
        let username = account.username.to_lowercase();
        name.clone_into(&mut account.display_name);
        if old != username && self.index.get(&old) == Some(&position) {
            self.index.remove(&old);
        }
        self.index_account(position);
    }

    /// Positions of all accounts holding at least one role.
    pub fn positions_with_roles(&self) -> Vec<usize> {
        self.accounts
            .iter()
            .enumerate()
            .filter(|(_, account)| !account.role_ids.is_empty())
            .map(|(position, _)| position)
            .collect()
    }
}
