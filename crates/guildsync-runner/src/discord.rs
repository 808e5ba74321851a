//! Discord REST client implementing [`ChatPlatform`].
//!
//! Only the REST API is used; the job never opens a gateway connection.
//! Requests authenticate with `Authorization: Bot <token>`. A `403` is
//! reported as [`RunnerError::ChatPermission`] so callers can log a useful
//! hint (role hierarchy, Manage Roles / Manage Nicknames) and move on.

use chrono::{DateTime, Utc};
use guildsync_types::{ChannelId, ChatUserId, MessageId, RoleId, ServerId};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::directory::{ChatAccount, ChatDirectory, ChatMessage, ServerRole};
use crate::error::RunnerError;
use crate::provider::ChatPlatform;

/// Maximum page size of the member list endpoint.
const MEMBER_PAGE_SIZE: usize = 1000;

/// Client for one Discord server.
pub struct DiscordClient {
    client: reqwest::Client,
    api_url: String,
    token: String,
    server: ServerId,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    id: ChatUserId,
    username: String,
    #[serde(default)]
    global_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireMember {
    #[serde(default)]
    user: Option<WireUser>,
    #[serde(default)]
    nick: Option<String>,
    #[serde(default)]
    roles: Vec<RoleId>,
}

#[derive(Debug, Deserialize)]
struct WireRole {
    id: RoleId,
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    id: MessageId,
    #[serde(default)]
    content: String,
    timestamp: DateTime<Utc>,
}

impl DiscordClient {
    /// Create a client for `server` using the bot `token`.
    pub fn new(client: reqwest::Client, api_url: &str, token: &str, server: ServerId) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_owned(),
            token: token.to_owned(),
            server,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    /// Authenticate, send, and map failure statuses to errors.
    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, RunnerError> {
        let response = request
            .header("Authorization", format!("Bot {}", self.token))
            .send()
            .await
            .map_err(|e| RunnerError::Http(format!("Discord {what} request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_owned());
        if status == StatusCode::FORBIDDEN {
            return Err(RunnerError::ChatPermission(format!("{what}: {error_body}")));
        }
        Err(RunnerError::Http(format!(
            "Discord {what} returned {status}: {error_body}"
        )))
    }

    async fn fetch_members(&self) -> Result<Vec<ChatAccount>, RunnerError> {
        let url = self.url(&format!("/guilds/{}/members", self.server));
        let mut accounts = Vec::new();
        let mut after = ChatUserId(0);

        loop {
            let request = self.client.get(&url).query(&[
                ("limit", MEMBER_PAGE_SIZE.to_string()),
                ("after", after.to_string()),
            ]);
            let page: Vec<WireMember> = self
                .send(request, "member list")
                .await?
                .json()
                .await
                .map_err(|e| RunnerError::Api(format!("member list parse failed: {e}")))?;

            let page_len = page.len();
            for member in page {
                if let Some(account) = account_from_wire(member) {
                    after = after.max(account.user_id);
                    accounts.push(account);
                }
            }
            debug!(page_len, total = accounts.len(), "fetched member page");
            if page_len < MEMBER_PAGE_SIZE {
                return Ok(accounts);
            }
        }
    }

    async fn fetch_roles(&self) -> Result<Vec<ServerRole>, RunnerError> {
        let url = self.url(&format!("/guilds/{}/roles", self.server));
        let roles: Vec<WireRole> = self
            .send(self.client.get(&url), "role list")
            .await?
            .json()
            .await
            .map_err(|e| RunnerError::Api(format!("role list parse failed: {e}")))?;
        Ok(roles
            .into_iter()
            .map(|role| ServerRole {
                id: role.id,
                name: role.name,
            })
            .collect())
    }

    fn member_role_url(&self, user: ChatUserId, role: RoleId) -> String {
        self.url(&format!(
            "/guilds/{}/members/{user}/roles/{role}",
            self.server
        ))
    }
}

/// Convert a wire member into an account; members without a user are dropped.
fn account_from_wire(member: WireMember) -> Option<ChatAccount> {
    let user = member.user?;
    let display_name = member
        .nick
        .or(user.global_name)
        .unwrap_or_else(|| user.username.clone());
    Some(ChatAccount {
        user_id: user.id,
        username: user.username,
        display_name,
        role_ids: member.roles.into_iter().collect(),
    })
}

impl ChatPlatform for DiscordClient {
    async fn directory(&self) -> Result<ChatDirectory, RunnerError> {
        let accounts = self.fetch_members().await?;
        let roles = self.fetch_roles().await?;
        Ok(ChatDirectory::new(accounts, roles))
    }

    async fn add_role(&self, user: ChatUserId, role: RoleId) -> Result<(), RunnerError> {
        let request = self
            .client
            .put(self.member_role_url(user, role))
            .header(reqwest::header::CONTENT_LENGTH, "0");
        self.send(request, "add role").await.map(drop)
    }

    async fn remove_role(&self, user: ChatUserId, role: RoleId) -> Result<(), RunnerError> {
        let request = self.client.delete(self.member_role_url(user, role));
        self.send(request, "remove role").await.map(drop)
    }

    async fn set_nickname(&self, user: ChatUserId, nickname: &str) -> Result<(), RunnerError> {
        let url = self.url(&format!("/guilds/{}/members/{user}", self.server));
        let request = self
            .client
            .patch(url)
            .json(&serde_json::json!({ "nick": nickname }));
        self.send(request, "set nickname").await.map(drop)
    }

    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: u8,
    ) -> Result<Vec<ChatMessage>, RunnerError> {
        let url = self.url(&format!("/channels/{channel}/messages"));
        let request = self.client.get(url).query(&[("limit", limit)]);
        let messages: Vec<WireMessage> = self
            .send(request, "message history")
            .await?
            .json()
            .await
            .map_err(|e| RunnerError::Api(format!("message history parse failed: {e}")))?;
        Ok(messages
            .into_iter()
            .map(|m| ChatMessage {
                id: m.id,
                content: m.content,
                timestamp: m.timestamp,
            })
            .collect())
    }

    async fn post_message(&self, channel: ChannelId, content: &str) -> Result<(), RunnerError> {
        let url = self.url(&format!("/channels/{channel}/messages"));
        let request = self
            .client
            .post(url)
            .json(&serde_json::json!({ "content": content }));
        self.send(request, "post message").await.map(drop)
    }

    async fn reply(
        &self,
        channel: ChannelId,
        message: MessageId,
        content: &str,
    ) -> Result<(), RunnerError> {
        let url = self.url(&format!("/channels/{channel}/messages"));
        let request = self.client.post(url).json(&serde_json::json!({
            "content": content,
            "message_reference": { "message_id": message },
        }));
        self.send(request, "reply").await.map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_display_name_prefers_nickname() {
        let members: Vec<WireMember> = serde_json::from_value(serde_json::json!([
            {"user": {"id": "1", "username": "steve_mc", "global_name": "Steve G"},
             "nick": "Steve", "roles": ["10", "11"]},
            {"user": {"id": "2", "username": "alex", "global_name": "Alex"}, "roles": []},
            {"user": {"id": "3", "username": "notch"}, "nick": null, "roles": []},
            {"roles": ["10"]}
        ]))
        .unwrap_or_default();

        let accounts: Vec<ChatAccount> = members.into_iter().filter_map(account_from_wire).collect();
        let names: Vec<&str> = accounts.iter().map(|a| a.display_name.as_str()).collect();
        assert_eq!(names, vec!["Steve", "Alex", "notch"]);
        assert_eq!(accounts.first().map(|a| a.role_ids.len()), Some(2));
    }

    #[test]
    fn messages_parse_discord_timestamps() {
        let message: Option<WireMessage> = serde_json::from_value(serde_json::json!({
            "id": "1234",
            "content": "Here are yesterday's results:",
            "timestamp": "2026-10-19T07:00:01.123000+00:00"
        }))
        .ok();
        assert_eq!(message.map(|m| m.id), Some(MessageId(1234)));
    }
}
