//! Mojang session server client: player id to current in-game name.

use guildsync_types::PlayerId;
use serde::Deserialize;

use crate::error::RunnerError;
use crate::provider::IdentityResolver;

/// Client for the Mojang session server.
pub struct MojangClient {
    client: reqwest::Client,
    api_url: String,
}

/// The fields of a profile response the runner uses.
#[derive(Debug, Deserialize)]
struct Profile {
    #[serde(default)]
    name: Option<String>,
}

impl MojangClient {
    /// Create a client for the session server at `api_url`.
    pub fn new(client: reqwest::Client, api_url: &str) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_owned(),
        }
    }
}

impl IdentityResolver for MojangClient {
    async fn resolve_name(&self, player: PlayerId) -> Result<String, RunnerError> {
        let url = format!("{}/session/minecraft/profile/{player}", self.api_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RunnerError::Http(format!("profile request for {player} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RunnerError::Http(format!(
                "profile lookup for {player} returned {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| RunnerError::Http(format!("profile body for {player} unreadable: {e}")))?;
        extract_name(&body, player)
    }
}

/// Extract the name from a profile response body.
fn extract_name(body: &str, player: PlayerId) -> Result<String, RunnerError> {
    let profile: Profile = serde_json::from_str(body)?;
    profile
        .name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| RunnerError::Api(format!("profile for {player} has no name")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> PlayerId {
        PlayerId(uuid::Uuid::from_u128(1))
    }

    #[test]
    fn extracts_profile_name() {
        let body = r#"{"id": "00000000000000000000000000000001", "name": "Steve", "properties": []}"#;
        assert_eq!(extract_name(body, player()).ok().as_deref(), Some("Steve"));
    }

    #[test]
    fn nameless_or_invalid_profiles_are_recoverable_errors() {
        let nameless = extract_name(r#"{"id": "x"}"#, player());
        assert!(nameless.err().is_some_and(|e| !e.is_fatal()));
        let invalid = extract_name("<html>", player());
        assert!(invalid.err().is_some_and(|e| !e.is_fatal()));
    }
}
