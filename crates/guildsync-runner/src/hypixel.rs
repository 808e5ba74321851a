//! Hypixel API client: guild lookup, guild roster and SkyBlock profiles.
//!
//! Responses are handled as `serde_json::Value` and picked apart by small
//! extraction functions, since only a handful of deeply nested fields are
//! needed out of very large documents.

use guildsync_types::PlayerId;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::RunnerError;
use crate::provider::{PlayerStats, RosterProvider, StatsProvider};

/// Client for the Hypixel public API.
pub struct HypixelClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl HypixelClient {
    /// Create a client for `api_url` authenticating with `api_key`.
    pub fn new(client: reqwest::Client, api_url: &str, api_key: &str) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
        }
    }

    /// GET `path` with `query` and return the JSON body.
    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, RunnerError> {
        let url = format!("{}{path}", self.api_url);
        let response = self
            .client
            .get(&url)
            .header("API-Key", &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| RunnerError::Http(format!("Hypixel request to {path} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(RunnerError::Http(format!(
                "Hypixel {path} returned {status}: {error_body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| RunnerError::Api(format!("Hypixel {path} response parse failed: {e}")))
    }
}

impl RosterProvider for HypixelClient {
    async fn find_guild_id(&self, name: &str) -> Result<String, RunnerError> {
        let json = self
            .get_json("/findGuild", &[("byName", name)])
            .await
            .map_err(|e| RunnerError::GuildNotFound(format!("{name}: {e}")))?;
        extract_guild_id(&json, name)
    }

    async fn guild_members(&self, guild_id: &str) -> Result<Vec<PlayerId>, RunnerError> {
        let json = self
            .get_json("/guild", &[("id", guild_id)])
            .await
            .map_err(|e| RunnerError::Roster(e.to_string()))?;
        extract_member_ids(&json)
    }
}

impl StatsProvider for HypixelClient {
    async fn player_stats(&self, player: PlayerId) -> Result<Option<PlayerStats>, RunnerError> {
        let uuid = player.to_string();
        let json = self
            .get_json("/v2/skyblock/profiles", &[("uuid", uuid.as_str())])
            .await?;
        let stats = extract_player_stats(&json, player);
        debug!(%player, ?stats, "fetched player stats");
        Ok(stats)
    }
}

/// Whether the response carries `"success": true`.
fn is_success(json: &Value) -> bool {
    json.get("success").and_then(Value::as_bool).unwrap_or(false)
}

/// Extract the guild id from a `/findGuild` response.
fn extract_guild_id(json: &Value, name: &str) -> Result<String, RunnerError> {
    if !is_success(json) {
        return Err(RunnerError::GuildNotFound(format!(
            "{name}: lookup was not successful"
        )));
    }
    json.get("guild")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(ToOwned::to_owned)
        .ok_or_else(|| RunnerError::GuildNotFound(name.to_owned()))
}

/// Extract member ids from a `/guild` response.
///
/// Individual members with an unparseable id are skipped; a response
/// without a member list is fatal.
fn extract_member_ids(json: &Value) -> Result<Vec<PlayerId>, RunnerError> {
    if !is_success(json) {
        return Err(RunnerError::Roster("guild lookup was not successful".to_owned()));
    }
    let members = json
        .get("guild")
        .and_then(|g| g.get("members"))
        .and_then(Value::as_array)
        .ok_or_else(|| RunnerError::Roster("response missing guild.members".to_owned()))?;

    Ok(members
        .iter()
        .filter_map(|member| {
            let raw = member.get("uuid").and_then(Value::as_str).unwrap_or_default();
            let id = raw.parse::<PlayerId>();
            if let Err(e) = &id {
                warn!(error = %e, "skipping guild member with invalid uuid");
            }
            id.ok()
        })
        .collect())
}

/// Extract a player's best stats across all of their SkyBlock profiles.
///
/// Returns `None` when the lookup failed or the player has no profiles.
fn extract_player_stats(json: &Value, player: PlayerId) -> Option<PlayerStats> {
    if !is_success(json) {
        return None;
    }
    let profiles = json.get("profiles").and_then(Value::as_array)?;
    if profiles.is_empty() {
        return None;
    }

    let key = player.to_string();
    let stats = profiles
        .iter()
        .filter_map(|profile| profile.get("members").and_then(|m| m.get(&key)))
        .fold(PlayerStats::default(), |best, member| {
            let catacombs = member
                .pointer("/dungeons/dungeon_types/catacombs/experience")
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            let skyblock = member
                .pointer("/leveling/experience")
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            PlayerStats {
                catacombs_experience: best.catacombs_experience.max(catacombs),
                skyblock_experience: best.skyblock_experience.max(skyblock),
            }
        });
    Some(stats)
}
