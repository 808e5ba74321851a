//! Configuration types for the sync runner.
//!
//! All configuration is loaded from environment variables (a `.env` file in
//! the working directory is read first). The names match the ones existing
//! deployments already have in their `.env`.

use std::path::PathBuf;

use guildsync_types::{ChannelId, ServerId};

use crate::error::RunnerError;

/// Default Hypixel API base URL.
pub const DEFAULT_HYPIXEL_API_URL: &str = "https://api.hypixel.net";

/// Default Mojang session server base URL.
pub const DEFAULT_MOJANG_API_URL: &str = "https://sessionserver.mojang.com";

/// Default Discord REST API base URL.
pub const DEFAULT_DISCORD_API_URL: &str = "https://discord.com/api/v10";

/// Complete runner configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Discord bot token.
    pub discord_token: String,
    /// The Discord server whose members and roles are managed.
    pub discord_server: ServerId,
    /// Channel receiving roster change notifications.
    pub notify_channel: Option<ChannelId>,
    /// Channel where the daily puzzle results are posted.
    pub puzzle_channel: Option<ChannelId>,
    /// Hypixel API key. Required for reconciliation runs only.
    pub hypixel_api_key: Option<String>,
    /// Name of the Hypixel guild. Required for reconciliation runs only.
    pub guild_name: Option<String>,
    /// Directory holding the roster, ban list and change log.
    pub data_dir: PathBuf,
    /// Hypixel API base URL.
    pub hypixel_api_url: String,
    /// Mojang session server base URL.
    pub mojang_api_url: String,
    /// Discord REST API base URL.
    pub discord_api_url: String,
    /// How many recent puzzle channel messages to scan.
    pub puzzle_message_limit: u8,
}

/// Hypixel settings needed for a reconciliation run.
#[derive(Debug, Clone, Copy)]
pub struct GuildSettings<'a> {
    /// Hypixel API key.
    pub api_key: &'a str,
    /// Hypixel guild name.
    pub guild_name: &'a str,
}

impl RunnerConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `DC_TOKEN` -- Discord bot token
    /// - `GUILD_ID` -- Discord server id
    ///
    /// Optional variables:
    /// - `CHANNEL_ID` -- notification channel id
    /// - `WORDLE_CHANNEL` -- puzzle results channel id
    /// - `HYPIXEL_API_KEY` -- Hypixel API key (required for full runs)
    /// - `GUILD_NAME` -- Hypixel guild name (required for full runs)
    /// - `DATA_DIR` -- data directory (default `.`)
    /// - `HYPIXEL_API_URL`, `MOJANG_API_URL`, `DISCORD_API_URL` -- API bases
    /// - `PUZZLE_MESSAGE_LIMIT` -- messages to scan, 1-100 (default 50)
    pub fn from_env() -> Result<Self, RunnerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RunnerError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &str| {
            var(name).ok_or_else(|| RunnerError::Config(format!("missing required env var {name}")))
        };

        let discord_token = required("DC_TOKEN")?;
        let discord_server = required("GUILD_ID")?
            .parse::<ServerId>()
            .map_err(|e| RunnerError::Config(format!("invalid GUILD_ID: {e}")))?;

        let notify_channel = var("CHANNEL_ID")
            .map(|v| v.parse::<ChannelId>())
            .transpose()
            .map_err(|e| RunnerError::Config(format!("invalid CHANNEL_ID: {e}")))?;
        let puzzle_channel = var("WORDLE_CHANNEL")
            .map(|v| v.parse::<ChannelId>())
            .transpose()
            .map_err(|e| RunnerError::Config(format!("invalid WORDLE_CHANNEL: {e}")))?;

        let puzzle_message_limit: u8 = var("PUZZLE_MESSAGE_LIMIT")
            .unwrap_or_else(|| "50".to_owned())
            .parse()
            .map_err(|e| RunnerError::Config(format!("invalid PUZZLE_MESSAGE_LIMIT: {e}")))?;
        if !(1..=100).contains(&puzzle_message_limit) {
            return Err(RunnerError::Config(format!(
                "PUZZLE_MESSAGE_LIMIT must be between 1 and 100, got {puzzle_message_limit}"
            )));
        }

        Ok(Self {
            discord_token,
            discord_server,
            notify_channel,
            puzzle_channel,
            hypixel_api_key: var("HYPIXEL_API_KEY"),
            guild_name: var("GUILD_NAME"),
            data_dir: PathBuf::from(var("DATA_DIR").unwrap_or_else(|| ".".to_owned())),
            hypixel_api_url: var("HYPIXEL_API_URL")
                .unwrap_or_else(|| DEFAULT_HYPIXEL_API_URL.to_owned()),
            mojang_api_url: var("MOJANG_API_URL")
                .unwrap_or_else(|| DEFAULT_MOJANG_API_URL.to_owned()),
            discord_api_url: var("DISCORD_API_URL")
                .unwrap_or_else(|| DEFAULT_DISCORD_API_URL.to_owned()),
            puzzle_message_limit,
        })
    }

    /// The Hypixel settings, or a config error naming what is missing.
    pub fn guild_settings(&self) -> Result<GuildSettings<'_>, RunnerError> {
        let api_key = self.hypixel_api_key.as_deref().ok_or_else(|| {
            RunnerError::Config("HYPIXEL_API_KEY is required for a reconciliation run".to_owned())
        })?;
        let guild_name = self.guild_name.as_deref().ok_or_else(|| {
            RunnerError::Config("GUILD_NAME is required for a reconciliation run".to_owned())
        })?;
        Ok(GuildSettings {
            api_key,
            guild_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<RunnerConfig, RunnerError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        RunnerConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = load(&[("DC_TOKEN", "token"), ("GUILD_ID", "42")]);
        assert!(config.is_ok());
        let Ok(config) = config else { return };
        assert_eq!(config.discord_server, ServerId(42));
        assert_eq!(config.notify_channel, None);
        assert_eq!(config.data_dir, PathBuf::from("."));
        assert_eq!(config.hypixel_api_url, DEFAULT_HYPIXEL_API_URL);
        assert_eq!(config.puzzle_message_limit, 50);
        assert!(config.guild_settings().is_err());
    }

    #[test]
    fn missing_token_is_an_error() {
        assert!(matches!(load(&[("GUILD_ID", "42")]), Err(RunnerError::Config(_))));
    }

    #[test]
    fn blank_optional_values_count_as_unset() {
        let config = load(&[("DC_TOKEN", "t"), ("GUILD_ID", "1"), ("WORDLE_CHANNEL", " ")]);
        assert_eq!(config.ok().and_then(|c| c.puzzle_channel), None);
    }

    #[test]
    fn invalid_channel_is_an_error() {
        let config = load(&[("DC_TOKEN", "t"), ("GUILD_ID", "1"), ("CHANNEL_ID", "general")]);
        assert!(config.is_err());
    }

    #[test]
    fn guild_settings_present_for_full_runs() {
        let config = load(&[
            ("DC_TOKEN", "t"),
            ("GUILD_ID", "1"),
            ("HYPIXEL_API_KEY", "key"),
            ("GUILD_NAME", "Wither Lords"),
        ]);
        let Ok(config) = config else { return };
        let settings = config.guild_settings();
        assert_eq!(settings.ok().map(|s| s.guild_name), Some("Wither Lords"));
    }

    #[test]
    fn message_limit_is_bounded() {
        let config = load(&[("DC_TOKEN", "t"), ("GUILD_ID", "1"), ("PUZZLE_MESSAGE_LIMIT", "0")]);
        assert!(config.is_err());
    }
}
