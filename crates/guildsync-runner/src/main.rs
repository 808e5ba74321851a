//! Guild roster sync entry point.
//!
//! One invocation performs one run and exits; scheduling is left to cron or
//! a systemd timer. A run first answers the daily puzzle results post (when
//! a puzzle channel is configured), then reconciles the Hypixel guild roster
//! with the Discord server.
//!
//! # Architecture
//!
//! ```text
//! Hypixel / Mojang --> Reconciler --> Discord roles + nicknames
//!                          |
//!                          +--> roster CSV --> diff --> change log + channel
//! ```
//!
//! Only a missing guild or an unreadable guild roster fails the run; every
//! other error is logged and the run carries on.

mod config;
mod directory;
mod discord;
mod error;
mod hypixel;
mod mojang;
mod notify;
mod provider;
mod puzzle;
mod reconcile;
#[cfg(test)]
mod testing;

use chrono::Utc;
use clap::{Parser, ValueEnum};
use guildsync_store::DataDir;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::RunnerConfig;
use crate::discord::DiscordClient;
use crate::hypixel::HypixelClient;
use crate::mojang::MojangClient;
use crate::puzzle::reply_to_results;
use crate::reconcile::Reconciler;

/// Guild roster sync for a Hypixel SkyBlock guild's Discord server
#[derive(Debug, Parser)]
#[command(name = "guildsync-runner", version, about, long_about = None)]
struct Cli {
    /// What to run
    #[arg(value_enum, default_value_t = RunMode::Full)]
    mode: RunMode,
}

/// Run modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RunMode {
    /// Puzzle reply, then the full roster reconciliation
    Full,
    /// Puzzle reply only
    #[value(alias = "puzzle")]
    Wordle,
}

/// Application entry point.
///
/// Loads `.env`, initializes logging and configuration, then runs the
/// selected mode once.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the guild roster cannot
/// be fetched.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!(mode = ?cli.mode, "guildsync-runner starting");

    let config = RunnerConfig::from_env()?;
    info!(
        server = %config.discord_server,
        data_dir = %config.data_dir.display(),
        notify_channel = ?config.notify_channel,
        puzzle_channel = ?config.puzzle_channel,
        "configuration loaded"
    );

    let http = reqwest::Client::builder()
        .user_agent(concat!("guildsync-runner/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let discord = DiscordClient::new(
        http.clone(),
        &config.discord_api_url,
        &config.discord_token,
        config.discord_server,
    );

    match config.puzzle_channel {
        Some(channel) => {
            let outcome = reply_to_results(
                &discord,
                channel,
                config.puzzle_message_limit,
                Utc::now(),
                &mut rand::rng(),
            )
            .await;
            match outcome {
                Ok(outcome) => info!(?outcome, "puzzle reply finished"),
                Err(e) => warn!(error = %e, "puzzle reply failed"),
            }
        }
        None => info!("puzzle channel not configured, skipping puzzle reply"),
    }

    if cli.mode == RunMode::Wordle {
        return Ok(());
    }

    let settings = config.guild_settings()?;
    tokio::fs::create_dir_all(&config.data_dir).await?;
    let data = DataDir::new(&config.data_dir);
    let hypixel = HypixelClient::new(http.clone(), &config.hypixel_api_url, settings.api_key);
    let mojang = MojangClient::new(http, &config.mojang_api_url);

    let summary = Reconciler::new(&hypixel, &mojang, &discord, &data, settings.guild_name)
        .with_notify_channel(config.notify_channel)
        .run()
        .await?;

    info!(
        members = summary.members,
        linked = summary.linked,
        unlisted = summary.unlisted,
        events = summary.events,
        "guildsync-runner finished"
    );
    Ok(())
}
