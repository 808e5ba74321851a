//! Change notifications: change log file plus the notification channel.
//!
//! Emission is fire-and-continue. A failed log append or channel post is
//! logged and the caller carries on with the next event.

use chrono::Utc;
use guildsync_core::ChangeEvent;
use guildsync_store::ChangeLog;
use guildsync_types::ChannelId;
use tracing::{info, warn};

use crate::provider::ChatPlatform;

/// Sends change events to the durable log and the chat channel.
pub struct Notifier<'a, C> {
    log: &'a ChangeLog,
    chat: &'a C,
    channel: Option<ChannelId>,
}

impl<'a, C: ChatPlatform> Notifier<'a, C> {
    /// Create a notifier. Without a channel, events only go to the log.
    pub const fn new(log: &'a ChangeLog, chat: &'a C, channel: Option<ChannelId>) -> Self {
        Self { log, chat, channel }
    }

    /// Record and announce one event.
    pub async fn emit(&self, event: &ChangeEvent) {
        let message = event.to_string();
        info!(player = %event.player(), text = message.as_str(), "roster change");

        if let Err(e) = self.log.append(&message, Utc::now()).await {
            warn!(error = %e, "failed to append to change log");
        }

        if let Some(channel) = self.channel
            && let Err(e) = self.chat.post_message(channel, &message).await
        {
            warn!(%channel, error = %e, "failed to post change notification");
        }
    }

    /// Emit every event in order.
    pub async fn emit_all(&self, events: &[ChangeEvent]) {
        for event in events {
            self.emit(event).await;
        }
    }
}
