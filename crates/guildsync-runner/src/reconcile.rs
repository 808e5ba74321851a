//! One reconciliation run: game roster in, chat roles and snapshot out.
//!
//! A run is strictly sequential. Each guild member is fully processed
//! (name, stats, account match, rename, roles) before the next one starts.
//! Only the guild lookup and roster fetch can end a run; every other
//! failure falls back to a default or skips the step for that member.

use std::collections::BTreeSet;

use guildsync_core::{
    ChangeEvent, RoleTarget, catacombs_bracket, diff_snapshots, level_from_experience, plan_roles,
    skyblock_bracket, skyblock_level_from_experience,
};
use guildsync_store::{DataDir, RosterCsv};
use guildsync_types::{
    ChannelId, PlayerId, PlayerRecord, RosterSnapshot, UNRESOLVED_NAME, is_resolved_name,
};
use tracing::{debug, info, warn};

use crate::directory::ChatDirectory;
use crate::error::{RunnerError, recover};
use crate::notify::Notifier;
use crate::provider::{ChatPlatform, IdentityResolver, RosterProvider, StatsProvider};

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Guild members processed.
    pub members: usize,
    /// Members linked to a chat account.
    pub linked: usize,
    /// Chat accounts newly marked as not in the guild.
    pub unlisted: usize,
    /// Snapshot diff events emitted.
    pub events: usize,
}

/// How a member was matched to a chat account.
#[derive(Debug, Clone, Copy)]
enum Link {
    /// Through the handle recorded by the previous run.
    Previous(usize),
    /// Through the resolved display name.
    ByName(usize),
    Unlinked,
}

impl Link {
    const fn position(self) -> Option<usize> {
        match self {
            Self::Previous(position) | Self::ByName(position) => Some(position),
            Self::Unlinked => None,
        }
    }
}

/// Runs the roster sync against its collaborators.
pub struct Reconciler<'a, G, I, C> {
    game: &'a G,
    identity: &'a I,
    chat: &'a C,
    data: &'a DataDir,
    guild_name: &'a str,
    notify_channel: Option<ChannelId>,
}

impl<'a, G, I, C> Reconciler<'a, G, I, C>
where
    G: RosterProvider + StatsProvider,
    I: IdentityResolver,
    C: ChatPlatform,
{
    /// Create a reconciler for `guild_name` that posts no notifications.
    pub const fn new(
        game: &'a G,
        identity: &'a I,
        chat: &'a C,
        data: &'a DataDir,
        guild_name: &'a str,
    ) -> Self {
        Self {
            game,
            identity,
            chat,
            data,
            guild_name,
            notify_channel: None,
        }
    }

    /// Post change notifications to `channel` as well as the change log.
    #[must_use]
    pub const fn with_notify_channel(mut self, channel: Option<ChannelId>) -> Self {
        self.notify_channel = channel;
        self
    }

    /// Execute one full run.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error: the guild could not be found or its
    /// roster could not be fetched. Nothing is persisted in that case.
    pub async fn run(&self) -> Result<RunSummary, RunnerError> {
        let notifier = Notifier::new(&self.data.change_log, self.chat, self.notify_channel);

        let previous = self.data.roster.load().await;
        let banned = recover(
            self.data.ban_list.load_or_init().await.map_err(RunnerError::from),
            BTreeSet::new(),
            "load ban list",
        )?;

        let guild_id = self.game.find_guild_id(self.guild_name).await?;
        let member_ids = self.game.guild_members(&guild_id).await?;
        info!(
            guild = self.guild_name,
            guild_id = guild_id.as_str(),
            members = member_ids.len(),
            "fetched guild roster"
        );

        let mut directory = recover(
            self.chat.directory().await,
            ChatDirectory::default(),
            "fetch chat directory",
        )?;
        info!(accounts = directory.len(), "fetched chat directory");

        let mut current = RosterSnapshot::new();
        let mut csv = RosterCsv::new();
        let mut linked: usize = 0;
        let total = member_ids.len();
        for (index, id) in member_ids.into_iter().enumerate() {
            debug!(progress = index.saturating_add(1), total, player = %id, "processing member");
            let (record, is_linked) = self
                .process_member(id, &previous, &banned, &mut directory, &notifier)
                .await?;
            if is_linked {
                linked = linked.saturating_add(1);
            }
            csv.push(&record);
            current.insert(record);
        }

        let unlisted = self.mark_unlisted(&mut directory, &current).await;

        if let Err(e) = self.data.roster.persist(&csv).await {
            warn!(error = %e, "failed to persist roster");
        }

        let events = diff_snapshots(&previous, &current);
        notifier.emit_all(&events).await;

        let summary = RunSummary {
            members: current.len(),
            linked,
            unlisted,
            events: events.len(),
        };
        info!(?summary, "reconciliation finished");
        Ok(summary)
    }

    /// Resolve, match and update one member, returning its new record and
    /// whether it was linked to a live chat account.
    async fn process_member(
        &self,
        id: PlayerId,
        previous: &RosterSnapshot,
        banned: &BTreeSet<PlayerId>,
        directory: &mut ChatDirectory,
        notifier: &Notifier<'_, C>,
    ) -> Result<(PlayerRecord, bool), RunnerError> {
        let name = recover(
            self.identity.resolve_name(id).await,
            UNRESOLVED_NAME.to_owned(),
            "resolve display name",
        )?;
        let stats = recover(self.game.player_stats(id).await, None, "fetch player stats")?
            .unwrap_or_default();
        let catacombs = catacombs_bracket(level_from_experience(stats.catacombs_experience));
        let skyblock = skyblock_bracket(skyblock_level_from_experience(stats.skyblock_experience));

        let before = previous.get(&id);
        let link = find_link(directory, before, &name);

        if let (Link::Previous(position), Some(before)) = (link, before)
            && is_resolved_name(&name)
            && before.has_resolved_name()
            && before.display_name != name
        {
            notifier
                .emit(&ChangeEvent::NameChanged {
                    id,
                    old_name: before.display_name.clone(),
                    new_name: name.clone(),
                })
                .await;
            self.rename(directory, position, &name).await;
        }

        match link.position() {
            Some(position) => {
                self.apply_roles(directory, position, RoleTarget::InGuild { skyblock, catacombs })
                    .await;
            }
            None => debug!(player = %id, name, "no chat account for member"),
        }

        if banned.contains(&id) {
            notifier
                .emit(&ChangeEvent::BannedMemberDetected {
                    id,
                    name: name.clone(),
                })
                .await;
        }

        let chat_handle = link
            .position()
            .and_then(|position| directory.account(position))
            .map(|account| account.username.clone())
            .or_else(|| before.and_then(|record| record.chat_handle.clone()));

        let record = PlayerRecord {
            id,
            display_name: name,
            catacombs,
            skyblock,
            chat_handle,
        };
        Ok((record, link.position().is_some()))
    }

    /// Set the account's nickname to `name` unless it already matches.
    async fn rename(&self, directory: &mut ChatDirectory, position: usize, name: &str) {
        let Some(account) = directory.account(position) else {
            return;
        };
        if account.display_name == name {
            return;
        }
        let user = account.user_id;
        match self.chat.set_nickname(user, name).await {
            Ok(()) => {
                info!(%user, name, "updated nickname");
                directory.set_display_name(position, name);
            }
            Err(e) => log_chat_failure(&e, "set nickname"),
        }
    }

    /// Move the account at `position` toward `target`.
    ///
    /// Returns whether any role was actually changed.
    async fn apply_roles(
        &self,
        directory: &mut ChatDirectory,
        position: usize,
        target: RoleTarget,
    ) -> bool {
        let Some(account) = directory.account(position) else {
            return false;
        };
        let user = account.user_id;
        let account_name = account.display_name.clone();
        let plan = plan_roles(
            &directory.held_role_names(account),
            &directory.server_role_names(),
            target,
        );

        if plan.skipped {
            debug!(account = account_name.as_str(), "account holds no roles, skipping");
            return false;
        }
        for role in &plan.missing_on_server {
            debug!(account = account_name.as_str(), role = role.as_str(), "role not on server");
        }

        let mut changed = false;
        for name in &plan.remove {
            let ids = directory
                .account(position)
                .map(|account| directory.held_role_ids(account, name))
                .unwrap_or_default();
            for role in ids {
                match self.chat.remove_role(user, role).await {
                    Ok(()) => {
                        info!(account = account_name.as_str(), role = name.as_str(), "removed role");
                        directory.set_role(position, role, false);
                        changed = true;
                    }
                    Err(e) => log_chat_failure(&e, "remove role"),
                }
            }
        }
        for name in &plan.add {
            let Some(role) = directory.role_id(name) else {
                continue;
            };
            match self.chat.add_role(user, role).await {
                Ok(()) => {
                    info!(account = account_name.as_str(), role = name.as_str(), "added role");
                    directory.set_role(position, role, true);
                    changed = true;
                }
                Err(e) => log_chat_failure(&e, "add role"),
            }
        }
        changed
    }

    /// Mark every account with roles that no current member links to.
    async fn mark_unlisted(&self, directory: &mut ChatDirectory, current: &RosterSnapshot) -> usize {
        let handles: BTreeSet<String> = current
            .iter()
            .filter_map(|record| record.chat_handle.as_deref())
            .map(str::to_lowercase)
            .collect();

        let mut marked: usize = 0;
        for position in directory.positions_with_roles() {
            let Some(account) = directory.account(position) else {
                continue;
            };
            if handles.contains(&account.username.to_lowercase())
                || handles.contains(&account.display_name.to_lowercase())
            {
                continue;
            }
            if self.apply_roles(directory, position, RoleTarget::NotInGuild).await {
                marked = marked.saturating_add(1);
            }
        }
        if marked > 0 {
            info!(marked, "marked accounts not in guild");
        }
        marked
    }
}

/// Match a member to a chat account, preferring the previous run's handle.
fn find_link(directory: &ChatDirectory, before: Option<&PlayerRecord>, name: &str) -> Link {
    if let Some(position) = before
        .and_then(|record| record.chat_handle.as_deref())
        .and_then(|handle| directory.find(handle))
    {
        return Link::Previous(position);
    }
    if is_resolved_name(name)
        && let Some(position) = directory.find(name)
    {
        return Link::ByName(position);
    }
    Link::Unlinked
}

fn log_chat_failure(error: &RunnerError, action: &str) {
    if matches!(error, RunnerError::ChatPermission(_)) {
        warn!(
            error = %error,
            action,
            "missing permission; the bot needs Manage Roles and Manage Nicknames and must rank above the roles it manages"
        );
    } else {
        warn!(error = %error, action, "chat mutation failed");
    }
}
