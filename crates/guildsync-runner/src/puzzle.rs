//! Daily word-puzzle results reply.
//!
//! A puzzle bot posts a results summary each morning. Players who failed
//! are listed as mentions after `X/6:`. This module finds that post and
//! replies to it with a randomly picked taunt naming them. It shares no
//! state with the roster reconciler.

use chrono::{DateTime, Utc};
use guildsync_types::{ChannelId, ChatUserId, MessageId};
use rand::Rng;
use rand::seq::IndexedRandom;
use regex::Regex;
use tracing::{debug, info};

use crate::directory::ChatMessage;
use crate::error::RunnerError;
use crate::provider::ChatPlatform;

/// Text the results post always starts with.
pub const RESULTS_MARKER: &str = "Here are yesterday's results:";

/// Score marking a failed attempt.
pub const FAILED_MARKER: &str = "X/6";

const SINGLE_FAILURE: [&str; 16] = [
    "%s got folded by five letters. Pathetic.",
    "Wordle dunked on %s without mercy.",
    "%s tried. Wordle laughed.",
    "One braincell was not enough, %s.",
    "Wordle handed %s a personal L.",
    "%s got outplayed by the dictionary.",
    "%s couldn't spell 'win' today.",
    "The word was easy. %s still failed gloriously.",
    "%s guessed vibes instead of letters.",
    "Retire from Wordle, %s. For everyone's sake.",
    "Wordle took %s's lunch money.",
    "If losing was art, %s is Picasso.",
    "Another day, another L for %s.",
    "%s versus Wordle: fatality.",
    "%s needs a dictionary and a hug.",
    "Wordle wasn't hard. %s just is.",
];

const GROUP_FAILURE: [&str; 16] = [
    "%s fumbled the bag in glorious sync.",
    "%s turned Wordle into a public meltdown.",
    "So much failure in one group. Thanks, %s.",
    "Five-letter word for disaster? %s.",
    "Nobody expected a group fail. Then came %s.",
    "United in chaos: %s.",
    "Zero for %s. Absolute carnage.",
    "Today we mourn the attempt by %s.",
    "%s tanked like it was a group project.",
    "We witnessed synchronized defeat. Thanks, %s.",
    "%s failed in stereo. Outstanding.",
    "Everyone lost. %s just lost louder.",
    "%s redefined what group failure looks like.",
    "Watching %s fail was today's entertainment.",
    "Hope died the moment %s started guessing.",
    "Let's never speak of %s's Wordle attempt again.",
];

/// What a reply attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleOutcome {
    /// No results post from today or yesterday was found.
    NoResults,
    /// The results post lists nobody who failed.
    NoFailures(MessageId),
    /// Replied to the results post.
    Replied {
        /// The results post replied to.
        message: MessageId,
        /// How many players were named.
        failed: usize,
    },
}

/// Extracts failed players' ids from a results post.
#[derive(Debug, Clone)]
pub struct MentionParser {
    strict: Regex,
    lenient: Regex,
    mention: Regex,
}

impl MentionParser {
    /// Compile the result patterns.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            strict: Regex::new(r"X/6:\s*(<@!?\d+>(?:\s+<@!?\d+>)*)")?,
            lenient: Regex::new(r"X/6[:\s]+(<@[^>]+>(?:\s+<@[^>]+>)*)")?,
            mention: Regex::new(r"<@!?(\d+)>")?,
        })
    }

    /// Ids of the users listed under `X/6`, in post order.
    ///
    /// Tries the strict layout, then a lenient one, then takes any mention
    /// between the first and second `X/6`.
    pub fn failed_user_ids(&self, content: &str) -> Vec<ChatUserId> {
        for pattern in [&self.strict, &self.lenient] {
            if let Some(list) = pattern.captures(content).and_then(|c| c.get(1)) {
                let ids = self.mentions(list.as_str());
                if !ids.is_empty() {
                    return ids;
                }
            }
        }
        content
            .split(FAILED_MARKER)
            .nth(1)
            .map(|after| self.mentions(after))
            .unwrap_or_default()
    }

    fn mentions(&self, text: &str) -> Vec<ChatUserId> {
        self.mention
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .filter_map(|id| id.as_str().parse().ok())
            .collect()
    }
}

/// Whether `content` is a results post with at least one failure line.
pub fn is_results_message(content: &str) -> bool {
    content.contains(RESULTS_MARKER) && content.contains(FAILED_MARKER)
}

/// The first results post dated today (UTC), else the first dated yesterday.
pub fn find_results_message(messages: &[ChatMessage], now: DateTime<Utc>) -> Option<&ChatMessage> {
    let today = now.date_naive();
    [Some(today), today.pred_opt()]
        .into_iter()
        .flatten()
        .find_map(|day| {
            messages.iter().find(|message| {
                message.timestamp.date_naive() == day && is_results_message(&message.content)
            })
        })
}

/// `<@a>`, `<@a> and <@b>`, `<@a>, <@b> and <@c>`.
pub fn format_mentions(ids: &[ChatUserId]) -> String {
    let mentions: Vec<String> = ids.iter().map(|id| format!("<@{id}>")).collect();
    match mentions.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} and {last}", rest.join(", ")),
    }
}

/// Pick a taunt for `ids`. Returns `None` when nobody failed.
pub fn compose_reply<R: Rng + ?Sized>(ids: &[ChatUserId], rng: &mut R) -> Option<String> {
    let templates: &[&str] = match ids.len() {
        0 => return None,
        1 => &SINGLE_FAILURE,
        _ => &GROUP_FAILURE,
    };
    let template = templates.choose(rng)?;
    Some(template.replacen("%s", &format_mentions(ids), 1))
}

/// Find the latest results post in `channel` and reply to it.
///
/// Reads the last `limit` messages. Posts without failures get no reply.
pub async fn reply_to_results<C, R>(
    chat: &C,
    channel: ChannelId,
    limit: u8,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<PuzzleOutcome, RunnerError>
where
    C: ChatPlatform,
    R: Rng + ?Sized,
{
    let parser = MentionParser::new()?;
    let messages = chat.recent_messages(channel, limit).await?;
    debug!(%channel, fetched = messages.len(), "fetched puzzle channel history");

    let Some(results) = find_results_message(&messages, now) else {
        info!(%channel, "no puzzle results for today or yesterday");
        return Ok(PuzzleOutcome::NoResults);
    };

    let failed = parser.failed_user_ids(&results.content);
    let Some(reply) = compose_reply(&failed, rng) else {
        info!(results = %results.id, "nobody failed the puzzle");
        return Ok(PuzzleOutcome::NoFailures(results.id));
    };

    chat.reply(channel, results.id, &reply).await?;
    info!(results = %results.id, failed = failed.len(), "replied to puzzle results");
    Ok(PuzzleOutcome::Replied {
        message: results.id,
        failed: failed.len(),
    })
}
