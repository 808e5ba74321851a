//! Type-safe identifier wrappers.
//!
//! In-game players are identified by their Mojang UUID, which the game API
//! sends in the dashless ("simple") form. Chat-platform entities are
//! identified by Discord snowflakes: 64-bit integers that travel as JSON
//! strings. Both kinds serialize through their string form so that what is
//! written to disk matches what the APIs send.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error returned when an identifier string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} identifier: {value:?}")]
pub struct IdParseError {
    /// Which identifier type was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Stable identifier of an in-game player (Mojang UUID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for PlayerId {
    type Err = IdParseError;

    /// Accepts both the dashless and the hyphenated UUID forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .ok()
            .map(Self)
            .ok_or_else(|| IdParseError {
                kind: "player",
                value: s.to_owned(),
            })
    }
}

impl TryFrom<String> for PlayerId {
    type Error = IdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PlayerId> for String {
    fn from(id: PlayerId) -> Self {
        id.to_string()
    }
}

impl From<Uuid> for PlayerId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Generates a newtype wrapper around a Discord snowflake.
macro_rules! define_snowflake {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(pub u64);

        impl $name {
            /// Return the raw snowflake value.
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<u64>()
                    .ok()
                    .map(Self)
                    .ok_or_else(|| IdParseError {
                        kind: $kind,
                        value: s.to_owned(),
                    })
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdParseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.to_string()
            }
        }
    };
}

define_snowflake! {
    /// Identifier of a Discord user.
    ChatUserId, "chat user"
}

define_snowflake! {
    /// Identifier of a Discord server (guild).
    ServerId, "server"
}

define_snowflake! {
    /// Identifier of a role on the Discord server.
    RoleId, "role"
}

define_snowflake! {
    /// Identifier of a Discord text channel.
    ChannelId, "channel"
}

define_snowflake! {
    /// Identifier of a Discord message.
    MessageId, "message"
}
