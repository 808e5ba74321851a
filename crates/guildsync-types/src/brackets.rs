//! Display brackets for the two tracked progression stats.
//!
//! A bracket is a named, contiguous range of a numeric stat. Brackets are
//! what members see in notifications and what selects their chat roles, so
//! the label strings here are also the on-disk representation.

use core::fmt;
use core::str::FromStr;

/// Width of one skyblock level bracket.
pub const SKYBLOCK_BRACKET_WIDTH: u32 = 40;

/// Error returned when a bracket label cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} bracket label: {label:?}")]
pub struct BracketParseError {
    /// Which bracket axis was being parsed.
    pub kind: &'static str,
    /// The rejected label.
    pub label: String,
}

/// Catacombs (dungeon) level bracket, ordered lowest to highest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CatacombsBracket {
    /// Levels 0 through 29.
    #[default]
    Below30,
    /// Levels 30 through 34.
    From30,
    /// Levels 35 through 39.
    From35,
    /// Levels 40 through 44.
    From40,
    /// Levels 45 through 49.
    From45,
    /// Level 50, the cap.
    Max,
}

impl CatacombsBracket {
    /// Every bracket, lowest first.
    pub const ALL: [Self; 6] = [
        Self::Below30,
        Self::From30,
        Self::From35,
        Self::From40,
        Self::From45,
        Self::Max,
    ];

    /// The label shown to members and stored on disk.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Below30 => "Below 30",
            Self::From30 => "30-35",
            Self::From35 => "35-40",
            Self::From40 => "40-45",
            Self::From45 => "45-50",
            Self::Max => "MAX",
        }
    }
}

impl fmt::Display for CatacombsBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CatacombsBracket {
    type Err = BracketParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|b| b.label() == trimmed)
            .ok_or_else(|| BracketParseError {
                kind: "catacombs",
                label: s.to_owned(),
            })
    }
}

/// Skyblock level bracket `low..=low+39`, where `low` is a multiple of 40.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SkyblockBracket {
    low: u32,
}

impl SkyblockBracket {
    /// The bracket containing `level`.
    pub const fn containing(level: u32) -> Self {
        Self {
            low: (level / SKYBLOCK_BRACKET_WIDTH).saturating_mul(SKYBLOCK_BRACKET_WIDTH),
        }
    }

    /// Lowest level in the bracket.
    pub const fn low(self) -> u32 {
        self.low
    }

    /// Highest level in the bracket.
    pub const fn high(self) -> u32 {
        self.low.saturating_add(SKYBLOCK_BRACKET_WIDTH.saturating_sub(1))
    }
}

impl fmt::Display for SkyblockBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low(), self.high())
    }
}

impl FromStr for SkyblockBracket {
    type Err = BracketParseError;

    /// Parses the canonical `"L-H"` label only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || BracketParseError {
            kind: "skyblock",
            label: s.to_owned(),
        };
        let (low, high) = s.trim().split_once('-').ok_or_else(err)?;
        let low: u32 = low.trim().parse().ok().ok_or_else(err)?;
        let high: u32 = high.trim().parse().ok().ok_or_else(err)?;
        let bracket = Self::containing(low);
        if bracket.low() != low || bracket.high() != high {
            return Err(err());
        }
        Ok(bracket)
    }
}
