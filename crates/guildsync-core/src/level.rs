//! Experience-to-level conversion.
//!
//! Catacombs levels come from a fixed table of per-level experience
//! requirements; the running sum at index `i` is the total experience needed
//! to reach level `i + 1`. Skyblock levels are a flat 100 experience each.

/// Maximum catacombs level. Experience beyond the table caps here.
pub const MAX_CATACOMBS_LEVEL: u32 = 50;

/// Experience per skyblock level.
pub const SKYBLOCK_XP_PER_LEVEL: f64 = 100.0;

/// Experience needed for each catacombs level, in order.
pub const CATACOMBS_XP_TABLE: [u32; 50] = [
    50, 75, 110, 160, 230, 330, 470, 670, 950, 1_340, 1_890, 2_665, 3_760, 5_260, 7_380, 10_300,
    14_400, 20_000, 27_600, 38_000, 52_500, 71_500, 97_000, 132_000, 180_000, 243_000, 328_000,
    445_000, 600_000, 800_000, 1_065_000, 1_410_000, 1_900_000, 2_500_000, 3_300_000, 4_300_000,
    5_600_000, 7_200_000, 9_200_000, 12_000_000, 15_000_000, 19_000_000, 24_000_000, 30_000_000,
    38_000_000, 48_000_000, 60_000_000, 75_000_000, 93_000_000, 116_250_000,
];

/// Convert raw catacombs experience into a level in `0..=50`.
///
/// Returns the number of cumulative thresholds the experience has reached.
/// Experience at or past the final cumulative sum returns
/// [`MAX_CATACOMBS_LEVEL`].
pub fn level_from_experience(experience: f64) -> u32 {
    let mut total: u64 = 0;
    for (level, required) in (0_u32..).zip(CATACOMBS_XP_TABLE) {
        total = total.saturating_add(u64::from(required));
        #[allow(clippy::cast_precision_loss)]
        let threshold = total as f64;
        if experience < threshold {
            return level;
        }
    }
    MAX_CATACOMBS_LEVEL
}

/// Convert raw skyblock leveling experience into a level.
///
/// Negative or non-finite input yields level 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn skyblock_level_from_experience(experience: f64) -> u32 {
    (experience / SKYBLOCK_XP_PER_LEVEL).floor() as u32
}
