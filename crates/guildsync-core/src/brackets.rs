//! Level-to-bracket mapping.

use guildsync_types::{CatacombsBracket, SkyblockBracket};

/// Lower bounds of the catacombs brackets, checked highest first.
const CATACOMBS_FLOORS: [(u32, CatacombsBracket); 5] = [
    (50, CatacombsBracket::Max),
    (45, CatacombsBracket::From45),
    (40, CatacombsBracket::From40),
    (35, CatacombsBracket::From35),
    (30, CatacombsBracket::From30),
];

/// Map a catacombs level to its bracket.
pub fn catacombs_bracket(level: u32) -> CatacombsBracket {
    CATACOMBS_FLOORS
        .iter()
        .find(|(floor, _)| level >= *floor)
        .map_or(CatacombsBracket::Below30, |(_, bracket)| *bracket)
}

/// Map a skyblock level to its 40-level bracket.
pub const fn skyblock_bracket(level: u32) -> SkyblockBracket {
    SkyblockBracket::containing(level)
}
