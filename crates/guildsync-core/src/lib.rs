//! Roster computations for the guild sync job.
//!
//! Everything in this crate is pure: no I/O, no clocks, no randomness. The
//! runner fetches data, calls into here to decide what changed and what the
//! chat side should look like, then performs the resulting mutations.
//!
//! # Modules
//!
//! - [`level`] -- Experience table and experience-to-level conversion
//! - [`brackets`] -- Level-to-bracket mapping
//! - [`diff`] -- Previous/current snapshot differ and [`ChangeEvent`]
//! - [`roles`] -- Role tables and the per-account role planner

pub mod brackets;
pub mod diff;
pub mod level;
pub mod roles;

pub use brackets::{catacombs_bracket, skyblock_bracket};
pub use diff::{ChangeEvent, diff_snapshots};
pub use level::{
    CATACOMBS_XP_TABLE, MAX_CATACOMBS_LEVEL, level_from_experience,
    skyblock_level_from_experience,
};
pub use roles::{
    EXEMPT_ROLE, NOT_IN_GUILD_ROLE, RolePlan, RoleTarget, SKYBLOCK_ROLES, catacombs_role,
    plan_roles, skyblock_role,
};
