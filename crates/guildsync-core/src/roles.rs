//! Chat role state machine.
//!
//! A chat account's state is the set of labeled roles it holds, across three
//! independent axes:
//!
//! - skyblock bracket role (at most one of [`SKYBLOCK_ROLES`])
//! - catacombs bracket role (at most one; the lowest bracket has none)
//! - the [`NOT_IN_GUILD_ROLE`] marker
//!
//! [`plan_roles`] computes the additions and removals that move an account
//! to its target state. Planning works on role *names* only, so it is pure
//! and the runner translates names to server role ids when applying. A plan
//! applied once leaves nothing for a second plan to do.

use std::collections::BTreeSet;

use guildsync_types::{CatacombsBracket, SkyblockBracket};

/// Marker role for chat accounts with no matching guild member.
pub const NOT_IN_GUILD_ROLE: &str = "Not in guild";

/// Service accounts holding this role never receive the marker.
pub const EXEMPT_ROLE: &str = "Bot";

/// Skyblock bracket lower bound to role name, lowest first.
///
/// Brackets above the last entry have no role.
pub const SKYBLOCK_ROLES: [(u32, &str); 13] = [
    (0, "0 - 39"),
    (40, "40 - 79"),
    (80, "80 - 119"),
    (120, "120 - 159"),
    (160, "160 - 199"),
    (200, "200 - 239"),
    (240, "240 - 279"),
    (280, "280 - 319"),
    (320, "320 - 359"),
    (360, "360 - 399"),
    (400, "400 - 439"),
    (440, "440 - 479"),
    (480, "480 - 519"),
];

/// Role name for a skyblock bracket, if the server tracks that tier.
pub fn skyblock_role(bracket: SkyblockBracket) -> Option<&'static str> {
    SKYBLOCK_ROLES
        .iter()
        .find(|(low, _)| *low == bracket.low())
        .map(|(_, role)| *role)
}

/// Role name for a catacombs bracket. The lowest bracket has no role.
pub const fn catacombs_role(bracket: CatacombsBracket) -> Option<&'static str> {
    match bracket {
        CatacombsBracket::Below30 => None,
        CatacombsBracket::From30 => Some("Cata 30+"),
        CatacombsBracket::From35 => Some("Cata 35+"),
        CatacombsBracket::From40 => Some("Cata 40+"),
        CatacombsBracket::From45 => Some("Cata 45+"),
        CatacombsBracket::Max => Some("Cata 50+"),
    }
}

/// Every catacombs role name, lowest bracket first.
fn catacombs_roles() -> impl Iterator<Item = &'static str> {
    CatacombsBracket::ALL.into_iter().filter_map(catacombs_role)
}

/// Desired state for one chat account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleTarget {
    /// Linked to a current guild member with these brackets.
    InGuild {
        /// Target skyblock bracket.
        skyblock: SkyblockBracket,
        /// Target catacombs bracket.
        catacombs: CatacombsBracket,
    },
    /// Holds roles but matches no current guild member.
    NotInGuild,
}

/// Role mutations needed to reach a [`RoleTarget`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePlan {
    /// The account holds no roles (unverified) and was left alone.
    pub skipped: bool,
    /// Role names to remove, applied before additions.
    pub remove: Vec<String>,
    /// Role names to add.
    pub add: Vec<String>,
    /// Target role names that do not exist on the server.
    pub missing_on_server: Vec<String>,
}

impl RolePlan {
    /// Whether the plan mutates nothing.
    pub fn is_noop(&self) -> bool {
        self.remove.is_empty() && self.add.is_empty()
    }

    /// The role set that results from applying this plan to `held`.
    pub fn apply(&self, held: &BTreeSet<String>) -> BTreeSet<String> {
        let mut result: BTreeSet<String> = held
            .iter()
            .filter(|role| !self.remove.contains(role))
            .cloned()
            .collect();
        result.extend(self.add.iter().cloned());
        result
    }
}

/// Plan the role changes that move an account holding `held` to `target`.
///
/// `server` is the set of role names that exist on the chat server; a
/// target role missing there is reported, not added.
pub fn plan_roles(
    held: &BTreeSet<String>,
    server: &BTreeSet<String>,
    target: RoleTarget,
) -> RolePlan {
    let mut plan = RolePlan::default();

    if held.is_empty() {
        plan.skipped = true;
        return plan;
    }

    match target {
        RoleTarget::NotInGuild => {
            if !held.contains(NOT_IN_GUILD_ROLE) && !held.contains(EXEMPT_ROLE) {
                plan.want(NOT_IN_GUILD_ROLE, held, server);
            }
        }
        RoleTarget::InGuild {
            skyblock,
            catacombs,
        } => {
            if held.contains(NOT_IN_GUILD_ROLE) {
                plan.remove.push(NOT_IN_GUILD_ROLE.to_owned());
            }

            let skyblock_target = skyblock_role(skyblock);
            let catacombs_target = catacombs_role(catacombs);

            let stale_skyblock = SKYBLOCK_ROLES
                .iter()
                .map(|(_, role)| *role)
                .filter(|role| Some(*role) != skyblock_target);
            let stale_catacombs = catacombs_roles().filter(|role| Some(*role) != catacombs_target);
            plan.remove.extend(
                stale_skyblock
                    .chain(stale_catacombs)
                    .filter(|role| held.contains(*role))
                    .map(ToOwned::to_owned),
            );

            for role in [skyblock_target, catacombs_target].into_iter().flatten() {
                plan.want(role, held, server);
            }
        }
    }

    plan
}

impl RolePlan {
    /// Add `role` unless already held; note it if the server lacks it.
    fn want(&mut self, role: &str, held: &BTreeSet<String>, server: &BTreeSet<String>) {
        if held.contains(role) {
            return;
        }
        if server.contains(role) {
            self.add.push(role.to_owned());
        } else {
            self.missing_on_server.push(role.to_owned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| (*n).to_owned()).collect()
    }

    fn full_server() -> BTreeSet<String> {
        let mut server: BTreeSet<String> =
            SKYBLOCK_ROLES.iter().map(|(_, r)| (*r).to_owned()).collect();
        server.extend(catacombs_roles().map(ToOwned::to_owned));
        server.insert(NOT_IN_GUILD_ROLE.to_owned());
        server.insert(EXEMPT_ROLE.to_owned());
        server.insert("Member".to_owned());
        server
    }

    fn in_guild(level: u32, catacombs: CatacombsBracket) -> RoleTarget {
        RoleTarget::InGuild {
            skyblock: SkyblockBracket::containing(level),
            catacombs,
        }
    }

    #[test]
    fn unverified_accounts_are_skipped() {
        let plan = plan_roles(&set(&[]), &full_server(), RoleTarget::NotInGuild);
        assert!(plan.skipped);
        assert!(plan.is_noop());
    }

    #[test]
    fn catacombs_promotion_swaps_roles() {
        let held = set(&["Member", "Cata 30+", "120 - 159"]);
        let plan = plan_roles(&held, &full_server(), in_guild(130, CatacombsBracket::From35));
        assert_eq!(plan.remove, vec!["Cata 30+".to_owned()]);
        assert_eq!(plan.add, vec!["Cata 35+".to_owned()]);
        assert_eq!(plan.apply(&held), set(&["Member", "Cata 35+", "120 - 159"]));
    }

    #[test]
    fn lowest_catacombs_bracket_removes_the_role() {
        let held = set(&["Member", "Cata 45+", "0 - 39"]);
        let plan = plan_roles(&held, &full_server(), in_guild(0, CatacombsBracket::Below30));
        assert_eq!(plan.remove, vec!["Cata 45+".to_owned()]);
        assert!(plan.add.is_empty());
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let server = full_server();
        let held = set(&["Member", "Not in guild", "0 - 39", "40 - 79", "Cata 50+"]);
        let target = in_guild(245, CatacombsBracket::From40);

        let first = plan_roles(&held, &server, target);
        let after_first = first.apply(&held);
        let second = plan_roles(&after_first, &server, target);

        assert!(second.is_noop());
        assert_eq!(second.apply(&after_first), after_first);
        assert_eq!(after_first, set(&["Member", "240 - 279", "Cata 40+"]));
    }

    #[test]
    fn not_in_guild_marks_but_keeps_brackets() {
        let held = set(&["Member", "Cata 30+", "80 - 119"]);
        let plan = plan_roles(&held, &full_server(), RoleTarget::NotInGuild);
        assert!(plan.remove.is_empty());
        assert_eq!(plan.add, vec![NOT_IN_GUILD_ROLE.to_owned()]);
    }

    #[test]
    fn exempt_and_already_marked_accounts_are_untouched() {
        let server = full_server();
        let bot = plan_roles(&set(&["Bot"]), &server, RoleTarget::NotInGuild);
        assert!(bot.is_noop());
        let marked = plan_roles(&set(&["Member", "Not in guild"]), &server, RoleTarget::NotInGuild);
        assert!(marked.is_noop());
    }

    #[test]
    fn bracket_above_the_table_is_a_silent_miss() {
        let held = set(&["Member", "480 - 519"]);
        let plan = plan_roles(&held, &full_server(), in_guild(523, CatacombsBracket::Below30));
        assert_eq!(plan.remove, vec!["480 - 519".to_owned()]);
        assert!(plan.add.is_empty());
        assert!(plan.missing_on_server.is_empty());
    }

    #[test]
    fn target_role_missing_on_server_is_reported() {
        let server = set(&["Member"]);
        let plan = plan_roles(&set(&["Member"]), &server, in_guild(0, CatacombsBracket::From30));
        assert!(plan.add.is_empty());
        assert_eq!(
            plan.missing_on_server,
            vec!["0 - 39".to_owned(), "Cata 30+".to_owned()]
        );
    }
}
