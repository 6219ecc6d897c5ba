//! Group membership resolution.
//!
//! `group_membership.csv` speaks in human labels; the platform speaks in
//! group names. The mapping file bridges the two:
//!
//! ```text
//! memberOf="Sales,Eng"      mapping {Sales → "Sales Team", Eng → "Engineering"}
//!        │
//!        ▼
//! ["Sales+Team", "Engineering", "All+Users"]
//! ```
//!
//! The literal label `ALL` expands to every mapped value. Every user ends up
//! in the universal group, and names are transport-encoded (space → `+`) the
//! way the platform's name filter expects them in a query string.

use crate::models::{GroupMapping, MembershipRecord};

/// Group every user belongs to, regardless of `memberOf`.
pub const UNIVERSAL_GROUP: &str = "All Users";

/// The `memberOf` value that expands to every mapped group.
pub const ALL_GROUPS: &str = "ALL";

/// A user's resolved, transport-encoded group list.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMembership {
    pub username: String,
    pub groups: Vec<String>,
}

/// Encode a group name for the platform's query-string name filter.
pub fn transport_encode(name: &str) -> String {
    name.replace(' ', "+")
}

/// Resolve every membership row against the mapping.
///
/// Tokens are matched by exact equality; an unmapped token resolves to
/// nothing. The universal group is always appended last.
pub fn resolve_group_membership(
    rows: &[MembershipRecord],
    mapping: &GroupMapping,
) -> Vec<ResolvedMembership> {
    rows.iter()
        .map(|row| {
            let mut groups: Vec<String> = if row.member_of == ALL_GROUPS {
                mapping.all_values().map(String::from).collect()
            } else {
                row.member_of
                    .split(',')
                    .filter_map(|token| mapping.resolve(token))
                    .map(String::from)
                    .collect()
            };

            groups.push(UNIVERSAL_GROUP.to_string());

            ResolvedMembership {
                username: row.username.clone(),
                groups: groups.iter().map(|g| transport_encode(g)).collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GroupMapEntry;

    fn mapping() -> GroupMapping {
        GroupMapping {
            groups: vec![
                GroupMapEntry { input: "Sales".into(), value: "Sales Team".into() },
                GroupMapEntry { input: "Eng".into(), value: "Engineering".into() },
                GroupMapEntry { input: "HR".into(), value: "People Ops".into() },
            ],
        }
    }

    fn row(username: &str, member_of: &str) -> MembershipRecord {
        MembershipRecord {
            username: username.into(),
            member_of: member_of.into(),
        }
    }

    #[test]
    fn test_token_list_resolution() {
        let resolved = resolve_group_membership(&[row("jdoe", "Sales,Eng")], &mapping());

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].username, "jdoe");
        assert_eq!(
            resolved[0].groups,
            vec!["Sales+Team", "Engineering", "All+Users"]
        );
    }

    #[test]
    fn test_all_expands_every_mapped_value() {
        let resolved = resolve_group_membership(&[row("jdoe", "ALL")], &mapping());

        assert_eq!(
            resolved[0].groups,
            vec!["Sales+Team", "Engineering", "People+Ops", "All+Users"]
        );
    }

    #[test]
    fn test_unmapped_token_resolves_to_nothing() {
        let resolved = resolve_group_membership(&[row("jdoe", "Sales,Finance")], &mapping());

        assert_eq!(resolved[0].groups, vec!["Sales+Team", "All+Users"]);
    }

    #[test]
    fn test_match_is_exact() {
        // " Eng" (leading space) and "eng" are not "Eng"
        let resolved = resolve_group_membership(&[row("jdoe", "Sales, Eng,eng")], &mapping());

        assert_eq!(resolved[0].groups, vec!["Sales+Team", "All+Users"]);
    }

    #[test]
    fn test_universal_group_always_present() {
        let resolved = resolve_group_membership(&[row("jdoe", "")], &mapping());

        assert_eq!(resolved[0].groups, vec!["All+Users"]);
    }

    #[test]
    fn test_one_result_per_row() {
        let rows = vec![row("a", "Sales"), row("b", "Eng"), row("c", "ALL")];
        let resolved = resolve_group_membership(&rows, &mapping());

        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0].groups, vec!["Sales+Team", "All+Users"]);
        assert_eq!(resolved[1].groups, vec!["Engineering", "All+Users"]);
    }

    #[test]
    fn test_transport_encode() {
        assert_eq!(transport_encode("Sales Team"), "Sales+Team");
        assert_eq!(transport_encode("Engineering"), "Engineering");
        assert_eq!(transport_encode("All Users"), "All+Users");
    }
}
