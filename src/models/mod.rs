//! Domain models for the rosterload provisioning pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`UserRecord`] - one employee row from `users.csv`
//! - [`GroupRecord`] - one group row from `groups.csv`
//! - [`MembershipRecord`] - one username → groups row from `group_membership.csv`
//! - [`GroupMapping`] - the label → platform-name table from `group_mapping.json`
//! - [`AccountState`] - activation state derived from the `isActive` column
//! - [`RemoteUser`], [`RemoteGroup`], [`Organization`], [`DirectoryEntry`] -
//!   platform-side entities with opaque ids

use serde::{Deserialize, Serialize};

// =============================================================================
// Roster Input Records
// =============================================================================

/// One employee row from `users.csv`.
///
/// Field names map 1:1 onto the CSV headers. Every field is required to be
/// non-blank except `middle_name`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub username: String,
    pub job_title: String,
    pub department: String,
    pub manager_name: String,
    pub employee_id: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub date_of_employment: String,
    pub is_active: String,
    pub date_terminated: String,
    pub employee_type: String,
    pub manager_username: String,
    pub phone_number: String,
}

impl UserRecord {
    /// Human identifier used in validation messages.
    pub fn identifier(&self) -> String {
        format!("{} {} | {}", self.first_name, self.last_name, self.username)
    }

    /// Display name pushed to the platform.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// One group row from `groups.csv`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupRecord {
    #[serde(rename = "GroupName")]
    pub group_name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "GroupId")]
    pub group_id: String,
}

/// One row from `group_membership.csv`.
///
/// `member_of` is either a comma-separated list of logical group labels or
/// the literal `ALL`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MembershipRecord {
    pub username: String,
    #[serde(rename = "memberOf")]
    pub member_of: String,
}

// =============================================================================
// Group Mapping
// =============================================================================

/// The `group_mapping.json` file: logical labels → platform group names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupMapping {
    pub groups: Vec<GroupMapEntry>,
}

/// One mapping pair: the label used in `memberOf` and the platform-side name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupMapEntry {
    pub input: String,
    pub value: String,
}

impl GroupMapping {
    /// Look up the platform name for a `memberOf` label by exact equality.
    pub fn resolve(&self, label: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|entry| entry.input == label)
            .map(|entry| entry.value.as_str())
    }

    /// All mapped platform names, in file order.
    pub fn all_values(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|entry| entry.value.as_str())
    }
}

// =============================================================================
// Account State
// =============================================================================

/// Activation state of a platform user account.
///
/// Derived from the `isActive` CSV column: the literal `FALSE` suspends the
/// account, any other value (including blank) leaves it active.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountState {
    #[default]
    Activated,
    Suspended,
}

impl AccountState {
    /// Derive the state from the raw `isActive` column value.
    pub fn from_flag(is_active: &str) -> Self {
        if is_active == "FALSE" {
            AccountState::Suspended
        } else {
            AccountState::Activated
        }
    }

    /// Whether the account is enabled.
    pub fn activated(&self) -> bool {
        matches!(self, AccountState::Activated)
    }

    /// Whether the account is locked out.
    pub fn locked(&self) -> bool {
        matches!(self, AccountState::Suspended)
    }
}

// =============================================================================
// Platform-side Entities
// =============================================================================

/// A system user as returned by the platform.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RemoteUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub email: String,
}

/// A user group as returned by the platform.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RemoteGroup {
    pub id: String,
    pub name: String,
}

/// An organization the API key has access to.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Organization {
    pub id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

/// An external identity source linked to the platform.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DirectoryEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl DirectoryEntry {
    /// Whether this directory is a G Suite federation.
    pub fn is_gsuite(&self) -> bool {
        self.kind == "g_suite"
    }
}

// =============================================================================
// Tests
// =============================================================================

/// Test fixture: a fully-populated user row.
#[cfg(test)]
pub(crate) fn sample_user() -> UserRecord {
    UserRecord {
        first_name: "Jane".into(),
        middle_name: "".into(),
        last_name: "Doe".into(),
        username: "jdoe".into(),
        job_title: "Engineer".into(),
        department: "Engineering".into(),
        manager_name: "Sam Smith".into(),
        employee_id: "1001".into(),
        street_address: "1 Main St".into(),
        city: "Austin".into(),
        state: "TX".into(),
        postal_code: "78701".into(),
        country: "US".into(),
        date_of_employment: "2024-01-15".into(),
        is_active: "TRUE".into(),
        date_terminated: "N/A".into(),
        employee_type: "FTE".into(),
        manager_username: "ssmith".into(),
        phone_number: "512-555-0100".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_state_from_flag() {
        assert_eq!(AccountState::from_flag("FALSE"), AccountState::Suspended);
        assert_eq!(AccountState::from_flag("TRUE"), AccountState::Activated);
        assert_eq!(AccountState::from_flag(""), AccountState::Activated);
        // Only the exact literal suspends
        assert_eq!(AccountState::from_flag("false"), AccountState::Activated);
    }

    #[test]
    fn test_account_state_serialization() {
        assert_eq!(
            serde_json::to_string(&AccountState::Suspended).unwrap(),
            "\"SUSPENDED\""
        );
        assert_eq!(
            serde_json::to_string(&AccountState::Activated).unwrap(),
            "\"ACTIVATED\""
        );
    }

    #[test]
    fn test_group_mapping_resolve() {
        let mapping = GroupMapping {
            groups: vec![
                GroupMapEntry { input: "Sales".into(), value: "Sales Team".into() },
                GroupMapEntry { input: "Eng".into(), value: "Engineering".into() },
            ],
        };
        assert_eq!(mapping.resolve("Sales"), Some("Sales Team"));
        assert_eq!(mapping.resolve("sales"), None);
        assert_eq!(mapping.resolve("HR"), None);
        let values: Vec<&str> = mapping.all_values().collect();
        assert_eq!(values, vec!["Sales Team", "Engineering"]);
    }

    #[test]
    fn test_user_record_identifier() {
        let user = sample_user();
        assert_eq!(user.identifier(), "Jane Doe | jdoe");
        assert_eq!(user.display_name(), "Jane Doe");
    }

    #[test]
    fn test_group_record_csv_headers() {
        let csv = "GroupName,Email,Description,GroupId\nEng,eng@x.com,Engineering,1\n";
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let record: GroupRecord = reader.deserialize().next().unwrap().unwrap();
        assert_eq!(record.group_name, "Eng");
        assert_eq!(record.group_id, "1");
    }

    #[test]
    fn test_directory_entry_gsuite() {
        let dir: DirectoryEntry = serde_json::from_str(
            r#"{"id": "abc", "name": "Corp GSuite", "type": "g_suite"}"#,
        )
        .unwrap();
        assert!(dir.is_gsuite());

        let other: DirectoryEntry =
            serde_json::from_str(r#"{"id": "def", "name": "LDAP", "type": "ldap"}"#).unwrap();
        assert!(!other.is_gsuite());
    }
}
