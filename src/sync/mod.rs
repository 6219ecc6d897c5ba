//! The sync pipeline: load → validate → transform → push.
//!
//! [`run_sync`] drives the four platform stages in order:
//!
//! 1. **CreateGroups** - one POST per group; per-group failures accumulate.
//! 2. **CreateUsers** - one bulk POST for the whole roster; failure aborts.
//! 3. **UpdateUsers** - per user: manager resolution, detail PUT, directory
//!    association; per-user failures accumulate.
//! 4. **AssignGroupMembership** - per user and group: id lookups plus a
//!    membership POST; per-item failures accumulate.
//!
//! Every input file is loaded and validated before the first network call,
//! so a malformed roster never half-provisions. Bad credentials, transport
//! failures, and a failed bulk create abort immediately; everything else is
//! collected into a [`SyncReport`] and reported at the end of the run.

use std::path::{Path, PathBuf};

use crate::client::DirectoryClient;
use crate::error::{SyncError, SyncResult, ValidationResult};
use crate::models::{GroupMapping, GroupRecord, MembershipRecord, UserRecord};
use crate::parser::{read_csv_file, read_csv_headers};
use crate::transform::{
    build_bulk_user_payloads, build_group_payloads, build_user_detail_payloads,
    resolve_group_membership,
};
use crate::validation::{
    check_blank_fields, validate_file, validate_group_mapping, validate_headers, IdTracker,
    GROUP_CSV_HEADERS, MEMBERSHIP_CSV_HEADERS, USER_BLANK_ALLOWED, USER_CSV_HEADERS,
};

/// Fixed input file names, resolved inside the files directory.
pub const GROUPS_FILE: &str = "groups.csv";
pub const USERS_FILE: &str = "users.csv";
pub const MEMBERSHIP_FILE: &str = "group_membership.csv";
pub const MAPPING_FILE: &str = "group_mapping.json";

/// Default email domain for platform accounts.
pub const DEFAULT_EMAIL_DOMAIN: &str = "amplyr.com";

/// Default company name pushed on detail updates.
pub const DEFAULT_COMPANY: &str = "Amplyr LLC";

/// Default MFA enrollment grace period in days.
pub const DEFAULT_MFA_EXCLUSION_DAYS: i64 = 3;

// =============================================================================
// Options & Report
// =============================================================================

/// Options for a sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Directory holding the four input files.
    pub files_dir: PathBuf,

    /// Domain appended to usernames to form platform emails.
    pub email_domain: String,

    /// Company name carried on every detail update.
    pub company: String,

    /// Days until the MFA exclusion window closes.
    pub mfa_exclusion_days: i64,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            files_dir: PathBuf::from("files"),
            email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
            company: DEFAULT_COMPANY.to_string(),
            mfa_exclusion_days: DEFAULT_MFA_EXCLUSION_DAYS,
        }
    }
}

/// One per-item failure, kept for the end-of-run summary.
#[derive(Debug, Clone)]
pub struct ItemFailure {
    /// What failed (group name, username).
    pub item: String,
    /// Why.
    pub reason: String,
}

impl ItemFailure {
    fn new(item: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            item: item.into(),
            reason: reason.to_string(),
        }
    }
}

/// Outcome of a sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub groups_created: usize,
    pub users_created: usize,
    pub users_updated: usize,
    pub memberships_added: usize,
    pub group_failures: Vec<ItemFailure>,
    pub update_failures: Vec<ItemFailure>,
    pub membership_failures: Vec<ItemFailure>,
}

impl SyncReport {
    /// Whether any per-item operation failed.
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Total number of per-item failures across all stages.
    pub fn failure_count(&self) -> usize {
        self.group_failures.len() + self.update_failures.len() + self.membership_failures.len()
    }

    /// Print the end-of-run summary to stderr.
    pub fn print_summary(&self) {
        eprintln!("\n📊 Sync summary:");
        eprintln!("   Groups created: {}", self.groups_created);
        eprintln!("   Users created: {}", self.users_created);
        eprintln!("   Users updated: {}", self.users_updated);
        eprintln!("   Memberships added: {}", self.memberships_added);

        if !self.has_failures() {
            eprintln!("   ✅ No failures");
            return;
        }

        eprintln!("   ❌ {} failure(s):", self.failure_count());
        for (stage, failures) in [
            ("group", &self.group_failures),
            ("update", &self.update_failures),
            ("membership", &self.membership_failures),
        ] {
            for failure in failures.iter() {
                eprintln!("      [{}] {}: {}", stage, failure.item, failure.reason);
            }
        }
    }
}

// =============================================================================
// Loaders
// =============================================================================

/// Load and validate `groups.csv`.
pub fn load_groups(files_dir: &Path) -> SyncResult<Vec<GroupRecord>> {
    let path = files_dir.join(GROUPS_FILE);
    validate_file(&path, "csv")?;

    let headers = read_csv_headers(&path)?;
    validate_headers(GROUPS_FILE, &headers, GROUP_CSV_HEADERS)?;

    let parsed = read_csv_file::<GroupRecord>(&path)?;

    let mut group_ids = IdTracker::new("group ID");
    for (index, group) in parsed.records.iter().enumerate() {
        let line = index + 2;
        check_blank_fields(group, &[], &group.group_name, line)?;
        group_ids.check(&group.group_id, line)?;
    }

    Ok(parsed.records)
}

/// Load and validate `users.csv`.
pub fn load_users(files_dir: &Path) -> SyncResult<Vec<UserRecord>> {
    let path = files_dir.join(USERS_FILE);
    validate_file(&path, "csv")?;

    let headers = read_csv_headers(&path)?;
    validate_headers(USERS_FILE, &headers, USER_CSV_HEADERS)?;

    let parsed = read_csv_file::<UserRecord>(&path)?;

    validate_user_rows(&parsed.records)?;
    Ok(parsed.records)
}

/// Row-level user checks: blank fields, then duplicate employee ids and
/// usernames, with one tracker each threaded across the whole file.
fn validate_user_rows(users: &[UserRecord]) -> ValidationResult<()> {
    let mut employee_ids = IdTracker::new("employee ID");
    let mut usernames = IdTracker::new("username");

    for (index, user) in users.iter().enumerate() {
        let line = index + 2;
        check_blank_fields(user, USER_BLANK_ALLOWED, &user.identifier(), line)?;
        employee_ids.check(&user.employee_id, line)?;
        usernames.check(&user.username, line)?;
    }

    Ok(())
}

/// Load and validate `group_membership.csv`.
pub fn load_membership(files_dir: &Path) -> SyncResult<Vec<MembershipRecord>> {
    let path = files_dir.join(MEMBERSHIP_FILE);
    validate_file(&path, "csv")?;

    let headers = read_csv_headers(&path)?;
    validate_headers(MEMBERSHIP_FILE, &headers, MEMBERSHIP_CSV_HEADERS)?;

    let parsed = read_csv_file::<MembershipRecord>(&path)?;
    Ok(parsed.records)
}

/// Load `group_mapping.json` and validate it against the embedded schema.
pub fn load_mapping(files_dir: &Path) -> SyncResult<GroupMapping> {
    let path = files_dir.join(MAPPING_FILE);
    validate_file(&path, "json")?;

    let content = std::fs::read_to_string(&path).map_err(crate::error::FileError::from)?;
    let document: serde_json::Value =
        serde_json::from_str(&content).map_err(crate::error::FileError::from)?;

    validate_group_mapping(&document)?;

    let mapping: GroupMapping =
        serde_json::from_value(document).map_err(crate::error::FileError::from)?;
    Ok(mapping)
}

// =============================================================================
// Pipeline
// =============================================================================

/// Run the full sync: validate every input, then drive the four stages.
pub async fn run_sync(client: &DirectoryClient, options: &SyncOptions) -> SyncResult<SyncReport> {
    // Load and validate every input before the first network call.
    eprintln!("📖 Validating input files in {}...", options.files_dir.display());
    let groups = load_groups(&options.files_dir)?;
    let users = load_users(&options.files_dir)?;
    let membership_rows = load_membership(&options.files_dir)?;
    let mapping = load_mapping(&options.files_dir)?;
    eprintln!(
        "   ✅ {} groups, {} users, {} membership rows, {} mappings",
        groups.len(),
        users.len(),
        membership_rows.len(),
        mapping.groups.len()
    );

    let mut report = SyncReport::default();

    create_groups(client, &groups, &mut report).await?;
    create_users(client, &users, options, &mut report).await?;
    update_users(client, &users, options, &mut report).await?;
    assign_membership(client, &membership_rows, &mapping, &mut report).await?;

    Ok(report)
}

/// Stage 1: create every group; per-group failures accumulate.
async fn create_groups(
    client: &DirectoryClient,
    groups: &[GroupRecord],
    report: &mut SyncReport,
) -> SyncResult<()> {
    let payloads = build_group_payloads(groups);
    eprintln!("\n📦 Creating {} groups...", payloads.len());

    for payload in &payloads {
        match client.create_group(payload).await {
            Ok(()) => {
                report.groups_created += 1;
                eprintln!("   ✅ Imported group {}", payload.name);
            }
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => report.group_failures.push(ItemFailure::new(&payload.name, e)),
        }
    }

    Ok(())
}

/// Stage 2: one bulk-create call for the whole roster; any failure aborts.
async fn create_users(
    client: &DirectoryClient,
    users: &[UserRecord],
    options: &SyncOptions,
    report: &mut SyncReport,
) -> SyncResult<()> {
    let payloads = build_bulk_user_payloads(users, &options.email_domain);
    eprintln!("\n👥 Creating {} users in bulk...", payloads.len());

    client
        .create_bulk_users(&payloads)
        .await
        .map_err(|e| match e {
            e if e.is_fatal() => SyncError::Api(e),
            e => SyncError::BulkCreateFailed(e.to_string()),
        })?;

    report.users_created = payloads.len();
    eprintln!("   ✅ Imported {} users", payloads.len());
    Ok(())
}

/// Stage 3: per-user detail updates and directory association.
async fn update_users(
    client: &DirectoryClient,
    users: &[UserRecord],
    options: &SyncOptions,
    report: &mut SyncReport,
) -> SyncResult<()> {
    let payloads = build_user_detail_payloads(users, &options.company, options.mfa_exclusion_days);
    eprintln!("\n📝 Updating {} users...", payloads.len());

    let gsuite_directory = client
        .list_gsuite_directories()
        .await?
        .into_iter()
        .next()
        .map(|d| d.id);
    if gsuite_directory.is_none() {
        eprintln!("   ⚠️  No G Suite directory linked; skipping directory association");
    }

    for mut payload in payloads {
        let username = payload.username.clone();

        // Swap the manager username for the manager's platform id.
        if let Some(manager_username) = payload.manager.clone() {
            match client.find_user_id(&manager_username).await {
                Ok(manager_id) => payload.manager = Some(manager_id),
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    payload.manager = None;
                    report.update_failures.push(ItemFailure::new(
                        &username,
                        format!("manager {manager_username}: {e}"),
                    ));
                }
            }
        }

        let user_id = match client.find_user_id(&username).await {
            Ok(id) => id,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                report.update_failures.push(ItemFailure::new(&username, e));
                continue;
            }
        };

        match client.update_user(&user_id, &payload).await {
            Ok(()) => {
                report.users_updated += 1;
                eprintln!("   ✅ Updated {username}");
            }
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                report.update_failures.push(ItemFailure::new(&username, e));
                continue;
            }
        }

        if let Some(directory_id) = &gsuite_directory {
            match client.associate_directory(directory_id, &user_id).await {
                Ok(()) => eprintln!("   ✅ Linked {username} to G Suite"),
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => report.update_failures.push(ItemFailure::new(
                    &username,
                    format!("directory association: {e}"),
                )),
            }
        }
    }

    Ok(())
}

/// Stage 4: resolve memberships and attach users to groups.
async fn assign_membership(
    client: &DirectoryClient,
    rows: &[MembershipRecord],
    mapping: &GroupMapping,
    report: &mut SyncReport,
) -> SyncResult<()> {
    let memberships = resolve_group_membership(rows, mapping);
    eprintln!("\n🔗 Assigning group membership for {} users...", memberships.len());

    for membership in &memberships {
        let user_id = match client.find_user_id(&membership.username).await {
            Ok(id) => id,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                report
                    .membership_failures
                    .push(ItemFailure::new(&membership.username, e));
                continue;
            }
        };

        for group in &membership.groups {
            let group_id = match client.find_group_id(group).await {
                Ok(id) => id,
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    report.membership_failures.push(ItemFailure::new(
                        &membership.username,
                        format!("{group}: {e}"),
                    ));
                    continue;
                }
            };

            match client.add_group_member(&group_id, &user_id).await {
                Ok(()) => {
                    report.memberships_added += 1;
                    eprintln!("   ✅ Added {} to {}", membership.username, group);
                }
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => report.membership_failures.push(ItemFailure::new(
                    &membership.username,
                    format!("{group}: {e}"),
                )),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FileError, ValidationError};
    use std::fs;

    const USER_HEADER: &str = "firstName,middleName,lastName,username,jobTitle,department,managerName,employeeId,streetAddress,city,state,postalCode,country,dateOfEmployment,isActive,dateTerminated,employeeType,managerUsername,phoneNumber";

    fn user_row(first: &str, username: &str, employee_id: &str) -> String {
        format!(
            "{first},A,Doe,{username},Engineer,Engineering,Sam Smith,{employee_id},1 Main St,Austin,TX,78701,US,2024-01-15,TRUE,N/A,FTE,ssmith,512-555-0100"
        )
    }

    fn write_files(dir: &Path, users: &[String]) {
        fs::write(
            dir.join(GROUPS_FILE),
            "GroupName,Email,Description,GroupId\nEng,eng@x.com,Engineering,1\n",
        )
        .unwrap();
        fs::write(
            dir.join(USERS_FILE),
            format!("{USER_HEADER}\n{}\n", users.join("\n")),
        )
        .unwrap();
        fs::write(dir.join(MEMBERSHIP_FILE), "username,memberOf\njdoe,ALL\n").unwrap();
        fs::write(
            dir.join(MAPPING_FILE),
            r#"{ "groups": [{ "input": "Eng", "value": "Engineering" }] }"#,
        )
        .unwrap();
    }

    #[test]
    fn test_load_valid_inputs() {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), &[user_row("Jane", "jdoe", "1001")]);

        let groups = load_groups(dir.path()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].group_id, "1");

        let users = load_users(dir.path()).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "jdoe");

        let rows = load_membership(dir.path()).unwrap();
        assert_eq!(rows[0].member_of, "ALL");

        let mapping = load_mapping(dir.path()).unwrap();
        assert_eq!(mapping.resolve("Eng"), Some("Engineering"));
    }

    #[test]
    fn test_missing_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_groups(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            SyncError::File(FileError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_duplicate_employee_id_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_files(
            dir.path(),
            &[
                user_row("Jane", "jdoe", "1001"),
                user_row("John", "jsmith", "1001"),
            ],
        );

        let err = load_users(dir.path()).unwrap_err();
        match err {
            SyncError::Validation(ValidationError::DuplicateId { kind, value, line }) => {
                assert_eq!(kind, "employee ID");
                assert_eq!(value, "1001");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_files(
            dir.path(),
            &[
                user_row("Jane", "jdoe", "1001"),
                user_row("John", "jdoe", "1002"),
            ],
        );

        let err = load_users(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            SyncError::Validation(ValidationError::DuplicateId { kind: "username", .. })
        ));
    }

    #[test]
    fn test_blank_required_field_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let row = user_row("Jane", "jdoe", "1001").replace("Engineering", "");
        write_files(dir.path(), &[row]);

        let err = load_users(dir.path()).unwrap_err();
        match err {
            SyncError::Validation(ValidationError::BlankField { field, line, .. }) => {
                assert_eq!(field, "department");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_blank_middle_name_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let row = user_row("Jane", "jdoe", "1001").replace(",A,", ",,");
        write_files(dir.path(), &[row]);

        assert!(load_users(dir.path()).is_ok());
    }

    #[test]
    fn test_reordered_headers_accepted() {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), &[user_row("Jane", "jdoe", "1001")]);
        fs::write(
            dir.path().join(GROUPS_FILE),
            "GroupId,GroupName,Email,Description\n1,Eng,eng@x.com,Engineering\n",
        )
        .unwrap();

        let groups = load_groups(dir.path()).unwrap();
        assert_eq!(groups[0].group_name, "Eng");
    }

    #[test]
    fn test_extra_header_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), &[user_row("Jane", "jdoe", "1001")]);
        fs::write(
            dir.path().join(GROUPS_FILE),
            "GroupName,Email,Description,GroupId,Owner\nEng,eng@x.com,Engineering,1,me\n",
        )
        .unwrap();

        let err = load_groups(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            SyncError::Validation(ValidationError::HeaderMismatch { .. })
        ));
    }

    #[test]
    fn test_duplicate_group_id_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), &[user_row("Jane", "jdoe", "1001")]);
        fs::write(
            dir.path().join(GROUPS_FILE),
            "GroupName,Email,Description,GroupId\nEng,eng@x.com,Engineering,1\nSales,sales@x.com,Sales,1\n",
        )
        .unwrap();

        let err = load_groups(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            SyncError::Validation(ValidationError::DuplicateId { kind: "group ID", .. })
        ));
    }

    #[test]
    fn test_mapping_schema_violation_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_files(dir.path(), &[user_row("Jane", "jdoe", "1001")]);
        fs::write(
            dir.path().join(MAPPING_FILE),
            r#"{ "groups": [{ "input": "Eng" }] }"#,
        )
        .unwrap();

        let err = load_mapping(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            SyncError::Validation(ValidationError::InvalidMapping { .. })
        ));
    }

    #[test]
    fn test_empty_mapping_document_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MAPPING_FILE), "{}").unwrap();

        let err = load_mapping(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            SyncError::Validation(ValidationError::InvalidMapping { .. })
        ));
    }

    #[test]
    fn test_unparseable_mapping_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MAPPING_FILE), "not json").unwrap();

        let err = load_mapping(dir.path()).unwrap_err();
        assert!(matches!(err, SyncError::File(FileError::Json(_))));
    }

    #[test]
    fn test_report_accounting() {
        let mut report = SyncReport::default();
        assert!(!report.has_failures());

        report.groups_created = 2;
        report.update_failures.push(ItemFailure::new("jdoe", "boom"));
        assert!(report.has_failures());
        assert_eq!(report.failure_count(), 1);
    }

    #[test]
    fn test_default_options() {
        let options = SyncOptions::default();
        assert_eq!(options.files_dir, PathBuf::from("files"));
        assert_eq!(options.email_domain, "amplyr.com");
        assert_eq!(options.company, "Amplyr LLC");
        assert_eq!(options.mfa_exclusion_days, 3);
    }
}
