//! Input validation: file checks, header checks, row-level checks, and
//! JSON-Schema validation of the group mapping file.
//!
//! Everything here is pure over paths and already-parsed data; the loaders
//! in [`crate::sync`] wire these checks together. All validation runs before
//! the first network call, so a malformed roster never reaches the platform.
//!
//! # Required header sets
//!
//! Header checks are order-independent set comparisons: the file may order
//! its columns freely, but any missing or unexpected header is rejected.
//!
//! # Duplicate detection
//!
//! [`IdTracker`] carries one seen-set across an entire validation pass.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

use crate::error::{FileError, FileResult, ValidationError, ValidationResult};

/// Required headers for `users.csv`.
pub const USER_CSV_HEADERS: &[&str] = &[
    "firstName", "middleName", "lastName", "username",
    "jobTitle", "department", "managerName", "employeeId",
    "streetAddress", "city", "state", "postalCode",
    "country", "dateOfEmployment", "isActive", "dateTerminated",
    "employeeType", "managerUsername", "phoneNumber",
];

/// Required headers for `groups.csv`.
pub const GROUP_CSV_HEADERS: &[&str] = &["GroupName", "Email", "Description", "GroupId"];

/// Required headers for `group_membership.csv`.
pub const MEMBERSHIP_CSV_HEADERS: &[&str] = &["username", "memberOf"];

/// Fields that may legitimately be blank in a user row.
pub const USER_BLANK_ALLOWED: &[&str] = &["middleName"];

// =============================================================================
// File Checks
// =============================================================================

/// Check that a path has the expected extension and exists.
///
/// The extension is checked first so `users.txt` reports as a wrong file
/// type even when it is also absent.
pub fn validate_file(path: &Path, expected: &'static str) -> FileResult<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    if !extension.eq_ignore_ascii_case(expected) {
        return Err(FileError::InvalidFileType {
            path: path.display().to_string(),
            expected,
        });
    }

    if !path.is_file() {
        return Err(FileError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Header Checks
// =============================================================================

/// Check a header row against a required set, order-independent.
///
/// Reports both headers that are missing and headers that are not in the
/// required set, so a renamed column shows up on both sides of the message.
pub fn validate_headers(
    file: &str,
    headers: &[String],
    required: &[&str],
) -> ValidationResult<()> {
    let present: HashSet<&str> = headers.iter().map(String::as_str).collect();
    let wanted: HashSet<&str> = required.iter().copied().collect();

    let missing: Vec<String> = required
        .iter()
        .filter(|h| !present.contains(**h))
        .map(|h| h.to_string())
        .collect();

    let unexpected: Vec<String> = headers
        .iter()
        .filter(|h| !wanted.contains(h.as_str()))
        .cloned()
        .collect();

    if missing.is_empty() && unexpected.is_empty() && headers.len() == required.len() {
        return Ok(());
    }

    Err(ValidationError::HeaderMismatch {
        file: file.to_string(),
        missing,
        unexpected,
    })
}

// =============================================================================
// Row Checks
// =============================================================================

/// Names of blank fields in a record, skipping the allowed ones.
///
/// The record is inspected through its serialized form so the reported names
/// are the CSV header names, not Rust field names.
pub fn blank_fields<T: Serialize>(record: &T, allow_blank: &[&str]) -> Vec<String> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map
            .iter()
            .filter(|(name, value)| {
                !allow_blank.contains(&name.as_str()) && is_blank(value)
            })
            .map(|(name, _)| name.clone())
            .collect(),
        _ => Vec::new(),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::String(s) => s.trim().is_empty(),
        Value::Null => true,
        _ => false,
    }
}

/// Reject a record with any blank required field.
pub fn check_blank_fields<T: Serialize>(
    record: &T,
    allow_blank: &[&str],
    identifier: &str,
    line: usize,
) -> ValidationResult<()> {
    match blank_fields(record, allow_blank).into_iter().next() {
        Some(field) => Err(ValidationError::BlankField {
            field,
            identifier: identifier.to_string(),
            line,
        }),
        None => Ok(()),
    }
}

/// Duplicate-ID detection across an entire file.
///
/// One tracker instance is threaded through the whole validation pass, so a
/// value seen on an earlier row is rejected when it reappears.
#[derive(Debug)]
pub struct IdTracker {
    kind: &'static str,
    seen: HashSet<String>,
}

impl IdTracker {
    /// Create a tracker for one class of identifier (`"username"`,
    /// `"employee ID"`, `"group ID"`).
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            seen: HashSet::new(),
        }
    }

    /// Record a value, rejecting it if it was already seen.
    pub fn check(&mut self, value: &str, line: usize) -> ValidationResult<()> {
        if !self.seen.insert(value.to_string()) {
            return Err(ValidationError::DuplicateId {
                kind: self.kind,
                value: value.to_string(),
                line,
            });
        }
        Ok(())
    }
}

// =============================================================================
// Group Mapping Schema
// =============================================================================

/// Validate a parsed `group_mapping.json` document against the embedded
/// schema (`schemas/group-mapping.json`).
pub fn validate_group_mapping(data: &Value) -> ValidationResult<()> {
    let schema: Value = serde_json::from_str(include_str!("../../schemas/group-mapping.json"))
        .expect("Invalid embedded schema");

    let validator = jsonschema::draft7::new(&schema).map_err(|e| {
        ValidationError::InvalidMapping {
            errors: vec![format!("Invalid schema: {e}")],
        }
    })?;

    let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::InvalidMapping { errors })
    }
}
