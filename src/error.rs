//! Error types for the rosterload provisioning pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`FileError`] - input file access and parsing errors
//! - [`ValidationError`] - header/row validation errors
//! - [`ApiError`] - directory platform API errors
//! - [`SyncError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Input File Errors
// =============================================================================

/// Errors while locating or reading an input file.
#[derive(Debug, Error)]
pub enum FileError {
    /// File extension does not match the expected format.
    #[error("{path} is not a valid .{expected} file")]
    InvalidFileType { path: String, expected: &'static str },

    /// File does not exist.
    #[error("{path} does not exist")]
    FileNotFound { path: String },

    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV content.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed JSON content.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors during header and row validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Header set differs from the required set.
    #[error("{file} has mismatched headers (missing: [{}], unexpected: [{}])",
        .missing.join(", "), .unexpected.join(", "))]
    HeaderMismatch {
        file: String,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    /// A required field is blank.
    #[error("{field} cannot be blank. The issue is at {identifier} on line {line}")]
    BlankField {
        field: String,
        identifier: String,
        line: usize,
    },

    /// An identifier was already seen earlier in the file.
    #[error("The {kind} {value} on line {line} conflicts with an earlier row")]
    DuplicateId {
        kind: &'static str,
        value: String,
        line: usize,
    },

    /// The group mapping file failed schema validation.
    #[error("Invalid group mapping: {}", .errors.join("; "))]
    InvalidMapping { errors: Vec<String> },
}

// =============================================================================
// Directory API Errors
// =============================================================================

/// Errors from the directory platform client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing API key.
    #[error("Missing JUMPCLOUD_API_KEY environment variable")]
    MissingApiKey,

    /// Transport-level failure (connection, DNS, timeout).
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    /// The platform rejected our credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Non-success status for a single operation.
    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// A lookup returned no results.
    #[error("No results found for {what}")]
    RemoteNotFound { what: String },

    /// Response body did not have the expected shape.
    #[error("Malformed response from the platform: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Whether this error must abort the whole run rather than be
    /// accumulated into the end-of-run report.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ApiError::MissingApiKey | ApiError::RequestFailed(_) | ApiError::Unauthorized(_)
        )
    }
}

// =============================================================================
// Sync Errors (top-level)
// =============================================================================

/// Top-level orchestration errors.
///
/// This is the main error type returned by [`crate::sync::run_sync`].
/// It wraps all lower-level errors and adds run-specific variants.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Input file error.
    #[error("File error: {0}")]
    File(#[from] FileError),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Directory API error.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The bulk user creation call failed; nothing further can proceed.
    #[error("Bulk user creation failed: {0}")]
    BulkCreateFailed(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for file operations.
pub type FileResult<T> = Result<T, FileError>;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for directory API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // FileError -> SyncError
        let file_err = FileError::FileNotFound {
            path: "files/users.csv".into(),
        };
        let sync_err: SyncError = file_err.into();
        assert!(sync_err.to_string().contains("does not exist"));

        // ApiError -> SyncError
        let api_err = ApiError::RemoteNotFound {
            what: "jdoe".into(),
        };
        let sync_err: SyncError = api_err.into();
        assert!(sync_err.to_string().contains("jdoe"));
    }

    #[test]
    fn test_blank_field_format() {
        let err = ValidationError::BlankField {
            field: "department".into(),
            identifier: "Jane Doe | jdoe".into(),
            line: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("department cannot be blank"));
        assert!(msg.contains("Jane Doe | jdoe"));
        assert!(msg.contains("line 4"));
    }

    #[test]
    fn test_header_mismatch_format() {
        let err = ValidationError::HeaderMismatch {
            file: "groups.csv".into(),
            missing: vec!["GroupId".into()],
            unexpected: vec!["groupid".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("GroupId"));
        assert!(msg.contains("groupid"));
    }

    #[test]
    fn test_fatal_classification() {
        assert!(ApiError::MissingApiKey.is_fatal());
        assert!(ApiError::RequestFailed("connection refused".into()).is_fatal());
        assert!(ApiError::Unauthorized("bad key".into()).is_fatal());
        assert!(!ApiError::RemoteNotFound { what: "x".into() }.is_fatal());
        assert!(!ApiError::UnexpectedStatus { status: 409, body: String::new() }.is_fatal());
    }
}
