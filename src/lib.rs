//! # Rosterload - CSV/JSON roster provisioning for JumpCloud
//!
//! Rosterload reads an employee roster and group definitions from flat files
//! and provisions them into a JumpCloud organization: groups first, then a
//! bulk user create, then per-user detail updates, then group membership.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │ files/*.csv │───▶│  Validate   │───▶│  Transform  │───▶│  Directory  │
//! │   *.json    │    │ (pre-flight)│    │  (payloads) │    │  API (HTTP) │
//! └─────────────┘    └─────────────┘    └─────────────┘    └─────────────┘
//! ```
//!
//! All file validation happens before the first network call; per-item
//! remote failures accumulate into a [`SyncReport`] printed at end of run.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rosterload::{run_sync, DirectoryClient, SyncOptions};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = DirectoryClient::from_env().unwrap();
//!     let report = run_sync(&client, &SyncOptions::default()).await.unwrap();
//!     report.print_summary();
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Roster records and platform entities
//! - [`parser`] - CSV reading with encoding auto-detection
//! - [`validation`] - File, header, row, and mapping-schema checks
//! - [`transform`] - Payload builders
//! - [`client`] - JumpCloud REST client
//! - [`sync`] - The four-stage orchestrator

// Core modules
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Validation
pub mod validation;

// Transformation
pub mod transform;

// Directory API
pub mod client;

// Orchestration
pub mod sync;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ApiError, FileError, SyncError, ValidationError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    AccountState, DirectoryEntry, GroupMapping, GroupRecord, MembershipRecord, Organization,
    RemoteGroup, RemoteUser, UserRecord,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{detect_encoding, read_csv_file, ParseResult};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    validate_file, validate_group_mapping, validate_headers, IdTracker, GROUP_CSV_HEADERS,
    MEMBERSHIP_CSV_HEADERS, USER_CSV_HEADERS,
};

// =============================================================================
// Re-exports - Transformers
// =============================================================================

pub use transform::{
    build_bulk_user_payloads, build_group_payloads, build_user_detail_payloads,
    resolve_group_membership, BulkUserPayload, GroupPayload, ResolvedMembership,
    UserDetailPayload, UNIVERSAL_GROUP,
};

// =============================================================================
// Re-exports - Client
// =============================================================================

pub use client::{DirectoryClient, API_KEY_ENV, DEFAULT_BASE_URL};

// =============================================================================
// Re-exports - Sync
// =============================================================================

pub use sync::{
    load_groups, load_mapping, load_membership, load_users, run_sync, ItemFailure, SyncOptions,
    SyncReport,
};
