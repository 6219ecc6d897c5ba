//! Transformation module.
//!
//! Pure builders that reshape validated roster records into the payloads the
//! platform API expects:
//! - groups: group creation payloads
//! - users: minimal bulk-create tuples and rich detail updates
//! - membership: memberOf label resolution into platform group names

pub mod groups;
pub mod membership;
pub mod users;

pub use groups::{build_group_payloads, GroupPayload};
pub use membership::{resolve_group_membership, ResolvedMembership, UNIVERSAL_GROUP};
pub use users::{
    build_bulk_user_payloads, build_user_detail_payloads, BulkUserPayload, UserDetailPayload,
};
