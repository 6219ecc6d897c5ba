//! User creation and update payloads.
//!
//! Users reach the platform in two steps: a minimal bulk-create tuple for
//! every row in one call, then a rich per-user detail update once the
//! accounts exist. Both payloads are built here from the same
//! [`UserRecord`]; the detail update's `manager` field starts as the roster's
//! manager username and is swapped for the manager's platform id by the sync
//! stage just before the PUT.

use chrono::{Duration, Utc};
use serde::Serialize;

use crate::models::{AccountState, UserRecord};

/// One entry of the `POST /v2/bulk/users` body.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BulkUserPayload {
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub username: String,
}

/// Body for `PUT /systemusers/{id}`.
///
/// Field names follow the platform's wire format, which mixes snake_case and
/// camelCase.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserDetailPayload {
    pub activated: bool,
    pub account_locked: bool,
    pub state: AccountState,
    pub addresses: Vec<Address>,
    pub attributes: Vec<CustomAttribute>,
    pub mfa: MfaSettings,
    pub company: String,
    pub department: String,
    #[serde(rename = "employeeIdentifier")]
    pub employee_identifier: String,
    pub firstname: String,
    #[serde(rename = "jobTitle")]
    pub job_title: String,
    pub lastname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,
    #[serde(rename = "employeeType")]
    pub employee_type: String,
    pub middlename: String,
    pub username: String,
    pub displayname: String,
    pub enable_user_portal_multifactor: bool,
    #[serde(rename = "disableDeviceMaxLoginAttempts")]
    pub disable_device_max_login_attempts: bool,
    #[serde(rename = "phoneNumbers")]
    pub phone_numbers: Vec<PhoneNumber>,
}

/// A postal address block. The same source fields are emitted twice, once as
/// the work address and once as the home address.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Address {
    pub country: String,
    #[serde(rename = "extendedAddress")]
    pub extended_address: String,
    pub locality: String,
    #[serde(rename = "poBox")]
    pub po_box: String,
    #[serde(rename = "postalCode")]
    pub postal_code: String,
    pub region: String,
    #[serde(rename = "streetAddress")]
    pub street_address: String,
    #[serde(rename = "type")]
    pub kind: ContactKind,
}

/// A phone number entry; the roster carries a single work number.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PhoneNumber {
    #[serde(rename = "type")]
    pub kind: ContactKind,
    pub number: String,
}

/// Contact block discriminator.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    Work,
    Home,
}

/// A free-form name/value attribute.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CustomAttribute {
    pub name: String,
    pub value: String,
}

/// MFA configuration with a forward-dated exclusion window, giving new hires
/// a grace period to enroll before enforcement starts.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MfaSettings {
    pub configured: bool,
    pub exclusion: bool,
    #[serde(rename = "exclusionUntil")]
    pub exclusion_until: String,
}

/// Minimal creation tuples for the bulk endpoint, one per roster row.
/// The platform email is `username@domain`.
pub fn build_bulk_user_payloads(users: &[UserRecord], email_domain: &str) -> Vec<BulkUserPayload> {
    users
        .iter()
        .map(|user| BulkUserPayload {
            email: format!("{}@{}", user.username, email_domain),
            firstname: user.first_name.clone(),
            lastname: user.last_name.clone(),
            username: user.username.clone(),
        })
        .collect()
}

/// Rich detail updates, one per roster row.
///
/// The activation triple is derived from `isActive`: the literal `FALSE`
/// suspends and locks the account, anything else leaves it active. The MFA
/// exclusion window ends `mfa_exclusion_days` from now.
pub fn build_user_detail_payloads(
    users: &[UserRecord],
    company: &str,
    mfa_exclusion_days: i64,
) -> Vec<UserDetailPayload> {
    let exclusion_until = (Utc::now() + Duration::days(mfa_exclusion_days)).to_rfc3339();

    users
        .iter()
        .map(|user| {
            let state = AccountState::from_flag(&user.is_active);

            let manager = if user.manager_username.trim().is_empty() {
                None
            } else {
                Some(user.manager_username.clone())
            };

            UserDetailPayload {
                activated: state.activated(),
                account_locked: state.locked(),
                state,
                addresses: vec![
                    address_block(user, ContactKind::Work),
                    address_block(user, ContactKind::Home),
                ],
                attributes: vec![CustomAttribute {
                    name: "dateOfEmployment".into(),
                    value: user.date_of_employment.clone(),
                }],
                mfa: MfaSettings {
                    configured: true,
                    exclusion: true,
                    exclusion_until: exclusion_until.clone(),
                },
                company: company.to_string(),
                department: user.department.clone(),
                employee_identifier: user.employee_id.clone(),
                firstname: user.first_name.clone(),
                job_title: user.job_title.clone(),
                lastname: user.last_name.clone(),
                manager,
                employee_type: user.employee_type.clone(),
                middlename: user.middle_name.clone(),
                username: user.username.clone(),
                displayname: user.display_name(),
                enable_user_portal_multifactor: true,
                disable_device_max_login_attempts: false,
                phone_numbers: vec![PhoneNumber {
                    kind: ContactKind::Work,
                    number: user.phone_number.clone(),
                }],
            }
        })
        .collect()
}

fn address_block(user: &UserRecord, kind: ContactKind) -> Address {
    Address {
        country: user.country.clone(),
        extended_address: String::new(),
        locality: user.city.clone(),
        po_box: String::new(),
        postal_code: user.postal_code.clone(),
        region: user.state.clone(),
        street_address: user.street_address.clone(),
        kind,
    }
}
