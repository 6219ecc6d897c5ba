//! Directory platform API client.
//!
//! [`DirectoryClient`] wraps the JumpCloud REST API behind one method per
//! operation: organization/directory lookups, group CRUD, system-user
//! lookup/creation/update, membership mutation, and external-directory
//! association. Every operation is a single sequential request; there is no
//! retry, caching, or batching beyond what the bulk endpoint itself offers.
//!
//! Authentication is an `x-api-key` header. Every request builds its own
//! header set; nothing is shared or mutated between calls.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rosterload::client::DirectoryClient;
//!
//! let client = DirectoryClient::from_env()?;
//! let orgs = client.list_organizations().await?;
//! ```

use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{ApiError, ApiResult};
use crate::models::{DirectoryEntry, Organization, RemoteGroup, RemoteUser};
use crate::transform::{BulkUserPayload, GroupPayload, UserDetailPayload};

/// Console API root.
pub const DEFAULT_BASE_URL: &str = "https://console.jumpcloud.com/api";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "JUMPCLOUD_API_KEY";

const API_VERSION: &str = "v2";

/// JumpCloud REST API client.
#[derive(Clone)]
pub struct DirectoryClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

// =============================================================================
// Response Envelopes
// =============================================================================

/// `{ "totalCount": n, "results": [...] }` envelope used by `/systemusers`
/// and `/organizations`.
#[derive(Debug, Deserialize)]
struct ResultsEnvelope<T> {
    #[serde(rename = "totalCount", default)]
    total_count: u64,
    #[serde(default)]
    results: Vec<T>,
}

/// `{ "id": ..., "op": "add", "type": "user" }` body shared by membership
/// and directory-association mutations.
#[derive(Debug, Serialize)]
struct MemberOp<'a> {
    id: &'a str,
    op: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
}

impl<'a> MemberOp<'a> {
    fn add_user(user_id: &'a str) -> Self {
        Self {
            id: user_id,
            op: "add",
            kind: "user",
        }
    }
}

// =============================================================================
// Client
// =============================================================================

impl DirectoryClient {
    /// Create a new client with an explicit API key.
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from the `JUMPCLOUD_API_KEY` environment variable.
    pub fn from_env() -> ApiResult<Self> {
        // Try loading .env file
        let _ = dotenvy::dotenv();

        let api_key = env::var(API_KEY_ENV).map_err(|_| ApiError::MissingApiKey)?;
        Ok(Self::new(api_key))
    }

    /// Override the API base URL (self-hosted consoles, test servers).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Versioned API root (`{base}/v2`).
    fn api_url(&self) -> String {
        format!("{}/{}", self.base_url, API_VERSION)
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.get(url).header("x-api-key", &self.api_key)
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.post(url).header("x-api-key", &self.api_key)
    }

    fn put(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.put(url).header("x-api-key", &self.api_key)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> ApiResult<Response> {
        request
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))
    }

    /// Map a non-success status to an explicit error, keeping 401 distinct
    /// so call sites can abort the whole run on bad credentials.
    async fn expect_status(response: Response, expected: StatusCode) -> ApiResult<Response> {
        let status = response.status();
        if status == expected {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized(body));
        }
        Err(ApiError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        })
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> ApiResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    // -------------------------------------------------------------------------
    // Organizations & Directories
    // -------------------------------------------------------------------------

    /// List the organizations this API key can manage.
    pub async fn list_organizations(&self) -> ApiResult<Vec<Organization>> {
        let url = format!("{}/organizations/", self.base_url);
        let response = self.send(self.get(&url)).await?;
        let response = Self::expect_status(response, StatusCode::OK).await?;
        let envelope: ResultsEnvelope<Organization> = Self::read_json(response).await?;
        Ok(envelope.results)
    }

    /// List every external directory linked to the organization.
    pub async fn list_directories(&self) -> ApiResult<Vec<DirectoryEntry>> {
        let url = format!("{}/directories", self.api_url());
        let response = self.send(self.get(&url)).await?;
        let response = Self::expect_status(response, StatusCode::OK).await?;
        Self::read_json(response).await
    }

    /// The G Suite subset of the linked directories.
    pub async fn list_gsuite_directories(&self) -> ApiResult<Vec<DirectoryEntry>> {
        let directories = self.list_directories().await?;
        Ok(directories.into_iter().filter(|d| d.is_gsuite()).collect())
    }

    // -------------------------------------------------------------------------
    // Groups
    // -------------------------------------------------------------------------

    /// Create one user group. Success is 201.
    pub async fn create_group(&self, payload: &GroupPayload) -> ApiResult<()> {
        let url = format!("{}/usergroups", self.api_url());
        let response = self.send(self.post(&url).json(payload)).await?;
        Self::expect_status(response, StatusCode::CREATED).await?;
        Ok(())
    }

    /// List all groups of any type.
    pub async fn list_groups(&self) -> ApiResult<Vec<RemoteGroup>> {
        let url = format!("{}/groups", self.api_url());
        let response = self.send(self.get(&url)).await?;
        let response = Self::expect_status(response, StatusCode::OK).await?;
        Self::read_json(response).await
    }

    /// Resolve a group name to its platform id.
    ///
    /// The name arrives transport-encoded (`+` for spaces) and the URL is
    /// assembled by hand so the `+` reaches the platform as a space, which
    /// is what the name filter matches against.
    pub async fn find_group_id(&self, name: &str) -> ApiResult<String> {
        let url = format!("{}/usergroups?filter=name:eq:{}", self.api_url(), name);
        let response = self.send(self.get(&url)).await?;
        let response = Self::expect_status(response, StatusCode::OK).await?;
        let groups: Vec<RemoteGroup> = Self::read_json(response).await?;

        groups
            .into_iter()
            .next()
            .map(|group| group.id)
            .ok_or_else(|| ApiError::RemoteNotFound {
                what: format!("group {name}"),
            })
    }

    /// Add a user to a group. Success is 204.
    pub async fn add_group_member(&self, group_id: &str, user_id: &str) -> ApiResult<()> {
        let url = format!("{}/usergroups/{}/members", self.api_url(), group_id);
        let body = MemberOp::add_user(user_id);
        let response = self.send(self.post(&url).json(&body)).await?;
        Self::expect_status(response, StatusCode::NO_CONTENT).await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // System Users
    // -------------------------------------------------------------------------

    /// List system users, up to `limit`.
    pub async fn list_system_users(&self, limit: u32) -> ApiResult<Vec<RemoteUser>> {
        let url = format!("{}/systemusers", self.base_url);
        let request = self.get(&url).query(&[("limit", limit.to_string())]);
        let response = self.send(request).await?;
        let response = Self::expect_status(response, StatusCode::OK).await?;
        let envelope: ResultsEnvelope<RemoteUser> = Self::read_json(response).await?;
        Ok(envelope.results)
    }

    /// Create many users in one call. Success is 200.
    ///
    /// The bulk endpoint wants a `creation-source` header; it is attached to
    /// this request only.
    pub async fn create_bulk_users(&self, payloads: &[BulkUserPayload]) -> ApiResult<()> {
        let url = format!("{}/bulk/users", self.api_url());
        let request = self
            .post(&url)
            .header("creation-source", "jumpcloud:bulk")
            .json(payloads);
        let response = self.send(request).await?;
        Self::expect_status(response, StatusCode::OK).await?;
        Ok(())
    }

    /// Resolve a username to its platform id with an exact-match filter.
    pub async fn find_user_id(&self, username: &str) -> ApiResult<String> {
        let url = format!("{}/systemusers", self.base_url);
        let request = self
            .get(&url)
            .query(&[("filter", format!("username:$eq:{username}"))]);
        let response = self.send(request).await?;
        let response = Self::expect_status(response, StatusCode::OK).await?;
        let envelope: ResultsEnvelope<RemoteUser> = Self::read_json(response).await?;

        if envelope.total_count == 0 {
            return Err(ApiError::RemoteNotFound {
                what: username.to_string(),
            });
        }

        envelope
            .results
            .into_iter()
            .next()
            .map(|user| user.id)
            .ok_or_else(|| ApiError::RemoteNotFound {
                what: username.to_string(),
            })
    }

    /// Fetch a single user by platform id.
    pub async fn get_system_user(&self, user_id: &str) -> ApiResult<RemoteUser> {
        let url = format!("{}/systemusers/{}", self.base_url, user_id);
        let response = self.send(self.get(&url)).await?;
        let response = Self::expect_status(response, StatusCode::OK).await?;
        Self::read_json(response).await
    }

    /// Push a detail update to an existing user. Success is 200.
    pub async fn update_user(&self, user_id: &str, payload: &UserDetailPayload) -> ApiResult<()> {
        let url = format!("{}/systemusers/{}", self.base_url, user_id);
        let response = self.send(self.put(&url).json(payload)).await?;
        Self::expect_status(response, StatusCode::OK).await?;
        Ok(())
    }

    /// Associate a user with an external directory. Success is 204.
    pub async fn associate_directory(&self, directory_id: &str, user_id: &str) -> ApiResult<()> {
        let url = format!("{}/gsuites/{}/associations", self.api_url(), directory_id);
        let body = MemberOp::add_user(user_id);
        let response = self.send(self.post(&url).json(&body)).await?;
        Self::expect_status(response, StatusCode::NO_CONTENT).await?;
        Ok(())
    }
}
