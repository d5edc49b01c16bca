//! REST client for a JIRA-style issue tracker.
//!
//! Implements the `revlink_core::Tracker` seam over the tracker's v2 REST
//! API with basic auth. The client is constructed once per invocation via
//! [`RestTracker::connect`], which probes the authenticated `myself`
//! endpoint so credential and connectivity problems surface before any
//! parsing work happens.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use revlink_core::{RevlinkError, Tracker, TrackerConfig, TrackerUser};

use crate::error::{Result, TrackerError};

/// Per-request timeout. The hook has no other cancellation layer, so a
/// hung tracker must not block the pipeline forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// User record as the tracker's user-search endpoint returns it.
#[derive(Debug, Clone, Deserialize)]
struct UserDto {
    name: String,
    #[serde(rename = "displayName", default)]
    display_name: String,
    #[serde(rename = "emailAddress", default)]
    email_address: Option<String>,
}

impl From<UserDto> for TrackerUser {
    fn from(dto: UserDto) -> Self {
        TrackerUser {
            username: dto.name,
            display_name: dto.display_name,
            email: dto.email_address,
        }
    }
}

/// Authenticated REST client for one tracker server.
pub struct RestTracker {
    config: TrackerConfig,
    base: String,
    http: reqwest::Client,
}

impl RestTracker {
    /// Build the client without probing the server.
    pub fn new(config: TrackerConfig) -> Result<Self> {
        if config.server_url.trim().is_empty() {
            return Err(TrackerError::InvalidUrl(config.server_url));
        }
        let base = config.server_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .user_agent(concat!("revlink/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { config, base, http })
    }

    /// Build the client and verify credentials against the `myself`
    /// endpoint. Fails fast on auth or network problems.
    pub async fn connect(config: TrackerConfig) -> Result<Self> {
        let client = Self::new(config)?;
        let url = client.api_url("myself");
        let response = client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(TrackerError::Status {
                status: response.status().as_u16(),
                url,
            });
        }
        info!(server = %client.base, "tracker connection verified");
        Ok(client)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/rest/api/2/{}", self.base, path)
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .basic_auth(&self.config.username, Some(&self.config.password))
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .post(url)
            .basic_auth(&self.config.username, Some(&self.config.password))
    }

    async fn search_users_raw(&self, query: &str) -> Result<Vec<UserDto>> {
        let url = self.api_url("user/search");
        let response = self
            .get(&url)
            .query(&[("username", query)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TrackerError::Status {
                status: response.status().as_u16(),
                url,
            });
        }
        Ok(response.json().await?)
    }

    async fn verify_issue_raw(&self, key: &str) -> Result<()> {
        let url = self.api_url(&format!("issue/{key}"));
        let response = self.get(&url).query(&[("fields", "summary")]).send().await?;
        match response.status() {
            s if s.is_success() => {
                debug!(issue = %key, "issue exists");
                Ok(())
            }
            StatusCode::NOT_FOUND => Err(TrackerError::IssueNotFound(key.to_string())),
            s => Err(TrackerError::Status {
                status: s.as_u16(),
                url,
            }),
        }
    }

    async fn add_comment_raw(&self, key: &str, body: &str) -> Result<()> {
        let url = self.api_url(&format!("issue/{key}/comment"));
        let response = self
            .post(&url)
            .json(&json!({ "body": body }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(TrackerError::Status {
                status: response.status().as_u16(),
                url,
            });
        }
        Ok(())
    }
}

/// Map client errors into the core taxonomy: a missing issue keeps its
/// identity, everything else is a tracker request failure.
fn to_core(err: TrackerError) -> RevlinkError {
    match err {
        TrackerError::IssueNotFound(key) => RevlinkError::IssueNotFound(key),
        other => RevlinkError::Tracker(other.to_string()),
    }
}

#[async_trait]
impl Tracker for RestTracker {
    async fn search_users(&self, query: &str) -> revlink_core::Result<Vec<TrackerUser>> {
        let users = self.search_users_raw(query).await.map_err(to_core)?;
        Ok(users.into_iter().map(TrackerUser::from).collect())
    }

    async fn verify_issue(&self, key: &str) -> revlink_core::Result<()> {
        self.verify_issue_raw(key).await.map_err(to_core)
    }

    async fn add_comment(&self, key: &str, body: &str) -> revlink_core::Result<()> {
        self.add_comment_raw(key, body).await.map_err(to_core)
    }
}
