//! Tracker trait seam.
//!
//! The composer talks to the issue tracker only through [`Tracker`], so
//! unit tests can substitute an in-memory fake and the REST client stays
//! in its own crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A tracker-native user account, as returned by user search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerUser {
    /// Tracker-native username, the token used in comment mentions.
    pub username: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Primary email address, when the tracker exposes it.
    pub email: Option<String>,
}

/// Operations the cross-reference composer needs from the issue tracker.
///
/// Implementations are expected to have verified connectivity and
/// credentials before being handed to the composer; the composer itself
/// never retries.
#[async_trait]
pub trait Tracker: Send + Sync {
    /// Search user accounts matching a free-form query (email or name).
    async fn search_users(&self, query: &str) -> Result<Vec<TrackerUser>>;

    /// Verify that an issue exists. Returns `RevlinkError::IssueNotFound`
    /// when the tracker has no such key.
    async fn verify_issue(&self, key: &str) -> Result<()>;

    /// Append a comment to an issue.
    async fn add_comment(&self, key: &str, body: &str) -> Result<()>;
}
