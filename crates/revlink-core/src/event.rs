//! Review-event payload consumed from the triggering pipeline.

use serde::{Deserialize, Serialize};

use crate::identity::ReviewIdentity;

/// Kind of review event that triggered the hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// A new patchset was proposed for review.
    PatchsetCreated,
    /// The change was merged.
    ChangeMerged,
    /// Any other event type, carried verbatim.
    Other(String),
}

impl EventKind {
    /// Parse the event-type string supplied by the review system.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "patchset-created" => EventKind::PatchsetCreated,
            "change-merged" => EventKind::ChangeMerged,
            other => EventKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventKind::PatchsetCreated => "patchset-created",
            EventKind::ChangeMerged => "change-merged",
            EventKind::Other(s) => s.as_str(),
        }
    }
}

/// The review event: the fields every invocation must carry, regardless of
/// whether repository access is available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewEvent {
    pub kind: EventKind,
    /// Change subject as reported by the review system (fallback content).
    pub subject: String,
    /// Commit message body as reported by the review system; empty when the
    /// review system did not supply one.
    pub body: String,
    /// Change author, used for comment composition.
    pub author: ReviewIdentity,
    /// URL of the change, linked from every tracker comment.
    pub change_url: String,
}
