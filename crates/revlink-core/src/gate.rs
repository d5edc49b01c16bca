//! Review gate: the accept/reject decision the calling pipeline consumes.

use serde::{Deserialize, Serialize};

use crate::extract::CommitRecord;

/// The outcome of gating one review event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateVerdict {
    /// Whether the review is accepted.
    pub accepted: bool,

    /// Summary message.
    pub message: String,
}

/// Accept a review when its commit message references at least one issue
/// or carries at least one workflow token; reject otherwise.
///
/// Rejection is a normal negative outcome, not an error: it is reported
/// purely through the verdict (and ultimately the process exit status).
pub fn evaluate_gate(record: &CommitRecord) -> GateVerdict {
    if record.has_references() {
        GateVerdict {
            accepted: true,
            message: format!(
                "accepted: {} issue reference(s), {} token(s)",
                record.issues.len(),
                record.tokens.len()
            ),
        }
    } else {
        GateVerdict {
            accepted: false,
            message: "rejected: no issue reference and no workflow token".to_string(),
        }
    }
}
