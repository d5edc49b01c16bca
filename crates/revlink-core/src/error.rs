//! Domain-level error taxonomy for revlink.

/// Errors produced across the revlink pipeline.
///
/// The variants mirror the hook's failure classes: configuration problems
/// abort before any work, repository and tracker failures abort the run
/// with no further tracker writes, and `IssueNotFound` is fatal because a
/// change referencing a nonexistent identifier must not silently continue.
#[derive(Debug, thiserror::Error)]
pub enum RevlinkError {
    #[error("missing tracker configuration: {0}")]
    ConfigurationMissing(&'static str),

    #[error("missing trigger information: {0}")]
    TriggerInformationMissing(&'static str),

    #[error("repository access failed: git {op} exited with status {status:?}: {detail}")]
    RepositoryAccess {
        op: String,
        status: Option<i32>,
        detail: String,
    },

    #[error("tracker connection failed: {0}")]
    TrackerConnection(String),

    #[error("tracker request failed: {0}")]
    Tracker(String),

    #[error("issue not found: {0}")]
    IssueNotFound(String),

    #[error("invalid scan pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for revlink operations.
pub type Result<T> = std::result::Result<T, RevlinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RevlinkError::ConfigurationMissing("JIRA_SERVER");
        assert!(err.to_string().contains("JIRA_SERVER"));

        let err = RevlinkError::IssueNotFound("ABC-12".to_string());
        assert!(err.to_string().contains("issue not found"));
        assert!(err.to_string().contains("ABC-12"));
    }

    #[test]
    fn test_repository_access_carries_status() {
        let err = RevlinkError::RepositoryAccess {
            op: "fetch".to_string(),
            status: Some(128),
            detail: "fatal: couldn't find remote ref".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("fetch"));
        assert!(msg.contains("128"));
    }
}
