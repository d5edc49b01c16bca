//! Tracker client errors.

/// Errors raised by the REST tracker client.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("issue not found: {0}")]
    IssueNotFound(String),

    #[error("invalid server url: {0}")]
    InvalidUrl(String),
}

/// Result type for tracker client operations.
pub type Result<T> = std::result::Result<T, TrackerError>;
