//! Revlink Core Library
//!
//! Commit-message extraction and issue cross-referencing for the revlink
//! review hook: parse raw commit-log text into a typed record, compose
//! per-issue cross-reference comments, and gate the review.

pub mod config;
pub mod crossref;
pub mod error;
pub mod event;
pub mod extract;
pub mod gate;
pub mod identity;
pub mod source;
pub mod telemetry;
pub mod tracker;

pub use config::{
    default_token_vocabulary, parse_token_vocabulary, CommentTrigger, TokenCase, TrackerConfig,
    DEFAULT_TOKENS,
};
pub use crossref::{compose_comment, cross_references, link_issues, IssueComment, LinkReport};
pub use error::{Result, RevlinkError};
pub use event::{EventKind, ReviewEvent};
pub use extract::{extract, extract_bare, CommitRecord, Scanner};
pub use gate::{evaluate_gate, GateVerdict};
pub use identity::{resolve_reviewer, ReviewIdentity};
pub use source::{clone_repo, ensure_mirror, fetch_ref, show_revision, MirrorSpec};
pub use telemetry::init_tracing;
pub use tracker::{Tracker, TrackerUser};

/// Revlink version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
