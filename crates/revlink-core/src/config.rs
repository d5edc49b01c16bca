//! Hook configuration.
//!
//! All configuration is read once at startup and passed by reference into
//! the extraction engine and composer; nothing in this crate consults the
//! environment after construction.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RevlinkError};
use crate::event::EventKind;

/// Default workflow-token vocabulary, overridable via `TOKENS`.
pub const DEFAULT_TOKENS: &[&str] = &["wdil", "trivial", "merge", "hotyb"];

/// Tracker endpoint and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Tracker server base URL.
    pub server_url: String,
    /// Basic-auth username.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
}

impl TrackerConfig {
    /// Read tracker credentials from `JIRA_SERVER` / `JIRA_USERNAME` /
    /// `JIRA_PASSWORD`. Any missing variable aborts the run before any
    /// other work is attempted.
    pub fn from_env() -> Result<Self> {
        let server_url = require_env("JIRA_SERVER")?;
        let username = require_env("JIRA_USERNAME")?;
        let password = require_env("JIRA_PASSWORD")?;
        Ok(Self {
            server_url,
            username,
            password,
        })
    }
}

fn require_env(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.is_empty() => Ok(v),
        _ => Err(RevlinkError::ConfigurationMissing(name)),
    }
}

/// Case sensitivity of workflow-token matching.
///
/// The two deployed generations of this hook disagreed; revlink makes the
/// choice explicit configuration, defaulting to insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenCase {
    Sensitive,
    Insensitive,
}

impl Default for TokenCase {
    fn default() -> Self {
        TokenCase::Insensitive
    }
}

impl TokenCase {
    /// Parse a configuration string (`sensitive` | `insensitive`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sensitive" => Some(TokenCase::Sensitive),
            "insensitive" => Some(TokenCase::Insensitive),
            _ => None,
        }
    }
}

/// When cross-reference comments are posted to the tracker.
///
/// The gate decision is computed regardless; this only controls writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommentTrigger {
    /// Post on every review event.
    Always,
    /// Post only when the change has been merged.
    MergedOnly,
}

impl Default for CommentTrigger {
    fn default() -> Self {
        CommentTrigger::Always
    }
}

impl CommentTrigger {
    /// Parse a configuration string (`always` | `merged-only`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Some(CommentTrigger::Always),
            "merged-only" => Some(CommentTrigger::MergedOnly),
            _ => None,
        }
    }

    /// Whether comments should be posted for the given event kind.
    pub fn applies(&self, kind: &EventKind) -> bool {
        match self {
            CommentTrigger::Always => true,
            CommentTrigger::MergedOnly => matches!(kind, EventKind::ChangeMerged),
        }
    }
}

/// Split a comma-separated token vocabulary, dropping empty entries.
///
/// An empty result disables token matching entirely.
pub fn parse_token_vocabulary(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// The default vocabulary as owned strings.
pub fn default_token_vocabulary() -> Vec<String> {
    DEFAULT_TOKENS.iter().map(|t| t.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_case_parse() {
        assert_eq!(TokenCase::parse("sensitive"), Some(TokenCase::Sensitive));
        assert_eq!(TokenCase::parse("Insensitive"), Some(TokenCase::Insensitive));
        assert_eq!(TokenCase::parse("bogus"), None);
        assert_eq!(TokenCase::default(), TokenCase::Insensitive);
    }

    #[test]
    fn test_comment_trigger_parse() {
        assert_eq!(CommentTrigger::parse("always"), Some(CommentTrigger::Always));
        assert_eq!(
            CommentTrigger::parse("merged-only"),
            Some(CommentTrigger::MergedOnly)
        );
        assert_eq!(CommentTrigger::parse(""), None);
    }

    #[test]
    fn test_comment_trigger_applies() {
        assert!(CommentTrigger::Always.applies(&EventKind::PatchsetCreated));
        assert!(CommentTrigger::Always.applies(&EventKind::ChangeMerged));
        assert!(!CommentTrigger::MergedOnly.applies(&EventKind::PatchsetCreated));
        assert!(CommentTrigger::MergedOnly.applies(&EventKind::ChangeMerged));
    }

    #[test]
    fn test_parse_token_vocabulary() {
        assert_eq!(
            parse_token_vocabulary("wdil,trivial, merge"),
            vec!["wdil", "trivial", "merge"]
        );
        assert!(parse_token_vocabulary("").is_empty());
        assert!(parse_token_vocabulary(",,").is_empty());
    }

    #[test]
    fn test_default_vocabulary() {
        assert_eq!(
            default_token_vocabulary(),
            vec!["wdil", "trivial", "merge", "hotyb"]
        );
    }
}
