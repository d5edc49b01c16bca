//! Commit-message extraction engine.
//!
//! Turns raw `git show` output (or a bare subject/body pair) into a typed
//! [`CommitRecord`]: header metadata, subject, body, referenced issue keys
//! and workflow tokens. Extraction is total and pure: any input string
//! yields a record, and identical input yields identical records.
//!
//! Line handling is an explicit classification state machine rather than a
//! cascade of ad hoc pattern attempts, so the detection order (commit
//! header, then metadata, then indented message, then terminator) is a
//! testable contract of its own.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::TokenCase;
use crate::error::Result;

/// Opening delimiter set for issue and token matches.
const BOUND_OPEN: &str = r"(^|[ :;,.(])";
/// Closing delimiter set for issue and token matches.
const BOUND_CLOSE: &str = r"($|[ :;,.)])";

/// Issue identifier: uppercase project key, hyphen, positive integer with
/// no leading zero.
const ISSUE_KEY: &str = r"([A-Z]+-[1-9][0-9]*)";

/// The parsed result of one commit message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Header metadata, keyed by lowercase header name. Last write wins on
    /// repeated keys.
    pub metadata: HashMap<String, String>,
    /// First line of the message block; `None` when the input carried no
    /// message content at all.
    pub subject: Option<String>,
    /// Remaining message lines joined with newlines; empty when none.
    pub body: String,
    /// Issue keys in order of appearance, duplicates preserved.
    pub issues: Vec<String>,
    /// Workflow tokens found on the subject line, duplicates preserved.
    pub tokens: Vec<String>,
}

impl CommitRecord {
    /// Whether the record carries anything the gate can accept.
    pub fn has_references(&self) -> bool {
        !self.issues.is_empty() || !self.tokens.is_empty()
    }
}

/// Compiled scan patterns for one invocation.
///
/// Built once from the configured token vocabulary and passed by reference
/// wherever scanning happens, keeping [`extract`] a pure function of its
/// inputs.
#[derive(Debug)]
pub struct Scanner {
    issue_re: Regex,
    token_re: Option<Regex>,
}

impl Scanner {
    /// Compile the issue pattern and, when the vocabulary is non-empty,
    /// the token pattern. An empty vocabulary disables token matching.
    pub fn new(tokens: &[String], case: TokenCase) -> Result<Self> {
        let issue_re = Regex::new(&format!("{BOUND_OPEN}{ISSUE_KEY}{BOUND_CLOSE}"))?;

        let token_re = if tokens.is_empty() {
            None
        } else {
            let alternates: Vec<String> = tokens.iter().map(|t| regex::escape(t)).collect();
            let flags = match case {
                TokenCase::Insensitive => "(?i)",
                TokenCase::Sensitive => "",
            };
            Some(Regex::new(&format!(
                "{flags}{BOUND_OPEN}({}){BOUND_CLOSE}",
                alternates.join("|")
            ))?)
        };

        Ok(Self { issue_re, token_re })
    }

    /// All issue keys in `text`, left to right, non-overlapping.
    ///
    /// The scan resumes after each full match, so a consumed trailing
    /// delimiter cannot double as the next match's leading delimiter.
    pub fn issues_in(&self, text: &str) -> Vec<String> {
        self.issue_re
            .captures_iter(text)
            .map(|c| c[2].to_string())
            .collect()
    }

    /// All workflow tokens in `text`, as they appeared in the input.
    pub fn tokens_in(&self, text: &str) -> Vec<String> {
        match &self.token_re {
            Some(re) => re.captures_iter(text).map(|c| c[2].to_string()).collect(),
            None => Vec::new(),
        }
    }
}

/// Classification of one physical line of `git show` output.
#[derive(Debug, PartialEq, Eq)]
enum LineClass<'a> {
    /// Empty line, skipped.
    Blank,
    /// `commit <sha>` revision header, skipped.
    CommitHeader,
    /// `Name: value` header line.
    Metadata { name: &'a str, value: &'a str },
    /// Four-space-indented message content, with the indent stripped.
    Message(&'a str),
    /// Anything else: the boundary before trailing diff/stat content.
    Terminator,
}

/// Classify a line. Detection order is part of the contract: commit
/// header before metadata before message before terminator.
fn classify(line: &str) -> LineClass<'_> {
    if line.is_empty() {
        return LineClass::Blank;
    }
    if line.strip_prefix("commit ").is_some() {
        return LineClass::CommitHeader;
    }
    if let Some((name, value)) = line.split_once(": ") {
        if !name.is_empty() && !name.contains(' ') && !name.contains(':') {
            return LineClass::Metadata { name, value };
        }
    }
    if let Some(content) = line.strip_prefix("    ") {
        return LineClass::Message(content);
    }
    LineClass::Terminator
}

/// Parse full `git show` output into a [`CommitRecord`].
///
/// The first indented line becomes the subject and is the only line
/// scanned for tokens; every message line is scanned for issue keys. The
/// first line that fits no class terminates extraction, leaving any
/// trailing diff content unread.
pub fn extract(raw: &str, scanner: &Scanner) -> CommitRecord {
    let mut record = CommitRecord::default();
    let mut body_lines: Vec<&str> = Vec::new();

    for line in raw.lines() {
        match classify(line) {
            LineClass::Blank | LineClass::CommitHeader => continue,
            LineClass::Metadata { name, value } => {
                record
                    .metadata
                    .insert(name.to_lowercase(), value.to_string());
            }
            LineClass::Message(content) => {
                if record.subject.is_none() {
                    record.subject = Some(content.to_string());
                    record.tokens.extend(scanner.tokens_in(content));
                } else {
                    body_lines.push(content);
                }
                record.issues.extend(scanner.issues_in(content));
            }
            LineClass::Terminator => break,
        }
    }

    record.body = body_lines.join("\n");
    record
}

/// Degraded-mode extraction from an event-supplied subject/body pair.
///
/// No line-oriented parsing: tokens are scanned from the subject only, and
/// issues from the subject followed by the body as a whole.
pub fn extract_bare(subject: &str, body: &str, scanner: &Scanner) -> CommitRecord {
    let mut record = CommitRecord {
        subject: Some(subject.to_string()),
        body: body.to_string(),
        ..CommitRecord::default()
    };
    record.tokens = scanner.tokens_in(subject);
    record.issues = scanner.issues_in(subject);
    record.issues.extend(scanner.issues_in(body));
    record
}
