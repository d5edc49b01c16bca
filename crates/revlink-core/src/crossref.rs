//! Cross-reference composer.
//!
//! For each issue referenced by a change, composes one tracker comment
//! naming the reviewer and linking the change, plus the list of the
//! *other* issues referenced alongside it. Verification of every issue
//! happens before any comment is posted, so a bad reference never leaves
//! a partial trail.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::extract::CommitRecord;
use crate::tracker::Tracker;

/// One composed comment, addressed to a single issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueComment {
    pub issue: String,
    pub body: String,
}

/// Result of one cross-reference pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkReport {
    /// Comments composed, one per issue occurrence, in record order.
    pub comments: Vec<IssueComment>,
    /// Whether the comments were actually posted to the tracker.
    pub posted: bool,
}

/// The other issues referenced by the same change: the full list minus
/// exactly one occurrence of `issue`. A repeated issue therefore still
/// cross-references its own remaining occurrences.
pub fn cross_references(issues: &[String], issue: &str) -> Vec<String> {
    let mut others = issues.to_vec();
    if let Some(pos) = others.iter().position(|x| x == issue) {
        others.remove(pos);
    }
    others
}

/// Compose the comment body for one issue.
///
/// The first line mentions the reviewer and links the change in tracker
/// wiki markup; the related-issues line is appended only when there is
/// something to relate, as a plain comma-joined list the tracker will
/// auto-link.
pub fn compose_comment(reviewer: &str, change_url: &str, others: &[String]) -> String {
    let mut body = format!("[~{reviewer}] has updated a [review|{change_url}].");
    if !others.is_empty() {
        body.push_str("\nRelated issues: ");
        body.push_str(&others.join(","));
    }
    body
}

/// Verify every referenced issue, compose its cross-reference comment,
/// and post the comments when `post` is set.
///
/// Verification is a separate pass that runs to completion first: any
/// lookup failure aborts before a single comment is written. Duplicate
/// occurrences each produce their own comment, matching the tracker's
/// append-only comment model.
pub async fn link_issues(
    tracker: &dyn Tracker,
    record: &CommitRecord,
    reviewer: &str,
    change_url: &str,
    post: bool,
) -> Result<LinkReport> {
    for issue in &record.issues {
        tracker.verify_issue(issue).await?;
        debug!(issue = %issue, "issue verified");
    }

    let comments: Vec<IssueComment> = record
        .issues
        .iter()
        .map(|issue| IssueComment {
            issue: issue.clone(),
            body: compose_comment(reviewer, change_url, &cross_references(&record.issues, issue)),
        })
        .collect();

    if post {
        for comment in &comments {
            tracker.add_comment(&comment.issue, &comment.body).await?;
            info!(issue = %comment.issue, "cross-reference comment posted");
        }
    } else if !comments.is_empty() {
        info!(
            comments = comments.len(),
            "posting skipped, trigger condition not met"
        );
    }

    Ok(LinkReport {
        comments,
        posted: post,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cross_references_excludes_self() {
        let issues = keys(&["A-1", "A-2", "A-3"]);
        assert_eq!(cross_references(&issues, "A-1"), keys(&["A-2", "A-3"]));
        assert_eq!(cross_references(&issues, "A-2"), keys(&["A-1", "A-3"]));
    }

    #[test]
    fn test_cross_references_removes_one_occurrence_of_duplicate() {
        let issues = keys(&["A-1", "A-1"]);
        assert_eq!(cross_references(&issues, "A-1"), keys(&["A-1"]));
    }

    #[test]
    fn test_compose_comment_without_related() {
        let body = compose_comment("alovelace", "https://review.example.com/42", &[]);
        assert_eq!(
            body,
            "[~alovelace] has updated a [review|https://review.example.com/42]."
        );
    }

    #[test]
    fn test_compose_comment_with_related() {
        let body = compose_comment(
            "alovelace",
            "https://review.example.com/42",
            &keys(&["A-2", "A-3"]),
        );
        assert!(body.ends_with("\nRelated issues: A-2,A-3"));
    }
}
