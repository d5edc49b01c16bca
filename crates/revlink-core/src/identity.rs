//! Change-author identity and its resolution to a tracker username.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::tracker::Tracker;

/// The change author as reported by the review system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewIdentity {
    pub display_name: String,
    pub email: String,
}

impl ReviewIdentity {
    pub fn new(display_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            email: email.into(),
        }
    }

    /// The literal fallback form used when no tracker account matches.
    pub fn literal(&self) -> String {
        format!("{} <{}>", self.display_name, self.email)
    }
}

/// Resolve a review identity to a tracker-facing mention token.
///
/// Lookup order: exact search by email, then by display name; a stage is
/// used only when it returns exactly one account. Zero or multiple matches
/// fall through, never error, ending at the literal `"name <email>"` form.
/// Transport failures during search do propagate.
pub async fn resolve_reviewer(tracker: &dyn Tracker, identity: &ReviewIdentity) -> Result<String> {
    let by_email = tracker.search_users(&identity.email).await?;
    if let [user] = by_email.as_slice() {
        debug!(username = %user.username, "resolved reviewer by email");
        return Ok(user.username.clone());
    }

    let by_name = tracker.search_users(&identity.display_name).await?;
    if let [user] = by_name.as_slice() {
        debug!(username = %user.username, "resolved reviewer by display name");
        return Ok(user.username.clone());
    }

    debug!(
        email_matches = by_email.len(),
        name_matches = by_name.len(),
        "no unique tracker account, using literal identity"
    );
    Ok(identity.literal())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::TrackerUser;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Fake tracker returning canned user-search results.
    struct SearchFake {
        results: HashMap<String, Vec<TrackerUser>>,
    }

    impl SearchFake {
        fn new(results: &[(&str, &[&str])]) -> Self {
            let results = results
                .iter()
                .map(|(query, names)| {
                    let users = names
                        .iter()
                        .map(|n| TrackerUser {
                            username: n.to_string(),
                            display_name: n.to_string(),
                            email: None,
                        })
                        .collect();
                    (query.to_string(), users)
                })
                .collect();
            Self { results }
        }
    }

    #[async_trait]
    impl Tracker for SearchFake {
        async fn search_users(&self, query: &str) -> Result<Vec<TrackerUser>> {
            Ok(self.results.get(query).cloned().unwrap_or_default())
        }

        async fn verify_issue(&self, _key: &str) -> Result<()> {
            Ok(())
        }

        async fn add_comment(&self, _key: &str, _body: &str) -> Result<()> {
            Ok(())
        }
    }

    fn identity() -> ReviewIdentity {
        ReviewIdentity::new("Ada Lovelace", "ada@example.com")
    }

    #[tokio::test]
    async fn test_resolves_by_email_first() {
        let tracker = SearchFake::new(&[
            ("ada@example.com", &["alovelace"]),
            ("Ada Lovelace", &["someone-else"]),
        ]);
        let resolved = resolve_reviewer(&tracker, &identity()).await.unwrap();
        assert_eq!(resolved, "alovelace");
    }

    #[tokio::test]
    async fn test_falls_back_to_display_name() {
        let tracker = SearchFake::new(&[("Ada Lovelace", &["alovelace"])]);
        let resolved = resolve_reviewer(&tracker, &identity()).await.unwrap();
        assert_eq!(resolved, "alovelace");
    }

    #[tokio::test]
    async fn test_ambiguous_matches_fall_through_to_literal() {
        let tracker = SearchFake::new(&[
            ("ada@example.com", &["a1", "a2"]),
            ("Ada Lovelace", &[]),
        ]);
        let resolved = resolve_reviewer(&tracker, &identity()).await.unwrap();
        assert_eq!(resolved, "Ada Lovelace <ada@example.com>");
    }

    #[test]
    fn test_literal_form() {
        assert_eq!(identity().literal(), "Ada Lovelace <ada@example.com>");
    }
}
