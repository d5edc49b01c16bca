//! Source resolver: materializes commit-log text from a local git mirror.
//!
//! When the triggering event carries full repository coordinates, the hook
//! keeps a per-project mirror under a deterministic path, fetches the ref
//! under review, and reads `git show` output for parsing. Any git failure
//! aborts the run with the subprocess's own status. When coordinates are
//! incomplete the caller skips this module entirely and parses the bare
//! subject/body supplied by the event.
//!
//! Concurrent invocations against the same mirror are not coordinated
//! here; the calling pipeline serializes them.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, RevlinkError};

/// Coordinates of the repository under review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorSpec {
    pub host: String,
    pub port: u16,
    pub proto: String,
    pub project: String,
}

impl MirrorSpec {
    /// Remote URL the mirror clones from.
    pub fn git_url(&self) -> String {
        format!(
            "{}://{}:{}/{}",
            self.proto, self.host, self.port, self.project
        )
    }

    /// Mirror directory under `base`, keyed by host, port and project so
    /// distinct projects never share a checkout.
    pub fn mirror_dir(&self, base: &Path) -> PathBuf {
        base.join(format!("{}:{}", self.host, self.port))
            .join(&self.project)
    }
}

/// Ensure the mirror exists and is current: clone on first use, otherwise
/// fetch `refspec` from origin. Returns the mirror directory.
pub fn ensure_mirror(spec: &MirrorSpec, base: &Path, refspec: &str) -> Result<PathBuf> {
    let dir = spec.mirror_dir(base);

    if dir.exists() {
        debug!(dir = %dir.display(), refspec = %refspec, "fetching into existing mirror");
        fetch_ref(&dir, refspec)?;
    } else {
        if let Some(parent) = dir.parent() {
            std::fs::create_dir_all(parent)?;
        }
        info!(url = %spec.git_url(), dir = %dir.display(), "cloning mirror");
        clone_repo(&spec.git_url(), &dir)?;
    }

    Ok(dir)
}

/// Clone `url` into `dir`.
pub fn clone_repo(url: &str, dir: &Path) -> Result<()> {
    let output = Command::new("git")
        .args(["clone", url])
        .arg(dir)
        .output()
        .map_err(|e| spawn_error("clone", e))?;
    check_status("clone", &output)?;
    Ok(())
}

/// Fetch a named ref from origin inside an existing mirror.
pub fn fetch_ref(dir: &Path, refspec: &str) -> Result<()> {
    let output = Command::new("git")
        .args(["fetch", "origin", refspec])
        .current_dir(dir)
        .output()
        .map_err(|e| spawn_error("fetch", e))?;
    check_status("fetch", &output)?;
    Ok(())
}

/// Read the full `git show` text for a revision (or `FETCH_HEAD` after a
/// fetch). This is the raw input to the extraction engine.
pub fn show_revision(dir: &Path, revision: &str) -> Result<String> {
    let output = Command::new("git")
        .args(["show", revision])
        .current_dir(dir)
        .output()
        .map_err(|e| spawn_error("show", e))?;
    check_status("show", &output)?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn spawn_error(op: &str, err: std::io::Error) -> RevlinkError {
    RevlinkError::RepositoryAccess {
        op: op.to_string(),
        status: None,
        detail: format!("failed to run git: {err}"),
    }
}

fn check_status(op: &str, output: &std::process::Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    Err(RevlinkError::RepositoryAccess {
        op: op.to_string(),
        status: output.status.code(),
        detail: stderr.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_git(repo_dir: &Path, args: &[&str]) {
        let output = Command::new("git")
            .args(args)
            .current_dir(repo_dir)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }

    fn make_git_repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        run_git(dir.path(), &["init"]);
        run_git(dir.path(), &["config", "user.name", "test-user"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(
            dir.path(),
            &["commit", "--allow-empty", "-m", "Fix login bug JIRA-42"],
        );
        dir
    }

    fn head_branch(repo_dir: &Path) -> String {
        let output = Command::new("git")
            .args(["rev-parse", "--abbrev-ref", "HEAD"])
            .current_dir(repo_dir)
            .output()
            .unwrap();
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    #[test]
    fn test_mirror_paths_are_deterministic() {
        let spec = MirrorSpec {
            host: "review.example.com".to_string(),
            port: 29418,
            proto: "ssh".to_string(),
            project: "team/widget".to_string(),
        };
        assert_eq!(
            spec.git_url(),
            "ssh://review.example.com:29418/team/widget"
        );
        assert_eq!(
            spec.mirror_dir(Path::new("repos")),
            PathBuf::from("repos/review.example.com:29418/team/widget")
        );
    }

    #[test]
    fn test_clone_fetch_show_round_trip() {
        let upstream = make_git_repo();
        let base = tempfile::tempdir().unwrap();
        let mirror = base.path().join("mirror");

        clone_repo(upstream.path().to_str().unwrap(), &mirror).unwrap();

        let branch = head_branch(upstream.path());
        fetch_ref(&mirror, &branch).unwrap();

        let text = show_revision(&mirror, "FETCH_HEAD").unwrap();
        assert!(text.contains("Fix login bug JIRA-42"));
        assert!(text.lines().next().unwrap().starts_with("commit "));
    }

    #[test]
    fn test_show_unknown_revision_fails_with_status() {
        let repo = make_git_repo();
        let err = show_revision(repo.path(), "does-not-exist").unwrap_err();
        match err {
            RevlinkError::RepositoryAccess { op, status, .. } => {
                assert_eq!(op, "show");
                assert!(status.is_some());
                assert_ne!(status, Some(0));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_clone_missing_source_fails() {
        let base = tempfile::tempdir().unwrap();
        let result = clone_repo(
            base.path().join("no-such-upstream").to_str().unwrap(),
            &base.path().join("mirror"),
        );
        assert!(result.is_err());
    }
}
