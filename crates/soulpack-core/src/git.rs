//! Git integration for capturing repository context around a memory pack.
//!
//! Used by the ceremony tracker to stamp inheritance records with the
//! repository state at the time of transfer. All commands take an explicit
//! repository path; nothing here mutates process-wide state such as the
//! current working directory.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::error::{PackError, Result};

/// Snapshot of a git repository's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitContext {
    /// HEAD commit SHA.
    pub commit: String,
    /// Current branch name (empty on a detached HEAD).
    pub branch: String,
    /// Whether the work tree has uncommitted changes.
    pub dirty: bool,
    /// Repository root the context was captured from.
    pub repository_path: PathBuf,
}

impl GitContext {
    /// First 12 characters of the commit SHA, for display.
    pub fn short_commit(&self) -> &str {
        let end = self.commit.len().min(12);
        &self.commit[..end]
    }
}

fn run_git(repo_dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .map_err(|e| PackError::Git(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PackError::Git(format!(
            "git {} failed: {}",
            args.join(" "),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Capture commit, branch, and dirty state from a git repository.
///
/// Returns an error if the directory is not inside a git repository or
/// git is unavailable.
pub fn capture_context(repo_dir: &Path) -> Result<GitContext> {
    let commit = run_git(repo_dir, &["rev-parse", "HEAD"])?;
    if commit.is_empty() {
        return Err(PackError::Git(
            "git rev-parse HEAD returned empty output".to_string(),
        ));
    }

    let branch = run_git(repo_dir, &["branch", "--show-current"])?;
    let status = run_git(repo_dir, &["status", "--porcelain"])?;

    Ok(GitContext {
        commit,
        branch,
        dirty: !status.is_empty(),
        repository_path: repo_dir.to_path_buf(),
    })
}

/// Check whether a directory is inside a git work tree.
pub fn is_git_repo(dir: &Path) -> bool {
    Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(dir)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Walk ancestors of `start` looking for a `.git` directory.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = if start.is_absolute() {
        start.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(start)
    };

    loop {
        if current.join(".git").exists() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}
