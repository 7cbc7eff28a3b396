// SPDX-License-Identifier: Apache-2.0

//! Version control context.
//!
//! Wraps the `git` executable behind the [`Vcs`] trait so the pipeline can be
//! driven by an in-memory fake in tests.

use std::path::PathBuf;
use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::error::PrBuddyError;

/// Matches `git@host:owner/repo(.git)` and `https://host/owner/repo(.git)`.
static REMOTE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:ssh://)?(?:git@|https?://)(?:[^@/]+@)?[^/:]+[:/]([^/]+)/(.+?)(?:\.git)?/?$")
        .expect("remote URL regex is valid")
});

/// The diff between two branches, captured once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffContext {
    /// Branch holding the changes (PR head).
    pub source_branch: String,
    /// Branch the changes go into (PR base).
    pub target_branch: String,
    /// Unified diff text, verbatim.
    pub raw_diff: String,
}

impl DiffContext {
    /// Creates a diff context.
    #[must_use]
    pub fn new(source_branch: String, target_branch: String, raw_diff: String) -> Self {
        Self {
            source_branch,
            target_branch,
            raw_diff,
        }
    }

    /// Returns true when there is nothing to describe.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw_diff.trim().is_empty()
    }
}

/// Source of repository context for a run.
pub trait Vcs: Send + Sync {
    /// Name of the remote branches are compared against (e.g. `origin`).
    fn remote(&self) -> &str;

    /// Returns true when the VCS tool can be run at all.
    fn is_available(&self) -> bool;

    /// Returns true when the working directory is inside a work tree.
    fn is_inside_work_tree(&self) -> crate::Result<bool>;

    /// Returns the checked-out branch name.
    fn current_branch(&self) -> crate::Result<String>;

    /// Returns the remote's default branch (its `HEAD`).
    fn default_remote_branch(&self) -> crate::Result<String>;

    /// Fetches `branch` from the remote.
    fn fetch(&self, branch: &str) -> crate::Result<()>;

    /// Returns the diff of `head` against its merge base with `base`.
    fn diff(&self, base: &str, head: &str) -> crate::Result<String>;

    /// Returns `(owner, repo)` parsed from the remote URL.
    fn remote_slug(&self) -> crate::Result<(String, String)>;
}

/// [`Vcs`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    remote: String,
    workdir: Option<PathBuf>,
}

impl GitCli {
    /// Creates a git context for the current directory.
    #[must_use]
    pub fn new(remote: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            workdir: None,
        }
    }

    /// Runs git in `workdir` instead of the current directory.
    #[must_use]
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(args);
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Runs git and returns trimmed stdout, mapping failures to `PrBuddyError::Git`.
    fn run(&self, args: &[&str]) -> crate::Result<String> {
        debug!(args = ?args, "Running git");
        let output = self
            .command(args)
            .output()
            .map_err(|e| PrBuddyError::Git {
                message: format!("failed to run git {}: {e}", args.join(" ")),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PrBuddyError::Git {
                message: format!("git {} failed: {}", args.join(" "), stderr.trim()),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Vcs for GitCli {
    fn remote(&self) -> &str {
        &self.remote
    }

    fn is_available(&self) -> bool {
        git_available()
    }

    fn is_inside_work_tree(&self) -> crate::Result<bool> {
        let output = self
            .command(&["rev-parse", "--is-inside-work-tree"])
            .output()
            .map_err(|e| PrBuddyError::Git {
                message: format!("failed to run git: {e}"),
            })?;
        Ok(output.status.success() && String::from_utf8_lossy(&output.stdout).trim() == "true")
    }

    fn current_branch(&self) -> crate::Result<String> {
        self.run(&["rev-parse", "--abbrev-ref", "HEAD"])
    }

    #[instrument(skip(self), fields(remote = %self.remote))]
    fn default_remote_branch(&self) -> crate::Result<String> {
        let head_ref = format!("refs/remotes/{}/HEAD", self.remote);
        if let Ok(short) = self.run(&["symbolic-ref", "--short", &head_ref]) {
            let prefix = format!("{}/", self.remote);
            return Ok(short.strip_prefix(&prefix).unwrap_or(&short).to_string());
        }

        // No local origin/HEAD; ask the remote
        let listing = self.run(&["remote", "show", &self.remote])?;
        parse_remote_show_head(&listing).ok_or_else(|| PrBuddyError::Git {
            message: format!("could not determine the default branch of '{}'", self.remote),
        })
    }

    fn fetch(&self, branch: &str) -> crate::Result<()> {
        self.run(&["fetch", &self.remote, branch, "--quiet"])
            .map(|_| ())
    }

    #[instrument(skip(self))]
    fn diff(&self, base: &str, head: &str) -> crate::Result<String> {
        let range = format!("{base}...{head}");
        // Diff text is kept verbatim, so this bypasses run()
        let output = self
            .command(&["diff", &range])
            .output()
            .map_err(|e| PrBuddyError::Git {
                message: format!("failed to run git diff: {e}"),
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PrBuddyError::Git {
                message: format!("git diff {range} failed: {}", stderr.trim()),
            });
        }
        let diff = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(diff_len = diff.len(), "Captured diff");
        Ok(diff)
    }

    fn remote_slug(&self) -> crate::Result<(String, String)> {
        let key = format!("remote.{}.url", self.remote);
        let url = self.run(&["config", "--get", &key])?;
        parse_git_remote_url(&url)
    }
}

/// Returns true when a `git` executable can be spawned.
#[must_use]
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

/// Extracts the `HEAD branch:` value from `git remote show` output.
#[must_use]
pub fn parse_remote_show_head(listing: &str) -> Option<String> {
    listing
        .lines()
        .find_map(|line| line.trim().strip_prefix("HEAD branch:"))
        .map(str::trim)
        .filter(|branch| !branch.is_empty() && *branch != "(unknown)")
        .map(ToString::to_string)
}

/// Parses a git remote URL to extract `(owner, repo)`.
///
/// Supports SSH (`git@github.com:owner/repo.git`) and HTTPS
/// (`https://github.com/owner/repo.git`) formats.
///
/// # Examples
///
/// ```
/// use prbuddy_core::vcs::parse_git_remote_url;
///
/// let (owner, repo) = parse_git_remote_url("git@github.com:owner/repo.git").unwrap();
/// assert_eq!((owner.as_str(), repo.as_str()), ("owner", "repo"));
/// ```
pub fn parse_git_remote_url(url: &str) -> crate::Result<(String, String)> {
    REMOTE_URL_RE
        .captures(url.trim())
        .and_then(|caps| Some((caps.get(1)?.as_str(), caps.get(2)?.as_str())))
        .filter(|(_, repo)| !repo.contains('/'))
        .map(|(owner, repo)| (owner.to_string(), repo.to_string()))
        .ok_or_else(|| PrBuddyError::Git {
            message: format!("could not parse git remote URL: {url}"),
        })
}
