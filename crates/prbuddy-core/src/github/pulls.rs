// SPDX-License-Identifier: Apache-2.0

//! Pull request publishing via Octocrab.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::labels::LabelSet;

/// Merge strategy for a published pull request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    /// Squash all commits into one.
    #[default]
    Squash,
    /// Create a merge commit.
    Merge,
    /// Rebase commits onto the base branch.
    Rebase,
}

impl MergeMethod {
    /// All strategies, in the order they are offered.
    pub const ALL: [MergeMethod; 3] = [MergeMethod::Squash, MergeMethod::Merge, MergeMethod::Rebase];

    /// Lowercase name as used in configuration.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MergeMethod::Squash => "squash",
            MergeMethod::Merge => "merge",
            MergeMethod::Rebase => "rebase",
        }
    }
}

impl fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "squash" => Ok(MergeMethod::Squash),
            "merge" => Ok(MergeMethod::Merge),
            "rebase" => Ok(MergeMethod::Rebase),
            other => Err(format!(
                "unknown merge method '{other}' (expected squash, merge or rebase)"
            )),
        }
    }
}

impl From<MergeMethod> for octocrab::params::pulls::MergeMethod {
    fn from(method: MergeMethod) -> Self {
        match method {
            MergeMethod::Squash => octocrab::params::pulls::MergeMethod::Squash,
            MergeMethod::Merge => octocrab::params::pulls::MergeMethod::Merge,
            MergeMethod::Rebase => octocrab::params::pulls::MergeMethod::Rebase,
        }
    }
}

/// A pull request ready to be published.
///
/// Consumed by [`Publisher::create`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, bon::Builder)]
pub struct PullRequestDraft {
    /// Title.
    #[builder(into)]
    pub title: String,
    /// Markdown body.
    #[builder(into)]
    pub description: String,
    /// Branch the changes go into.
    #[builder(into)]
    pub base: String,
    /// Branch holding the changes.
    #[builder(into)]
    pub head: String,
    /// Labels aggregated from the linked issues.
    #[builder(default)]
    pub labels: LabelSet,
    /// Login to assign.
    pub assignee: Option<String>,
}

/// A created pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedPr {
    /// Pull request number.
    pub number: u64,
    /// Web URL.
    pub url: String,
    /// Follow-up steps that failed after creation (labels, assignee).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Publishes drafts and merges pull requests.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Creates the pull request, then applies its assignee and labels.
    ///
    /// # Errors
    ///
    /// Returns an error if the pull request could not be created. Failures
    /// after creation are reported in [`PublishedPr::warnings`].
    async fn create(&self, owner: &str, repo: &str, draft: PullRequestDraft)
    -> Result<PublishedPr>;

    /// Merges pull request `number` with `method`.
    ///
    /// # Errors
    ///
    /// Returns an error if GitHub refuses the merge.
    async fn merge(&self, owner: &str, repo: &str, number: u64, method: MergeMethod)
    -> Result<()>;
}

/// [`Publisher`] backed by an authenticated Octocrab client.
pub struct OctocrabPublisher {
    client: Octocrab,
}

impl OctocrabPublisher {
    /// Wraps an authenticated client.
    #[must_use]
    pub fn new(client: Octocrab) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Publisher for OctocrabPublisher {
    #[instrument(skip(self, draft), fields(owner = %owner, repo = %repo, head = %draft.head, base = %draft.base))]
    async fn create(
        &self,
        owner: &str,
        repo: &str,
        draft: PullRequestDraft,
    ) -> Result<PublishedPr> {
        debug!("Creating pull request");

        let pr = self
            .client
            .pulls(owner, repo)
            .create(&draft.title, &draft.head, &draft.base)
            .body(&draft.description)
            .send()
            .await
            .with_context(|| {
                format!(
                    "Failed to create pull request {} -> {} in {owner}/{repo}",
                    draft.head, draft.base
                )
            })?;

        let number = pr.number;
        let url = pr
            .html_url
            .map_or_else(|| format!("https://github.com/{owner}/{repo}/pull/{number}"), |u| u.to_string());
        let mut warnings = Vec::new();

        if let Some(assignee) = &draft.assignee
            && let Err(e) = self
                .client
                .issues(owner, repo)
                .add_assignees(number, &[assignee.as_str()])
                .await
        {
            warn!(error = %e, "Failed to assign pull request");
            warnings.push(format!("Could not assign {assignee}: {e}"));
        }

        if !draft.labels.is_empty()
            && let Err(e) =
                super::labels::add_labels(&self.client, owner, repo, number, draft.labels.as_slice())
                    .await
        {
            warn!(error = %e, "Failed to label pull request");
            warnings.push(format!("Could not apply labels: {e:#}"));
        }

        debug!(number, url = %url, "Pull request created");
        Ok(PublishedPr {
            number,
            url,
            warnings,
        })
    }

    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    async fn merge(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        method: MergeMethod,
    ) -> Result<()> {
        let result = self
            .client
            .pulls(owner, repo)
            .merge(number)
            .method(octocrab::params::pulls::MergeMethod::from(method))
            .send()
            .await
            .with_context(|| format!("Failed to merge pull request #{number}"))?;

        if !result.merged {
            bail!(
                "GitHub did not merge pull request #{number}: {}",
                result.message.unwrap_or_default()
            );
        }

        debug!(number, %method, "Pull request merged");
        Ok(())
    }
}
