// SPDX-License-Identifier: Apache-2.0

//! Label commands.

use anyhow::Result;
use prbuddy_core::github::labels::{add_labels, upsert_label};
use prbuddy_core::github::parse_number_ref;
use prbuddy_core::{AppConfig, GitCli, LabelUpsert};

use super::types::LabelsAddedResult;
use super::{github_client, resolve_repo};

/// Creates or updates a label.
pub async fn run_upsert(
    name: &str,
    color: Option<&str>,
    description: Option<&str>,
    repo: Option<&str>,
    config: &AppConfig,
) -> Result<LabelUpsert> {
    let vcs = GitCli::new(config.github.remote.clone());
    let (owner, repo) = resolve_repo(repo, config, &vcs)?;
    let client = github_client(config)?;
    upsert_label(&client, &owner, &repo, name, color, description).await
}

/// Attaches labels to an issue or pull request.
///
/// A reference that names its repository wins over `--repo`.
pub async fn run_add(
    reference: &str,
    labels: &[String],
    repo: Option<&str>,
    config: &AppConfig,
) -> Result<LabelsAddedResult> {
    let parsed = parse_number_ref(reference)?;
    let (owner, repo) = match parsed.repo {
        Some(slug) => slug,
        None => {
            let vcs = GitCli::new(config.github.remote.clone());
            resolve_repo(repo, config, &vcs)?
        }
    };

    let client = github_client(config)?;
    let applied = add_labels(&client, &owner, &repo, parsed.number, labels).await?;

    Ok(LabelsAddedResult {
        repo: format!("{owner}/{repo}"),
        number: parsed.number,
        requested: labels.to_vec(),
        labels: applied,
    })
}
