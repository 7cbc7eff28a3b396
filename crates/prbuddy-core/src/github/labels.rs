// SPDX-License-Identifier: Apache-2.0

//! Repository label management.

use anyhow::{Context, Result, bail};
use octocrab::Octocrab;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use tracing::{debug, instrument};

/// What [`upsert_label`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelAction {
    /// The label did not exist and was created.
    Created,
    /// The label existed and was updated.
    Updated,
}

/// Result of a label upsert.
#[derive(Debug, Clone, Serialize)]
pub struct LabelUpsert {
    /// Label name.
    pub name: String,
    /// Color sent, as six lowercase hex digits.
    pub color: Option<String>,
    /// Description sent.
    pub description: Option<String>,
    /// Whether the label was created or updated.
    pub action: LabelAction,
}

/// Validates a label color: six hex digits, optional leading `#`.
///
/// Returns the digits lowercased without the `#`.
///
/// # Errors
///
/// Returns an error if the value is not six hex digits.
pub fn normalize_color(color: &str) -> Result<String> {
    let digits = color.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("Invalid label color '{color}'. Expected six hex digits, e.g. d73a4a");
    }
    Ok(digits.to_ascii_lowercase())
}

fn label_payload(name: &str, color: Option<&str>, description: Option<&str>) -> serde_json::Value {
    let mut payload = serde_json::json!({ "name": name });
    if let Some(color) = color {
        payload["color"] = serde_json::Value::from(color);
    }
    if let Some(description) = description {
        payload["description"] = serde_json::Value::from(description);
    }
    payload
}

/// True when a create call failed because the label already exists.
fn is_already_exists(err: &octocrab::Error) -> bool {
    match err {
        octocrab::Error::GitHub { source, .. } => {
            reports_already_exists(source.status_code.as_u16(), source.errors.as_deref())
        }
        _ => false,
    }
}

/// GitHub answers a duplicate label with 422 and an `already_exists` code.
/// Other 422s are validation failures.
fn reports_already_exists(status: u16, errors: Option<&[serde_json::Value]>) -> bool {
    status == 422
        && errors.is_some_and(|errors| {
            errors
                .iter()
                .any(|e| e.get("code").and_then(serde_json::Value::as_str) == Some("already_exists"))
        })
}

/// Creates a label, or updates it when one with the same name exists.
///
/// # Errors
///
/// Returns an error if the color is invalid or either GitHub call fails.
#[instrument(skip(client), fields(owner = %owner, repo = %repo))]
pub async fn upsert_label(
    client: &Octocrab,
    owner: &str,
    repo: &str,
    name: &str,
    color: Option<&str>,
    description: Option<&str>,
) -> Result<LabelUpsert> {
    let color = color.map(normalize_color).transpose()?;
    let payload = label_payload(name, color.as_deref(), description);

    let route = format!("/repos/{owner}/{repo}/labels");
    let created: std::result::Result<serde_json::Value, _> =
        client.post(route, Some(&payload)).await;

    let action = match created {
        Ok(_) => {
            debug!("Label created");
            LabelAction::Created
        }
        Err(err) if is_already_exists(&err) => {
            debug!("Label exists, updating");
            let encoded = utf8_percent_encode(name, NON_ALPHANUMERIC);
            let route = format!("/repos/{owner}/{repo}/labels/{encoded}");
            let _: serde_json::Value = client
                .patch(route, Some(&payload))
                .await
                .with_context(|| format!("Failed to update label '{name}' in {owner}/{repo}"))?;
            LabelAction::Updated
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("Failed to create label '{name}' in {owner}/{repo}"));
        }
    };

    Ok(LabelUpsert {
        name: name.to_string(),
        color,
        description: description.map(ToString::to_string),
        action,
    })
}

/// Adds labels to an issue or pull request by number.
///
/// Existing labels are kept. Returns the labels now on the issue.
///
/// # Errors
///
/// Returns an error if the GitHub API call fails.
#[instrument(skip(client), fields(owner = %owner, repo = %repo, number = number))]
pub async fn add_labels(
    client: &Octocrab,
    owner: &str,
    repo: &str,
    number: u64,
    labels: &[String],
) -> Result<Vec<String>> {
    if labels.is_empty() {
        debug!("No labels to apply");
        return Ok(Vec::new());
    }

    let route = format!("/repos/{owner}/{repo}/issues/{number}/labels");
    let payload = serde_json::json!({ "labels": labels });

    let applied: Vec<serde_json::Value> =
        client.post(route, Some(&payload)).await.with_context(|| {
            format!(
                "Failed to apply labels to #{number} in {owner}/{repo}. \
                 Check that you have write access to the repository."
            )
        })?;

    let names: Vec<String> = applied
        .iter()
        .filter_map(|label| label.get("name").and_then(|n| n.as_str()))
        .map(ToString::to_string)
        .collect();

    debug!(labels = ?names, "Labels applied successfully");
    Ok(names)
}
