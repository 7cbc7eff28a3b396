// SPDX-License-Identifier: Apache-2.0

//! Prompt construction.
//!
//! A prompt is the chosen template, the selected issues, and the diff, always
//! in that order. Building is pure: the same inputs give the same text.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::github::issues::Issue;

/// Built-in template asking for grouped, concise bullet points.
pub const DEFAULT_TEMPLATE: &str = r#"Based on the code diff and linked issues, generate a JSON object with a PR title and a technical PR description.

**Response Format Instructions:**

Your entire output must be a single, valid JSON object. Do not include any text, explanations, or markdown formatting outside of this JSON object.

The JSON object must have the following structure:
{
  "title": "string",
  "description": "string"
}

**Content Rules:**

1.  `title` (string):
    * Follow the Conventional Commit Format: `type(scope): subject`.
    * `type`: Must be one of `feat`, `fix`, `chore`, `refactor`, `style`, `ci`, `docs`.
    * `scope` (optional): A noun for the codebase section (e.g., `api`, `camera`, `ui`, `auth`, `build`).
    * `subject`: A short, imperative-mood summary of the change.
    * Example: "feat(camera): Add continuous torch mode"

2.  `description` (string):
    * This string must contain the full technical description formatted in Markdown.
    * Do not add any introductory sentences. Start directly with the first relevant category heading.
    * Group technical changes into the following categories using `###` (H3) headings. Only include categories with relevant changes.
        * `### ✨ New Functionality`
        * `### 🛠️ Refactoring & Architectural Changes`
        * `### 🐛 Bug Fixes`
        * `### ⚡ Performance Improvements`
        * `### 🧹 Maintenance & Chores`
    * Under each category, list changes as concise, technical bullet points.
    * For each bullet point that resolves a GitHub issue, append `Fixes #{issue_number}` or `Closes #{issue_number}` at the end of that bullet point's line.
"#;

/// Built-in template asking for a titled paragraph per change with issue references.
pub const DETAILED_TEMPLATE: &str = r#"Based on the code diff and linked issues, generate a JSON object with a PR title and a technical PR description.

**Response Format Instructions:**

Your entire output must be a single, valid JSON object. Do not include any text, explanations, or markdown formatting outside of this JSON object.

The JSON object must have the following structure:
{
  "title": "string",
  "description": "string"
}

**Content Rules:**

1.  `title` (string):
    *   Follow the Conventional Commit Format: `type(scope): subject`.
    *   `type`: Must be one of `feat`, `fix`, `chore`, `refactor`, `style`, `ci`, `docs`.
    *   `scope` (optional): A noun for the codebase section (e.g., `api`, `camera`, `ui`, `auth`, `build`).
    *   `subject`: A short, imperative-mood summary of the change.
    *   Example: "feat(camera): Add continuous torch mode"

2.  `description` (string):
    *   This string must contain the full technical description formatted in Markdown.
    *   Do not add any introductory sentences. Start directly with the first relevant category heading.
    *   Group technical changes into the following categories using `###` (H3) headings. Only include categories with relevant changes.
        * `### ✨ New Functionality`
        * `### 🛠️ Refactoring & Architectural Changes`
        * `### 🐛 Bug Fixes`
        * `### ⚡ Performance Improvements`
        * `### 🧹 Maintenance & Chores`
    *   Under each category, list each major change using the following nested structure:
        *   Start with a primary bullet point (`*`). The line must begin with a **bolded, descriptive title** that summarizes the change, followed by a colon.
        *   Immediately after the colon, write a detailed paragraph explaining the change, its impact, and the technical reasoning.
        *   On a new line, add a nested and **bolded** bullet point that contains only the issue reference. Each issue must be on its own line.
"#;

/// Template used for one run. A custom template replaces the built-in one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "text")]
pub enum PromptTemplate {
    /// Grouped bullet points.
    Default,
    /// Titled paragraph per change.
    Detailed,
    /// Template text loaded from a file.
    Custom(String),
}

impl PromptTemplate {
    /// Looks up a built-in template by name (`default` or `detailed`).
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "default" => Some(Self::Default),
            "detailed" => Some(Self::Detailed),
            _ => None,
        }
    }

    /// Loads a custom template from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or holds only whitespace.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read template file {}", path.display()))?;
        if text.trim().is_empty() {
            anyhow::bail!("Template file {} is empty", path.display());
        }
        Ok(Self::Custom(text))
    }

    /// Returns the template text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Default => DEFAULT_TEMPLATE,
            Self::Detailed => DETAILED_TEMPLATE,
            Self::Custom(text) => text,
        }
    }

    /// Short name for display.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Default => "default",
            Self::Detailed => "detailed",
            Self::Custom(_) => "custom",
        }
    }
}

/// Renders selected issues as `- <title> #<number>` lines, in selection order.
#[must_use]
pub fn render_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|issue| format!("- {} #{}", issue.title, issue.number))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the full prompt: template, issue block, then the fenced diff.
///
/// The diff is embedded verbatim. With no issues the issue block is blank.
#[must_use]
pub fn build(template: &PromptTemplate, issues: &[Issue], diff: &str) -> String {
    format!(
        "{}\n\n{}\n\n---\nHere is the code diff to analyze:\n```diff\n{diff}\n```",
        template.text(),
        render_issues(issues)
    )
}
