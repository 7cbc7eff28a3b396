// SPDX-License-Identifier: Apache-2.0

//! Configuration management for prbuddy.
//!
//! Provides layered configuration from files and environment variables.
//! Uses XDG-compliant paths with environment variable support.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables (prefix: `PRBUDDY_`)
//! 2. Config file: `~/.config/prbuddy/config.toml`
//! 3. Built-in defaults
//!
//! # Examples
//!
//! ```bash
//! # Override the Gemini model via environment variable
//! PRBUDDY_AI__MODEL=gemini-2.5-flash prbuddy pr draft
//! ```

use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::PrBuddyError;
use crate::github::pulls::MergeMethod;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// User preferences.
    pub user: UserConfig,
    /// Generation backend settings.
    pub ai: AiConfig,
    /// GitHub API settings.
    pub github: GitHubConfig,
    /// Pull request drafting settings.
    pub pr: PrConfig,
    /// UI preferences.
    pub ui: UiConfig,
}

/// User preferences.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct UserConfig {
    /// Default repository (`owner/repo`) when `--repo` is not given.
    pub default_repo: Option<String>,
}

/// Generation backend settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Gemini model identifier.
    pub model: String,
    /// Base URL of the Generative Language API.
    pub api_base: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// Sampling temperature (0.0-2.0).
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_output_tokens: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-pro".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_seconds: 120,
            temperature: 0.3,
            max_output_tokens: 8192,
        }
    }
}

/// GitHub API settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// API request timeout in seconds.
    pub api_timeout_seconds: u64,
    /// Number of open issues fetched for selection (first page only).
    pub issue_page_size: u8,
    /// Name of the git remote that tracks GitHub.
    pub remote: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_timeout_seconds: 10,
            issue_page_size: 50,
            remote: "origin".to_string(),
        }
    }
}

impl GitHubConfig {
    /// Largest page GitHub serves.
    pub const MAX_PAGE_SIZE: u8 = 100;

    fn validate(&self) -> Result<(), PrBuddyError> {
        if !(1..=Self::MAX_PAGE_SIZE).contains(&self.issue_page_size) {
            return Err(PrBuddyError::Config {
                message: format!(
                    "github.issue_page_size must be between 1 and {}, got {}",
                    Self::MAX_PAGE_SIZE,
                    self.issue_page_size
                ),
            });
        }
        Ok(())
    }
}

/// Pull request drafting settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PrConfig {
    /// Built-in template name: "default" or "detailed".
    pub template: String,
    /// Path to a custom template file, replacing the built-in one.
    pub template_file: Option<PathBuf>,
    /// Assignee for created pull requests.
    pub assignee: Option<String>,
    /// Merge strategy offered first when merging after publishing.
    pub merge_method: MergeMethod,
    /// Open the generated description in `$EDITOR` before publishing.
    pub edit_before_publish: bool,
}

impl Default for PrConfig {
    fn default() -> Self {
        Self {
            template: "default".to_string(),
            template_file: None,
            assignee: None,
            merge_method: MergeMethod::Squash,
            edit_before_publish: false,
        }
    }
}

/// UI preferences.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Enable colored output.
    pub color: bool,
    /// Always confirm before creating anything on GitHub.
    pub confirm_before_publish: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            color: true,
            confirm_before_publish: true,
        }
    }
}

/// Returns the prbuddy configuration directory.
///
/// Respects the `XDG_CONFIG_HOME` environment variable if set,
/// otherwise defaults to `~/.config/prbuddy`.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        return PathBuf::from(xdg_config).join("prbuddy");
    }
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".config")
        .join("prbuddy")
}

/// Returns the path to the configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load application configuration.
///
/// Loads from config file (if exists) and environment variables.
/// Environment variables use the prefix `PRBUDDY_` and double underscore
/// for nested keys (e.g., `PRBUDDY_AI__MODEL`).
///
/// # Errors
///
/// Returns `PrBuddyError::Config` if the config file exists but is invalid.
pub fn load_config() -> Result<AppConfig, PrBuddyError> {
    let config_path = config_file_path();

    let config = Config::builder()
        // Load from config file (optional - may not exist)
        .add_source(File::with_name(config_path.to_string_lossy().as_ref()).required(false))
        // Override with environment variables
        .add_source(
            Environment::with_prefix("PRBUDDY")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;
    app_config.github.validate()?;

    Ok(app_config)
}
