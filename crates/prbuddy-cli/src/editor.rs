// SPDX-License-Identifier: Apache-2.0

//! Round-trips text through the user's editor.

use std::io::Write;
use std::process::Command;

use anyhow::{Context, Result, bail};
use tempfile::NamedTempFile;
use tracing::debug;

/// Editor used when neither `VISUAL` nor `EDITOR` is set.
const FALLBACK_EDITOR: &str = "vi";

/// Returns the editor command line from the environment.
fn editor_command() -> String {
    ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string())
}

/// Opens `text` in the editor and returns what was saved.
///
/// The temporary file is removed when this returns, on success or error.
pub fn edit_text(text: &str) -> Result<String> {
    let mut file = NamedTempFile::with_suffix(".md").context("Failed to create temporary file")?;
    file.write_all(text.as_bytes())
        .context("Failed to write temporary file")?;
    file.flush().context("Failed to write temporary file")?;

    let command = editor_command();
    let mut parts = command.split_whitespace();
    let program = parts.next().unwrap_or(FALLBACK_EDITOR);
    debug!(editor = %command, path = %file.path().display(), "Opening editor");

    let status = Command::new(program)
        .args(parts)
        .arg(file.path())
        .status()
        .with_context(|| format!("Failed to launch editor `{command}`"))?;
    if !status.success() {
        bail!("Editor `{command}` exited with {status}");
    }

    std::fs::read_to_string(file.path()).context("Failed to read edited text")
}
