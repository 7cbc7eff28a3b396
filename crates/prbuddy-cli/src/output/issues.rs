// SPDX-License-Identifier: Apache-2.0

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use console::style;
use std::io::{self, Write};

use crate::cli::OutputContext;
use crate::commands::types::IssueListResult;

use super::Renderable;

/// Builds the issue table.
fn issue_table(result: &IssueListResult) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Title", "Labels"]);

    for issue in &result.issues {
        table.add_row(vec![
            issue.number.to_string(),
            issue.title.clone(),
            issue.labels.join(", "),
        ]);
    }
    table
}

impl Renderable for IssueListResult {
    fn render_text(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        if self.issues.is_empty() {
            writeln!(
                w,
                "{}",
                style(format!("No open issues found in {}.", self.repo)).yellow()
            )?;
            return Ok(());
        }

        writeln!(
            w,
            "{}",
            style(format!("{} open issues in {}", self.issues.len(), self.repo)).bold()
        )?;
        writeln!(w, "{}", issue_table(self))?;
        Ok(())
    }

    fn render_markdown(&self, w: &mut dyn Write, _ctx: &OutputContext) -> io::Result<()> {
        writeln!(w, "## Open issues in {}\n", self.repo)?;
        if self.issues.is_empty() {
            writeln!(w, "None.")?;
            return Ok(());
        }
        for issue in &self.issues {
            write!(w, "- #{} {}", issue.number, issue.title)?;
            if !issue.labels.is_empty() {
                let labels: Vec<String> = issue.labels.iter().map(|l| format!("`{l}`")).collect();
                write!(w, " {}", labels.join(" "))?;
            }
            writeln!(w)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use prbuddy_core::Issue;

    use super::*;
    use crate::cli::OutputFormat;

    fn result() -> IssueListResult {
        IssueListResult {
            repo: "octocat/hello".to_string(),
            issues: vec![
                Issue::new(12, "Crash on login".to_string(), ["bug", "p1"].map(String::from)),
                Issue::new(15, "Dark mode".to_string(), Vec::new()),
            ],
        }
    }

    fn ctx() -> OutputContext {
        OutputContext {
            format: OutputFormat::Markdown,
            quiet: false,
            verbose: false,
            is_tty: false,
        }
    }

    #[test]
    fn test_table_lists_every_issue() {
        let rendered = issue_table(&result()).to_string();
        assert!(rendered.contains("Crash on login"));
        assert!(rendered.contains("bug, p1"));
        assert!(rendered.contains("Dark mode"));
    }

    #[test]
    fn test_markdown_list() {
        let mut buf = Vec::new();
        result().render_markdown(&mut buf, &ctx()).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("- #12 Crash on login `bug` `p1`\n"));
        assert!(out.contains("- #15 Dark mode\n"));
    }
}
