// SPDX-License-Identifier: Apache-2.0

//! GitHub integration module.
//!
//! Provides authentication, issue listing and creation, label management, and
//! pull request publishing.

use anyhow::{Context, Result, bail};

pub mod auth;
pub mod issues;
pub mod labels;
pub mod pulls;

/// Parses an owner/repo string to extract owner and repo.
///
/// Validates format: exactly one `/`, non-empty parts.
///
/// # Errors
///
/// Returns an error if the format is invalid.
pub fn parse_owner_repo(s: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = s.trim().split('/').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        bail!(
            "Invalid owner/repo format.\n\
             Expected: owner/repo\n\
             Got: {s}"
        );
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}

/// An issue or pull request reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberRef {
    /// Repository named by the reference, if it carried one.
    pub repo: Option<(String, String)>,
    /// Issue or pull request number.
    pub number: u64,
}

/// Parses an issue or pull request reference.
///
/// Supports:
/// - Full URL: `https://github.com/owner/repo/issues/123` or `.../pull/123`
/// - Short form: `owner/repo#123`
/// - Bare number: `123` or `#123`
///
/// # Errors
///
/// Returns an error if the format is invalid.
pub fn parse_number_ref(input: &str) -> Result<NumberRef> {
    let input = input.trim();

    if input.starts_with("https://") || input.starts_with("http://") {
        // Drop fragments and query params
        let clean = input.split(['#', '?']).next().unwrap_or(input);
        let parts: Vec<&str> = clean.trim_end_matches('/').split('/').collect();

        // ["https:", "", "github.com", owner, repo, "issues"|"pull", number]
        if parts.len() != 7 || !matches!(parts[5], "issues" | "pull") {
            bail!(
                "Invalid GitHub URL format.\n\
                 Expected: https://github.com/owner/repo/issues/123\n\
                 Got: {input}"
            );
        }
        let number = parse_number(parts[6])?;
        return Ok(NumberRef {
            repo: Some((parts[3].to_string(), parts[4].to_string())),
            number,
        });
    }

    if let Some((repo_part, number_part)) = input.split_once('#')
        && !repo_part.is_empty()
    {
        let repo = parse_owner_repo(repo_part)?;
        return Ok(NumberRef {
            repo: Some(repo),
            number: parse_number(number_part)?,
        });
    }

    Ok(NumberRef {
        repo: None,
        number: parse_number(input.trim_start_matches('#'))?,
    })
}

fn parse_number(s: &str) -> Result<u64> {
    let number: u64 = s
        .parse()
        .with_context(|| format!("Invalid issue or pull request number: {s}"))?;
    if number == 0 {
        bail!("Issue and pull request numbers start at 1");
    }
    Ok(number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_owner_repo_valid() {
        let (owner, repo) = parse_owner_repo("octocat/Hello-World").unwrap();
        assert_eq!(owner, "octocat");
        assert_eq!(repo, "Hello-World");
    }

    #[test]
    fn test_parse_owner_repo_invalid() {
        assert!(parse_owner_repo("octocat").is_err());
        assert!(parse_owner_repo("/repo").is_err());
        assert!(parse_owner_repo("owner/").is_err());
        assert!(parse_owner_repo("a/b/c").is_err());
    }

    #[test]
    fn test_parse_number_ref_bare() {
        assert_eq!(
            parse_number_ref("42").unwrap(),
            NumberRef {
                repo: None,
                number: 42
            }
        );
        assert_eq!(parse_number_ref("#42").unwrap().number, 42);
    }

    #[test]
    fn test_parse_number_ref_short_form() {
        let parsed = parse_number_ref("octocat/Hello-World#7").unwrap();
        assert_eq!(
            parsed.repo,
            Some(("octocat".to_string(), "Hello-World".to_string()))
        );
        assert_eq!(parsed.number, 7);
    }

    #[test]
    fn test_parse_number_ref_urls() {
        let issue = parse_number_ref("https://github.com/octocat/Hello-World/issues/123").unwrap();
        assert_eq!(issue.number, 123);

        let pull =
            parse_number_ref("https://github.com/octocat/Hello-World/pull/9#discussion").unwrap();
        assert_eq!(pull.number, 9);
        assert_eq!(pull.repo.unwrap().1, "Hello-World");
    }

    #[test]
    fn test_parse_number_ref_invalid() {
        assert!(parse_number_ref("abc").is_err());
        assert!(parse_number_ref("0").is_err());
        assert!(parse_number_ref("https://github.com/octocat/Hello-World/wiki/1").is_err());
    }
}
