// SPDX-License-Identifier: Apache-2.0

//! Human decision front-ends for the drafting pipeline.
//!
//! [`DialoguerSelector`] drives terminal pickers. [`IndexSelector`] asks for
//! numbers on a plain line stream, for pipes and terminals without cursor
//! control.

use std::io::{BufRead, Write};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use dialoguer::{Confirm, Input, MultiSelect, Select};
use prbuddy_core::Selector;

use crate::editor;

/// Terminal pickers built on `dialoguer`.
pub struct DialoguerSelector;

impl Selector for DialoguerSelector {
    fn present(&self, prompt: &str, options: &[String]) -> Result<Vec<usize>> {
        MultiSelect::new()
            .with_prompt(format!("{prompt} (space to toggle, enter to confirm)"))
            .items(options)
            .interact()
            .context("Failed to read issue selection")
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .context("Failed to get user confirmation")
    }

    fn choose(&self, prompt: &str, options: &[&str], default: usize) -> Result<usize> {
        Select::new()
            .with_prompt(prompt)
            .items(options)
            .default(default)
            .interact()
            .context("Failed to read selection")
    }

    fn input(&self, prompt: &str, default: &str) -> Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .default(default.to_string())
            .interact_text()
            .context("Failed to read input")
    }

    fn edit(&self, text: &str) -> Result<String> {
        editor::edit_text(text)
    }
}

/// Numbered prompts over a line reader.
///
/// End of input answers every question with its safe default: no issues,
/// "no" for confirmations, and the offered default elsewhere.
pub struct IndexSelector<R, W> {
    io: Mutex<(R, W)>,
}

impl<R: BufRead, W: Write> IndexSelector<R, W> {
    /// Creates a selector reading answers from `reader` and writing prompts to `writer`.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            io: Mutex::new((reader, writer)),
        }
    }

    /// Writes `prompt` and reads one answer line. `None` at end of input.
    fn ask(&self, prompt: &str) -> Result<Option<String>> {
        let mut guard = self.io.lock().map_err(|_| anyhow!("prompt stream poisoned"))?;
        let (reader, writer) = &mut *guard;
        write!(writer, "{prompt}")?;
        writer.flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line).context("Failed to read input")? == 0 {
            writeln!(writer)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn say(&self, text: &str) -> Result<()> {
        let mut guard = self.io.lock().map_err(|_| anyhow!("prompt stream poisoned"))?;
        writeln!(guard.1, "{text}")?;
        Ok(())
    }

    fn list(&self, options: &[impl AsRef<str>]) -> Result<()> {
        for (i, option) in options.iter().enumerate() {
            self.say(&format!("  {}) {}", i + 1, option.as_ref()))?;
        }
        Ok(())
    }
}

/// Parses `"1, 3 4"` into zero-based indices below `len`.
fn parse_indices(answer: &str, len: usize) -> std::result::Result<Vec<usize>, String> {
    answer
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| match token.parse::<usize>() {
            Ok(n) if (1..=len).contains(&n) => Ok(n - 1),
            _ => Err(format!("'{token}' is not a number between 1 and {len}")),
        })
        .collect()
}

impl<R, W> Selector for IndexSelector<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn present(&self, prompt: &str, options: &[String]) -> Result<Vec<usize>> {
        self.say(&format!("{prompt}:"))?;
        self.list(options)?;
        loop {
            let Some(answer) = self.ask("Numbers separated by commas (blank for none): ")? else {
                return Ok(Vec::new());
            };
            match parse_indices(&answer, options.len()) {
                Ok(indices) => return Ok(indices),
                Err(message) => self.say(&message)?,
            }
        }
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        loop {
            let Some(answer) = self.ask(&format!("{prompt} {hint} "))? else {
                return Ok(false);
            };
            match answer.to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.say("Please answer y or n")?,
            }
        }
    }

    fn choose(&self, prompt: &str, options: &[&str], default: usize) -> Result<usize> {
        self.say(&format!("{prompt}:"))?;
        self.list(options)?;
        loop {
            let Some(answer) = self.ask(&format!("Number [{}]: ", default + 1))? else {
                return Ok(default);
            };
            if answer.is_empty() {
                return Ok(default);
            }
            match parse_indices(&answer, options.len()).as_deref() {
                Ok([index]) => return Ok(*index),
                Ok(_) => self.say("Pick exactly one number")?,
                Err(message) => self.say(message)?,
            }
        }
    }

    fn input(&self, prompt: &str, default: &str) -> Result<String> {
        let answer = self.ask(&format!("{prompt} [{default}]: "))?;
        Ok(answer
            .filter(|answer| !answer.is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    fn edit(&self, text: &str) -> Result<String> {
        editor::edit_text(text)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn selector(input: &str) -> IndexSelector<Cursor<Vec<u8>>, Vec<u8>> {
        IndexSelector::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn options() -> Vec<String> {
        vec![
            "#12 Crash on login [bug]".to_string(),
            "#15 Dark mode [ui]".to_string(),
            "#18 Faster startup".to_string(),
        ]
    }

    #[test]
    fn test_parse_indices() {
        assert_eq!(parse_indices("1,3", 3), Ok(vec![0, 2]));
        assert_eq!(parse_indices(" 2 3 ", 3), Ok(vec![1, 2]));
        assert_eq!(parse_indices("", 3), Ok(vec![]));
        assert!(parse_indices("4", 3).is_err());
        assert!(parse_indices("0", 3).is_err());
        assert!(parse_indices("x", 3).is_err());
    }

    #[test]
    fn test_present_reasks_after_invalid_answer() {
        let s = selector("9\n1,3\n");
        assert_eq!(s.present("Select related issues", &options()).unwrap(), vec![0, 2]);

        let guard = s.io.lock().unwrap();
        let shown = String::from_utf8_lossy(&guard.1);
        assert!(shown.contains("  2) #15 Dark mode [ui]"));
        assert!(shown.contains("'9' is not a number between 1 and 3"));
    }

    #[test]
    fn test_present_end_of_input_selects_nothing() {
        assert!(selector("").present("Select", &options()).unwrap().is_empty());
    }

    #[test]
    fn test_confirm_answers() {
        assert!(selector("y\n").confirm("Publish?", false).unwrap());
        assert!(!selector("no\n").confirm("Publish?", true).unwrap());
        assert!(selector("\n").confirm("Publish?", true).unwrap());
        assert!(selector("maybe\nyes\n").confirm("Publish?", false).unwrap());
    }

    #[test]
    fn test_confirm_end_of_input_is_no() {
        assert!(!selector("").confirm("Publish?", true).unwrap());
    }

    #[test]
    fn test_choose_defaults_and_picks() {
        let names = ["squash", "merge", "rebase"];
        assert_eq!(selector("\n").choose("Merge strategy", &names, 0).unwrap(), 0);
        assert_eq!(selector("3\n").choose("Merge strategy", &names, 0).unwrap(), 2);
        assert_eq!(selector("1,2\n2\n").choose("Merge strategy", &names, 0).unwrap(), 1);
        assert_eq!(selector("").choose("Merge strategy", &names, 1).unwrap(), 1);
    }

    #[test]
    fn test_input_falls_back_to_default() {
        assert_eq!(selector("\n").input("Target branch (to)", "main").unwrap(), "main");
        assert_eq!(selector("").input("Target branch (to)", "main").unwrap(), "main");
        assert_eq!(
            selector("develop\n").input("Target branch (to)", "main").unwrap(),
            "develop"
        );
    }
}
