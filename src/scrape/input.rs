use std::path::Path;

use anyhow::{bail, Context, Result};

/// Collect URL text from `--input`, positional arguments, or stdin when neither is given.
pub fn read_input(urls: &[String], input: Option<&Path>) -> Result<String> {
    let mut text = match input {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?,
        None if urls.is_empty() => return std::io::read_to_string(std::io::stdin()).context("read stdin"),
        None => String::new(),
    };
    for url in urls {
        text.push('\n');
        text.push_str(url);
    }
    Ok(text)
}

/// One URL per line; surrounding whitespace and blank lines are dropped.
pub fn parse_url_list(text: &str) -> Result<Vec<String>> {
    let urls: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    if urls.is_empty() {
        bail!("Please provide at least one valid URL (one per line).");
    }
    Ok(urls)
}
