//! `.gitignore` maintenance.

use anyhow::{Context, Result};
use std::{fs, path::Path};

pub const IGNORE_FILE: &str = ".gitignore";

/// What [`ensure_pattern`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreUpdate {
    /// Pattern was already listed
    Present,
    /// Pattern appended to an existing file
    Appended,
    /// File did not exist and was created with the pattern
    Created,
}

/// Make sure `pattern` is listed in `<root>/.gitignore`.
///
/// A pattern counts as listed when some line equals it after trimming, so
/// repeated calls never duplicate it.
pub fn ensure_pattern(root: &Path, pattern: &str) -> Result<IgnoreUpdate> {
    let path = root.join(IGNORE_FILE);

    if !path.exists() {
        fs::write(&path, format!("{pattern}\n"))
            .with_context(|| format!("Failed to write '{}'", path.display()))?;
        return Ok(IgnoreUpdate::Created);
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;

    if contains_pattern(&content, pattern) {
        return Ok(IgnoreUpdate::Present);
    }

    let mut updated = content;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(pattern);
    updated.push('\n');

    fs::write(&path, updated).with_context(|| format!("Failed to write '{}'", path.display()))?;
    Ok(IgnoreUpdate::Appended)
}

fn contains_pattern(content: &str, pattern: &str) -> bool {
    let pattern = pattern.trim();
    content.lines().any(|line| line.trim() == pattern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read(root: &Path) -> String {
        fs::read_to_string(root.join(IGNORE_FILE)).unwrap()
    }

    #[test]
    fn test_creates_missing_file() {
        let temp = TempDir::new().unwrap();
        let update = ensure_pattern(temp.path(), ".vs/").unwrap();
        assert_eq!(update, IgnoreUpdate::Created);
        assert_eq!(read(temp.path()), ".vs/\n");
    }

    #[test]
    fn test_appends_without_gluing_lines() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(IGNORE_FILE), "/target").unwrap();

        let update = ensure_pattern(temp.path(), ".vs/").unwrap();
        assert_eq!(update, IgnoreUpdate::Appended);
        assert_eq!(read(temp.path()), "/target\n.vs/\n");
    }

    #[test]
    fn test_repeated_runs_keep_one_entry() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(IGNORE_FILE), "node_modules/\n").unwrap();

        for _ in 0..3 {
            ensure_pattern(temp.path(), ".vs/").unwrap();
        }

        let content = read(temp.path());
        assert_eq!(content.lines().filter(|l| *l == ".vs/").count(), 1);
        assert!(content.starts_with("node_modules/\n"));
    }

    #[test]
    fn test_present_with_surrounding_whitespace() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(IGNORE_FILE), "  .vs/  \r\n").unwrap();

        let update = ensure_pattern(temp.path(), ".vs/").unwrap();
        assert_eq!(update, IgnoreUpdate::Present);
    }

    #[test]
    fn test_substring_is_not_a_match() {
        // `foo.vs/` must not satisfy `.vs/`
        assert!(!contains_pattern("foo.vs/\n", ".vs/"));
        assert!(contains_pattern("a\n.vs/\nb", ".vs/"));
    }
}
