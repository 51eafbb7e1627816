//! Publish configuration.
//!
//! Values come from three layers, later ones winning:
//!
//! 1. Built-in defaults (`main` branch, `.vs/` ignore pattern, `git` program)
//! 2. Optional `.publish.toml` at the project root
//! 3. Command-line overrides
//!
//! # Example
//!
//! ```toml
//! branch = "main"
//! ignore = [".vs/"]
//! remote = "git@github.com:me/project.git"
//! git = "git"
//!
//! [commit]
//! name = "Dev"
//! email = "dev@example.com"
//! ```

mod error;

pub use error::ConfigError;

use crate::{cli::Cli, log};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    io::IsTerminal,
    path::{Path, PathBuf},
};

/// Default canonical branch.
pub const DEFAULT_BRANCH: &str = "main";

/// Default ignore pattern: Visual Studio metadata directory.
pub const DEFAULT_IGNORE: &str = ".vs/";

// ============================================================================
// root configuration
// ============================================================================

/// Everything the publish workflow needs, passed in explicitly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Absolute project root (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Branch name the workflow normalizes to and pushes
    pub branch: String,

    /// Patterns that must be present in `.gitignore`
    pub ignore: Vec<String>,

    /// Candidate URL for `origin`. When unset, an existing remote is kept
    /// and a missing one is asked for.
    pub remote: Option<String>,

    /// Git program name or path
    pub git: String,

    /// Commit identity override
    pub commit: CommitIdentity,

    /// Commit message given up front (CLI only)
    #[serde(skip)]
    pub message: Option<String>,

    /// Run network commands inside a pseudo-terminal (CLI only)
    #[serde(skip)]
    pub pty: bool,
}

/// `[commit]` section: identity passed to git as `-c user.name/-c user.email`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommitIdentity {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            branch: DEFAULT_BRANCH.to_string(),
            ignore: vec![DEFAULT_IGNORE.to_string()],
            remote: None,
            git: "git".to_string(),
            commit: CommitIdentity::default(),
            message: None,
            pty: false,
        }
    }
}

impl PublishConfig {
    /// Load configuration from CLI arguments.
    ///
    /// The project root is `--dir` (tilde-expanded) made absolute against
    /// the current directory; the config file is looked up relative to it.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = Self::resolve_root(&cli.dir)?;
        let config_path = root.join(&cli.config);

        let mut config = if config_path.is_file() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };

        config.root = root;
        config.pty = std::io::stdin().is_terminal();
        config.apply_cli(cli);
        config.validate()?;

        Ok(config)
    }

    /// Defaults rooted at `root`, without reading any file.
    #[cfg(test)]
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Resolve `--dir` to an absolute path.
    fn resolve_root(dir: &Path) -> Result<PathBuf> {
        let raw = dir.to_string_lossy();
        let expanded = shellexpand::tilde(&raw);
        let path = PathBuf::from(expanded.as_ref());

        let root = if path.is_absolute() {
            path
        } else {
            std::env::current_dir()
                .context("Failed to get current working directory")?
                .join(path)
        };

        if !root.is_dir() {
            return Err(ConfigError::Validation(format!(
                "project directory `{}` does not exist",
                root.display()
            ))
            .into());
        }

        // `.` components would otherwise show up in every logged path
        Ok(root.canonicalize().unwrap_or(root))
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warn"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Apply command-line overrides.
    fn apply_cli(&mut self, cli: &Cli) {
        Self::update_option(&mut self.branch, cli.branch.as_ref());
        if let Some(remote) = &cli.remote {
            self.remote = Some(remote.trim().to_string());
        }
        if let Some(message) = &cli.message {
            self.message = Some(message.clone());
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Reject values the workflow cannot act on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.branch.trim().is_empty() {
            return Err(ConfigError::Validation("branch must not be empty".into()));
        }
        if self.branch.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "branch `{}` must not contain whitespace",
                self.branch
            )));
        }
        if self.ignore.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "ignore patterns must not be empty".into(),
            ));
        }
        if self.git.trim().is_empty() {
            return Err(ConfigError::Validation("git program must not be empty".into()));
        }
        Ok(())
    }

    /// `-c key=value` pairs for the configured commit identity.
    pub fn identity_overrides(&self) -> Vec<String> {
        let mut overrides = Vec::new();
        if let Some(name) = &self.commit.name {
            overrides.push(format!("user.name={name}"));
        }
        if let Some(email) = &self.commit.email {
            overrides.push(format!("user.email={email}"));
        }
        overrides
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["git-publish"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = PublishConfig::default();
        assert_eq!(config.branch, "main");
        assert_eq!(config.ignore, vec![".vs/".to_string()]);
        assert_eq!(config.git, "git");
        assert!(config.remote.is_none());
        assert!(config.identity_overrides().is_empty());
    }

    #[test]
    fn test_parse_full_file() {
        let content = r#"
branch = "trunk"
ignore = [".vs/", "/target/"]
remote = "git@example.com:me/site.git"

[commit]
name = "Dev"
email = "dev@example.com"
"#;
        let (config, ignored) = PublishConfig::parse_with_ignored(content).unwrap();
        assert!(ignored.is_empty());
        assert_eq!(config.branch, "trunk");
        assert_eq!(config.ignore.len(), 2);
        assert_eq!(config.remote.as_deref(), Some("git@example.com:me/site.git"));
        assert_eq!(
            config.identity_overrides(),
            vec!["user.name=Dev", "user.email=dev@example.com"]
        );
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "branch = \"main\"\nbrnach = \"typo\"\n[commit]\nmail = \"x\"";
        let (config, ignored) = PublishConfig::parse_with_ignored(content).unwrap();
        assert_eq!(config.branch, "main");
        assert!(ignored.iter().any(|f| f.contains("brnach")));
        assert!(ignored.iter().any(|f| f.contains("mail")));
    }

    #[test]
    fn test_invalid_toml() {
        let result = PublishConfig::parse_with_ignored("branch = [unclosed");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_validate_rejects_empty_values() {
        let mut config = PublishConfig::default();
        config.branch = " ".into();
        assert!(config.validate().is_err());

        let mut config = PublishConfig::default();
        config.branch = "my branch".into();
        assert!(config.validate().is_err());

        let mut config = PublishConfig::default();
        config.ignore.push(String::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().to_string_lossy().to_string();
        let config = PublishConfig::load(&cli(&["-C", &dir])).unwrap();

        assert_eq!(config.root, temp.path().canonicalize().unwrap());
        assert_eq!(config.branch, "main");
        assert!(config.message.is_none());
    }

    #[test]
    fn test_load_file_then_cli_overrides() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(".publish.toml"),
            "branch = \"trunk\"\nremote = \"/srv/git/site.git\"",
        )
        .unwrap();
        let dir = temp.path().to_string_lossy().to_string();

        let config = PublishConfig::load(&cli(&["-C", &dir])).unwrap();
        assert_eq!(config.branch, "trunk");
        assert_eq!(config.remote.as_deref(), Some("/srv/git/site.git"));

        let config = PublishConfig::load(&cli(&[
            "-C",
            &dir,
            "-b",
            "main",
            "-r",
            " /srv/git/other.git ",
            "-m",
            "notes",
        ]))
        .unwrap();
        assert_eq!(config.branch, "main");
        assert_eq!(config.remote.as_deref(), Some("/srv/git/other.git"));
        assert_eq!(config.message.as_deref(), Some("notes"));
    }

    #[test]
    fn test_load_missing_dir_fails() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope").to_string_lossy().to_string();
        assert!(PublishConfig::load(&cli(&["-C", &missing])).is_err());
    }
}
