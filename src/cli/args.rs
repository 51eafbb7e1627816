//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Save and publish your work: init, sync, rebase, commit and push in one go.
///
/// Run without arguments from the project root; every option is an override.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,

    /// Project root directory (default: current directory)
    #[arg(short = 'C', long, default_value = ".", value_hint = clap::ValueHint::DirPath)]
    pub dir: PathBuf,

    /// Config file path, relative to the project root
    #[arg(short, long, default_value = ".publish.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Remote URL for `origin`; replaces a stale configured URL
    #[arg(short, long, value_hint = clap::ValueHint::Url)]
    pub remote: Option<String>,

    /// Branch to normalize to and publish (default: main)
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Commit message (skips the interactive prompt)
    #[arg(short, long)]
    pub message: Option<String>,

    /// Enable verbose output for debugging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_is_valid() {
        let cli = Cli::try_parse_from(["git-publish"]).unwrap();
        assert_eq!(cli.dir, PathBuf::from("."));
        assert_eq!(cli.config, PathBuf::from(".publish.toml"));
        assert!(cli.remote.is_none());
        assert!(cli.branch.is_none());
        assert!(cli.message.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "git-publish",
            "-C",
            "~/work/site",
            "--remote",
            "git@example.com:me/site.git",
            "-b",
            "trunk",
            "-m",
            "update posts",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.dir, PathBuf::from("~/work/site"));
        assert_eq!(cli.remote.as_deref(), Some("git@example.com:me/site.git"));
        assert_eq!(cli.branch.as_deref(), Some("trunk"));
        assert_eq!(cli.message.as_deref(), Some("update posts"));
        assert!(cli.verbose);
    }
}
