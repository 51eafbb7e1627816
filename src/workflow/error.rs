//! Failures that end a publish run.

use thiserror::Error;

/// Fatal conditions the workflow detects itself.
///
/// Failing git commands that are not covered here propagate as plain
/// `anyhow` errors carrying git's own output.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("`{0}` is not installed or not on PATH")]
    GitNotFound(String),

    #[error("no remote repository URL given")]
    EmptyRemoteUrl,

    #[error("`{url}` is not a valid git remote URL")]
    InvalidRemoteUrl {
        url: String,
        #[source]
        source: gix::url::parse::Error,
    },

    #[error("commit message cannot be empty")]
    EmptyCommitMessage,

    #[error("rebase onto `{remote}/{branch}` failed\n{detail}")]
    Rebase {
        remote: String,
        branch: String,
        detail: String,
    },
}

impl PublishError {
    /// One-line remediation shown after the error.
    pub fn hint(&self) -> String {
        match self {
            Self::GitNotFound(_) => "Install git and try again.".to_string(),
            Self::EmptyRemoteUrl => {
                "Run again and enter the repository URL, or pass `--remote <URL>`.".to_string()
            }
            Self::InvalidRemoteUrl { .. } => {
                "Use an HTTPS URL, an scp-style `user@host:path` or a local path.".to_string()
            }
            Self::EmptyCommitMessage => {
                "Run again with a valid message, or pass `--message <MSG>`.".to_string()
            }
            Self::Rebase { .. } => {
                "Resolve the conflicts, run `git rebase --continue` (or `git rebase --abort`), then run again."
                    .to_string()
            }
        }
    }
}

/// Remediation for any error that ends a run.
pub fn hint_for(err: &anyhow::Error, branch: &str) -> String {
    match err.downcast_ref::<PublishError>() {
        Some(err) => err.hint(),
        None => format!("Try running `git pull origin {branch} --rebase` first."),
    }
}
