//! The publish workflow.
//!
//! # Steps
//!
//! ```text
//! check_tool → ensure_repo → ensure_ignore → ensure_remote → synchronize
//!   → normalize_branch → pull_rebase → check dirty
//!   → clean: stop | dirty: stage → commit → push
//! ```
//!
//! Each step needs the previous one to succeed. Two failures are tolerated:
//! pulling a branch the remote does not have yet, and (by construction)
//! having nothing to commit. Everything else ends the run.

mod error;

pub use error::{PublishError, hint_for};

use crate::{
    cli::Prompt,
    config::PublishConfig,
    debug, log,
    logger::log_block,
    utils::{
        exec::combined_output,
        git::{
            Git, IgnoreUpdate, ORIGIN, Remote, RemoteChange, Repository, ensure_pattern,
            is_missing_remote_ref,
        },
    },
};
use anyhow::Result;

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to commit; only fetch and status ran
    Clean,
    /// Changes committed and pushed
    Published { branch: String, message: String },
}

/// How the rebase-pull step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    Rebased,
    /// Remote has no counterpart of the branch yet
    NoUpstream,
}

/// Run the whole workflow against `config.root`.
pub fn publish(config: &PublishConfig, prompt: &mut dyn Prompt) -> Result<Outcome> {
    let git = check_tool(config)?;
    let mut repo = ensure_repo(git)?;
    ensure_ignore(config)?;
    let remote = ensure_remote(&mut repo, config, prompt)?;
    synchronize(&mut repo, &remote)?;
    normalize_branch(&mut repo, &config.branch)?;
    pull_rebase(&mut repo, &remote, &config.branch)?;

    if !repo.is_dirty()? {
        log!("status"; "no modifications detected, nothing to commit");
        return Ok(Outcome::Clean);
    }

    stage_commit_push(&repo, &remote, config, prompt)
}

/// Resolve the git program; a missing one is fatal.
fn check_tool(config: &PublishConfig) -> Result<Git> {
    let program = which::which(&config.git)
        .map_err(|_| PublishError::GitNotFound(config.git.clone()))?;

    let git = Git::new(program, &config.root)
        .with_overrides(config.identity_overrides())
        .with_pty(config.pty);

    let version = git.version()?;
    debug!("git"; "{}", version);
    Ok(git)
}

/// Open the repository at the root, initializing one when missing.
fn ensure_repo(git: Git) -> Result<Repository> {
    if Repository::exists_at(git.root()) {
        return Repository::open(git);
    }

    log!("repo"; "{} is not a git repository, initializing", git.root().display());
    let repo = Repository::init(git)?;
    log!("repo"; "initialized");
    Ok(repo)
}

fn ensure_ignore(config: &PublishConfig) -> Result<()> {
    for pattern in &config.ignore {
        match ensure_pattern(&config.root, pattern)? {
            IgnoreUpdate::Present => debug!("ignore"; "`{}` already ignored", pattern),
            IgnoreUpdate::Appended => log!("ignore"; "added `{}` to .gitignore", pattern),
            IgnoreUpdate::Created => log!("ignore"; "created .gitignore with `{}`", pattern),
        }
    }
    Ok(())
}

/// Make `origin` exist and point at the wanted URL.
///
/// The wanted URL is the configured one when given; otherwise an existing
/// remote is kept as is and a missing one is asked for.
fn ensure_remote(
    repo: &mut Repository,
    config: &PublishConfig,
    prompt: &mut dyn Prompt,
) -> Result<Remote> {
    let stored = repo.find_remote(ORIGIN)?;

    let url = match (&config.remote, &stored) {
        (Some(url), _) => url.trim().to_string(),
        (None, Some(stored)) => stored.url.clone(),
        (None, None) => prompt.ask("Enter the remote repository URL:")?,
    };

    if url.is_empty() {
        return Err(PublishError::EmptyRemoteUrl.into());
    }
    Remote::parse_url(&url).map_err(|source| PublishError::InvalidRemoteUrl {
        url: url.clone(),
        source,
    })?;

    let wanted = Remote::origin(url);
    match RemoteChange::between(stored.as_ref(), &wanted) {
        RemoteChange::Unchanged => debug!("remote"; "{}", wanted),
        RemoteChange::Add => {
            repo.add_remote(&wanted)?;
            log!("remote"; "added {}", wanted);
        }
        RemoteChange::Replace { stale } => {
            repo.replace_remote(&wanted)?;
            log!("remote"; "replaced stale {} with {}", stale.url, wanted.url);
        }
    }

    Ok(wanted)
}

/// Fetch, show status, and make sure HEAD has a commit.
fn synchronize(repo: &mut Repository, remote: &Remote) -> Result<()> {
    log!("fetch"; "fetching {}", remote.name);
    repo.git().fetch(&remote.name)?;
    repo.refresh()?;

    log_block("status", &repo.git().status()?);

    if !repo.has_commits()? {
        log!("commit"; "no commits yet, creating an empty initial commit");
        repo.create_placeholder_commit()?;
    }
    Ok(())
}

fn normalize_branch(repo: &mut Repository, branch: &str) -> Result<()> {
    match repo.current_branch()? {
        Some(current) if current == branch => {
            debug!("branch"; "on `{}`", branch);
        }
        current => {
            let from = current.unwrap_or_else(|| "detached HEAD".to_string());
            repo.rename_branch(branch)?;
            log!("branch"; "renamed `{}` to `{}`", from, branch);
        }
    }
    Ok(())
}

/// Rebase local work onto `<remote>/<branch>`.
///
/// A branch the remote does not have yet is expected on first publish and
/// only warned about. It is detected from the remote-tracking ref left by
/// the fetch, and from git's message if the pull itself reports it. Any
/// other pull failure is fatal.
fn pull_rebase(repo: &mut Repository, remote: &Remote, branch: &str) -> Result<PullOutcome> {
    if !repo.has_remote_branch(&remote.name, branch)? {
        log!("warn"; "`{}/{}` does not exist yet, skipping pull", remote.name, branch);
        return Ok(PullOutcome::NoUpstream);
    }

    log!("pull"; "rebasing onto {}/{}", remote.name, branch);
    let output = repo.git().pull_rebase(&remote.name, branch)?;
    let text = combined_output(&output);

    if output.status.success() {
        debug!("pull"; "{}", text);
        repo.refresh()?;
        return Ok(PullOutcome::Rebased);
    }

    if is_missing_remote_ref(&text) {
        log!("warn"; "pull failed, `{}/{}` not found: continuing", remote.name, branch);
        return Ok(PullOutcome::NoUpstream);
    }

    Err(PublishError::Rebase {
        remote: remote.name.clone(),
        branch: branch.to_string(),
        detail: text,
    }
    .into())
}

/// Stage everything, commit with the user's message, push upstream.
fn stage_commit_push(
    repo: &Repository,
    remote: &Remote,
    config: &PublishConfig,
    prompt: &mut dyn Prompt,
) -> Result<Outcome> {
    log!("stage"; "staging all changes");
    repo.git().add_all()?;

    let message = match &config.message {
        Some(message) => message.trim().to_string(),
        None => prompt.ask("Enter your commit message:")?,
    };
    if message.is_empty() {
        return Err(PublishError::EmptyCommitMessage.into());
    }

    repo.git().commit(&message)?;
    log!("commit"; "{}", message);

    log!("push"; "pushing to {}/{}", remote.name, config.branch);
    repo.git().push_upstream(&remote.name, &config.branch)?;
    log!("push"; "done");

    Ok(Outcome::Published {
        branch: config.branch.clone(),
        message,
    })
}
