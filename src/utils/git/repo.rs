use super::{Git, Remote};
use anyhow::{Context, Result};
use std::path::Path;

/// Message of the placeholder commit created in a repository without history.
pub const PLACEHOLDER_MESSAGE: &str = "Initial commit";

/// Handle to the working tree being published.
///
/// State is read through `gix`; changes are made by running `git` and then
/// re-opening the `gix` handle so later reads see them.
pub struct Repository {
    git: Git,
    inner: gix::Repository,
}

impl Repository {
    /// Whether `root` itself holds a repository (not a parent of it).
    pub fn exists_at(root: &Path) -> bool {
        root.join(".git").exists()
    }

    /// Initialize a repository at the runner's root.
    pub fn init(git: Git) -> Result<Self> {
        git.init()?;
        Self::open(git)
    }

    /// Open the repository at the runner's root.
    pub fn open(git: Git) -> Result<Self> {
        let inner = open_at(git.root())?;
        Ok(Self { git, inner })
    }

    /// Re-read repository state after `git` changed it.
    fn reload(&mut self) -> Result<()> {
        self.inner = open_at(self.git.root())?;
        Ok(())
    }

    pub fn git(&self) -> &Git {
        &self.git
    }

    /// Whether HEAD points at a commit.
    pub fn has_commits(&self) -> Result<bool> {
        let head = self.inner.head().context("Failed to read HEAD")?;
        Ok(!head.is_unborn())
    }

    /// Short name of the checked-out branch, `None` when HEAD is detached.
    pub fn current_branch(&self) -> Result<Option<String>> {
        let name = self.inner.head_name().context("Failed to read HEAD")?;
        Ok(name.map(|n| n.shorten().to_string()))
    }

    /// Look up a configured remote and its URL as written in the config.
    ///
    /// The raw value is used, not the fetch URL `gix` resolves, which has
    /// `insteadOf` rewrites and case normalization applied.
    pub fn find_remote(&self, name: &str) -> Result<Option<Remote>> {
        let Some(remote) = self.inner.try_find_remote(name) else {
            return Ok(None);
        };
        remote.with_context(|| format!("Invalid configuration for remote `{name}`"))?;

        let url = self
            .inner
            .config_snapshot()
            .string(format!("remote.{name}.url"))
            .map(|url| url.to_string())
            .unwrap_or_default();
        Ok(Some(Remote::new(name, url)))
    }

    /// Whether the last fetch brought back `<remote>/<branch>`.
    pub fn has_remote_branch(&self, remote: &str, branch: &str) -> Result<bool> {
        let name = format!("refs/remotes/{remote}/{branch}");
        let reference = self
            .inner
            .try_find_reference(name.as_str())
            .with_context(|| format!("Failed to look up `{name}`"))?;
        Ok(reference.is_some())
    }

    /// Uncommitted changes, untracked files included.
    pub fn is_dirty(&self) -> Result<bool> {
        Ok(!self.git.porcelain_status()?.is_empty())
    }

    pub fn add_remote(&mut self, remote: &Remote) -> Result<()> {
        self.git.remote_add(&remote.name, &remote.url)?;
        self.reload()
    }

    /// Drop the remote named like `remote` and recreate it with its URL.
    pub fn replace_remote(&mut self, remote: &Remote) -> Result<()> {
        self.git.remote_remove(&remote.name)?;
        self.git.remote_add(&remote.name, &remote.url)?;
        self.reload()
    }

    /// Give an unborn HEAD something to point at, without touching the index.
    pub fn create_placeholder_commit(&mut self) -> Result<()> {
        self.git.commit_empty_tree(PLACEHOLDER_MESSAGE)?;
        self.reload()
    }

    pub fn rename_branch(&mut self, name: &str) -> Result<()> {
        self.git.rename_branch(name)?;
        self.reload()
    }

    /// Re-read state after a command that may have moved refs.
    pub fn refresh(&mut self) -> Result<()> {
        self.reload()
    }
}

fn open_at(root: &Path) -> Result<gix::Repository> {
    gix::open(root).with_context(|| format!("Failed to open repository at '{}'", root.display()))
}
