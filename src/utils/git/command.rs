use crate::utils::exec::{Cmd, FilterRule, SILENT_FILTER};
use anyhow::Result;
use std::{
    path::{Path, PathBuf},
    process::Output,
};

/// git chatter that is never worth relaying
pub const GIT_FILTER: FilterRule = FilterRule::new(&["hint:"]);

/// Runs the `git` executable inside one working tree.
///
/// Every mutation of the repository goes through here; reads go through
/// [`super::Repository`].
#[derive(Debug, Clone)]
pub struct Git {
    program: PathBuf,
    root: PathBuf,
    overrides: Vec<String>,
    pty: bool,
}

impl Git {
    /// `program` should already be resolved (see `which::which`).
    pub fn new(program: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            root: root.into(),
            overrides: Vec::new(),
            pty: false,
        }
    }

    /// Pass `-c key=value` to every invocation.
    pub fn with_overrides(mut self, overrides: Vec<String>) -> Self {
        self.overrides = overrides;
        self
    }

    /// Run network commands (fetch, pull, push) inside a pseudo-terminal.
    pub fn with_pty(mut self, pty: bool) -> Self {
        self.pty = pty;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cmd(&self) -> Cmd {
        let mut cmd = Cmd::new(&self.program).cwd(&self.root).filter(&GIT_FILTER);
        for kv in &self.overrides {
            cmd = cmd.args(["-c", kv.as_str()]);
        }
        cmd
    }

    fn network(&self) -> Cmd {
        self.cmd().pty(self.pty)
    }

    fn stdout(output: &Output) -> String {
        String::from_utf8_lossy(&output.stdout).trim_end().to_string()
    }

    pub fn version(&self) -> Result<String> {
        let output = self.cmd().arg("--version").filter(&SILENT_FILTER).run()?;
        Ok(Self::stdout(&output).trim().to_string())
    }

    pub fn init(&self) -> Result<()> {
        self.cmd().arg("init").run()?;
        Ok(())
    }

    pub fn remote_add(&self, name: &str, url: &str) -> Result<()> {
        self.cmd().args(["remote", "add", name, url]).run()?;
        Ok(())
    }

    pub fn remote_remove(&self, name: &str) -> Result<()> {
        self.cmd().args(["remote", "remove", name]).run()?;
        Ok(())
    }

    pub fn fetch(&self, remote: &str) -> Result<()> {
        self.network().args(["fetch", remote]).run()?;
        Ok(())
    }

    /// Human-readable `git status`.
    pub fn status(&self) -> Result<String> {
        let output = self.cmd().arg("status").run()?;
        Ok(Self::stdout(&output))
    }

    /// Machine-readable status including every untracked file.
    pub fn porcelain_status(&self) -> Result<String> {
        let output = self
            .cmd()
            .args(["status", "--porcelain", "--untracked-files=all"])
            .filter(&SILENT_FILTER)
            .run()?;
        Ok(Self::stdout(&output))
    }

    /// Point HEAD at a parentless commit of the empty tree.
    ///
    /// The index is not read, so staged files stay staged.
    pub fn commit_empty_tree(&self, message: &str) -> Result<()> {
        // mktree with no input on stdin writes the empty tree
        let tree = self.cmd().arg("mktree").filter(&SILENT_FILTER).run()?;
        let tree = Self::stdout(&tree);

        let commit = self
            .cmd()
            .args(["commit-tree", tree.as_str(), "-m", message])
            .filter(&SILENT_FILTER)
            .run()?;
        let commit = Self::stdout(&commit);

        self.cmd().args(["update-ref", "HEAD", commit.as_str()]).run()?;
        Ok(())
    }

    /// Force-rename the current branch.
    pub fn rename_branch(&self, name: &str) -> Result<()> {
        self.cmd().args(["branch", "-M", name]).run()?;
        Ok(())
    }

    /// `git pull --rebase`, returning the output even on failure so the
    /// caller can decide whether the failure is tolerable.
    ///
    /// Uncommitted changes are stashed around the rebase.
    pub fn pull_rebase(&self, remote: &str, branch: &str) -> Result<Output> {
        self.network()
            .args(["pull", "--rebase", "--autostash", remote, branch])
            .output()
    }

    pub fn add_all(&self) -> Result<()> {
        self.cmd().args(["add", "--all"]).run()?;
        Ok(())
    }

    pub fn commit(&self, message: &str) -> Result<()> {
        self.cmd().args(["commit", "-m", message]).run()?;
        Ok(())
    }

    pub fn push_upstream(&self, remote: &str, branch: &str) -> Result<()> {
        self.network()
            .args(["push", "--set-upstream", remote, branch])
            .run()?;
        Ok(())
    }

    /// Log of commit subjects on HEAD, newest first.
    #[cfg(test)]
    pub fn subjects(&self) -> Result<Vec<String>> {
        let output = self.cmd().args(["log", "--format=%s"]).run()?;
        Ok(Self::stdout(&output).lines().map(str::to_string).collect())
    }
}
