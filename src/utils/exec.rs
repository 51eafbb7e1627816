//! External command execution utilities.
//!
//! Provides a Builder-based API for running external commands with output
//! capture, optional PTY support and noise filtering.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! // Fails on non-zero exit
//! Cmd::new("git").args(["status", "--porcelain"]).cwd(root).run()?;
//!
//! // Inspect a failure instead of propagating it
//! let output = Cmd::new("git").args(["pull", "--rebase"]).cwd(root).output()?;
//! if !output.status.success() { /* ... */ }
//!
//! // Attach to a pseudo-terminal so credential prompts work
//! Cmd::new("git").args(["push"]).cwd(root).pty(true).run()?;
//! ```

use crate::log;
use anyhow::{Context, Result};
use portable_pty::{CommandBuilder, NativePtySystem, PtySize, PtySystem};
use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    io::Read,
    path::{Path, PathBuf},
    process::{Command, Output},
    sync::OnceLock,
};

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    use_pty: bool,
    filter: Option<&'static FilterRule>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            let arg = arg.as_ref();
            if !arg.is_empty() {
                self.args.push(arg.to_owned());
            }
        }
        self
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Enable PTY (pseudo-terminal) mode.
    ///
    /// PTY lets the child behave as if running in a real terminal, so git
    /// can show progress and ask for credentials. Stdout and stderr arrive
    /// merged in `Output::stdout`.
    pub fn pty(mut self, enable: bool) -> Self {
        self.use_pty = enable;
        self
    }

    /// Set output filter for logging.
    pub fn filter(mut self, filter: &'static FilterRule) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Execute the command, failing on a non-zero exit status.
    pub fn run(self) -> Result<Output> {
        let name = self.program_name();
        let filter = self.filter.unwrap_or(&EMPTY_FILTER);
        let use_pty = self.use_pty;
        let output = self.output()?;

        if !output.status.success() {
            anyhow::bail!(format_error(&name, &output, filter));
        }

        // PTY output was already relayed while reading
        if !use_pty {
            let stderr = String::from_utf8_lossy(&output.stderr);
            filter.log(&name, stderr.trim());
        }
        Ok(output)
    }

    /// Execute the command and return its output whatever the exit status.
    ///
    /// Only failures to start or wait for the process are errors.
    pub fn output(self) -> Result<Output> {
        if self.use_pty {
            self.output_with_pty()
        } else {
            self.output_simple()
        }
    }

    /// Get the program name for error messages.
    fn program_name(&self) -> String {
        Path::new(&self.program)
            .file_stem()
            .unwrap_or(&self.program)
            .to_string_lossy()
            .to_string()
    }

    /// Plain execution with captured stdout and stderr.
    fn output_simple(self) -> Result<Output> {
        let name = self.program_name();
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        cmd.output()
            .with_context(|| format!("Failed to execute `{name}`"))
    }

    /// Execution with PTY support.
    fn output_with_pty(self) -> Result<Output> {
        let name = self.program_name();
        let filter = self.filter.unwrap_or(&EMPTY_FILTER);

        let mut cmd_builder = CommandBuilder::new(&self.program);
        cmd_builder.args(&self.args);

        if let Some(dir) = &self.cwd {
            cmd_builder.cwd(dir);
        }

        let pty_system = NativePtySystem::default();
        let pair = pty_system.openpty(PtySize {
            rows: 24,
            cols: 80,
            pixel_width: 0,
            pixel_height: 0,
        })?;

        let mut child = pair
            .slave
            .spawn_command(cmd_builder)
            .with_context(|| format!("Failed to spawn `{name}`"))?;
        drop(pair.slave);

        // Read output in separate thread (PTY blocks until EOF)
        let mut reader = pair.master.try_clone_reader()?;
        let output_handle = std::thread::spawn(move || {
            // EIO once the child side closes; keep what was read
            let mut output = Vec::new();
            let _ = reader.read_to_end(&mut output);
            output
        });

        let status = child
            .wait()
            .with_context(|| format!("Failed to wait for `{name}`"))?;
        drop(pair.master);

        let output_bytes = output_handle
            .join()
            .map_err(|_| anyhow::anyhow!("Failed to join output reader thread"))?;

        if status.success() {
            filter.log(&name, &String::from_utf8_lossy(&output_bytes));
        }

        #[cfg(unix)]
        #[allow(clippy::cast_possible_wrap)]
        let std_status = {
            use std::os::unix::process::ExitStatusExt;
            std::process::ExitStatus::from_raw((status.exit_code() as i32) << 8)
        };
        #[cfg(windows)]
        let std_status = {
            use std::os::windows::process::ExitStatusExt;
            std::process::ExitStatus::from_raw(status.exit_code())
        };

        Ok(Output {
            status: std_status,
            stdout: output_bytes,
            stderr: Vec::new(),
        })
    }
}

// ============================================================================
// Output Filtering
// ============================================================================

/// Filter rule for command output logging.
///
/// Used to reduce noise by skipping known warnings or irrelevant messages.
pub struct FilterRule {
    /// Prefixes to skip when logging output.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    /// Create a new filter rule.
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    /// Check if a line should be skipped.
    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Log output lines that pass the filter.
    pub fn log(&self, name: &str, output: &str) {
        let lines: Vec<_> = output
            .lines()
            .map(strip_ansi)
            .filter(|line| !self.should_skip(line.trim()))
            .map(|line| line.trim().to_string())
            .collect();

        if !lines.is_empty() {
            log!(name; "{}", lines.join("\n"));
        }
    }
}

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

/// Silent filter (skip all output).
pub const SILENT_FILTER: FilterRule = FilterRule::new(&[""]);

// ============================================================================
// Helpers
// ============================================================================

/// Strip ANSI escape codes from string.
pub fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").unwrap());
    re.replace_all(s, "")
}

/// Combined stdout and stderr of a finished command, ANSI codes removed.
pub fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    strip_ansi(&format!("{stdout}\n{stderr}")).trim().to_string()
}

/// Format error message for failed command.
pub fn format_error(name: &str, output: &Output, filter: &FilterRule) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let error_msg: Vec<_> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !filter.should_skip(line))
        .collect();

    let mut msg = format!("Command `{name}` failed with {}", output.status);
    if !error_msg.is_empty() {
        msg.push('\n');
        msg.push_str(&error_msg.join("\n"));
    }

    let stdout_trimmed = strip_ansi(stdout.trim()).to_string();
    if !stdout_trimmed.is_empty() {
        msg.push_str("\nStdout:\n");
        msg.push_str(&stdout_trimmed);
    }
    msg
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_builder() {
        let cmd = Cmd::new("git")
            .arg("status")
            .args(["--porcelain", "--untracked-files=all"])
            .cwd("/tmp");

        assert_eq!(cmd.program, OsString::from("git"));
        assert_eq!(cmd.args.len(), 3);
        assert_eq!(cmd.cwd, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_empty_args_filtered() {
        let cmd = Cmd::new("git").arg("").args(["a", "", "b"]);
        assert_eq!(cmd.args.len(), 2);
    }

    #[test]
    fn test_program_name_strips_directory() {
        let cmd = Cmd::new("/usr/bin/git");
        assert_eq!(cmd.program_name(), "git");
    }

    #[test]
    fn test_filter_rule() {
        let filter = FilterRule::new(&["hint:", "warning:"]);
        assert!(filter.should_skip("hint: Using 'master' as the name"));
        assert!(filter.should_skip("warning: LF will be replaced"));
        assert!(!filter.should_skip("fatal: not a git repository"));
        assert!(filter.should_skip(""));
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(strip_ansi("\x1b[?25lhidden\x1b[K"), "hidden");
        assert_eq!(strip_ansi("Plain text"), "Plain text");
    }

    #[test]
    fn test_run_succeeds() {
        let output = Cmd::new("echo").arg("hello").run().unwrap();
        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("hello"));
    }

    #[test]
    fn test_run_fails_on_nonzero_exit() {
        let err = Cmd::new("false").run().unwrap_err();
        assert!(err.to_string().contains("Command `false` failed"));
    }

    #[test]
    fn test_output_keeps_failure() {
        let output = Cmd::new("false").output().unwrap();
        assert!(!output.status.success());
    }

    #[test]
    fn test_missing_program_is_error() {
        assert!(Cmd::new("definitely-not-a-program-4f1c").output().is_err());
    }

    #[test]
    fn test_pty_merges_output() {
        let output = Cmd::new("sh")
            .args(["-c", "echo out; echo err >&2"])
            .pty(true)
            .run()
            .unwrap();
        let text = String::from_utf8_lossy(&output.stdout);
        assert!(text.contains("out"));
        assert!(text.contains("err"));
        assert!(output.stderr.is_empty());
    }

    #[test]
    fn test_pty_keeps_failure_and_invalid_utf8() {
        let output = Cmd::new("sh")
            .args(["-c", "printf '\\377'; echo \"couldn't find remote ref main\"; exit 3"])
            .pty(true)
            .output()
            .unwrap();
        assert!(!output.status.success());
        assert_eq!(output.status.code(), Some(3));
        assert!(combined_output(&output).contains("couldn't find remote ref main"));

        let err = Cmd::new("sh")
            .args(["-c", "exit 3"])
            .pty(true)
            .run()
            .unwrap_err();
        assert!(err.to_string().contains("Command `sh` failed"));
    }

    #[test]
    fn test_format_error_skips_filtered_lines() {
        let output = Cmd::new("sh")
            .args(["-c", "echo 'hint: noise' >&2; echo 'fatal: boom' >&2; exit 3"])
            .output()
            .unwrap();
        let filter = FilterRule::new(&["hint:"]);
        let msg = format_error("sh", &output, &filter);
        assert!(msg.contains("fatal: boom"));
        assert!(!msg.contains("noise"));
    }
}
