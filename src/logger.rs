//! Logging utilities with colored output.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro for output shown only with `--verbose`
//! - `log_block` for relaying multi-line tool output (e.g. `git status`)
//!
//! # Example
//!
//! ```ignore
//! log!("remote"; "origin -> {}", url);
//! debug!("git"; "{}", version);
//! ```

use crossterm::{
    execute,
    terminal::{Clear, ClearType},
};
use owo_colors::{OwoColorize, Stream::Stdout};
use std::{
    io::{Write, stdout},
    sync::atomic::{AtomicBool, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Log every non-empty line of `text` under one prefix, indented below it.
///
/// Used for relaying output of tools like `git status` that is meant to be
/// read as a block.
pub fn log_block(module: &str, text: &str) {
    let lines: Vec<_> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return;
    }

    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    let mut stdout = stdout().lock();
    writeln!(stdout, "{prefix}").ok();
    for line in lines {
        writeln!(stdout, "  {line}").ok();
    }
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
///
/// Goes through `if_supports_color` so `--color` overrides take effect.
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    let styled = |f: fn(&String) -> String| prefix.if_supports_color(Stdout, f).to_string();
    match module_lower {
        "push" | "done" => styled(|p| p.bright_green().bold().to_string()),
        "git" | "status" => styled(|p| p.bright_blue().bold().to_string()),
        "error" => styled(|p| p.bright_red().bold().to_string()),
        "warn" | "warning" => styled(|p| p.bright_magenta().bold().to_string()),
        "hint" => styled(|p| p.bright_cyan().bold().to_string()),
        _ => styled(|p| p.bright_yellow().bold().to_string()),
    }
}

// ============================================================================
// Tests
// ============================================================================
