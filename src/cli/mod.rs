//! Command-line interface module.

mod args;
pub mod prompt;

pub use args::Cli;
pub use prompt::{Prompt, StdinPrompt};
