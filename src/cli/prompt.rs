//! Interactive input.
//!
//! The workflow asks questions through the [`Prompt`] trait so it can be
//! driven by a terminal in production and by canned answers in tests.

use anyhow::{Context, Result};
use std::io::{self, Write};

/// Source of answers to interactive questions.
pub trait Prompt {
    /// Ask `question` and return the trimmed answer (may be empty).
    fn ask(&mut self, question: &str) -> Result<String>;
}

/// Prompt on stderr, read the answer from stdin.
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, question: &str) -> Result<String> {
        eprint!("{question} ");
        io::stderr().flush()?;

        let mut input = String::new();
        io::stdin()
            .read_line(&mut input)
            .context("Failed to read answer from stdin")?;

        Ok(input.trim().to_string())
    }
}

/// Fixed answers handed out in order; asking past the end is an error.
#[cfg(test)]
pub struct ScriptedPrompt {
    answers: std::collections::VecDeque<String>,
    pub asked: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompt {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Prompt for ScriptedPrompt {
    fn ask(&mut self, question: &str) -> Result<String> {
        self.asked.push(question.to_string());
        self.answers
            .pop_front()
            .map(|a| a.trim().to_string())
            .ok_or_else(|| anyhow::anyhow!("unexpected prompt: {question}"))
    }
}
