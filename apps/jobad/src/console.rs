//! Yes/no questions for the human reviewer.

use std::io::{BufRead, IsTerminal};

use dialoguer::{theme::ColorfulTheme, Input};

use crate::errors::AppError;

/// Source of yes/no answers for the merge engine.
pub trait Prompter {
    fn ask(&mut self, question: &str) -> Result<bool, AppError>;

    /// Called once the session needs no more answers.
    fn close(&mut self) {}
}

/// `y`/`yes` in any case, surrounding whitespace ignored. Anything else is a no.
pub fn parse_answer(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Prints `question` and reads one answer line from `reader`.
/// End of input is an error, never an implicit "no".
pub fn read_answer<R: BufRead>(reader: &mut R, question: &str) -> Result<bool, AppError> {
    println!("{question} (y/N)");
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(AppError::Internal(anyhow::anyhow!(
            "input ended before '{question}' was answered"
        )));
    }
    Ok(parse_answer(&line))
}

/// Reads answers from the terminal, or line by line when stdin is piped.
#[derive(Default)]
pub struct ConsolePrompter {
    closed: bool,
}

impl ConsolePrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Prompter for ConsolePrompter {
    fn ask(&mut self, question: &str) -> Result<bool, AppError> {
        if self.closed {
            return Err(AppError::Internal(anyhow::anyhow!(
                "prompt '{question}' asked after the console was closed"
            )));
        }
        let stdin = std::io::stdin();
        if !stdin.is_terminal() {
            return read_answer(&mut stdin.lock(), question);
        }
        let raw: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("{question} (y/N)"))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| AppError::Internal(e.into()))?;
        Ok(parse_answer(&raw))
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

/// Replays canned answers and records every question asked.
#[cfg(test)]
pub struct ScriptedPrompter {
    answers: std::collections::VecDeque<bool>,
    pub asked: Vec<String>,
    pub closed: bool,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            asked: Vec::new(),
            closed: false,
        }
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn ask(&mut self, question: &str) -> Result<bool, AppError> {
        self.asked.push(question.to_string());
        self.answers.pop_front().ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("no scripted answer for '{question}'"))
        })
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
