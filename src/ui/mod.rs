//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - The [Reporter] that prints pipeline output
//! - This module - The [Prompt] capability and its terminal and scripted implementations

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::error::{ReleaseError, Result};

pub mod formatter;

pub use formatter::Reporter;

/// Line-oriented operator input.
pub trait Prompt {
    /// Show `question` and return the answer without its line ending.
    fn ask(&self, question: &str) -> Result<String>;
}

/// Reads answers from stdin.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask(&self, question: &str) -> Result<String> {
        print!("{}", question);
        io::stdout().flush()?;

        let mut input = String::new();
        let read = io::stdin().lock().read_line(&mut input)?;
        if read == 0 {
            return Err(ReleaseError::invalid_input("input closed before an answer was given"));
        }

        Ok(input.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Replays pre-recorded answers, for tests and non-interactive runs.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    answers: RefCell<VecDeque<String>>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(answers: &[&str]) -> Self {
        ScriptedPrompt {
            answers: RefCell::new(answers.iter().map(|a| a.to_string()).collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    /// Questions shown so far, in order
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }
}

impl Prompt for ScriptedPrompt {
    fn ask(&self, question: &str) -> Result<String> {
        self.asked.borrow_mut().push(question.to_string());
        self.answers.borrow_mut().pop_front().ok_or_else(|| {
            ReleaseError::invalid_input(format!("no scripted answer for '{}'", question.trim()))
        })
    }
}

/// Asks until a non-blank answer is given and returns it trimmed.
pub fn ask_non_empty(prompt: &dyn Prompt, question: &str) -> Result<String> {
    loop {
        let answer = prompt.ask(question)?;
        let answer = answer.trim();
        if !answer.is_empty() {
            return Ok(answer.to_string());
        }
    }
}

/// A `[Y/N]` answer counts as yes only when it is a single "y" or "Y".
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_affirmative() {
        assert!(is_affirmative("Y"));
        assert!(is_affirmative("y"));
        assert!(is_affirmative("y\n"));
        assert!(!is_affirmative("yes"));
        assert!(!is_affirmative("N"));
        assert!(!is_affirmative(""));
    }

    #[test]
    fn test_scripted_prompt_replays_answers() {
        let prompt = ScriptedPrompt::new(&["2.0", "1"]);
        assert_eq!(prompt.ask("Version: ").unwrap(), "2.0");
        assert_eq!(prompt.ask("RC Version: ").unwrap(), "1");
        assert!(prompt.ask("More: ").is_err());
        assert_eq!(prompt.asked(), vec!["Version: ", "RC Version: ", "More: "]);
    }

    #[test]
    fn test_ask_non_empty_repeats_on_blank() {
        let prompt = ScriptedPrompt::new(&["", "   ", " 2.0 "]);
        assert_eq!(ask_non_empty(&prompt, "Version: ").unwrap(), "2.0");
        assert_eq!(prompt.asked().len(), 3);
    }

    #[test]
    fn test_ask_non_empty_fails_when_answers_run_out() {
        let prompt = ScriptedPrompt::new(&[""]);
        assert!(ask_non_empty(&prompt, "Version: ").is_err());
    }
}
