//! Operator confirmation prompts
//!
//! Business logic asks yes/no questions through [`ConfirmationPort`]; the
//! CLI answers them on the terminal, tests answer them from a script.

use crate::error::Result;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Capability for yes/no operator prompts
pub trait ConfirmationPort: Send + Sync {
    /// Ask `question`; `default` is the answer when the operator just hits enter
    fn confirm(&self, question: &str, default: bool) -> Result<bool>;
}

/// Answers every question with yes (forced/unattended mode)
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl ConfirmationPort for AssumeYes {
    fn confirm(&self, _question: &str, _default: bool) -> Result<bool> {
        Ok(true)
    }
}

/// Answers every question with the stated default
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptDefaults;

impl ConfirmationPort for AcceptDefaults {
    fn confirm(&self, _question: &str, default: bool) -> Result<bool> {
        Ok(default)
    }
}

/// Replays a fixed list of answers, then falls back to a constant
///
/// Records every question asked.
#[derive(Debug)]
pub struct ScriptedAnswers {
    answers: Mutex<VecDeque<bool>>,
    fallback: bool,
    asked: Mutex<Vec<String>>,
}

impl ScriptedAnswers {
    /// Answer with `answers` in order, then `fallback`
    pub fn new(answers: impl IntoIterator<Item = bool>, fallback: bool) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            fallback,
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Always answer `answer`
    pub fn always(answer: bool) -> Self {
        Self::new([], answer)
    }

    /// Questions asked so far
    pub fn questions(&self) -> Vec<String> {
        self.asked
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }
}

impl ConfirmationPort for ScriptedAnswers {
    fn confirm(&self, question: &str, _default: bool) -> Result<bool> {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(question.to_string());
        }
        let next = self
            .answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front());
        Ok(next.unwrap_or(self.fallback))
    }
}
