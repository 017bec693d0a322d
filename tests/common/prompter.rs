//! Scripted answers for interactive prompts.

use std::collections::VecDeque;
use std::sync::Mutex;

use bbcli::cli::Prompter;

/// One queued answer
#[derive(Debug, Clone)]
pub enum Answer {
    Yes,
    No,
    Text(String),
}

/// Replays answers in order and records every question asked.
///
/// Panics when a question arrives with no answer left, so a test fails
/// loudly if a workflow prompts more than expected.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// No answers: any prompt panics.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }

    fn next(&self, prompt: &str) -> Answer {
        self.asked.lock().unwrap().push(prompt.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected prompt: {}", prompt))
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, prompt: &str, _default: bool) -> anyhow::Result<bool> {
        match self.next(prompt) {
            Answer::Yes => Ok(true),
            Answer::No => Ok(false),
            Answer::Text(t) => panic!("expected yes/no for '{}', scripted '{}'", prompt, t),
        }
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> anyhow::Result<String> {
        match self.next(prompt) {
            Answer::Text(t) if t.is_empty() => Ok(default.unwrap_or_default().to_string()),
            Answer::Text(t) => Ok(t),
            other => panic!("expected text for '{}', scripted {:?}", prompt, other),
        }
    }

    fn password(&self, prompt: &str) -> anyhow::Result<String> {
        self.input(prompt, None)
    }
}
