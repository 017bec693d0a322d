//! Interactive prompts
//!
//! Commands ask questions through the [`Prompter`] trait so the same
//! workflow runs against a terminal or a scripted answer list in tests.

use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password};

/// Source of answers to interactive questions
pub trait Prompter: Send + Sync {
    /// Yes/no question
    fn confirm(&self, prompt: &str, default: bool) -> anyhow::Result<bool>;

    /// Free-text question, optionally pre-filled
    fn input(&self, prompt: &str, default: Option<&str>) -> anyhow::Result<String>;

    /// Hidden input
    fn password(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Prompts on the controlling terminal using dialoguer
#[derive(Default)]
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&self, prompt: &str, default: bool) -> anyhow::Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }

    fn input(&self, prompt: &str, default: Option<&str>) -> anyhow::Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(d) = default {
            input = input.default(d.to_string());
        }
        Ok(input.interact_text()?)
    }

    fn password(&self, prompt: &str) -> anyhow::Result<String> {
        Ok(Password::with_theme(&self.theme)
            .with_prompt(prompt)
            .interact()?)
    }
}
