//! Non-interactive prompter: every question takes its default

use super::{choice_default, Prompter};
use crate::error::WizardError;
use anyhow::Result;

/// Wraps another prompter, answering all questions with their defaults and
/// forwarding messages (including a note about each auto-answer)
#[derive(Debug)]
pub struct Unattended<P> {
    inner: P,
}

impl<P: Prompter> Unattended<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> P {
        self.inner
    }

    fn note(&mut self, prompt: &str, answer: &str) -> Result<()> {
        self.inner.info(&format!("{}: {} (--yes)", prompt, answer))
    }
}

impl<P: Prompter> Prompter for Unattended<P> {
    fn input(&mut self, prompt: &str, default: Option<&str>, required: bool) -> Result<String> {
        let answer = default.unwrap_or_default().to_string();
        if required && answer.is_empty() {
            return Err(WizardError::AnswerRequired(prompt.to_string()).into());
        }
        self.note(prompt, &answer)?;
        Ok(answer)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        self.note(prompt, if default { "yes" } else { "no" })?;
        Ok(default)
    }

    fn select(&mut self, prompt: &str, choices: &[&str], default: Option<&str>) -> Result<String> {
        let answer = choice_default(choices, default)
            .ok_or_else(|| WizardError::AnswerRequired(prompt.to_string()))?;
        self.note(prompt, &answer)?;
        Ok(answer)
    }

    fn header(&mut self, title: &str) -> Result<()> {
        self.inner.header(title)
    }

    fn section(&mut self, title: &str) -> Result<()> {
        self.inner.section(title)
    }

    fn info(&mut self, message: &str) -> Result<()> {
        self.inner.info(message)
    }

    fn success(&mut self, message: &str) -> Result<()> {
        self.inner.success(message)
    }

    fn warning(&mut self, message: &str) -> Result<()> {
        self.inner.warning(message)
    }

    fn error(&mut self, message: &str) -> Result<()> {
        self.inner.error(message)
    }
}
