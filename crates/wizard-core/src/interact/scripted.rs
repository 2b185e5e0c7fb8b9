//! Prompter that replays canned answers

use super::{choice_default, Prompter};
use crate::error::WizardError;
use anyhow::Result;
use std::collections::VecDeque;

/// One scripted answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text(String),
    Confirm(bool),
    Choice(String),
    /// Take whatever default the question offers
    Default,
    /// Behave as if the operator pressed Ctrl-C
    Interrupt,
}

impl Answer {
    pub fn text(value: impl Into<String>) -> Self {
        Answer::Text(value.into())
    }

    pub fn choice(value: impl Into<String>) -> Self {
        Answer::Choice(value.into())
    }

    pub fn yes() -> Self {
        Answer::Confirm(true)
    }

    pub fn no() -> Self {
        Answer::Confirm(false)
    }
}

/// Message severity recorded by [`ScriptedPrompter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Header,
    Section,
    Info,
    Success,
    Warning,
    Error,
}

/// Replays answers in order; once the script runs out every question takes
/// its default. Every prompt and message is recorded for inspection.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    prompts: Vec<String>,
    messages: Vec<(Level, String)>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Queue more answers after the current ones
    pub fn push(&mut self, answer: Answer) {
        self.answers.push_back(answer);
    }

    /// Questions asked so far, in order
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    /// Whether any question contained `needle`
    pub fn asked(&self, needle: &str) -> bool {
        self.prompts.iter().any(|p| p.contains(needle))
    }

    /// Answers that were never consumed
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    pub fn messages(&self) -> &[(Level, String)] {
        &self.messages
    }

    pub fn warnings(&self) -> Vec<&str> {
        self.messages_at(Level::Warning)
    }

    pub fn messages_at(&self, level: Level) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.as_str())
            .collect()
    }

    fn next(&mut self, prompt: &str) -> Answer {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().unwrap_or(Answer::Default)
    }

    fn record(&mut self, level: Level, message: &str) -> Result<()> {
        self.messages.push((level, message.to_string()));
        Ok(())
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&mut self, prompt: &str, default: Option<&str>, required: bool) -> Result<String> {
        let typed = match self.next(prompt) {
            Answer::Text(text) => text,
            Answer::Default => String::new(),
            Answer::Interrupt => return Err(WizardError::Interrupted.into()),
            other => anyhow::bail!("scripted answer {:?} does not fit text prompt '{}'", other, prompt),
        };
        let typed = typed.trim().to_string();
        if !typed.is_empty() {
            return Ok(typed);
        }
        match default.filter(|d| !d.is_empty()) {
            Some(default) => Ok(default.to_string()),
            None if required => Err(WizardError::AnswerRequired(prompt.to_string()).into()),
            None => Ok(String::new()),
        }
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        match self.next(prompt) {
            Answer::Confirm(value) => Ok(value),
            Answer::Default => Ok(default),
            Answer::Interrupt => Err(WizardError::Interrupted.into()),
            other => anyhow::bail!("scripted answer {:?} does not fit yes/no prompt '{}'", other, prompt),
        }
    }

    fn select(&mut self, prompt: &str, choices: &[&str], default: Option<&str>) -> Result<String> {
        match self.next(prompt) {
            Answer::Choice(choice) => {
                if !choices.contains(&choice.as_str()) {
                    anyhow::bail!(
                        "scripted choice '{}' is not one of [{}] for '{}'",
                        choice,
                        choices.join(", "),
                        prompt
                    );
                }
                Ok(choice)
            }
            Answer::Default => choice_default(choices, default)
                .ok_or_else(|| WizardError::AnswerRequired(prompt.to_string()).into()),
            Answer::Interrupt => Err(WizardError::Interrupted.into()),
            other => anyhow::bail!("scripted answer {:?} does not fit choice prompt '{}'", other, prompt),
        }
    }

    fn header(&mut self, title: &str) -> Result<()> {
        self.record(Level::Header, title)
    }

    fn section(&mut self, title: &str) -> Result<()> {
        self.record(Level::Section, title)
    }

    fn info(&mut self, message: &str) -> Result<()> {
        self.record(Level::Info, message)
    }

    fn success(&mut self, message: &str) -> Result<()> {
        self.record(Level::Success, message)
    }

    fn warning(&mut self, message: &str) -> Result<()> {
        self.record(Level::Warning, message)
    }

    fn error(&mut self, message: &str) -> Result<()> {
        self.record(Level::Error, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answers_are_replayed_in_order() {
        let mut ui = ScriptedPrompter::new([
            Answer::text("db.internal"),
            Answer::no(),
            Answer::choice("smtp"),
        ]);
        assert_eq!(ui.input("Host", Some("localhost"), true).unwrap(), "db.internal");
        assert!(!ui.confirm("TLS?", true).unwrap());
        assert_eq!(ui.select("Mail", &["", "resend", "smtp"], Some("")).unwrap(), "smtp");
        assert_eq!(ui.prompts(), ["Host", "TLS?", "Mail"]);
        assert_eq!(ui.remaining(), 0);
    }

    #[test]
    fn test_exhausted_script_takes_defaults() {
        let mut ui = ScriptedPrompter::default();
        assert_eq!(ui.input("Port", Some("5432"), false).unwrap(), "5432");
        assert!(ui.confirm("Enable?", true).unwrap());
        assert_eq!(ui.select("Type", &["a", "b"], Some("b")).unwrap(), "b");
        assert_eq!(ui.input("Optional", None, false).unwrap(), "");
    }

    #[test]
    fn test_required_without_default_fails() {
        let mut ui = ScriptedPrompter::default();
        let err = ui.input("Password", None, true).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WizardError>(),
            Some(WizardError::AnswerRequired(p)) if p == "Password"
        ));
    }

    #[test]
    fn test_mismatched_answer_is_an_error() {
        let mut ui = ScriptedPrompter::new([Answer::yes()]);
        assert!(ui.input("Host", None, false).is_err());

        let mut ui = ScriptedPrompter::new([Answer::choice("nope")]);
        assert!(ui.select("Type", &["a", "b"], None).is_err());
    }

    #[test]
    fn test_interrupt_answer() {
        let mut ui = ScriptedPrompter::new([Answer::Interrupt, Answer::Interrupt, Answer::Interrupt]);
        assert!(crate::error::is_interrupted(&ui.input("Host", Some("x"), false).unwrap_err()));
        assert!(crate::error::is_interrupted(&ui.confirm("TLS?", true).unwrap_err()));
        assert!(crate::error::is_interrupted(&ui.select("Type", &["a"], None).unwrap_err()));
        assert_eq!(ui.prompts().len(), 3);
    }

    #[test]
    fn test_messages_are_recorded() {
        let mut ui = ScriptedPrompter::default();
        ui.header("Mail").unwrap();
        ui.warning("careful").unwrap();
        ui.success("done").unwrap();
        assert_eq!(ui.warnings(), ["careful"]);
        assert_eq!(ui.messages_at(Level::Header), ["Mail"]);
        assert_eq!(ui.messages().len(), 3);
    }
}
