//! Interaction service used by modules and features
//!
//! Everything that talks to the operator goes through [`Prompter`]:
//! questions (free text, yes/no, one-of-many) and progress messages at four
//! severities. The cliclack front end lives in `tui`; this module provides
//! the trait plus two non-terminal implementations:
//!
//! - [`Unattended`] answers every question with its default (`--yes`)
//! - [`ScriptedPrompter`] replays canned answers (tests, dry runs)

mod scripted;
mod unattended;

pub use scripted::{Answer, Level, ScriptedPrompter};
pub use unattended::Unattended;

use anyhow::Result;

/// Operator interaction: questions and console messages
///
/// `input` must return a non-empty string when `required` is true. When the
/// operator enters nothing, `default` (if any) is returned.
pub trait Prompter {
    /// Free-text question
    fn input(&mut self, prompt: &str, default: Option<&str>, required: bool) -> Result<String>;

    /// Yes/no question
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;

    /// Pick one of `choices`; returns the chosen entry
    fn select(&mut self, prompt: &str, choices: &[&str], default: Option<&str>) -> Result<String>;

    /// Module banner
    fn header(&mut self, title: &str) -> Result<()>;

    /// Section heading inside a module
    fn section(&mut self, title: &str) -> Result<()>;

    fn info(&mut self, message: &str) -> Result<()>;
    fn success(&mut self, message: &str) -> Result<()>;
    fn warning(&mut self, message: &str) -> Result<()>;
    fn error(&mut self, message: &str) -> Result<()>;
}

/// Ask for a number, falling back to `default` (with a warning) when the
/// answer does not parse
pub fn prompt_number(ui: &mut dyn Prompter, prompt: &str, default: i64) -> Result<i64> {
    let answer = ui.input(prompt, Some(&default.to_string()), false)?;
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(default);
    }
    match answer.parse() {
        Ok(n) => Ok(n),
        Err(_) => {
            ui.warning(&format!(
                "'{}' is not a valid number, using default {}",
                answer, default
            ))?;
            Ok(default)
        }
    }
}

/// Ask for a decimal number, falling back to `default` (with a warning)
pub fn prompt_float(ui: &mut dyn Prompter, prompt: &str, default: f64) -> Result<f64> {
    let answer = ui.input(prompt, Some(&default.to_string()), false)?;
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(default);
    }
    match answer.parse() {
        Ok(n) => Ok(n),
        Err(_) => {
            ui.warning(&format!(
                "'{}' is not a valid number, using default {}",
                answer, default
            ))?;
            Ok(default)
        }
    }
}

/// Default for a `select` question: the given default if it is one of the
/// choices, else the first choice
pub(crate) fn choice_default(choices: &[&str], default: Option<&str>) -> Option<String> {
    default
        .filter(|d| choices.contains(d))
        .or_else(|| choices.first().copied())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_number_parses_answer() {
        let mut ui = ScriptedPrompter::new([Answer::text("12")]);
        assert_eq!(prompt_number(&mut ui, "Replicas", 1).unwrap(), 12);
    }

    #[test]
    fn test_prompt_number_falls_back_with_warning() {
        let mut ui = ScriptedPrompter::new([Answer::text("many")]);
        assert_eq!(prompt_number(&mut ui, "Replicas", 3).unwrap(), 3);
        assert!(ui.warnings().iter().any(|w| w.contains("'many'")));
    }

    #[test]
    fn test_prompt_float_uses_default_when_unscripted() {
        let mut ui = ScriptedPrompter::default();
        assert_eq!(prompt_float(&mut ui, "Socket timeout", 0.1).unwrap(), 0.1);
    }

    #[test]
    fn test_choice_default() {
        assert_eq!(choice_default(&["a", "b"], Some("b")).as_deref(), Some("b"));
        assert_eq!(choice_default(&["a", "b"], Some("z")).as_deref(), Some("a"));
        assert_eq!(choice_default(&[], None), None);
    }
}
