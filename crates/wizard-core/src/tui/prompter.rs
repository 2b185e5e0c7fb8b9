//! Charm-style prompts using cliclack

use crate::error::WizardError;
use crate::interact::Prompter;
use anyhow::Result;
use colored::Colorize;
use std::io;

/// Terminal prompter backed by cliclack
#[derive(Debug, Default, Clone, Copy)]
pub struct ClackPrompter;

/// Ctrl-C / Esc inside a prompt surfaces as `io::ErrorKind::Interrupted`
fn classify(err: io::Error) -> anyhow::Error {
    if err.kind() == io::ErrorKind::Interrupted {
        WizardError::Interrupted.into()
    } else {
        err.into()
    }
}

impl Prompter for ClackPrompter {
    fn input(&mut self, prompt: &str, default: Option<&str>, required: bool) -> Result<String> {
        let default = default.filter(|d| !d.is_empty());
        let mut input = cliclack::input(prompt);
        match default {
            Some(default) => {
                input = input.placeholder(default).default_input(default);
            }
            None => {
                input = input.required(required);
            }
        }
        let answer: String = input.interact().map_err(classify)?;
        let answer = answer.trim().to_string();
        if answer.is_empty() {
            if let Some(default) = default {
                return Ok(default.to_string());
            }
            if required {
                return Err(WizardError::AnswerRequired(prompt.to_string()).into());
            }
        }
        Ok(answer)
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        cliclack::confirm(prompt)
            .initial_value(default)
            .interact()
            .map_err(classify)
    }

    fn select(&mut self, prompt: &str, choices: &[&str], default: Option<&str>) -> Result<String> {
        if choices.is_empty() {
            return Err(WizardError::AnswerRequired(prompt.to_string()).into());
        }
        let mut select = cliclack::select(prompt);
        for &choice in choices {
            let label = if choice.is_empty() { "(none)" } else { choice };
            select = select.item(choice.to_string(), label, "");
        }
        if let Some(default) = default.filter(|d| choices.contains(d)) {
            select = select.initial_value(default.to_string());
        }
        select.interact().map_err(classify)
    }

    fn header(&mut self, title: &str) -> Result<()> {
        cliclack::log::step(title.bold().to_string())?;
        Ok(())
    }

    fn section(&mut self, title: &str) -> Result<()> {
        cliclack::log::remark(title.cyan().to_string())?;
        Ok(())
    }

    fn info(&mut self, message: &str) -> Result<()> {
        cliclack::log::info(message)?;
        Ok(())
    }

    fn success(&mut self, message: &str) -> Result<()> {
        cliclack::log::success(message)?;
        Ok(())
    }

    fn warning(&mut self, message: &str) -> Result<()> {
        cliclack::log::warning(message)?;
        Ok(())
    }

    fn error(&mut self, message: &str) -> Result<()> {
        cliclack::log::error(message)?;
        Ok(())
    }
}
