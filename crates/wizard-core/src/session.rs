//! Session handed to module handlers and feature hooks
//!
//! A session bundles the values being edited, the prompter and the secret
//! source. Writes made through it are attributed to whoever is currently
//! running (set by the dispatcher), which is how feature values survive later
//! base-module writes.

use crate::context::{split, ConfigContext, WriteOutcome, Writer};
use crate::interact::{self, Prompter};
use crate::secrets::{self, SecretFn};
use anyhow::Result;
use serde_yaml::Value;

pub struct Session<'a> {
    values: ConfigContext,
    ui: &'a mut dyn Prompter,
    secret: SecretFn,
    writer: Writer,
}

impl<'a> Session<'a> {
    pub fn new(values: ConfigContext, ui: &'a mut dyn Prompter) -> Self {
        Self {
            values,
            ui,
            secret: secrets::generate,
            writer: Writer::Module("setup"),
        }
    }

    /// Replace the secret generator (deterministic secrets in tests)
    pub fn with_secret_source(mut self, secret: SecretFn) -> Self {
        self.secret = secret;
        self
    }

    pub fn values(&self) -> &ConfigContext {
        &self.values
    }

    pub fn into_values(self) -> ConfigContext {
        self.values
    }

    pub fn chart_version(&self) -> &str {
        self.values.chart_version()
    }

    pub fn ui(&mut self) -> &mut dyn Prompter {
        &mut *self.ui
    }

    pub fn writer(&self) -> Writer {
        self.writer
    }

    pub(crate) fn set_writer(&mut self, writer: Writer) {
        self.writer = writer;
    }

    /// Fresh random secret of `length` bytes, base64 encoded
    pub fn secret(&self, length: usize) -> String {
        (self.secret)(length)
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        self.values.get(path)
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.values.get_str(path)
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.values.get_bool(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.values.contains(path)
    }

    /// Write `value` at a dotted path on behalf of the current writer
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<()> {
        self.set_at(&split(path), value)
    }

    /// Write `value` at a segment path (for keys containing dots)
    pub fn set_at(&mut self, segments: &[&str], value: impl Into<Value>) -> Result<()> {
        let outcome = self.values.write(self.writer, segments, value.into());
        self.report(outcome)
    }

    pub fn remove(&mut self, path: &str) -> Result<()> {
        let outcome = self.values.remove_as(self.writer, &split(path));
        self.report(outcome)
    }

    pub fn ensure_mapping(&mut self, path: &str) -> Result<()> {
        let outcome = self.values.ensure_mapping_as(self.writer, &split(path));
        self.report(outcome)
    }

    /// Ask for a string value stored at `path`. The current value (when
    /// non-empty) is offered as default, otherwise `fallback`.
    pub fn input_at(
        &mut self,
        path: &str,
        prompt: &str,
        fallback: Option<&str>,
        required: bool,
    ) -> Result<String> {
        let current = self.values.get_display(path).filter(|v| !v.is_empty());
        let default = current.as_deref().or(fallback);
        let answer = self.ui.input(prompt, default, required)?;
        self.set(path, answer.as_str())?;
        Ok(answer)
    }

    /// Ask for a whole number stored at `path`
    pub fn number_at(&mut self, path: &str, prompt: &str, fallback: i64) -> Result<i64> {
        let default = self.values.get_i64(path).unwrap_or(fallback);
        let answer = interact::prompt_number(&mut *self.ui, prompt, default)?;
        self.set(path, answer)?;
        Ok(answer)
    }

    /// Yes/no stored at `path`; the current boolean is the default
    pub fn confirm_at(&mut self, path: &str, prompt: &str, fallback: bool) -> Result<bool> {
        let default = self.values.get_bool(path).unwrap_or(fallback);
        let answer = self.ui.confirm(prompt, default)?;
        self.set(path, answer)?;
        Ok(answer)
    }

    /// One-of-many stored at `path`; the current value is the default when
    /// it is one of the choices
    pub fn select_at(&mut self, path: &str, prompt: &str, choices: &[&str]) -> Result<String> {
        let current = self.values.get_display(path);
        let answer = self.ui.select(prompt, choices, current.as_deref())?;
        self.set(path, answer.as_str())?;
        Ok(answer)
    }

    /// Like [`Session::select_at`], with `fallback` as default when the
    /// current value is not one of the choices
    pub fn select_or(
        &mut self,
        path: &str,
        prompt: &str,
        choices: &[&str],
        fallback: &str,
    ) -> Result<String> {
        let current = self
            .values
            .get_display(path)
            .filter(|v| choices.contains(&v.as_str()));
        let default = current.as_deref().unwrap_or(fallback);
        let answer = self.ui.select(prompt, choices, Some(default))?;
        self.set(path, answer.as_str())?;
        Ok(answer)
    }

    /// Generate a secret or let the operator type one
    pub fn secret_at(&mut self, path: &str, prompt: &str, length: usize) -> Result<()> {
        if self.ui.confirm(&format!("Generate {}?", prompt), true)? {
            let secret = self.secret(length);
            self.set(path, secret)?;
            self.ui.success(&format!("Generated {}", prompt))
        } else {
            self.input_at(path, prompt, None, true).map(|_| ())
        }
    }

    fn report(&mut self, outcome: WriteOutcome) -> Result<()> {
        if let WriteOutcome::Kept { feature, path } = outcome {
            tracing::warn!(%path, feature, writer = ?self.writer, "write dropped, feature value kept");
            self.ui.warning(&format!(
                "Keeping {} as configured by feature '{}'",
                path, feature
            ))?;
        }
        Ok(())
    }
}
