//! Values template loading and saving
//!
//! The template text is kept next to its parsed tree. Saving patches the
//! text with the difference between the template tree and the final values,
//! so comments, blank lines and quote styles of untouched lines survive.

mod outline;
mod patch;

use crate::context::ConfigContext;
use crate::error::WizardError;
use anyhow::{Context, Result};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// A values file as loaded from disk
#[derive(Debug, Clone)]
pub struct ValuesTemplate {
    text: String,
    tree: Value,
}

/// Rendered output of a save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    /// False when the document had to be re-serialized and comments were lost
    pub preserved: bool,
}

impl ValuesTemplate {
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let tree: Value = if text.trim().is_empty() {
            Value::Mapping(Mapping::new())
        } else {
            serde_yaml::from_str(&text).context("Failed to parse values template")?
        };
        Ok(Self { text, tree })
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(WizardError::TemplateNotFound(path.to_path_buf()).into());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(text).with_context(|| format!("Invalid YAML in {}", path.display()))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tree(&self) -> &Value {
        &self.tree
    }

    /// Fresh configuration context seeded with the template values
    pub fn context(&self, chart_version: impl Into<String>) -> ConfigContext {
        ConfigContext::new(self.tree.clone(), chart_version)
    }

    /// Render `values` as a patched copy of the template text
    pub fn render(&self, values: &Value) -> Result<Rendered> {
        if *values == self.tree {
            return Ok(Rendered {
                text: self.text.clone(),
                preserved: true,
            });
        }

        let trailing_newline = self.text.ends_with('\n') || self.text.is_empty();
        let patched = outline::parse(&self.text)
            .and_then(|outline| patch::patch(&outline, &self.tree, values, trailing_newline));

        if let Some(text) = patched {
            // the patched text must read back as exactly the final values
            match serde_yaml::from_str::<Value>(&text) {
                Ok(reparsed) if reparsed == *values => {
                    return Ok(Rendered {
                        text,
                        preserved: true,
                    })
                }
                _ => tracing::warn!("patched values did not round-trip, re-serializing"),
            }
        } else {
            tracing::warn!("values template layout not patchable, re-serializing");
        }

        let text = serde_yaml::to_string(values).context("Failed to serialize values")?;
        Ok(Rendered {
            text,
            preserved: false,
        })
    }

    /// Render and write `values` to `path`
    pub fn save(&self, values: &Value, path: &Path) -> Result<Rendered> {
        let rendered = self.render(values)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, &rendered.text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), preserved = rendered.preserved, "values written");
        Ok(rendered)
    }
}

/// `values-prd.yaml` -> `values-prd-partial.yaml`
pub fn partial_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "values".to_string());
    let name = match output.extension() {
        Some(ext) => format!("{}-partial.{}", stem, ext.to_string_lossy()),
        None => format!("{}-partial", stem),
    };
    output.with_file_name(name)
}
