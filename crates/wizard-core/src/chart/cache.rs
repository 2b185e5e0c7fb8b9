//! On-disk cache of downloaded values files (`values-<version>.yaml`)

use crate::error::WizardError;
use crate::version;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const PREFIX: &str = "values-";
const SUFFIX: &str = ".yaml";

#[derive(Debug, Clone)]
pub struct ValuesCache {
    dir: PathBuf,
}

impl ValuesCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cache file for `version` (whether or not it exists). The version
    /// becomes part of a file name, so separators and `..` are rejected.
    pub fn path_for(&self, version: &str) -> Result<PathBuf> {
        if !is_file_name_safe(version) {
            return Err(WizardError::InvalidChartVersion(version.to_string()).into());
        }
        Ok(self.dir.join(format!("{}{}{}", PREFIX, version, SUFFIX)))
    }

    /// Cached values file for `version`, if present
    pub fn lookup(&self, version: &str) -> Result<Option<PathBuf>> {
        let path = self.path_for(version)?;
        Ok(path.is_file().then_some(path))
    }

    /// Write values text for `version`, creating the cache directory
    pub fn store(&self, version: &str, text: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create cache directory {}", self.dir.display()))?;
        let path = self.path_for(version)?;
        fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), "values cached");
        Ok(path)
    }

    /// Newest chart version that has a cached values file
    pub fn detect_version(&self) -> Option<String> {
        let entries = fs::read_dir(&self.dir).ok()?;
        entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| version_from_file_name(&entry.file_name().to_string_lossy()))
            .max_by(|a, b| version::compare(a, b))
    }
}

fn is_file_name_safe(version: &str) -> bool {
    !version.is_empty()
        && !version.contains("..")
        && !version.chars().any(|c| c == '/' || c == '\\' || c.is_control())
}

/// `values-3.7.2.yaml` -> `3.7.2`; `values-3.6.0-beta.1.yaml` -> `3.6.0-beta.1`.
/// The version must start with a digit and only use digits and dots before an
/// optional `-` suffix of alphanumerics and dots.
pub fn version_from_file_name(name: &str) -> Option<String> {
    let version = name.strip_prefix(PREFIX)?.strip_suffix(SUFFIX)?;
    let (core, pre) = match version.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (version, None),
    };
    let core_ok = core.starts_with(|c: char| c.is_ascii_digit())
        && core.chars().all(|c| c.is_ascii_digit() || c == '.');
    let pre_ok = pre.map_or(true, |p| {
        !p.is_empty() && p.chars().all(|c| c.is_ascii_alphanumeric() || c == '.')
    });
    (core_ok && pre_ok).then(|| version.to_string())
}
