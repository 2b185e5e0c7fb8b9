//! Chart repository coordinates

use crate::profile::ChartProfile;
use anyhow::{Context, Result};
use url::Url;

/// Where a chart comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSource {
    pub repo_url: Url,
    /// Local helm repository alias
    pub repo_name: String,
    pub chart: String,
}

impl ChartSource {
    pub fn new(repo_url: &str, repo_name: impl Into<String>, chart: impl Into<String>) -> Result<Self> {
        let repo_url =
            Url::parse(repo_url).with_context(|| format!("Invalid repository URL: {}", repo_url))?;
        Ok(Self {
            repo_url,
            repo_name: repo_name.into(),
            chart: chart.into(),
        })
    }

    /// Coordinates from the profile, with optional overrides. The repository
    /// URL comes from the flag, then the profile's environment variable, then
    /// the profile default.
    pub fn from_profile(
        profile: &dyn ChartProfile,
        repo_url: Option<&str>,
        repo_name: Option<&str>,
        chart: Option<&str>,
    ) -> Result<Self> {
        let url = match repo_url {
            Some(url) => url.to_string(),
            None => std::env::var(profile.repo_url_env())
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| profile.repo_url().to_string()),
        };
        Self::new(
            &url,
            repo_name.unwrap_or(profile.repo_name()),
            chart.unwrap_or(profile.chart_name()),
        )
    }

    /// `alias/chart`, as helm commands expect it
    pub fn chart_ref(&self) -> String {
        format!("{}/{}", self.repo_name, self.chart)
    }

    /// URL of the repository's `index.yaml`
    pub fn index_url(&self) -> Result<Url> {
        let mut url = self.repo_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("URL cannot have path segments: {}", self.repo_url))?
            .pop_if_empty()
            .push("index.yaml");
        Ok(url)
    }
}
