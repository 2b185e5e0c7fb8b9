//! Helm repository index (`index.yaml`)

use super::ChartSource;
use crate::version;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use std::time::Duration;

/// Timeout for downloading the repository index
pub const INDEX_TIMEOUT: Duration = Duration::from_secs(10);

/// One published chart release
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ChartEntry {
    pub version: String,
    #[serde(default, rename = "appVersion")]
    pub app_version: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
}

/// The parts of a repository index this tool reads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartIndex {
    #[serde(default)]
    pub entries: IndexMap<String, Vec<ChartEntry>>,
}

impl ChartIndex {
    pub fn parse(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Failed to parse repository index")
    }

    /// Download and parse the index of `source`
    pub async fn fetch(client: &reqwest::Client, source: &ChartSource) -> Result<Self> {
        let url = source.index_url()?;
        let response = client
            .get(url.clone())
            .timeout(INDEX_TIMEOUT)
            .send()
            .await
            .with_context(|| format!("Failed to fetch repository index from {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to fetch repository index from {}: HTTP {}",
                url,
                response.status()
            );
        }

        let content = response.text().await?;
        Self::parse(&content)
    }

    /// Every version of `chart`, newest first, without duplicates
    pub fn versions(&self, chart: &str) -> Vec<String> {
        let mut versions: Vec<String> = self
            .entries
            .get(chart)
            .map(|entries| {
                entries
                    .iter()
                    .map(|e| e.version.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        versions.sort_by(|a, b| version::compare(b, a).then_with(|| a.cmp(b)));
        versions.dedup();
        versions
    }

    /// Stable semver releases of `chart` (no pre-release), newest first
    pub fn published_versions(&self, chart: &str) -> Vec<String> {
        self.versions(chart)
            .into_iter()
            .filter(|v| {
                semver::Version::parse(v.strip_prefix('v').unwrap_or(v))
                    .map(|parsed| parsed.pre.is_empty())
                    .unwrap_or(false)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = "\
apiVersion: v1
entries:
  dify:
  - version: 3.6.0
    appVersion: 1.9.0
  - version: 3.7.0-beta.1
  - version: 3.7.2
  - version: 3.6.0-rc.1
  - version: 2.8.1
    deprecated: true
  - version: 3.7.2
  other:
  - version: 9.9.9
generated: \"2025-01-01T00:00:00Z\"
";

    #[test]
    fn test_versions_sorted_newest_first() {
        let index = ChartIndex::parse(INDEX).unwrap();
        assert_eq!(
            index.versions("dify"),
            ["3.7.2", "3.7.0-beta.1", "3.6.0", "3.6.0-rc.1", "2.8.1"]
        );
    }

    #[test]
    fn test_published_versions_drop_prereleases() {
        let index = ChartIndex::parse(INDEX).unwrap();
        assert_eq!(index.published_versions("dify"), ["3.7.2", "3.6.0", "2.8.1"]);
    }

    #[test]
    fn test_unknown_chart() {
        let index = ChartIndex::parse(INDEX).unwrap();
        assert!(index.versions("missing").is_empty());
        assert!(ChartIndex::parse("apiVersion: v1\n").unwrap().entries.is_empty());
    }

    #[test]
    fn test_entry_fields() {
        let index = ChartIndex::parse(INDEX).unwrap();
        let first = &index.entries["dify"][0];
        assert_eq!(first.app_version.as_deref(), Some("1.9.0"));
        assert!(index.entries["dify"][4].deprecated);
    }
}
