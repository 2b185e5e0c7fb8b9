//! Chart acquisition: finding the values template and the chart version
//!
//! Values come from a local `values.yaml`, the on-disk cache, or
//! `helm show values`; versions come from the command line, the cache, or
//! the repository index.

mod cache;
mod helm;
mod index;
mod source;

pub use cache::{version_from_file_name, ValuesCache};
pub use helm::{HelmCli, HELM_INSTALL_DOCS, HELM_TIMEOUT};
pub use index::{ChartEntry, ChartIndex, INDEX_TIMEOUT};
pub use source::ChartSource;

use crate::error::WizardError;
use crate::interact::Prompter;
use crate::profile::ChartProfile;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const PUBLISHED: &str = "Published versions";
const ALL: &str = "All versions (including pre-releases)";
const USE_EXISTING: &str = "Use existing directory";
const OVERWRITE: &str = "Overwrite";

/// Where the values template was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValuesOrigin {
    Local,
    Cache,
    Download,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedValues {
    pub path: PathBuf,
    /// Chart version, when it could be determined
    pub chart_version: Option<String>,
    pub origin: ValuesOrigin,
}

/// What the operator asked for on the command line
#[derive(Debug, Clone, Default)]
pub struct ValuesRequest<'a> {
    pub chart_version: Option<&'a str>,
    pub local: bool,
    pub force_download: bool,
}

/// Locates values templates and charts for one chart source
pub struct ChartFetcher {
    source: ChartSource,
    cache: ValuesCache,
    helm: HelmCli,
    client: reqwest::Client,
    workdir: PathBuf,
    local_values: PathBuf,
}

impl ChartFetcher {
    pub fn new(profile: &dyn ChartProfile, source: ChartSource, workdir: &Path) -> Self {
        Self {
            source,
            cache: ValuesCache::new(workdir.join(profile.cache_dir())),
            helm: HelmCli::new(),
            client: reqwest::Client::builder()
                .user_agent(profile.user_agent())
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            workdir: workdir.to_path_buf(),
            local_values: workdir.join(profile.local_values_file()),
        }
    }

    pub fn with_helm(mut self, helm: HelmCli) -> Self {
        self.helm = helm;
        self
    }

    pub fn source(&self) -> &ChartSource {
        &self.source
    }

    pub fn cache(&self) -> &ValuesCache {
        &self.cache
    }

    /// Find the values template and chart version for this run
    pub async fn resolve_values(
        &self,
        ui: &mut dyn Prompter,
        request: &ValuesRequest<'_>,
    ) -> Result<ResolvedValues> {
        if request.local {
            if !self.local_values.is_file() {
                ui.error(&format!("File not found: {}", self.local_values.display()))?;
                ui.info("Place the chart's values.yaml in the working directory or drop --local")?;
                return Err(WizardError::TemplateNotFound(self.local_values.clone()).into());
            }
            ui.info(&format!("Using local values file: {}", self.local_values.display()))?;
            let chart_version = match request.chart_version {
                Some(version) => version.to_string(),
                None => {
                    let detected = self
                        .cache
                        .detect_version()
                        .ok_or(WizardError::ChartVersionRequired)?;
                    ui.info(&format!("Chart version detected from cache: {}", detected))?;
                    detected
                }
            };
            return Ok(ResolvedValues {
                path: self.local_values.clone(),
                chart_version: Some(chart_version),
                origin: ValuesOrigin::Local,
            });
        }

        if self.local_values.is_file() && !request.force_download {
            ui.info(&format!("Using local values file: {}", self.local_values.display()))?;
            let chart_version = request
                .chart_version
                .map(str::to_string)
                .or_else(|| self.cache.detect_version());
            return Ok(ResolvedValues {
                path: self.local_values.clone(),
                chart_version,
                origin: ValuesOrigin::Local,
            });
        }

        let version = match request.chart_version {
            Some(version) => version.to_string(),
            None => self
                .pick_version(ui)
                .await?
                .ok_or(WizardError::ChartVersionRequired)?,
        };

        if !request.force_download {
            if let Some(path) = self.cache.lookup(&version)? {
                ui.info(&format!("Using cached values: {}", path.display()))?;
                return Ok(ResolvedValues {
                    path,
                    chart_version: Some(version),
                    origin: ValuesOrigin::Cache,
                });
            }
        }

        let path = self.download_values(ui, &version).await?;
        Ok(ResolvedValues {
            path,
            chart_version: Some(version),
            origin: ValuesOrigin::Download,
        })
    }

    /// Let the operator pick a chart version from the repository index
    pub async fn pick_version(&self, ui: &mut dyn Prompter) -> Result<Option<String>> {
        let scope = ui.select("Which versions should be listed?", &[PUBLISHED, ALL], Some(PUBLISHED))?;
        ui.info(&format!("Fetching versions from {}", self.source.repo_url))?;

        let versions = match ChartIndex::fetch(&self.client, &self.source).await {
            Ok(index) if scope == PUBLISHED => index.published_versions(&self.source.chart),
            Ok(index) => index.versions(&self.source.chart),
            Err(e) => {
                tracing::warn!(error = %e, "repository index unavailable");
                ui.warning(&format!("Failed to fetch versions: {:#}", e))?;
                Vec::new()
            }
        };

        let Some(latest) = versions.first() else {
            ui.warning("No chart versions found")?;
            return Ok(None);
        };
        ui.info(&format!("Latest version: {}", latest))?;
        let choices: Vec<&str> = versions.iter().map(String::as_str).collect();
        let picked = ui.select("Chart version", &choices, Some(latest.as_str()))?;
        Ok(Some(picked))
    }

    /// Download values for `version` with helm and store them in the cache
    pub async fn download_values(&self, ui: &mut dyn Prompter, version: &str) -> Result<PathBuf> {
        self.require_helm(ui)?;
        ui.info(&format!(
            "Downloading values for {} {} from {}",
            self.source.chart, version, self.source.repo_url
        ))?;
        self.helm.ensure_repo(&self.source).await?;
        let values = self.helm.show_values(&self.source.chart_ref(), version).await?;
        let path = self.cache.store(version, &values)?;
        ui.success(&format!("Saved to {}", path.display()))?;
        Ok(path)
    }

    /// Pull the chart and extract it to `<chart>-<version>/` in the working
    /// directory; an existing directory is reused or overwritten on request
    pub async fn extract_chart(&self, ui: &mut dyn Prompter, version: &str) -> Result<PathBuf> {
        let target = self
            .workdir
            .join(format!("{}-{}", self.source.chart, version));
        if target.is_dir() {
            ui.warning(&format!("Chart directory already exists: {}", target.display()))?;
            let choice = ui.select(
                "What should happen to the existing chart directory?",
                &[USE_EXISTING, OVERWRITE],
                Some(USE_EXISTING),
            )?;
            if choice == USE_EXISTING {
                return Ok(target);
            }
        }

        self.require_helm(ui)?;
        ui.info(&format!("Downloading chart {} {}", self.source.chart_ref(), version))?;
        let staging = tempfile::TempDir::new_in(&self.workdir)
            .context("Failed to create a staging directory")?;
        self.helm
            .pull(&self.source.chart_ref(), version, staging.path())
            .await?;

        let extracted = find_extracted(staging.path(), &self.source.chart, version)?;
        if target.exists() {
            fs::remove_dir_all(&target)
                .with_context(|| format!("Failed to remove {}", target.display()))?;
        }
        fs::rename(&extracted, &target)
            .with_context(|| format!("Failed to move chart to {}", target.display()))?;
        ui.success(&format!("Chart extracted to {}", target.display()))?;
        Ok(target)
    }

    fn require_helm(&self, ui: &mut dyn Prompter) -> Result<()> {
        if self.helm.is_installed() {
            return Ok(());
        }
        ui.error("helm is not installed or not on PATH")?;
        ui.info("macOS: brew install helm")?;
        ui.info("Linux: curl https://raw.githubusercontent.com/helm/helm/main/scripts/get-helm-3 | bash")?;
        ui.info("Windows: choco install kubernetes-helm")?;
        ui.info("Or download values.yaml manually and run with --local")?;
        if ui.confirm("Open the Helm installation guide in your browser?", false)? {
            if let Err(e) = self.helm.open_docs() {
                ui.warning(&format!("Could not open a browser: {}", e))?;
            }
        }
        Err(WizardError::HelmNotInstalled.into())
    }
}

/// Directory `helm pull --untar` produced inside `staging`
fn find_extracted(staging: &Path, chart: &str, version: &str) -> Result<PathBuf> {
    for name in [chart.to_string(), format!("{}-{}", chart, version)] {
        let candidate = staging.join(name);
        if candidate.is_dir() {
            return Ok(candidate);
        }
    }
    fs::read_dir(staging)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .find(|path| path.is_dir())
        .with_context(|| format!("No extracted chart found in {}", staging.display()))
}
