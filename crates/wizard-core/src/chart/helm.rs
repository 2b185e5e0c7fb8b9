//! Driving the `helm` command line

use super::ChartSource;
use crate::error::WizardError;
use anyhow::{Context, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

/// Timeout for a single helm invocation
pub const HELM_TIMEOUT: Duration = Duration::from_secs(60);

/// Helm installation guide, opened when helm is missing
pub const HELM_INSTALL_DOCS: &str = "https://helm.sh/docs/intro/install/";

/// Thin async wrapper around the helm binary
#[derive(Debug, Clone)]
pub struct HelmCli {
    binary: String,
    timeout: Duration,
}

impl Default for HelmCli {
    fn default() -> Self {
        Self::new()
    }
}

impl HelmCli {
    pub fn new() -> Self {
        Self {
            binary: "helm".to_string(),
            timeout: HELM_TIMEOUT,
        }
    }

    /// Use another binary (path or name)
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            ..Self::new()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check if helm is installed and available in PATH
    pub fn is_installed(&self) -> bool {
        std::process::Command::new("which")
            .arg(&self.binary)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Installed helm version (if available)
    pub async fn version(&self) -> Option<String> {
        self.run(&["version", "--short"]).await.ok().map(|s| s.trim().to_string())
    }

    /// Add (or refresh) the repository alias and update its index
    pub async fn ensure_repo(&self, source: &ChartSource) -> Result<()> {
        self.run(&[
            "repo",
            "add",
            &source.repo_name,
            source.repo_url.as_str(),
            "--force-update",
        ])
        .await
        .with_context(|| format!("Failed to add helm repository {}", source.repo_url))?;
        self.run(&["repo", "update", &source.repo_name])
            .await
            .with_context(|| format!("Failed to update helm repository {}", source.repo_name))?;
        Ok(())
    }

    /// `helm show values <chart_ref> --version <version>`
    pub async fn show_values(&self, chart_ref: &str, version: &str) -> Result<String> {
        self.run(&["show", "values", chart_ref, "--version", version])
            .await
            .with_context(|| format!("Failed to get values of {} {}", chart_ref, version))
    }

    /// `helm pull <chart_ref> --version <version> --untar --untardir <dest>`
    pub async fn pull(&self, chart_ref: &str, version: &str, dest: &Path) -> Result<()> {
        let dest = dest.to_string_lossy();
        self.run(&[
            "pull",
            chart_ref,
            "--version",
            version,
            "--untar",
            "--untardir",
            &dest,
        ])
        .await
        .with_context(|| format!("Failed to pull {} {}", chart_ref, version))?;
        Ok(())
    }

    /// Open the helm installation guide in the default browser
    pub fn open_docs(&self) -> Result<()> {
        open::that(HELM_INSTALL_DOCS)?;
        Ok(())
    }

    /// Run helm with `args` and return its stdout
    async fn run(&self, args: &[&str]) -> Result<String> {
        tracing::debug!(binary = %self.binary, ?args, "running helm");
        let child = TokioCommand::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();
        let child = match child {
            Ok(child) => child,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(WizardError::HelmNotInstalled.into());
            }
            Err(e) => return Err(e).context("Failed to start helm"),
        };

        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output.context("Failed to wait for helm")?,
            Err(_) => anyhow::bail!(
                "helm {} timed out after {} seconds",
                args.join(" "),
                self.timeout.as_secs()
            ),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "helm {} failed with exit code {}: {}",
                args.join(" "),
                output.status.code().unwrap_or(-1),
                stderr.trim()
            );
        }
        String::from_utf8(output.stdout).context("helm printed invalid UTF-8")
    }
}
