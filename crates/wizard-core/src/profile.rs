//! Chart profile trait for wizard binaries
//!
//! A profile describes one Helm chart product: its identity, where the chart
//! lives, where files go, which release tracks exist, and the module handlers
//! and features that make up the questionnaire.

use crate::dispatch::ModuleFn;
use crate::features::FeatureRegistry;
use crate::tracks::Track;
use std::path::Path;

pub trait ChartProfile {
    /// Internal product name (used for the CLI command and user agent)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Chart name inside the repository
    fn chart_name(&self) -> &'static str;

    /// Default chart repository URL
    fn repo_url(&self) -> &'static str;

    /// Local helm alias for the repository
    fn repo_name(&self) -> &'static str;

    /// Environment variable overriding the repository URL
    fn repo_url_env(&self) -> &'static str;

    /// Directory holding cached values files
    fn cache_dir(&self) -> &'static str {
        ".cache"
    }

    /// Values file used when working from a local copy
    fn local_values_file(&self) -> &'static str {
        "values.yaml"
    }

    /// Default output file
    fn output_file(&self) -> &'static str {
        "values-prd.yaml"
    }

    /// Release tracks, newest first
    fn tracks(&self) -> &'static [Track];

    /// Register every version-gated feature, in application order
    fn register_features(&self, registry: &mut FeatureRegistry);

    /// Base handler of each module
    fn module_handlers(&self) -> Vec<(&'static str, ModuleFn)>;

    /// Instructions printed after the values file is written
    fn next_steps(&self, output: &Path, chart_dir: Option<&Path>) -> Vec<String>;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }
}
