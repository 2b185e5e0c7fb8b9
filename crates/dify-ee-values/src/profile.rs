//! Dify Enterprise Edition chart profile

use crate::features;
use crate::modules::{self, GLOBAL, INFRASTRUCTURE, MAIL, NETWORKING, PLUGINS, SERVICES};
use std::path::Path;
use wizard_core::{ChartProfile, FeatureRegistry, ModuleFn, Track};

/// Release tracks, newest first
pub const TRACKS: &[Track] = &[
    Track {
        id: "3.x",
        name: "Dify EE 3.x",
        description: "Plugin runtime, enterprise services and version-gated features",
        modules: &[GLOBAL, INFRASTRUCTURE, NETWORKING, MAIL, PLUGINS, SERVICES],
    },
    Track {
        id: "2.x",
        name: "Dify EE 2.x",
        description: "Legacy charts without the plugin runtime",
        modules: &[GLOBAL, INFRASTRUCTURE, NETWORKING, MAIL, SERVICES],
    },
];

/// Dify Enterprise Edition configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct DifyProfile;

impl ChartProfile for DifyProfile {
    fn name(&self) -> &'static str {
        "dify-ee-values"
    }

    fn display_name(&self) -> &'static str {
        "Dify Enterprise Edition values generator"
    }

    fn chart_name(&self) -> &'static str {
        "dify"
    }

    fn repo_url(&self) -> &'static str {
        "https://langgenius.github.io/dify-helm"
    }

    fn repo_name(&self) -> &'static str {
        "dify-helm"
    }

    fn repo_url_env(&self) -> &'static str {
        "DIFY_HELM_REPO_URL"
    }

    fn tracks(&self) -> &'static [Track] {
        TRACKS
    }

    fn register_features(&self, registry: &mut FeatureRegistry) {
        features::register(registry);
    }

    fn module_handlers(&self) -> Vec<(&'static str, ModuleFn)> {
        modules::handlers()
    }

    fn next_steps(&self, output: &Path, chart_dir: Option<&Path>) -> Vec<String> {
        let chart = match chart_dir {
            Some(dir) => dir.display().to_string(),
            None => format!("{}/{}", self.repo_name(), self.chart_name()),
        };
        vec![
            format!("Review {} before installing", output.display()),
            format!(
                "helm upgrade --install dify {} -f {} --namespace dify --create-namespace",
                chart,
                output.display()
            ),
        ]
    }
}
