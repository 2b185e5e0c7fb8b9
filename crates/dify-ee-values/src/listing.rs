//! Plain-text listings of tracks and version features

use colored::Colorize;
use wizard_core::{FeatureRegistry, Track};

/// Registration matrix, or only what applies to `chart_version`
pub fn features(registry: &FeatureRegistry, chart_version: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();
    match chart_version {
        Some(version) => {
            let applicable = registry.all_applicable(version);
            if applicable.is_empty() {
                lines.push(format!("No version features apply to chart {}", version));
                return lines;
            }
            lines.push(format!("Features applied for chart {}:", version.bold()));
            for (module, features) in applicable {
                lines.push(format!("  {}", module.cyan()));
                for feature in features {
                    lines.push(format!("    {} - {}", feature.id.green(), feature.description));
                }
            }
        }
        None => {
            lines.push("Registered version features:".bold().to_string());
            for row in registry.matrix() {
                lines.push(format!(
                    "  {:<16} {:<22} {:<12} {}",
                    row.module.cyan(),
                    row.feature.green(),
                    row.range,
                    row.description
                ));
            }
        }
    }
    lines
}

pub fn tracks(tracks: &[Track]) -> Vec<String> {
    let mut lines = Vec::new();
    for track in tracks {
        lines.push(format!("{} {}", track.id.bold(), track.name));
        lines.push(format!("  {}", track.description.dimmed()));
        lines.push(format!("  modules: {}", track.modules.join(", ")));
    }
    lines
}
