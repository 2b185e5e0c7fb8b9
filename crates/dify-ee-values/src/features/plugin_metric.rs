//! Plugin resource metrics (chart 3.7.0+)

use crate::modules::PLUGINS;
use anyhow::Result;
use wizard_core::{FeatureDef, Session};

pub const FEATURE: FeatureDef = FeatureDef {
    id: "plugin_metric",
    name: "Plugin Metrics",
    description: "Configure plugin resource monitoring (CPU, memory, network I/O)",
    min_version: Some("3.7.0"),
    max_version: None,
    module: PLUGINS,
    apply,
};

const SOURCES: &[&str] = &["disabled", "cadvisor", "prometheus"];

fn apply(session: &mut Session<'_>) -> Result<()> {
    session.ui().section("Plugin metrics")?;
    session
        .ui()
        .info("The plugin manager can report CPU, memory and network usage per plugin")?;
    session.ensure_mapping("plugin_manager")?;

    if !session.ui().confirm("Configure plugin metrics?", false)? {
        session.ui().info("Keeping the chart's plugin metric settings")?;
        return Ok(());
    }

    session.ui().info("disabled: no metrics are collected")?;
    session.ui().info("cadvisor: scraped from cAdvisor, needs cluster roles")?;
    session.ui().info("prometheus: queried from an external Prometheus (recommended)")?;
    let source = session.select_or(
        "plugin_manager.metric.source",
        "Metric source",
        SOURCES,
        "disabled",
    )?;

    match source.as_str() {
        "cadvisor" => {
            session
                .ui()
                .warning("cAdvisor scraping requires cluster roles for the plugin manager")?;
            if session.ui().confirm("Configure cAdvisor scraping?", false)? {
                session.input_at(
                    "plugin_manager.metric.scrape.scrapeInterval",
                    "Scrape interval",
                    Some("20s"),
                    false,
                )?;
                session.input_at(
                    "plugin_manager.metric.scrape.scrapeTimeout",
                    "Scrape timeout",
                    Some("10s"),
                    false,
                )?;
                session.input_at(
                    "plugin_manager.metric.scrape.retainPeriod",
                    "Retention period",
                    Some("604800s"),
                    false,
                )?;
            }
        }
        "prometheus" => {
            if session.get_bool("externalPrometheus.enabled") != Some(true) {
                session.ui().warning(
                    "externalPrometheus is not enabled; enable it in the infrastructure module",
                )?;
            }
        }
        _ => {}
    }
    session.ui().success("Plugin metrics configured")?;
    Ok(())
}
