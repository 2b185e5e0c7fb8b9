//! External Prometheus for plugin metrics (chart 3.7.0+)
//!
//! The plugin manager can query plugin CPU, memory and network usage from an
//! existing Prometheus instead of scraping cAdvisor, which needs cluster
//! roles.

use crate::modules::INFRASTRUCTURE;
use anyhow::Result;
use wizard_core::{FeatureDef, Session};

pub const FEATURE: FeatureDef = FeatureDef {
    id: "external_prometheus",
    name: "External Prometheus",
    description: "Configure external Prometheus for plugin metrics monitoring",
    min_version: Some("3.7.0"),
    max_version: None,
    module: INFRASTRUCTURE,
    apply,
};

fn apply(session: &mut Session<'_>) -> Result<()> {
    session.ui().section("External Prometheus")?;
    session
        .ui()
        .info("Used by the plugin manager when plugin_manager.metric.source is prometheus")?;

    let enabled = session.confirm_at(
        "externalPrometheus.enabled",
        "Enable external Prometheus?",
        false,
    )?;
    if !enabled {
        session.ui().info("External Prometheus disabled")?;
        return Ok(());
    }

    session.input_at(
        "externalPrometheus.endpoint",
        "Prometheus endpoint",
        Some("http://prometheus:9090"),
        true,
    )?;
    session.input_at(
        "externalPrometheus.timeout",
        "Query timeout",
        Some("10s"),
        false,
    )?;

    if session
        .ui()
        .confirm("Does Prometheus require authentication?", false)?
    {
        session.input_at(
            "externalPrometheus.username",
            "Prometheus username",
            None,
            false,
        )?;
        let password = session.ui().input("Prometheus password", None, false)?;
        if !password.is_empty() {
            session.set("externalPrometheus.password", password)?;
        }
    }

    let insecure = session.confirm_at(
        "externalPrometheus.insecure",
        "Skip TLS verification?",
        true,
    )?;
    if insecure {
        session
            .ui()
            .warning("TLS certificates of the Prometheus endpoint will not be verified")?;
    }
    session.ui().success("External Prometheus configured")?;
    Ok(())
}
