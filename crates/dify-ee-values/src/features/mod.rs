//! Version-gated features
//!
//! Each feature extends one module for the chart versions that support it.
//! Registration order is application order within a module.

mod external_prometheus;
mod plugin_metric;
mod trigger_worker;

use wizard_core::{FeatureDef, FeatureRegistry};

/// Every feature this tool knows about
pub fn all() -> [FeatureDef; 3] {
    [
        external_prometheus::FEATURE,
        plugin_metric::FEATURE,
        trigger_worker::FEATURE,
    ]
}

pub fn register(registry: &mut FeatureRegistry) {
    registry.register_all(all());
}

#[cfg(test)]
pub(crate) mod testing {
    use anyhow::Result;
    use serde_yaml::Value;
    use wizard_core::interact::{Answer, ScriptedPrompter};
    use wizard_core::{ConfigContext, Session};

    /// Apply one feature hook over `values` with scripted answers
    pub fn apply(
        hook: fn(&mut Session<'_>) -> Result<()>,
        values: &str,
        answers: impl IntoIterator<Item = Answer>,
    ) -> (ConfigContext, ScriptedPrompter) {
        let root: Value = serde_yaml::from_str(values).unwrap();
        let mut ui = ScriptedPrompter::new(answers);
        let mut session = Session::new(ConfigContext::new(root, "3.7.0"), &mut ui);
        hook(&mut session).unwrap();
        let values = session.into_values();
        (values, ui)
    }
}
