//! Module dispatcher
//!
//! For a track and chart version the dispatcher runs each module of the track
//! in order: the module's base handler first, then every feature the registry
//! reports as applicable for that module, in registration order. Errors from
//! handlers and features are returned as-is.

use crate::context::Writer;
use crate::features::{FeatureDef, FeatureRegistry};
use crate::session::Session;
use crate::tracks::Track;
use anyhow::Result;
use indexmap::IndexMap;

/// Base logic of a module
pub type ModuleFn = fn(&mut Session<'_>) -> Result<()>;

/// What a run will do for one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedModule<'r> {
    pub module: &'static str,
    /// Whether a handler is registered; unhandled modules are skipped
    pub handled: bool,
    pub features: Vec<&'r FeatureDef>,
}

/// Ordered description of a run; a pure function of track, version and
/// registrations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPlan<'r> {
    pub track: &'static str,
    pub chart_version: String,
    pub modules: Vec<PlannedModule<'r>>,
}

impl DispatchPlan<'_> {
    /// Feature ids in application order
    pub fn feature_ids(&self) -> Vec<&'static str> {
        self.modules
            .iter()
            .filter(|m| m.handled)
            .flat_map(|m| m.features.iter().map(|f| f.id))
            .collect()
    }
}

/// What a run actually did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub modules_run: Vec<&'static str>,
    pub modules_skipped: Vec<&'static str>,
    pub features_applied: Vec<&'static str>,
}

pub struct Dispatcher<'r> {
    registry: &'r FeatureRegistry,
    handlers: IndexMap<&'static str, ModuleFn>,
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r FeatureRegistry) -> Self {
        Self {
            registry,
            handlers: IndexMap::new(),
        }
    }

    pub fn with_handlers(
        registry: &'r FeatureRegistry,
        handlers: impl IntoIterator<Item = (&'static str, ModuleFn)>,
    ) -> Self {
        let mut dispatcher = Self::new(registry);
        for (module, handler) in handlers {
            dispatcher.register_module(module, handler);
        }
        dispatcher
    }

    /// Register (or replace) the base handler of a module
    pub fn register_module(&mut self, module: &'static str, handler: ModuleFn) {
        if self.handlers.insert(module, handler).is_some() {
            tracing::warn!(module, "module handler replaced");
        }
    }

    pub fn has_handler(&self, module: &str) -> bool {
        self.handlers.contains_key(module)
    }

    pub fn registry(&self) -> &'r FeatureRegistry {
        self.registry
    }

    /// Resolve what a run of `track` at `chart_version` will do
    pub fn plan(&self, track: &Track, chart_version: &str) -> DispatchPlan<'r> {
        let modules = track
            .modules
            .iter()
            .map(|&module| {
                let handled = self.has_handler(module);
                PlannedModule {
                    module,
                    handled,
                    features: if handled {
                        self.registry.applicable(module, chart_version)
                    } else {
                        Vec::new()
                    },
                }
            })
            .collect();
        DispatchPlan {
            track: track.id,
            chart_version: chart_version.to_string(),
            modules,
        }
    }

    /// Run every module of `track` against the session
    pub fn run(&self, track: &Track, session: &mut Session<'_>) -> Result<DispatchReport> {
        let plan = self.plan(track, session.chart_version());
        tracing::debug!(
            track = plan.track,
            chart_version = %plan.chart_version,
            features = ?plan.feature_ids(),
            "dispatch plan resolved"
        );

        let mut report = DispatchReport::default();
        for step in &plan.modules {
            let Some(&handler) = self.handlers.get(step.module) else {
                tracing::warn!(module = step.module, "no handler registered, skipping module");
                session
                    .ui()
                    .warning(&format!("No handler for module '{}', skipping", step.module))?;
                report.modules_skipped.push(step.module);
                continue;
            };

            session.set_writer(Writer::Module(step.module));
            handler(session)?;
            report.modules_run.push(step.module);

            for feature in &step.features {
                tracing::debug!(feature = feature.id, module = step.module, "applying feature");
                session.ui().info(&format!(
                    "Applying feature: {} ({})",
                    feature.name,
                    feature.range_label()
                ))?;
                session.set_writer(Writer::Feature(feature.id));
                (feature.apply)(session)?;
                session.set_writer(Writer::Module(step.module));
                session
                    .ui()
                    .success(&format!("Feature applied: {}", feature.name))?;
                report.features_applied.push(feature.id);
            }
        }
        Ok(report)
    }
}
