//! Feature registry: module name to features, in registration order

use super::FeatureDef;
use indexmap::IndexMap;

/// One line of the full registration matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixRow {
    pub module: &'static str,
    pub feature: &'static str,
    pub name: &'static str,
    pub range: String,
    pub description: &'static str,
}

/// Catalog of features grouped by module
///
/// Populated once at startup, then only read (the dispatcher borrows it
/// immutably for the whole run). Registration order is application order.
#[derive(Debug, Default, Clone)]
pub struct FeatureRegistry {
    modules: IndexMap<&'static str, Vec<FeatureDef>>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a feature to its module's list. A feature whose id is already
    /// registered (under any module) is ignored; returns whether it was added.
    pub fn register(&mut self, feature: FeatureDef) -> bool {
        if let Some(existing) = self.find(feature.id) {
            tracing::warn!(
                feature = feature.id,
                module = feature.module,
                registered_under = existing.module,
                "feature already registered, ignoring duplicate"
            );
            return false;
        }
        tracing::debug!(
            feature = feature.id,
            module = feature.module,
            range = %feature.range_label(),
            "registered feature"
        );
        self.modules.entry(feature.module).or_default().push(feature);
        true
    }

    /// Register several features in order
    pub fn register_all(&mut self, features: impl IntoIterator<Item = FeatureDef>) {
        for feature in features {
            self.register(feature);
        }
    }

    /// Look up a registered feature by id
    pub fn find(&self, id: &str) -> Option<&FeatureDef> {
        self.modules.values().flatten().find(|f| f.id == id)
    }

    /// Features of `module` that apply to `chart_version`, in registration order
    pub fn applicable(&self, module: &str, chart_version: &str) -> Vec<&FeatureDef> {
        self.modules
            .get(module)
            .map(|features| {
                features
                    .iter()
                    .filter(|f| f.applies_to(chart_version))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Applicable features for every module; modules with none are omitted
    pub fn all_applicable(&self, chart_version: &str) -> IndexMap<&'static str, Vec<&FeatureDef>> {
        self.modules
            .iter()
            .filter_map(|(module, features)| {
                let active: Vec<_> = features
                    .iter()
                    .filter(|f| f.applies_to(chart_version))
                    .collect();
                (!active.is_empty()).then_some((*module, active))
            })
            .collect()
    }

    /// Every registration, module by module
    pub fn matrix(&self) -> Vec<MatrixRow> {
        self.modules
            .iter()
            .flat_map(|(module, features)| {
                features.iter().map(move |f| MatrixRow {
                    module: *module,
                    feature: f.id,
                    name: f.name,
                    range: f.range_label(),
                    description: f.description,
                })
            })
            .collect()
    }

    /// Modules that have at least one registration, in first-seen order
    pub fn modules(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.modules.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.modules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every registration (test isolation only)
    pub fn reset(&mut self) {
        self.modules.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::testing::feature;

    fn ids(features: &[&FeatureDef]) -> Vec<&'static str> {
        features.iter().map(|f| f.id).collect()
    }

    #[test]
    fn test_applicable_respects_min_version() {
        let mut registry = FeatureRegistry::new();
        registry.register(feature("plugin_metric", "plugins", Some("3.7.0"), None));

        assert!(registry.applicable("plugins", "3.6.9").is_empty());
        assert_eq!(ids(&registry.applicable("plugins", "3.7.0")), ["plugin_metric"]);
        assert_eq!(ids(&registry.applicable("plugins", "3.7.2")), ["plugin_metric"]);
        assert!(registry.applicable("networking", "3.7.2").is_empty());
    }

    #[test]
    fn test_registration_order_is_kept() {
        let mut registry = FeatureRegistry::new();
        registry.register(feature("zeta", "services", Some("3.8.0"), None));
        registry.register(feature("alpha", "services", None, None));
        registry.register(feature("mid", "services", Some("3.7.0"), None));

        assert_eq!(ids(&registry.applicable("services", "3.9.0")), ["zeta", "alpha", "mid"]);
        assert_eq!(ids(&registry.applicable("services", "3.7.1")), ["alpha", "mid"]);
    }

    #[test]
    fn test_duplicate_id_is_ignored() {
        let mut registry = FeatureRegistry::new();
        assert!(registry.register(feature("trigger_worker", "services", Some("3.7.0"), None)));
        assert!(!registry.register(feature("trigger_worker", "services", Some("3.7.0"), None)));
        assert!(!registry.register(feature("trigger_worker", "plugins", None, None)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.applicable("services", "3.7.0").len(), 1);
        assert!(registry.applicable("plugins", "3.7.0").is_empty());
    }

    #[test]
    fn test_all_applicable_omits_empty_modules() {
        let mut registry = FeatureRegistry::new();
        registry.register_all([
            feature("external_prometheus", "infrastructure", Some("3.7.0"), None),
            feature("plugin_metric", "plugins", Some("3.7.0"), None),
            feature("legacy", "global", None, Some("3.5.0")),
        ]);

        let active = registry.all_applicable("3.7.2");
        assert_eq!(active.keys().copied().collect::<Vec<_>>(), ["infrastructure", "plugins"]);

        let active = registry.all_applicable("3.0.0");
        assert_eq!(active.keys().copied().collect::<Vec<_>>(), ["global"]);
    }

    #[test]
    fn test_all_applicable_is_deterministic() {
        let mut registry = FeatureRegistry::new();
        registry.register_all([
            feature("a", "plugins", Some("3.7.0"), None),
            feature("b", "services", None, None),
            feature("c", "plugins", None, Some("3.8.0")),
        ]);

        let first = registry.all_applicable("3.7.5");
        let second = registry.all_applicable("3.7.5");
        assert_eq!(first, second);
        assert_eq!(ids(&first["plugins"]), ["a", "c"]);
    }

    #[test]
    fn test_matrix_and_reset() {
        let mut registry = FeatureRegistry::new();
        registry.register(feature("plugin_metric", "plugins", Some("3.7.0"), None));
        registry.register(feature("trigger_worker", "services", Some("3.7.0"), Some("3.9.0")));

        let matrix = registry.matrix();
        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix[0].module, "plugins");
        assert_eq!(matrix[1].range, "3.7.0 - 3.9.0");
        assert_eq!(registry.modules().collect::<Vec<_>>(), ["plugins", "services"]);

        registry.reset();
        assert!(registry.is_empty());
        assert!(registry.all_applicable("3.7.0").is_empty());
    }
}
