//! Version-gated features
//!
//! A feature is a plain record: identity, display text, an inclusive version
//! range and the module it belongs to, plus the function that applies it.
//! Products declare their features as constants and hand them to a
//! [`FeatureRegistry`] once at startup.

mod registry;

pub use registry::{FeatureRegistry, MatrixRow};

use crate::session::Session;
use crate::version;
use anyhow::Result;
use std::fmt;

/// Function applying a feature to the session
pub type ApplyFn = fn(&mut Session<'_>) -> Result<()>;

/// One optional configuration behavior
#[derive(Clone, Copy)]
pub struct FeatureDef {
    /// Unique identity; registering the same id twice is ignored
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Inclusive lower bound; `None` means unbounded
    pub min_version: Option<&'static str>,
    /// Inclusive upper bound; `None` means unbounded
    pub max_version: Option<&'static str>,
    /// Owning module
    pub module: &'static str,
    pub apply: ApplyFn,
}

impl FeatureDef {
    /// Whether this feature is active for `chart_version`
    pub fn applies_to(&self, chart_version: &str) -> bool {
        version::satisfies(chart_version, self.min_version, self.max_version)
    }

    /// Human-readable version range, e.g. `>= 3.7.0` or `3.7.0 - 3.8.0`
    pub fn range_label(&self) -> String {
        let min = self.min_version.filter(|v| !v.is_empty());
        let max = self.max_version.filter(|v| !v.is_empty());
        match (min, max) {
            (Some(min), Some(max)) => format!("{} - {}", min, max),
            (Some(min), None) => format!(">= {}", min),
            (None, Some(max)) => format!("<= {}", max),
            (None, None) => "all versions".to_string(),
        }
    }
}

impl fmt::Debug for FeatureDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureDef")
            .field("id", &self.id)
            .field("module", &self.module)
            .field("min_version", &self.min_version)
            .field("max_version", &self.max_version)
            .finish_non_exhaustive()
    }
}

impl PartialEq for FeatureDef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FeatureDef {}
