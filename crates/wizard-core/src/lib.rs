//! Wizard Core - Shared library for version-gated Helm values wizards
//!
//! This library provides the machinery for interactive generators of Helm
//! `values.yaml` files whose questions depend on the chart version. It is
//! designed to be used by product binaries (e.g., `dify-ee-values`) that
//! supply their own modules and features through a [`ChartProfile`].
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Version comparison, track resolution, the
//!   configuration context, values template patching, chart acquisition
//! - **Layer 2: Composition** - `FeatureRegistry`, `Dispatcher` and `Session`:
//!   base module logic plus the features whose version range admits the chart
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use wizard_core::{interact::ScriptedPrompter, wizard::{run_with, WizardArgs}};
//!
//! let mut ui = ScriptedPrompter::default();
//! let args = WizardArgs { chart_version: Some("3.7.2".into()), local: true, ..Default::default() };
//! let outcome = run_with(&MyProfile, &args, &mut ui).await?;
//! println!("applied: {:?}", outcome.report.features_applied);
//! ```

pub mod chart;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod features;
pub mod interact;
pub mod profile;
pub mod secrets;
pub mod session;
pub mod tracks;
pub mod values;
pub mod version;
pub mod wizard;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use context::{ConfigContext, WriteOutcome, Writer};
pub use dispatch::{DispatchPlan, DispatchReport, Dispatcher, ModuleFn};
pub use error::{exit_code_for, WizardError};
pub use features::{ApplyFn, FeatureDef, FeatureRegistry, MatrixRow};
pub use interact::Prompter;
pub use profile::ChartProfile;
pub use session::Session;
pub use tracks::Track;
pub use wizard::{Outcome, WizardArgs};

#[cfg(feature = "tui")]
pub use tui::run;
