//! Classified wizard failures and their exit codes

use std::path::PathBuf;
use thiserror::Error;

/// General failure (also used for feature and module errors)
pub const EXIT_ERROR: i32 = 1;
/// Chart version missing or not mappable to a track
pub const EXIT_VERSION: i32 = 2;
/// Input that cannot be answered or used (sysexits `EX_USAGE`)
pub const EXIT_USAGE: i32 = 64;
/// Operator interruption (128 + SIGINT)
pub const EXIT_INTERRUPTED: i32 = 130;

/// Errors the run loop treats specially
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("a chart version is required: pass --chart-version or pick one from the repository")]
    ChartVersionRequired,

    #[error("cannot determine the release track for chart version '{0}'")]
    UnknownTrack(String),

    #[error("chart version '{version}' maps to track '{track}', which this tool does not support (available: {available})")]
    UnsupportedTrack {
        version: String,
        track: String,
        available: String,
    },

    #[error("'{0}' is not a usable chart version")]
    InvalidChartVersion(String),

    #[error("'{0}' needs an answer and has no default")]
    AnswerRequired(String),

    #[error("interrupted by operator")]
    Interrupted,

    #[error("values template not found: {0}")]
    TemplateNotFound(PathBuf),

    #[error("helm is not installed or not on PATH")]
    HelmNotInstalled,
}

impl WizardError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            WizardError::ChartVersionRequired
            | WizardError::UnknownTrack(_)
            | WizardError::UnsupportedTrack { .. }
            | WizardError::InvalidChartVersion(_) => EXIT_VERSION,
            WizardError::AnswerRequired(_) => EXIT_USAGE,
            WizardError::Interrupted => EXIT_INTERRUPTED,
            WizardError::TemplateNotFound(_) | WizardError::HelmNotInstalled => EXIT_ERROR,
        }
    }
}

/// Exit code for any error coming out of the wizard
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<WizardError>())
        .map(WizardError::exit_code)
        .unwrap_or(EXIT_ERROR)
}

/// Whether the error (or anything it wraps) is an operator interruption
pub fn is_interrupted(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| matches!(cause.downcast_ref::<WizardError>(), Some(WizardError::Interrupted)))
}
