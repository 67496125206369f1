//! Error taxonomy for the onboarding flow

use thiserror::Error;

/// Failures surfaced to whoever drives the flow (CLI, TUI).
///
/// Invalid picker input is not represented here: the builder ignores it
/// and logs a warning instead. Free-form numbers (the goal target) are
/// checked and rejected with `InvalidTarget`.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("not signed in")]
    NotAuthenticated,

    #[error("storage failure: {0}")]
    Persistence(#[from] anyhow::Error),

    #[error("health data permission denied")]
    PermissionDenied,

    #[error("goal target must be a positive number, got {0}")]
    InvalidTarget(f64),
}

pub type FlowResult<T> = std::result::Result<T, FlowError>;

impl FlowError {
    /// Short message for an alert line; detail goes to the log
    pub fn user_message(&self) -> &'static str {
        match self {
            FlowError::NotAuthenticated => "Please sign in first.",
            FlowError::Persistence(_) => "Something went wrong while saving. Try again.",
            FlowError::PermissionDenied => "Health data access was not granted.",
            FlowError::InvalidTarget(_) => "Goal target must be a positive number.",
        }
    }
}
