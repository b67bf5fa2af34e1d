use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    LocalPrecondition,
    RemoteValidation,
    RemoteApi,
    RemoteInternal,
}

/// Failures surfaced to the user. `Display` is the exact alert text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("SDK not initialized")]
    NotInitialized,
    #[error("{0}")]
    Validation(String),
    #[error("API Error: {0}")]
    Api(String),
    #[error("SDK Error: {0}")]
    Internal(String),
}

impl AnalysisError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AnalysisError::NotInitialized => ErrorCategory::LocalPrecondition,
            AnalysisError::Validation(_) => ErrorCategory::RemoteValidation,
            AnalysisError::Api(_) => ErrorCategory::RemoteApi,
            AnalysisError::Internal(_) => ErrorCategory::RemoteInternal,
        }
    }

    pub fn is_remote(&self) -> bool {
        self.category() != ErrorCategory::LocalPrecondition
    }
}

/// Conditions worth telling the user about that do not end a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AdvisoryCondition {
    #[error("Geolocation permission denied")]
    GeolocationDenied,
    #[error("Geolocation not available")]
    GeolocationUnavailable,
}
