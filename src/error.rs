//! Error types for style-onboard.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Onboarding error: {0}")]
    Onboarding(#[from] OnboardingError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors from the remote preferences / recommendations API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request to {endpoint} failed: {reason}")]
    RequestFailed { endpoint: String, reason: String },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    #[error("Request to {endpoint} timed out after {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },
}

/// Gender key-value storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by wizard operations.
///
/// Selection bound rejections are not errors; see
/// [`ToggleOutcome`](crate::onboarding::ToggleOutcome).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OnboardingError {
    #[error("Unknown step {0} (valid steps are 0-4)")]
    UnknownStep(u8),

    #[error("Invalid outfit page {0} (valid pages are 0 and 1)")]
    InvalidOutfitPage(u8),

    #[error("Operation requires step {expected}, current step is {actual}")]
    WrongStep { expected: String, actual: String },

    #[error("Selection incomplete: {0}")]
    IncompleteSelection(String),

    #[error("Gender has not been selected")]
    GenderUnset,

    #[error("The outfit step is finished by completing onboarding")]
    CompletionRequired,

    #[error("Onboarding completion is already in progress")]
    AlreadyCompleting,
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn onboarding_error_converts_into_top_level() {
        let err: Error = OnboardingError::UnknownStep(6).into();
        assert!(matches!(err, Error::Onboarding(_)));
        assert!(err.to_string().contains("Unknown step 6"));
    }

    #[test]
    fn api_status_error_message() {
        let err = ApiError::Status {
            endpoint: "/api/recommendations".into(),
            status: 502,
            body: "bad gateway".into(),
        };
        assert_eq!(
            err.to_string(),
            "/api/recommendations returned HTTP 502: bad gateway"
        );
    }
}
