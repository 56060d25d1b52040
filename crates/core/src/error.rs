//! Error types for the Sift service.
//!
//! This module defines a unified error enum that covers every failure the
//! pipeline can surface: the three upstream collaborator failures (search,
//! fetch, generation) plus configuration, I/O, prompt and serialization
//! errors.

use thiserror::Error;

/// Unified error type for the Sift service.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// Nothing below the HTTP gateway panics on a bad request; errors are
/// represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// The search API was unreachable or returned an unusable response
    #[error("Search unavailable: {0}")]
    SearchUnavailable(String),

    /// Article fetching failed
    #[error("Fetch unavailable: {0}")]
    FetchUnavailable(String),

    /// The generative model or embedding provider failed
    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Machine-readable error code used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::SearchUnavailable(_) => "search_unavailable",
            AppError::FetchUnavailable(_) => "fetch_unavailable",
            AppError::GenerationUnavailable(_) => "generation_unavailable",
            AppError::Config(_) => "config_error",
            AppError::Io(_) => "io_error",
            AppError::Prompt(_) => "prompt_error",
            AppError::Serialization(_) => "serialization_error",
            AppError::Other(_) => "internal",
        }
    }

    /// Whether the failure came from an external collaborator rather than
    /// from this process.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AppError::SearchUnavailable(_)
                | AppError::FetchUnavailable(_)
                | AppError::GenerationUnavailable(_)
        )
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_codes() {
        assert_eq!(
            AppError::SearchUnavailable("x".into()).code(),
            "search_unavailable"
        );
        assert_eq!(
            AppError::FetchUnavailable("x".into()).code(),
            "fetch_unavailable"
        );
        assert_eq!(
            AppError::GenerationUnavailable("x".into()).code(),
            "generation_unavailable"
        );
        assert!(AppError::GenerationUnavailable("x".into()).is_upstream());
        assert!(!AppError::Config("x".into()).is_upstream());
    }

    #[test]
    fn test_display_includes_message() {
        let err = AppError::SearchUnavailable("status 403".to_string());
        assert_eq!(err.to_string(), "Search unavailable: status 403");
    }

    #[test]
    fn test_from_serde_json() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.code(), "serialization_error");
    }
}
