//! Failure taxonomy for ingestion and retrieval.
//!
//! Collaborator errors ([`ProviderError`], [`StoreError`]) are reclassified
//! into [`RagError`] by the component that owns the collaborator. Every
//! variant keeps the original cause text.

use crate::vector_index::StoreError;
use ragdex_core::AppError;
use ragdex_llm::ProviderError;
use thiserror::Error;

/// Classified ingestion/retrieval failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RagError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding provider rejected the API key: {0}")]
    AuthenticationError(String),

    #[error("Embedding provider rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Embedding generation failed: {0}")]
    ProviderFailure(String),

    #[error("Vector store connection error: {0}. Check that the vector store is reachable")]
    ConnectionError(String),

    #[error("Search timeout: {0}. Please try again")]
    Timeout(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Vector store failure: {0}")]
    StoreFailure(String),

    #[error("RAG search failed: {0}")]
    GenericSearchFailure(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Convenience type alias for Results with RagError.
pub type RagResult<T> = Result<T, RagError>;

impl RagError {
    /// Stable name of the failure class, for machine-readable output.
    pub fn kind(&self) -> &'static str {
        match self {
            RagError::InvalidInput(_) => "InvalidInput",
            RagError::DimensionMismatch { .. } => "DimensionMismatch",
            RagError::AuthenticationError(_) => "AuthenticationError",
            RagError::RateLimited(_) => "RateLimited",
            RagError::ProviderFailure(_) => "ProviderFailure",
            RagError::ConnectionError(_) => "ConnectionError",
            RagError::Timeout(_) => "Timeout",
            RagError::ValidationError(_) => "ValidationError",
            RagError::FileNotFound(_) => "FileNotFound",
            RagError::StoreFailure(_) => "StoreFailure",
            RagError::GenericSearchFailure(_) => "GenericSearchFailure",
            RagError::Unknown(_) => "Unknown",
        }
    }
}

impl From<ProviderError> for RagError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Authentication(message) => RagError::AuthenticationError(message),
            ProviderError::RateLimited(message) => RagError::RateLimited(message),
            other => RagError::ProviderFailure(other.to_string()),
        }
    }
}

impl From<StoreError> for RagError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Connection(message) => RagError::ConnectionError(message),
            StoreError::Timeout(message) => RagError::Timeout(message),
            StoreError::DimensionMismatch { expected, actual } => {
                RagError::DimensionMismatch { expected, actual }
            }
            other => RagError::StoreFailure(other.to_string()),
        }
    }
}

impl From<RagError> for AppError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::AuthenticationError(_)
            | RagError::RateLimited(_)
            | RagError::ProviderFailure(_) => AppError::Embedding(err.to_string()),
            RagError::ConnectionError(_) | RagError::StoreFailure(_) => {
                AppError::Store(err.to_string())
            }
            other => AppError::Knowledge(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_errors_classify_on_tag() {
        assert_eq!(
            RagError::from(ProviderError::Authentication("Incorrect API key".to_string())),
            RagError::AuthenticationError("Incorrect API key".to_string())
        );
        assert_eq!(
            RagError::from(ProviderError::RateLimited("slow down".to_string())),
            RagError::RateLimited("slow down".to_string())
        );

        let err = RagError::from(ProviderError::Api {
            status: 500,
            message: "internal".to_string(),
        });
        assert_eq!(err.kind(), "ProviderFailure");
        assert!(err.to_string().contains("internal"));
    }

    #[test]
    fn test_untagged_provider_message_still_classifies() {
        let err = RagError::from(ProviderError::from_message("Invalid API key supplied"));
        assert_eq!(err.kind(), "AuthenticationError");

        let err = RagError::from(ProviderError::from_message("socket hang up"));
        assert_eq!(err, RagError::ProviderFailure("socket hang up".to_string()));
    }

    #[test]
    fn test_store_errors_classify_on_tag() {
        assert_eq!(
            RagError::from(StoreError::Connection("refused".to_string())).kind(),
            "ConnectionError"
        );
        assert_eq!(
            RagError::from(StoreError::Timeout("busy".to_string())).kind(),
            "Timeout"
        );
        assert_eq!(
            RagError::from(StoreError::DimensionMismatch {
                expected: 3,
                actual: 2
            }),
            RagError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        );
        assert_eq!(
            RagError::from(StoreError::IndexNotFound("documents".to_string())).kind(),
            "StoreFailure"
        );
    }

    #[test]
    fn test_app_error_mapping() {
        let app: AppError = RagError::RateLimited("429".to_string()).into();
        assert!(matches!(app, AppError::Embedding(_)));

        let app: AppError = RagError::ConnectionError("refused".to_string()).into();
        assert!(matches!(app, AppError::Store(_)));

        let app: AppError = RagError::FileNotFound("/tmp/x.md".to_string()).into();
        assert!(matches!(app, AppError::Knowledge(_)));
        assert!(app.to_string().contains("/tmp/x.md"));
    }
}
