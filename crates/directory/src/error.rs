//! Unified error handling.
//!
//! Provides a unified `AppError` type returned by every service operation.
//! Storage failures are wrapped unchanged; nothing is retried or swallowed
//! here except the strict-mode slug conflict retry in the store service.

use thiserror::Error;

use crate::config::ConfigError;
use crate::db::RepositoryError;
use crate::models::StoreValidationError;

/// Application-level error type for the directory.
#[derive(Debug, Error)]
pub enum AppError {
    /// Storage operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Store input failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] StoreValidationError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller does not own the store it tried to edit.
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl AppError {
    /// True for failures caused by the caller's input rather than the system.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound(_) | Self::Forbidden(_)
        )
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("store `wok-star`".to_string());
        assert_eq!(err.to_string(), "Not found: store `wok-star`");

        let err = AppError::Forbidden("You must be the store creator to edit it".to_string());
        assert_eq!(
            err.to_string(),
            "Forbidden: You must be the store creator to edit it"
        );
    }

    #[test]
    fn test_validation_messages_pass_through() {
        let err = AppError::from(StoreValidationError::MissingAuthor);
        assert_eq!(err.to_string(), "Validation error: You must supply an author");
    }

    #[test]
    fn test_client_errors() {
        assert!(AppError::NotFound("x".to_string()).is_client_error());
        assert!(AppError::Forbidden("x".to_string()).is_client_error());
        assert!(
            !AppError::Database(RepositoryError::Conflict("slug taken".to_string()))
                .is_client_error()
        );
        assert!(
            !AppError::Database(RepositoryError::Unavailable("down".to_string()))
                .is_client_error()
        );
    }
}
