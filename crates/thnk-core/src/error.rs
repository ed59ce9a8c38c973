//! Unified error handling for Thnk Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Thnk Core operations.
///
/// This enum wraps all possible errors that can occur when using thnk-core,
/// providing a unified interface for error handling.
#[derive(Debug, Error, Clone)]
pub enum ThnkError {
    /// Errors from the domain layer (rule model and graph violations).
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (I/O, parsing, backend).
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl ThnkError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Check your setup and try again".into(),
            ],
            Self::Internal { .. } => vec![
                "This appears to be a bug in Thnk".into(),
                "Please report this issue at: https://github.com/thnk-build/thnk/issues".into(),
            ],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::Graph => ErrorCategory::Validation,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// The target this error is attached to, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Domain(e) => e.target(),
            Self::Application(e) => e.target(),
            _ => None,
        }
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Generation,
    Internal,
}

/// Convenient result type alias.
pub type ThnkResult<T> = Result<T, ThnkError>;

/// Extension trait for adding context to errors.
pub trait Context<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> ThnkResult<T>;
}

impl<T, E> Context<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: impl Into<String>) -> ThnkResult<T> {
        self.map_err(|e| ThnkError::Internal {
            message: format!("{}: {}", msg.into(), e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_errors_are_generation_category() {
        let err: ThnkError = ApplicationError::Backend {
            target: "a.md".into(),
            reason: "timeout".into(),
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Generation);
        assert_eq!(err.target(), Some("a.md"));
    }

    #[test]
    fn cycle_is_a_validation_error() {
        let err: ThnkError = DomainError::CyclicDependency {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        }
        .into();
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert!(err.to_string().contains("a -> b -> a"));
    }

    #[test]
    fn context_wraps_foreign_errors_as_internal() {
        let res: Result<(), std::fmt::Error> = Err(std::fmt::Error);
        let err = res.context("formatting report").unwrap_err();
        assert!(matches!(err, ThnkError::Internal { .. }));
        assert!(err.to_string().contains("formatting report"));
    }
}
