//! Application layer errors.
//!
//! These errors represent failures in orchestration and at the ports, not in
//! the rule model. Rule model errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// The declaration file could not be parsed.
    #[error("Thnkfile syntax error on line {line}: {message}")]
    DeclarationSyntax { line: usize, message: String },

    /// Template rendering failed.
    #[error("Template rendering failed: {reason}")]
    RenderingFailed { reason: String },

    /// Reading or probing a file failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Writing a generated artifact failed.
    #[error("Failed to write {target} to {path}: {reason}")]
    Persistence {
        target: String,
        path: PathBuf,
        reason: String,
    },

    /// The generation backend failed. Never retried.
    #[error("Generation failed for {target}: {reason}")]
    Backend { target: String, reason: String },

    /// The backend returned something that does not fit the request.
    #[error("Malformed output for {target}: {reason}")]
    MalformedOutput { target: String, reason: String },

    /// Shared adapter state was poisoned by a panicking thread.
    #[error("Adapter state lock poisoned")]
    LockPoisoned,
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::DeclarationSyntax { line, .. } => vec![
                format!("Check line {} of your Thnkfile", line),
                "Recipe lines must be indented under a 'target: needs' header".into(),
            ],
            Self::RenderingFailed { reason } => vec![
                format!("Details: {}", reason),
                "Placeholders look like {{name}} and must be closed".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that the file exists and is readable".into(),
            ],
            Self::Persistence { path, .. } => vec![
                format!("Failed to write: {}", path.display()),
                "Check that you have write permissions".into(),
                "Files generated before this one were kept".into(),
            ],
            Self::Backend { .. } => vec![
                "Check your API key and network connection".into(),
                "Run with -vv to see the request details".into(),
                "Try: thnk config get backend".into(),
            ],
            Self::MalformedOutput { target, .. } => vec![
                format!("The model did not return valid output for '{}'", target),
                "Re-run with --force, or tighten the schema".into(),
            ],
            Self::LockPoisoned => vec!["Try again; this is most likely a bug".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DeclarationSyntax { .. } | Self::RenderingFailed { .. } => {
                ErrorCategory::Validation
            }
            Self::FilesystemError { .. } => ErrorCategory::NotFound,
            Self::Backend { .. } | Self::MalformedOutput { .. } => ErrorCategory::Generation,
            Self::Persistence { .. } | Self::LockPoisoned => ErrorCategory::Internal,
        }
    }

    /// The target this error is attached to, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Persistence { target, .. }
            | Self::Backend { target, .. }
            | Self::MalformedOutput { target, .. } => Some(target),
            _ => None,
        }
    }
}
