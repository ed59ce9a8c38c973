// ============================================================================
// domain/error.rs - RULE MODEL AND GRAPH ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (they cross the plan/dispatch boundary by value)
/// - Categorizable (for CLI display)
/// - Tagged with the owning target where one exists
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Rule construction errors
    // ========================================================================
    #[error("Error in rule {target}: {reason}")]
    ConflictingPromptSource { target: String, reason: String },

    #[error("Error in rule {target}: multiple {kind} files ({candidates})")]
    AmbiguousSpecialDependency {
        target: String,
        kind: &'static str,
        candidates: String,
    },

    #[error("Error in rule {target}: schema provided for non-JSON target")]
    SchemaOnNonStructuredTarget { target: String },

    #[error("Error in rule {target}: {reason}")]
    InvalidSettings { target: String, reason: String },

    #[error("Target '{target}' is declared more than once")]
    DuplicateTarget { target: String },

    // ========================================================================
    // Graph errors
    // ========================================================================
    #[error("No rules in Thnkfile")]
    NoRules,

    #[error(
        "No rule for target {name}{}",
        .needed_by.as_deref().map(|t| format!(", needed by {t}")).unwrap_or_default()
    )]
    MissingDependency {
        name: String,
        needed_by: Option<String>,
    },

    #[error("Circular dependency: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    // ========================================================================
    // Output shape errors
    // ========================================================================
    #[error("Target {target} is not a JSON target")]
    NotStructuredTarget { target: String },

    #[error("Target {target} produces no file of its own")]
    NoArtifact { target: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ConflictingPromptSource { target, .. } => vec![
                format!("'{}' may take its prompt from exactly one place", target),
                "Remove the indented recipe, or drop the *.prompt.md dependency".into(),
            ],
            Self::AmbiguousSpecialDependency { kind, .. } => vec![
                format!("A target can depend on at most one {} file", kind),
            ],
            Self::SchemaOnNonStructuredTarget { target } => vec![
                format!("Rename '{}' to end in .json, or drop the schema", target),
            ],
            Self::InvalidSettings { reason, .. } => vec![
                format!("Details: {}", reason),
                "temperature must be between 0 and 2".into(),
            ],
            Self::NoRules => vec![
                "Declare at least one target, e.g.:".into(),
                "  hello.txt:".into(),
                "  \tWrite a friendly greeting".into(),
            ],
            Self::MissingDependency { name, .. } => vec![
                format!("Create the file '{}' or declare a target for it", name),
                "Try: thnk targets".into(),
            ],
            Self::CyclicDependency { .. } => {
                vec!["Break the cycle by removing one of the needs above".into()]
            }
            Self::NotStructuredTarget { target } => vec![
                format!("Give '{}' a schema to get structured output", target),
            ],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingDependency { .. } => ErrorCategory::NotFound,
            Self::NoRules | Self::CyclicDependency { .. } => ErrorCategory::Graph,
            _ => ErrorCategory::Validation,
        }
    }

    /// The target the error belongs to.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::ConflictingPromptSource { target, .. }
            | Self::AmbiguousSpecialDependency { target, .. }
            | Self::SchemaOnNonStructuredTarget { target }
            | Self::InvalidSettings { target, .. }
            | Self::DuplicateTarget { target }
            | Self::NotStructuredTarget { target }
            | Self::NoArtifact { target } => Some(target),
            Self::MissingDependency { needed_by, .. } => needed_by.as_deref(),
            Self::NoRules | Self::CyclicDependency { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Graph,
    NotFound,
}
