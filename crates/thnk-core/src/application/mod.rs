//! Application layer for Thnk.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (PlanService, DispatchService, BuildService)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! rule model logic itself. Rule construction and the settings cascade live
//! in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{BuildOptions, BuildReport, BuildService, DispatchService, PlanService};

// Re-export port traits (for adapter implementation)
pub use ports::{
    DeclarationParser, Filesystem, GenerationBackend, NoopObserver, ProgressObserver,
    TemplateRenderer,
};

pub use error::ApplicationError;
