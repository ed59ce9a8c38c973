// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for Thnk.
//!
//! This module contains the rule model as pure logic. Declaration syntax,
//! template evaluation, file access and generation are all reached through
//! ports defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **No logging**: Services decide what is worth a span
//! - **Immutable entities**: Rules and the Thnkfile are never mutated after
//!   construction
//! - **Rich domain model**: Validation and the settings cascade live in
//!   entities, not services

pub mod entities;
pub mod error;
pub mod ports;
pub mod prompts;
pub mod value_objects;

pub use entities::{
    Bindings, Generation, GenerationEvent, GenerationOutput, GenerationRequest, Plan, Rule,
    RuleKind, Settings, TargetDeclaration, TemplateBinding, TextSource, Thnkfile,
    ThnkfileDeclaration,
};
pub use error::{DomainError, ErrorCategory};
pub use ports::TemplateRenderer;
pub use prompts::{InlinedInput, SYSTEM_PREAMBLE};
pub use value_objects::{Dialect, NeedKind, OutputMode, Schema};
