//! Thnk Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for Thnk, an
//! incremental build tool whose recipes are prompts: targets are files
//! produced by a generative backend from declared inputs, regenerated only
//! when they are older than what they need.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             thnk-cli (CLI)              │
//! │     (Implements Driving Ports)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (PlanService, DispatchService,         │
//! │   BuildService)                         │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Filesystem, TemplateRenderer,          │
//! │  DeclarationParser, GenerationBackend)  │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    thnk-adapters (Infrastructure)       │
//! │ (LocalFilesystem, SimpleRenderer,       │
//! │  MakefileParser, OpenAiBackend, ...)    │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │  (Settings, Rule, Thnkfile, prompts)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use thnk_core::prelude::*;
//!
//! // 1. Parse the declaration file with an adapter and build the rule set
//! let declaration = parser.parse(&source)?;
//! let thnkfile = Thnkfile::build(declaration)?;
//!
//! // 2. Run the build with injected adapters
//! let service = BuildService::new(thnkfile, filesystem, backend);
//! let report = service.build(None, &BuildOptions::default(), &mut NoopObserver)?;
//! println!("generated {} files", report.generated.len());
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        BuildOptions, BuildReport, BuildService, DispatchService, PlanService,
        ports::{
            DeclarationParser, Filesystem, GenerationBackend, NoopObserver, ProgressObserver,
            TemplateRenderer,
        },
    };
    pub use crate::domain::{
        Bindings, Dialect, Generation, GenerationEvent, GenerationOutput, GenerationRequest,
        NeedKind, OutputMode, Plan, Rule, RuleKind, Schema, Settings, TargetDeclaration,
        TemplateBinding, TextSource, Thnkfile, ThnkfileDeclaration,
    };
    pub use crate::error::{ThnkError, ThnkResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
