//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `thnk-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File reads, writes and modification times
//!   - `TemplateRenderer`: Template evaluation
//!   - `DeclarationParser`: Declaration syntax to typed records
//!   - `GenerationBackend`: The generative model
//!   - `ProgressObserver`: Streaming progress sink
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (Defined in CLI layer, implemented by services)

pub mod output;

pub use crate::domain::ports::TemplateRenderer;
pub use output::{
    DeclarationParser, Filesystem, GenerationBackend, NoopObserver, ProgressObserver,
};

#[cfg(test)]
pub use crate::domain::ports::MockTemplateRenderer;
#[cfg(test)]
pub use output::MockFilesystem;
