//! Infrastructure adapters for Thnk.
//!
//! This crate implements the ports defined in `thnk-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod backend;
pub mod filesystem;
pub mod parser;
pub mod renderer;

// Re-export commonly used adapters
pub use backend::{EchoBackend, OpenAiBackend, OpenAiConfig};
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use parser::{MakefileParser, TomlParser};
pub use renderer::SimpleRenderer;
