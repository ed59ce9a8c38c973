//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `thnk-adapters` crate provides implementations.

use std::path::Path;
use std::time::SystemTime;

use crate::domain::{GenerationEvent, GenerationOutput, GenerationRequest, ThnkfileDeclaration};
use crate::error::ThnkResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `thnk_adapters::filesystem::LocalFilesystem` (production)
/// - `thnk_adapters::filesystem::MemoryFilesystem` (testing)
///
/// ## Design Notes
///
/// - Paths are target names taken verbatim from the Thnkfile
/// - Modification times are the only persisted build state
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> ThnkResult<()>;

    /// Write content to a file, replacing it.
    fn write_file(&self, path: &Path, content: &str) -> ThnkResult<()>;

    /// Read a whole file as UTF-8.
    fn read_to_string(&self, path: &Path) -> ThnkResult<String>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Last modification time, `None` when the file is missing.
    fn modified(&self, path: &Path) -> Option<SystemTime>;
}

/// Port for declaration syntaxes.
///
/// Implemented by:
/// - `thnk_adapters::parser::MakefileParser` (`Thnkfile`)
/// - `thnk_adapters::parser::TomlParser` (`Thnkfile.toml`)
pub trait DeclarationParser: Send + Sync {
    /// Reduce declaration text to typed records.
    fn parse(&self, source: &str) -> ThnkResult<ThnkfileDeclaration>;
}

/// Port for the generative model.
///
/// Implemented by:
/// - `thnk_adapters::backend::OpenAiBackend` (OpenAI-compatible HTTP API)
/// - `thnk_adapters::backend::EchoBackend` (offline, deterministic)
pub trait GenerationBackend: Send + Sync {
    /// Short name for logs and error messages.
    fn name(&self) -> &str;

    /// Produce the output for one request, reporting progress to `observer`.
    ///
    /// The returned output must match `request.mode`.
    fn generate(
        &self,
        request: &GenerationRequest,
        observer: &mut dyn ProgressObserver,
    ) -> ThnkResult<GenerationOutput>;
}

/// Sink for progress events while a plan runs.
pub trait ProgressObserver {
    /// Called for every event of the backend call producing `target`.
    fn on_event(&mut self, target: &str, event: &GenerationEvent);

    /// Called once a target has been written.
    fn on_written(&mut self, _target: &str) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_event(&mut self, _target: &str, _event: &GenerationEvent) {}
}
