//! Capabilities the domain consumes but never implements.

use crate::domain::entities::Bindings;
use crate::error::ThnkResult;

/// Port for template rendering.
///
/// Implemented by:
/// - `thnk_adapters::renderer::SimpleRenderer` (`{{ path }}` substitution)
#[cfg_attr(test, mockall::automock)]
pub trait TemplateRenderer: Send + Sync {
    /// Render `source` against `bindings`. Must be pure and repeatable.
    fn render(&self, source: &str, bindings: &Bindings) -> ThnkResult<String>;
}
