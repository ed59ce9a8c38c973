//! Template bindings and the text sources built from them.
//!
//! A [`TemplateBinding`] is a deferred rendering: it captures a template
//! source and the renderer that understands it, and produces a string only
//! when [`TemplateBinding::apply`] is called with concrete data. It can be
//! applied any number of times with different bindings and has no side
//! effects. The template language itself lives behind the
//! [`TemplateRenderer`] port.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::domain::ports::TemplateRenderer;
use crate::error::ThnkResult;

/// Data bindings available to templates, keyed by top-level name.
pub type Bindings = Map<String, Value>;

/// A template source closed over its renderer.
#[derive(Clone)]
pub struct TemplateBinding {
    source: Arc<str>,
    renderer: Arc<dyn TemplateRenderer>,
}

impl TemplateBinding {
    pub fn new(source: impl Into<Arc<str>>, renderer: Arc<dyn TemplateRenderer>) -> Self {
        Self {
            source: source.into(),
            renderer,
        }
    }

    /// The raw, unrendered template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render against `bindings`.
    pub fn apply(&self, bindings: &Bindings) -> ThnkResult<String> {
        self.renderer.render(&self.source, bindings)
    }
}

impl fmt::Debug for TemplateBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateBinding")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

// Two bindings are interchangeable when they render the same source; the
// renderer is an injected capability, not part of the value.
impl PartialEq for TemplateBinding {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// A resolved text value: either literal or deferred.
///
/// Parsers reduce every tagged scalar (plain strings, includes, explicit
/// templates) to one of these two variants before the core sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum TextSource {
    Literal(String),
    Template(TemplateBinding),
}

impl TextSource {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Produce the final string, rendering templates against `bindings`.
    pub fn resolve(&self, bindings: &Bindings) -> ThnkResult<String> {
        match self {
            Self::Literal(text) => Ok(text.clone()),
            Self::Template(binding) => binding.apply(bindings),
        }
    }

    /// The text as written in the declaration.
    pub fn raw(&self) -> &str {
        match self {
            Self::Literal(text) => text,
            Self::Template(binding) => binding.source(),
        }
    }

    pub fn is_template(&self) -> bool {
        matches!(self, Self::Template(_))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Minimal `{{key}}` substitution for domain tests.
    pub(crate) struct BraceRenderer;

    impl TemplateRenderer for BraceRenderer {
        fn render(&self, source: &str, bindings: &Bindings) -> ThnkResult<String> {
            let mut out = source.to_string();
            for (key, value) in bindings {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                out = out.replace(&format!("{{{{{key}}}}}"), &text);
            }
            Ok(out)
        }
    }

    pub(crate) fn template(source: &str) -> TextSource {
        TextSource::Template(TemplateBinding::new(source, Arc::new(BraceRenderer)))
    }
}
