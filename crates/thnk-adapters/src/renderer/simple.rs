//! Simple variable substitution renderer.
//!
//! Placeholders are `{{ name }}` or `{{ path.to.value }}`; array elements
//! are addressed by index (`{{ items.0 }}`). Strings are inserted as-is,
//! every other JSON value in its compact JSON form. A placeholder whose
//! path does not resolve is left in the output untouched.

use serde_json::Value;
use thnk_core::{
    application::{ApplicationError, ports::TemplateRenderer},
    domain::Bindings,
    error::ThnkResult,
};
use tracing::{instrument, trace};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Simple renderer using basic variable substitution.
#[derive(Debug, Clone, Copy)]
pub struct SimpleRenderer;

impl SimpleRenderer {
    /// Create a new simple renderer.
    pub fn new() -> Self {
        Self
    }
}

impl Default for SimpleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for SimpleRenderer {
    #[instrument(skip_all, fields(len = source.len(), keys = bindings.len()))]
    fn render(&self, source: &str, bindings: &Bindings) -> ThnkResult<String> {
        let mut out = String::with_capacity(source.len());
        let mut rest = source;

        while let Some(start) = rest.find(OPEN) {
            out.push_str(&rest[..start]);
            let inner = &rest[start + OPEN.len()..];
            let Some(end) = inner.find(CLOSE) else {
                return Err(ApplicationError::RenderingFailed {
                    reason: format!(
                        "unclosed placeholder at byte {}",
                        source.len() - rest.len() + start
                    ),
                }
                .into());
            };

            let path = inner[..end].trim();
            match lookup(bindings, path) {
                Some(value) => out.push_str(&display(value)),
                None => {
                    trace!(placeholder = path, "Unbound placeholder kept");
                    out.push_str(&rest[start..start + OPEN.len() + end + CLOSE.len()]);
                }
            }
            rest = &inner[end + CLOSE.len()..];
        }

        out.push_str(rest);
        Ok(out)
    }
}

fn lookup<'a>(bindings: &'a Bindings, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next().filter(|s| !s.is_empty())?;
    segments.try_fold(bindings.get(first)?, |value, segment| match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bindings(value: Value) -> Bindings {
        match value {
            Value::Object(map) => map,
            _ => Bindings::new(),
        }
    }

    #[test]
    fn substitutes_top_level_and_nested_values() {
        let out = SimpleRenderer::new()
            .render(
                "Hi {{name}}, {{ product.name }} x{{product.stock}} ({{tags.1}})",
                &bindings(json!({
                    "name": "Jacob",
                    "product": {"name": "laptop", "stock": 3},
                    "tags": ["a", "b"]
                })),
            )
            .unwrap();
        assert_eq!(out, "Hi Jacob, laptop x3 (b)");
    }

    #[test]
    fn unknown_placeholders_are_kept() {
        let out = SimpleRenderer::new()
            .render("Dear {{ who }} and {{}}", &Bindings::new())
            .unwrap();
        assert_eq!(out, "Dear {{ who }} and {{}}");
    }

    #[test]
    fn structured_values_render_as_json() {
        let out = SimpleRenderer::new()
            .render("{{ cfg }}", &bindings(json!({"cfg": {"a": [1, 2]}})))
            .unwrap();
        assert_eq!(out, r#"{"a":[1,2]}"#);
    }

    #[test]
    fn unclosed_placeholder_fails() {
        let err = SimpleRenderer::new()
            .render("Hello {{name", &Bindings::new())
            .unwrap_err();
        assert!(err.to_string().contains("unclosed placeholder at byte 6"));
    }

    #[test]
    fn rendering_is_repeatable() {
        let renderer = SimpleRenderer::new();
        let data = bindings(json!({"n": 1}));
        assert_eq!(
            renderer.render("{{n}}", &data).unwrap(),
            renderer.render("{{n}}", &data).unwrap()
        );
    }
}
