//! Offline backend for tests and dry runs.
//!
//! Text requests are answered with the prompt itself, streamed word by word.
//! Object requests get the smallest value that has the schema's shape.

use serde_json::{Map, Value};
use thnk_core::{
    application::ports::{GenerationBackend, ProgressObserver},
    domain::{GenerationEvent, GenerationOutput, GenerationRequest, OutputMode},
    error::ThnkResult,
};
use tracing::instrument;

#[derive(Debug, Default, Clone, Copy)]
pub struct EchoBackend;

impl EchoBackend {
    pub fn new() -> Self {
        Self
    }
}

impl GenerationBackend for EchoBackend {
    fn name(&self) -> &str {
        "echo"
    }

    #[instrument(skip_all, fields(rule = %request.target, mode = %request.mode))]
    fn generate(
        &self,
        request: &GenerationRequest,
        observer: &mut dyn ProgressObserver,
    ) -> ThnkResult<GenerationOutput> {
        observer.on_event(
            &request.target,
            &GenerationEvent::Started {
                model: request.model.clone(),
                mode: request.mode,
            },
        );

        let output = match (&request.mode, &request.schema) {
            (OutputMode::Object, Some(schema)) => GenerationOutput::Object(example(schema.as_value())),
            (OutputMode::Object, None) => GenerationOutput::Object(Value::Object(Map::new())),
            (OutputMode::Text, _) => {
                for word in request.prompt.split_inclusive(' ') {
                    observer.on_event(&request.target, &GenerationEvent::TextDelta(word.to_string()));
                }
                GenerationOutput::Text(request.prompt.clone())
            }
        };

        observer.on_event(&request.target, &GenerationEvent::Completed);
        Ok(output)
    }
}

fn example(schema: &Value) -> Value {
    match schema.get("type").and_then(Value::as_str) {
        Some("object") => Value::Object(
            schema
                .get("properties")
                .and_then(Value::as_object)
                .map(|props| props.iter().map(|(k, v)| (k.clone(), example(v))).collect())
                .unwrap_or_default(),
        ),
        Some("array") => Value::Array(Vec::new()),
        Some("string") => Value::String(String::new()),
        Some("integer") | Some("number") => Value::from(0),
        Some("boolean") => Value::Bool(false),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use thnk_core::{application::ports::NoopObserver, domain::Schema};

    fn request(mode: OutputMode, schema: Option<Value>) -> GenerationRequest {
        GenerationRequest {
            target: "out".into(),
            mode,
            model: "gpt-4o-mini".into(),
            temperature: 0.0,
            system: "system".into(),
            prompt: "Say hi to Jacob".into(),
            schema: schema.map(Schema::new),
        }
    }

    #[test]
    fn text_echoes_the_prompt_as_deltas() {
        struct Collect(String);
        impl ProgressObserver for Collect {
            fn on_event(&mut self, _target: &str, event: &GenerationEvent) {
                if let GenerationEvent::TextDelta(d) = event {
                    self.0.push_str(d);
                }
            }
        }

        let mut collected = Collect(String::new());
        let output = EchoBackend::new()
            .generate(&request(OutputMode::Text, None), &mut collected)
            .unwrap();
        assert_eq!(output, GenerationOutput::Text("Say hi to Jacob".into()));
        assert_eq!(collected.0, "Say hi to Jacob");
    }

    #[test]
    fn object_follows_schema_shape() {
        let schema = json!({
            "type": "object",
            "properties": {
                "title": {"type": "string"},
                "count": {"type": "integer"},
                "tags": {"type": "array", "items": {"type": "string"}}
            }
        });
        let output = EchoBackend::new()
            .generate(&request(OutputMode::Object, Some(schema)), &mut NoopObserver)
            .unwrap();
        assert_eq!(
            output,
            GenerationOutput::Object(json!({"title": "", "count": 0, "tags": []}))
        );
    }
}
