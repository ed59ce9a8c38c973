//! OpenAI-compatible chat completions backend.
//!
//! Text requests are streamed (server-sent events) so progress can be shown
//! as it arrives. Object requests use the `json_schema` response format and
//! are read in one piece.

use std::io::{BufRead, BufReader};
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thnk_core::{
    application::{
        ApplicationError,
        ports::{GenerationBackend, ProgressObserver},
    },
    domain::{GenerationEvent, GenerationOutput, GenerationRequest, OutputMode},
    error::{ThnkError, ThnkResult},
};
use tracing::{debug, instrument, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: String,
    /// Whole-request timeout, streaming included.
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    temperature: f32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatCompletionChunk {
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    delta: ChunkDelta,
}

#[derive(Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

/// One parsed server-sent event line.
#[derive(Debug, PartialEq)]
enum SseLine {
    Delta(String),
    Done,
    Skip,
}

// ── Backend ──────────────────────────────────────────────────────────────────

pub struct OpenAiBackend {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiBackend {
    pub fn new(config: OpenAiConfig) -> ThnkResult<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ThnkError::Configuration {
                message: format!("failed to create HTTP client: {e}"),
            })?;
        Ok(Self { client, config })
    }

    fn send(&self, request: &GenerationRequest, stream: bool) -> ThnkResult<Response> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        let body = request_body(request, stream);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .map_err(|e| backend_error(&request.target, map_http_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            let reason = match status.as_u16() {
                401 => format!("Authentication failed: {text}"),
                404 => format!("Model not found: {text}"),
                429 => format!("Rate limit exceeded: {text}"),
                _ => format!("Request failed with status {status}: {text}"),
            };
            return Err(backend_error(&request.target, reason));
        }
        Ok(response)
    }

    fn stream_text(
        &self,
        request: &GenerationRequest,
        observer: &mut dyn ProgressObserver,
    ) -> ThnkResult<String> {
        let response = self.send(request, true)?;
        let mut text = String::new();

        for line in BufReader::new(response).lines() {
            let line = line.map_err(|e| backend_error(&request.target, format!("stream interrupted: {e}")))?;
            match parse_sse_line(&line) {
                SseLine::Delta(delta) => {
                    observer.on_event(&request.target, &GenerationEvent::TextDelta(delta.clone()));
                    text.push_str(&delta);
                }
                SseLine::Done => break,
                SseLine::Skip => {}
            }
        }
        Ok(text)
    }

    fn complete_object(&self, request: &GenerationRequest) -> ThnkResult<Value> {
        let response = self.send(request, false)?;
        let completion: ChatCompletionResponse = response.json().map_err(|e| {
            backend_error(&request.target, format!("Failed to parse response: {e}"))
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| backend_error(&request.target, "No choices in response".into()))?;

        serde_json::from_str(&content).map_err(|e| {
            ApplicationError::MalformedOutput {
                target: request.target.clone(),
                reason: format!("model returned invalid JSON: {e}"),
            }
            .into()
        })
    }
}

impl GenerationBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    #[instrument(skip_all, fields(rule = %request.target, model = %request.model, mode = %request.mode))]
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

        let output = match request.mode {
            OutputMode::Text => GenerationOutput::Text(self.stream_text(request, observer)?),
            OutputMode::Object => GenerationOutput::Object(self.complete_object(request)?),
        };

        observer.on_event(&request.target, &GenerationEvent::Completed);
        debug!("Generation finished");
        Ok(output)
    }
}

fn request_body(request: &GenerationRequest, stream: bool) -> ChatCompletionRequest<'_> {
    let response_format = request.schema.as_ref().map(|schema| {
        json!({
            "type": "json_schema",
            "json_schema": {
                "name": "output",
                "schema": schema.as_value(),
            }
        })
    });

    ChatCompletionRequest {
        model: &request.model,
        messages: [
            Message {
                role: "system",
                content: &request.system,
            },
            Message {
                role: "user",
                content: &request.prompt,
            },
        ],
        temperature: request.temperature,
        stream,
        response_format,
    }
}

fn parse_sse_line(line: &str) -> SseLine {
    let Some(data) = line.strip_prefix("data:").map(str::trim) else {
        return SseLine::Skip;
    };
    if data == "[DONE]" {
        return SseLine::Done;
    }
    match serde_json::from_str::<ChatCompletionChunk>(data) {
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.delta.content)
            .map_or(SseLine::Skip, SseLine::Delta),
        Err(e) => {
            warn!(error = %e, "Ignoring unparseable stream chunk");
            SseLine::Skip
        }
    }
}

fn map_http_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("Request timeout: {error}")
    } else if error.is_connect() {
        format!("Connection error: {error}")
    } else {
        format!("HTTP error: {error}")
    }
}

fn backend_error(target: &str, reason: String) -> ThnkError {
    ApplicationError::Backend {
        target: target.to_string(),
        reason,
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use thnk_core::domain::Schema;

    fn request(schema: Option<Value>) -> GenerationRequest {
        GenerationRequest {
            target: "summary.json".into(),
            mode: if schema.is_some() {
                OutputMode::Object
            } else {
                OutputMode::Text
            },
            model: "gpt-4o-mini".into(),
            temperature: 0.0,
            system: "You are a file generator.".into(),
            prompt: "Summarise".into(),
            schema: schema.map(Schema::new),
        }
    }

    #[test]
    fn text_body_streams_without_response_format() {
        let req = request(None);
        let body = serde_json::to_value(request_body(&req, true)).unwrap();
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Summarise");
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn object_body_carries_the_schema() {
        let req = request(Some(json!({"type": "object"})));
        let body = serde_json::to_value(request_body(&req, false)).unwrap();
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(
            body["response_format"]["json_schema"]["schema"],
            json!({"type": "object"})
        );
    }

    #[test]
    fn sse_lines() {
        assert_eq!(
            parse_sse_line(r#"data: {"choices":[{"delta":{"content":"Hi"}}]}"#),
            SseLine::Delta("Hi".into())
        );
        assert_eq!(parse_sse_line("data: [DONE]"), SseLine::Done);
        assert_eq!(parse_sse_line(": keep-alive"), SseLine::Skip);
        assert_eq!(parse_sse_line(""), SseLine::Skip);
        assert_eq!(
            parse_sse_line(r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#),
            SseLine::Skip
        );
    }

    #[test]
    fn unreachable_server_is_a_backend_error() {
        let backend = OpenAiBackend::new(
            OpenAiConfig::new("sk-test")
                .with_base_url("http://127.0.0.1:9")
                .with_timeout(Duration::from_secs(2)),
        )
        .unwrap();
        let err = backend
            .generate(&request(None), &mut thnk_core::application::ports::NoopObserver)
            .unwrap_err();
        assert!(matches!(
            err,
            ThnkError::Application(ApplicationError::Backend { .. })
        ));
    }
}
