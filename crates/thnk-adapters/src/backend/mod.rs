//! Generation backend adapters.

mod echo;
mod openai;

pub use echo::EchoBackend;
pub use openai::{DEFAULT_BASE_URL, OpenAiBackend, OpenAiConfig};
