use crate::history::Turn;
use async_trait::async_trait;
use std::time::Duration;

/// Named generation options forwarded with every completion request.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// Sampling temperature, 0–1.
    pub temperature: f32,
    /// Upper bound on tokens in the completion.
    pub max_tokens: u32,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2000,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Ways a completion call can fail.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// Timeout, connection failure or any other transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The endpoint answered with a non-success status.
    #[error("endpoint returned status {status}: {body}")]
    Api { status: u16, body: String },
    /// The endpoint answered 200 but the body was not a usable completion.
    #[error("malformed completion response: {0}")]
    Malformed(String),
}

/// Common interface for chat-completion backends.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Request a single completion for the given prompt sequence. The
    /// turns are mapped onto the backend's message schema in order.
    async fn complete(
        &self,
        turns: &[Turn],
        options: &GenerationOptions,
    ) -> Result<String, CompletionError>;
}
