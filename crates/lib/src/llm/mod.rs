//! Generative-text abstraction and Gemini client.
//!
//! Triage, grounded answers, and rephrasing all go through the `TextGenerator`
//! seam: one prompt in, one completion out. Tests substitute deterministic stubs.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;

/// Errors from a generative-text call.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("llm request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("llm api error: {0}")]
    Api(String),
    #[error("llm returned no text")]
    Empty,
    #[error("llm api key not configured")]
    Unconfigured,
}

/// Prompt-in, completion-out seam over the generative backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
