//! Completion service boundary.
//!
//! The spec generator never constructs a client on its own; it receives an
//! `Arc<dyn CompletionService>` so tests can substitute canned responses.

/// Environment-driven client configuration.
pub mod config;
/// OpenAI-compatible chat completions client.
pub mod openai;
/// Bounded retry with exponential backoff.
pub mod retry;

use crate::foundation::error::FlowResult;

/// One request to a text-understanding service.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instruction.
    pub system: String,
    /// User message (instruction template plus article text).
    pub user: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Ask the service to respond with a JSON object only.
    pub json_only: bool,
}

/// A service that turns a prompt into completion text.
pub trait CompletionService: Send + Sync {
    /// Perform one completion call and return the raw message content.
    fn complete(&self, req: &CompletionRequest) -> FlowResult<String>;
}
