//! Request and response types exchanged with model providers.

use serde::{Deserialize, Serialize};

/// A single prompt sent to a model provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// User-facing prompt text
    pub text: String,
}

impl Query {
    /// Creates a query from prompt text.
    pub fn new<T: Into<String>>(text: T) -> Self {
        Self { text: text.into() }
    }
}

/// Conversation framing for a query: the persona preamble sent as the system message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// System prompt (persona preamble)
    pub system_prompt: String,
}

impl Context {
    /// Creates a context with the given system prompt.
    pub fn new<T: Into<String>>(system_prompt: T) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }
}

/// Completion returned by a model provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Completion text
    pub text: String,
    /// Token accounting reported by the service
    pub tokens_used: TokenUsage,
    /// Name of the provider that produced the response
    pub provider: String,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Token accounting for a single completion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Prompt tokens
    pub input: u64,
    /// Completion tokens
    pub output: u64,
}

impl TokenUsage {
    /// Total tokens billed.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.input + self.output
    }
}
