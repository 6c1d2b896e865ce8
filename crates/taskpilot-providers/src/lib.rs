//! Provider adapters for hosted text-completion services.
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        reason = "Test allows"
    )
)]

/// OpenAI-compatible chat-completions provider (OpenAI, GitHub Models, Azure AI Inference).
pub mod chat_completions;
/// Mock provider for tests and offline runs.
pub mod mock;

pub use chat_completions::ChatCompletionsProvider;
pub use mock::MockProvider;
