//! Mock provider for testing planning without real API calls.
//!
//! Returns canned responses for matching prompts and can be told to fail or
//! stall, so retry, timeout, and fallback paths can be exercised offline.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use taskpilot_core::{
    Context, Error, IgnoreLock as _, ModelProvider, Query, Response, Result, TokenUsage,
};
use tokio::time::sleep;

/// Response storage type
type ResponseMap = Arc<Mutex<HashMap<String, String>>>;

/// How the mock fails before answering.
#[derive(Debug, Clone, Default)]
struct FailurePlan {
    /// Calls left to fail; `None` fails forever
    remaining: Option<usize>,
    /// Error message used for failures
    message: Option<String>,
    /// HTTP status to report instead of a plain provider error
    status: Option<u16>,
}

/// Mock provider that returns pre-defined responses based on prompt patterns.
#[derive(Clone, Default)]
pub struct MockProvider {
    /// Predefined responses keyed by prompt substring
    responses: ResponseMap,
    /// Default response if no match found
    default_response: Arc<Mutex<Option<String>>>,
    /// Injected failures
    failures: Arc<Mutex<FailurePlan>>,
    /// Artificial latency per call
    delay: Option<Duration>,
    /// Call history for verification
    call_history: Arc<Mutex<Vec<String>>>,
    /// Report the provider as unavailable
    unavailable: bool,
}

impl MockProvider {
    /// Create a new mock provider with no canned responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pattern-based response to the mock provider.
    #[must_use]
    pub fn with_response(self, pattern: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses
            .lock_ignore_poison()
            .insert(pattern.into(), response.into());
        self
    }

    /// Set a default response for prompts that don't match any pattern.
    #[must_use]
    pub fn with_default_response(self, response: impl Into<String>) -> Self {
        *self.default_response.lock_ignore_poison() = Some(response.into());
        self
    }

    /// Fail every call with a provider error.
    #[must_use]
    pub fn with_error(self, message: impl Into<String>) -> Self {
        *self.failures.lock_ignore_poison() = FailurePlan {
            remaining: None,
            message: Some(message.into()),
            status: None,
        };
        self
    }

    /// Fail every call as if the service answered with HTTP `status`.
    #[must_use]
    pub fn with_status_error(self, status: u16, message: impl Into<String>) -> Self {
        *self.failures.lock_ignore_poison() = FailurePlan {
            remaining: None,
            message: Some(message.into()),
            status: Some(status),
        };
        self
    }

    /// Fail the first `count` calls with a provider error, then answer normally.
    #[must_use]
    pub fn with_transient_failures(self, count: usize) -> Self {
        *self.failures.lock_ignore_poison() = FailurePlan {
            remaining: Some(count),
            message: Some("transient failure".to_owned()),
            status: None,
        };
        self
    }

    /// Sleep for `delay` before answering each call.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Report the provider as unavailable, as a service without credentials would.
    #[must_use]
    pub fn with_unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Get the call history (list of all prompts received).
    #[must_use]
    pub fn get_call_history(&self) -> Vec<String> {
        self.call_history.lock_ignore_poison().clone()
    }

    /// Get the number of calls made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.call_history.lock_ignore_poison().len()
    }

    /// Returns the failure to report for this call, if any.
    fn take_failure(&self) -> Option<Error> {
        let mut failures = self.failures.lock_ignore_poison();
        let message = failures.message.clone()?;
        match failures.remaining {
            None => {}
            Some(0) => return None,
            Some(count) => failures.remaining = Some(count - 1),
        }
        Some(match failures.status {
            Some(status) => Error::ProviderStatus {
                provider: self.name().to_owned(),
                status,
                message,
            },
            None => Error::Provider(message),
        })
    }

    /// Find a matching response for the given prompt text.
    fn find_response(&self, query_text: &str) -> Option<String> {
        let responses = self.responses.lock_ignore_poison();

        if let Some(response) = responses.get(query_text) {
            return Some(response.clone());
        }

        // Longest pattern wins so overlapping patterns resolve deterministically
        responses
            .iter()
            .filter(|(pattern, _)| query_text.contains(pattern.as_str()))
            .max_by_key(|(pattern, _)| pattern.len())
            .map(|(_, response)| response.clone())
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn is_available(&self) -> bool {
        !self.unavailable
    }

    async fn generate(&self, query: &Query, _context: &Context) -> Result<Response> {
        self.call_history
            .lock_ignore_poison()
            .push(query.text.clone());

        if let Some(delay) = self.delay {
            sleep(delay).await;
        }

        if let Some(error) = self.take_failure() {
            return Err(error);
        }

        let text = self.find_response(&query.text).unwrap_or_else(|| {
            self.default_response
                .lock_ignore_poison()
                .clone()
                .unwrap_or_else(|| format!("Mock response for query: {}", query.text))
        });

        Ok(Response {
            text,
            tokens_used: TokenUsage {
                input: query.text.len() as u64,
                output: 0,
            },
            provider: self.name().to_owned(),
            latency_ms: 0,
        })
    }
}
