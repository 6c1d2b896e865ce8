use std::path::Path;

use async_trait::async_trait;

use crate::{Context, ContextSnapshot, Query, Response, Result};

/// Trait for hosted text-completion services.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Returns the unique identifier for this provider.
    fn name(&self) -> &'static str;

    /// Checks whether this provider is currently available and ready to process requests.
    async fn is_available(&self) -> bool;

    /// Generates a completion for the given query using the provided context.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is unavailable, the request fails,
    /// or the response cannot be parsed.
    async fn generate(&self, query: &Query, context: &Context) -> Result<Response>;
}

/// Read-only source of project context for a target path.
pub trait ContextSource: Send + Sync {
    /// Scans `target` and returns a snapshot of its contents.
    ///
    /// A file target yields a snapshot rooted at its parent directory; the
    /// snapshot's `target` is the directory later phases operate in.
    ///
    /// # Errors
    ///
    /// Returns an error if the target itself is missing or unreadable.
    fn gather(&self, target: &Path) -> Result<ContextSnapshot>;
}
