//! Plan generation.
//!
//! A [`Planner`] turns a task descriptor and a context snapshot into an
//! ordered [`ExecutionPlan`]. [`ModelPlanner`] asks a hosted model and falls
//! back to the default plan when the model cannot deliver; [`RuleBasedPlanner`]
//! builds a plan offline from the action alone.

use std::time::Duration;

use async_trait::async_trait;
use taskpilot_core::{ContextSnapshot, ExecutionPlan, PilotConfig, Result, TaskDescriptor};

/// Model-backed planning with retries and fallback
pub mod model;
/// Phase extraction from model responses
pub mod parse;
/// Deterministic offline planning
pub mod rule_based;

pub use model::ModelPlanner;
pub use parse::parse_phases;
pub use rule_based::RuleBasedPlanner;

/// Produces an execution plan for a task.
#[async_trait]
pub trait Planner: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Builds a plan for `task` using the gathered `snapshot`.
    ///
    /// # Errors
    /// Returns `Error::Planning` when no plan can be produced and fallback is disabled.
    async fn plan(&self, task: &TaskDescriptor, snapshot: &ContextSnapshot)
    -> Result<ExecutionPlan>;
}

/// Retry, timeout, and fallback policy for model planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerSettings {
    /// Limit for a single model call
    pub timeout: Duration,
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry
    pub backoff: Duration,
    /// Substitute the default plan instead of failing
    pub allow_fallback: bool,
    /// Paths listed in the prompt's context summary
    pub max_context_paths: usize,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self::from_config(&PilotConfig::default())
    }
}

impl PlannerSettings {
    /// Reads the policy from configuration.
    #[must_use]
    pub fn from_config(config: &PilotConfig) -> Self {
        Self {
            timeout: config.provider.timeout(),
            max_retries: config.provider.max_retries,
            backoff: config.provider.retry_backoff(),
            allow_fallback: config.planning.allow_fallback,
            max_context_paths: 40,
        }
    }

    /// Delay before retry number `retry` (1-based).
    #[must_use]
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 1_u32
            .checked_shl(retry.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.backoff.saturating_mul(factor)
    }
}
