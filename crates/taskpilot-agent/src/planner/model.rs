use std::sync::Arc;

use async_trait::async_trait;
use taskpilot_core::prompts::{load_prompt, render};
use taskpilot_core::{
    Context, ContextSnapshot, Error, ExecutionPlan, ModelProvider, PlanSource, Query, Response,
    Result, TaskDescriptor,
};
use tokio::time::{sleep, timeout};

use super::parse::parse_phases;
use super::{Planner, PlannerSettings};

/// Asks a hosted model for a plan, retrying transient failures.
///
/// When the model cannot deliver a usable plan the default plan is
/// substituted, unless fallback is disabled, in which case planning fails.
pub struct ModelPlanner {
    /// Completion service
    provider: Arc<dyn ModelProvider>,
    /// Retry and fallback policy
    settings: PlannerSettings,
}

impl ModelPlanner {
    /// Creates a planner over `provider` with the given policy.
    pub fn new(provider: Arc<dyn ModelProvider>, settings: PlannerSettings) -> Self {
        Self { provider, settings }
    }

    /// Renders the planning prompt for a task and its context.
    ///
    /// # Errors
    /// Returns an error if the embedded prompt cannot be loaded.
    pub fn build_query(&self, task: &TaskDescriptor, snapshot: &ContextSnapshot) -> Result<Query> {
        let template = load_prompt("task_planning")?;
        let constraints = if task.constraints.is_empty() {
            "- none".to_owned()
        } else {
            task.constraints
                .iter()
                .map(|constraint| format!("- {constraint}"))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let action = task.action.to_string();
        let target = task.target.display().to_string();
        let priority = task.priority.to_string();
        let context = snapshot.summary(self.settings.max_context_paths);

        Ok(Query::new(render(
            &template,
            &[
                ("action", &action),
                ("target", &target),
                ("goal", &task.goal),
                ("priority", &priority),
                ("constraints", &constraints),
                ("context", &context),
            ],
        )))
    }

    /// One model call bounded by the configured timeout.
    async fn attempt(&self, query: &Query, context: &Context) -> Result<Response> {
        match timeout(self.settings.timeout, self.provider.generate(query, context)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(Error::Timeout(
                self.settings.timeout.as_millis().try_into().unwrap_or(u64::MAX),
            )),
        }
    }

    /// Calls the model until it answers or the retry budget is spent.
    async fn generate_with_retries(&self, query: &Query, context: &Context) -> Result<Response> {
        let attempts = self.settings.max_retries.saturating_add(1);
        let mut retry = 0;

        loop {
            match self.attempt(query, context).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() && retry < self.settings.max_retries => {
                    retry += 1;
                    let delay = self.settings.backoff_for(retry);
                    tracing::warn!(
                        "Planning call to {} failed (attempt {retry}/{attempts}): {err}; retrying in {}ms",
                        self.provider.name(),
                        delay.as_millis()
                    );
                    sleep(delay).await;
                }
                Err(err) => {
                    tracing::error!(
                        "Planning call to {} failed after {} attempt(s): {err}",
                        self.provider.name(),
                        retry + 1
                    );
                    return Err(err);
                }
            }
        }
    }

    /// Substitutes the default plan, or fails when fallback is disabled.
    fn fallback(&self, reason: String) -> Result<ExecutionPlan> {
        if !self.settings.allow_fallback {
            return Err(Error::Planning(reason));
        }
        tracing::warn!("Using default plan: {reason}");
        Ok(ExecutionPlan::fallback(reason))
    }
}

#[async_trait]
impl Planner for ModelPlanner {
    fn name(&self) -> &'static str {
        "model"
    }

    async fn plan(
        &self,
        task: &TaskDescriptor,
        snapshot: &ContextSnapshot,
    ) -> Result<ExecutionPlan> {
        let query = self.build_query(task, snapshot)?;
        let context = Context::new(load_prompt("planner_persona")?);

        if !self.provider.is_available().await {
            return self.fallback(format!("provider {} is not available", self.provider.name()));
        }

        tracing::info!(
            "Requesting plan from {} ({} byte prompt)",
            self.provider.name(),
            query.text.len()
        );

        let response = match self.generate_with_retries(&query, &context).await {
            Ok(response) => response,
            Err(err) => return self.fallback(format!("model request failed: {err}")),
        };

        let phases = parse_phases(&response.text);
        if phases.is_empty() {
            return self.fallback(format!(
                "response from {} contained no recognizable phases",
                response.provider
            ));
        }

        tracing::info!(
            "Model {} proposed {} phases in {}ms ({} tokens)",
            response.provider,
            phases.len(),
            response.latency_ms,
            response.tokens_used.total()
        );

        Ok(ExecutionPlan::new(
            phases,
            PlanSource::Model {
                provider: response.provider,
            },
        ))
    }
}
