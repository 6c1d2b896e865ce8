//! End-to-end orchestration: interpret, gather, plan, execute, report.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use taskpilot_context::ContextGatherer;
use taskpilot_core::{ContextSource, Error, ExecutionResult, PilotConfig, Result};
use taskpilot_providers::ChatCompletionsProvider;

use crate::executor::PhaseExecutor;
use crate::interpreter::TaskInterpreter;
use crate::planner::{ModelPlanner, Planner, PlannerSettings, RuleBasedPlanner};
use crate::reporter::ResultReporter;

/// Per-run options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Simulate effects instead of touching the filesystem
    pub dry_run: bool,
    /// Directory relative targets are resolved against
    pub project_root: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: true,
            project_root: PathBuf::from("."),
        }
    }
}

/// The sequential task pipeline.
///
/// Fatal errors (interpretation, an unreadable target, planning without
/// fallback) are returned as `Err` before anything executes. Phase failures
/// are collected into the returned [`ExecutionResult`].
pub struct Pipeline {
    /// Instruction parser
    interpreter: TaskInterpreter,
    /// Read-only project scanner
    context_source: Arc<dyn ContextSource>,
    /// Plan producer
    planner: Arc<dyn Planner>,
    /// Result assembly
    reporter: ResultReporter,
}

impl Pipeline {
    /// Builds a pipeline from explicit stages.
    pub fn new(context_source: Arc<dyn ContextSource>, planner: Arc<dyn Planner>) -> Self {
        Self {
            interpreter: TaskInterpreter::new(),
            context_source,
            planner,
            reporter: ResultReporter::new(),
        }
    }

    /// Builds the production pipeline from configuration.
    ///
    /// `offline` selects the rule-based planner. A missing API key also selects
    /// it when fallback is allowed.
    ///
    /// # Errors
    /// Returns an error if the provider cannot be configured.
    pub fn from_config(config: &PilotConfig, offline: bool) -> Result<Self> {
        let context_source = Arc::new(ContextGatherer::from_config(&config.context));

        if offline {
            tracing::info!("Offline mode: using rule-based planner");
            return Ok(Self::new(context_source, Arc::new(RuleBasedPlanner::new())));
        }

        let planner: Arc<dyn Planner> = match ChatCompletionsProvider::from_config(&config.provider)
        {
            Ok(provider) => Arc::new(ModelPlanner::new(
                Arc::new(provider),
                PlannerSettings::from_config(config),
            )),
            Err(Error::MissingApiKey(source)) if config.planning.allow_fallback => {
                tracing::warn!("No API key found ({source}); using rule-based planner");
                Arc::new(RuleBasedPlanner::new())
            }
            Err(err) => return Err(err),
        };

        Ok(Self::new(context_source, planner))
    }

    /// Name of the configured planner.
    pub fn planner_name(&self) -> &'static str {
        self.planner.name()
    }

    /// Runs one instruction end to end.
    ///
    /// # Errors
    /// Returns a fatal error when the instruction cannot be interpreted, the
    /// target cannot be read, or planning fails with fallback disabled.
    pub async fn run(&self, instruction: &str, options: &RunOptions) -> Result<ExecutionResult> {
        let started_at = Instant::now();

        let task = self.interpreter.parse(instruction)?;
        tracing::info!(
            "Task: {} {} (goal: {}, priority: {})",
            task.action,
            task.target.display(),
            task.goal,
            task.priority
        );

        let target = resolve_target(&options.project_root, &task.target);
        let snapshot = self.context_source.gather(&target)?;

        let mut plan = self.planner.plan(&task, &snapshot).await?;
        tracing::info!(
            "Plan {} from {} planner has {} phases",
            plan.id,
            self.planner.name(),
            plan.phases.len()
        );

        let executor = PhaseExecutor::new(&snapshot.target);
        tracing::debug!("Executing phases in {}", executor.root().display());
        let outcome = executor.execute(&mut plan, options.dry_run);

        Ok(self
            .reporter
            .report(plan, outcome, started_at, options.dry_run))
    }
}

/// Resolves a task target against the project root.
fn resolve_target(project_root: &Path, target: &Path) -> PathBuf {
    if target.is_absolute() {
        target.to_path_buf()
    } else if target == Path::new(".") {
        project_root.to_path_buf()
    } else {
        project_root.join(target)
    }
}
