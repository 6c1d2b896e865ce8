//! Execution outcomes and final results

use serde::{Deserialize, Serialize};

use super::plan::{ExecutionPlan, Phase, PhaseStatus};

/// What the phase executor hands to the reporter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Phases that reached a terminal status, in execution order
    pub completed_phases: Vec<Phase>,
    /// Non-fatal errors collected along the way
    pub errors: Vec<String>,
}

/// Final, immutable result of a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// True when no errors were recorded
    pub success: bool,
    /// Plan as executed, with final phase statuses
    pub plan: ExecutionPlan,
    /// Phases that reached a terminal status
    pub completed_phases: Vec<Phase>,
    /// Human-readable report
    pub final_output: String,
    /// Wall-clock duration of the run
    pub duration: String,
    /// Errors in the order they occurred
    pub errors: Vec<String>,
    /// Whether the default plan was substituted
    pub fallback_used: bool,
    /// Whether the run simulated its effects
    pub dry_run: bool,
}

impl ExecutionOutcome {
    /// Phases that completed successfully.
    pub fn succeeded_phases(&self) -> impl Iterator<Item = &Phase> {
        self.completed_phases
            .iter()
            .filter(|phase| phase.status == PhaseStatus::Completed)
    }

    /// Phases that failed.
    pub fn failed_phases(&self) -> impl Iterator<Item = &Phase> {
        self.completed_phases
            .iter()
            .filter(|phase| phase.status == PhaseStatus::Failed)
    }
}
