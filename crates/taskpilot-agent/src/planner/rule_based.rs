use async_trait::async_trait;
use taskpilot_core::{
    Action, ContextSnapshot, ExecutionPlan, Phase, PlanSource, Result, TaskDescriptor,
};

use super::Planner;

/// Builds a fixed plan from the task's action without any network access.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedPlanner;

impl RuleBasedPlanner {
    /// Create a new rule-based planner
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// The two action-specific phases placed between analysis and validation.
    fn core_phases(action: Action) -> [(&'static str, &'static str); 2] {
        match action {
            Action::Organize => [
                ("Group", "Decide which files belong together and where they should live"),
                ("Restructure", "Relocate files into the agreed layout"),
            ],
            Action::Refactor => [
                ("Identify", "Locate duplication and unclear structure"),
                ("Restructure", "Reshape the code while keeping behavior unchanged"),
            ],
            Action::Upgrade => [
                ("Inventory", "List dependencies and toolchain versions in use"),
                ("Update", "Move each dependency to a supported version"),
            ],
            Action::Analyze => [
                ("Inspect", "Read the key files and note structure and hotspots"),
                ("Summarize", "Write down findings and recommendations"),
            ],
            Action::Test => [
                ("Find gaps", "Identify behavior without test coverage"),
                ("Write tests", "Add tests for the uncovered behavior"),
            ],
            Action::Document => [
                ("Outline", "Decide which topics the documentation must cover"),
                ("Write", "Write or update the documentation"),
            ],
            Action::Fix => [
                ("Reproduce", "Pin down the failing behavior"),
                ("Repair", "Change the code so the failure no longer occurs"),
            ],
            Action::Optimize => [
                ("Measure", "Find where time or memory is spent"),
                ("Tune", "Apply targeted improvements to the hot spots"),
            ],
            Action::Secure => [
                ("Audit", "Look for secrets, unsafe inputs, and outdated dependencies"),
                ("Harden", "Remove the weaknesses found during the audit"),
            ],
        }
    }
}

#[async_trait]
impl Planner for RuleBasedPlanner {
    fn name(&self) -> &'static str {
        "rule_based"
    }

    async fn plan(
        &self,
        task: &TaskDescriptor,
        snapshot: &ContextSnapshot,
    ) -> Result<ExecutionPlan> {
        let mut phases = vec![Phase::new(
            "Analyze",
            format!(
                "Review {} files under {} with the goal to {}",
                snapshot.file_count(),
                task.target.display(),
                task.goal
            ),
        )];

        phases.extend(
            Self::core_phases(task.action)
                .iter()
                .map(|(name, description)| Phase::new(*name, *description)),
        );

        let mut validation = format!("Confirm the result meets the goal: {}", task.goal);
        if !task.constraints.is_empty() {
            validation.push_str(&format!(
                " while respecting: {}",
                task.constraints.join("; ")
            ));
        }
        phases.push(Phase::new("Validate", validation));

        tracing::debug!(
            "Rule-based plan for {} has {} phases",
            task.action,
            phases.len()
        );

        Ok(ExecutionPlan::new(phases, PlanSource::RuleBased))
    }
}
