//! Execution plans and their phases

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Phases used whenever no usable plan could be obtained.
const DEFAULT_PHASES: [(&str, &str); 4] = [
    (
        "Analyze",
        "Review the target and gather the facts the goal depends on",
    ),
    ("Plan", "Decide on the concrete changes needed to reach the goal"),
    ("Execute", "Carry out the planned changes"),
    ("Validate", "Check that the goal was reached and nothing regressed"),
];

/// Unique identifier for a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanId(Uuid);

impl Default for PlanId {
    fn default() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Status of a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseStatus {
    /// Not started yet
    Pending,
    /// Currently executing
    Running,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
}

impl PhaseStatus {
    /// Whether the phase has reached a final state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(formatter, "⏳ Pending"),
            Self::Running => write!(formatter, "🔄 Running"),
            Self::Completed => write!(formatter, "✅ Completed"),
            Self::Failed => write!(formatter, "❌ Failed"),
        }
    }
}

/// One named unit of work within a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    /// Short phase name
    pub name: String,
    /// What the phase should accomplish
    pub description: String,
    /// Current status
    pub status: PhaseStatus,
    /// Output recorded when the phase finished
    pub output: Option<String>,
    /// Error recorded when the phase failed
    pub error: Option<String>,
}

impl Phase {
    /// Creates a pending phase.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            status: PhaseStatus::Pending,
            output: None,
            error: None,
        }
    }

    /// Marks the phase as running.
    pub fn start(&mut self) {
        self.status = PhaseStatus::Running;
    }

    /// Marks the phase as completed with `output`.
    pub fn complete(&mut self, output: String) {
        self.status = PhaseStatus::Completed;
        self.output = Some(output);
    }

    /// Marks the phase as failed with `error`.
    pub fn fail(&mut self, error: String) {
        self.status = PhaseStatus::Failed;
        self.error = Some(error);
    }
}

/// Where a plan's phases came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanSource {
    /// Parsed from a model response
    Model {
        /// Provider that produced the response
        provider: String,
    },
    /// Produced by the deterministic offline planner
    RuleBased,
    /// Default plan substituted for an unusable or missing response
    Fallback {
        /// Why the default plan was used
        reason: String,
    },
}

/// Ordered phases produced by planning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPlan {
    /// Unique identifier for this plan
    pub id: PlanId,
    /// Phases in execution order
    pub phases: Vec<Phase>,
    /// When the plan was produced
    pub created_at: DateTime<Utc>,
    /// Origin of the phases
    pub source: PlanSource,
}

impl ExecutionPlan {
    /// Creates a plan from phases.
    pub fn new(phases: Vec<Phase>, source: PlanSource) -> Self {
        Self {
            id: PlanId::default(),
            phases,
            created_at: Utc::now(),
            source,
        }
    }

    /// Creates the default `[Analyze, Plan, Execute, Validate]` plan.
    pub fn fallback(reason: impl Into<String>) -> Self {
        let phases = DEFAULT_PHASES
            .iter()
            .map(|(name, description)| Phase::new(*name, *description))
            .collect();
        Self::new(
            phases,
            PlanSource::Fallback {
                reason: reason.into(),
            },
        )
    }

    /// Whether the default plan was substituted.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, PlanSource::Fallback { .. })
    }
}
