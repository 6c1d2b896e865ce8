//! The taskpilot pipeline: natural-language instruction in, executed plan out.
//!
//! - [`interpreter`]: keyword-based parsing into a `TaskDescriptor`
//! - [`planner`]: model-backed or rule-based plan generation
//! - [`executor`]: sequential phase execution with dry-run
//! - [`reporter`]: final result and report text
//! - [`pipeline`]: wires the stages together
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskpilot_agent::{Pipeline, RuleBasedPlanner, RunOptions};
//! use taskpilot_context::ContextGatherer;
//!
//! # async fn example() -> taskpilot_core::Result<()> {
//! let pipeline = Pipeline::new(
//!     Arc::new(ContextGatherer::default()),
//!     Arc::new(RuleBasedPlanner::new()),
//! );
//! let result = pipeline
//!     .run("Organize the codebase with goal to improve maintainability", &RunOptions::default())
//!     .await?;
//! println!("{}", result.final_output);
//! # Ok(())
//! # }
//! ```
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

/// Phase execution
pub mod executor;
/// Instruction parsing
pub mod interpreter;
/// Stage orchestration
pub mod pipeline;
/// Plan generation
pub mod planner;
/// Result assembly
pub mod reporter;

pub use executor::{PhaseAction, PhaseExecutor};
pub use interpreter::TaskInterpreter;
pub use pipeline::{Pipeline, RunOptions};
pub use planner::{ModelPlanner, Planner, PlannerSettings, RuleBasedPlanner, parse_phases};
pub use reporter::{ResultReporter, fatal_report, format_duration};
