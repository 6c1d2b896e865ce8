//! Final report assembly.

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use taskpilot_core::{Error, ExecutionOutcome, ExecutionPlan, ExecutionResult, PlanSource};

/// Turns an executed plan into an `ExecutionResult` with a readable summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultReporter;

impl ResultReporter {
    /// Create a new reporter
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Builds the final result. Success means no errors were recorded.
    pub fn report(
        &self,
        plan: ExecutionPlan,
        outcome: ExecutionOutcome,
        started_at: Instant,
        dry_run: bool,
    ) -> ExecutionResult {
        let duration = format_duration(started_at.elapsed());
        let success = outcome.errors.is_empty();
        let fallback_used = plan.is_fallback();
        let final_output = render(&plan, &outcome, success, dry_run, &duration);

        tracing::info!(
            "Run finished in {duration}: {} phases, {} errors",
            outcome.completed_phases.len(),
            outcome.errors.len()
        );

        ExecutionResult {
            success,
            plan,
            completed_phases: outcome.completed_phases,
            final_output,
            duration,
            errors: outcome.errors,
            fallback_used,
            dry_run,
        }
    }
}

/// Report for a run that stopped before any phase executed.
#[must_use]
pub fn fatal_report(error: &Error) -> String {
    format!("Task aborted: nothing was executed.\nReason: {error}")
}

/// Milliseconds below one second, seconds with two decimals above.
#[must_use]
pub fn format_duration(elapsed: Duration) -> String {
    if elapsed < Duration::from_secs(1) {
        format!("{}ms", elapsed.as_millis())
    } else {
        format!("{:.2}s", elapsed.as_secs_f64())
    }
}

fn render(
    plan: &ExecutionPlan,
    outcome: &ExecutionOutcome,
    success: bool,
    dry_run: bool,
    duration: &str,
) -> String {
    let mut output = String::new();
    let total = outcome.completed_phases.len();

    if total == 0 {
        writeln!(output, "Task completed: no phases executed ({duration})").unwrap_or(());
        return output;
    }

    if success {
        writeln!(output, "Task completed successfully in {duration}").unwrap_or(());
    } else {
        writeln!(
            output,
            "Task finished with errors: {} of {total} phases succeeded, {} failed ({duration})",
            outcome.succeeded_phases().count(),
            outcome.failed_phases().count()
        )
        .unwrap_or(());
    }

    if dry_run {
        writeln!(output, "Dry run: no files were changed.").unwrap_or(());
    }
    match &plan.source {
        PlanSource::Fallback { reason } => {
            writeln!(output, "Note: default plan used because {reason}.").unwrap_or(());
        }
        PlanSource::Model { provider } => {
            writeln!(output, "Plan source: {provider}").unwrap_or(());
        }
        PlanSource::RuleBased => {
            writeln!(output, "Plan source: rule-based").unwrap_or(());
        }
    }

    for (index, phase) in outcome.completed_phases.iter().enumerate() {
        writeln!(
            output,
            "\nPhase {}: {} [{}]\n  {}",
            index + 1,
            phase.name,
            phase.status,
            phase.description
        )
        .unwrap_or(());
        if let Some(result) = phase.output.as_deref().or(phase.error.as_deref()) {
            writeln!(output, "  -> {result}").unwrap_or(());
        }
    }

    if !outcome.errors.is_empty() {
        writeln!(output, "\nErrors:").unwrap_or(());
        for error in &outcome.errors {
            writeln!(output, "  - {error}").unwrap_or(());
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskpilot_core::Phase;

    fn outcome_for(plan: &ExecutionPlan, failed: &[usize]) -> ExecutionOutcome {
        let mut outcome = ExecutionOutcome::default();
        for (index, phase) in plan.phases.iter().enumerate() {
            let mut phase = phase.clone();
            phase.start();
            if failed.contains(&index) {
                let error = format!("Phase '{}' failed: boom", phase.name);
                outcome.errors.push(error.clone());
                phase.fail(error);
            } else {
                phase.complete(format!("did {}", phase.name));
            }
            outcome.completed_phases.push(phase);
        }
        outcome
    }

    #[test]
    fn test_success_report() {
        let plan = ExecutionPlan::new(
            vec![Phase::new("Analyze", "Look"), Phase::new("Validate", "Check")],
            PlanSource::Model {
                provider: "mock".to_owned(),
            },
        );
        let outcome = outcome_for(&plan, &[]);
        assert_eq!(outcome.succeeded_phases().count(), 2);
        let result = ResultReporter::new().report(plan, outcome, Instant::now(), true);

        assert!(result.success);
        assert!(result.errors.is_empty());
        assert!(!result.fallback_used);
        assert!(result.dry_run);
        assert!(result.final_output.starts_with("Task completed successfully"));
        assert!(result.final_output.contains("Dry run: no files were changed."));
        assert!(result.final_output.contains("Phase 2: Validate"));
        assert!(!result.final_output.contains("Errors:"));
    }

    #[test]
    fn test_partial_failure_report() {
        let plan = ExecutionPlan::fallback("model request failed: Timeout after 10ms");
        let outcome = outcome_for(&plan, &[1]);
        assert_eq!(outcome.failed_phases().count(), 1);
        let result = ResultReporter::new().report(plan, outcome, Instant::now(), false);

        assert!(!result.success);
        assert!(result.fallback_used);
        assert_eq!(result.errors.len(), 1);
        assert!(
            result
                .final_output
                .starts_with("Task finished with errors: 3 of 4 phases succeeded, 1 failed")
        );
        assert!(result.final_output.contains("default plan used because model request failed"));
        assert!(result.final_output.contains("Errors:\n  - Phase 'Plan' failed: boom"));
    }

    #[test]
    fn test_zero_phases() {
        let plan = ExecutionPlan::new(Vec::new(), PlanSource::RuleBased);
        let result = ResultReporter::new().report(
            plan,
            ExecutionOutcome::default(),
            Instant::now(),
            false,
        );
        assert!(result.success);
        assert!(result.final_output.contains("no phases executed"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(42)), "42ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    }

    #[test]
    fn test_fatal_report() {
        let report = fatal_report(&Error::Interpretation("no action".to_owned()));
        assert!(report.starts_with("Task aborted: nothing was executed."));
        assert!(report.contains("no action"));
    }
}
