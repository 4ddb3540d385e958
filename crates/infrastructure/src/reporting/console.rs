//! Console reporter: one log line per step and a closing summary.

use apiflow_application::ports::Reporter;
use apiflow_application::scenario::{RunSummary, StepOutcome, StepStatus};
use tracing::{error, info};

/// Reports progress through `tracing`.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    title: String,
}

impl ConsoleReporter {
    /// Creates a console reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for ConsoleReporter {
    fn scenario_started(&mut self, title: &str, planned_steps: usize) {
        self.title = title.to_string();
        info!(scenario = %title, steps = planned_steps, "Starting scenario");
    }

    fn group_started(&mut self, label: &str) {
        info!(group = %label, "Running group");
    }

    fn step_finished(&mut self, outcome: &StepOutcome) {
        let elapsed_ms = outcome.duration.as_millis();
        match outcome.status {
            StepStatus::Passed => info!(
                group = %outcome.group,
                step = %outcome.step_name,
                elapsed_ms,
                "PASS"
            ),
            StepStatus::Failed => error!(
                group = %outcome.group,
                step = %outcome.step_name,
                elapsed_ms,
                error = outcome.error.as_deref().unwrap_or("unknown error"),
                "FAIL"
            ),
        }
    }

    fn scenario_finished(&mut self, summary: &RunSummary) {
        let line = format!(
            "{} passed, {} failed, {} skipped in {}ms",
            summary.passed,
            summary.failed,
            summary.skipped,
            summary.duration.as_millis()
        );
        if summary.success() {
            info!(scenario = %self.title, "{line}");
        } else {
            error!(scenario = %self.title, "{line}");
        }
    }
}
