//! Scenario harness.
//!
//! Pulls steps from a [`Scenario`]'s plan, feeds the outcomes to reporters
//! and decides when to stop.

use std::time::Instant;

use apiflow_application::ports::Reporter;
use apiflow_application::scenario::{RunSummary, Scenario};
use tracing::debug;

/// Runs a scenario's plan against a set of reporters.
#[derive(Debug, Default)]
pub struct Harness {
    /// Whether to stop on first failure.
    stop_on_failure: bool,
}

impl Harness {
    /// Create a harness that runs every planned step.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stop_on_failure: false,
        }
    }

    /// Set whether to stop on first failure.
    #[must_use]
    pub const fn with_stop_on_failure(mut self, stop: bool) -> Self {
        self.stop_on_failure = stop;
        self
    }

    /// Runs `scenario` and returns its totals.
    ///
    /// Steps left behind after a stop are counted as skipped; their groups
    /// are never announced.
    pub fn run(
        &self,
        scenario: &mut Scenario,
        title: &str,
        reporters: &mut [&mut dyn Reporter],
    ) -> RunSummary {
        let start = Instant::now();
        let planned = scenario.planned_steps();
        let groups = scenario.plan().to_vec();
        let mut summary = RunSummary::default();

        for reporter in reporters.iter_mut() {
            reporter.scenario_started(title, planned);
        }

        'groups: for group in &groups {
            for reporter in reporters.iter_mut() {
                reporter.group_started(&group.label);
            }

            for step in &group.steps {
                let outcome = scenario.execute(step);
                summary.record(&outcome);
                for reporter in reporters.iter_mut() {
                    reporter.step_finished(&outcome);
                }

                if !outcome.passed() && self.stop_on_failure {
                    debug!(step = %outcome.step_id, "Stopping after failed step");
                    for reporter in reporters.iter_mut() {
                        reporter.group_finished(&group.label);
                    }
                    break 'groups;
                }
            }

            for reporter in reporters.iter_mut() {
                reporter.group_finished(&group.label);
            }
        }

        summary.skipped = planned.saturating_sub(summary.executed());
        summary.duration = start.elapsed();
        for reporter in reporters.iter_mut() {
            reporter.scenario_finished(&summary);
        }
        summary
    }
}
