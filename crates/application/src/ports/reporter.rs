//! Reporter port

use crate::scenario::{RunSummary, StepOutcome};

/// Receives the progress of a scenario run.
///
/// Calls arrive in order: `scenario_started`, then for each group
/// `group_started`, one `step_finished` per executed step and
/// `group_finished`, and finally `scenario_finished`.
pub trait Reporter {
    /// A run is about to start.
    fn scenario_started(&mut self, _title: &str, _planned_steps: usize) {}

    /// A group of steps is about to run.
    fn group_started(&mut self, _label: &str) {}

    /// A step finished, successfully or not.
    fn step_finished(&mut self, outcome: &StepOutcome);

    /// Every step of the group ran, or the run was stopped inside it.
    fn group_finished(&mut self, _label: &str) {}

    /// The run is over.
    fn scenario_finished(&mut self, _summary: &RunSummary) {}
}
