//! Execution plan: the ordered groups of steps a scenario runs.

use apiflow_domain::{InputRow, Phase, ScenarioSpec, StepSpec};

/// Label of the pre-step group.
pub const PRE_STEPS_LABEL: &str = "Pre Steps";
/// Label of the post-step group.
pub const POST_STEPS_LABEL: &str = "Post Steps";
/// Label of a main-step group, followed by `": <row name>"` for named rows.
pub const SCENARIO_LABEL: &str = "Scenario";

/// One step invocation in the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    /// Phase of the step.
    pub phase: Phase,
    /// Index of the input row for main steps.
    pub row: Option<usize>,
    /// The step declaration.
    pub spec: StepSpec,
}

/// A labelled group of step invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepGroup {
    /// Report label.
    pub label: String,
    /// Phase of every step in the group.
    pub phase: Phase,
    /// Steps in execution order.
    pub steps: Vec<PlannedStep>,
}

/// Builds the groups for `spec` over `rows`: pre-steps once, main steps
/// once per row, post-steps once. Empty pre and post groups are left out.
#[must_use]
pub fn build_plan(spec: &ScenarioSpec, rows: &[InputRow]) -> Vec<StepGroup> {
    let planned = |phase: Phase, row: Option<usize>| -> Vec<PlannedStep> {
        spec.steps_for(phase)
            .iter()
            .map(|step| PlannedStep {
                phase,
                row,
                spec: step.clone(),
            })
            .collect()
    };

    let mut groups = Vec::with_capacity(rows.len() + 2);
    if !spec.pre_steps.is_empty() {
        groups.push(StepGroup {
            label: PRE_STEPS_LABEL.to_string(),
            phase: Phase::Pre,
            steps: planned(Phase::Pre, None),
        });
    }
    for (index, row) in rows.iter().enumerate() {
        groups.push(StepGroup {
            label: scenario_label(row),
            phase: Phase::Main,
            steps: planned(Phase::Main, Some(index)),
        });
    }
    if !spec.post_steps.is_empty() {
        groups.push(StepGroup {
            label: POST_STEPS_LABEL.to_string(),
            phase: Phase::Post,
            steps: planned(Phase::Post, None),
        });
    }
    groups
}

/// `"Scenario"` or `"Scenario: <row name>"`.
#[must_use]
pub fn scenario_label(row: &InputRow) -> String {
    match row.name.as_deref() {
        Some(name) => format!("{SCENARIO_LABEL}: {name}"),
        None => SCENARIO_LABEL.to_string(),
    }
}
