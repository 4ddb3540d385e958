//! Structural checks run before anything executes.

use std::collections::HashSet;

use apiflow_domain::{InputRow, ScenarioSpec};

use crate::error::{ApplicationResult, ConfigurationError};

/// Checks that every step has an id, a name and a reference, that ids and
/// names are unique across all phases, and that row names are unique.
///
/// Presence is checked for every step before uniqueness.
///
/// # Errors
///
/// Returns the first violation found.
pub fn validate(spec: &ScenarioSpec, rows: &[InputRow]) -> ApplicationResult<()> {
    for (phase, step) in spec.all_steps() {
        if step.id.trim().is_empty() {
            return Err(ConfigurationError::MissingStepId {
                phase: phase.to_string(),
                name: step.name.clone(),
            });
        }
        if step.name.trim().is_empty() {
            return Err(ConfigurationError::MissingStepName {
                id: step.id.clone(),
            });
        }
        if step.reference.trim().is_empty() {
            return Err(ConfigurationError::MissingStepReference {
                id: step.id.clone(),
            });
        }
    }

    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    for (_, step) in spec.all_steps() {
        if !ids.insert(step.id.as_str()) {
            return Err(ConfigurationError::DuplicateStepId(step.id.clone()));
        }
        if !names.insert(step.name.as_str()) {
            return Err(ConfigurationError::DuplicateStepName(step.name.clone()));
        }
    }

    let mut row_names = HashSet::new();
    for name in rows.iter().filter_map(|row| row.name.as_deref()) {
        if !row_names.insert(name) {
            return Err(ConfigurationError::DuplicateInputName(name.to_string()));
        }
    }

    Ok(())
}
