//! Scenario, step and input row definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::values::{StringMap, deserialize_string_map};

/// The phase a step belongs to within a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Runs once, before any input row.
    Pre,
    /// Runs once per input row.
    Main,
    /// Runs once, after every input row.
    Post,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pre => "pre",
            Self::Main => "main",
            Self::Post => "post",
        };
        f.write_str(label)
    }
}

/// Discriminator selecting the concrete step implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    /// An HTTP request followed by assertions and captures.
    #[default]
    Http,
}

/// One declared step of a scenario.
///
/// `reference` points at the step-type specific definition; for HTTP steps
/// that is the request template document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepSpec {
    /// Identifier, unique across every phase of the scenario.
    #[serde(default)]
    pub id: String,
    /// Display name, unique across every phase of the scenario.
    #[serde(default)]
    pub name: String,
    /// Location of the detailed step definition.
    #[serde(default, rename = "ref")]
    pub reference: String,
    /// Step implementation to use.
    #[serde(default, rename = "type")]
    pub kind: StepKind,
}

impl StepSpec {
    /// Creates an HTTP step specification.
    pub fn http(
        id: impl Into<String>,
        name: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            reference: reference.into(),
            kind: StepKind::Http,
        }
    }
}

/// One set of column values driving a repetition of the main steps.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputRow {
    /// Optional display name, unique within the scenario when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Column name to resolved value.
    #[serde(default, deserialize_with = "deserialize_string_map")]
    pub data: StringMap,
}

impl InputRow {
    /// Creates an unnamed row without values.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a named row without values.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            data: StringMap::new(),
        }
    }

    /// Adds a column value.
    #[must_use]
    pub fn with_value(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(column.into(), value.into());
        self
    }

    /// Returns the value of a column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.data.get(column).map(String::as_str)
    }
}

/// A complete scenario document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSpec {
    /// Steps run once before the input rows.
    #[serde(default)]
    pub pre_steps: Vec<StepSpec>,
    /// Steps run once per input row.
    #[serde(default)]
    pub steps: Vec<StepSpec>,
    /// Steps run once after the input rows.
    #[serde(default)]
    pub post_steps: Vec<StepSpec>,
    /// Configuration embedded in the scenario (lowest precedence).
    #[serde(default, deserialize_with = "deserialize_string_map")]
    pub configs: StringMap,
    /// Declared input rows.
    #[serde(default)]
    pub inputs: Vec<InputRow>,
}

impl ScenarioSpec {
    /// Returns the steps of a phase.
    #[must_use]
    pub fn steps_for(&self, phase: Phase) -> &[StepSpec] {
        match phase {
            Phase::Pre => &self.pre_steps,
            Phase::Main => &self.steps,
            Phase::Post => &self.post_steps,
        }
    }

    /// Iterates every step of every phase in execution order.
    pub fn all_steps(&self) -> impl Iterator<Item = (Phase, &StepSpec)> {
        [Phase::Pre, Phase::Main, Phase::Post]
            .into_iter()
            .flat_map(move |phase| self.steps_for(phase).iter().map(move |step| (phase, step)))
    }
}
