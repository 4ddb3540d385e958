//! Run configuration and run requests.

use serde::{Deserialize, Serialize};

use crate::values::StringMap;

/// Configuration values loaded from one named source.
///
/// Several sources are layered to form a [`RunConfiguration`].
///
/// # Example
///
/// ```
/// use apiflow_domain::config::ConfigSource;
/// use apiflow_domain::values::StringMap;
///
/// let mut values = StringMap::new();
/// values.insert("env".to_string(), "stage".to_string());
///
/// let source = ConfigSource::new("stage.yaml", values);
/// assert_eq!(source.get("env"), Some("stage"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSource {
    name: String,
    values: StringMap,
}

impl ConfigSource {
    /// Creates a new source.
    pub fn new(name: impl Into<String>, values: StringMap) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Name of the source (typically the file it came from).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The values of this source.
    #[must_use]
    pub const fn values(&self) -> &StringMap {
        &self.values
    }

    /// Gets a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// The merged configuration of one run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunConfiguration {
    values: StringMap,
}

impl RunConfiguration {
    /// Merges configuration layers, lowest precedence first:
    /// scenario-embedded values, then each source in the order given, then
    /// runtime overrides.
    #[must_use]
    pub fn merge(embedded: &StringMap, sources: &[ConfigSource], overrides: &StringMap) -> Self {
        let mut values = embedded.clone();
        for source in sources {
            values.extend(source.values().clone());
        }
        values.extend(overrides.clone());
        Self { values }
    }

    /// Wraps already merged values.
    #[must_use]
    pub const fn from_values(values: StringMap) -> Self {
        Self { values }
    }

    /// Gets a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// All merged values.
    #[must_use]
    pub const fn values(&self) -> &StringMap {
        &self.values
    }

    /// Number of merged keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no value is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Where and how the run report is written.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportSpec {
    /// Output file for the JSON report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Report title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Who ran the scenario.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// Everything needed to start a scenario run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunSpec {
    /// Scenario document location.
    pub scenario_file: String,
    /// Optional input table replacing the scenario's embedded rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_file: Option<String>,
    /// External configuration documents, applied in order.
    #[serde(default)]
    pub config_files: Vec<String>,
    /// Runtime overrides (highest precedence).
    #[serde(default)]
    pub overrides: StringMap,
    /// Report settings.
    #[serde(default)]
    pub report: ReportSpec,
}

impl RunSpec {
    /// Creates a run for the given scenario document.
    pub fn new(scenario_file: impl Into<String>) -> Self {
        Self {
            scenario_file: scenario_file.into(),
            ..Self::default()
        }
    }

    /// Sets the input table document.
    #[must_use]
    pub fn with_input_file(mut self, path: impl Into<String>) -> Self {
        self.input_file = Some(path.into());
        self
    }

    /// Appends an external configuration document.
    #[must_use]
    pub fn with_config_file(mut self, path: impl Into<String>) -> Self {
        self.config_files.push(path.into());
        self
    }

    /// Adds a runtime override.
    #[must_use]
    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Sets the report settings.
    #[must_use]
    pub fn with_report(mut self, report: ReportSpec) -> Self {
        self.report = report;
        self
    }
}
