//! Load scenario use case
//!
//! Reads the scenario document, merges its configuration layers and
//! attaches the input rows of an optional table.

use std::sync::Arc;

use apiflow_domain::{ConfigSource, InputRow, RunConfiguration, RunSpec, ScenarioSpec};
use tracing::{debug, info};

use crate::builtins::BuiltinVariables;
use crate::context::VariableContext;
use crate::error::{ApplicationResult, ConfigurationError};
use crate::ports::{DocumentSource, DynamicValueProvider, InputTable};

/// Header of the column that names input rows.
pub const NAME_COLUMN: &str = "#Name#";

/// A scenario ready to be run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadScenarioOutput {
    /// The declaration, with table rows in place of embedded inputs.
    pub spec: ScenarioSpec,
    /// The merged configuration.
    pub config: RunConfiguration,
}

/// Loads a scenario and everything it is run with.
pub struct LoadScenario {
    documents: Arc<dyn DocumentSource>,
    dynamic: Arc<dyn DynamicValueProvider>,
}

impl LoadScenario {
    /// Creates the use case with the built-in dynamic values.
    #[must_use]
    pub fn new(documents: Arc<dyn DocumentSource>) -> Self {
        Self {
            documents,
            dynamic: Arc::new(BuiltinVariables),
        }
    }

    /// Replaces the provider used when resolving table cells.
    #[must_use]
    pub fn with_dynamic_values(mut self, provider: Arc<dyn DynamicValueProvider>) -> Self {
        self.dynamic = provider;
        self
    }

    /// Executes the use case.
    ///
    /// Configuration precedence, lowest first: values embedded in the
    /// scenario, each config file in the order given, then `run.overrides`.
    ///
    /// # Errors
    ///
    /// Returns an error if a document cannot be read or decoded, or if the
    /// input table is malformed.
    pub fn execute(&self, run: &RunSpec) -> ApplicationResult<LoadScenarioOutput> {
        let text = self.documents.read_text(&run.scenario_file)?;
        let mut spec = self.documents.parse_scenario(&run.scenario_file, &text)?;

        let sources = run
            .config_files
            .iter()
            .map(|path| -> ApplicationResult<ConfigSource> {
                let text = self.documents.read_text(path)?;
                let values = self.documents.parse_config(path, &text)?;
                Ok(ConfigSource::new(path.clone(), values))
            })
            .collect::<ApplicationResult<Vec<_>>>()?;
        let config = RunConfiguration::merge(&spec.configs, &sources, &run.overrides);
        debug!(
            sources = sources.len(),
            keys = config.len(),
            "Configuration merged"
        );

        if let Some(path) = &run.input_file {
            let text = self.documents.read_text(path)?;
            let table = self.documents.parse_table(path, &text)?;
            let context = VariableContext::new(Arc::new(config.clone()))
                .with_dynamic_values(Arc::clone(&self.dynamic));
            spec.inputs = rows_from_table(path, &table, &context)?;
            info!(path = %path, rows = spec.inputs.len(), "Loaded input rows");
        }

        Ok(LoadScenarioOutput { spec, config })
    }
}

/// Turns a decoded table into input rows.
///
/// A column named [`NAME_COLUMN`] names each row; without one, or when the
/// cell is blank, rows are named `Case <n>` from 1. Every other cell is
/// resolved against `context`.
///
/// # Errors
///
/// Returns [`ConfigurationError::InvalidInputTable`] if the header is empty,
/// there are no data rows, or a row's width differs from the header's.
pub fn rows_from_table(
    path: &str,
    table: &InputTable,
    context: &VariableContext,
) -> ApplicationResult<Vec<InputRow>> {
    let invalid = |reason: String| ConfigurationError::InvalidInputTable {
        path: path.to_string(),
        reason,
    };

    if table.header.iter().all(|column| column.trim().is_empty()) {
        return Err(invalid("header is empty".to_string()));
    }
    if table.rows.is_empty() {
        return Err(invalid("no data rows".to_string()));
    }

    let name_column = table
        .header
        .iter()
        .position(|column| column.trim() == NAME_COLUMN);

    table
        .rows
        .iter()
        .enumerate()
        .map(|(index, cells)| {
            let number = index + 1;
            if cells.len() != table.header.len() {
                return Err(invalid(format!(
                    "row {number} has {} columns, expected {}",
                    cells.len(),
                    table.header.len()
                )));
            }

            let name = name_column
                .map(|column| cells[column].trim())
                .filter(|name| !name.is_empty())
                .map_or_else(|| format!("Case {number}"), str::to_string);

            let mut row = InputRow::named(name);
            for (column, (header, cell)) in table.header.iter().zip(cells).enumerate() {
                if Some(column) != name_column {
                    row.data.insert(header.trim().to_string(), context.resolve(cell));
                }
            }
            Ok(row)
        })
        .collect()
}
