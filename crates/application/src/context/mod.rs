//! Variable context
//!
//! Holds everything a template may refer to during one scenario run and
//! resolves `${key}` placeholders against it.
//!
//! Keys are looked up in this order:
//!
//! 1. the dynamic value provider (`${$uuid}`, `${$timestamp}`, ...)
//! 2. step references, `${<stepId>.request <expr>}` and
//!    `${<stepId>.response <expr>}`, evaluated against that step's latest
//!    recorded exchange
//! 3. captured values, `${<stepId>.<captureName>}`
//! 4. the active input row
//! 5. the merged run configuration

mod placeholder;

use std::collections::HashMap;
use std::sync::Arc;

use apiflow_domain::{InputRow, RunConfiguration, StringMap};
use tracing::{debug, warn};

use crate::builtins::BuiltinVariables;
use crate::expression::{Expression, Facet};
use crate::ports::DynamicValueProvider;
use crate::step::StepRecord;

pub use placeholder::{Placeholder, find_placeholders, has_placeholders};

/// Upper bound on substitution rounds for one template.
pub const MAX_RESOLUTION_ROUNDS: usize = 15;

/// Mutable per-run variable state.
#[derive(Clone)]
pub struct VariableContext {
    config: Arc<RunConfiguration>,
    input: InputRow,
    captures: StringMap,
    records: HashMap<String, StepRecord>,
    dynamic: Arc<dyn DynamicValueProvider>,
}

impl std::fmt::Debug for VariableContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariableContext")
            .field("config", &self.config.len())
            .field("input", &self.input.name)
            .field("captures", &self.captures)
            .field("records", &self.records.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl VariableContext {
    /// Creates a context over `config` with the built-in dynamic values and
    /// an empty input row.
    #[must_use]
    pub fn new(config: Arc<RunConfiguration>) -> Self {
        Self {
            config,
            input: InputRow::empty(),
            captures: StringMap::new(),
            records: HashMap::new(),
            dynamic: Arc::new(BuiltinVariables),
        }
    }

    /// Replaces the dynamic value provider.
    #[must_use]
    pub fn with_dynamic_values(mut self, provider: Arc<dyn DynamicValueProvider>) -> Self {
        self.dynamic = provider;
        self
    }

    /// The merged run configuration.
    #[must_use]
    pub fn config(&self) -> &RunConfiguration {
        &self.config
    }

    /// The active input row.
    #[must_use]
    pub const fn input(&self) -> &InputRow {
        &self.input
    }

    /// Swaps in the row for the next repetition.
    pub fn activate_row(&mut self, row: InputRow) {
        debug!(row = row.name.as_deref().unwrap_or("<unnamed>"), "Activating input row");
        self.input = row;
    }

    /// Stores a captured value as `<step_id>.<name>`.
    pub fn capture(&mut self, step_id: &str, name: &str, value: impl Into<String>) {
        self.captures.insert(format!("{step_id}.{name}"), value.into());
    }

    /// Returns a previously captured value.
    #[must_use]
    pub fn captured(&self, step_id: &str, name: &str) -> Option<&str> {
        self.captures
            .get(&format!("{step_id}.{name}"))
            .map(String::as_str)
    }

    /// All captured values keyed as `<stepId>.<name>`.
    #[must_use]
    pub const fn captures(&self) -> &StringMap {
        &self.captures
    }

    /// Records the latest execution state of a step, replacing any earlier one.
    pub fn record(&mut self, step_id: impl Into<String>, record: StepRecord) {
        self.records.insert(step_id.into(), record);
    }

    /// The latest recorded state of a step.
    #[must_use]
    pub fn record_of(&self, step_id: &str) -> Option<&StepRecord> {
        self.records.get(step_id)
    }

    /// Creates an isolated context for one input row.
    ///
    /// The configuration is shared, captures and step records are copied, so
    /// nothing the fork captures is visible to `self` or to other forks.
    #[must_use]
    pub fn fork_for_row(&self, row: InputRow) -> Self {
        let mut fork = self.clone();
        fork.input = row;
        fork
    }

    /// Looks up a single key without placeholder expansion.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<String> {
        let key = key.trim();
        if let Some(value) = self.dynamic.lookup(key) {
            return Some(value);
        }
        if let Some(value) = self.step_reference(key) {
            return value;
        }
        if let Some(value) = self.captures.get(key) {
            return Some(value.clone());
        }
        if let Some(value) = self.input.get(key) {
            return Some(value.to_string());
        }
        self.config.get(key).map(str::to_string)
    }

    /// Resolves every `${key}` placeholder in `template`.
    ///
    /// Substituted values are scanned again, up to
    /// [`MAX_RESOLUTION_ROUNDS`] times. Unresolvable placeholders are logged
    /// and left in place.
    #[must_use]
    pub fn resolve(&self, template: &str) -> String {
        let mut text = template.to_string();

        for round in 0..MAX_RESOLUTION_ROUNDS {
            let placeholders = find_placeholders(&text);
            if placeholders.is_empty() {
                return text;
            }

            let mut values: HashMap<&str, Option<String>> = HashMap::new();
            for placeholder in &placeholders {
                values
                    .entry(placeholder.key.as_str())
                    .or_insert_with(|| self.lookup(&placeholder.key));
            }

            let mut next = String::with_capacity(text.len());
            let mut last_end = 0;
            for placeholder in &placeholders {
                next.push_str(&text[last_end..placeholder.span.start]);
                match values.get(placeholder.key.as_str()) {
                    Some(Some(value)) => next.push_str(value),
                    _ => next.push_str(&text[placeholder.span.clone()]),
                }
                last_end = placeholder.span.end;
            }
            next.push_str(&text[last_end..]);

            if next == text {
                for (key, value) in &values {
                    if value.is_none() {
                        warn!(key = %key, "Unresolved placeholder");
                    }
                }
                return text;
            }
            debug!(round, "Placeholder substitution round");
            text = next;
        }

        warn!(
            template,
            rounds = MAX_RESOLUTION_ROUNDS,
            "Placeholder resolution stopped at the round limit"
        );
        text
    }

    /// Resolves `<stepId>.request <expr>` and `<stepId>.response <expr>`.
    ///
    /// The outer `None` means `key` is not a step reference at all.
    fn step_reference(&self, key: &str) -> Option<Option<String>> {
        let (target, expression) = key.split_once(char::is_whitespace)?;
        let (step_id, facet) = match target.rsplit_once('.')? {
            (id, "request") => (id, Facet::Request),
            (id, "response") => (id, Facet::Response),
            _ => return None,
        };

        let Some(record) = self.records.get(step_id) else {
            debug!(step = step_id, "No recorded exchange for step reference");
            return Some(None);
        };
        let expression: Expression = match expression.trim().parse() {
            Ok(expression) => expression,
            Err(e) => {
                warn!(key, error = %e, "Invalid expression in step reference");
                return Some(None);
            }
        };
        match expression.extract(record.exchange(), facet) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Step reference could not be evaluated");
                Some(None)
            }
        }
    }
}
