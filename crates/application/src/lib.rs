//! Apiflow Application - Scenario engine
//!
//! This crate runs declarative API test scenarios:
//!
//! - [`context`]: the per-run variable context and `${...}` resolution
//! - [`expression`]: the `@scope [operator] expected` assertion language
//! - [`step`]: the step lifecycle and the HTTP step
//! - [`scenario`]: validation, planning and execution of a whole scenario
//! - [`use_cases`]: loading a scenario with its configuration and inputs
//!
//! External collaborators (documents, HTTP, dynamic values, reporting) are
//! reached through the traits in [`ports`].

pub mod builtins;
pub mod context;
pub mod error;
pub mod expression;
pub mod ports;
pub mod scenario;
pub mod step;
pub mod use_cases;

#[cfg(test)]
mod test_support;

pub use builtins::BuiltinVariables;
pub use context::VariableContext;
pub use error::{ApplicationResult, ConfigurationError, StepError};
pub use expression::{Expression, ExpressionError, Facet};
pub use scenario::{
    PlannedStep, RunSummary, Scenario, ScenarioServices, StepGroup, StepOutcome, StepStatus,
};
pub use step::{HttpStep, Step, StepRecord, StepState};
pub use use_cases::{LoadScenario, LoadScenarioOutput};
