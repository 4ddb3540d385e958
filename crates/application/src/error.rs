//! Application error types

use thiserror::Error;

use crate::expression::ExpressionError;
use crate::ports::{DocumentError, TransportError};
use crate::step::StepState;

/// Structural problems in a scenario or its inputs.
///
/// These are fatal: they are raised before any step executes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A step has no id.
    #[error("step '{name}' in {phase} steps has no id")]
    MissingStepId {
        /// Phase the step is declared in.
        phase: String,
        /// Name of the step, possibly empty.
        name: String,
    },

    /// A step has no name.
    #[error("step '{id}' has no name")]
    MissingStepName {
        /// Id of the step.
        id: String,
    },

    /// A step has no definition reference.
    #[error("step '{id}' has no ref")]
    MissingStepReference {
        /// Id of the step.
        id: String,
    },

    /// Two steps share an id.
    #[error("duplicate step id '{0}'")]
    DuplicateStepId(String),

    /// Two steps share a name.
    #[error("duplicate step name '{0}'")]
    DuplicateStepName(String),

    /// Two input rows share a name.
    #[error("duplicate input name '{0}'")]
    DuplicateInputName(String),

    /// The input table is malformed.
    #[error("invalid input table '{path}': {reason}")]
    InvalidInputTable {
        /// Table location.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A document could not be read or decoded.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Result type alias for scenario loading and validation.
pub type ApplicationResult<T> = Result<T, ConfigurationError>;

/// Why a single step failed. Never fatal to the run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StepError {
    /// An assertion did not hold.
    #[error("assertion '{name}' failed: {message}")]
    Assertion {
        /// Assertion name.
        name: String,
        /// What was expected and found.
        message: String,
    },

    /// An assertion expression could not be parsed or evaluated.
    #[error("assertion '{name}': {source}")]
    AssertionExpression {
        /// Assertion name.
        name: String,
        /// Underlying error.
        source: ExpressionError,
    },

    /// A capture expression could not be parsed or evaluated.
    #[error("capture '{name}': {source}")]
    Capture {
        /// Capture name.
        name: String,
        /// Underlying error.
        source: ExpressionError,
    },

    /// The HTTP transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The step definition could not be loaded or is invalid.
    #[error("invalid definition '{reference}': {reason}")]
    Definition {
        /// Step reference.
        reference: String,
        /// What went wrong.
        reason: String,
    },

    /// A lifecycle method was called out of order.
    #[error("cannot {action} a step in state {state:?}")]
    InvalidState {
        /// Attempted lifecycle call.
        action: &'static str,
        /// State the step was in.
        state: StepState,
    },
}

impl StepError {
    /// Creates a `Definition` error.
    pub fn definition(reference: impl Into<String>, reason: impl ToString) -> Self {
        Self::Definition {
            reference: reference.into(),
            reason: reason.to_string(),
        }
    }
}
