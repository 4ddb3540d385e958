//! Step lifecycle
//!
//! A step moves through `Created → PreProcessed → Processed → PostProcessed`,
//! or to `Failed` from any of the first three. Each lifecycle call is valid
//! exactly once, in that order.

mod http;
mod options;

use std::fmt;

use apiflow_domain::{HttpExchange, StepSpec};
use tracing::debug;

use crate::context::VariableContext;
use crate::error::StepError;

pub use http::HttpStep;
pub use options::{
    DISABLE_TLS_VERIFY, PROXY_HOST, PROXY_PASSWORD, PROXY_PORT, PROXY_USERNAME, TIMEOUT_MS,
    transport_options,
};

/// Lifecycle state of a step instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepState {
    /// Built, nothing resolved yet.
    Created,
    /// Definition loaded and resolved.
    PreProcessed,
    /// Primary action done and every assertion held.
    Processed,
    /// Captures written to the context.
    PostProcessed,
    /// A lifecycle call failed.
    Failed,
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What a step left behind for later references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepRecord {
    /// Request sent and response received by an HTTP step.
    Http(HttpExchange),
}

impl StepRecord {
    /// The recorded HTTP exchange.
    #[must_use]
    pub const fn exchange(&self) -> &HttpExchange {
        match self {
            Self::Http(exchange) => exchange,
        }
    }
}

/// One executable unit of a scenario.
///
/// Steps borrow the context for each call; they never own it.
pub trait Step {
    /// The declaration this step was built from.
    fn spec(&self) -> &StepSpec;

    /// Current lifecycle state.
    fn state(&self) -> StepState;

    /// Loads the step definition and resolves its templates.
    ///
    /// # Errors
    ///
    /// Fails if called twice or if the definition cannot be loaded.
    fn pre_process(&mut self, context: &VariableContext) -> Result<(), StepError>;

    /// Performs the primary action and checks every assertion in declaration
    /// order, stopping at the first that does not hold.
    ///
    /// Whatever the step recorded is stored in `context` even if an
    /// assertion fails.
    ///
    /// # Errors
    ///
    /// Returns the first failing assertion, or the error that prevented the
    /// action.
    fn process(&mut self, context: &mut VariableContext) -> Result<(), StepError>;

    /// Evaluates captures and writes them into `context`.
    ///
    /// # Errors
    ///
    /// Fails unless [`Step::process`] succeeded, or if a capture expression
    /// is invalid.
    fn post_process(&mut self, context: &mut VariableContext) -> Result<(), StepError>;

    /// True once [`Step::process`] has succeeded.
    fn is_done(&self) -> bool {
        matches!(self.state(), StepState::Processed | StepState::PostProcessed)
    }

    /// What the step recorded, once it has run.
    fn record(&self) -> Option<&StepRecord>;
}

/// Drives a step through its whole lifecycle.
///
/// `post_process` only runs when `process` succeeded.
///
/// # Errors
///
/// Returns the first lifecycle error.
pub fn run_step(step: &mut dyn Step, context: &mut VariableContext) -> Result<(), StepError> {
    let id = step.spec().id.clone();
    debug!(step = %id, "Pre-processing step");
    step.pre_process(context)?;
    debug!(step = %id, "Processing step");
    step.process(context)?;
    debug!(step = %id, "Post-processing step");
    step.post_process(context)
}

/// Fails with [`StepError::InvalidState`] unless `state` is `expected`.
pub(crate) fn expect_state(
    state: StepState,
    expected: StepState,
    action: &'static str,
) -> Result<(), StepError> {
    if state == expected {
        Ok(())
    } else {
        Err(StepError::InvalidState { action, state })
    }
}
