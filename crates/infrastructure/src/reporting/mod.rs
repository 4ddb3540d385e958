//! Reporter implementations.

mod console;
mod json;

pub use console::ConsoleReporter;
pub use json::{GroupReport, JsonReporter, ScenarioReport, StepReport, Totals};
