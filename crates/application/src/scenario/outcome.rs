//! Step outcomes handed to reporters.

use std::fmt;
use std::time::Duration;

use apiflow_domain::Phase;

/// Pass/fail status of one step invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepStatus {
    /// Every lifecycle call succeeded.
    Passed,
    /// A lifecycle call failed.
    Failed,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
        })
    }
}

/// Result of running one planned step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// Label of the group the step ran in.
    pub group: String,
    /// Phase of the step.
    pub phase: Phase,
    /// Step id.
    pub step_id: String,
    /// Step display name.
    pub step_name: String,
    /// Name of the active input row, if any.
    pub row: Option<String>,
    /// Pass or fail.
    pub status: StepStatus,
    /// Error message of a failed step.
    pub error: Option<String>,
    /// Wall-clock time of the whole lifecycle.
    pub duration: Duration,
}

impl StepOutcome {
    /// True if the step passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == StepStatus::Passed
    }
}

/// Totals of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Steps that passed.
    pub passed: usize,
    /// Steps that failed.
    pub failed: usize,
    /// Planned steps that were never run.
    pub skipped: usize,
    /// Wall-clock time of the run.
    pub duration: Duration,
}

impl RunSummary {
    /// Counts an outcome.
    pub fn record(&mut self, outcome: &StepOutcome) {
        match outcome.status {
            StepStatus::Passed => self.passed += 1,
            StepStatus::Failed => self.failed += 1,
        }
    }

    /// Steps that ran.
    #[must_use]
    pub const fn executed(&self) -> usize {
        self.passed + self.failed
    }

    /// True if nothing failed.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.failed == 0
    }
}
