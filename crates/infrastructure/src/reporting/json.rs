//! JSON run report.

use std::fs;
use std::path::Path;

use apiflow_application::ports::Reporter;
use apiflow_application::scenario::{RunSummary, StepOutcome, StepStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::serialization::{SerializationError, to_json_stable};

/// A finished (or stopped) scenario run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    /// Report title.
    pub title: String,
    /// Who ran the scenario.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Groups in execution order.
    pub groups: Vec<GroupReport>,
    /// Totals.
    pub totals: Totals,
}

/// One group of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReport {
    /// Group label.
    pub label: String,
    /// Steps that ran in this group.
    pub steps: Vec<StepReport>,
}

/// One executed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    /// Step id.
    pub id: String,
    /// Step name.
    pub name: String,
    /// Input row name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<String>,
    /// `passed` or `failed`.
    pub status: String,
    /// Failure message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Duration in milliseconds.
    pub duration_ms: u64,
}

/// Run totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Steps that passed.
    pub passed: usize,
    /// Steps that failed.
    pub failed: usize,
    /// Planned steps that never ran.
    pub skipped: usize,
    /// Run duration in milliseconds.
    pub duration_ms: u64,
}

impl ScenarioReport {
    /// Writes the report as stable JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_to(&self, path: &Path) -> Result<(), SerializationError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, to_json_stable(self)?)?;
        Ok(())
    }
}

/// Collects reporter events into a [`ScenarioReport`].
#[derive(Debug)]
pub struct JsonReporter {
    report: ScenarioReport,
}

impl JsonReporter {
    /// Creates a reporter; the start time is taken now.
    pub fn new(title: impl Into<String>, user: Option<String>) -> Self {
        Self {
            report: ScenarioReport {
                title: title.into(),
                user,
                started_at: Utc::now(),
                groups: Vec::new(),
                totals: Totals::default(),
            },
        }
    }

    /// The report built so far.
    #[must_use]
    pub const fn report(&self) -> &ScenarioReport {
        &self.report
    }

    /// Consumes the reporter.
    #[must_use]
    pub fn into_report(self) -> ScenarioReport {
        self.report
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl Reporter for JsonReporter {
    fn group_started(&mut self, label: &str) {
        self.report.groups.push(GroupReport {
            label: label.to_string(),
            steps: Vec::new(),
        });
    }

    fn step_finished(&mut self, outcome: &StepOutcome) {
        let step = StepReport {
            id: outcome.step_id.clone(),
            name: outcome.step_name.clone(),
            row: outcome.row.clone(),
            status: outcome.status.to_string(),
            error: outcome.error.clone(),
            duration_ms: millis(outcome.duration),
        };
        match self.report.groups.last_mut() {
            Some(group) if group.label == outcome.group => group.steps.push(step),
            _ => self.report.groups.push(GroupReport {
                label: outcome.group.clone(),
                steps: vec![step],
            }),
        }
        match outcome.status {
            StepStatus::Passed => self.report.totals.passed += 1,
            StepStatus::Failed => self.report.totals.failed += 1,
        }
    }

    fn scenario_finished(&mut self, summary: &RunSummary) {
        self.report.totals = Totals {
            passed: summary.passed,
            failed: summary.failed,
            skipped: summary.skipped,
            duration_ms: millis(summary.duration),
        };
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use apiflow_domain::Phase;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::serialization::from_json;

    fn outcome(group: &str, id: &str, status: StepStatus) -> StepOutcome {
        StepOutcome {
            group: group.to_string(),
            phase: Phase::Main,
            step_id: id.to_string(),
            step_name: id.to_uppercase(),
            row: Some("A".to_string()),
            status,
            error: (status == StepStatus::Failed).then(|| "boom".to_string()),
            duration: Duration::from_millis(12),
        }
    }

    #[test]
    fn test_collects_groups_and_totals() {
        let mut reporter = JsonReporter::new("Orders", Some("ci".to_string()));
        reporter.group_started("Scenario: A");
        reporter.step_finished(&outcome("Scenario: A", "s1", StepStatus::Passed));
        reporter.step_finished(&outcome("Scenario: A", "s2", StepStatus::Failed));
        reporter.group_finished("Scenario: A");

        let report = reporter.into_report();
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].steps[1].status, "failed");
        assert_eq!(report.groups[0].steps[1].error.as_deref(), Some("boom"));
        assert_eq!((report.totals.passed, report.totals.failed), (1, 1));
    }

    #[test]
    fn test_summary_overrides_running_totals() {
        let mut reporter = JsonReporter::new("Orders", None);
        reporter.step_finished(&outcome("Scenario", "s1", StepStatus::Passed));
        reporter.scenario_finished(&RunSummary {
            passed: 1,
            failed: 0,
            skipped: 2,
            duration: Duration::from_millis(40),
        });
        let totals = reporter.report().totals;
        assert_eq!(totals.skipped, 2);
        assert_eq!(totals.duration_ms, 40);
        // A step outside any started group opens one.
        assert_eq!(reporter.report().groups[0].label, "Scenario");
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports/run.json");
        let mut reporter = JsonReporter::new("Orders", None);
        reporter.step_finished(&outcome("Scenario", "s1", StepStatus::Passed));
        let report = reporter.into_report();

        report.write_to(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.ends_with("}\n"));
        assert!(text.contains("  \"title\": \"Orders\""));
        assert!(!text.contains("\"user\""));
        let read: ScenarioReport = from_json(&text).unwrap();
        assert_eq!(read, report);
    }
}
