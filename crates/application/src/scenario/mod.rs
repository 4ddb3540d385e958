//! Scenario orchestrator
//!
//! A [`Scenario`] validates its declaration up front, exposes the execution
//! plan as plain data, and runs one planned step at a time on request. It
//! never decides to stop: a harness pulls steps from the plan and may stop
//! whenever it likes.

mod outcome;
mod plan;
mod validation;

use std::sync::Arc;
use std::time::Instant;

use apiflow_domain::{InputRow, Phase, RunConfiguration, ScenarioSpec, StepKind, StepSpec};
use tracing::{debug, warn};

use crate::context::VariableContext;
use crate::error::ApplicationResult;
use crate::ports::{DocumentSource, DynamicValueProvider, HttpTransport};
use crate::step::{HttpStep, Step, run_step};

pub use outcome::{RunSummary, StepOutcome, StepStatus};
pub use plan::{
    POST_STEPS_LABEL, PRE_STEPS_LABEL, PlannedStep, SCENARIO_LABEL, StepGroup, build_plan,
    scenario_label,
};
pub use validation::validate;

/// External collaborators the steps need.
#[derive(Clone)]
pub struct ScenarioServices {
    /// Reads step definitions.
    pub documents: Arc<dyn DocumentSource>,
    /// Sends HTTP requests.
    pub transport: Arc<dyn HttpTransport>,
}

/// One run of a scenario.
///
/// Owns the variable context and every step it has executed.
pub struct Scenario {
    spec: ScenarioSpec,
    rows: Vec<InputRow>,
    groups: Vec<StepGroup>,
    context: VariableContext,
    services: ScenarioServices,
    executed: Vec<Box<dyn Step>>,
}

impl Scenario {
    /// Validates `spec` and prepares a run over its inputs.
    ///
    /// A scenario without inputs gets a single unnamed empty row, so main
    /// steps always run at least once.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`](crate::error::ConfigurationError)
    /// if a step lacks an id, name or ref, or if step ids, step names or row
    /// names are not unique.
    pub fn new(
        spec: ScenarioSpec,
        config: Arc<RunConfiguration>,
        services: ScenarioServices,
    ) -> ApplicationResult<Self> {
        let rows = if spec.inputs.is_empty() {
            vec![InputRow::empty()]
        } else {
            spec.inputs.clone()
        };
        validate(&spec, &rows)?;

        let groups = build_plan(&spec, &rows);
        debug!(
            groups = groups.len(),
            rows = rows.len(),
            config_keys = config.len(),
            "Scenario planned"
        );

        Ok(Self {
            spec,
            rows,
            groups,
            context: VariableContext::new(config),
            services,
            executed: Vec::new(),
        })
    }

    /// Replaces the dynamic value provider of the context.
    #[must_use]
    pub fn with_dynamic_values(mut self, provider: Arc<dyn DynamicValueProvider>) -> Self {
        self.context = self.context.with_dynamic_values(provider);
        self
    }

    /// The validated declaration.
    #[must_use]
    pub const fn spec(&self) -> &ScenarioSpec {
        &self.spec
    }

    /// The input rows, including the synthetic one for row-less scenarios.
    #[must_use]
    pub fn rows(&self) -> &[InputRow] {
        &self.rows
    }

    /// The execution plan. Nothing in it has run yet.
    #[must_use]
    pub fn plan(&self) -> &[StepGroup] {
        &self.groups
    }

    /// Total number of planned step invocations.
    #[must_use]
    pub fn planned_steps(&self) -> usize {
        self.groups.iter().map(|group| group.steps.len()).sum()
    }

    /// The run's variable context.
    #[must_use]
    pub const fn context(&self) -> &VariableContext {
        &self.context
    }

    /// Steps executed so far, in execution order.
    pub fn executed(&self) -> impl Iterator<Item = &dyn Step> {
        self.executed.iter().map(|step| &**step)
    }

    /// Runs one planned step through its lifecycle.
    ///
    /// Main steps see their row's values; pre and post steps see none.
    /// Failures are reported in the outcome, never raised.
    pub fn execute(&mut self, planned: &PlannedStep) -> StepOutcome {
        let row = match planned.row {
            Some(index) => self.rows.get(index).cloned().unwrap_or_else(|| {
                warn!(index, "Planned row does not exist, using an empty row");
                InputRow::empty()
            }),
            None => InputRow::empty(),
        };
        let group = match planned.phase {
            Phase::Pre => PRE_STEPS_LABEL.to_string(),
            Phase::Main => scenario_label(&row),
            Phase::Post => POST_STEPS_LABEL.to_string(),
        };
        let row_name = row.name.clone();
        self.context.activate_row(row);

        let mut step = self.build_step(&planned.spec);
        let started = Instant::now();
        let result = run_step(step.as_mut(), &mut self.context);
        let duration = started.elapsed();
        self.executed.push(step);

        let (status, error) = match result {
            Ok(()) => (StepStatus::Passed, None),
            Err(e) => (StepStatus::Failed, Some(e.to_string())),
        };
        StepOutcome {
            group,
            phase: planned.phase,
            step_id: planned.spec.id.clone(),
            step_name: planned.spec.name.clone(),
            row: row_name,
            status,
            error,
            duration,
        }
    }

    /// Runs every planned step in order.
    pub fn execute_all(&mut self) -> Vec<StepOutcome> {
        let planned: Vec<PlannedStep> = self
            .groups
            .iter()
            .flat_map(|group| group.steps.iter().cloned())
            .collect();
        planned.iter().map(|step| self.execute(step)).collect()
    }

    fn build_step(&self, spec: &StepSpec) -> Box<dyn Step> {
        match spec.kind {
            StepKind::Http => Box::new(HttpStep::new(
                spec.clone(),
                Arc::clone(&self.services.documents),
                Arc::clone(&self.services.transport),
            )),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use apiflow_domain::StringMap;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::ConfigurationError;
    use crate::test_support::{MemoryDocuments, MockTransport, json_response};

    const LOGIN: &str = "\
method: POST
endpoint: ${base}/login
asserts:
  ok: \"@status [==] 200\"
captures:
  token: \"@body json:$.token\"
";

    const ORDER: &str = "\
method: GET
endpoint: ${base}/orders/${order}
headers:
  Authorization: Bearer ${login.response @body json:$.token}
asserts:
  ok: \"@status [==] 200\"
  id: \"@body json:$.id [==] ${order}\"
";

    const LOGOUT: &str = "method: DELETE\nendpoint: ${base}/session\n";

    fn services(transport: Arc<MockTransport>) -> ScenarioServices {
        let documents = MemoryDocuments::new()
            .with("login.yaml", LOGIN)
            .with("order.yaml", ORDER)
            .with("logout.yaml", LOGOUT);
        ScenarioServices {
            documents: Arc::new(documents),
            transport,
        }
    }

    fn transport() -> Arc<MockTransport> {
        Arc::new(MockTransport::new(|request| {
            let body = if request.url.ends_with("/login") {
                r#"{"token": "t-1"}"#.to_string()
            } else if let Some(order) = request.url.split("/orders/").nth(1) {
                format!(r#"{{"id": {order}}}"#)
            } else {
                String::new()
            };
            Ok(json_response(200, &body))
        }))
    }

    fn config() -> Arc<RunConfiguration> {
        Arc::new(RunConfiguration::from_values(StringMap::from([(
            "base".to_string(),
            "http://api.test".to_string(),
        )])))
    }

    fn spec(inputs: Vec<InputRow>) -> ScenarioSpec {
        ScenarioSpec {
            pre_steps: vec![StepSpec::http("login", "Login", "login.yaml")],
            steps: vec![StepSpec::http("get", "Get order", "order.yaml")],
            post_steps: vec![StepSpec::http("logout", "Logout", "logout.yaml")],
            configs: StringMap::new(),
            inputs,
        }
    }

    #[test]
    fn test_zero_rows_run_main_steps_once() {
        let transport = transport();
        let mut spec = spec(Vec::new());
        spec.steps[0].reference = "logout.yaml".to_string();
        let mut scenario = Scenario::new(spec, config(), services(transport.clone())).unwrap();

        assert_eq!(scenario.rows(), &[InputRow::empty()]);
        let outcomes = scenario.execute_all();

        let groups: Vec<_> = outcomes.iter().map(|o| o.group.as_str()).collect();
        assert_eq!(groups, vec!["Pre Steps", "Scenario", "Post Steps"]);
        assert!(outcomes.iter().all(StepOutcome::passed));
        assert_eq!(transport.requests().len(), 3);
    }

    #[test]
    fn test_each_row_runs_main_steps_with_its_values() {
        let transport = transport();
        let rows = vec![
            InputRow::named("First").with_value("order", "7"),
            InputRow::named("Second").with_value("order", "42"),
        ];
        let mut scenario = Scenario::new(spec(rows), config(), services(transport.clone())).unwrap();

        let outcomes = scenario.execute_all();

        assert!(outcomes.iter().all(StepOutcome::passed), "{outcomes:?}");
        let urls: Vec<_> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "http://api.test/login",
                "http://api.test/orders/7",
                "http://api.test/orders/42",
                "http://api.test/session",
            ]
        );
        let rows: Vec<_> = outcomes.iter().map(|o| o.row.as_deref()).collect();
        assert_eq!(rows, vec![None, Some("First"), Some("Second"), None]);
        assert_eq!(scenario.executed().count(), 4);
    }

    #[test]
    fn test_captured_token_flows_into_later_step() {
        let transport = transport();
        let rows = vec![InputRow::named("One").with_value("order", "1")];
        let mut scenario = Scenario::new(spec(rows), config(), services(transport.clone())).unwrap();

        scenario.execute_all();

        assert_eq!(scenario.context().captured("login", "token"), Some("t-1"));
        let order = &transport.requests()[1];
        assert_eq!(order.header("authorization"), Some("Bearer t-1"));
    }

    #[test]
    fn test_row_values_are_not_visible_to_post_steps() {
        let rows = vec![InputRow::named("One").with_value("order", "1")];
        let mut scenario = Scenario::new(spec(rows), config(), services(transport())).unwrap();
        scenario.execute_all();
        assert_eq!(scenario.context().lookup("order"), None);
    }

    #[test]
    fn test_failures_do_not_gate_later_steps() {
        let transport = Arc::new(MockTransport::new(|request| {
            let status = if request.url.ends_with("/login") { 500 } else { 200 };
            Ok(json_response(status, "{}"))
        }));
        let mut spec = spec(Vec::new());
        spec.steps[0].reference = "logout.yaml".to_string();
        let mut scenario = Scenario::new(spec, config(), services(transport.clone())).unwrap();

        let outcomes = scenario.execute_all();

        let statuses: Vec<_> = outcomes.iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec![StepStatus::Failed, StepStatus::Passed, StepStatus::Passed]
        );
        assert!(outcomes[0].error.as_deref().unwrap().contains("assertion 'ok' failed"));
        assert_eq!(transport.requests().len(), 3);
    }

    #[test]
    fn test_invalid_scenario_never_executes() {
        let transport = transport();
        let mut spec = spec(Vec::new());
        spec.post_steps[0].id = "login".to_string();

        let result = Scenario::new(spec, config(), services(transport.clone()));

        assert!(matches!(result, Err(ConfigurationError::DuplicateStepId(id)) if id == "login"));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_duplicate_row_names_rejected() {
        let rows = vec![InputRow::named("CaseA"), InputRow::named("CaseA")];
        assert!(matches!(
            Scenario::new(spec(rows), config(), services(transport())),
            Err(ConfigurationError::DuplicateInputName(_))
        ));
    }

    #[test]
    fn test_plan_is_inspectable_before_running() {
        let rows = vec![InputRow::named("A"), InputRow::named("B")];
        let scenario = Scenario::new(spec(rows), config(), services(transport())).unwrap();
        assert_eq!(scenario.plan().len(), 4);
        assert_eq!(scenario.planned_steps(), 4);
        assert_eq!(scenario.executed().count(), 0);
    }
}
