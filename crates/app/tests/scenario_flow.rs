//! End-to-end scenario runs
//!
//! These tests load real documents from a temporary directory and run them
//! through the harness against an in-process HTTP double.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::{TempDir, tempdir};

use apiflow::RunArgs;
use apiflow_application::ConfigurationError;
use apiflow_application::ports::{HttpTransport, TransportError};
use apiflow_domain::{HttpMethod, HttpRequest, HttpResponse, StringMap, TransportOptions};
use apiflow_infrastructure::{ScenarioReport, from_json};

const SCENARIO: &str = "\
preSteps:
  - id: login
    name: Login
    ref: steps/login.yaml
steps:
  - id: order
    name: Fetch order
    ref: steps/order.yaml
postSteps:
  - id: logout
    name: Logout
    ref: steps/logout.yaml
configs:
  baseUrl: http://wrong.test
  user: ann
";

const LOGIN: &str = "\
method: POST
endpoint: ${baseUrl}/login
formBody:
  user: ${user}
asserts:
  ok: \"@status [==] 200\"
captures:
  token: \"@body json:$.token\"
";

const ORDER: &str = "\
method: GET
endpoint: ${baseUrl}/orders/${orderId}
headers:
  Authorization: Bearer ${login.token}
asserts:
  ok: \"@status [==] 200\"
  id: \"@body json:$.id [==] ${orderId}\"
";

const LOGOUT: &str = "\
method: POST
endpoint: ${baseUrl}/logout
queryParams:
  token: ${login.response @body json:$.token}
asserts:
  gone: \"@status [==] 204\"
";

const CONFIG: &str = "baseUrl: http://api.test\n";

/// Serves a tiny order API and records every request.
#[derive(Default)]
struct OrderApi {
    requests: Mutex<Vec<HttpRequest>>,
}

impl OrderApi {
    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn respond(request: &HttpRequest) -> (u16, String) {
        let Some(path) = request.url.strip_prefix("http://api.test") else {
            return (502, String::new());
        };
        match (request.method, path) {
            (HttpMethod::Post, "/login") if request.form_param("user") == Some("ann") => {
                (200, r#"{"token": "t-1"}"#.to_string())
            }
            (HttpMethod::Get, path) if path.starts_with("/orders/") => {
                if request.header("authorization") != Some("Bearer t-1") {
                    return (401, "{}".to_string());
                }
                match path.split("/orders/").nth(1) {
                    Some("404") => (404, r#"{"error": "not found"}"#.to_string()),
                    Some(id) => (200, format!(r#"{{"id": {id}}}"#)),
                    None => (400, String::new()),
                }
            }
            (HttpMethod::Post, "/logout") if request.query_param("token") == Some("t-1") => {
                (204, String::new())
            }
            _ => (500, String::new()),
        }
    }
}

impl HttpTransport for OrderApi {
    fn send(
        &self,
        request: &HttpRequest,
        _options: &TransportOptions,
    ) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        let (status, body) = Self::respond(request);
        let headers = StringMap::from([(
            "Content-Type".to_string(),
            "application/json".to_string(),
        )]);
        Ok(HttpResponse::new(
            status,
            headers,
            body.as_bytes(),
            Duration::from_millis(3),
        ))
    }
}

fn write(dir: &Path, name: &str, text: &str) {
    let path = dir.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn workspace(rows: &str) -> TempDir {
    let dir = tempdir().expect("Failed to create temp directory");
    write(dir.path(), "scenario.yaml", SCENARIO);
    write(dir.path(), "steps/login.yaml", LOGIN);
    write(dir.path(), "steps/order.yaml", ORDER);
    write(dir.path(), "steps/logout.yaml", LOGOUT);
    write(dir.path(), "config/dev.yaml", CONFIG);
    write(dir.path(), "orders.csv", rows);
    dir
}

fn args(dir: &TempDir) -> RunArgs {
    let mut args = RunArgs::new("scenario.yaml");
    args.base_dir = dir.path().to_path_buf();
    args.input = Some("orders.csv".to_string());
    args.configs = vec!["config/dev.yaml".to_string()];
    args
}

#[test]
fn test_full_flow_passes_and_writes_report() {
    let dir = workspace("#Name#,orderId\nFirst,1\nSecond,2\n");
    let report_path = dir.path().join("out/report.json");
    let mut args = args(&dir);
    args.report = Some(report_path.to_string_lossy().into_owned());
    args.user = Some("qa".to_string());
    let api = Arc::new(OrderApi::default());

    let summary = apiflow::run_with_transport(&args, api.clone()).unwrap();

    assert_eq!((summary.passed, summary.failed, summary.skipped), (4, 0, 0));
    assert!(summary.success());

    let urls: Vec<String> = api.requests().iter().map(|r| r.url.clone()).collect();
    assert_eq!(
        urls,
        vec![
            "http://api.test/login",
            "http://api.test/orders/1",
            "http://api.test/orders/2",
            "http://api.test/logout",
        ]
    );

    let report: ScenarioReport = from_json(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report.title, "scenario");
    assert_eq!(report.user.as_deref(), Some("qa"));
    let labels: Vec<&str> = report.groups.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["Pre Steps", "Scenario: First", "Scenario: Second", "Post Steps"]
    );
    assert_eq!(report.groups[1].steps[0].row.as_deref(), Some("First"));
    assert_eq!(report.totals.passed, 4);
}

#[test]
fn test_failed_row_does_not_stop_the_run() {
    let dir = workspace("#Name#,orderId\nMissing,404\nFound,7\n");
    let api = Arc::new(OrderApi::default());

    let summary = apiflow::run_with_transport(&args(&dir), api.clone()).unwrap();

    assert_eq!((summary.passed, summary.failed, summary.skipped), (3, 1, 0));
    assert!(!summary.success());
    assert_eq!(api.requests().len(), 4);
}

#[test]
fn test_stop_on_failure_skips_remaining_steps() {
    let dir = workspace("#Name#,orderId\nMissing,404\nFound,7\n");
    let report_path = dir.path().join("report.json");
    let mut args = args(&dir);
    args.stop_on_failure = true;
    args.report = Some(report_path.to_string_lossy().into_owned());
    let api = Arc::new(OrderApi::default());

    let summary = apiflow::run_with_transport(&args, api.clone()).unwrap();

    assert_eq!((summary.passed, summary.failed, summary.skipped), (1, 1, 2));
    assert_eq!(api.requests().len(), 2);

    let report: ScenarioReport = from_json(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report.groups.len(), 2);
    let failed = &report.groups[1].steps[0];
    assert_eq!(failed.status, "failed");
    assert!(failed.error.as_deref().unwrap().contains("ok"));
    assert_eq!(report.totals.skipped, 2);
}

#[test]
fn test_override_beats_config_file() {
    let dir = workspace("orderId\n5\n");
    let mut args = args(&dir);
    args.configs.clear();
    args.overrides = vec![("baseUrl".to_string(), "http://api.test".to_string())];
    let api = Arc::new(OrderApi::default());

    let summary = apiflow::run_with_transport(&args, api.clone()).unwrap();

    assert!(summary.success());
    assert_eq!(api.requests()[1].url, "http://api.test/orders/5");
}

#[test]
fn test_invalid_scenario_fails_before_any_request() {
    let dir = workspace("orderId\n1\n");
    write(
        dir.path(),
        "scenario.yaml",
        "steps:\n  - id: a\n    name: One\n    ref: steps/order.yaml\n  - id: a\n    name: Two\n    ref: steps/order.yaml\n",
    );
    let api = Arc::new(OrderApi::default());

    let err = apiflow::run_with_transport(&args(&dir), api.clone()).unwrap_err();

    assert_eq!(
        err.downcast_ref::<ConfigurationError>(),
        Some(&ConfigurationError::DuplicateStepId("a".to_string()))
    );
    assert!(api.requests().is_empty());
}

#[test]
fn test_missing_scenario_file_is_a_configuration_error() {
    let dir = tempdir().unwrap();
    let mut args = RunArgs::new("nope.yaml");
    args.base_dir = dir.path().to_path_buf();

    let err = apiflow::run_with_transport(&args, Arc::new(OrderApi::default())).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ConfigurationError>(),
        Some(ConfigurationError::Document(_))
    ));
}
