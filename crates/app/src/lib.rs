//! apiflow - declarative API scenario runner.
//!
//! Wires the file document source, the reqwest transport and the reporters
//! around the scenario engine.

pub mod cli;
pub mod harness;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use apiflow_application::ports::{DocumentSource, HttpTransport, Reporter};
use apiflow_application::scenario::{RunSummary, Scenario, ScenarioServices};
use apiflow_application::use_cases::LoadScenario;
use apiflow_infrastructure::{ConsoleReporter, FileDocumentSource, JsonReporter, ReqwestTransport};
use tracing::info;

pub use cli::{Cli, Command, RunArgs};
pub use harness::Harness;

/// Runs the scenario described by `args` over real HTTP.
///
/// # Errors
///
/// Fails with a [`ConfigurationError`](apiflow_application::ConfigurationError)
/// if the scenario cannot be loaded or validated, or if the report cannot be
/// written. Step failures are not errors; they show up in the summary.
pub fn run(args: &RunArgs) -> anyhow::Result<RunSummary> {
    let transport = ReqwestTransport::new().context("Failed to create HTTP transport")?;
    run_with_transport(args, Arc::new(transport))
}

/// Runs the scenario described by `args` with the given transport.
///
/// # Errors
///
/// See [`run`].
pub fn run_with_transport(
    args: &RunArgs,
    transport: Arc<dyn HttpTransport>,
) -> anyhow::Result<RunSummary> {
    let run = args.to_run_spec();
    let documents: Arc<dyn DocumentSource> = Arc::new(FileDocumentSource::new(&args.base_dir));

    let loaded = LoadScenario::new(Arc::clone(&documents)).execute(&run)?;
    let mut scenario = Scenario::new(
        loaded.spec,
        Arc::new(loaded.config),
        ScenarioServices {
            documents,
            transport,
        },
    )?;

    let title = args.title();
    let mut console = ConsoleReporter::new();
    let mut json = JsonReporter::new(title.clone(), args.user.clone());
    let summary = {
        let mut reporters: [&mut dyn Reporter; 2] = [&mut console, &mut json];
        Harness::new()
            .with_stop_on_failure(args.stop_on_failure)
            .run(&mut scenario, &title, &mut reporters)
    };

    if let Some(file) = &run.report.file {
        json.into_report()
            .write_to(Path::new(file))
            .with_context(|| format!("Failed to write report to {file}"))?;
        info!(path = %file, "Report written");
    }

    Ok(summary)
}
