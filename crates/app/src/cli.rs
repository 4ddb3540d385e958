//! Command line interface.

use std::path::{Path, PathBuf};

use apiflow_domain::{ReportSpec, RunSpec};
use clap::{Args, Parser, Subcommand};

/// Declarative API scenario runner.
#[derive(Debug, Parser)]
#[command(name = "apiflow", about = "Run declarative API test scenarios")]
#[command(version, long_about = None)]
pub struct Cli {
    /// Log filter (e.g. `debug`, `apiflow_application=trace`). Defaults to
    /// `RUST_LOG`, then `info`.
    #[arg(long, global = true, env = "APIFLOW_LOG")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a scenario.
    Run(RunArgs),
    /// List the built-in `${$...}` dynamic values.
    Builtins,
}

/// Arguments of `apiflow run`.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Scenario document.
    pub scenario: String,

    /// CSV input table; replaces the scenario's inputs.
    #[arg(long, short)]
    pub input: Option<String>,

    /// Configuration document. Repeatable; later files win.
    #[arg(long = "config", short = 'c')]
    pub configs: Vec<String>,

    /// Runtime override `key=value`. Repeatable; beats every config file.
    #[arg(long = "set", short = 's', value_parser = parse_override)]
    pub overrides: Vec<(String, String)>,

    /// Write a JSON report to this file.
    #[arg(long, short)]
    pub report: Option<String>,

    /// Report title. Defaults to the scenario file name.
    #[arg(long)]
    pub title: Option<String>,

    /// User recorded in the report.
    #[arg(long, env = "APIFLOW_USER")]
    pub user: Option<String>,

    /// Stop at the first failed step.
    #[arg(long)]
    pub stop_on_failure: bool,

    /// Directory that document paths are relative to.
    #[arg(long, env = "APIFLOW_BASE_DIR", default_value = ".")]
    pub base_dir: PathBuf,
}

impl RunArgs {
    /// Creates arguments for `scenario` with every option at its default.
    #[must_use]
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            input: None,
            configs: Vec::new(),
            overrides: Vec::new(),
            report: None,
            title: None,
            user: None,
            stop_on_failure: false,
            base_dir: PathBuf::from("."),
        }
    }

    /// The report title.
    #[must_use]
    pub fn title(&self) -> String {
        self.title.clone().unwrap_or_else(|| {
            Path::new(&self.scenario)
                .file_stem()
                .map_or_else(|| self.scenario.clone(), |stem| stem.to_string_lossy().into_owned())
        })
    }

    /// Converts the arguments into a run specification.
    #[must_use]
    pub fn to_run_spec(&self) -> RunSpec {
        let mut run = RunSpec::new(self.scenario.clone()).with_report(ReportSpec {
            file: self.report.clone(),
            title: Some(self.title()),
            user: self.user.clone(),
        });
        if let Some(input) = &self.input {
            run = run.with_input_file(input.clone());
        }
        for config in &self.configs {
            run = run.with_config_file(config.clone());
        }
        for (key, value) in &self.overrides {
            run = run.with_override(key.clone(), value.clone());
        }
        run
    }
}

fn parse_override(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
