//! apiflow command line entry point.

use std::process::ExitCode;

use apiflow::{Cli, Command};
use apiflow_application::{BuiltinVariables, ConfigurationError};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Every step passed.
const EXIT_SUCCESS: u8 = 0;
/// At least one step failed, or the run broke down.
const EXIT_FAILURE: u8 = 1;
/// The scenario or its documents are invalid; nothing ran.
const EXIT_CONFIG: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let code = match cli.command {
        Command::Run(args) => match apiflow::run(&args) {
            Ok(summary) if summary.success() => EXIT_SUCCESS,
            Ok(_) => EXIT_FAILURE,
            Err(e) => {
                error!("{e:#}");
                if e.downcast_ref::<ConfigurationError>().is_some() {
                    EXIT_CONFIG
                } else {
                    EXIT_FAILURE
                }
            }
        },
        Command::Builtins => {
            for (key, description) in BuiltinVariables::available() {
                println!("${{{key}}}\t{description}");
            }
            EXIT_SUCCESS
        }
    };
    ExitCode::from(code)
}

fn init_tracing(level: Option<&str>) {
    let filter = level
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
