//! threedo CLI entry point.

use std::{process::ExitCode, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};
use miette::GraphicalReportHandler;

use threedo::ThreedoError;
use threedo_cli::{Args, error_adapter::to_reportables};

fn main() -> ExitCode {
    miette::set_panic_hook();

    let args = Args::parse();
    init_logging(&args.log_level);
    debug!(args:?; "Parsed arguments");

    match threedo_cli::run(&args) {
        Ok(()) => {
            info!(input = args.input; "Conversion finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str) {
    let filter = LevelFilter::from_str(level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {level}. Using 'warn' instead.");
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(filter)
        .init();
}

/// Logs one graphical report per failure.
fn report(err: &ThreedoError) {
    let handler = GraphicalReportHandler::new();
    let reports = to_reportables(err);

    for reportable in &reports {
        let mut rendered = String::new();
        handler
            .render_report(&mut rendered, reportable)
            .expect("Writing to String buffer is infallible");
        error!("{rendered}");
    }

    if reports.len() > 1 {
        error!(count = reports.len(); "Document has errors");
    }
}
