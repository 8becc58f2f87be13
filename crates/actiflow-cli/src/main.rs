//! actiflow CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info, warn};

use actiflow_cli::{
    Args,
    error_adapter::{Reportable, to_reportables, warning_reportables},
};

fn render(reporter: &miette::GraphicalReportHandler, reportable: &Reportable<'_>) -> String {
    let mut writer = String::new();
    reporter
        .render_report(&mut writer, reportable)
        .expect("Writing to String buffer is infallible");
    writer
}

fn main() {
    // Install miette's pretty panic hook early for better panic reports
    miette::set_panic_hook();

    let args = Args::parse();

    // Initialize the logger with the specified log level
    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting actiflow");
    debug!(args:?; "Parsed arguments");

    let reporter = miette::GraphicalReportHandler::new();
    match actiflow_cli::run(&args) {
        Ok(summary) => {
            for reportable in warning_reportables(&summary.warnings, &summary.source) {
                warn!("{}", render(&reporter, &reportable));
            }
            for file in &summary.files {
                println!("{}", file.display());
            }
        }
        Err(err) => {
            // Render each diagnostic independently
            for reportable in to_reportables(&err) {
                error!("{}", render(&reporter, &reportable));
            }
            process::exit(1);
        }
    }

    info!("Completed successfully");
}
