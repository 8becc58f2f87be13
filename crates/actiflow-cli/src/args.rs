//! Command-line argument definitions for the actiflow CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control the input table, the output directory,
//! configuration file selection, logging verbosity, and the two choices the
//! importer would otherwise ask for interactively: the node kind of each row
//! and the package that owns the imported activity.

use clap::Parser;

/// Command-line arguments for the actiflow import tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the activity table (CSV, semicolon or tab separated)
    #[arg(help = "Path to the input table")]
    pub input: String,

    /// Directory the SVG files are written to
    #[arg(short, long, default_value = ".")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Import the named row as a call behavior action (repeatable)
    #[arg(long = "call-behavior", value_name = "NAME")]
    pub call_behavior: Vec<String>,

    /// Import every row as a call behavior action
    #[arg(long, conflicts_with = "call_behavior")]
    pub all_call_behavior: bool,

    /// Create the activity inside a package with this name
    #[arg(long, value_name = "NAME")]
    pub container: Option<String>,

    /// Cell delimiter; detected from the header line when omitted
    #[arg(long, value_name = "C")]
    pub delimiter: Option<char>,
}

impl Args {
    /// Arguments for `input` with every option at its default.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: ".".to_string(),
            config: None,
            log_level: "info".to_string(),
            call_behavior: Vec::new(),
            all_call_behavior: false,
            container: None,
            delimiter: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_command_line() {
        let args = Args::try_parse_from([
            "actiflow",
            "parcels.csv",
            "-o",
            "out",
            "--call-behavior",
            "Action A",
            "--call-behavior",
            "Action B",
            "--container",
            "Logistics",
            "--delimiter",
            ";",
        ])
        .unwrap();

        assert_eq!(args.input, "parcels.csv");
        assert_eq!(args.output, "out");
        assert_eq!(args.call_behavior, ["Action A", "Action B"]);
        assert!(!args.all_call_behavior);
        assert_eq!(args.container.as_deref(), Some("Logistics"));
        assert_eq!(args.delimiter, Some(';'));
    }

    #[test]
    fn test_call_behavior_flags_conflict() {
        let result = Args::try_parse_from([
            "actiflow",
            "parcels.csv",
            "--all-call-behavior",
            "--call-behavior",
            "Action A",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["actiflow", "parcels.csv"]).unwrap();
        assert_eq!(args.output, ".");
        assert_eq!(args.log_level, "info");
        assert!(args.config.is_none());
    }
}
