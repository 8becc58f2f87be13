//! CLI logic for the actiflow import tool.
//!
//! Reads an activity table, imports it into an in-memory model and canvas,
//! and writes one SVG file per created diagram.

pub mod error_adapter;

mod args;
mod config;
mod error;

pub use args::Args;
pub use config::ConfigError;
pub use error::CliError;

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
};

use log::{info, warn};

use actiflow::{
    ImportOutcome, Importer,
    collaborators::{ActionTypeResolver, Choice},
    export::svg::SvgExporter,
    render::Canvas,
    row::{ActionKind, ActionTypeSelection, ActivityRow},
    store::{MemoryModel, ModelStore},
};
use actiflow_ingest::{IngestOptions, Table, error::Diagnostic, parse_table};

/// Files written by [`run`] and the warnings raised while reading the table.
#[derive(Debug)]
pub struct RunSummary {
    /// Written SVG files, main diagram first.
    pub files: Vec<PathBuf>,
    pub warnings: Vec<Diagnostic>,
    /// Table source, kept for rendering the warnings.
    pub source: String,
}

/// Run the actiflow CLI application
///
/// # Errors
///
/// Returns `CliError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Table ingestion errors
/// - Import and export errors
pub fn run(args: &Args) -> Result<RunSummary, CliError> {
    info!(
        input_path = args.input,
        output_dir = args.output;
        "Processing activity table"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let exporter = SvgExporter::new(app_config.style())?;

    let source = fs::read_to_string(&args.input).map_err(|err| CliError::io(&args.input, err))?;
    let options = IngestOptions {
        delimiter: args.delimiter,
    };
    let Table { rows, warnings, .. } = match parse_table(&source, &options) {
        Ok(table) => table,
        Err(err) => return Err(CliError::Ingest { err, src: source }),
    };
    info!(rows = rows.len(), warnings = warnings.len(); "Table read");

    let mut model = MemoryModel::new();
    let mut container = match &args.container {
        Some(name) => model.add_package(name),
        None => model.primary_model(),
    };
    let mut canvas = Canvas::new();
    let mut resolver = CommandLineKinds { args };

    let report = match Importer::new(app_config).import(
        &rows,
        &mut resolver,
        &mut container,
        &mut model,
        &mut canvas,
    )? {
        ImportOutcome::Completed(report) => report,
        ImportOutcome::Cancelled(_) => return Err(CliError::Cancelled),
    };

    let output_dir = Path::new(&args.output);
    fs::create_dir_all(output_dir).map_err(|err| CliError::io(output_dir, err))?;

    let mut used = HashSet::new();
    let mut files = Vec::new();
    for diagram in report.diagrams().filter_map(|id| canvas.diagram(id)) {
        let path = output_dir.join(unique_file_name(diagram.name(), &mut used));
        let doc = exporter.render(diagram, &model);
        exporter.write_document(&doc, &path)?;
        files.push(path);
    }

    info!(files = files.len(); "SVG files exported successfully");
    Ok(RunSummary {
        files,
        warnings,
        source,
    })
}

/// Resolves node kinds from `--call-behavior` and `--all-call-behavior`.
struct CommandLineKinds<'a> {
    args: &'a Args,
}

impl ActionTypeResolver for CommandLineKinds<'_> {
    fn resolve(&mut self, rows: &[ActivityRow]) -> Choice<ActionTypeSelection> {
        if self.args.all_call_behavior {
            return Choice::Selected(ActionTypeSelection::all(rows, ActionKind::BehaviorCall));
        }
        let mut selection = ActionTypeSelection::all(rows, ActionKind::StructuredContainer);
        for name in &self.args.call_behavior {
            if !rows.iter().any(|row| row.name() == name.as_str()) {
                warn!(name; "No row named for --call-behavior");
            }
            selection.set(name.as_str(), ActionKind::BehaviorCall);
        }
        Choice::Selected(selection)
    }
}

/// File name for a diagram.
///
/// Characters outside `[A-Za-z0-9_-]` become `_`, a name with no letter or
/// digit left becomes `diagram`, and repeats get a `-2`, `-3`, ... suffix.
fn unique_file_name(name: &str, used: &mut HashSet<String>) -> String {
    let mut stem: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if !stem.chars().any(|c| c.is_ascii_alphanumeric()) {
        stem = "diagram".to_string();
    }

    let mut candidate = stem.clone();
    let mut n = 2;
    while !used.insert(candidate.clone()) {
        candidate = format!("{stem}-{n}");
        n += 1;
    }
    format!("{candidate}.svg")
}
