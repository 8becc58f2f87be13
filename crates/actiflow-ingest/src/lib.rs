//! Activity table ingestion.
//!
//! Reads a delimited text export of an activity table (CSV, semicolon or tab
//! separated) into the [`ActivityRow`]s the actiflow importer consumes.
//!
//! # Table shape
//!
//! ```text
//! Process export                       <- ignored title line
//! Name,Actor,Input,Output,Description  <- header: first line with a `name` cell
//! Action A,X,a,b,Receive parcel        <- main row
//! 1.1,X,,,Scan label                   <- sub row of `Action A`
//! Action B,Y,"b;c",d                   <- quoted pin list
//! ```
//!
//! # Example
//!
//! ```
//! use actiflow_ingest::{IngestOptions, parse_table};
//!
//! let source = "Name,Actor,Input,Output\nAction A,X,a,b\n1.1,X,,\n";
//! let table = parse_table(source, &IngestOptions::default()).unwrap();
//!
//! assert_eq!(table.rows.len(), 2);
//! assert_eq!(table.rows[1].parent_name(), Some("Action A"));
//! assert!(table.warnings.is_empty());
//! ```

pub mod error;

mod classify;
mod records;
mod span;
mod table;

use log::{debug, info};

use actiflow_core::row::ActivityRow;

pub use span::Span;
pub use table::split_pins;

use error::{Diagnostic, ErrorCode, IngestError};

/// Options for [`parse_table`].
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Cell delimiter; detected from the header line when `None`.
    pub delimiter: Option<char>,
}

impl IngestOptions {
    /// Forces `delimiter` instead of detecting one.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }
}

/// A successfully ingested table.
#[derive(Debug)]
pub struct Table {
    /// Main and sub rows in source order.
    pub rows: Vec<ActivityRow>,
    /// Non-fatal diagnostics, in source order.
    pub warnings: Vec<Diagnostic>,
    /// Data lines that were neither main nor sub rows.
    pub ignored: usize,
}

/// Reads `source` into activity rows.
///
/// # Errors
///
/// Returns an [`IngestError`] when the source is blank (`E000`), has no
/// header within its first lines (`E001`), or leaves a quoted cell open
/// (`E002`).
pub fn parse_table(source: &str, options: &IngestOptions) -> Result<Table, IngestError> {
    info!(bytes = source.len(); "Parsing activity table");

    if source.trim().is_empty() {
        return Err(Diagnostic::error("empty input")
            .with_code(ErrorCode::E000)
            .with_help("the table needs a header row and at least one action row")
            .into());
    }

    let delimiter = options
        .delimiter
        .unwrap_or_else(|| records::detect_delimiter(source));
    debug!(delimiter:?; "Using delimiter");

    let records = records::split_records(source, delimiter)?;
    let (header, columns) = table::find_header(&records)?;
    debug!(header_line = records[header].span.line_in(source); "Found header row");

    let built = table::build_rows(&records[header + 1..], &columns)?;
    info!(
        rows = built.rows.len(),
        warnings = built.warnings.len(),
        ignored = built.ignored;
        "Activity table parsed"
    );

    Ok(Table {
        rows: built.rows,
        warnings: built.warnings,
        ignored: built.ignored,
    })
}
