//! Header detection and row building.

use std::collections::HashMap;

use log::{debug, trace, warn};

use actiflow_core::row::ActivityRow;

use crate::{
    classify::{RowClass, classify},
    error::{Diagnostic, DiagnosticCollector, ErrorCode, IngestError},
    records::{HEADER_SEARCH_LINES, Record},
    span::Span,
};

/// Roles a header cell can claim, in matching order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnRole {
    Name,
    Input,
    Output,
    Actor,
    Documentation,
}

impl ColumnRole {
    /// First role whose keyword appears in `header`.
    fn of(header: &str) -> Option<Self> {
        let header = header.to_lowercase();
        if header.contains("name") {
            Some(Self::Name)
        } else if header.contains("input") {
            Some(Self::Input)
        } else if header.contains("output") {
            Some(Self::Output)
        } else if header.contains("actor") {
            Some(Self::Actor)
        } else if header.contains("doc") || header.contains("description") {
            Some(Self::Documentation)
        } else {
            None
        }
    }
}

/// Column indices resolved from the header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Columns {
    name: usize,
    input: Option<usize>,
    output: Option<usize>,
    actor: Option<usize>,
    documentation: Option<usize>,
}

impl Columns {
    /// Resolves columns from a header candidate; `None` without a name column.
    fn from_header(record: &Record) -> Option<Self> {
        let mut name = None;
        let mut columns = Self::default();
        for (index, cell) in record.cells.iter().enumerate() {
            match ColumnRole::of(&cell.text) {
                Some(ColumnRole::Name) => name = Some(index),
                Some(ColumnRole::Input) => columns.input = Some(index),
                Some(ColumnRole::Output) => columns.output = Some(index),
                Some(ColumnRole::Actor) => columns.actor = Some(index),
                Some(ColumnRole::Documentation) => columns.documentation = Some(index),
                None => {}
            }
        }
        name.map(|name| Self { name, ..columns })
    }

    fn optional_text<'r>(record: &'r Record, column: Option<usize>) -> &'r str {
        column.map(|index| record.text(index)).unwrap_or_default()
    }
}

/// Finds the header among the leading records.
///
/// Returns the header position in `records` with its resolved columns.
pub(crate) fn find_header(records: &[Record]) -> Result<(usize, Columns), IngestError> {
    records
        .iter()
        .take(HEADER_SEARCH_LINES)
        .enumerate()
        .find_map(|(position, record)| {
            Columns::from_header(record).map(|columns| (position, columns))
        })
        .ok_or_else(|| {
            let span = records
                .iter()
                .take(HEADER_SEARCH_LINES)
                .map(|record| record.span)
                .reduce(|a, b| a.union(b))
                .unwrap_or_default();
            Diagnostic::error("header row not found")
                .with_code(ErrorCode::E001)
                .with_label(span, "no cell here mentions `name`")
                .with_help(format!(
                    "one of the first {HEADER_SEARCH_LINES} lines must have a `Name` column"
                ))
                .into()
        })
}

/// Splits a pin cell into trimmed, non-empty values.
///
/// `;` separates values when present, otherwise `,`. A cell with neither is
/// a single value.
///
/// # Examples
///
/// ```
/// # use actiflow_ingest::split_pins;
/// assert_eq!(split_pins("a; b ;; c"), ["a", "b", "c"]);
/// assert_eq!(split_pins("x, y"), ["x", "y"]);
/// assert_eq!(split_pins(" solo "), ["solo"]);
/// assert!(split_pins("  ").is_empty());
/// ```
pub fn split_pins(cell: &str) -> Vec<String> {
    let separator = if cell.contains(';') { ';' } else { ',' };
    let values: Vec<String> = cell
        .split(separator)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect();

    let whole = cell.trim();
    if values.is_empty() && !whole.is_empty() {
        vec![whole.to_string()]
    } else {
        values
    }
}

/// Result of turning data records into rows.
#[derive(Debug)]
pub(crate) struct BuiltRows {
    pub rows: Vec<ActivityRow>,
    pub warnings: Vec<Diagnostic>,
    pub ignored: usize,
}

/// Builds rows from the records following the header.
///
/// Sub rows take the name of the most recent main row as their parent.
pub(crate) fn build_rows(records: &[Record], columns: &Columns) -> Result<BuiltRows, IngestError> {
    let mut collector = DiagnosticCollector::new();
    let mut rows = Vec::new();
    let mut ignored = 0;
    let mut current_main: Option<String> = None;
    let mut main_spans: HashMap<String, Span> = HashMap::new();

    for record in records {
        let name = record.text(columns.name);
        let Some(class) = classify(name) else {
            if !name.is_empty() {
                trace!(name; "Ignoring row that is not an action");
            }
            ignored += 1;
            continue;
        };

        let name_span = record.cell_span(columns.name);
        let row = match class {
            RowClass::Main => {
                if let Some(first) = main_spans.get(name) {
                    warn!(name; "Main row name repeated");
                    collector.emit(
                        Diagnostic::warning(format!("main row `{name}` appears more than once"))
                            .with_code(ErrorCode::W101)
                            .with_label(name_span, "repeated here")
                            .with_secondary_label(*first, "first used here")
                            .with_help("sub rows attach to the most recent main row with this name"),
                    );
                } else {
                    main_spans.insert(name.to_string(), name_span);
                }
                current_main = Some(name.to_string());
                ActivityRow::main(name)
            }
            RowClass::Sub => match &current_main {
                Some(parent) => ActivityRow::sub(name, parent.as_str()),
                None => {
                    warn!(name; "Sub row encountered before any main row");
                    collector.emit(
                        Diagnostic::warning(format!(
                            "sub row `{name}` appears before any main row"
                        ))
                        .with_code(ErrorCode::W100)
                        .with_label(name_span, "no parent")
                        .with_help("move the row below the main action it belongs to"),
                    );
                    ActivityRow::orphan_sub(name)
                }
            },
        };

        let row = row
            .with_actor(Columns::optional_text(record, columns.actor))
            .with_documentation(Columns::optional_text(record, columns.documentation))
            .with_inputs(split_pins(Columns::optional_text(record, columns.input)))
            .with_outputs(split_pins(Columns::optional_text(record, columns.output)));
        rows.push(row);
    }

    debug!(rows = rows.len(), ignored; "Built rows from table");

    let warnings = collector.finish()?;
    Ok(BuiltRows {
        rows,
        warnings,
        ignored,
    })
}
