//! Delimited-text record splitter.
//!
//! Splits the source into records and cells, honoring quoted cells
//! (`"a,b"`, with `""` standing for a literal quote) that may span lines.
//! Every cell keeps the byte span it was read from so later diagnostics can
//! point at it. Blank lines produce no record.

use winnow::{
    Parser as _,
    combinator::alt,
    error::{ContextError, ErrMode},
    stream::Stream,
    token::{one_of, take_till},
};

use crate::{
    error::{Diagnostic, ErrorCode},
    span::Span,
};

/// Delimiters considered by [`detect_delimiter`], in tie-break order.
const CANDIDATE_DELIMITERS: [char; 3] = [',', ';', '\t'];

/// Number of leading non-blank lines searched for the header.
pub(crate) const HEADER_SEARCH_LINES: usize = 10;

/// Context type for record errors
#[derive(Debug, Clone, PartialEq, Eq)]
enum Context {
    /// Remaining input length (`eof_offset()`) at the opening quote
    QuoteStart(usize),
}

type Input<'src> = &'src str;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;

/// A single cell and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Cell {
    pub text: String,
    pub span: Span,
}

/// One logical line of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Record {
    pub cells: Vec<Cell>,
    pub span: Span,
}

impl Record {
    /// Returns the trimmed text of cell `index`, or `""` when the record is
    /// shorter than that.
    pub fn text(&self, index: usize) -> &str {
        self.cells
            .get(index)
            .map(|cell| cell.text.trim())
            .unwrap_or_default()
    }

    /// Returns the span of cell `index`, falling back to the record span.
    pub fn cell_span(&self, index: usize) -> Span {
        self.cells
            .get(index)
            .map(|cell| cell.span)
            .unwrap_or(self.span)
    }

    fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| cell.text.trim().is_empty())
    }
}

/// Picks the delimiter used by `source`.
///
/// The line inspected is the first of the leading non-blank lines that
/// mentions `name` (the likely header), or the first non-blank line. The
/// most frequent candidate wins; ties go to the earlier candidate in
/// `, ; \t` order, and a line with none of them yields `,`.
pub(crate) fn detect_delimiter(source: &str) -> char {
    let mut lines = source
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(HEADER_SEARCH_LINES);
    let first = lines.clone().next().unwrap_or_default();
    let header = lines
        .find(|line| line.to_lowercase().contains("name"))
        .unwrap_or(first);

    let mut best = CANDIDATE_DELIMITERS[0];
    let mut best_count = 0;
    for candidate in CANDIDATE_DELIMITERS {
        let count = header.matches(candidate).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

/// Splits `source` into non-blank records.
pub(crate) fn split_records(source: &str, delimiter: char) -> Result<Vec<Record>, Diagnostic> {
    let mut input: Input<'_> = source;
    let mut records = Vec::new();

    while !input.is_empty() {
        let record = record(&mut input, source, delimiter)
            .map_err(|err| convert_error(source, err))?;
        if !input.is_empty() {
            line_ending(&mut input).map_err(|err| convert_error(source, err))?;
        }
        if !record.is_blank() {
            records.push(record);
        }
    }

    Ok(records)
}

fn offset(source: &str, input: &Input<'_>) -> usize {
    source.len() - input.eof_offset()
}

fn quote<'src>(input: &mut Input<'src>) -> IResult<char> {
    '"'.parse_next(input)
}

fn quoted_text<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    take_till(0.., '"').parse_next(input)
}

fn bare_text<'src>(input: &mut Input<'src>, delimiter: char) -> IResult<&'src str> {
    take_till(0.., move |c: char| c == delimiter || c == '\n' || c == '\r').parse_next(input)
}

fn separator<'src>(input: &mut Input<'src>, delimiter: char) -> IResult<char> {
    one_of(delimiter).parse_next(input)
}

fn line_ending<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    alt(("\r\n", "\n", "\r")).parse_next(input)
}

/// Parse a quoted cell body, unescaping doubled quotes.
fn quoted_field<'src>(input: &mut Input<'src>) -> IResult<String> {
    let start_remaining = input.eof_offset();
    quote(input)?;

    let mut text = String::new();
    loop {
        text.push_str(quoted_text(input)?);
        if input.is_empty() {
            let mut e = ContextError::new();
            e.push(Context::QuoteStart(start_remaining));
            return Err(ErrMode::Cut(e));
        }
        quote(input)?;
        if !input.starts_with('"') {
            break;
        }
        quote(input)?;
        text.push('"');
    }
    Ok(text)
}

/// Parse one cell. Text trailing a closing quote is kept verbatim.
fn field<'src>(input: &mut Input<'src>, delimiter: char) -> IResult<String> {
    if input.starts_with('"') {
        let mut text = quoted_field(input)?;
        text.push_str(bare_text(input, delimiter)?);
        Ok(text)
    } else {
        bare_text(input, delimiter).map(str::to_string)
    }
}

fn record<'src>(input: &mut Input<'src>, source: &str, delimiter: char) -> IResult<Record> {
    let start = offset(source, input);
    let mut cells = Vec::new();

    loop {
        let cell_start = offset(source, input);
        let text = field(input, delimiter)?;
        cells.push(Cell {
            text,
            span: Span::new(cell_start..offset(source, input)),
        });

        if !input.starts_with(delimiter) {
            break;
        }
        separator(input, delimiter)?;
    }

    Ok(Record {
        cells,
        span: Span::new(start..offset(source, input)),
    })
}

fn convert_error(source: &str, error: ErrMode<ContextError<Context>>) -> Diagnostic {
    let start = match &error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e.context().find_map(|ctx| match ctx {
            Context::QuoteStart(remaining) => Some(source.len() - remaining),
        }),
        ErrMode::Incomplete(_) => None,
    }
    .unwrap_or(source.len());

    Diagnostic::error("unterminated quoted field")
        .with_code(ErrorCode::E002)
        .with_label(Span::new(start..source.len()), "quote opened here is never closed")
        .with_help("close the cell with `\"` and write embedded quotes as `\"\"`")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(records: &[Record]) -> Vec<Vec<&str>> {
        records
            .iter()
            .map(|record| record.cells.iter().map(|c| c.text.as_str()).collect())
            .collect()
    }

    #[test]
    fn test_simple_records() {
        let records = split_records("Name,Actor\nAction A,X\n", ',').unwrap();
        assert_eq!(texts(&records), [vec!["Name", "Actor"], vec!["Action A", "X"]]);
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let records = split_records("Name;Actor\r\n\r\n ; \r\nAction A;X", ';').unwrap();
        assert_eq!(texts(&records), [vec!["Name", "Actor"], vec!["Action A", "X"]]);
    }

    #[test]
    fn test_quoted_cells() {
        let source = "Name,Input\n\"Action A\",\"a, b\"\n\"Say \"\"hi\"\"\",\"x\ny\"\n";
        let records = split_records(source, ',').unwrap();
        assert_eq!(records[1].cells[1].text, "a, b");
        assert_eq!(records[2].cells[0].text, "Say \"hi\"");
        assert_eq!(records[2].cells[1].text, "x\ny");
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_empty_trailing_cell() {
        let records = split_records("a,b,\n", ',').unwrap();
        assert_eq!(texts(&records), [vec!["a", "b", ""]]);
    }

    #[test]
    fn test_cell_spans() {
        let source = "Name,Actor\nAction A,X\n";
        let records = split_records(source, ',').unwrap();
        let cell = &records[1].cells[0];
        assert_eq!(&source[cell.span.start()..cell.span.end()], "Action A");
        assert_eq!(records[1].cell_span(5), records[1].span);
        assert_eq!(records[1].text(5), "");
    }

    #[test]
    fn test_unterminated_quote() {
        let source = "Name,Input\nAction A,\"a;b\n";
        let diag = split_records(source, ',').unwrap_err();
        assert_eq!(diag.code(), Some(ErrorCode::E002));
        let span = diag.labels()[0].span();
        assert_eq!(span.start(), source.find('"').unwrap());
        assert_eq!(span.end(), source.len());
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("Name,Input,Output\n"), ',');
        assert_eq!(detect_delimiter("Name;Input;Output\n"), ';');
        assert_eq!(detect_delimiter("Name\tInput\tOutput\n"), '\t');
        assert_eq!(detect_delimiter("Title\n\nName;Input, Output;Actor\n"), ';');
        assert_eq!(detect_delimiter("single column\n"), ',');
        assert_eq!(detect_delimiter(""), ',');
    }
}
