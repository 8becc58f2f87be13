//! The error type returned when a table cannot be ingested.

use std::fmt;

use crate::error::Diagnostic;

/// Error type for table ingestion.
///
/// Wraps every diagnostic collected before ingestion gave up, warnings
/// included, so a report shows the full picture.
#[derive(Debug)]
pub struct IngestError {
    diagnostics: Vec<Diagnostic>,
}

impl IngestError {
    /// Create a new ingest error from diagnostics.
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Get all diagnostics in this error.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut errors = self
            .diagnostics
            .iter()
            .filter(|diag| diag.severity().is_error());
        if let Some(first) = errors.next() {
            write!(f, "{}", first)?;
            let rest = errors.count();
            if rest > 0 {
                write!(f, " (+{} more)", rest)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for IngestError {}

impl From<Diagnostic> for IngestError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}
