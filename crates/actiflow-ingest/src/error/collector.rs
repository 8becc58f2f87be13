//! Collector for accumulating diagnostics while a table is read.

use crate::error::{Diagnostic, IngestError};

/// A collector for accumulating diagnostics during ingestion.
///
/// Unlike a fail-fast `Result`, the collector lets the row builder report
/// every suspicious row in one pass.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Finish collection.
    ///
    /// - If any error was emitted, returns `Err(IngestError)` with all diagnostics.
    /// - Otherwise returns the collected warnings.
    pub fn finish(self) -> Result<Vec<Diagnostic>, IngestError> {
        if self.has_errors {
            Err(IngestError::new(self.diagnostics))
        } else {
            Ok(self.diagnostics)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorCode, span::Span};

    #[test]
    fn test_collector_new_finish_ok() {
        let collector = DiagnosticCollector::new();
        assert!(collector.finish().is_ok_and(|warnings| warnings.is_empty()));
    }

    #[test]
    fn test_collector_keeps_warnings() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(
            Diagnostic::warning("sub row without a main row")
                .with_code(ErrorCode::W100)
                .with_label(Span::new(0..3), "no parent"),
        );

        let warnings = collector.finish().expect("warnings only");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code(), Some(ErrorCode::W100));
    }

    #[test]
    fn test_collector_emit_error_finish_err() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::warning("first"));
        collector.emit(Diagnostic::error("second").with_code(ErrorCode::E001));

        let err = collector.finish().expect_err("error emitted");
        assert_eq!(err.diagnostics().len(), 2);
    }
}
