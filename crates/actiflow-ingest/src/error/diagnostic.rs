//! The core diagnostic type for ingestion errors and warnings.

use std::fmt;

use crate::{
    error::{Severity, error_code::ErrorCode, label::{Label, LabelKind}},
    span::Span,
};

/// A diagnostic message with source location information.
///
/// # Example
///
/// ```text
/// warning[W100]: sub row `1.1` appears before any main row
///   --> activities.csv:2:1
///    |
///  2 | 1.1,X,a,b
///    | ^^^ no parent
///    |
///    = help: move the row below the main action it belongs to
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Labels in the order they were attached; the cause comes first.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Marks `span` as the cause of the diagnostic.
    pub fn with_label(self, span: Span, message: impl Into<String>) -> Self {
        self.labelled(LabelKind::Cause, span, message)
    }

    /// Points at a related `span`, such as an earlier definition.
    pub fn with_secondary_label(self, span: Span, message: impl Into<String>) -> Self {
        self.labelled(LabelKind::Context, span, message)
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn labelled(mut self, kind: LabelKind, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::new(kind, span, message));
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_new() {
        let diag = Diagnostic::error("no header");

        assert!(diag.severity().is_error());
        assert_eq!(diag.message(), "no header");
        assert!(diag.code().is_none());
        assert!(diag.labels().is_empty());
        assert!(diag.help().is_none());
    }

    #[test]
    fn test_diagnostic_with_labels() {
        let diag = Diagnostic::warning("duplicate main row")
            .with_code(ErrorCode::W101)
            .with_label(Span::new(30..38), "repeated here")
            .with_secondary_label(Span::new(10..18), "first used here");

        assert_eq!(diag.code(), Some(ErrorCode::W101));
        assert_eq!(diag.labels().len(), 2);
        assert_eq!(diag.labels()[0].kind(), LabelKind::Cause);
        assert_eq!(diag.labels()[1].kind(), LabelKind::Context);
    }

    #[test]
    fn test_diagnostic_with_help() {
        let diag = Diagnostic::error("header row not found").with_help("add a `Name` column");

        assert_eq!(diag.help(), Some("add a `Name` column"));
    }

    #[test]
    fn test_diagnostic_display_with_code() {
        let diag = Diagnostic::error("unterminated quoted field").with_code(ErrorCode::E002);

        assert_eq!(diag.to_string(), "error[E002]: unterminated quoted field");
    }

    #[test]
    fn test_diagnostic_display_without_code() {
        let diag = Diagnostic::warning("row ignored");

        assert_eq!(diag.to_string(), "warning: row ignored");
    }
}
