//! Source spans attached to a diagnostic.

use crate::span::Span;

/// What a [`Label`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// The cell or line the diagnostic is about.
    Cause,
    /// A related place, such as the first use of a repeated name.
    Context,
}

/// A message pinned to a span of the source table.
#[derive(Debug, Clone)]
pub struct Label {
    kind: LabelKind,
    span: Span,
    message: String,
}

impl Label {
    pub(crate) fn new(kind: LabelKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> LabelKind {
        self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
