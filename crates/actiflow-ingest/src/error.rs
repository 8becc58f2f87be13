//! Diagnostics produced while reading an activity table.
//!
//! Every problem is a [`Diagnostic`]: a severity, an optional [`ErrorCode`],
//! a message, labelled spans into the source and an optional hint. Fatal
//! diagnostics end ingestion inside an [`IngestError`]; warnings travel with
//! the parsed [`Table`](crate::Table).
//!
//! # Example
//!
//! ```
//! # use actiflow_ingest::error::{Diagnostic, ErrorCode};
//! # use actiflow_ingest::Span;
//!
//! let span = Span::new(42..48);
//! let first = Span::new(11..17);
//!
//! let diag = Diagnostic::warning("main row `Action A` appears more than once")
//!     .with_code(ErrorCode::W101)
//!     .with_label(span, "repeated here")
//!     .with_secondary_label(first, "first used here")
//!     .with_help("sub rows attach to the most recent main row with this name");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod ingest_error;
mod label;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use ingest_error::IngestError;
pub use label::{Label, LabelKind};
pub use severity::Severity;
