//! Error types for actiflow operations.
//!
//! Collaborator failures are reported through [`StoreError`] and
//! [`RenderError`]; the importer wraps them, together with its own
//! conditions, in [`ActiflowError`].

use std::io;

use thiserror::Error;

use actiflow_core::semantic::ElementId;

use crate::render::{DiagramId, ShapeId};

/// Errors raised by a [`ModelStore`](crate::store::ModelStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no transaction is open")]
    NoTransaction,

    #[error("transaction `{0}` is already open")]
    TransactionOpen(String),

    #[error("unknown element {0}")]
    UnknownElement(ElementId),

    #[error("element {element} cannot be moved under {owner}")]
    InvalidMove { element: ElementId, owner: ElementId },

    #[error("element {element} is not a {expected}")]
    WrongKind {
        element: ElementId,
        expected: &'static str,
    },

    #[error("model store error: {0}")]
    Backend(String),
}

/// Errors raised by a [`DiagramRenderer`](crate::render::DiagramRenderer).
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown diagram {0}")]
    UnknownDiagram(DiagramId),

    #[error("unknown shape {shape} in diagram {diagram}")]
    UnknownShape { diagram: DiagramId, shape: ShapeId },

    #[error("renderer error: {0}")]
    Backend(String),
}

/// The main error type for actiflow operations.
#[derive(Debug, Error)]
pub enum ActiflowError {
    #[error("no activities to import")]
    NoActivities,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Model store error: {0}")]
    Store(#[from] StoreError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Export error: {0}")]
    Export(String),
}
