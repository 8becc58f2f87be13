//! Errors surfaced by the CLI.

use std::{io, path::PathBuf};

use thiserror::Error;

use actiflow::ActiflowError;
use actiflow_ingest::error::IngestError;

use crate::config::ConfigError;

/// Everything that can stop a CLI run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error on {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The table could not be read; `src` is kept for source snippets.
    #[error("{err}")]
    Ingest { err: IngestError, src: String },

    #[error(transparent)]
    Import(#[from] ActiflowError),

    #[error("Import cancelled")]
    Cancelled,
}

impl CliError {
    pub fn io(path: impl Into<PathBuf>, err: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            err,
        }
    }
}
