//! Error codes for the ingestion diagnostic system.
//!
//! Codes are organized by phase:
//! - `E0xx` - Fatal table errors
//! - `W1xx` - Row warnings

use std::fmt;

/// Codes for categorizing ingestion diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Table Errors (E0xx)
    // =========================================================================
    /// Empty input.
    ///
    /// The source contains no non-blank lines.
    E000,

    /// Header not found.
    ///
    /// None of the first ten non-blank lines has a cell containing `name`.
    E001,

    /// Unterminated quoted field.
    ///
    /// A cell was opened with `"` but the closing quote never appears.
    E002,

    // =========================================================================
    // Row Warnings (W1xx)
    // =========================================================================
    /// Sub row before any main row.
    ///
    /// The row cannot be attached to a parent and will be skipped on import.
    W100,

    /// Duplicate main row name.
    ///
    /// Sub rows are attached by name, so only one of the duplicates can own
    /// a nested diagram.
    W101,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E000 => "E000",
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::W100 => "W100",
            ErrorCode::W101 => "W101",
        }
    }

    /// Returns a short description of what this code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E000 => "empty input",
            ErrorCode::E001 => "header row not found",
            ErrorCode::E002 => "unterminated quoted field",
            ErrorCode::W100 => "sub row without a main row",
            ErrorCode::W101 => "duplicate main row name",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
