//! Error types for sheetlens-analysis
//!
//! The analysis itself is total: per-formula lexing trouble is downgraded to
//! a parse-warning flag on the formula record rather than surfaced as an
//! error (a single bad formula must never abort the run).

use thiserror::Error;

/// Problems encountered while lexing a formula for references
///
/// These never escape the reference parser; they set the parse-warning flag
/// on the affected formula and extraction continues.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefParseError {
    /// String literal missing its closing quote
    #[error("unterminated string literal")]
    UnterminatedString,

    /// Quoted sheet name missing its closing quote
    #[error("unterminated quoted sheet name")]
    UnterminatedSheetName,

    /// Sheet qualifier not followed by a cell coordinate
    #[error("expected cell coordinate after sheet qualifier '{0}'")]
    ExpectedCoordinate(String),

    /// Range separator not followed by a cell coordinate
    #[error("dangling ':' after coordinate {0}")]
    DanglingRangeSeparator(String),

    /// External workbook reference missing its closing bracket
    #[error("unterminated external workbook reference")]
    UnterminatedExternalRef,
}
