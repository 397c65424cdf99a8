//! Error handling for cflat
//!
//! These are hard failures: scanner and parser errors, and contract
//! violations inside the analysis. User-facing semantic problems are
//! `feedback::DiagnosticKind` values instead.

use crate::utils::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Compiler error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ==================== Scanner Errors ====================

    #[error("Unterminated string literal")]
    UnterminatedString { span: Span },

    #[error("String literal with bad escaped character")]
    BadEscape { span: Span },

    #[error("Illegal character: {ch}")]
    IllegalCharacter { ch: char, span: Span },

    // ==================== Parser Errors ====================

    #[error("Unexpected token: expected {expected}, got {got}")]
    UnexpectedToken {
        expected: String,
        got: String,
        span: Span,
    },

    #[error("Expected identifier")]
    ExpectedIdent { span: Span },

    #[error("Expected type")]
    ExpectedType { span: Span },

    #[error("Expected expression")]
    ExpectedExpr { span: Span },

    #[error("Expected a location (identifier or field access)")]
    ExpectedLocation { span: Span },

    #[error("Nesting too deep")]
    TooDeeplyNested { span: Span },

    // ==================== Symbol Table Errors ====================

    #[error("Duplicate name in scope: {name}")]
    DuplicateName { name: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Symbol table has no active scope")]
    NoActiveScope,

    // ==================== Contract Violations ====================

    #[error("Identifier {name} reached type checking without a resolved symbol")]
    UnresolvedName { name: String, span: Span },
}

impl Error {
    /// Get the span associated with this error
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnterminatedString { span }
            | Self::BadEscape { span }
            | Self::IllegalCharacter { span, .. }
            | Self::UnexpectedToken { span, .. }
            | Self::ExpectedIdent { span }
            | Self::ExpectedType { span }
            | Self::ExpectedExpr { span }
            | Self::ExpectedLocation { span }
            | Self::TooDeeplyNested { span }
            | Self::UnresolvedName { span, .. } => Some(*span),
            Self::DuplicateName { .. }
            | Self::InvalidArgument(_)
            | Self::NoActiveScope => None,
        }
    }
}
