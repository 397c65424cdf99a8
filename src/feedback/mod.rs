//! Diagnostics Module
//!
//! The ordered log of semantic errors shared by name resolution and type
//! checking:
//! - one entry per reported problem, with source position
//! - a fatal count that gates later phases
//! - text and JSON rendering for the driver

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::utils::Span;

// ==================== Diagnostic Kinds ====================

/// Every user-facing semantic error the analysis can report
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    // ---- Name resolution ----
    #[error("Undeclared identifier")]
    UndeclaredIdentifier,
    #[error("Multiply declared identifier")]
    MultiplyDeclared,
    #[error("Invalid name of struct type")]
    InvalidStructType,
    #[error("Invalid struct field name")]
    InvalidStructField,
    #[error("Dot-access of non-struct type")]
    DotAccessOfNonStruct,
    #[error("Non-function declared void")]
    NonFunctionVoid,

    // ---- Operators ----
    #[error("Arithmetic operator applied to non-numeric operand")]
    ArithmeticNonNumeric,
    #[error("Logical operator applied to non-bool operand")]
    LogicalNonBool,
    #[error("Relational operator applied to non-numeric operand")]
    RelationalNonNumeric,
    #[error("Equality operator applied to void functions")]
    EqualityVoid,
    #[error("Equality operator applied to functions")]
    EqualityFunctions,
    #[error("Equality operator applied to struct names")]
    EqualityStructNames,
    #[error("Equality operator applied to struct variables")]
    EqualityStructVars,
    #[error("Type mismatch")]
    TypeMismatch,

    // ---- Assignment ----
    #[error("Function assignment")]
    FunctionAssignment,
    #[error("Struct name assignment")]
    StructNameAssignment,
    #[error("Struct variable assignment")]
    StructVarAssignment,

    // ---- Calls ----
    #[error("Attempt to call a non-function")]
    CallNonFunction,
    #[error("Function call with wrong number of args")]
    WrongArgCount,
    #[error("Type of actual does not match type of formal")]
    ActualFormalMismatch,

    // ---- I/O statements ----
    #[error("Attempt to read a function")]
    ReadFunction,
    #[error("Attempt to read a struct name")]
    ReadStructName,
    #[error("Attempt to read a struct variable")]
    ReadStructVar,
    #[error("Attempt to write a function")]
    WriteFunction,
    #[error("Attempt to write a struct name")]
    WriteStructName,
    #[error("Attempt to write a struct variable")]
    WriteStructVar,
    #[error("Attempt to write void")]
    WriteVoid,

    // ---- Control flow ----
    #[error("Non-bool expression used as an if condition")]
    NonBoolIf,
    #[error("Non-bool expression used as a while condition")]
    NonBoolWhile,
    #[error("Non-integer expression used as a repeat clause")]
    NonIntRepeat,
    #[error("Return with a value in a void function")]
    ReturnValueInVoid,
    #[error("Bad return value")]
    BadReturnValue,
    #[error("Missing return value")]
    MissingReturnValue,
}

// ==================== Diagnostic Log ====================

/// A single reported error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub span: Span,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ***ERROR*** {}", self.span, self.kind)
    }
}

/// Report shape used for JSON output
#[derive(Debug, Serialize)]
struct Report<'a> {
    success: bool,
    fatal_count: usize,
    diagnostics: Vec<ReportEntry<'a>>,
}

#[derive(Debug, Serialize)]
struct ReportEntry<'a> {
    line: usize,
    column: usize,
    kind: &'a DiagnosticKind,
    message: String,
}

/// Ordered diagnostic log threaded through both passes
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    fatal_count: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fatal error at `span`
    pub fn fatal(&mut self, span: Span, kind: DiagnosticKind) {
        log::debug!("{}: {}", span, kind);
        self.entries.push(Diagnostic { kind, span });
        self.fatal_count += 1;
    }

    /// Whether any fatal error has been recorded
    pub fn has_fatal(&self) -> bool {
        self.fatal_count > 0
    }

    pub fn fatal_count(&self) -> usize {
        self.fatal_count
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Just the kinds, in report order
    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        self.entries.iter().map(|d| d.kind).collect()
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        let report = Report {
            success: !self.has_fatal(),
            fatal_count: self.fatal_count,
            diagnostics: self
                .entries
                .iter()
                .map(|d| ReportEntry {
                    line: d.span.line,
                    column: d.span.column,
                    kind: &d.kind,
                    message: d.kind.to_string(),
                })
                .collect(),
        };
        serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fatal_sets_flag() {
        let mut diags = Diagnostics::new();
        assert!(!diags.has_fatal());
        diags.fatal(Span::new(3, 7), DiagnosticKind::UndeclaredIdentifier);
        assert!(diags.has_fatal());
        assert_eq!(diags.fatal_count(), 1);
    }

    #[test]
    fn test_text_rendering() {
        let mut diags = Diagnostics::new();
        diags.fatal(Span::new(3, 7), DiagnosticKind::UndeclaredIdentifier);
        diags.fatal(Span::start_of_file(), DiagnosticKind::MissingReturnValue);
        assert_eq!(
            diags.to_string(),
            "3:7 ***ERROR*** Undeclared identifier\n0:0 ***ERROR*** Missing return value\n"
        );
    }

    #[test]
    fn test_json_report() {
        let mut diags = Diagnostics::new();
        diags.fatal(Span::new(1, 5), DiagnosticKind::BadReturnValue);
        let value: serde_json::Value = serde_json::from_str(&diags.to_json()).unwrap();
        assert_eq!(value["success"], serde_json::json!(false));
        assert_eq!(value["diagnostics"][0]["line"], serde_json::json!(1));
        assert_eq!(value["diagnostics"][0]["message"], serde_json::json!("Bad return value"));
    }
}
