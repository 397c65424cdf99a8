//! Source location tracking

use std::fmt;

/// A position in the source code (1-based line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    /// Line number
    pub line: usize,
    /// Column of the first character
    pub column: usize,
}

impl Span {
    /// Create a new span
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Position used for diagnostics that have no node to blame
    pub fn start_of_file() -> Self {
        Self { line: 0, column: 0 }
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::start_of_file()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
