//! cflat front end
//!
//! Scanning, parsing, name resolution and type checking for cflat, a
//! small C-like language with scalar types, structs and functions.

pub mod feedback;
pub mod frontend;
pub mod types;
pub mod utils;

pub use feedback::{Diagnostic, DiagnosticKind, Diagnostics};
pub use frontend::parse;
pub use frontend::semantic::{analyze, Analysis};
