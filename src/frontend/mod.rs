//! Frontend module - Lexer, Parser, Semantic Analysis, Unparser

pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;
pub mod semantic;
pub mod unparse;

pub use parser::parse;
