//! Token definitions for cflat

use crate::utils::Span;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn eof(span: Span) -> Self {
        Self { kind: TokenKind::Eof, span }
    }
}

/// Token kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ============ Keywords ============
    /// int
    Int,
    /// bool
    Bool,
    /// void
    Void,
    /// true
    True,
    /// false
    False,
    /// struct
    Struct,
    /// cin
    Cin,
    /// cout
    Cout,
    /// if
    If,
    /// else
    Else,
    /// while
    While,
    /// repeat
    Repeat,
    /// return
    Return,

    // ============ Identifiers and Literals ============
    /// Identifier (variable name, function name, etc.)
    Ident(String),
    /// Integer literal
    IntLit(i32),
    /// String literal, quotes and escapes kept as written
    StringLit(String),

    // ============ Operators ============
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// !
    Not,
    /// &&
    AndAnd,
    /// ||
    OrOr,
    /// ==
    EqEq,
    /// !=
    Ne,
    /// <
    Lt,
    /// <=
    Le,
    /// >
    Gt,
    /// >=
    Ge,
    /// =
    Assign,
    /// ++
    PlusPlus,
    /// --
    MinusMinus,
    /// <<
    Write,
    /// >>
    Read,
    /// .
    Dot,

    // ============ Delimiters ============
    /// (
    LParen,
    /// )
    RParen,
    /// {
    LBrace,
    /// }
    RBrace,
    /// ,
    Comma,
    /// ;
    Semicolon,

    // ============ Special ============
    /// End of file
    Eof,
}

impl TokenKind {
    /// Try to convert an identifier to a keyword
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "int" => Some(TokenKind::Int),
            "bool" => Some(TokenKind::Bool),
            "void" => Some(TokenKind::Void),
            "true" => Some(TokenKind::True),
            "false" => Some(TokenKind::False),
            "struct" => Some(TokenKind::Struct),
            "cin" => Some(TokenKind::Cin),
            "cout" => Some(TokenKind::Cout),
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            "while" => Some(TokenKind::While),
            "repeat" => Some(TokenKind::Repeat),
            "return" => Some(TokenKind::Return),
            _ => None,
        }
    }

    /// Get the precedence of a binary operator (for precedence climbing)
    /// Returns None if not a binary operator. Assignment is handled
    /// separately because only locations may appear on its left.
    pub fn binary_precedence(&self) -> Option<u8> {
        match self {
            // Logical OR
            TokenKind::OrOr => Some(1),

            // Logical AND
            TokenKind::AndAnd => Some(2),

            // Equality and comparison (non-associative)
            TokenKind::EqEq | TokenKind::Ne
                | TokenKind::Lt | TokenKind::Le
                | TokenKind::Gt | TokenKind::Ge => Some(3),

            // Additive
            TokenKind::Plus | TokenKind::Minus => Some(4),

            // Multiplicative (highest for binary)
            TokenKind::Star | TokenKind::Slash => Some(5),

            _ => None,
        }
    }

    /// Short source-like description, used in parse errors
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier '{}'", name),
            TokenKind::IntLit(v) => format!("integer literal {}", v),
            TokenKind::StringLit(s) => format!("string literal {}", s),
            TokenKind::Eof => "end of file".to_string(),
            other => format!("{:?}", other),
        }
    }
}
