//! Lexer for cflat
//!
//! Converts source code into a stream of tokens.

use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Result, Span};

/// The lexer state
pub struct Lexer {
    /// Source code as chars
    source: Vec<char>,
    /// Current position in source
    pos: usize,
    /// Current line (1-based)
    line: usize,
    /// Current column (1-based)
    column: usize,
    /// Position of the first character of the current token
    start: Span,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            start: Span::new(1, 1),
        }
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    /// Advance to the next character, keeping line/column current
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn here(&self) -> Span {
        Span::new(self.line, self.column)
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.start)
    }

    /// Skip whitespace and comments (`//` and `#` run to end of line)
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' | '\n' | '\x0c' => {
                    self.advance();
                }
                '/' if self.peek_next() == Some('/') => self.skip_line(),
                '#' => self.skip_line(),
                _ => break,
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        let begin = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let text: String = self.source[begin..self.pos].iter().collect();
        let kind = TokenKind::keyword_from_str(&text)
            .unwrap_or_else(|| TokenKind::Ident(text));

        self.make_token(kind)
    }

    /// Read an integer literal; values past `i32::MAX` are clamped
    fn read_number(&mut self) -> Token {
        let begin = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        let text: String = self.source[begin..self.pos].iter().collect();
        let value = match text.parse::<i32>() {
            Ok(v) => v,
            Err(_) => {
                log::warn!(
                    "{}: integer literal too large; using max value",
                    self.start
                );
                i32::MAX
            }
        };
        self.make_token(TokenKind::IntLit(value))
    }

    /// Read a string literal, keeping quotes and escapes verbatim
    fn read_string(&mut self) -> Result<Token> {
        let mut text = String::new();
        // opening quote
        if let Some(q) = self.advance() {
            text.push(q);
        }

        loop {
            match self.peek() {
                None | Some('\n') => {
                    return Err(Error::UnterminatedString { span: self.start });
                }
                Some('"') => {
                    self.advance();
                    text.push('"');
                    break;
                }
                Some('\\') => {
                    self.advance();
                    text.push('\\');
                    match self.peek() {
                        Some(c @ ('n' | 't' | '\'' | '"' | '\\')) => {
                            self.advance();
                            text.push(c);
                        }
                        None | Some('\n') => {
                            return Err(Error::UnterminatedString { span: self.start });
                        }
                        Some(_) => return Err(Error::BadEscape { span: self.start }),
                    }
                }
                Some(c) => {
                    self.advance();
                    text.push(c);
                }
            }
        }

        Ok(self.make_token(TokenKind::StringLit(text)))
    }

    /// Consume `second` if it is next and return `double`, else `single`
    fn pair(&mut self, second: char, double: TokenKind, single: TokenKind) -> TokenKind {
        if self.peek() == Some(second) {
            self.advance();
            double
        } else {
            single
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();
        self.start = self.here();

        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(Token::eof(self.start)),
        };

        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(self.read_identifier());
        }
        if c.is_ascii_digit() {
            return Ok(self.read_number());
        }
        if c == '"' {
            return self.read_string();
        }

        self.advance();
        let kind = match c {
            '+' => self.pair('+', TokenKind::PlusPlus, TokenKind::Plus),
            '-' => self.pair('-', TokenKind::MinusMinus, TokenKind::Minus),
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '=' => self.pair('=', TokenKind::EqEq, TokenKind::Assign),
            '!' => self.pair('=', TokenKind::Ne, TokenKind::Not),
            '<' => {
                if self.peek() == Some('<') {
                    self.advance();
                    TokenKind::Write
                } else {
                    self.pair('=', TokenKind::Le, TokenKind::Lt)
                }
            }
            '>' => {
                if self.peek() == Some('>') {
                    self.advance();
                    TokenKind::Read
                } else {
                    self.pair('=', TokenKind::Ge, TokenKind::Gt)
                }
            }
            '&' if self.peek() == Some('&') => {
                self.advance();
                TokenKind::AndAnd
            }
            '|' if self.peek() == Some('|') => {
                self.advance();
                TokenKind::OrOr
            }
            '.' => TokenKind::Dot,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            _ => return Err(Error::IllegalCharacter { ch: c, span: self.start }),
        };

        Ok(self.make_token(kind))
    }

    /// Tokenize the entire source and return all tokens
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = kinds("int main() { }");

        assert!(matches!(tokens[0], TokenKind::Int));
        assert!(matches!(tokens[1], TokenKind::Ident(ref s) if s == "main"));
        assert!(matches!(tokens[2], TokenKind::LParen));
        assert!(matches!(tokens[3], TokenKind::RParen));
        assert!(matches!(tokens[4], TokenKind::LBrace));
        assert!(matches!(tokens[5], TokenKind::RBrace));
        assert!(matches!(tokens[6], TokenKind::Eof));
    }

    #[test]
    fn test_operators() {
        let tokens = kinds("++ -- << >> <= >= == != && || = ! . < >");

        assert_eq!(
            tokens,
            vec![
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::Write,
                TokenKind::Read,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::EqEq,
                TokenKind::Ne,
                TokenKind::AndAnd,
                TokenKind::OrOr,
                TokenKind::Assign,
                TokenKind::Not,
                TokenKind::Dot,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords() {
        let tokens = kinds("struct cin cout repeat while return");

        assert!(matches!(tokens[0], TokenKind::Struct));
        assert!(matches!(tokens[1], TokenKind::Cin));
        assert!(matches!(tokens[2], TokenKind::Cout));
        assert!(matches!(tokens[3], TokenKind::Repeat));
        assert!(matches!(tokens[4], TokenKind::While));
        assert!(matches!(tokens[5], TokenKind::Return));
    }

    #[test]
    fn test_integer_clamped() {
        let tokens = kinds("42 99999999999");

        assert!(matches!(tokens[0], TokenKind::IntLit(42)));
        assert!(matches!(tokens[1], TokenKind::IntLit(i32::MAX)));
    }

    #[test]
    fn test_strings_kept_verbatim() {
        let tokens = kinds(r#""hello\n\"world\"""#);

        assert!(matches!(tokens[0], TokenKind::StringLit(ref s) if s == r#""hello\n\"world\"""#));
    }

    #[test]
    fn test_positions_and_comments() {
        let tokens = Lexer::new("// header\nint x; # trailing\n  bool y;")
            .tokenize()
            .unwrap();

        assert_eq!(tokens[0].span, Span::new(2, 1));
        assert_eq!(tokens[1].span, Span::new(2, 5));
        assert_eq!(tokens[3].span, Span::new(3, 3));
        assert_eq!(tokens[4].span, Span::new(3, 8));
    }

    #[test]
    fn test_scanner_errors() {
        assert!(matches!(
            Lexer::new("\"open").tokenize(),
            Err(Error::UnterminatedString { .. })
        ));
        assert!(matches!(
            Lexer::new(r#""bad \q""#).tokenize(),
            Err(Error::BadEscape { .. })
        ));
        assert!(matches!(
            Lexer::new("int $x;").tokenize(),
            Err(Error::IllegalCharacter { ch: '$', .. })
        ));
    }
}
