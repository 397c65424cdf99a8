//! Parser for cflat
//!
//! Recursive descent parser with precedence climbing for expressions.

use crate::frontend::ast::*;
use crate::frontend::lexer::Lexer;
use crate::frontend::token::{Token, TokenKind};
use crate::utils::{Error, Result};

/// Precedence level of the non-associative comparison operators
const COMPARISON_PRECEDENCE: u8 = 3;

/// How deep expressions and statement bodies may nest before the parser
/// gives up instead of exhausting the stack
pub const MAX_NESTING: usize = 100;

/// The parser
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    next_id: u32,
    depth: usize,
}

impl Parser {
    /// Create a new parser from a lexer
    pub fn new(mut lexer: Lexer) -> Result<Self> {
        Ok(Self::from_tokens(lexer.tokenize()?))
    }

    /// Create a parser from pre-tokenized input
    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let span = tokens.last().map(|t| t.span).unwrap_or_default();
            tokens.push(Token::eof(span));
        }
        Self {
            tokens,
            pos: 0,
            next_id: 0,
            depth: 0,
        }
    }

    // ==================== Helper Methods ====================

    fn current(&self) -> &Token {
        // from_tokens guarantees a trailing Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek_kind(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    fn unexpected(&self, expected: &str) -> Error {
        Error::UnexpectedToken {
            expected: expected.to_string(),
            got: self.current_kind().describe(),
            span: self.current().span,
        }
    }

    fn expect(&mut self, expected: TokenKind) -> Result<Token> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&expected.describe()))
        }
    }

    /// Run a recursive parse one nesting level deeper
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING {
            return Err(Error::TooDeeplyNested {
                span: self.current().span,
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn fresh_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    // ==================== Declarations ====================

    /// Parse a complete program
    pub fn parse_program(&mut self) -> Result<Program> {
        let mut decls = Vec::new();

        while !self.is_at_end() {
            decls.push(self.parse_decl()?);
        }

        Ok(Program { decls })
    }

    /// Parse a top-level declaration
    fn parse_decl(&mut self) -> Result<Decl> {
        match self.current_kind() {
            TokenKind::Struct => {
                if matches!(self.peek_kind(2), TokenKind::LBrace) {
                    Ok(Decl::Struct(self.parse_struct()?))
                } else {
                    Ok(Decl::Var(self.parse_var_decl()?))
                }
            }
            TokenKind::Int | TokenKind::Bool | TokenKind::Void => {
                if matches!(self.peek_kind(2), TokenKind::LParen) {
                    Ok(Decl::Function(self.parse_function()?))
                } else {
                    Ok(Decl::Var(self.parse_var_decl()?))
                }
            }
            _ => Err(self.unexpected("declaration (int, bool, void, struct)")),
        }
    }

    fn starts_var_decl(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Int | TokenKind::Bool | TokenKind::Void | TokenKind::Struct
        )
    }

    /// `type ID ;` or `struct ID ID ;`
    fn parse_var_decl(&mut self) -> Result<VarDecl> {
        let ty = if self.consume(&TokenKind::Struct) {
            TypeSpec::Struct(self.parse_ident()?)
        } else {
            self.parse_type()?
        };
        let name = self.parse_ident()?;
        self.expect(TokenKind::Semicolon)?;
        Ok(VarDecl { ty, name })
    }

    /// `struct ID { varDecl+ } [;]`
    fn parse_struct(&mut self) -> Result<StructDecl> {
        self.expect(TokenKind::Struct)?;
        let name = self.parse_ident()?;
        self.expect(TokenKind::LBrace)?;

        let mut fields = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            fields.push(self.parse_var_decl()?);
        }
        if fields.is_empty() {
            return Err(self.unexpected("field declaration"));
        }
        self.expect(TokenKind::RBrace)?;
        self.consume(&TokenKind::Semicolon);

        Ok(StructDecl { name, fields })
    }

    /// Parse a function definition
    fn parse_function(&mut self) -> Result<FnDecl> {
        let ret = self.parse_type()?;
        let name = self.parse_ident()?;

        self.expect(TokenKind::LParen)?;
        let formals = self.parse_formals()?;
        self.expect(TokenKind::RParen)?;

        let body = self.parse_body()?;

        Ok(FnDecl {
            ret,
            name,
            formals,
            body,
        })
    }

    fn parse_formals(&mut self) -> Result<Vec<Formal>> {
        let mut formals = Vec::new();

        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            let ty = self.parse_type()?;
            let name = self.parse_ident()?;
            formals.push(Formal { ty, name });
            if !self.consume(&TokenKind::Comma) {
                break;
            }
        }

        Ok(formals)
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Ident {
                    name,
                    span: token.span,
                    id: self.fresh_id(),
                })
            }
            _ => Err(Error::ExpectedIdent { span: token.span }),
        }
    }

    fn parse_type(&mut self) -> Result<TypeSpec> {
        let ty = match self.current_kind() {
            TokenKind::Int => TypeSpec::Int,
            TokenKind::Bool => TypeSpec::Bool,
            TokenKind::Void => TypeSpec::Void,
            _ => return Err(Error::ExpectedType { span: self.current().span }),
        };
        self.advance();
        Ok(ty)
    }

    /// `{ varDecl* stmt* }`
    fn parse_body(&mut self) -> Result<Body> {
        self.nested(Self::parse_body_inner)
    }

    fn parse_body_inner(&mut self) -> Result<Body> {
        self.expect(TokenKind::LBrace)?;

        let mut decls = Vec::new();
        while self.starts_var_decl() {
            decls.push(self.parse_var_decl()?);
        }

        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            stmts.push(self.parse_stmt()?);
        }
        self.expect(TokenKind::RBrace)?;

        Ok(Body { decls, stmts })
    }

    // ==================== Statements ====================

    fn parse_stmt(&mut self) -> Result<Stmt> {
        match self.current_kind() {
            TokenKind::Cin => {
                self.advance();
                self.expect(TokenKind::Read)?;
                let target = self.parse_location()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Read(target))
            }
            TokenKind::Cout => {
                self.advance();
                self.expect(TokenKind::Write)?;
                let value = self.parse_expr()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Write(value))
            }
            TokenKind::If => {
                self.advance();
                let cond = self.parse_condition()?;
                let then_body = self.parse_body()?;
                if self.consume(&TokenKind::Else) {
                    let else_body = self.parse_body()?;
                    Ok(Stmt::IfElse {
                        cond,
                        then_body,
                        else_body,
                    })
                } else {
                    Ok(Stmt::If {
                        cond,
                        body: then_body,
                    })
                }
            }
            TokenKind::While => {
                self.advance();
                let cond = self.parse_condition()?;
                let body = self.parse_body()?;
                Ok(Stmt::While { cond, body })
            }
            TokenKind::Repeat => {
                self.advance();
                let count = self.parse_condition()?;
                let body = self.parse_body()?;
                Ok(Stmt::Repeat { count, body })
            }
            TokenKind::Return => {
                self.advance();
                let value = if self.check(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Return { value })
            }
            TokenKind::Ident(_) => {
                if matches!(self.peek_kind(1), TokenKind::LParen) {
                    let call = self.parse_call()?;
                    self.expect(TokenKind::Semicolon)?;
                    return Ok(Stmt::Call(call));
                }

                let target = self.parse_location()?;
                let stmt = match self.current_kind() {
                    TokenKind::PlusPlus => {
                        self.advance();
                        Stmt::PostInc(target)
                    }
                    TokenKind::MinusMinus => {
                        self.advance();
                        Stmt::PostDec(target)
                    }
                    TokenKind::Assign => {
                        self.advance();
                        let rhs = self.parse_expr()?;
                        Stmt::Assign(Assign { lhs: target, rhs })
                    }
                    _ => return Err(self.unexpected("'=', '++' or '--'")),
                };
                self.expect(TokenKind::Semicolon)?;
                Ok(stmt)
            }
            _ => Err(self.unexpected("statement")),
        }
    }

    /// `( exp )`
    fn parse_condition(&mut self) -> Result<Expr> {
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        Ok(cond)
    }

    // ==================== Expressions ====================

    /// Parse an expression; assignment is right associative and binds
    /// loosest
    pub fn parse_expr(&mut self) -> Result<Expr> {
        self.nested(Self::parse_assign)
    }

    fn parse_assign(&mut self) -> Result<Expr> {
        let start = self.current().span;
        let left = self.parse_binary(1)?;

        if self.check(&TokenKind::Assign) {
            if !is_location(&left) {
                return Err(Error::ExpectedLocation { span: start });
            }
            self.advance();
            let rhs = self.parse_expr()?;
            return Ok(Expr::Assign(Box::new(Assign { lhs: left, rhs })));
        }

        Ok(left)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr> {
        let mut left = self.parse_unary()?;

        while let Some(prec) = self.current_kind().binary_precedence() {
            if prec < min_prec {
                break;
            }
            let op = binary_op(&self.advance().kind)
                .ok_or_else(|| self.unexpected("binary operator"))?;
            let right = self.parse_binary(prec + 1)?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };

            // a < b < c is not a valid expression
            if prec == COMPARISON_PRECEDENCE
                && self.current_kind().binary_precedence() == Some(COMPARISON_PRECEDENCE)
            {
                return Err(self.unexpected("end of comparison"));
            }
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let op = match self.current_kind() {
            TokenKind::Not => UnOp::Not,
            TokenKind::Minus => UnOp::Neg,
            _ => return self.parse_term(),
        };
        self.advance();
        let expr = self.nested(Self::parse_unary)?;
        Ok(Expr::Unary {
            op,
            expr: Box::new(expr),
        })
    }

    fn parse_term(&mut self) -> Result<Expr> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::IntLit(value) => {
                self.advance();
                Ok(Expr::IntLit(value, token.span))
            }
            TokenKind::StringLit(text) => {
                self.advance();
                Ok(Expr::StringLit(text, token.span))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::True(token.span))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::False(token.span))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::Ident(_) => {
                if matches!(self.peek_kind(1), TokenKind::LParen) {
                    Ok(Expr::Call(self.parse_call()?))
                } else {
                    self.parse_location()
                }
            }
            _ => Err(Error::ExpectedExpr { span: token.span }),
        }
    }

    /// `ID ( [exp {, exp}] )`
    fn parse_call(&mut self) -> Result<Call> {
        let callee = self.parse_ident()?;
        self.expect(TokenKind::LParen)?;

        let mut args = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            args.push(self.parse_expr()?);
            if !self.consume(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;

        Ok(Call { callee, args })
    }

    /// `ID { . ID }`
    fn parse_location(&mut self) -> Result<Expr> {
        let mut loc = Expr::Ident(self.parse_ident()?);

        while self.consume(&TokenKind::Dot) {
            let field = self.parse_ident()?;
            loc = Expr::DotAccess(DotAccess {
                base: Box::new(loc),
                field,
                id: self.fresh_id(),
            });
        }

        Ok(loc)
    }
}

fn is_location(expr: &Expr) -> bool {
    matches!(expr, Expr::Ident(_) | Expr::DotAccess(_))
}

fn binary_op(kind: &TokenKind) -> Option<BinOp> {
    let op = match kind {
        TokenKind::Plus => BinOp::Add,
        TokenKind::Minus => BinOp::Sub,
        TokenKind::Star => BinOp::Mul,
        TokenKind::Slash => BinOp::Div,
        TokenKind::AndAnd => BinOp::And,
        TokenKind::OrOr => BinOp::Or,
        TokenKind::EqEq => BinOp::Eq,
        TokenKind::Ne => BinOp::Ne,
        TokenKind::Lt => BinOp::Lt,
        TokenKind::Gt => BinOp::Gt,
        TokenKind::Le => BinOp::Le,
        TokenKind::Ge => BinOp::Ge,
        _ => return None,
    };
    Some(op)
}

/// Scan and parse a whole source text
pub fn parse(source: &str) -> Result<Program> {
    Parser::new(Lexer::new(source))?.parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_function() {
        let program = parse("void main() {}").unwrap();
        assert_eq!(program.decls.len(), 1);
        assert!(matches!(program.decls[0], Decl::Function(ref f) if f.name.name == "main"));
    }

    #[test]
    fn test_function_with_formals_and_body() {
        let program = parse("int add(int a, int b) { int c; c = a + b; return c; }").unwrap();
        let Decl::Function(ref f) = program.decls[0] else {
            panic!("expected function");
        };
        assert_eq!(f.formals.len(), 2);
        assert_eq!(f.body.decls.len(), 1);
        assert_eq!(f.body.stmts.len(), 2);
    }

    #[test]
    fn test_struct_def_and_var() {
        let program = parse("struct Point { int x; int y; }; struct Point p;").unwrap();
        assert!(matches!(program.decls[0], Decl::Struct(ref s) if s.fields.len() == 2));
        assert!(matches!(
            program.decls[1],
            Decl::Var(VarDecl { ty: TypeSpec::Struct(ref t), ref name }) if t.name == "Point" && name.name == "p"
        ));
    }

    #[test]
    fn test_precedence() {
        let program = parse("void f() { x = 1 + 2 * 3 == 7 && !b; }").unwrap();
        let Decl::Function(ref f) = program.decls[0] else {
            panic!("expected function");
        };
        let Stmt::Assign(ref assign) = f.body.stmts[0] else {
            panic!("expected assignment");
        };
        // (((1 + (2 * 3)) == 7) && (!b))
        let Expr::Binary { op: BinOp::And, ref left, .. } = assign.rhs else {
            panic!("expected &&");
        };
        let Expr::Binary { op: BinOp::Eq, ref left, .. } = **left else {
            panic!("expected ==");
        };
        assert!(matches!(**left, Expr::Binary { op: BinOp::Add, .. }));
    }

    #[test]
    fn test_chained_comparison_rejected() {
        assert!(parse("void f() { x = a < b < c; }").is_err());
    }

    #[test]
    fn test_assignment_needs_location() {
        assert!(matches!(
            parse("void f() { x = (1 + 2) = 3; }"),
            Err(Error::ExpectedLocation { .. })
        ));
    }

    #[test]
    fn test_statements() {
        let source = "void f() {
            cin >> a.b.c;
            cout << \"hi\";
            a++;
            a--;
            g(1, true);
            if (x) { int y; } else { bool z; }
            while (x) { }
            repeat (3) { return; }
        }";
        let program = parse(source).unwrap();
        let Decl::Function(ref f) = program.decls[0] else {
            panic!("expected function");
        };
        assert_eq!(f.body.stmts.len(), 8);
        assert!(matches!(f.body.stmts[0], Stmt::Read(Expr::DotAccess(_))));
        assert!(matches!(f.body.stmts[5], Stmt::IfElse { .. }));
        assert!(matches!(f.body.stmts[7], Stmt::Repeat { .. }));
    }

    #[test]
    fn test_node_ids_are_unique() {
        let program = parse("int x; int y; void f(int a) { x = a; }").unwrap();
        let mut ids = Vec::new();
        for decl in &program.decls {
            match decl {
                Decl::Var(v) => ids.push(v.name.id),
                Decl::Function(f) => {
                    ids.push(f.name.id);
                    ids.extend(f.formals.iter().map(|p| p.name.id));
                }
                Decl::Struct(s) => ids.push(s.name.id),
            }
        }
        assert_eq!(ids.len(), 4);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_unexpected_token() {
        assert!(matches!(
            parse("int x"),
            Err(Error::UnexpectedToken { .. })
        ));
        assert!(matches!(parse("x;"), Err(Error::UnexpectedToken { .. })));
    }

    fn parens(depth: usize) -> String {
        format!(
            "void f() {{ cout << {}1{}; }}",
            "(".repeat(depth),
            ")".repeat(depth)
        )
    }

    #[test]
    fn test_moderate_nesting_parses() {
        assert!(parse(&parens(50)).is_ok());
        assert!(parse(&format!("void f() {{ cout << {}true; }}", "!".repeat(50))).is_ok());
    }

    #[test]
    fn test_deep_parens_rejected() {
        let err = parse(&parens(20_000)).unwrap_err();
        assert!(matches!(err, Error::TooDeeplyNested { .. }));
        assert_eq!(err.span().map(|s| s.line), Some(1));
    }

    #[test]
    fn test_deep_unary_and_blocks_rejected() {
        let nots = format!("void f() {{ cout << {}true; }}", "!".repeat(20_000));
        assert!(matches!(parse(&nots), Err(Error::TooDeeplyNested { .. })));

        let blocks = format!(
            "bool b;\nvoid f() {{ {}{} }}",
            "if (b) { ".repeat(20_000),
            "}".repeat(20_000)
        );
        assert!(matches!(parse(&blocks), Err(Error::TooDeeplyNested { .. })));
    }
}
