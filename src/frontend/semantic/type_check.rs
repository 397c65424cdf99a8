//! Type checking
//!
//! Runs over a program whose names all resolved. Every expression gets a
//! type; an operand of type `Error` has already been reported, so rules
//! stay quiet about it and propagate `Error` instead.

use crate::feedback::{DiagnosticKind, Diagnostics};
use crate::frontend::ast::*;
use crate::frontend::semantic::resolve::return_type;
use crate::frontend::semantic::symbol::Bindings;
use crate::types::Type;
use crate::utils::{Error, Result, Span};

/// Type checker state
pub struct TypeChecker<'a> {
    bindings: &'a Bindings,
    diags: &'a mut Diagnostics,
}

impl<'a> TypeChecker<'a> {
    pub fn new(bindings: &'a Bindings, diags: &'a mut Diagnostics) -> Self {
        Self { bindings, diags }
    }

    /// Check every function body; global declarations need no checking
    pub fn check_program(&mut self, program: &Program) -> Result<()> {
        for decl in &program.decls {
            if let Decl::Function(func) = decl {
                log::trace!("{}: checking {}", func.name.span, func.name.name);
                self.check_body(&func.body, &return_type(func))?;
            }
        }
        log::debug!("type checking finished: {} errors", self.diags.fatal_count());
        Ok(())
    }

    fn check_body(&mut self, body: &Body, ret: &Type) -> Result<()> {
        for stmt in &body.stmts {
            self.check_stmt(stmt, ret)?;
        }
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &Stmt, ret: &Type) -> Result<()> {
        match stmt {
            Stmt::Assign(assign) => {
                self.check_assign(assign)?;
            }
            Stmt::PostInc(expr) | Stmt::PostDec(expr) => {
                let ty = self.check_expr(expr)?;
                if !ty.is_error() && !ty.is_int() {
                    self.diags
                        .fatal(expr.span(), DiagnosticKind::ArithmeticNonNumeric);
                }
            }
            Stmt::Read(expr) => {
                let ty = self.check_expr(expr)?;
                let kind = match ty {
                    Type::Function { .. } => Some(DiagnosticKind::ReadFunction),
                    Type::StructDef(_) => Some(DiagnosticKind::ReadStructName),
                    Type::Struct(_) => Some(DiagnosticKind::ReadStructVar),
                    _ => None,
                };
                if let Some(kind) = kind {
                    self.diags.fatal(expr.span(), kind);
                }
            }
            Stmt::Write(expr) => {
                let ty = self.check_expr(expr)?;
                let kind = match ty {
                    Type::Function { .. } => Some(DiagnosticKind::WriteFunction),
                    Type::StructDef(_) => Some(DiagnosticKind::WriteStructName),
                    Type::Struct(_) => Some(DiagnosticKind::WriteStructVar),
                    Type::Void => Some(DiagnosticKind::WriteVoid),
                    _ => None,
                };
                if let Some(kind) = kind {
                    self.diags.fatal(expr.span(), kind);
                }
            }
            Stmt::If { cond, body } => {
                self.check_condition(cond, Type::is_bool, DiagnosticKind::NonBoolIf)?;
                self.check_body(body, ret)?;
            }
            Stmt::IfElse {
                cond,
                then_body,
                else_body,
            } => {
                self.check_condition(cond, Type::is_bool, DiagnosticKind::NonBoolIf)?;
                self.check_body(then_body, ret)?;
                self.check_body(else_body, ret)?;
            }
            Stmt::While { cond, body } => {
                self.check_condition(cond, Type::is_bool, DiagnosticKind::NonBoolWhile)?;
                self.check_body(body, ret)?;
            }
            Stmt::Repeat { count, body } => {
                self.check_condition(count, Type::is_int, DiagnosticKind::NonIntRepeat)?;
                self.check_body(body, ret)?;
            }
            Stmt::Call(call) => {
                self.check_call(call)?;
            }
            Stmt::Return { value } => self.check_return(value.as_ref(), ret)?,
        }
        Ok(())
    }

    fn check_condition(
        &mut self,
        cond: &Expr,
        accepts: fn(&Type) -> bool,
        kind: DiagnosticKind,
    ) -> Result<()> {
        let ty = self.check_expr(cond)?;
        if !ty.is_error() && !accepts(&ty) {
            self.diags.fatal(cond.span(), kind);
        }
        Ok(())
    }

    fn check_return(&mut self, value: Option<&Expr>, ret: &Type) -> Result<()> {
        match value {
            Some(expr) => {
                let ty = self.check_expr(expr)?;
                if ret.is_void() {
                    self.diags
                        .fatal(expr.span(), DiagnosticKind::ReturnValueInVoid);
                } else if !ret.is_error() && !ty.is_error() && *ret != ty {
                    self.diags.fatal(expr.span(), DiagnosticKind::BadReturnValue);
                }
            }
            None => {
                if !ret.is_void() {
                    self.diags
                        .fatal(Span::start_of_file(), DiagnosticKind::MissingReturnValue);
                }
            }
        }
        Ok(())
    }

    /// Compute the type of an expression, reporting misuse along the way
    pub fn check_expr(&mut self, expr: &Expr) -> Result<Type> {
        match expr {
            Expr::IntLit(..) => Ok(Type::Int),
            Expr::StringLit(..) => Ok(Type::String),
            Expr::True(_) | Expr::False(_) => Ok(Type::Bool),
            Expr::Ident(ident) => self.ident_type(ident),
            Expr::DotAccess(access) => self.ident_type(&access.field),
            Expr::Assign(assign) => self.check_assign(assign),
            Expr::Call(call) => self.check_call(call),
            Expr::Unary { op, expr } => {
                let ty = self.check_expr(expr)?;
                let operands = [(&ty, expr.span())];
                Ok(match op {
                    UnOp::Neg => self.check_operands(
                        &operands,
                        Type::is_int,
                        DiagnosticKind::ArithmeticNonNumeric,
                        Type::Int,
                    ),
                    UnOp::Not => self.check_operands(
                        &operands,
                        Type::is_bool,
                        DiagnosticKind::LogicalNonBool,
                        Type::Bool,
                    ),
                })
            }
            Expr::Binary { left, op, right } => {
                let lt = self.check_expr(left)?;
                let rt = self.check_expr(right)?;
                let operands = [(&lt, left.span()), (&rt, right.span())];
                Ok(match op.class() {
                    OpClass::Arithmetic => self.check_operands(
                        &operands,
                        Type::is_int,
                        DiagnosticKind::ArithmeticNonNumeric,
                        Type::Int,
                    ),
                    OpClass::Logical => self.check_operands(
                        &operands,
                        Type::is_bool,
                        DiagnosticKind::LogicalNonBool,
                        Type::Bool,
                    ),
                    OpClass::Relational => self.check_operands(
                        &operands,
                        Type::is_int,
                        DiagnosticKind::RelationalNonNumeric,
                        Type::Bool,
                    ),
                    OpClass::Equality => self.check_equality(&lt, &rt, left.span()),
                })
            }
        }
    }

    /// Type of the symbol an identifier was linked to
    fn ident_type(&self, ident: &Ident) -> Result<Type> {
        self.bindings
            .resolved(ident.id)
            .map(|symbol| symbol.ty())
            .ok_or_else(|| Error::UnresolvedName {
                name: ident.name.clone(),
                span: ident.span,
            })
    }

    /// Each operand must satisfy `accepts`; every offending operand is
    /// reported at its own position
    fn check_operands(
        &mut self,
        operands: &[(&Type, Span)],
        accepts: fn(&Type) -> bool,
        kind: DiagnosticKind,
        result: Type,
    ) -> Type {
        let mut out = result;
        for &(ty, span) in operands {
            if ty.is_error() {
                out = Type::Error;
            } else if !accepts(ty) {
                self.diags.fatal(span, kind);
                out = Type::Error;
            }
        }
        out
    }

    fn check_equality(&mut self, left: &Type, right: &Type, span: Span) -> Type {
        let mut result = Type::Bool;

        let misuse = if left.is_void() && right.is_void() {
            Some(DiagnosticKind::EqualityVoid)
        } else if left.is_function() && right.is_function() {
            Some(DiagnosticKind::EqualityFunctions)
        } else if left.is_struct_def() && right.is_struct_def() {
            Some(DiagnosticKind::EqualityStructNames)
        } else if left.is_struct() && right.is_struct() {
            Some(DiagnosticKind::EqualityStructVars)
        } else {
            None
        };
        if let Some(kind) = misuse {
            self.diags.fatal(span, kind);
            result = Type::Error;
        }

        if mismatched(left, right) {
            self.diags.fatal(span, DiagnosticKind::TypeMismatch);
            result = Type::Error;
        }

        if left.is_error() || right.is_error() {
            result = Type::Error;
        }
        result
    }

    fn check_assign(&mut self, assign: &Assign) -> Result<Type> {
        let lt = self.check_expr(&assign.lhs)?;
        let rt = self.check_expr(&assign.rhs)?;
        let span = assign.lhs.span();
        let mut result = lt.clone();

        let misuse = if lt.is_function() && rt.is_function() {
            Some(DiagnosticKind::FunctionAssignment)
        } else if lt.is_struct_def() && rt.is_struct_def() {
            Some(DiagnosticKind::StructNameAssignment)
        } else if lt.is_struct() && rt.is_struct() {
            Some(DiagnosticKind::StructVarAssignment)
        } else {
            None
        };
        if let Some(kind) = misuse {
            self.diags.fatal(span, kind);
            result = Type::Error;
        }

        if mismatched(&lt, &rt) {
            self.diags.fatal(span, DiagnosticKind::TypeMismatch);
            result = Type::Error;
        }

        if lt.is_error() || rt.is_error() {
            result = Type::Error;
        }
        Ok(result)
    }

    /// A call has the callee's return type even when its arguments are
    /// wrong; only calling a non-function yields `Error`
    fn check_call(&mut self, call: &Call) -> Result<Type> {
        let callee = &call.callee;
        let Type::Function { params, ret } = self.ident_type(callee)? else {
            self.diags.fatal(callee.span, DiagnosticKind::CallNonFunction);
            return Ok(Type::Error);
        };

        if call.args.len() != params.len() {
            self.diags.fatal(callee.span, DiagnosticKind::WrongArgCount);
            return Ok(*ret);
        }

        for (arg, formal) in call.args.iter().zip(params.iter()) {
            let actual = self.check_expr(arg)?;
            if !actual.is_error() && actual != *formal {
                self.diags
                    .fatal(arg.span(), DiagnosticKind::ActualFormalMismatch);
            }
        }
        Ok(*ret)
    }
}

/// Two known types that differ, outside the pairs that get a dedicated
/// message of their own
fn mismatched(left: &Type, right: &Type) -> bool {
    !left.is_error()
        && !right.is_error()
        && !(left.is_function() && right.is_function())
        && !(left.is_struct_def() && right.is_struct_def())
        && left != right
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::parse;
    use crate::frontend::semantic::resolve::NameResolver;
    use pretty_assertions::assert_eq;

    fn check(source: &str) -> Vec<String> {
        let program = parse(source).unwrap();
        let mut diags = Diagnostics::new();
        let bindings = NameResolver::new(&mut diags)
            .resolve_program(&program)
            .unwrap();
        assert!(diags.is_empty(), "unexpected name errors: {}", diags);
        TypeChecker::new(&bindings, &mut diags)
            .check_program(&program)
            .unwrap();
        diags.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_well_typed_program() {
        let source = r#"
int count;
bool flag;
int add(int a, int b) {
    return a + b;
}
void main() {
    int i;
    i = add(1, 2) * -3;
    flag = !(i < 4) || i == count && true;
    count++;
    cin >> i;
    cout << "done";
    repeat (i) { i--; }
    while (flag) { flag = false; }
    if (i != 0) { cout << i; } else { return; }
}
"#;
        assert_eq!(check(source), Vec::<String>::new());
    }

    #[test]
    fn test_arithmetic_reports_each_operand() {
        assert_eq!(
            check("void f() {\n  int x;\n  x = true + false;\n}\n"),
            vec![
                "3:7 ***ERROR*** Arithmetic operator applied to non-numeric operand",
                "3:14 ***ERROR*** Arithmetic operator applied to non-numeric operand",
            ]
        );
    }

    #[test]
    fn test_errors_absorbed() {
        // the inner error is reported once; the outer operators stay quiet
        assert_eq!(
            check("void f() {\n  int x;\n  x = (true + 1) * 2 + 3;\n}\n"),
            vec!["3:8 ***ERROR*** Arithmetic operator applied to non-numeric operand"]
        );
        assert_eq!(
            check("void f() {\n  bool b;\n  if (!(1 + true)) { }\n}\n"),
            vec!["3:13 ***ERROR*** Arithmetic operator applied to non-numeric operand"]
        );
    }

    #[test]
    fn test_logical_and_relational() {
        assert_eq!(
            check("void f() {\n  bool b;\n  b = 1 && true;\n  b = true < 2;\n}\n"),
            vec![
                "3:7 ***ERROR*** Logical operator applied to non-bool operand",
                "4:7 ***ERROR*** Relational operator applied to non-numeric operand",
            ]
        );
    }

    #[test]
    fn test_equality_rules() {
        let source = "struct S { int a; };\nstruct T { int a; };\nstruct S s;\nstruct T t;\n\
void g() { }\nvoid h() { }\nint k() { return 0; }\n\
void f() {\n  bool b;\n  b = g() == h();\n  b = k == g;\n  b = S == T;\n  b = s == t;\n  b = 1 == true;\n}\n";
        assert_eq!(
            check(source),
            vec![
                "10:7 ***ERROR*** Equality operator applied to void functions",
                "11:7 ***ERROR*** Equality operator applied to functions",
                "12:7 ***ERROR*** Equality operator applied to struct names",
                "13:7 ***ERROR*** Equality operator applied to struct variables",
                "13:7 ***ERROR*** Type mismatch",
                "14:7 ***ERROR*** Type mismatch",
            ]
        );
    }

    #[test]
    fn test_assignment_rules() {
        let source = "struct S { int a; };\nstruct S s;\nstruct S r;\nint g() { return 0; }\n\
void f() {\n  int x;\n  g = g;\n  S = S;\n  s = r;\n  x = true;\n  x = s.a;\n}\n";
        assert_eq!(
            check(source),
            vec![
                "7:3 ***ERROR*** Function assignment",
                "8:3 ***ERROR*** Struct name assignment",
                "9:3 ***ERROR*** Struct variable assignment",
                "10:3 ***ERROR*** Type mismatch",
            ]
        );
    }

    #[test]
    fn test_call_rules() {
        let source = "int x;\nint g(int a, bool b) { return a; }\n\
void f() {\n  x = g(1);\n  x = g(true, 1);\n  x();\n}\n";
        assert_eq!(
            check(source),
            vec![
                "4:7 ***ERROR*** Function call with wrong number of args",
                "5:9 ***ERROR*** Type of actual does not match type of formal",
                "5:15 ***ERROR*** Type of actual does not match type of formal",
                "6:3 ***ERROR*** Attempt to call a non-function",
            ]
        );
    }

    #[test]
    fn test_io_rules() {
        let source = "struct S { int a; };\nstruct S s;\nvoid g() { }\n\
void f() {\n  cin >> g;\n  cin >> S;\n  cin >> s;\n  cout << g;\n  cout << S;\n  cout << s;\n  cout << g();\n}\n";
        assert_eq!(
            check(source),
            vec![
                "5:10 ***ERROR*** Attempt to read a function",
                "6:10 ***ERROR*** Attempt to read a struct name",
                "7:10 ***ERROR*** Attempt to read a struct variable",
                "8:11 ***ERROR*** Attempt to write a function",
                "9:11 ***ERROR*** Attempt to write a struct name",
                "10:11 ***ERROR*** Attempt to write a struct variable",
                "11:11 ***ERROR*** Attempt to write void",
            ]
        );
    }

    #[test]
    fn test_conditions() {
        let source = "void f() {\n  if (1) { }\n  if (2) { } else { }\n  while (3) { }\n  repeat (true) { }\n}\n";
        assert_eq!(
            check(source),
            vec![
                "2:7 ***ERROR*** Non-bool expression used as an if condition",
                "3:7 ***ERROR*** Non-bool expression used as an if condition",
                "4:10 ***ERROR*** Non-bool expression used as a while condition",
                "5:11 ***ERROR*** Non-integer expression used as a repeat clause",
            ]
        );
    }

    #[test]
    fn test_return_rules() {
        assert_eq!(
            check("void f() {\n  return 1;\n}\n"),
            vec!["2:10 ***ERROR*** Return with a value in a void function"]
        );
        assert_eq!(
            check("int f() {\n  return true;\n}\n"),
            vec!["2:10 ***ERROR*** Bad return value"]
        );
        assert_eq!(
            check("bool f() {\n  if (true) { return; }\n}\n"),
            vec!["0:0 ***ERROR*** Missing return value"]
        );
    }

    #[test]
    fn test_post_increment_needs_int() {
        assert_eq!(
            check("bool b;\nvoid f() {\n  b++;\n  b--;\n}\n"),
            vec![
                "3:3 ***ERROR*** Arithmetic operator applied to non-numeric operand",
                "4:3 ***ERROR*** Arithmetic operator applied to non-numeric operand",
            ]
        );
    }
}
