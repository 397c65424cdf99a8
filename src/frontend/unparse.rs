//! Unparser - print a cflat program back as source
//!
//! Expressions come out fully parenthesized. When bindings are supplied,
//! every linked identifier use is followed by its symbol in parentheses,
//! e.g. `f(int -> void)(x(int))`.

use crate::frontend::ast::*;
use crate::frontend::semantic::Bindings;

const INDENT: usize = 4;

/// Render `program` as cflat text
pub fn unparse(program: &Program, bindings: Option<&Bindings>) -> String {
    Unparser::new(bindings).print_program(program)
}

/// Pretty printer for cflat programs
pub struct Unparser<'b> {
    output: String,
    indent: usize,
    bindings: Option<&'b Bindings>,
}

impl<'b> Unparser<'b> {
    pub fn new(bindings: Option<&'b Bindings>) -> Self {
        Self {
            output: String::new(),
            indent: 0,
            bindings,
        }
    }

    pub fn print_program(&mut self, program: &Program) -> String {
        self.output.clear();
        for decl in &program.decls {
            match decl {
                Decl::Var(var) => self.print_var_decl(var),
                Decl::Function(func) => self.print_function(func),
                Decl::Struct(def) => self.print_struct(def),
            }
        }
        std::mem::take(&mut self.output)
    }

    fn pad(&mut self) {
        self.output.push_str(&" ".repeat(self.indent));
    }

    fn type_str(ty: &TypeSpec) -> String {
        match ty {
            TypeSpec::Int => "int".to_string(),
            TypeSpec::Bool => "bool".to_string(),
            TypeSpec::Void => "void".to_string(),
            TypeSpec::Struct(name) => format!("struct {}", name.name),
        }
    }

    fn print_var_decl(&mut self, var: &VarDecl) {
        self.pad();
        self.output
            .push_str(&format!("{} {};\n", Self::type_str(&var.ty), var.name.name));
    }

    fn print_function(&mut self, func: &FnDecl) {
        self.pad();
        let formals = func
            .formals
            .iter()
            .map(|f| format!("{} {}", Self::type_str(&f.ty), f.name.name))
            .collect::<Vec<_>>()
            .join(", ");
        self.output.push_str(&format!(
            "{} {}({}) {{\n",
            Self::type_str(&func.ret),
            func.name.name,
            formals
        ));
        self.print_nested(&func.body);
        self.output.push_str("}\n\n");
    }

    fn print_struct(&mut self, def: &StructDecl) {
        self.pad();
        self.output.push_str(&format!("struct {}{{\n", def.name.name));
        self.indent += INDENT;
        for field in &def.fields {
            self.print_var_decl(field);
        }
        self.indent -= INDENT;
        self.pad();
        self.output.push_str("};\n\n");
    }

    /// Print a body one level deeper than the current line
    fn print_nested(&mut self, body: &Body) {
        self.indent += INDENT;
        for decl in &body.decls {
            self.print_var_decl(decl);
        }
        for stmt in &body.stmts {
            self.print_stmt(stmt);
        }
        self.indent -= INDENT;
    }

    /// `keyword (expr) {` ... `}`
    fn print_block(&mut self, head: &str, cond: &Expr, body: &Body) {
        self.pad();
        let cond = self.expr_str(cond);
        self.output.push_str(&format!("{} ({}) {{\n", head, cond));
        self.print_nested(body);
        self.pad();
        self.output.push_str("}\n");
    }

    fn print_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::If { cond, body } => self.print_block("if", cond, body),
            Stmt::IfElse {
                cond,
                then_body,
                else_body,
            } => {
                self.print_block("if", cond, then_body);
                self.pad();
                self.output.push_str("else {\n");
                self.print_nested(else_body);
                self.pad();
                self.output.push_str("}\n");
            }
            Stmt::While { cond, body } => self.print_block("while", cond, body),
            Stmt::Repeat { count, body } => self.print_block("repeat", count, body),
            Stmt::Assign(assign) => {
                let text = self.assign_str(assign);
                self.print_line(&text);
            }
            Stmt::PostInc(expr) => self.print_line(&format!("{}++", self.expr_str(expr))),
            Stmt::PostDec(expr) => self.print_line(&format!("{}--", self.expr_str(expr))),
            Stmt::Read(expr) => self.print_line(&format!("cin >> {}", self.expr_str(expr))),
            Stmt::Write(expr) => self.print_line(&format!("cout << {}", self.expr_str(expr))),
            Stmt::Call(call) => {
                let text = self.call_str(call);
                self.print_line(&text);
            }
            Stmt::Return { value: Some(expr) } => {
                self.print_line(&format!("return {}", self.expr_str(expr)))
            }
            Stmt::Return { value: None } => self.print_line("return"),
        }
    }

    /// One simple statement on its own line
    fn print_line(&mut self, text: &str) {
        self.pad();
        self.output.push_str(text);
        self.output.push_str(";
");
    }

    fn ident_str(&self, ident: &Ident) -> String {
        match self.bindings.and_then(|b| b.resolved(ident.id)) {
            Some(symbol) => format!("{}({})", ident.name, symbol.describe()),
            None => ident.name.clone(),
        }
    }

    fn assign_str(&self, assign: &Assign) -> String {
        format!("{} = {}", self.expr_str(&assign.lhs), self.expr_str(&assign.rhs))
    }

    fn call_str(&self, call: &Call) -> String {
        let args = call
            .args
            .iter()
            .map(|arg| self.expr_str(arg))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({})", self.ident_str(&call.callee), args)
    }

    fn expr_str(&self, expr: &Expr) -> String {
        match expr {
            Expr::IntLit(value, _) => value.to_string(),
            Expr::StringLit(text, _) => text.clone(),
            Expr::True(_) => "true".to_string(),
            Expr::False(_) => "false".to_string(),
            Expr::Ident(ident) => self.ident_str(ident),
            Expr::DotAccess(access) => {
                format!("{}.{}", self.expr_str(&access.base), self.ident_str(&access.field))
            }
            Expr::Assign(assign) => format!("({})", self.assign_str(assign)),
            Expr::Call(call) => self.call_str(call),
            Expr::Unary { op, expr } => {
                let op = match op {
                    UnOp::Neg => "-",
                    UnOp::Not => "!",
                };
                format!("({}{})", op, self.expr_str(expr))
            }
            Expr::Binary { left, op, right } => format!(
                "({} {} {})",
                self.expr_str(left),
                op.symbol(),
                self.expr_str(right)
            ),
        }
    }
}
