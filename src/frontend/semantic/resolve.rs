//! Name resolution
//!
//! Walks the program once, in source order, maintaining the lexical scope
//! stack. Declarations create symbols; uses are linked to the symbol they
//! denote. Struct fields are declared into a private table owned by their
//! struct definition, so field names never clash with ordinary names.

use crate::feedback::{DiagnosticKind, Diagnostics};
use crate::frontend::ast::*;
use crate::frontend::semantic::symbol::{
    Bindings, StructId, StructInfo, Symbol, SymbolId, SymbolKind,
};
use crate::frontend::semantic::symbol_table::SymbolTable;
use crate::types::Type;
use crate::utils::Result;

/// Outcome of resolving a dot-access chain
enum Access {
    /// Already reported, or silently unresolvable
    Failed,
    /// The field was found; carries its struct definition when the field
    /// is itself a struct variable
    Resolved(Option<StructId>),
}

/// Name resolver state
pub struct NameResolver<'d> {
    scopes: SymbolTable,
    bindings: Bindings,
    diags: &'d mut Diagnostics,
}

impl<'d> NameResolver<'d> {
    pub fn new(diags: &'d mut Diagnostics) -> Self {
        Self {
            scopes: SymbolTable::new(),
            bindings: Bindings::default(),
            diags,
        }
    }

    /// Resolve every name in the program
    pub fn resolve_program(mut self, program: &Program) -> Result<Bindings> {
        for decl in &program.decls {
            match decl {
                Decl::Var(var) => self.resolve_declaration(&var.ty, &var.name, None)?,
                Decl::Function(func) => self.resolve_function(func)?,
                Decl::Struct(def) => self.resolve_struct(def)?,
            }
        }

        log::debug!(
            "name resolution finished: {} symbols, {} errors",
            self.bindings.symbol_count(),
            self.diags.fatal_count()
        );

        let mut bindings = self.bindings;
        bindings.set_globals(self.scopes);
        Ok(bindings)
    }

    fn enter_scope(&mut self) {
        self.scopes.push_scope();
        log::trace!("enter scope (depth {})", self.scopes.depth());
    }

    fn exit_scope(&mut self) -> Result<()> {
        log::trace!("exit scope (depth {})", self.scopes.depth());
        self.scopes.pop_scope()
    }

    /// Declare a variable, formal or struct field.
    ///
    /// Fields go into `fields`; everything else into the innermost lexical
    /// scope. A void type and a duplicate name are reported independently,
    /// and either one keeps the name unbound.
    fn resolve_declaration(
        &mut self,
        ty: &TypeSpec,
        name: &Ident,
        fields: Option<&mut SymbolTable>,
    ) -> Result<()> {
        let mut bad = false;

        let kind = match ty {
            TypeSpec::Int => Some(SymbolKind::Plain(Type::Int)),
            TypeSpec::Bool => Some(SymbolKind::Plain(Type::Bool)),
            TypeSpec::Void => {
                self.diags.fatal(name.span, DiagnosticKind::NonFunctionVoid);
                bad = true;
                None
            }
            TypeSpec::Struct(type_name) => match self.struct_named(&type_name.name) {
                Some((sym, def)) => {
                    self.bindings.link(type_name.id, sym);
                    Some(SymbolKind::StructVar {
                        def,
                        struct_name: type_name.name.clone(),
                    })
                }
                None => {
                    self.diags
                        .fatal(type_name.span, DiagnosticKind::InvalidStructType);
                    bad = true;
                    None
                }
            },
        };

        let target = match fields {
            Some(table) => table,
            None => &mut self.scopes,
        };

        if target.lookup_local(&name.name).is_some() {
            self.diags.fatal(name.span, DiagnosticKind::MultiplyDeclared);
            bad = true;
        }

        if let (false, Some(kind)) = (bad, kind) {
            let id = self.bindings.alloc_symbol(Symbol {
                name: name.name.clone(),
                kind,
                span: name.span,
            });
            target.declare(&name.name, id)?;
            self.bindings.link(name.id, id);
            log::trace!("{}: declared {}", name.span, name.name);
        }

        Ok(())
    }

    /// Struct definition bound to `name` in any enclosing scope
    fn struct_named(&self, name: &str) -> Option<(SymbolId, StructId)> {
        let id = self.scopes.lookup_any(name)?;
        match self.bindings.symbol(id).kind {
            SymbolKind::StructDef(def) => Some((id, def)),
            _ => None,
        }
    }

    fn resolve_function(&mut self, func: &FnDecl) -> Result<()> {
        let name = &func.name;
        let params: Vec<Type> = func.formals.iter().map(|f| declared_type(&f.ty)).collect();
        let ret = declared_type(&func.ret);

        if self.scopes.lookup_local(&name.name).is_some() {
            self.diags.fatal(name.span, DiagnosticKind::MultiplyDeclared);
        } else {
            let id = self.bindings.alloc_symbol(Symbol {
                name: name.name.clone(),
                kind: SymbolKind::Function { params, ret },
                span: name.span,
            });
            self.scopes.declare(&name.name, id)?;
            self.bindings.link(name.id, id);
            log::trace!("{}: declared function {}", name.span, name.name);
        }

        // formals and the top level of the body share one scope
        self.enter_scope();
        for formal in &func.formals {
            self.resolve_declaration(&formal.ty, &formal.name, None)?;
        }
        self.resolve_body(&func.body)?;
        self.exit_scope()
    }

    fn resolve_struct(&mut self, def: &StructDecl) -> Result<()> {
        let name = &def.name;
        let duplicate = self.scopes.lookup_local(&name.name).is_some();
        if duplicate {
            self.diags.fatal(name.span, DiagnosticKind::MultiplyDeclared);
        }

        let mut fields = SymbolTable::new();
        for field in &def.fields {
            self.resolve_declaration(&field.ty, &field.name, Some(&mut fields))?;
        }

        if !duplicate {
            let def_id = self.bindings.alloc_struct(StructInfo {
                name: name.name.clone(),
                fields,
            });
            let id = self.bindings.alloc_symbol(Symbol {
                name: name.name.clone(),
                kind: SymbolKind::StructDef(def_id),
                span: name.span,
            });
            self.scopes.declare(&name.name, id)?;
            self.bindings.link(name.id, id);
            log::trace!("{}: declared struct {}", name.span, name.name);
        }

        Ok(())
    }

    fn resolve_body(&mut self, body: &Body) -> Result<()> {
        for decl in &body.decls {
            self.resolve_declaration(&decl.ty, &decl.name, None)?;
        }
        for stmt in &body.stmts {
            self.resolve_stmt(stmt)?;
        }
        Ok(())
    }

    /// Nested statement bodies get a scope of their own
    fn resolve_block(&mut self, body: &Body) -> Result<()> {
        self.enter_scope();
        self.resolve_body(body)?;
        self.exit_scope()
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Assign(assign) => self.resolve_assign(assign),
            Stmt::PostInc(expr) | Stmt::PostDec(expr) | Stmt::Read(expr) | Stmt::Write(expr) => {
                self.resolve_expr(expr)
            }
            Stmt::If { cond, body } | Stmt::While { cond, body } => {
                self.resolve_expr(cond)?;
                self.resolve_block(body)
            }
            Stmt::Repeat { count, body } => {
                self.resolve_expr(count)?;
                self.resolve_block(body)
            }
            Stmt::IfElse {
                cond,
                then_body,
                else_body,
            } => {
                self.resolve_expr(cond)?;
                self.resolve_block(then_body)?;
                self.resolve_block(else_body)
            }
            Stmt::Call(call) => self.resolve_call(call),
            Stmt::Return { value } => match value {
                Some(expr) => self.resolve_expr(expr),
                None => Ok(()),
            },
        }
    }

    fn resolve_assign(&mut self, assign: &Assign) -> Result<()> {
        self.resolve_expr(&assign.lhs)?;
        self.resolve_expr(&assign.rhs)
    }

    fn resolve_call(&mut self, call: &Call) -> Result<()> {
        self.resolve_use(&call.callee);
        for arg in &call.args {
            self.resolve_expr(arg)?;
        }
        Ok(())
    }

    fn resolve_expr(&mut self, expr: &Expr) -> Result<()> {
        match expr {
            Expr::IntLit(..) | Expr::StringLit(..) | Expr::True(_) | Expr::False(_) => Ok(()),
            Expr::Ident(ident) => {
                self.resolve_use(ident);
                Ok(())
            }
            Expr::DotAccess(access) => self.resolve_dot_access(access).map(|_| ()),
            Expr::Assign(assign) => self.resolve_assign(assign),
            Expr::Call(call) => self.resolve_call(call),
            Expr::Unary { expr, .. } => self.resolve_expr(expr),
            Expr::Binary { left, right, .. } => {
                self.resolve_expr(left)?;
                self.resolve_expr(right)
            }
        }
    }

    /// Link a use of a name to the innermost visible declaration
    fn resolve_use(&mut self, ident: &Ident) {
        match self.scopes.lookup_any(&ident.name) {
            Some(id) => self.bindings.link(ident.id, id),
            None => self
                .diags
                .fatal(ident.span, DiagnosticKind::UndeclaredIdentifier),
        }
    }

    fn resolve_dot_access(&mut self, access: &DotAccess) -> Result<Access> {
        let def = match access.base.as_ref() {
            Expr::Ident(ident) => {
                self.resolve_use(ident);
                let Some(symbol) = self.bindings.resolved(ident.id) else {
                    return Ok(Access::Failed);
                };
                match symbol.struct_def() {
                    Some(def) => def,
                    None => {
                        self.diags
                            .fatal(ident.span, DiagnosticKind::DotAccessOfNonStruct);
                        return Ok(Access::Failed);
                    }
                }
            }
            Expr::DotAccess(inner) => match self.resolve_dot_access(inner)? {
                Access::Failed => return Ok(Access::Failed),
                Access::Resolved(Some(def)) => def,
                Access::Resolved(None) => {
                    self.diags
                        .fatal(inner.field.span, DiagnosticKind::DotAccessOfNonStruct);
                    return Ok(Access::Failed);
                }
            },
            other => {
                self.resolve_expr(other)?;
                self.diags
                    .fatal(other.span(), DiagnosticKind::DotAccessOfNonStruct);
                return Ok(Access::Failed);
            }
        };

        let field = &access.field;
        let Some(id) = self.bindings.struct_info(def).fields.lookup_local(&field.name) else {
            self.diags
                .fatal(field.span, DiagnosticKind::InvalidStructField);
            return Ok(Access::Failed);
        };

        self.bindings.link(field.id, id);
        let nested = self.bindings.symbol(id).struct_def();
        if let Some(nested) = nested {
            self.bindings.annotate_dot(access.id, nested);
        }
        Ok(Access::Resolved(nested))
    }
}

/// Type written for a formal or a return; these are never struct types in
/// well-formed source
fn declared_type(ty: &TypeSpec) -> Type {
    match ty {
        TypeSpec::Int => Type::Int,
        TypeSpec::Bool => Type::Bool,
        TypeSpec::Void => Type::Void,
        TypeSpec::Struct(name) => Type::Struct(name.name.clone()),
    }
}

pub(crate) fn return_type(func: &FnDecl) -> Type {
    declared_type(&func.ret)
}
