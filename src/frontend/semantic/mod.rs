//! Semantic Analysis for cflat
//!
//! Performs:
//! - Name resolution (scopes, declarations, uses, struct fields)
//! - Type checking
//!
//! Type checking only runs when name resolution reported nothing, so every
//! identifier it sees is linked to a symbol.

pub mod resolve;
pub mod symbol;
pub mod symbol_table;
pub mod type_check;

pub use resolve::NameResolver;
pub use symbol::{Bindings, StructId, StructInfo, Symbol, SymbolId, SymbolKind};
pub use symbol_table::SymbolTable;
pub use type_check::TypeChecker;

use crate::feedback::Diagnostics;
use crate::frontend::ast::Program;
use crate::utils::Result;

/// Result of analyzing one program
#[derive(Debug)]
pub struct Analysis {
    pub bindings: Bindings,
    pub diagnostics: Diagnostics,
}

impl Analysis {
    /// True when no fatal diagnostic was recorded
    pub fn is_ok(&self) -> bool {
        !self.diagnostics.has_fatal()
    }
}

/// Run name resolution and then type checking over a parsed program.
///
/// User errors end up in `Analysis::diagnostics`; an `Err` means the
/// passes themselves were misused.
pub fn analyze(program: &Program) -> Result<Analysis> {
    let mut diagnostics = Diagnostics::new();
    let bindings = NameResolver::new(&mut diagnostics).resolve_program(program)?;

    if diagnostics.has_fatal() {
        log::debug!(
            "skipping type checking after {} name errors",
            diagnostics.fatal_count()
        );
    } else {
        TypeChecker::new(&bindings, &mut diagnostics).check_program(program)?;
    }

    Ok(Analysis {
        bindings,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::DiagnosticKind;
    use crate::frontend::parser::parse;
    use crate::types::Type;
    use pretty_assertions::assert_eq;

    fn analyze_source(source: &str) -> Analysis {
        analyze(&parse(source).unwrap()).unwrap()
    }

    fn messages(analysis: &Analysis) -> Vec<String> {
        analysis.diagnostics.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_duplicate_global() {
        let analysis = analyze_source("int x;\nint x;\n");

        assert_eq!(
            messages(&analysis),
            vec!["2:5 ***ERROR*** Multiply declared identifier"]
        );
        assert_eq!(analysis.bindings.globals().local_names(), vec!["x"]);
        assert_eq!(
            analysis.bindings.global("x").map(|s| s.ty()),
            Some(Type::Int)
        );
    }

    #[test]
    fn test_duplicate_struct_keeps_first_fields() {
        let analysis = analyze_source("struct S { int a; }\nstruct S { int a; }\n");

        assert_eq!(
            messages(&analysis),
            vec!["2:8 ***ERROR*** Multiply declared identifier"]
        );
        let Some(SymbolKind::StructDef(def)) =
            analysis.bindings.global("S").map(|s| s.kind.clone())
        else {
            panic!("S is not a struct");
        };
        assert_eq!(
            analysis.bindings.field(def, "a").map(|s| s.ty()),
            Some(Type::Int)
        );
    }

    #[test]
    fn test_block_scope_popped() {
        let analysis =
            analyze_source("bool b;\nvoid f() {\n  if (b) { int y; }\n  cout << y;\n}\n");

        assert_eq!(
            messages(&analysis),
            vec!["4:11 ***ERROR*** Undeclared identifier"]
        );
    }

    #[test]
    fn test_duplicate_formal() {
        let analysis = analyze_source("int f(int a, int a) { return a; }\n");

        assert_eq!(
            messages(&analysis),
            vec!["1:18 ***ERROR*** Multiply declared identifier"]
        );
        assert_eq!(
            analysis.bindings.global("f").map(|s| s.describe()),
            Some("int, int -> int".to_string())
        );
    }

    #[test]
    fn test_bad_field_name_only() {
        let analysis = analyze_source(
            "struct Point { int x; int y; }\nstruct Point p;\nvoid f() {\n  p.z = 1;\n}\n",
        );

        assert_eq!(
            messages(&analysis),
            vec!["4:5 ***ERROR*** Invalid struct field name"]
        );
    }

    #[test]
    fn test_returns() {
        let analysis = analyze_source("void g() { return 5; }\nint h() { }\n");

        assert_eq!(
            analysis.diagnostics.kinds(),
            vec![DiagnosticKind::ReturnValueInVoid]
        );
        assert!(!analysis.is_ok());
    }

    #[test]
    fn test_error_absorption() {
        let analysis = analyze_source("void f() {\n  int x;\n  x = undeclared + 1;\n}\n");

        assert_eq!(
            analysis.diagnostics.kinds(),
            vec![DiagnosticKind::UndeclaredIdentifier]
        );
    }

    #[test]
    fn test_struct_field_isolation() {
        let analysis = analyze_source(
            "struct A { int x; }\nstruct B { bool x; }\nstruct A a;\nvoid f() {\n  a.x = 1;\n  x = 2;\n}\n",
        );

        // both structs hold an `x`; the bare use sees neither
        assert_eq!(
            messages(&analysis),
            vec!["6:3 ***ERROR*** Undeclared identifier"]
        );
    }

    #[test]
    fn test_clean_program_is_ok() {
        let analysis = analyze_source(
            "struct Point { int x; int y; }\nstruct Point p;\nint norm() {\n  return p.x * p.x + p.y * p.y;\n}\n",
        );

        assert!(analysis.is_ok());
        assert!(analysis.diagnostics.is_empty());
    }
}
