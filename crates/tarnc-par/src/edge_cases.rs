//! Edge case tests for tarnc-par

use crate::ast::*;
use crate::{parse_source, unparse};
use tarnc_util::Handler;

fn parse_ok(source: &str) -> Program {
    let handler = Handler::new();
    let program = parse_source(source, &handler);
    assert!(!handler.has_errors(), "{:?}", handler.diagnostics());
    program
}

#[test]
fn test_edge_empty_program() {
    let program = parse_ok("");
    assert!(program.decls.is_empty());
}

#[test]
fn test_edge_global_declarations() {
    let program = parse_ok("int x; bool b; struct Pair { int a; int b; }; struct Pair p;");
    assert_eq!(program.decls.len(), 4);
    assert!(matches!(program.decls[0], Decl::Var(_)));
    assert!(matches!(program.decls[2], Decl::Struct(_)));

    if let Decl::Var(var) = &program.decls[3] {
        assert!(matches!(&var.ty, TypeSpec::Struct(name) if name.name == "Pair"));
    } else {
        panic!("expected struct variable");
    }
}

#[test]
fn test_edge_function_with_formals() {
    let program = parse_ok("int add(int a, int b) { return a + b; }");
    let Decl::Fn(func) = &program.decls[0] else {
        panic!("expected function");
    };
    assert_eq!(func.name.name, "add");
    assert_eq!(func.formals.len(), 2);
    assert_eq!(func.formals[0].name.name, "a");
    assert!(matches!(func.body.stmts[0], Stmt::Return(Some(_))));
}

#[test]
fn test_edge_block_decls_before_stmts() {
    let program = parse_ok("void f() { int a; bool b; a = 1; }");
    let Decl::Fn(func) = &program.decls[0] else {
        panic!("expected function");
    };
    assert_eq!(func.body.decls.len(), 2);
    assert_eq!(func.body.stmts.len(), 1);
}

#[test]
fn test_edge_statement_forms() {
    let program = parse_ok(
        "void f() { \
           ++x; --x; receive >> x; print << \"s\"; \
           if (tru) { } if (fls) { } else { } \
           while (tru) { } repeat (3) { } g(); return; }",
    );
    let Decl::Fn(func) = &program.decls[0] else {
        panic!("expected function");
    };
    let kinds: Vec<&'static str> = func
        .body
        .stmts
        .iter()
        .map(|s| match s {
            Stmt::PreInc(_) => "inc",
            Stmt::PreDec(_) => "dec",
            Stmt::Receive(_) => "receive",
            Stmt::Print(_) => "print",
            Stmt::If(_) => "if",
            Stmt::IfElse(_) => "ifelse",
            Stmt::While(_) => "while",
            Stmt::Repeat(_) => "repeat",
            Stmt::Call(_) => "call",
            Stmt::Return(_) => "return",
            Stmt::Assign(_) => "assign",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["inc", "dec", "receive", "print", "if", "ifelse", "while", "repeat", "call", "return"]
    );
}

#[test]
fn test_edge_operator_precedence() {
    let out = unparse(&parse_ok(
        "void f() { a = b || c && d == e < f + g * h; }",
    ));
    assert!(out.contains("a = (b || (c && (d == (e < (f + (g * h))))));"));
}

#[test]
fn test_edge_assignment_is_right_associative() {
    let out = unparse(&parse_ok("void f() { a = b = c; }"));
    assert!(out.contains("a = (b = c);"));
}

#[test]
fn test_edge_unary_nesting() {
    let out = unparse(&parse_ok("void f() { a = - - b; b2 = !!c; }"));
    assert!(out.contains("a = (-(-b));"));
    assert!(out.contains("b2 = (!(!c));"));
}

#[test]
fn test_edge_dot_chain() {
    let program = parse_ok("void f() { receive >> a.b.c; }");
    let Decl::Fn(func) = &program.decls[0] else {
        panic!("expected function");
    };
    let Stmt::Receive(receive) = &func.body.stmts[0] else {
        panic!("expected receive");
    };
    let Expr::Dot(outer) = &receive.target else {
        panic!("expected dot access");
    };
    assert_eq!(outer.field.name, "c");
    assert!(matches!(&*outer.loc, Expr::Dot(inner) if inner.field.name == "b"));
}

#[test]
fn test_edge_call_arguments() {
    let program = parse_ok("void f() { g(); h(1, x, a + b); }");
    let Decl::Fn(func) = &program.decls[0] else {
        panic!("expected function");
    };
    let Stmt::Call(empty) = &func.body.stmts[0] else {
        panic!("expected call");
    };
    assert!(empty.args.is_empty());
    let Stmt::Call(three) = &func.body.stmts[1] else {
        panic!("expected call");
    };
    assert_eq!(three.args.len(), 3);
}

#[test]
fn test_edge_leaf_positions_recorded() {
    let handler = Handler::new();
    let program = parse_source("int x;\nint main() { x = 3; return 0; }", &handler);
    let Decl::Fn(func) = &program.decls[1] else {
        panic!("expected function");
    };
    let Stmt::Assign(assign) = &func.body.stmts[0] else {
        panic!("expected assignment");
    };
    let span = assign.lhs.span();
    assert_eq!((span.line, span.column), (2, 14));
}

#[test]
fn test_edge_syntax_error_reported_and_recovers() {
    let handler = Handler::new();
    let program = parse_source("int 5; bool y;", &handler);
    assert!(handler.has_errors());
    // recovered at the next declaration
    assert_eq!(program.decls.len(), 1);
    assert!(matches!(&program.decls[0], Decl::Var(v) if v.name.name == "y"));
}

#[test]
fn test_edge_expression_statement_rejected() {
    let handler = Handler::new();
    parse_source("void f() { a + 1; }", &handler);
    assert!(handler.has_errors());
    let messages: Vec<_> = handler
        .diagnostics()
        .into_iter()
        .map(|d| d.message)
        .collect();
    assert!(messages.contains(&"syntax error: expected statement".to_string()));
}

#[test]
fn test_edge_invalid_assignment_target() {
    let handler = Handler::new();
    parse_source("void f() { a + 1 = 2; }", &handler);
    assert!(handler.has_errors());
}

#[test]
fn test_edge_missing_semicolon() {
    let handler = Handler::new();
    parse_source("void f() { return }", &handler);
    assert!(handler.has_errors());
}

#[test]
fn test_edge_annotations_start_empty() {
    let program = parse_ok("int x; void f() { receive >> x; print << 1; }");
    let Decl::Fn(func) = &program.decls[1] else {
        panic!("expected function");
    };
    let Stmt::Receive(receive) = &func.body.stmts[0] else {
        panic!("expected receive");
    };
    assert!(receive.operand_ty.is_none());
    let Expr::Id(id) = &receive.target else {
        panic!("expected id target");
    };
    assert!(id.sym.is_none());
    let Stmt::Print(print) = &func.body.stmts[1] else {
        panic!("expected print");
    };
    assert!(print.operand_ty.is_none());
}
