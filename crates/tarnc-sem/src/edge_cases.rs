//! Edge case tests for tarnc-sem: scoping, offsets, and the type rules.

use crate::symbol::{Definitions, Storage};
use tarnc_par::ast::*;
use tarnc_par::parse_source;
use tarnc_util::{Handler, Ty};

/// Parse and name-analyze; the source must be syntactically clean.
fn analyze(source: &str) -> (Program, Definitions, Handler) {
    let handler = Handler::new();
    let mut program = parse_source(source, &handler);
    assert!(
        !handler.has_errors(),
        "parse errors: {:?}",
        handler.diagnostics()
    );
    let defs = crate::name::analyze(&mut program, &handler);
    (program, defs, handler)
}

/// Parse, name-analyze and type-check.
fn check(source: &str) -> (Program, Definitions, Handler) {
    let (mut program, defs, handler) = analyze(source);
    assert!(
        !handler.has_errors(),
        "name errors: {:?}",
        handler.diagnostics()
    );
    crate::check::check(&mut program, &defs, &handler);
    (program, defs, handler)
}

fn messages(handler: &Handler) -> Vec<(u32, u32, String)> {
    handler
        .diagnostics()
        .into_iter()
        .map(|d| (d.span.line, d.span.column, d.message))
        .collect()
}

fn fn_decl<'a>(program: &'a Program, name: &str) -> &'a FnDecl {
    program
        .decls
        .iter()
        .find_map(|d| match d {
            Decl::Fn(f) if f.name.name == name => Some(f),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no function `{}`", name))
}

// ==================== NAME ANALYSIS ====================

#[test]
fn test_edge_missing_main() {
    let (_, _, handler) = analyze("int foo() { return 0; }");
    assert_eq!(
        messages(&handler),
        vec![(0, 0, "No main function".to_string())]
    );
}

#[test]
fn test_edge_main_must_be_a_function() {
    let (_, _, handler) = analyze("int main;");
    assert_eq!(
        messages(&handler),
        vec![(0, 0, "No main function".to_string())]
    );
}

#[test]
fn test_edge_duplicate_global() {
    let (_, _, handler) = analyze("int x;\nbool x;\nint main() {\n    return 0;\n}");
    // one diagnostic, at the second declaration; main is still found
    assert_eq!(
        messages(&handler),
        vec![(2, 6, "Multiply declared identifier".to_string())]
    );
}

#[test]
fn test_edge_undeclared_identifier() {
    let (_, _, handler) = analyze("int main() {\n    y = 1;\n    return 0;\n}");
    assert_eq!(
        messages(&handler),
        vec![(2, 5, "Undeclared identifier".to_string())]
    );
}

#[test]
fn test_edge_void_variable() {
    let (_, _, handler) = analyze("void v;\nint main() {\n    return 0;\n}");
    assert_eq!(
        messages(&handler),
        vec![(1, 6, "Non-function declared void".to_string())]
    );
}

#[test]
fn test_edge_invalid_struct_type_name() {
    let (_, _, handler) = analyze("struct Q q;\nint main() {\n    return 0;\n}");
    assert_eq!(
        messages(&handler),
        vec![(1, 8, "Invalid name of struct type".to_string())]
    );
}

#[test]
fn test_edge_non_struct_name_as_type() {
    let (_, _, handler) = analyze("int T;\nstruct T t;\nint main() {\n    return 0;\n}");
    assert_eq!(
        messages(&handler),
        vec![(2, 8, "Invalid name of struct type".to_string())]
    );
}

#[test]
fn test_edge_struct_cannot_contain_itself() {
    let (_, _, handler) = analyze("struct S {\n    struct S s;\n};\nint main() {\n    return 0;\n}");
    assert_eq!(
        messages(&handler),
        vec![(2, 12, "Invalid name of struct type".to_string())]
    );
}

#[test]
fn test_edge_shadowing_is_legal() {
    let (program, _, handler) = analyze("int x;\nint main() {\n    int x;\n    x = 3;\n    return 0;\n}");
    assert!(handler.diagnostics().is_empty());

    // the use binds to the inner declaration, not the global
    let global_sym = match &program.decls[0] {
        Decl::Var(v) => v.name.sym.unwrap(),
        _ => panic!("expected global"),
    };
    let main = fn_decl(&program, "main");
    let local_sym = main.body.decls[0].name.sym.unwrap();
    let Stmt::Assign(assign) = &main.body.stmts[0] else {
        panic!("expected assignment");
    };
    let Expr::Id(use_id) = &assign.lhs else {
        panic!("expected id lhs");
    };
    assert_eq!(use_id.sym, Some(local_sym));
    assert_ne!(local_sym, global_sym);
}

#[test]
fn test_edge_every_use_linked_in_valid_program() {
    let (program, _, handler) =
        analyze("int g;\nint add(int a, int b) {\n    return a + b;\n}\nint main() {\n    g = add(1, 2);\n    return g;\n}");
    assert!(handler.diagnostics().is_empty());

    let main = fn_decl(&program, "main");
    let Stmt::Assign(assign) = &main.body.stmts[0] else {
        panic!("expected assignment");
    };
    let Expr::Id(lhs) = &assign.lhs else {
        panic!("expected id");
    };
    assert!(lhs.sym.is_some());
    let Expr::Call(call) = &assign.rhs else {
        panic!("expected call");
    };
    assert!(call.callee.sym.is_some());
}

#[test]
fn test_edge_local_offsets_and_frame_size() {
    let (program, defs, _) = analyze(
        "int main() {\n    int a;\n    int b;\n    if (tru) {\n        int c;\n    }\n    return 0;\n}",
    );
    let main = fn_decl(&program, "main");

    let offset_of = |sym| defs.symbols[sym].as_var().unwrap().offset;
    let a = main.body.decls[0].name.sym.unwrap();
    let b = main.body.decls[1].name.sym.unwrap();
    assert_eq!(offset_of(a), -8);
    assert_eq!(offset_of(b), -12);

    let Stmt::If(if_stmt) = &main.body.stmts[0] else {
        panic!("expected if");
    };
    let c = if_stmt.body.decls[0].name.sym.unwrap();
    assert_eq!(offset_of(c), -16);
    assert_eq!(defs.symbols[c].as_var().unwrap().storage, Storage::Local);

    // frame covers nested-scope locals too: 3 locals, 12 bytes
    let main_sym = main.name.sym.unwrap();
    assert_eq!(defs.symbols[main_sym].as_fn().unwrap().local_frame_bytes, 12);
}

#[test]
fn test_edge_formal_offsets() {
    let (program, defs, _) =
        analyze("int f(int a, int b) {\n    return a;\n}\nint main() {\n    return 0;\n}");
    let func = fn_decl(&program, "f");

    let a = func.formals[0].name.sym.unwrap();
    let b = func.formals[1].name.sym.unwrap();
    // first formal highest: 4 * (N - i)
    assert_eq!(defs.symbols[a].as_var().unwrap().offset, 8);
    assert_eq!(defs.symbols[b].as_var().unwrap().offset, 4);
    assert_eq!(defs.symbols[a].as_var().unwrap().storage, Storage::Param);

    let f_sym = func.name.sym.unwrap();
    let fn_sym = defs.symbols[f_sym].as_fn().unwrap();
    assert_eq!(fn_sym.params, vec![Ty::Int, Ty::Int]);
    assert_eq!(fn_sym.ret, Ty::Int);
    assert_eq!(fn_sym.local_frame_bytes, 0);
}

#[test]
fn test_edge_counter_resets_per_function() {
    let (program, defs, _) =
        analyze("void f() {\n    int a;\n}\nint main() {\n    int z;\n    return 0;\n}");
    let main = fn_decl(&program, "main");
    let z = main.body.decls[0].name.sym.unwrap();
    assert_eq!(defs.symbols[z].as_var().unwrap().offset, -8);
}

#[test]
fn test_edge_struct_fields_in_declaration_order() {
    let (program, defs, handler) =
        analyze("struct Pair {\n    int a;\n    bool b;\n};\nint main() {\n    return 0;\n}");
    assert!(handler.diagnostics().is_empty());

    let Decl::Struct(st) = &program.decls[0] else {
        panic!("expected struct");
    };
    let def_sym = st.name.sym.unwrap();
    let def = defs.symbols[def_sym].as_struct_def().unwrap().def;
    let names: Vec<_> = defs.structs[def].fields.keys().cloned().collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_edge_dot_access_links_through_chain() {
    let (program, defs, handler) = analyze(
        "struct Inner {\n    int v;\n};\nstruct Outer {\n    struct Inner nest;\n};\nint main() {\n    struct Outer o;\n    o.nest.v = 3;\n    return 0;\n}",
    );
    assert!(handler.diagnostics().is_empty());

    let main = fn_decl(&program, "main");
    let Stmt::Assign(assign) = &main.body.stmts[0] else {
        panic!("expected assignment");
    };
    let Expr::Dot(outer) = &assign.lhs else {
        panic!("expected dot");
    };
    // o.nest.v resolved all the way down
    assert!(outer.field.sym.is_some());
    assert_eq!(defs.ty_of(outer.field.sym.unwrap()), Ty::Int);
    let Expr::Dot(inner) = &*outer.loc else {
        panic!("expected inner dot");
    };
    // the middle link carries the struct definition for the chain
    assert!(inner.def.is_some());
}

#[test]
fn test_edge_dot_access_of_non_struct() {
    let (_, _, handler) = analyze("int x;\nint main() {\n    x.f = 1;\n    return 0;\n}");
    assert_eq!(
        messages(&handler),
        vec![(3, 5, "Dot-access of non-struct type".to_string())]
    );
}

#[test]
fn test_edge_invalid_struct_field() {
    let (_, _, handler) = analyze(
        "struct P {\n    int a;\n};\nint main() {\n    struct P p;\n    p.b = 1;\n    return 0;\n}",
    );
    assert_eq!(
        messages(&handler),
        vec![(6, 7, "Invalid struct field name".to_string())]
    );
}

#[test]
fn test_edge_bad_access_does_not_cascade() {
    // `q` is undeclared; the chain reports nothing further
    let (_, _, handler) = analyze("int main() {\n    q.a.b = 1;\n    return 0;\n}");
    assert_eq!(
        messages(&handler),
        vec![(2, 5, "Undeclared identifier".to_string())]
    );
}

#[test]
fn test_edge_duplicate_function_body_still_analyzed() {
    let (_, _, handler) =
        analyze("int f() {\n    return 0;\n}\nbool f() {\n    return y;\n}\nint main() {\n    return 0;\n}");
    let msgs = messages(&handler);
    assert!(msgs.contains(&(4, 6, "Multiply declared identifier".to_string())));
    // the duplicate's body was still walked: `y` is undeclared
    assert!(msgs.contains(&(5, 12, "Undeclared identifier".to_string())));
}

#[test]
fn test_edge_reanalysis_is_idempotent() {
    let source = "int x;\nbool x;\nint main() {\n    x = 1;\n    return 0;\n}";
    let first = Handler::new();
    let mut program = parse_source(source, &first);
    let defs1 = crate::name::analyze(&mut program, &first);
    crate::check::check(&mut program, &defs1, &first);

    // running the passes again over the already-annotated tree yields
    // the same diagnostics
    let second = Handler::new();
    let defs2 = crate::name::analyze(&mut program, &second);
    crate::check::check(&mut program, &defs2, &second);
    assert_eq!(first.diagnostics(), second.diagnostics());
}

// ==================== TYPE CHECKING ====================

#[test]
fn test_edge_arithmetic_on_bool_reports_once() {
    let (_, _, handler) =
        check("int main() {\n    int a;\n    bool b;\n    a = a + b;\n    return 0;\n}");
    // the assignment stays silent because its rhs is already Error
    assert_eq!(
        messages(&handler),
        vec![(
            4,
            13,
            "Arithmetic operator applied to non-numeric operand".to_string()
        )]
    );
}

#[test]
fn test_edge_logical_on_int() {
    let (_, _, handler) = check("int main() {\n    bool b;\n    b = 1 && tru;\n    return 0;\n}");
    assert_eq!(
        messages(&handler),
        vec![(
            3,
            9,
            "Logical operator applied to non-bool operand".to_string()
        )]
    );
}

#[test]
fn test_edge_relational_on_bool() {
    let (_, _, handler) = check("int main() {\n    bool b;\n    b = tru < fls;\n    return 0;\n}");
    let msgs = messages(&handler);
    assert_eq!(msgs.len(), 2);
    assert!(msgs
        .iter()
        .all(|(_, _, m)| m == "Relational operator applied to non-numeric operand"));
}

#[test]
fn test_edge_not_requires_bool_operand() {
    let (_, _, handler) = check("int main() {\n    bool b;\n    b = !3;\n    return 0;\n}");
    assert_eq!(
        messages(&handler),
        vec![(
            3,
            10,
            "Logical operator applied to non-bool operand".to_string()
        )]
    );
}

#[test]
fn test_edge_unary_minus_requires_int() {
    let (_, _, handler) = check("int main() {\n    int a;\n    a = -tru;\n    return 0;\n}");
    assert_eq!(
        messages(&handler),
        vec![(
            3,
            10,
            "Arithmetic operator applied to non-numeric operand".to_string()
        )]
    );
}

#[test]
fn test_edge_equality_type_mismatch() {
    let (_, _, handler) = check("int main() {\n    bool b;\n    b = 1 == tru;\n    return 0;\n}");
    assert_eq!(messages(&handler), vec![(3, 9, "Type mismatch".to_string())]);
}

#[test]
fn test_edge_equality_of_void_calls() {
    let (_, _, handler) = check(
        "void f() {\n}\nvoid g() {\n}\nint main() {\n    if (f() == g()) {\n    }\n    return 0;\n}",
    );
    assert_eq!(
        messages(&handler),
        vec![(
            6,
            9,
            "Equality operator applied to void functions".to_string()
        )]
    );
}

#[test]
fn test_edge_equality_of_functions() {
    let (_, _, handler) =
        check("void f() {\n}\nint main() {\n    if (f == f) {\n    }\n    return 0;\n}");
    assert_eq!(
        messages(&handler),
        vec![(4, 9, "Equality operator applied to functions".to_string())]
    );
}

#[test]
fn test_edge_equality_of_struct_names_and_variables() {
    let (_, _, handler) = check(
        "struct P {\n    int a;\n};\nint main() {\n    struct P x;\n    struct P y;\n    if (P == P) {\n    }\n    if (x == y) {\n    }\n    return 0;\n}",
    );
    assert_eq!(
        messages(&handler),
        vec![
            (
                7,
                9,
                "Equality operator applied to struct names".to_string()
            ),
            (
                9,
                9,
                "Equality operator applied to struct variables".to_string()
            ),
        ]
    );
}

#[test]
fn test_edge_assignment_bans() {
    let (_, _, handler) = check(
        "struct P {\n    int a;\n};\nvoid f() {\n}\nint main() {\n    struct P x;\n    struct P y;\n    x = y;\n    f = f;\n    P = P;\n    return 0;\n}",
    );
    assert_eq!(
        messages(&handler),
        vec![
            (9, 5, "Struct variable assignment".to_string()),
            (10, 5, "Function assignment".to_string()),
            (11, 5, "Struct name assignment".to_string()),
        ]
    );
}

#[test]
fn test_edge_assignment_type_mismatch_at_lhs() {
    let (_, _, handler) = check("int main() {\n    int a;\n    a = tru;\n    return 0;\n}");
    assert_eq!(messages(&handler), vec![(3, 5, "Type mismatch".to_string())]);
}

#[test]
fn test_edge_assignment_yields_rhs_type() {
    // chained assignment checks out because `a = (b = 3)` has type int
    let (_, _, handler) =
        check("int main() {\n    int a;\n    int b;\n    a = b = 3;\n    return 0;\n}");
    assert!(handler.diagnostics().is_empty());
}

#[test]
fn test_edge_dot_access_as_assignment_lhs() {
    let (_, _, handler) = check(
        "struct P {\n    int a;\n};\nint main() {\n    struct P p;\n    p.a = tru;\n    return 0;\n}",
    );
    assert_eq!(messages(&handler), vec![(6, 5, "Type mismatch".to_string())]);
}

#[test]
fn test_edge_call_of_non_function() {
    let (_, _, handler) = check("int x;\nint main() {\n    x();\n    return 0;\n}");
    assert_eq!(
        messages(&handler),
        vec![(3, 5, "Attempt to call a non-function".to_string())]
    );
}

#[test]
fn test_edge_call_arity_mismatch() {
    let (_, _, handler) = check(
        "int f(int a) {\n    return a;\n}\nint main() {\n    int z;\n    z = f(1, 2);\n    return 0;\n}",
    );
    assert_eq!(
        messages(&handler),
        vec![(6, 9, "Function call with wrong number of args".to_string())]
    );
}

#[test]
fn test_edge_call_argument_type_mismatch_at_argument() {
    let (_, _, handler) = check(
        "int f(int a, bool b) {\n    return a;\n}\nint main() {\n    int z;\n    z = f(1, 2);\n    return 0;\n}",
    );
    assert_eq!(
        messages(&handler),
        vec![(
            6,
            14,
            "Type of actual does not match type of formal".to_string()
        )]
    );
}

#[test]
fn test_edge_call_returns_declared_type() {
    // f's result participates in checking even though the arity is wrong
    let (_, _, handler) = check(
        "int f(int a) {\n    return a;\n}\nint main() {\n    bool b;\n    b = f();\n    return 0;\n}",
    );
    assert_eq!(
        messages(&handler),
        vec![
            (6, 9, "Function call with wrong number of args".to_string()),
            (6, 5, "Type mismatch".to_string()),
        ]
    );
}

#[test]
fn test_edge_print_and_receive_rules() {
    let (_, _, handler) = check(
        "struct P {\n    int a;\n};\nvoid f() {\n}\nint main() {\n    struct P p;\n    print << f;\n    print << P;\n    print << p;\n    print << f();\n    receive >> p;\n    return 0;\n}",
    );
    assert_eq!(
        messages(&handler),
        vec![
            (8, 14, "Attempt to write a function".to_string()),
            (9, 14, "Attempt to write a struct name".to_string()),
            (10, 14, "Attempt to write a struct variable".to_string()),
            (11, 14, "Attempt to write void".to_string()),
            (12, 16, "Attempt to read a struct variable".to_string()),
        ]
    );
}

#[test]
fn test_edge_condition_rules() {
    let (_, _, handler) = check(
        "int main() {\n    if (1) {\n    }\n    while (2) {\n    }\n    repeat (tru) {\n    }\n    return 0;\n}",
    );
    assert_eq!(
        messages(&handler),
        vec![
            (
                2,
                9,
                "Non-bool expression used as an if condition".to_string()
            ),
            (
                4,
                12,
                "Non-bool expression used as a while condition".to_string()
            ),
            (
                6,
                13,
                "Non-integer expression used as a repeat clause".to_string()
            ),
        ]
    );
}

#[test]
fn test_edge_increment_requires_int() {
    let (_, _, handler) = check("int main() {\n    bool b;\n    ++b;\n    return 0;\n}");
    assert_eq!(
        messages(&handler),
        vec![(
            3,
            7,
            "Arithmetic operator applied to non-numeric operand".to_string()
        )]
    );
}

#[test]
fn test_edge_return_rules() {
    let (_, _, handler) = check(
        "void f() {\n    return 1;\n}\nint g() {\n    return;\n}\nint h() {\n    return tru;\n}\nint main() {\n    return 0;\n}",
    );
    assert_eq!(
        messages(&handler),
        vec![
            (2, 12, "Return with a value in a void function".to_string()),
            (0, 0, "Missing return value".to_string()),
            (8, 12, "Bad return value".to_string()),
        ]
    );
}

#[test]
fn test_edge_print_receive_record_operand_types() {
    let (program, _, handler) = check(
        "int main() {\n    int a;\n    print << \"hi\";\n    print << a;\n    receive >> a;\n    return 0;\n}",
    );
    assert!(handler.diagnostics().is_empty());

    let main = fn_decl(&program, "main");
    let Stmt::Print(print_str) = &main.body.stmts[0] else {
        panic!("expected print");
    };
    assert_eq!(print_str.operand_ty, Some(Ty::Str));
    let Stmt::Print(print_int) = &main.body.stmts[1] else {
        panic!("expected print");
    };
    assert_eq!(print_int.operand_ty, Some(Ty::Int));
    let Stmt::Receive(receive) = &main.body.stmts[2] else {
        panic!("expected receive");
    };
    assert_eq!(receive.operand_ty, Some(Ty::Int));
}

#[test]
fn test_edge_clean_program_checks_clean() {
    let (_, _, handler) = check(
        "int g;\nstruct Pair {\n    int a;\n    int b;\n};\nint add(int a, int b) {\n    return a + b;\n}\nint main() {\n    struct Pair p;\n    p.a = 1;\n    p.b = 2;\n    g = add(p.a, p.b);\n    while (g > 0) {\n        --g;\n    }\n    if (g == 0 && tru || fls) {\n        print << \"done\\n\";\n    }\n    return 0;\n}",
    );
    assert!(
        handler.diagnostics().is_empty(),
        "{:?}",
        handler.diagnostics()
    );
}
