//! Unparser - pretty-prints an AST back to concrete syntax.
//!
//! Output conventions: 4-space indentation per nesting level, one
//! declaration or statement per line, every compound expression fully
//! parenthesized. Unparsing a parse of the output is a fixed point,
//! which the tests rely on.

use crate::ast::*;
use std::fmt::Write;

/// Pretty-print a program.
pub fn unparse(program: &Program) -> String {
    let mut printer = Unparser::new();
    printer.program(program);
    printer.out
}

struct Unparser {
    out: String,
    indent: usize,
}

impl Unparser {
    fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
        }
    }

    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn program(&mut self, program: &Program) {
        for decl in &program.decls {
            self.decl(decl);
        }
    }

    fn decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Var(var) => self.var_decl(var),
            Decl::Fn(func) => self.fn_decl(func),
            Decl::Struct(st) => self.struct_decl(st),
        }
    }

    fn var_decl(&mut self, var: &VarDecl) {
        let text = format!("{} {};", type_spec(&var.ty), var.name.name);
        self.line(text);
    }

    fn struct_decl(&mut self, st: &StructDecl) {
        self.line(format!("struct {} {{", st.name.name));
        self.indent += 1;
        for field in &st.fields {
            self.var_decl(field);
        }
        self.indent -= 1;
        self.line("};");
    }

    fn fn_decl(&mut self, func: &FnDecl) {
        let formals = func
            .formals
            .iter()
            .map(|f| format!("{} {}", type_spec(&f.ty), f.name.name))
            .collect::<Vec<_>>()
            .join(", ");
        self.line(format!(
            "{} {}({}) {{",
            type_spec(&func.ret),
            func.name.name,
            formals
        ));
        self.block_body(&func.body);
        self.line("}");
    }

    fn block_body(&mut self, block: &Block) {
        self.indent += 1;
        for decl in &block.decls {
            self.var_decl(decl);
        }
        for stmt in &block.stmts {
            self.stmt(stmt);
        }
        self.indent -= 1;
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign(assign) => {
                let text = format!("{} = {};", expr(&assign.lhs), expr(&assign.rhs));
                self.line(text);
            }
            Stmt::PreInc(loc) => self.line(format!("++{};", expr(loc))),
            Stmt::PreDec(loc) => self.line(format!("--{};", expr(loc))),
            Stmt::Receive(receive) => self.line(format!("receive >> {};", expr(&receive.target))),
            Stmt::Print(print) => self.line(format!("print << {};", expr(&print.value))),
            Stmt::If(if_stmt) => {
                self.line(format!("if ({}) {{", expr(&if_stmt.cond)));
                self.block_body(&if_stmt.body);
                self.line("}");
            }
            Stmt::IfElse(if_else) => {
                self.line(format!("if ({}) {{", expr(&if_else.cond)));
                self.block_body(&if_else.then_body);
                self.line("}");
                self.line("else {");
                self.block_body(&if_else.else_body);
                self.line("}");
            }
            Stmt::While(while_stmt) => {
                self.line(format!("while ({}) {{", expr(&while_stmt.cond)));
                self.block_body(&while_stmt.body);
                self.line("}");
            }
            Stmt::Repeat(repeat) => {
                self.line(format!("repeat ({}) {{", expr(&repeat.cond)));
                self.block_body(&repeat.body);
                self.line("}");
            }
            Stmt::Call(call) => self.line(format!("{};", call_expr(call))),
            Stmt::Return(None) => self.line("return;"),
            Stmt::Return(Some(value)) => self.line(format!("return {};", expr(value))),
        }
    }
}

fn type_spec(ty: &TypeSpec) -> String {
    match ty {
        TypeSpec::Int => "int".to_string(),
        TypeSpec::Bool => "bool".to_string(),
        TypeSpec::Void => "void".to_string(),
        TypeSpec::Struct(name) => format!("struct {}", name.name),
    }
}

fn expr(e: &Expr) -> String {
    match e {
        Expr::IntLit(lit) => lit.value.to_string(),
        Expr::StrLit(lit) => lit.raw.clone(),
        Expr::True(_) => "tru".to_string(),
        Expr::False(_) => "fls".to_string(),
        Expr::Id(id) => id.name.clone(),
        Expr::Dot(dot) => format!("{}.{}", expr(&dot.loc), dot.field.name),
        Expr::Assign(assign) => format!("({} = {})", expr(&assign.lhs), expr(&assign.rhs)),
        Expr::Call(call) => call_expr(call),
        Expr::Unary(unary) => {
            let op = match unary.op {
                UnOp::Neg => "-",
                UnOp::Not => "!",
            };
            format!("({}{})", op, expr(&unary.operand))
        }
        Expr::Binary(binary) => format!(
            "({} {} {})",
            expr(&binary.lhs),
            binary.op.symbol(),
            expr(&binary.rhs)
        ),
    }
}

fn call_expr(call: &CallExpr) -> String {
    let mut text = String::new();
    let args = call.args.iter().map(expr).collect::<Vec<_>>().join(", ");
    let _ = write!(text, "{}({})", call.callee.name, args);
    text
}

#[cfg(test)]
mod tests {
    use crate::parse_source;
    use tarnc_util::Handler;

    fn roundtrip(source: &str) -> String {
        let handler = Handler::new();
        let program = parse_source(source, &handler);
        assert!(!handler.has_errors(), "{:?}", handler.diagnostics());
        super::unparse(&program)
    }

    #[test]
    fn test_unparse_globals_and_struct() {
        let out = roundtrip("int x;\nstruct Pair { int a; int b; };\nstruct Pair p;");
        assert_eq!(
            out,
            "int x;\nstruct Pair {\n    int a;\n    int b;\n};\nstruct Pair p;\n"
        );
    }

    #[test]
    fn test_unparse_function_with_statements() {
        let out = roundtrip("int main() { int a; a = 1 + 2 * 3; print << a; return 0; }");
        assert_eq!(
            out,
            "int main() {\n    int a;\n    a = (1 + (2 * 3));\n    print << a;\n    return 0;\n}\n"
        );
    }

    #[test]
    fn test_unparse_control_flow() {
        let out = roundtrip("void f(bool b) { if (b) { return; } else { while (b) { --x; } } }");
        assert_eq!(
            out,
            "void f(bool b) {\n    if (b) {\n        return;\n    }\n    else {\n        while (b) {\n            --x;\n        }\n    }\n}\n"
        );
    }

    #[test]
    fn test_unparse_is_fixed_point() {
        let source = "int g;\nint add(int a, int b) { return a + b; }\nint main() { g = add(1, 2); return g; }";
        let once = roundtrip(source);
        let twice = roundtrip(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unparse_dot_and_assign_chain() {
        let out = roundtrip("struct P { int a; };\nvoid f() { struct P p; p.a = x = 3; }");
        assert!(out.contains("p.a = (x = 3);"));
    }
}
