//! Stack-machine lowering of the checked AST.
//!
//! Every expression leaves exactly one word on the stack; statements
//! consume what they pushed. Binary operators evaluate the right
//! operand first so the left ends up on top, `&&`/`||` short-circuit by
//! branching over the right operand, and assignment stores through an
//! address computed after the value so the assigned value can be left
//! behind as the expression result.
//!
//! Frame convention (entry): push `$ra`, push `$fp`, `$fp = $sp + 8`,
//! then reserve the locals. `$fp` thus points at the saved `$ra`; the
//! saved `$fp` sits at `-4($fp)`, locals from `-8($fp)` down, formals
//! from `4($fp)` up. The caller drops its arguments after the call
//! returns.
//!
//! Structs and `repeat` are not lowered; both leave a comment in the
//! output where code would go.

use crate::emit::{Emitter, A0, FP, RA, SP, T0, T1, V0};
use tarnc_par::ast::*;
use tarnc_sem::{Definitions, Storage};
use tarnc_util::Ty;

/// Generate assembly for a checked, error-free program.
pub fn generate(program: &Program, defs: &Definitions) -> String {
    let mut gen = CodeGen {
        defs,
        emit: Emitter::new(),
        in_main: false,
    };
    gen.gen_program(program);
    gen.emit.finish()
}

struct CodeGen<'a> {
    defs: &'a Definitions,
    emit: Emitter,
    /// Whether the function being generated is `main` (its exit is an
    /// exit syscall rather than a return jump)
    in_main: bool,
}

impl<'a> CodeGen<'a> {
    fn gen_program(&mut self, program: &Program) {
        for decl in &program.decls {
            match decl {
                Decl::Var(var) => self.gen_global(var),
                Decl::Fn(func) => self.gen_fn(func),
                // struct layout stops at name analysis
                Decl::Struct(_) => {}
            }
        }
    }

    /// Every global occupies a single word in the data segment.
    fn gen_global(&mut self, var: &VarDecl) {
        self.emit.directive(".data");
        self.emit.directive(".align 2");
        self.emit
            .labeled_directive(&format!("_{}", var.name.name), ".space", "4");
    }

    // =========================================================================
    // FUNCTIONS
    // =========================================================================

    fn gen_fn(&mut self, func: &FnDecl) {
        self.in_main = func.name.name == "main";

        let frame_bytes = func
            .name
            .sym
            .and_then(|sym| self.defs.symbols[sym].as_fn())
            .map(|fn_sym| fn_sym.local_frame_bytes)
            .unwrap_or(0);

        self.emit.directive(".text");
        if self.in_main {
            self.emit.directive(".globl main");
            self.emit.label("main");
        } else {
            self.emit.label(&format!("_{}", func.name.name));
        }

        // entry: after the two pushes, $fp points at the saved $ra
        self.emit.comment("function entry");
        self.emit.push(RA);
        self.emit.push(FP);
        self.emit.generate("addu", &[FP, SP, "8"]);
        self.emit
            .generate("subu", &[SP, SP, &frame_bytes.to_string()]);

        self.gen_block(&func.body);

        self.gen_fn_exit();
    }

    /// The exit sequence: restore `$ra`, `$fp` and `$sp`, then leave.
    /// Emitted at the end of every function and at each `return`.
    fn gen_fn_exit(&mut self) {
        self.emit.comment("function exit");
        self.emit.generate_indexed("lw", RA, FP, 0);
        self.emit.generate("move", &[T0, FP]);
        self.emit.generate_indexed("lw", FP, FP, -4);
        self.emit.generate("move", &[SP, T0]);
        if self.in_main {
            self.emit.generate("li", &[V0, "10"]);
            self.emit.generate("syscall", &[]);
        } else {
            self.emit.generate("jr", &[RA]);
        }
    }

    // =========================================================================
    // STATEMENTS
    // =========================================================================

    fn gen_block(&mut self, block: &Block) {
        // declarations take no code; their slots were reserved on entry
        for stmt in &block.stmts {
            self.gen_stmt(stmt);
        }
    }

    fn gen_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Assign(assign) => {
                self.gen_assign(assign);
                self.emit.pop(T0); // discard the statement result
            }
            Stmt::Call(call) => {
                self.gen_call(call);
                self.emit.pop(T0);
            }
            Stmt::PreInc(loc) => self.gen_incr(loc, "add"),
            Stmt::PreDec(loc) => self.gen_incr(loc, "sub"),
            Stmt::Receive(receive) => {
                self.emit.generate("li", &[V0, "5"]);
                self.emit.generate("syscall", &[]);
                self.gen_addr(&receive.target);
                self.emit.pop(T0);
                self.emit.generate_indexed("sw", V0, T0, 0);
            }
            Stmt::Print(print) => {
                self.gen_expr(&print.value);
                self.emit.pop(A0);
                let code = match &print.operand_ty {
                    Some(Ty::Str) => "4",
                    _ => "1",
                };
                self.emit.generate("li", &[V0, code]);
                self.emit.generate("syscall", &[]);
            }
            Stmt::If(if_stmt) => {
                let end = self.emit.fresh_label();
                self.gen_expr(&if_stmt.cond);
                self.emit.pop(T0);
                self.emit.generate("beq", &[T0, "0", &end]);
                self.gen_block(&if_stmt.body);
                self.emit.label(&end);
            }
            Stmt::IfElse(if_else) => {
                let else_label = self.emit.fresh_label();
                let exit_label = self.emit.fresh_label();
                self.gen_expr(&if_else.cond);
                self.emit.pop(T0);
                self.emit.generate("beq", &[T0, "0", &else_label]);
                self.gen_block(&if_else.then_body);
                self.emit.generate("b", &[&exit_label]);
                self.emit.label(&else_label);
                self.gen_block(&if_else.else_body);
                self.emit.label(&exit_label);
            }
            Stmt::While(while_stmt) => {
                let top = self.emit.fresh_label();
                let end = self.emit.fresh_label();
                self.emit.label(&top);
                self.gen_expr(&while_stmt.cond);
                self.emit.pop(T0);
                self.emit.generate("beq", &[T0, "0", &end]);
                self.gen_block(&while_stmt.body);
                self.emit.generate("b", &[&top]);
                self.emit.label(&end);
            }
            Stmt::Repeat(_) => {
                self.emit.comment("repeat statement not lowered");
            }
            Stmt::Return(value) => {
                if let Some(value) = value {
                    self.gen_expr(value);
                    self.emit.pop(V0);
                }
                self.gen_fn_exit();
            }
        }
    }

    fn gen_incr(&mut self, loc: &Expr, op: &str) {
        self.gen_addr(loc);
        self.emit.pop(T0);
        self.emit.generate_indexed("lw", T1, T0, 0);
        self.emit.generate(op, &[T1, T1, "1"]);
        self.emit.generate_indexed("sw", T1, T0, 0);
    }

    // =========================================================================
    // EXPRESSIONS
    // =========================================================================

    /// Lower an expression, leaving exactly one word on the stack.
    fn gen_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::IntLit(lit) => {
                self.emit.generate("li", &[T0, &lit.value.to_string()]);
                self.emit.push(T0);
            }
            Expr::True(_) => {
                self.emit.generate("li", &[T0, "1"]);
                self.emit.push(T0);
            }
            Expr::False(_) => {
                self.emit.generate("li", &[T0, "0"]);
                self.emit.push(T0);
            }
            Expr::StrLit(lit) => {
                let label = self.emit.string_label(&lit.raw);
                self.emit.generate("la", &[T0, &label]);
                self.emit.push(T0);
            }
            Expr::Id(id) => {
                self.gen_id_load(id);
            }
            Expr::Dot(_) => {
                // struct fields are not lowered; keep the stack shape
                self.emit.comment("struct field access not lowered");
                self.emit.generate("li", &[T0, "0"]);
                self.emit.push(T0);
            }
            Expr::Assign(assign) => self.gen_assign(assign),
            Expr::Call(call) => self.gen_call(call),
            Expr::Unary(unary) => self.gen_unary(unary),
            Expr::Binary(binary) => self.gen_binary(binary),
        }
    }

    fn var_of(&self, id: &Ident) -> Option<(Storage, i32)> {
        let sym = id.sym?;
        let var = self.defs.symbols[sym].as_var()?;
        Some((var.storage, var.offset))
    }

    fn gen_id_load(&mut self, id: &Ident) {
        match self.var_of(id) {
            Some((Storage::Global, _)) => {
                self.emit.generate("lw", &[T0, &format!("_{}", id.name)]);
            }
            Some((_, offset)) => {
                self.emit.generate_indexed("lw", T0, FP, offset);
            }
            None => unreachable!("value use of a non-variable symbol"),
        }
        self.emit.push(T0);
    }

    /// Lower a loc as an assignment target: its address on the stack.
    fn gen_addr(&mut self, loc: &Expr) {
        match loc {
            Expr::Id(id) => {
                match self.var_of(id) {
                    Some((Storage::Global, _)) => {
                        self.emit.generate("la", &[T0, &format!("_{}", id.name)]);
                    }
                    Some((_, offset)) => {
                        self.emit.generate_indexed("la", T0, FP, offset);
                    }
                    None => unreachable!("address of a non-variable symbol"),
                }
                self.emit.push(T0);
            }
            Expr::Dot(_) => {
                self.emit.comment("struct field access not lowered");
                self.emit.generate("li", &[T0, "0"]);
                self.emit.push(T0);
            }
            _ => unreachable!("address of a non-loc expression"),
        }
    }

    /// value, then address, then store; the value is left on the stack
    /// so assignment works as an expression.
    fn gen_assign(&mut self, assign: &AssignExpr) {
        self.gen_expr(&assign.rhs);
        self.gen_addr(&assign.lhs);
        self.emit.pop(T0);
        self.emit.pop(T1);
        self.emit.generate_indexed("sw", T1, T0, 0);
        self.emit.push(T1);
    }

    fn gen_call(&mut self, call: &CallExpr) {
        for arg in &call.args {
            self.gen_expr(arg);
        }

        let target = if call.callee.name == "main" {
            "main".to_string()
        } else {
            format!("_{}", call.callee.name)
        };
        self.emit.generate("jal", &[&target]);

        // caller drops the arguments
        let arg_bytes = 4 * call.args.len();
        if arg_bytes > 0 {
            self.emit
                .generate("addu", &[SP, SP, &arg_bytes.to_string()]);
        }
        self.emit.push(V0);
    }

    fn gen_unary(&mut self, unary: &UnaryExpr) {
        self.gen_expr(&unary.operand);
        match unary.op {
            UnOp::Neg => {
                self.emit.pop(T1);
                self.emit.generate("li", &[T0, "0"]);
                self.emit.generate("sub", &[T0, T0, T1]);
            }
            UnOp::Not => {
                // 1 - x; the operand is boolean 0/1 by the type rules
                self.emit.pop(T0);
                self.emit.generate("li", &[T1, "1"]);
                self.emit.generate("neg", &[T0, T0]);
                self.emit.generate("add", &[T0, T0, T1]);
            }
        }
        self.emit.push(T0);
    }

    fn gen_binary(&mut self, binary: &BinaryExpr) {
        match binary.op {
            BinOp::And => {
                let done = self.emit.fresh_label();
                self.gen_expr(&binary.lhs);
                self.emit.pop(T0);
                // left false: skip the right operand, leave the zero
                self.emit.generate("beq", &[T0, "0", &done]);
                self.gen_expr(&binary.rhs);
                self.emit.pop(T1);
                self.emit.generate("and", &[T0, T0, T1]);
                self.emit.label(&done);
                self.emit.push(T0);
            }
            BinOp::Or => {
                let done = self.emit.fresh_label();
                self.gen_expr(&binary.lhs);
                self.emit.pop(T0);
                // left true: skip the right operand, leave the one
                self.emit.generate("bne", &[T0, "0", &done]);
                self.gen_expr(&binary.rhs);
                self.emit.pop(T1);
                self.emit.generate("or", &[T0, T0, T1]);
                self.emit.label(&done);
                self.emit.push(T0);
            }
            _ => {
                let op = match binary.op {
                    BinOp::Plus => "add",
                    BinOp::Minus => "sub",
                    BinOp::Times => "mul",
                    BinOp::Divide => "div",
                    BinOp::Equals => "seq",
                    BinOp::NotEquals => "sne",
                    BinOp::Less => "slt",
                    BinOp::Greater => "sgt",
                    BinOp::LessEq => "sle",
                    BinOp::GreaterEq => "sge",
                    BinOp::And | BinOp::Or => unreachable!("handled above"),
                };
                // right first, so the left operand pops off the top
                self.gen_expr(&binary.rhs);
                self.gen_expr(&binary.lhs);
                self.emit.pop(T0);
                self.emit.pop(T1);
                self.emit.generate(op, &[T0, T0, T1]);
                self.emit.push(T0);
            }
        }
    }
}
