//! Type checking over the name-resolved AST.
//!
//! Every expression synthesizes a [`Ty`]; an operand that failed to
//! check comes back as `Ty::Error`, and operators that see an `Error`
//! operand stay silent and propagate it, so each broken subtree yields
//! exactly one diagnostic. The checker mutates nothing in the tree
//! except the operand-type records on print and receive statements,
//! which code generation uses to pick the syscall.
//!
//! Reporting positions: operand-kind errors point at the offending
//! operand, operator-level errors (type mismatch, the equality and
//! assignment bans) at the operator's position, which is the position of
//! its left operand.

use crate::symbol::Definitions;
use tarnc_par::ast::*;
use tarnc_util::{Handler, Span, Ty};

/// Type-check every function body in `program` against its declared
/// return type. Non-function declarations need no checks here; name
/// analysis already validated declaration well-formedness.
pub fn check(program: &mut Program, defs: &Definitions, handler: &Handler) {
    let mut checker = TypeChecker { defs, handler };
    for decl in &mut program.decls {
        if let Decl::Fn(func) = decl {
            checker.check_fn(func);
        }
    }
}

struct TypeChecker<'a> {
    defs: &'a Definitions,
    handler: &'a Handler,
}

impl<'a> TypeChecker<'a> {
    fn check_fn(&mut self, func: &mut FnDecl) {
        let ret = func
            .name
            .sym
            .and_then(|sym| self.defs.symbols[sym].as_fn())
            .map(|fn_sym| fn_sym.ret.clone())
            .unwrap_or(Ty::Error);
        self.check_block(&mut func.body, &ret);
    }

    fn check_block(&mut self, block: &mut Block, ret: &Ty) {
        for stmt in &mut block.stmts {
            self.check_stmt(stmt, ret);
        }
    }

    // =========================================================================
    // STATEMENTS
    // =========================================================================

    fn check_stmt(&mut self, stmt: &mut Stmt, ret: &Ty) {
        match stmt {
            Stmt::Assign(assign) => {
                self.check_assign(assign);
            }
            Stmt::PreInc(loc) | Stmt::PreDec(loc) => {
                let ty = self.check_expr(loc);
                if !ty.is_error() && !ty.is_int() {
                    self.handler.fatal(
                        loc.span(),
                        "Arithmetic operator applied to non-numeric operand",
                    );
                }
            }
            Stmt::Receive(receive) => {
                let ty = self.check_expr(&mut receive.target);
                let span = receive.target.span();
                if ty.is_fn() {
                    self.handler.fatal(span, "Attempt to read a function");
                } else if ty.is_struct_def() {
                    self.handler.fatal(span, "Attempt to read a struct name");
                } else if ty.is_struct() {
                    self.handler.fatal(span, "Attempt to read a struct variable");
                }
                receive.operand_ty = Some(ty);
            }
            Stmt::Print(print) => {
                let ty = self.check_expr(&mut print.value);
                let span = print.value.span();
                if ty.is_fn() {
                    self.handler.fatal(span, "Attempt to write a function");
                } else if ty.is_struct_def() {
                    self.handler.fatal(span, "Attempt to write a struct name");
                } else if ty.is_struct() {
                    self.handler.fatal(span, "Attempt to write a struct variable");
                } else if ty.is_void() {
                    self.handler.fatal(span, "Attempt to write void");
                }
                print.operand_ty = Some(ty);
            }
            Stmt::If(if_stmt) => {
                self.check_cond(
                    &mut if_stmt.cond,
                    "Non-bool expression used as an if condition",
                );
                self.check_block(&mut if_stmt.body, ret);
            }
            Stmt::IfElse(if_else) => {
                self.check_cond(
                    &mut if_else.cond,
                    "Non-bool expression used as an if condition",
                );
                self.check_block(&mut if_else.then_body, ret);
                self.check_block(&mut if_else.else_body, ret);
            }
            Stmt::While(while_stmt) => {
                self.check_cond(
                    &mut while_stmt.cond,
                    "Non-bool expression used as a while condition",
                );
                self.check_block(&mut while_stmt.body, ret);
            }
            Stmt::Repeat(repeat) => {
                // repeat counts, so its clause is an int
                let ty = self.check_expr(&mut repeat.cond);
                if !ty.is_error() && !ty.is_int() {
                    self.handler.fatal(
                        repeat.cond.span(),
                        "Non-integer expression used as a repeat clause",
                    );
                }
                self.check_block(&mut repeat.body, ret);
            }
            Stmt::Call(call) => {
                self.check_call(call);
            }
            Stmt::Return(value) => self.check_return(value.as_mut(), ret),
        }
    }

    fn check_cond(&mut self, cond: &mut Expr, message: &str) {
        let ty = self.check_expr(cond);
        if !ty.is_error() && !ty.is_bool() {
            self.handler.fatal(cond.span(), message);
        }
    }

    fn check_return(&mut self, value: Option<&mut Expr>, ret: &Ty) {
        match value {
            None => {
                if !ret.is_void() && !ret.is_error() {
                    // no operand to point at
                    self.handler.fatal(Span::DUMMY, "Missing return value");
                }
            }
            Some(value) => {
                let ty = self.check_expr(value);
                if ret.is_void() {
                    self.handler
                        .fatal(value.span(), "Return with a value in a void function");
                } else if !ty.is_error() && !ret.is_error() && ty != *ret {
                    self.handler.fatal(value.span(), "Bad return value");
                }
            }
        }
    }

    // =========================================================================
    // EXPRESSIONS
    // =========================================================================

    fn check_expr(&mut self, expr: &mut Expr) -> Ty {
        match expr {
            Expr::IntLit(_) => Ty::Int,
            Expr::StrLit(_) => Ty::Str,
            Expr::True(_) | Expr::False(_) => Ty::Bool,
            Expr::Id(id) => id.sym.map(|sym| self.defs.ty_of(sym)).unwrap_or(Ty::Error),
            Expr::Dot(dot) => dot
                .field
                .sym
                .map(|sym| self.defs.ty_of(sym))
                .unwrap_or(Ty::Error),
            Expr::Assign(assign) => self.check_assign(assign),
            Expr::Call(call) => self.check_call(call),
            Expr::Unary(unary) => self.check_unary(unary),
            Expr::Binary(binary) => self.check_binary(binary),
        }
    }

    fn check_unary(&mut self, unary: &mut UnaryExpr) -> Ty {
        let ty = self.check_expr(&mut unary.operand);
        if ty.is_error() {
            return Ty::Error;
        }
        match unary.op {
            UnOp::Neg => {
                if ty.is_int() {
                    Ty::Int
                } else {
                    self.handler.fatal(
                        unary.operand.span(),
                        "Arithmetic operator applied to non-numeric operand",
                    );
                    Ty::Error
                }
            }
            UnOp::Not => {
                if ty.is_bool() {
                    Ty::Bool
                } else {
                    self.handler.fatal(
                        unary.operand.span(),
                        "Logical operator applied to non-bool operand",
                    );
                    Ty::Error
                }
            }
        }
    }

    fn check_binary(&mut self, binary: &mut BinaryExpr) -> Ty {
        match binary.op {
            BinOp::Plus | BinOp::Minus | BinOp::Times | BinOp::Divide => self.check_operands(
                binary,
                Ty::is_int,
                "Arithmetic operator applied to non-numeric operand",
                Ty::Int,
            ),
            BinOp::And | BinOp::Or => self.check_operands(
                binary,
                Ty::is_bool,
                "Logical operator applied to non-bool operand",
                Ty::Bool,
            ),
            BinOp::Less | BinOp::Greater | BinOp::LessEq | BinOp::GreaterEq => self.check_operands(
                binary,
                Ty::is_int,
                "Relational operator applied to non-numeric operand",
                Ty::Bool,
            ),
            BinOp::Equals | BinOp::NotEquals => self.check_equality(binary),
        }
    }

    /// Kind-check both operands of an operator, reporting each offender
    /// at its own position.
    fn check_operands(
        &mut self,
        binary: &mut BinaryExpr,
        pred: fn(&Ty) -> bool,
        message: &str,
        result: Ty,
    ) -> Ty {
        let lt = self.check_expr(&mut binary.lhs);
        let rt = self.check_expr(&mut binary.rhs);

        let mut out = result;
        if lt.is_error() || rt.is_error() {
            out = Ty::Error;
        }
        if !lt.is_error() && !pred(&lt) {
            self.handler.fatal(binary.lhs.span(), message);
            out = Ty::Error;
        }
        if !rt.is_error() && !pred(&rt) {
            self.handler.fatal(binary.rhs.span(), message);
            out = Ty::Error;
        }
        out
    }

    fn check_equality(&mut self, binary: &mut BinaryExpr) -> Ty {
        let span = binary.lhs.span();
        let lt = self.check_expr(&mut binary.lhs);
        let rt = self.check_expr(&mut binary.rhs);

        if lt.is_error() || rt.is_error() {
            return Ty::Error;
        }

        // kind bans come before the same-type check: two void calls or
        // two struct variables are banned even though the types match
        let banned = if lt.is_void() && rt.is_void() {
            Some("Equality operator applied to void functions")
        } else if lt.is_fn() && rt.is_fn() {
            Some("Equality operator applied to functions")
        } else if lt.is_struct_def() && rt.is_struct_def() {
            Some("Equality operator applied to struct names")
        } else if lt.is_struct() && rt.is_struct() {
            Some("Equality operator applied to struct variables")
        } else {
            None
        };
        if let Some(message) = banned {
            self.handler.fatal(span, message);
            return Ty::Error;
        }

        if lt != rt {
            self.handler.fatal(span, "Type mismatch");
            return Ty::Error;
        }
        Ty::Bool
    }

    /// The left-hand side may be an `Id` or a `DotAccess`; both carry a
    /// symbol link and both lower to an address.
    fn check_assign(&mut self, assign: &mut AssignExpr) -> Ty {
        let span = assign.lhs.span();
        let lt = self.check_expr(&mut assign.lhs);
        let rt = self.check_expr(&mut assign.rhs);

        if lt.is_error() || rt.is_error() {
            return Ty::Error;
        }

        let banned = if lt.is_fn() && rt.is_fn() {
            Some("Function assignment")
        } else if lt.is_struct_def() && rt.is_struct_def() {
            Some("Struct name assignment")
        } else if lt.is_struct() && rt.is_struct() {
            Some("Struct variable assignment")
        } else {
            None
        };
        if let Some(message) = banned {
            self.handler.fatal(span, message);
            return Ty::Error;
        }

        if lt != rt {
            self.handler.fatal(span, "Type mismatch");
            return Ty::Error;
        }
        rt
    }

    fn check_call(&mut self, call: &mut CallExpr) -> Ty {
        let Some(sym) = call.callee.sym else {
            // callee was undeclared; still check the arguments
            for arg in &mut call.args {
                self.check_expr(arg);
            }
            return Ty::Error;
        };

        let Some(fn_sym) = self.defs.symbols[sym].as_fn().cloned() else {
            self.handler
                .fatal(call.callee.span, "Attempt to call a non-function");
            return Ty::Error;
        };

        if call.args.len() != fn_sym.params.len() {
            self.handler
                .fatal(call.callee.span, "Function call with wrong number of args");
            // the call still has the function's return type, letting the
            // enclosing expression keep checking
            return fn_sym.ret.clone();
        }

        for (arg, formal) in call.args.iter_mut().zip(&fn_sym.params) {
            let ty = self.check_expr(arg);
            if !ty.is_error() && !formal.is_error() && ty != *formal {
                self.handler
                    .fatal(arg.span(), "Type of actual does not match type of formal");
            }
        }

        fn_sym.ret.clone()
    }
}
