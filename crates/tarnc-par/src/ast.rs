//! tarnc-par - AST Node Definitions
//!
//! This module contains all AST node definitions produced by the parser.
//!
//! The tree is built once by the parser; the later passes touch only the
//! annotation fields. Name analysis fills the `sym` links on [`Ident`]
//! and the `def` link on [`DotAccess`]; type checking fills the
//! `operand_ty` records on [`PrintStmt`] and [`ReceiveStmt`], which code
//! generation reads to pick the output/input syscall. Everything else is
//! read-only after parsing.

use tarnc_util::{Span, StructId, SymId, Ty};

/// AST root - a source file is a list of declarations
#[derive(Debug, Clone)]
pub struct Program {
    pub decls: Vec<Decl>,
}

/// Top-level (or block-level) declaration
#[derive(Debug, Clone)]
pub enum Decl {
    /// Variable declaration
    Var(VarDecl),

    /// Function definition
    Fn(FnDecl),

    /// Structure definition
    Struct(StructDecl),
}

/// Variable declaration: `int x;`, `struct Pair p;`
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub ty: TypeSpec,
    pub name: Ident,
}

/// Function definition
#[derive(Debug, Clone)]
pub struct FnDecl {
    pub ret: TypeSpec,
    pub name: Ident,
    pub formals: Vec<FormalDecl>,
    pub body: Block,
}

/// Formal parameter
#[derive(Debug, Clone)]
pub struct FormalDecl {
    pub ty: TypeSpec,
    pub name: Ident,
}

/// Structure definition: `struct Pair { int a; int b; };`
#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: Ident,
    pub fields: Vec<VarDecl>,
}

/// A braced body: declarations first, then statements
///
/// Function bodies and the bodies of `if`/`else`/`while`/`repeat` all
/// have this shape and each opens its own scope.
#[derive(Debug, Clone)]
pub struct Block {
    pub decls: Vec<VarDecl>,
    pub stmts: Vec<Stmt>,
}

/// Written type in a declaration
#[derive(Debug, Clone)]
pub enum TypeSpec {
    Int,
    Bool,
    Void,
    /// `struct T`; the identifier links to the struct definition after
    /// name analysis
    Struct(Ident),
}

/// An identifier occurrence
///
/// `sym` is `None` as parsed; name analysis links every resolved
/// occurrence to exactly one symbol.
#[derive(Debug, Clone)]
pub struct Ident {
    pub name: String,
    pub span: Span,
    pub sym: Option<SymId>,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
            sym: None,
        }
    }
}

/// Statement
#[derive(Debug, Clone)]
pub enum Stmt {
    /// `loc = exp;`
    Assign(AssignExpr),

    /// `++loc;`
    PreInc(Expr),

    /// `--loc;`
    PreDec(Expr),

    /// `receive >> loc;`
    Receive(ReceiveStmt),

    /// `print << exp;`
    Print(PrintStmt),

    /// `if (exp) { ... }`
    If(IfStmt),

    /// `if (exp) { ... } else { ... }`
    IfElse(IfElseStmt),

    /// `while (exp) { ... }`
    While(WhileStmt),

    /// `repeat (exp) { ... }`
    Repeat(RepeatStmt),

    /// `f(args);`
    Call(CallExpr),

    /// `return exp?;`
    Return(Option<Expr>),
}

/// Input statement
#[derive(Debug, Clone)]
pub struct ReceiveStmt {
    pub target: Expr,
    /// Exact operand type, recorded by the type checker
    pub operand_ty: Option<Ty>,
}

/// Output statement
#[derive(Debug, Clone)]
pub struct PrintStmt {
    pub value: Expr,
    /// Exact operand type, recorded by the type checker; code
    /// generation dispatches the print syscall on it
    pub operand_ty: Option<Ty>,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub cond: Expr,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct IfElseStmt {
    pub cond: Expr,
    pub then_body: Block,
    pub else_body: Block,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct RepeatStmt {
    pub cond: Expr,
    pub body: Block,
}

/// Expression
#[derive(Debug, Clone)]
pub enum Expr {
    IntLit(IntLit),
    StrLit(StrLit),
    True(Span),
    False(Span),
    Id(Ident),
    Dot(DotAccess),
    Assign(Box<AssignExpr>),
    Call(CallExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
}

/// Integer literal
#[derive(Debug, Clone)]
pub struct IntLit {
    pub value: i32,
    pub span: Span,
}

/// String literal; `raw` keeps the source text, quotes and escapes
/// included, exactly as the emitter will print it after `.asciiz`
#[derive(Debug, Clone)]
pub struct StrLit {
    pub raw: String,
    pub span: Span,
}

/// Struct field access: `loc.field`
///
/// `loc` is always an `Id` or another `Dot` (the grammar roots every
/// access chain at an identifier). After name analysis `field.sym` links
/// to the field's symbol and `def` holds the field's own struct
/// definition when the field is struct-typed, so an enclosing access can
/// continue the chain.
#[derive(Debug, Clone)]
pub struct DotAccess {
    pub loc: Box<Expr>,
    pub field: Ident,
    pub def: Option<StructId>,
}

/// Assignment: `lhs = rhs`, an expression yielding the assigned value
#[derive(Debug, Clone)]
pub struct AssignExpr {
    pub lhs: Expr,
    pub rhs: Expr,
}

/// Function call
#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: Ident,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: UnOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    /// Unary minus
    Neg,
    /// Logical not
    Not,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub op: BinOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Plus,
    Minus,
    Times,
    Divide,
    And,
    Or,
    Equals,
    NotEquals,
    Less,
    Greater,
    LessEq,
    GreaterEq,
}

impl BinOp {
    /// Concrete-syntax spelling, used by the unparser
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Plus => "+",
            BinOp::Minus => "-",
            BinOp::Times => "*",
            BinOp::Divide => "/",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Equals => "==",
            BinOp::NotEquals => "!=",
            BinOp::Less => "<",
            BinOp::Greater => ">",
            BinOp::LessEq => "<=",
            BinOp::GreaterEq => ">=",
        }
    }
}

impl Expr {
    /// Position of the expression for diagnostics: the position of its
    /// leftmost leaf (operator-level errors are reported there).
    pub fn span(&self) -> Span {
        match self {
            Expr::IntLit(lit) => lit.span,
            Expr::StrLit(lit) => lit.span,
            Expr::True(span) | Expr::False(span) => *span,
            Expr::Id(id) => id.span,
            Expr::Dot(dot) => dot.loc.span(),
            Expr::Assign(assign) => assign.lhs.span(),
            Expr::Call(call) => call.callee.span,
            Expr::Unary(unary) => unary.span,
            Expr::Binary(binary) => binary.lhs.span(),
        }
    }
}
