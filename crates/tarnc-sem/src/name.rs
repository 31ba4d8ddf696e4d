//! Name analysis: binding uses to declarations.
//!
//! The analyzer walks the AST once, maintaining the scope stack. Every
//! declaration inserts a symbol into the innermost scope (rejecting
//! duplicates), every use resolves innermost-outward and links its
//! `Ident` to the found symbol. Frame offsets are assigned here: locals
//! get `-8 - 4k` from a per-function counter (nested-scope locals
//! included), formals get `4(N - i)` so the first formal sits highest
//! above the saved frame pointer.
//!
//! A diagnostic suppresses further semantic work on the offending node
//! but never stops the walk over its siblings; dot-access chains thread
//! a bad-access flag so one unresolved component does not cascade.

use crate::symbol::{Definitions, FnSymbol, Storage, StructDef, StructDefSymbol, Symbol, VarSymbol};
use crate::table::SymbolTable;
use tarnc_par::ast::*;
use tarnc_util::{Handler, Span, Ty};

/// Run name analysis over `program`, linking identifier annotations and
/// returning the freshly built definition arenas.
///
/// Diagnostics go to `handler`; the walk always completes.
pub fn analyze(program: &mut Program, handler: &Handler) -> Definitions {
    let mut analyzer = NameAnalyzer {
        table: SymbolTable::new(),
        defs: Definitions::new(),
        handler,
        local_count: 0,
    };
    analyzer.analyze_program(program);
    analyzer.defs
}

/// How a variable declaration is being used, which decides its storage
/// class and offset.
enum VarKind {
    Global,
    Local,
    Field { slot: u32 },
}

struct NameAnalyzer<'a> {
    table: SymbolTable,
    defs: Definitions,
    handler: &'a Handler,
    /// Local slots allocated so far in the current function
    local_count: u32,
}

impl<'a> NameAnalyzer<'a> {
    fn analyze_program(&mut self, program: &mut Program) {
        self.table.push_scope();

        for decl in &mut program.decls {
            match decl {
                Decl::Var(var) => self.declare_var(var, VarKind::Global),
                Decl::Fn(func) => self.analyze_fn_decl(func),
                Decl::Struct(st) => self.analyze_struct_decl(st),
            }
        }

        let main_is_fn = self
            .table
            .lookup_global("main")
            .map(|sym| self.defs.symbols[sym].as_fn().is_some())
            .unwrap_or(false);
        if !main_is_fn {
            self.handler.fatal(Span::DUMMY, "No main function");
        }

        let _ = self.table.pop_scope();
    }

    // =========================================================================
    // DECLARATIONS
    // =========================================================================

    /// Resolve a written type to a type value, linking the identifier of
    /// a `struct T` type to its definition.
    fn resolve_type(&mut self, ty: &mut TypeSpec) -> Ty {
        match ty {
            TypeSpec::Int => Ty::Int,
            TypeSpec::Bool => Ty::Bool,
            TypeSpec::Void => Ty::Void,
            TypeSpec::Struct(name) => {
                let resolved = self
                    .table
                    .lookup_global(&name.name)
                    .and_then(|sym| self.defs.symbols[sym].as_struct_def().map(|d| (sym, d.def)));
                match resolved {
                    Some((sym, def)) => {
                        name.sym = Some(sym);
                        Ty::Struct(def)
                    }
                    None => {
                        self.handler.fatal(name.span, "Invalid name of struct type");
                        Ty::Error
                    }
                }
            }
        }
    }

    fn declare_var(&mut self, var: &mut VarDecl, kind: VarKind) {
        let ty = self.resolve_type(&mut var.ty);
        let mut bad = ty.is_error();

        if matches!(var.ty, TypeSpec::Void) {
            self.handler
                .fatal(var.name.span, "Non-function declared void");
            bad = true;
        }
        if self.table.lookup_local(&var.name.name).is_some() {
            self.handler
                .fatal(var.name.span, "Multiply declared identifier");
            bad = true;
        }
        if bad {
            return;
        }

        let (storage, offset) = match kind {
            VarKind::Global => (Storage::Global, 0),
            VarKind::Local => {
                let offset = -8 - 4 * self.local_count as i32;
                self.local_count += 1;
                (Storage::Local, offset)
            }
            VarKind::Field { slot } => (Storage::Local, 4 * slot as i32),
        };

        let sym = self
            .defs
            .symbols
            .push(Symbol::Var(VarSymbol { ty, storage, offset }));
        if self.table.insert_local(var.name.name.clone(), sym).is_ok() {
            var.name.sym = Some(sym);
        }
    }

    /// Declare one formal, returning its declared type for the function
    /// symbol's parameter list (recorded even when the declaration
    /// itself was rejected, keeping arity consistent with the source).
    fn declare_formal(&mut self, formal: &mut FormalDecl, offset: i32) -> Ty {
        let ty = self.resolve_type(&mut formal.ty);
        let mut bad = ty.is_error();

        if matches!(formal.ty, TypeSpec::Void) {
            self.handler
                .fatal(formal.name.span, "Non-function declared void");
            bad = true;
        }
        if self.table.lookup_local(&formal.name.name).is_some() {
            self.handler
                .fatal(formal.name.span, "Multiply declared identifier");
            bad = true;
        }

        if !bad {
            let sym = self.defs.symbols.push(Symbol::Var(VarSymbol {
                ty: ty.clone(),
                storage: Storage::Param,
                offset,
            }));
            if self
                .table
                .insert_local(formal.name.name.clone(), sym)
                .is_ok()
            {
                formal.name.sym = Some(sym);
            }
        }

        ty
    }

    fn analyze_fn_decl(&mut self, func: &mut FnDecl) {
        let dup = self.table.lookup_local(&func.name.name).is_some();
        if dup {
            self.handler
                .fatal(func.name.span, "Multiply declared identifier");
        }

        let ret = self.resolve_type(&mut func.ret);
        let sym = self.defs.symbols.push(Symbol::Fn(FnSymbol {
            params: Vec::new(),
            ret,
            local_frame_bytes: 0,
        }));
        func.name.sym = Some(sym);
        if !dup {
            let _ = self.table.insert_local(func.name.name.clone(), sym);
        }

        // Even a duplicate function gets its body analyzed for coverage.
        self.local_count = 0;
        self.table.push_scope();

        let count = func.formals.len();
        let mut params = Vec::with_capacity(count);
        for (i, formal) in func.formals.iter_mut().enumerate() {
            // first formal sits highest above the saved frame pointer
            let offset = (4 * (count - i)) as i32;
            params.push(self.declare_formal(formal, offset));
        }
        if let Symbol::Fn(fn_sym) = &mut self.defs.symbols[sym] {
            fn_sym.params = params;
        }

        self.analyze_body(&mut func.body);

        if let Symbol::Fn(fn_sym) = &mut self.defs.symbols[sym] {
            fn_sym.local_frame_bytes = 4 * self.local_count;
        }
        let _ = self.table.pop_scope();
    }

    fn analyze_struct_decl(&mut self, st: &mut StructDecl) {
        let dup = self.table.lookup_local(&st.name.name).is_some();
        if dup {
            self.handler
                .fatal(st.name.span, "Multiply declared identifier");
        }

        // Fields get their own scope; the enclosing scopes stay visible
        // underneath it so a struct-typed field can resolve its type
        // name. The definition itself is not yet in scope, so a struct
        // cannot contain a field of its own type.
        self.table.push_scope();
        for (slot, field) in st.fields.iter_mut().enumerate() {
            self.declare_var(field, VarKind::Field { slot: slot as u32 });
        }
        let fields = self.table.pop_scope().unwrap_or_default();

        let def = self.defs.structs.push(StructDef {
            name: st.name.name.clone(),
            fields,
        });
        let sym = self
            .defs
            .symbols
            .push(Symbol::StructDef(StructDefSymbol { def }));
        st.name.sym = Some(sym);
        if !dup {
            let _ = self.table.insert_local(st.name.name.clone(), sym);
        }
    }

    // =========================================================================
    // STATEMENTS
    // =========================================================================

    /// Analyze a body's declarations then statements in the current
    /// scope (the function scope already holds the formals).
    fn analyze_body(&mut self, block: &mut Block) {
        for decl in &mut block.decls {
            self.declare_var(decl, VarKind::Local);
        }
        for stmt in &mut block.stmts {
            self.analyze_stmt(stmt);
        }
    }

    /// A nested statement body opens its own scope.
    fn analyze_nested_block(&mut self, block: &mut Block) {
        self.table.push_scope();
        self.analyze_body(block);
        let _ = self.table.pop_scope();
    }

    fn analyze_stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Assign(assign) => {
                self.analyze_expr(&mut assign.lhs);
                self.analyze_expr(&mut assign.rhs);
            }
            Stmt::PreInc(loc) | Stmt::PreDec(loc) => self.analyze_expr(loc),
            Stmt::Receive(receive) => self.analyze_expr(&mut receive.target),
            Stmt::Print(print) => self.analyze_expr(&mut print.value),
            Stmt::If(if_stmt) => {
                self.analyze_expr(&mut if_stmt.cond);
                self.analyze_nested_block(&mut if_stmt.body);
            }
            Stmt::IfElse(if_else) => {
                self.analyze_expr(&mut if_else.cond);
                self.analyze_nested_block(&mut if_else.then_body);
                self.analyze_nested_block(&mut if_else.else_body);
            }
            Stmt::While(while_stmt) => {
                self.analyze_expr(&mut while_stmt.cond);
                self.analyze_nested_block(&mut while_stmt.body);
            }
            Stmt::Repeat(repeat) => {
                self.analyze_expr(&mut repeat.cond);
                self.analyze_nested_block(&mut repeat.body);
            }
            Stmt::Call(call) => self.analyze_call(call),
            Stmt::Return(Some(value)) => self.analyze_expr(value),
            Stmt::Return(None) => {}
        }
    }

    // =========================================================================
    // EXPRESSIONS
    // =========================================================================

    fn analyze_expr(&mut self, expr: &mut Expr) {
        match expr {
            Expr::IntLit(_) | Expr::StrLit(_) | Expr::True(_) | Expr::False(_) => {}
            Expr::Id(id) => self.analyze_id_use(id),
            Expr::Dot(dot) => {
                self.analyze_dot(dot);
            }
            Expr::Assign(assign) => {
                self.analyze_expr(&mut assign.lhs);
                self.analyze_expr(&mut assign.rhs);
            }
            Expr::Call(call) => self.analyze_call(call),
            Expr::Unary(unary) => self.analyze_expr(&mut unary.operand),
            Expr::Binary(binary) => {
                self.analyze_expr(&mut binary.lhs);
                self.analyze_expr(&mut binary.rhs);
            }
        }
    }

    fn analyze_id_use(&mut self, id: &mut Ident) {
        match self.table.lookup_global(&id.name) {
            Some(sym) => id.sym = Some(sym),
            None => self.handler.fatal(id.span, "Undeclared identifier"),
        }
    }

    fn analyze_call(&mut self, call: &mut CallExpr) {
        self.analyze_id_use(&mut call.callee);
        for arg in &mut call.args {
            self.analyze_expr(arg);
        }
    }

    /// Resolve a dot access, returning the bad-access flag.
    ///
    /// When the flag comes back true an error has already been reported
    /// somewhere in the chain and callers must not pile on.
    fn analyze_dot(&mut self, dot: &mut DotAccess) -> bool {
        dot.def = None;
        let loc_span = dot.loc.span();

        let def = match &mut *dot.loc {
            Expr::Id(id) => {
                self.analyze_id_use(id);
                let Some(sym) = id.sym else {
                    // undeclared: already reported, suppress the cascade
                    return true;
                };
                let struct_def = match self.defs.symbols[sym].as_var() {
                    Some(var) => match var.ty {
                        Ty::Struct(def) => Some(def),
                        _ => None,
                    },
                    None => None,
                };
                match struct_def {
                    Some(def) => def,
                    None => {
                        self.handler
                            .fatal(loc_span, "Dot-access of non-struct type");
                        return true;
                    }
                }
            }
            Expr::Dot(inner) => {
                if self.analyze_dot(inner) {
                    return true;
                }
                match inner.def {
                    Some(def) => def,
                    None => {
                        self.handler
                            .fatal(loc_span, "Dot-access of non-struct type");
                        return true;
                    }
                }
            }
            // the grammar roots every access chain at an identifier
            _ => unreachable!("dot-access of a non-loc expression"),
        };

        let field_sym = self.defs.structs[def].fields.get(&dot.field.name).copied();
        match field_sym {
            Some(sym) => {
                dot.field.sym = Some(sym);
                if let Some(var) = self.defs.symbols[sym].as_var() {
                    if let Ty::Struct(field_def) = var.ty {
                        dot.def = Some(field_def);
                    }
                }
                false
            }
            None => {
                self.handler
                    .fatal(dot.field.span, "Invalid struct field name");
                true
            }
        }
    }
}
