//! Symbol records and the per-compilation definition arenas.
//!
//! A [`Symbol`] is the compile-time record of a declared name: its type,
//! and for variables a storage class and frame offset, for functions the
//! formal types and frame size, for struct names the id of the
//! definition. Symbols live in the [`Definitions`] arena and are referred
//! to everywhere by [`SymId`]; struct definitions live in a second arena
//! keyed by [`StructId`].
//!
//! A struct-variable symbol points at its definition by index and the
//! definition's field table contains further symbols, possibly of the
//! same struct type. Holding indices rather than references keeps this
//! cyclic graph trivially owned.

use crate::table::Scope;
use tarnc_util::{IndexVec, StructId, SymId, Ty};

/// Storage class of a declared variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// Global variable, addressed by label
    Global,
    /// Function-local variable, addressed at a negative frame offset
    Local,
    /// Formal parameter, addressed at a non-negative frame offset
    Param,
}

/// A variable symbol (also used for struct fields)
#[derive(Debug, Clone)]
pub struct VarSymbol {
    pub ty: Ty,
    pub storage: Storage,
    /// Offset in bytes from the frame pointer: negative for locals,
    /// non-negative for parameters. Unused for globals; a word slot
    /// index for struct fields (layout stops at name analysis).
    pub offset: i32,
}

/// A function symbol
#[derive(Debug, Clone)]
pub struct FnSymbol {
    /// Formal parameter types, in declaration order
    pub params: Vec<Ty>,
    /// Declared return type
    pub ret: Ty,
    /// Bytes of frame taken by locals, including nested-scope locals;
    /// filled in when the function body has been analyzed
    pub local_frame_bytes: u32,
}

/// The symbol a struct type name is bound to
#[derive(Debug, Clone)]
pub struct StructDefSymbol {
    pub def: StructId,
}

/// A symbol bound to a name in some scope
#[derive(Debug, Clone)]
pub enum Symbol {
    Var(VarSymbol),
    Fn(FnSymbol),
    StructDef(StructDefSymbol),
}

impl Symbol {
    /// The type value this symbol contributes to an expression naming it
    pub fn ty(&self) -> Ty {
        match self {
            Symbol::Var(var) => var.ty.clone(),
            Symbol::Fn(func) => Ty::Fn {
                params: func.params.clone(),
                ret: Box::new(func.ret.clone()),
            },
            Symbol::StructDef(def) => Ty::StructDef(def.def),
        }
    }

    pub fn as_var(&self) -> Option<&VarSymbol> {
        match self {
            Symbol::Var(var) => Some(var),
            _ => None,
        }
    }

    pub fn as_fn(&self) -> Option<&FnSymbol> {
        match self {
            Symbol::Fn(func) => Some(func),
            _ => None,
        }
    }

    pub fn as_struct_def(&self) -> Option<&StructDefSymbol> {
        match self {
            Symbol::StructDef(def) => Some(def),
            _ => None,
        }
    }
}

/// A struct definition: its name and field table
///
/// The field table is an ordinary scope whose iteration order is the
/// field declaration order.
#[derive(Debug, Clone)]
pub struct StructDef {
    pub name: String,
    pub fields: Scope,
}

/// The definition arenas for one compilation
///
/// Freshly created by name analysis, read by the type checker and the
/// code generator, dropped when the compilation ends.
#[derive(Debug, Default)]
pub struct Definitions {
    pub symbols: IndexVec<SymId, Symbol>,
    pub structs: IndexVec<StructId, StructDef>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Type of the symbol `sym`
    pub fn ty_of(&self, sym: SymId) -> Ty {
        self.symbols[sym].ty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_symbol_ty() {
        let sym = Symbol::Var(VarSymbol {
            ty: Ty::Int,
            storage: Storage::Local,
            offset: -8,
        });
        assert!(sym.ty().is_int());
        assert!(sym.as_var().is_some());
        assert!(sym.as_fn().is_none());
    }

    #[test]
    fn test_fn_symbol_ty() {
        let sym = Symbol::Fn(FnSymbol {
            params: vec![Ty::Int, Ty::Bool],
            ret: Ty::Void,
            local_frame_bytes: 8,
        });
        let ty = sym.ty();
        assert!(ty.is_fn());
        assert_eq!(
            ty,
            Ty::Fn {
                params: vec![Ty::Int, Ty::Bool],
                ret: Box::new(Ty::Void),
            }
        );
    }

    #[test]
    fn test_struct_def_symbol_ty() {
        let sym = Symbol::StructDef(StructDefSymbol { def: StructId(2) });
        assert_eq!(sym.ty(), Ty::StructDef(StructId(2)));
        assert!(sym.as_struct_def().is_some());
    }

    #[test]
    fn test_definitions_arena() {
        let mut defs = Definitions::new();
        let sid = defs.structs.push(StructDef {
            name: "Pair".into(),
            fields: Scope::new(),
        });
        let sym = defs.symbols.push(Symbol::Var(VarSymbol {
            ty: Ty::Struct(sid),
            storage: Storage::Global,
            offset: 0,
        }));
        assert_eq!(defs.ty_of(sym), Ty::Struct(sid));
        assert_eq!(defs.structs[sid].name, "Pair");
    }
}
