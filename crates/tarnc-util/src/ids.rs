//! Arena ids shared across compiler phases.
//!
//! The semantic phase owns two arenas: one of symbols and one of struct
//! definitions. Their index types live here, below the AST crate, so
//! that AST nodes can carry resolution annotations (`Id` nodes link to a
//! [`SymId`], dot-access chains to a [`StructId`]) without a dependency
//! cycle between the parser and semantic crates.
//!
//! A struct-variable symbol refers to its definition by `StructId`
//! rather than by reference; the definition owns its field table, which
//! may in turn contain more struct-variable symbols pointing back at the
//! same definition. Index-based linking keeps that graph acyclic in
//! ownership terms.

use crate::define_idx;

define_idx!(SymId);

define_idx!(StructId);
