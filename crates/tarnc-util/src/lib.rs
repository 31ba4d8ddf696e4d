//! tarnc-util - Core Utilities and Foundation Types
//!
//! This crate provides the foundation types shared by every phase of the
//! tarnc compiler:
//!
//! - [`Span`] - source locations (byte range plus 1-based line/column)
//! - [`Handler`] / [`Diagnostic`] - the single error sink all phases
//!   report through
//! - [`Idx`] / [`IndexVec`] and the [`define_idx!`] macro - typed indices
//!   for arena-allocated compiler data
//! - [`SymId`] / [`StructId`] - arena ids for symbols and struct
//!   definitions, defined here so the AST crate can carry resolution
//!   annotations without depending on the semantic crate
//! - [`Ty`] - the type values computed by the semantic phases and
//!   consumed by code generation
//!
//! Nothing in this crate holds global state; every compilation owns its
//! own handler and arenas and tears them down when it completes.

pub mod diagnostic;
pub mod ids;
pub mod index_vec;
pub mod span;
pub mod types;

pub use diagnostic::{Diagnostic, Handler, Level};
pub use ids::{StructId, SymId};
pub use index_vec::{Idx, IndexVec};
pub use span::Span;
pub use types::Ty;

// Re-export commonly used types
pub use rustc_hash::FxHashMap;
