//! tarnc-gen - Code Generation
//!
//! Lowers a checked AST to MIPS-style stack-machine assembly. The
//! generator ([`codegen`]) walks the tree read-only, consuming the
//! symbol information produced by `tarnc-sem` for storage classes,
//! frame offsets and frame sizes; the emitter ([`emit`]) owns the
//! textual surface: instruction formatting, label allocation and the
//! string-literal pool.
//!
//! The driver only invokes this phase on programs with no lexical,
//! syntactic or semantic diagnostics; the generator assumes every
//! identifier is linked and every print/receive carries its operand
//! type.

pub mod codegen;
pub mod emit;

#[cfg(test)]
mod edge_cases;

pub use codegen::generate;
pub use emit::Emitter;
