//! Core compiler for VSL: symbol resolution, tree simplification, and
//! x86-64 code generation. Lexing and parsing are out of scope — callers
//! hand in a [`raw::RawNode`], the literal external AST shape a conforming
//! front end would produce.
//!
//! Phases run strictly in sequence and fail fast: [`lower`] turns the raw
//! tree into the typed internal one, [`simplify`] folds and strength-reduces
//! it, [`bind`] resolves every identifier and populates the symbol and
//! string tables, and [`codegen`] reads the annotated tree to emit
//! assembly. [`driver`] sequences all four for a CLI front end.

pub mod ast;
pub mod bind;
pub mod codegen;
pub mod driver;
pub mod error;
pub mod lower;
pub mod raw;
pub mod simplify;
pub mod strings;
pub mod symbols;

pub use bind::{bind, Bound};
pub use error::CompileError;
pub use lower::lower;
pub use simplify::simplify;
