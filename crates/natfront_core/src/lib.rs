//! Provide the shared, pure vocabulary and data-type semantics of the Natural front end.
//!
//! This crate is dependency-free. It contains the registries the lexer, parser and type checker share (keywords,
//! system variables, operators, diagnostic ids, file types) and the [`types`] lattice that decides which data
//! formats implicitly convert into which.
//!
//! ## Notes
//!
//! - **No IO**, no global state, and no syntax-tree types.

pub mod lang;
pub mod types;
