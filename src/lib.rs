#![forbid(unsafe_code)]
//! Front end for the Natural programming language
//!
//! This crate takes Natural sources through lexing, parsing, reference resolution and type checking, and reports
//! everything it finds as diagnostics. The lexer, syntax tree and parser live in `natfront_syntax`; this crate adds
//! the per-module pipeline, the resolver, the type checker, a filesystem module provider and the `natfront` CLI.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Malformed input**: Never a panic. Sources that can't be parsed produce diagnostics, and a checker that can't
//!   make sense of a node reports an internal diagnostic (NPP000) and moves on.

pub mod cli;
pub mod frontend;

pub use frontend::ast;
pub use frontend::diagnostics;
pub use frontend::lexer;
pub use frontend::parser;
pub use frontend::symbols;
pub use frontend::typechecker;

pub use frontend::module::{ModuleParser, NaturalModule, parse_module};
pub use frontend::workspace::LibraryProvider;
