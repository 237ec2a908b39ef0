//! Natural front end
//!
//! This module contains the passes that turn one source file into a checked module:
//! - `lexer`, `parser`, `ast`, `diagnostics`, `provider`: re-exported from `natfront_syntax`
//! - `module`: the per-module pipeline (lex, parse, resolve, type check)
//! - `resolver`: binding of variable references to declarations
//! - `typechecker`: semantic checks over the bound tree
//! - `workspace`: a module provider over a library directory

// Syntax components are provided by the shared natfront_syntax crate.
pub use natfront_syntax::{ast, diagnostics, lexer, parser, provider, record_definition, symbols};

// Semantic passes remain local.
pub mod module;
pub mod resolver;
pub mod typechecker;
pub mod workspace;
