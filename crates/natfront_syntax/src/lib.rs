//! Shared syntax frontend for the Natural language: lexer, token stream, syntax tree, parser, diagnostics.
//!
//! This crate turns source text into a [`ast::SyntaxTree`] plus diagnostics. Other modules and record
//! definitions are reached through the [`provider::ModuleProvider`] trait, so the crate itself never touches the
//! filesystem.
//!
//! ## Notes
//! - This crate is "syntax-only": it does not bind variable references or type check. The `natfront` crate runs
//!   those passes on the [`parser::ParseOutput`].
//! - Vocabulary identity (keywords/operators/punctuation/system names) comes from `natfront_core::lang` registries.
//!
//! ## Examples
//! ```rust
//! use std::path::Path;
//! use natfront_syntax::{lexer, parser};
//! use natfront_syntax::provider::EmptyProvider;
//!
//! let tokens = lexer::lex("CALLNAT 'MODULE'\n", Path::new("P.NSP"));
//! let output = parser::parse_statements(tokens, &EmptyProvider);
//! assert_eq!(output.diagnostics.len(), 1);
//! assert_eq!(output.diagnostics[0].code(), "NPP026");
//! ```
//!
//! ## See also
//! - `natfront_core::types` for the data-format lattice.

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod provider;
pub mod record_definition;
pub mod symbols;
pub mod token_helpers;
pub mod token_list;

pub use token_list::TokenList;
