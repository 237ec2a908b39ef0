//! Natural language vocabulary registries.
//!
//! This module is the "front door" for language-level vocabulary: keywords, system variables and functions,
//! operators, punctuation, diagnostic ids and object file types.
//!
//! The design goal is to avoid stringly-typed checks scattered across the lexer, parser and checker. Callers work
//! with **stable IDs** (e.g. `KeywordId`, `SystemId`) and look up spellings/metadata via registry tables.
//!
//! ## Notes
//! - Registries are **pure**: no syntax tree types, no IO, no side effects.
//! - Every table is ordered like its id enum, so metadata lookup never fails.
//!
//! ## Examples
//! ```rust
//! use natfront_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("IF"), Some(KeywordId::If));
//! assert_eq!(keywords::as_str(KeywordId::If), "IF");
//! ```

pub mod errors;
pub mod file_types;
pub mod keywords;
pub mod operators;
pub mod punctuation;
pub mod system;
