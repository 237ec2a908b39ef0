//! Parser for Natural modules.
//!
//! Converts a [`TokenList`] into a [`SyntaxTree`]: the `DEFINE DATA` block becomes scope and variable nodes, the
//! executable part becomes statement nodes. Symbol binding is deferred: variable references are collected in
//! [`ParseOutput::unresolved`] and bound by the module pass once every declaration (including copycodes and data
//! areas) is known. Module targets (`CALLNAT`, `FETCH`, `INCLUDE`, `USING`, views) are looked up through a
//! [`ModuleProvider`] while parsing.
//!
//! ## Examples
//!
//! ```rust
//! use std::path::Path;
//! use natfront_syntax::{lexer, parser};
//! use natfront_syntax::provider::EmptyProvider;
//!
//! let tokens = lexer::lex("FOR #I := 1 TO 10\nIGNORE\nEND-FOR\n", Path::new("P.NSP"));
//! let output = parser::parse_statements(tokens, &EmptyProvider);
//! assert!(output.diagnostics.is_empty());
//! ```

use std::collections::BTreeSet;

use natfront_core::lang::file_types::FileType;
use natfront_core::lang::keywords::{self, KeywordId};
use natfront_core::lang::operators::{self, OperatorId};
use natfront_core::lang::punctuation::PunctuationId;
use natfront_core::lang::system::{self, SystemId};
use natfront_core::types::{DataFormat, DataType, ONE_GIGABYTE};

use crate::ast::*;
use crate::diagnostics::{Diagnostic, Position, errors};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::provider::{ModuleProvider, ModuleRef};
use crate::record_definition::RecordDefinition;
use crate::symbols::{ArrayDimension, Bound, TypedVariable, Variable, VariableKind, VariableScope};
use crate::token_list::TokenList;

// NOTE: This module is split across multiple files using `include!` to keep all parser
// methods in the same Rust module (preserving privacy + call patterns) while avoiding
// a single large source file.

include!("parser/core.rs");
include!("parser/helpers.rs");
include!("parser/operands.rs");
include!("parser/decl.rs");
include!("parser/stmts.rs");
include!("parser/api.rs");
include!("parser/tests.rs");
