//! Operator vocabulary.
//!
//! This module defines the canonical set of symbol operators: arithmetic, comparison and assignment. Word
//! operators (`EQ`, `AND`, `NOT`, ...) live in the keyword registry ([`crate::lang::keywords`]), and
//! [`relational_keyword`] maps them onto their symbolic counterparts.
//!
//! ## Notes
//! - Lookup via [`from_str`] is exact. `^=` is accepted as an alias for `<>`.
//!
//! ## Examples
//! ```rust
//! use natfront_core::lang::operators::{self, OperatorId};
//!
//! assert_eq!(operators::from_str("<>"), Some(OperatorId::NotEqual));
//! assert_eq!(operators::from_str("^="), Some(OperatorId::NotEqual));
//! assert_eq!(operators::as_str(OperatorId::ColonEquals), ":=");
//! ```

use super::keywords::KeywordId;

/// Broad operator grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorCategory {
    Arithmetic,
    Comparison,
    Assignment,
}

/// Stable identifier for every symbol operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorId {
    // Arithmetic
    Plus,
    Minus,
    Asterisk,
    Slash,
    Exponent,

    // Comparison
    Equals,
    NotEqual,
    Less,
    LessEq,
    Greater,
    GreaterEq,

    // Assignment
    ColonEquals,
}

/// Metadata for an operator.
#[derive(Debug, Clone, Copy)]
pub struct OperatorInfo {
    pub id: OperatorId,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub category: OperatorCategory,
}

/// Registry of all operators, in [`OperatorId`] order.
pub const OPERATORS: &[OperatorInfo] = &[
    info(OperatorId::Plus, "+", &[], OperatorCategory::Arithmetic),
    info(OperatorId::Minus, "-", &[], OperatorCategory::Arithmetic),
    info(OperatorId::Asterisk, "*", &[], OperatorCategory::Arithmetic),
    info(OperatorId::Slash, "/", &[], OperatorCategory::Arithmetic),
    info(OperatorId::Exponent, "**", &[], OperatorCategory::Arithmetic),
    info(OperatorId::Equals, "=", &[], OperatorCategory::Comparison),
    info(OperatorId::NotEqual, "<>", &["^="], OperatorCategory::Comparison),
    info(OperatorId::Less, "<", &[], OperatorCategory::Comparison),
    info(OperatorId::LessEq, "<=", &[], OperatorCategory::Comparison),
    info(OperatorId::Greater, ">", &[], OperatorCategory::Comparison),
    info(OperatorId::GreaterEq, ">=", &[], OperatorCategory::Comparison),
    info(OperatorId::ColonEquals, ":=", &[], OperatorCategory::Assignment),
];

/// Canonical spelling.
pub fn as_str(id: OperatorId) -> &'static str {
    info_for(id).canonical
}

/// Full metadata.
pub fn info_for(id: OperatorId) -> &'static OperatorInfo {
    &OPERATORS[id as usize]
}

/// Lookup by spelling (canonical or alias).
pub fn from_str(s: &str) -> Option<OperatorId> {
    OPERATORS
        .iter()
        .find(|o| o.canonical == s || o.aliases.contains(&s))
        .map(|o| o.id)
}

/// Return `true` for the comparison operators usable in a relational condition.
pub fn is_comparison(id: OperatorId) -> bool {
    info_for(id).category == OperatorCategory::Comparison
}

/// Map a relational keyword (`EQ`, `NE`, `LT`, ...) onto its symbolic operator.
///
/// ## Returns
/// - `None` for keywords that are not relational operators.
pub fn relational_keyword(id: KeywordId) -> Option<OperatorId> {
    match id {
        KeywordId::Eq | KeywordId::Equal => Some(OperatorId::Equals),
        KeywordId::Ne => Some(OperatorId::NotEqual),
        KeywordId::Lt => Some(OperatorId::Less),
        KeywordId::Le => Some(OperatorId::LessEq),
        KeywordId::Gt => Some(OperatorId::Greater),
        KeywordId::Ge => Some(OperatorId::GreaterEq),
        _ => None,
    }
}

const fn info(
    id: OperatorId,
    canonical: &'static str,
    aliases: &'static [&'static str],
    category: OperatorCategory,
) -> OperatorInfo {
    OperatorInfo {
        id,
        canonical,
        aliases,
        category,
    }
}
