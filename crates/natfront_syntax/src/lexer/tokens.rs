//! Token types for the Natural lexer.
//!
//! The lexer uses **registry-backed IDs** for language vocabulary:
//! - `Keyword(KeywordId)` for keywords
//! - `System(SystemId)` for `*`-prefixed system variables and functions
//! - `Operator(OperatorId)` / `Punctuation(PunctuationId)` for symbols
//!
//! ## Notes
//! - Tokens keep the exact source slice in `text`; literal values are derived on demand.
//! - A token can be re-tagged with [`Token::with_kind`], e.g. when a keyword is used as a variable name.
//! - Use `crate::token_helpers` for ergonomic token matching at call sites.

use std::path::Path;
use std::sync::Arc;

use natfront_core::lang::keywords::{self, KeywordId};
use natfront_core::lang::operators::{self, OperatorId};
use natfront_core::lang::punctuation::{self, PunctuationId};
use natfront_core::lang::system::{self, SystemId};

use crate::diagnostics::Position;

// ============================================================================
// TOKEN TYPES
// ============================================================================

/// Kind of token produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // ========== Vocabulary (ID-based) ==========
    Keyword(KeywordId),
    System(SystemId),
    Operator(OperatorId),
    Punctuation(PunctuationId),

    // ========== Names ==========
    Identifier,
    /// `LABEL.` used by `ESCAPE BOTTOM (LABEL.)` and ranged loops.
    LabelIdentifier,

    // ========== Literals ==========
    Number,
    String,

    // ========== Output-control ==========
    /// `5X`
    OperandSkip,
    /// `10T`
    TabSetting,
    /// `(EM=...)` body
    EditMask,
    /// `AD=...`
    AttributeDefinition,
    /// `CD=...`
    ColorDefinition,
    /// `PF1` .. `PF48`
    PfKey,
}

impl TokenKind {
    /// Human readable spelling used in diagnostics.
    pub fn describe(self) -> String {
        match self {
            TokenKind::Keyword(id) => keywords::as_str(id).to_string(),
            TokenKind::System(id) => format!("*{}", system::as_str(id)),
            TokenKind::Operator(id) => operators::as_str(id).to_string(),
            TokenKind::Punctuation(id) => punctuation::as_str(id).to_string(),
            TokenKind::Identifier => "identifier".to_string(),
            TokenKind::LabelIdentifier => "label".to_string(),
            TokenKind::Number => "number".to_string(),
            TokenKind::String => "string".to_string(),
            TokenKind::OperandSkip => "operand skip".to_string(),
            TokenKind::TabSetting => "tab setting".to_string(),
            TokenKind::EditMask => "edit mask".to_string(),
            TokenKind::AttributeDefinition => "attribute definition".to_string(),
            TokenKind::ColorDefinition => "color definition".to_string(),
            TokenKind::PfKey => "PF key".to_string(),
        }
    }
}

/// A token with its kind and source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source slice.
    pub text: String,
    pub offset: usize,
    /// 0-based.
    pub line: u32,
    /// 0-based byte column within the line.
    pub column: u32,
    pub length: usize,
    pub path: Arc<Path>,
    /// Set for tokens of an included copycode: diagnostics point here instead.
    pub relocated: Option<Box<Position>>,
}

impl Token {
    /// Copy this token with a different kind.
    pub fn with_kind(&self, kind: TokenKind) -> Token {
        Token {
            kind,
            ..self.clone()
        }
    }

    /// Uppercased text, used for every name comparison.
    pub fn symbol_name(&self) -> String {
        self.text.to_ascii_uppercase()
    }

    /// Where the token is in its own file.
    pub fn position(&self) -> Position {
        Position {
            path: Arc::clone(&self.path),
            offset: self.offset,
            line: self.line,
            column: self.column,
            length: self.length,
        }
    }

    /// Where diagnostics about this token should point.
    pub fn diagnostic_position(&self) -> Position {
        match &self.relocated {
            Some(position) => (**position).clone(),
            None => self.position(),
        }
    }

    /// Decoded value of a string literal.
    ///
    /// Handles doubled quotes, `'a' - 'b'` concatenations and hex literals (`H'41'`).
    pub fn string_value(&self) -> String {
        segments(&self.text)
            .into_iter()
            .map(|(hex, content)| if hex { decode_hex(&content) } else { content })
            .collect()
    }

    /// Numeric value of a number literal, ignoring the decimal part.
    pub fn int_value(&self) -> Option<i64> {
        let text = self.text.as_str();
        let integer = text.split(['.', ',']).next().unwrap_or(text);
        integer.parse().ok()
    }
}

/// Every quoted segment in `text` with doubled quotes decoded, flagged when it is a hex segment.
fn segments(text: &str) -> Vec<(bool, String)> {
    let mut result = Vec::new();
    let mut previous = None;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\'' && c != '"' {
            previous = Some(c);
            continue;
        }
        let hex = matches!(previous, Some('H' | 'h'));
        let quote = c;
        let mut value = String::new();
        while let Some(inner) = chars.next() {
            if inner == quote {
                if chars.peek() == Some(&quote) {
                    chars.next();
                    value.push(quote);
                    continue;
                }
                break;
            }
            value.push(inner);
        }
        result.push((hex, value));
        previous = Some(quote);
    }
    result
}

fn decode_hex(digits: &str) -> String {
    let bytes: Vec<char> = digits.chars().collect();
    bytes
        .chunks(2)
        .filter_map(|pair| {
            let pair: String = pair.iter().collect();
            u8::from_str_radix(&pair, 16).ok().map(char::from)
        })
        .collect()
}

/// Resolve an identifier spelling to a keyword id.
pub fn keyword_id(name: &str) -> Option<KeywordId> {
    keywords::from_str(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(kind: TokenKind, text: &str) -> Token {
        Token {
            kind,
            text: text.to_string(),
            offset: 0,
            line: 0,
            column: 0,
            length: text.len(),
            path: Arc::from(Path::new("T.NSP")),
            relocated: None,
        }
    }

    #[test]
    fn string_value_decodes_doubled_quotes() {
        assert_eq!(token(TokenKind::String, "'it''s'").string_value(), "it's");
    }

    #[test]
    fn string_value_joins_concatenated_segments() {
        assert_eq!(token(TokenKind::String, "'ab' - \n 'cd'").string_value(), "abcd");
    }

    #[test]
    fn string_value_decodes_hex() {
        assert_eq!(token(TokenKind::String, "H'4142'").string_value(), "AB");
    }

    #[test]
    fn retagging_keeps_location() {
        let keyword = token(TokenKind::Keyword(KeywordId::Data), "data");
        let retagged = keyword.with_kind(TokenKind::Identifier);
        assert_eq!(retagged.kind, TokenKind::Identifier);
        assert_eq!(retagged.symbol_name(), "DATA");
        assert_eq!(retagged.length, 4);
    }
}
