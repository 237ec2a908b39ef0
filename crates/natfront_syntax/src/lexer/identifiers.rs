//! Identifier, keyword and attribute scanning.
//!
//! ## Notes
//! - A name containing `# @ $ & .` or two or more dashes can never be a keyword.
//! - `C*NAME`, `T*NAME` and `P*NAME` (count, time and page pseudo-fields of views) lex as one identifier, also
//!   when qualified (`VIEW.C*NAME`).
//! - A trailing `.` makes a label (`R1.`); on anything else it is reported and the identifier is kept.

use super::{LexMode, Lexer, TokenKind, is_identifier_char};
use crate::diagnostics::errors;
use natfront_core::lang::keywords;

impl Lexer<'_> {
    /// Identifier starting with `#`, `&` or `+`.
    pub(super) fn consume_identifier(&mut self) {
        let start = self.pos;
        if self.peek() == Some('+') {
            self.advance();
        }
        self.scan_name();
        self.scan_pseudo_field_suffix(start);
        self.finish_name(start, false);
    }

    /// Identifier or keyword starting with a letter.
    pub(super) fn consume_identifier_or_keyword(&mut self) {
        if self.mode == LexMode::Parenthesized {
            let rest = &self.source[self.pos..];
            let attribute = [
                ("EM=", TokenKind::EditMask),
                ("AD=", TokenKind::AttributeDefinition),
                ("CD=", TokenKind::ColorDefinition),
            ]
            .into_iter()
            .find(|(prefix, _)| rest.get(..3).is_some_and(|head| head.eq_ignore_ascii_case(prefix)));
            if let Some((_, kind)) = attribute {
                self.consume_attribute(kind);
                return;
            }
        }

        let start = self.pos;
        if self.source[self.pos..].starts_with("PF") && self.peek_at(2).is_some_and(|c| c.is_ascii_digit()) {
            self.advance_by(2);
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
            self.push_token(TokenKind::PfKey, start);
            return;
        }

        self.scan_name();
        self.scan_data_format_decimals(start);
        self.scan_pseudo_field_suffix(start);
        self.finish_name(start, true);
    }

    fn scan_name(&mut self) {
        while let Some(c) = self.peek() {
            if !is_identifier_char(c) {
                break;
            }
            if c == '/' && (self.peek_at(1) == Some('*') || self.mode == LexMode::Parenthesized) {
                break;
            }
            self.advance();
        }
    }

    /// `(N7,2)`: the comma belongs to the data format.
    fn scan_data_format_decimals(&mut self, start: usize) {
        if self.mode != LexMode::Parenthesized || self.peek() != Some(',') {
            return;
        }
        if !self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) || !is_data_format(&self.source[start..self.pos]) {
            return;
        }
        self.advance();
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn scan_pseudo_field_suffix(&mut self, start: usize) {
        if self.peek() != Some('*') {
            return;
        }
        let lexeme = &self.source[start..self.pos];
        let last_segment = lexeme.rsplit('.').next().unwrap_or(lexeme);
        let is_pseudo_prefix = last_segment.len() == 1 && matches!(last_segment, "C" | "c" | "T" | "t" | "P" | "p");
        if !is_pseudo_prefix {
            return;
        }
        self.advance();
        self.scan_name();
    }

    fn finish_name(&mut self, start: usize, may_be_keyword: bool) {
        let lexeme = &self.source[start..self.pos];

        if let Some(stem) = lexeme.strip_suffix('.') {
            if is_label_name(stem) {
                self.push_token(TokenKind::LabelIdentifier, start);
            } else {
                let position = self.position(start, self.pos);
                self.report(errors::invalid_identifier("Identifiers can not end with '.'", position));
                self.push_token(TokenKind::Identifier, start);
            }
            return;
        }

        let kind = if may_be_keyword && !is_always_identifier(lexeme) {
            keywords::from_str(lexeme).map_or(TokenKind::Identifier, TokenKind::Keyword)
        } else {
            TokenKind::Identifier
        };
        self.push_token(kind, start);
    }

    /// `EM=`, `AD=` and `CD=` bodies inside parentheses.
    fn consume_attribute(&mut self, kind: TokenKind) {
        let start = self.pos;
        self.advance_by(3);
        let mut in_string = false;
        while let Some(c) = self.peek() {
            if c == ')' && !in_string {
                break;
            }
            if kind == TokenKind::EditMask && (c == '\'' || c == '"') {
                in_string = !in_string;
            }
            if self.is_whitespace_at(0) && !in_string {
                break;
            }
            if c == '\n' {
                break;
            }
            self.advance();
        }
        self.push_token(kind, start);
    }
}

fn is_always_identifier(lexeme: &str) -> bool {
    lexeme.matches('-').count() > 1 || lexeme.contains(['#', '@', '$', '&', '.', '/'])
}

fn is_label_name(stem: &str) -> bool {
    let mut chars = stem.chars();
    chars.next().is_some_and(char::is_alphabetic)
        && chars.all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

/// A format letter followed by digits, e.g. `N7`.
fn is_data_format(lexeme: &str) -> bool {
    let mut chars = lexeme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic()) && chars.all(|c| c.is_ascii_digit())
}
