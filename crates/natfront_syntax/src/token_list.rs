//! Cursor over a lexed token sequence.
//!
//! [`TokenList`] is what the lexer produces and what every parser layer reads from. Tokens never change after
//! lexing; only the cursor moves.
//!
//! ## Notes
//! - Every operation is total. Peeking past either end yields `None`, moving the cursor saturates at the bounds.
//! - The list has no diagnostics of its own; it carries the lexer's so a module can report them alongside its own.

use std::path::Path;
use std::sync::Arc;

use crate::diagnostics::Diagnostic;
use crate::lexer::{Comment, SourceHeader, Token, TokenKind};

/// Lexed tokens plus a cursor.
#[derive(Debug, Clone)]
pub struct TokenList {
    path: Arc<Path>,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
    comments: Vec<Comment>,
    header: SourceHeader,
    cursor: usize,
}

impl TokenList {
    pub fn new(
        path: Arc<Path>,
        tokens: Vec<Token>,
        diagnostics: Vec<Diagnostic>,
        comments: Vec<Comment>,
        header: SourceHeader,
    ) -> Self {
        Self {
            path,
            tokens,
            diagnostics,
            comments,
            header,
            cursor: 0,
        }
    }

    /// A list over `tokens` without lexer metadata, positioned at the first token.
    pub fn from_tokens(path: Arc<Path>, tokens: Vec<Token>) -> Self {
        Self::new(path, tokens, Vec::new(), Vec::new(), SourceHeader::default())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The token under the cursor.
    pub fn current(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    /// The token `offset` positions after the cursor.
    pub fn peek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.cursor.checked_add(offset)?)
    }

    pub fn peek_kind(&self, offset: usize) -> Option<TokenKind> {
        self.peek(offset).map(|t| t.kind)
    }

    /// Return `true` if the tokens starting at the cursor have exactly `kinds`.
    pub fn peek_kinds(&self, kinds: &[TokenKind]) -> bool {
        kinds
            .iter()
            .enumerate()
            .all(|(offset, kind)| self.peek_kind(offset) == Some(*kind))
    }

    /// Move past the current token and return it.
    pub fn advance(&mut self) -> Option<&Token> {
        let index = self.cursor;
        if index < self.tokens.len() {
            self.cursor += 1;
        }
        self.tokens.get(index)
    }

    pub fn advance_by(&mut self, count: usize) {
        self.cursor = self.cursor.saturating_add(count).min(self.tokens.len());
    }

    /// Move the cursor `count` tokens back.
    pub fn rollback(&mut self, count: usize) {
        self.cursor = self.cursor.saturating_sub(count);
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    /// Return `true` if no token exists `offset` positions after the cursor.
    pub fn is_at_end_at(&self, offset: usize) -> bool {
        self.cursor.saturating_add(offset) >= self.tokens.len()
    }

    /// Advance until the current token has `kind`; returns `false` if the end was reached instead.
    pub fn advance_until(&mut self, kind: TokenKind) -> bool {
        while self.current().is_some_and(|t| t.kind != kind) {
            self.cursor += 1;
        }
        !self.is_at_end()
    }

    /// Advance past the next token of `kind`; returns `false` if there is nothing after it.
    pub fn advance_after_next(&mut self, kind: TokenKind) -> bool {
        if self.advance_until(kind) {
            self.advance();
            return !self.is_at_end();
        }
        false
    }

    /// Advance over the current token if it has `kind`.
    pub fn consume(&mut self, kind: TokenKind) -> bool {
        if self.peek_kind(0) == Some(kind) {
            self.cursor += 1;
            return true;
        }
        false
    }

    /// Index of the cursor.
    pub fn offset(&self) -> usize {
        self.cursor
    }

    /// Move the cursor to an index previously returned by [`TokenList::offset`].
    pub fn reset_to(&mut self, offset: usize) {
        self.cursor = offset.min(self.tokens.len());
    }

    /// Tokens from `start` to `end`, both inclusive and clamped to the list.
    pub fn subrange(&self, start: usize, end: usize) -> &[Token] {
        let end = end.saturating_add(1).min(self.tokens.len());
        let start = start.min(end);
        &self.tokens[start..end]
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn all_tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Diagnostics produced while lexing.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn source_header(&self) -> &SourceHeader {
        &self.header
    }
}

impl<'a> IntoIterator for &'a TokenList {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use natfront_core::lang::keywords::KeywordId;
    use natfront_core::lang::punctuation::PunctuationId;

    fn tokens(source: &str) -> TokenList {
        lex(source, Path::new("TEST.NSN"))
    }

    #[test]
    fn peek_past_the_end_is_none() {
        let list = tokens("IGNORE");
        assert!(list.peek(0).is_some());
        assert!(list.peek(1).is_none());
        assert!(list.peek(usize::MAX).is_none());
    }

    #[test]
    fn advance_and_rollback_saturate() {
        let mut list = tokens("A B");
        list.rollback(5);
        assert_eq!(list.offset(), 0);
        assert!(list.advance().is_some());
        assert!(list.advance().is_some());
        assert!(list.advance().is_none());
        assert!(list.is_at_end());
        list.advance_by(10);
        assert_eq!(list.offset(), 2);
        list.rollback(1);
        assert_eq!(list.current().map(|t| t.text.as_str()), Some("B"));
    }

    #[test]
    fn advance_until_stops_on_kind() {
        let mut list = tokens("A B END-DEFINE C");
        assert!(list.advance_until(TokenKind::Keyword(KeywordId::EndDefine)));
        assert_eq!(list.offset(), 2);
        assert!(list.advance_after_next(TokenKind::Keyword(KeywordId::EndDefine)));
        assert_eq!(list.current().map(|t| t.text.as_str()), Some("C"));
        assert!(!list.advance_until(TokenKind::Keyword(KeywordId::EndDefine)));
        assert!(list.is_at_end());
    }

    #[test]
    fn consume_only_moves_on_match() {
        let mut list = tokens("( A");
        assert!(!list.consume(TokenKind::Identifier));
        assert!(list.consume(TokenKind::Punctuation(PunctuationId::LParen)));
        assert!(list.peek_kinds(&[TokenKind::Identifier]));
        assert!(!list.peek_kinds(&[TokenKind::Identifier, TokenKind::Identifier]));
    }

    #[test]
    fn subrange_is_inclusive_and_clamped() {
        let list = tokens("A B C");
        assert_eq!(list.subrange(0, 1).len(), 2);
        assert_eq!(list.subrange(1, 99).len(), 2);
        assert!(list.subrange(5, 9).is_empty());
    }
}
