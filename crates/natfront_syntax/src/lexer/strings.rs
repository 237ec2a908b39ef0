//! String and hex literal scanning.
//!
//! Literals end at the closing quote or at the end of the line; Natural strings never span lines. Doubled quotes
//! (`'it''s'`) are kept in the token text and decoded by [`Token::string_value`](super::Token::string_value).

use super::{Lexer, TokenKind};
use crate::diagnostics::errors;

impl Lexer<'_> {
    pub(super) fn consume_string(&mut self, quote: char) {
        let start = self.pos;
        self.advance();
        while self.peek().is_some() && !self.is_line_end() {
            if self.peek() == Some(quote) {
                if self.peek_at(1) == Some(quote) {
                    self.advance_by(2);
                    continue;
                }
                break;
            }
            self.advance();
        }

        self.finish_string(start, quote);
    }

    pub(super) fn consume_hex_string(&mut self) {
        let start = self.pos;
        self.advance_by(2);
        while self.peek().is_some_and(|c| c != '\'') && !self.is_line_end() {
            self.advance();
        }

        self.finish_string(start, '\'');
    }

    fn finish_string(&mut self, start: usize, quote: char) {
        if self.peek() == Some(quote) {
            self.advance();
            self.push_token(TokenKind::String, start);
            return;
        }

        // Still produce a usable token for the unterminated literal.
        self.skip_to_line_end();
        let position = self.position(start, self.pos);
        self.report(errors::unterminated_string(quote, position));
        self.push_token(TokenKind::String, start);
    }
}
