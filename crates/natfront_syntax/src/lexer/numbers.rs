//! Numeric literal scanning.

use super::{LexMode, Lexer, TokenKind};

impl Lexer<'_> {
    /// Scan a number starting at `start`, which may point at a leading `-` that was already consumed.
    ///
    /// Recognizes one decimal part (`1.5`, or `1,5` outside parentheses), an exponent (`1E+2`), and the
    /// output-control forms `5X` (operand skip) and `10T` (tab setting).
    pub(super) fn consume_number(&mut self, start: usize) {
        let mut has_decimals = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
                continue;
            }
            // Inside parentheses a comma separates indices and dimensions.
            let decimal_mark = c == '.' || (c == ',' && self.mode != LexMode::Parenthesized);
            if decimal_mark && !has_decimals && self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) {
                has_decimals = true;
                self.advance();
                continue;
            }
            break;
        }

        match self.peek() {
            Some('X' | 'x') => {
                self.advance();
                self.push_token(TokenKind::OperandSkip, start);
            }
            Some('T') => {
                self.advance();
                self.push_token(TokenKind::TabSetting, start);
            }
            Some('E' | 'e') if self.has_exponent() => {
                self.advance();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.advance();
                }
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
                self.push_token(TokenKind::Number, start);
            }
            _ => self.push_token(TokenKind::Number, start),
        }
    }

    fn has_exponent(&self) -> bool {
        match self.peek_at(1) {
            Some('+' | '-') => self.peek_at(2).is_some_and(|c| c.is_ascii_digit()),
            Some(c) => c.is_ascii_digit(),
            None => false,
        }
    }
}
