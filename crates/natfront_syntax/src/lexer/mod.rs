//! Lexer for Natural source files.
//!
//! Handles tokenization including:
//! - Keywords, identifiers, labels and `*`-prefixed system names
//! - Numeric, string and hex literals (including `'a' - 'b'` concatenation)
//! - Comments (`*` at line start, inline `/*`)
//! - The source header block with programming mode and line increment
//! - Attribute bodies inside parentheses (`EM=`, `AD=`, `CD=`)
//!
//! ## Module Structure
//!
//! - `tokens` - Token types (TokenKind, Token)
//! - `header` - Source header block handling
//! - `strings` - String and hex literal scanning
//! - `numbers` - Numeric literal scanning
//! - `identifiers` - Identifier, keyword and attribute scanning
//!
//! ## Notes
//! - Lexing never fails: unknown characters and unterminated strings become diagnostics and scanning continues.
//! - Line and column numbers are 0-based; columns and lengths are byte counts.

mod header;
mod identifiers;
mod numbers;
mod strings;
pub mod tokens;

pub use header::{ProgrammingMode, SourceHeader};
pub use tokens::{Token, TokenKind, keyword_id};

use std::path::Path;
use std::sync::Arc;

use natfront_core::lang::operators::OperatorId;
use natfront_core::lang::punctuation::PunctuationId;
use natfront_core::lang::system;

use crate::diagnostics::{Diagnostic, Position, errors};
use crate::token_list::TokenList;

// ============================================================================
// LEXER STATE
// ----------------------------------------------------------------------------
// Lexer mode diagram:
//
// [Default] → see '(' → [Parenthesized] → see ')' → [Default]
//     ↓
//   comment line "* >Natural Source Header" → [Header]
//     ↓
//   comment line "* <Natural Source Header" → [Default]
// ============================================================================

/// How the lexer interprets the characters it is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexMode {
    Default,
    /// Inside `( ... )`: attribute bodies are recognized and `/` separates a type from its dimensions.
    Parenthesized,
    /// Inside the source header block: lines are metadata, not comments.
    Header,
}

/// A comment collected while lexing.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub text: String,
    pub position: Position,
}

/// Lex `source` into a [`TokenList`].
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn lex(source: &str, path: &Path) -> TokenList {
    Lexer::new(source, path).tokenize()
}

/// Lexer for Natural source code.
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    path: Arc<Path>,
    line_starts: Vec<usize>,
    mode: LexMode,
    header_done: bool,
    header: SourceHeader,
    relocation: Option<Position>,
    tokens: Vec<Token>,
    comments: Vec<Comment>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str, path: &Path) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(index, _)| index + 1))
            .collect();
        Self {
            source,
            pos: 0,
            path: Arc::from(path),
            line_starts,
            mode: LexMode::Default,
            header_done: false,
            header: SourceHeader::default(),
            relocation: None,
            tokens: Vec::new(),
            comments: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Attribute every token and diagnostic to `position`.
    ///
    /// Used when lexing an included copycode: diagnostics then point at the `INCLUDE` statement.
    pub fn relocated_to(mut self, position: Position) -> Self {
        self.relocation = Some(position);
        self
    }

    /// Tokenize the entire source code.
    pub fn tokenize(mut self) -> TokenList {
        while let Some(c) = self.peek() {
            if !self.header_done && self.consume_header_line() {
                continue;
            }

            if self.consume_comment() {
                continue;
            }

            self.scan_token(c);
        }

        tracing::trace!(tokens = self.tokens.len(), comments = self.comments.len(), "lexed");
        TokenList::new(self.path, self.tokens, self.diagnostics, self.comments, self.header)
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(offset)
    }

    fn previous_char(&self) -> Option<char> {
        self.source[..self.pos].chars().next_back()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            if self.advance().is_none() {
                break;
            }
        }
    }

    fn is_line_start(&self) -> bool {
        self.pos == 0 || self.source.as_bytes()[self.pos - 1] == b'\n'
    }

    fn is_line_end(&self) -> bool {
        match self.peek() {
            Some('\n') => true,
            Some('\r') => self.peek_at(1) == Some('\n'),
            _ => false,
        }
    }

    fn is_whitespace_at(&self, offset: usize) -> bool {
        matches!(self.peek_at(offset), Some(' ' | '\t' | '\r' | '\n'))
    }

    fn skip_to_line_end(&mut self) {
        while self.peek().is_some() && !self.is_line_end() {
            self.advance();
        }
    }

    /// Byte offset of the first non-whitespace character after the current one, or `None` at the end.
    fn next_non_whitespace(&self) -> Option<(usize, char)> {
        self.source[self.pos..]
            .char_indices()
            .skip(1)
            .find(|(_, c)| !c.is_whitespace())
            .map(|(index, c)| (self.pos + index, c))
    }

    // ========================================================================
    // Token construction
    // ========================================================================

    fn position(&self, start: usize, end: usize) -> Position {
        let line = self.line_starts.partition_point(|&line_start| line_start <= start) - 1;
        Position {
            path: Arc::clone(&self.path),
            offset: start,
            line: line as u32,
            column: (start - self.line_starts[line]) as u32,
            length: end - start,
        }
    }

    fn push_token(&mut self, kind: TokenKind, start: usize) {
        let position = self.position(start, self.pos);
        let token = Token {
            kind,
            text: self.source[start..self.pos].to_string(),
            offset: position.offset,
            line: position.line,
            column: position.column,
            length: position.length,
            path: position.path,
            relocated: self.relocation.clone().map(Box::new),
        };
        self.header_done = true;
        self.tokens.push(token);
    }

    fn push_single(&mut self, kind: TokenKind) {
        let start = self.pos;
        self.advance();
        self.push_token(kind, start);
    }

    /// Push `with_followup` if the next character is `followup`, otherwise the single-character `kind`.
    fn push_with_followup(&mut self, kind: TokenKind, followup: char, with_followup: TokenKind) {
        let start = self.pos;
        self.advance();
        if self.peek() == Some(followup) {
            self.advance();
            self.push_token(with_followup, start);
        } else {
            self.push_token(kind, start);
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        let diagnostic = match &self.relocation {
            Some(position) => diagnostic.relocate(position),
            None => diagnostic,
        };
        self.diagnostics.push(diagnostic);
    }

    // ========================================================================
    // Main scanning dispatch
    // ========================================================================

    fn scan_token(&mut self, c: char) {
        use OperatorId as Op;
        use PunctuationId as P;

        match c {
            ' ' | '\t' | '\r' | '\n' => {
                self.advance();
            }
            '(' => {
                self.mode = LexMode::Parenthesized;
                self.push_single(TokenKind::Punctuation(P::LParen));
            }
            ')' => {
                self.mode = LexMode::Default;
                self.push_single(TokenKind::Punctuation(P::RParen));
            }
            '[' => self.push_single(TokenKind::Punctuation(P::LBracket)),
            ']' => self.push_single(TokenKind::Punctuation(P::RBracket)),
            ',' => self.push_single(TokenKind::Punctuation(P::Comma)),
            '.' => self.push_single(TokenKind::Punctuation(P::Dot)),
            ';' => self.push_single(TokenKind::Punctuation(P::Semicolon)),
            '\\' => self.push_single(TokenKind::Punctuation(P::Backslash)),
            '%' => self.push_single(TokenKind::Punctuation(P::Percent)),
            '?' => self.push_single(TokenKind::Punctuation(P::Question)),
            '=' => self.push_single(TokenKind::Operator(Op::Equals)),
            '/' => self.push_single(TokenKind::Operator(Op::Slash)),
            ':' => self.push_with_followup(
                TokenKind::Punctuation(P::Colon),
                '=',
                TokenKind::Operator(Op::ColonEquals),
            ),
            '>' => self.push_with_followup(TokenKind::Operator(Op::Greater), '=', TokenKind::Operator(Op::GreaterEq)),
            '^' => self.push_with_followup(TokenKind::Punctuation(P::Caret), '=', TokenKind::Operator(Op::NotEqual)),
            '<' => match self.peek_at(1) {
                Some('=') => self.push_double(TokenKind::Operator(Op::LessEq)),
                Some('>') => self.push_double(TokenKind::Operator(Op::NotEqual)),
                _ => self.push_single(TokenKind::Operator(Op::Less)),
            },
            '+' => {
                if self.peek_at(1).is_some_and(|next| is_identifier_char(next) && !next.is_ascii_digit()) {
                    self.consume_identifier();
                } else {
                    self.push_single(TokenKind::Operator(Op::Plus));
                }
            }
            '-' => self.consume_minus_or_concatenation(),
            '*' => self.consume_asterisk_or_system_name(),
            '\'' | '"' => self.consume_string(c),
            'h' | 'H' if self.peek_at(1) == Some('\'') => self.consume_hex_string(),
            '#' | '&' => self.consume_identifier(),
            c if c.is_ascii_digit() => {
                let start = self.pos;
                self.consume_number(start);
            }
            c if c.is_alphabetic() => self.consume_identifier_or_keyword(),
            _ => {
                let start = self.pos;
                self.advance();
                let position = self.position(start, self.pos);
                let position = Position { length: 1, ..position };
                self.report(errors::unknown_character(c, position));
            }
        }
    }

    fn push_double(&mut self, kind: TokenKind) {
        let start = self.pos;
        self.advance_by(2);
        self.push_token(kind, start);
    }

    fn consume_comment(&mut self) -> bool {
        let inline = self.peek() == Some('/') && self.peek_at(1) == Some('*');
        if inline && self.is_array_shorthand() {
            return false;
        }

        if !inline && !self.is_line_comment() {
            return false;
        }

        let start = self.pos;
        self.skip_to_line_end();
        let position = self.position(start, self.pos);
        self.comments.push(Comment {
            text: self.source[start..self.pos].to_string(),
            position,
        });
        true
    }

    /// `*` at line start followed by a blank, `*`, `/` or the end of the line.
    fn is_line_comment(&self) -> bool {
        self.is_line_start()
            && self.peek() == Some('*')
            && matches!(self.peek_at(1), None | Some(' ' | '*' | '\t' | '\n' | '\r' | '/'))
    }

    /// `(A5/*)` is shorthand for `(A5/1:*)`, not a comment.
    fn is_array_shorthand(&self) -> bool {
        let [.., before, last] = self.tokens.as_slice() else {
            return false;
        };
        last.kind == TokenKind::Identifier && before.kind == TokenKind::Punctuation(PunctuationId::LParen)
    }

    /// A `-` is either subtraction, the sign of a number, or joins two string literals.
    fn consume_minus_or_concatenation(&mut self) {
        let previous_is_string = self.tokens.last().is_some_and(|t| t.kind == TokenKind::String);
        if let Some((quote_pos, quote @ ('\'' | '"'))) = self.next_non_whitespace() {
            if previous_is_string {
                self.concatenate_strings(quote_pos, quote);
                return;
            }
        }

        let signed_number = self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) && !self.previous_ends_operand();
        if signed_number {
            let start = self.pos;
            self.advance();
            self.consume_number(start);
            return;
        }

        self.push_single(TokenKind::Operator(OperatorId::Minus));
    }

    fn concatenate_strings(&mut self, quote_pos: usize, quote: char) {
        let Some(first) = self.tokens.pop() else {
            return;
        };
        self.pos = quote_pos;
        self.consume_string(quote);
        self.tokens.pop();
        self.push_token(TokenKind::String, first.offset);
    }

    fn previous_ends_operand(&self) -> bool {
        use natfront_core::lang::keywords::KeywordId;

        self.tokens.last().is_some_and(|token| {
            matches!(
                token.kind,
                TokenKind::Identifier
                    | TokenKind::Number
                    | TokenKind::String
                    | TokenKind::System(_)
                    | TokenKind::Punctuation(PunctuationId::RParen | PunctuationId::RBracket)
                    | TokenKind::Keyword(KeywordId::True | KeywordId::False)
            )
        })
    }

    fn consume_asterisk_or_system_name(&mut self) {
        if self.peek_at(1).is_some_and(system::could_start) {
            if let Some((id, len)) = system::longest_match(&self.source[self.pos + 1..]) {
                let start = self.pos;
                self.pos += 1 + len;
                self.push_token(TokenKind::System(id), start);
                return;
            }
        }

        if self.peek_at(1) == Some('*') {
            self.push_double(TokenKind::Operator(OperatorId::Exponent));
        } else {
            self.push_single(TokenKind::Operator(OperatorId::Asterisk));
        }
    }
}

/// Characters that can appear in identifiers.
fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '/' | '@' | '$' | '&' | '#' | '.' | '_')
}
