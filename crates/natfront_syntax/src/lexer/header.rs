//! Source header block handling.
//!
//! Files exported from the development environment start with a block like
//!
//! ```text
//! * >Natural Source Header 000000
//! * :Mode S
//! * :CP
//! * :LineIncrement 10
//! * <Natural Source Header
//! ```
//!
//! The block carries metadata and is neither tokenized nor collected as comments.

use super::{LexMode, Lexer};

const HEADER_START: &str = "* >Natural Source Header";
const HEADER_END: &str = "* <Natural Source Header";

/// Programming mode declared in the source header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgrammingMode {
    Structured,
    Reporting,
    #[default]
    Unknown,
}

impl ProgrammingMode {
    fn from_flag(flag: char) -> Self {
        match flag.to_ascii_uppercase() {
            'S' => ProgrammingMode::Structured,
            'R' => ProgrammingMode::Reporting,
            _ => ProgrammingMode::Unknown,
        }
    }
}

/// Metadata read from the source header block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceHeader {
    pub mode: ProgrammingMode,
    pub line_increment: u32,
}

impl Default for SourceHeader {
    fn default() -> Self {
        Self {
            mode: ProgrammingMode::Unknown,
            line_increment: 10,
        }
    }
}

impl Lexer<'_> {
    /// Consume one line of the source header block, returning `true` if the line belonged to it.
    pub(super) fn consume_header_line(&mut self) -> bool {
        if !self.is_line_start() || !(self.is_line_comment() || self.peek() == Some('/') && self.peek_at(1) == Some('*')) {
            if self.mode == LexMode::Header && !self.peek().is_some_and(char::is_whitespace) {
                // Real code inside an unterminated header ends it.
                self.mode = LexMode::Default;
                self.header_done = true;
            }
            return false;
        }

        let rest = &self.source[self.pos..];
        let line = rest.split('\n').next().unwrap_or(rest).trim_end();

        if self.mode != LexMode::Header {
            if !line.contains(HEADER_START) {
                return false;
            }
            self.mode = LexMode::Header;
            self.skip_to_line_end();
            return true;
        }

        if line.contains(HEADER_END) {
            self.mode = LexMode::Default;
            self.header_done = true;
        } else if line.contains("* :Mode") {
            if let Some(flag) = line.chars().next_back() {
                self.header.mode = ProgrammingMode::from_flag(flag);
            }
        } else if line.contains("* :LineIncrement") {
            let digits: String = line.chars().filter(char::is_ascii_digit).collect();
            if let Ok(increment) = digits.parse() {
                self.header.line_increment = increment;
            }
        }

        self.skip_to_line_end();
        true
    }
}
