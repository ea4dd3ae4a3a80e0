//! Scanning position over the decoder's input.
//!
//! [`Cursor`] is the only way the decoder reads text. It owns no data: it
//! borrows the whole input and tracks a byte offset plus the 1-based line and
//! column used for error messages. Line and column never affect what is
//! accepted.

use crate::error::{Error, Result};
use log::trace;
use regex::Regex;

#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Cursor {
            text,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Everything not yet consumed.
    #[inline]
    #[must_use]
    pub fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    #[inline]
    #[must_use]
    pub fn eof(&self) -> bool {
        self.pos == self.text.len()
    }

    #[inline]
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    #[inline]
    #[must_use]
    pub const fn column(&self) -> usize {
        self.column
    }

    /// The rest of the current line, trimmed, for diagnostics.
    #[must_use]
    pub fn remaining_line(&self) -> &'a str {
        let rest = self.rest();
        rest.split('\n').next().unwrap_or(rest).trim()
    }

    /// Builds a decode error stamped with the current position.
    pub fn error(&self, msg: impl Into<String>) -> Error {
        Error::decode(self.line, self.column, msg)
    }

    /// The next `n` characters (fewer near the end), or `None` at end of input.
    #[must_use]
    pub fn peek(&self, n: usize) -> Option<&'a str> {
        if self.eof() {
            return None;
        }
        let rest = self.rest();
        let end = rest.char_indices().nth(n).map_or(rest.len(), |(i, _)| i);
        Some(&rest[..end])
    }

    #[inline]
    #[must_use]
    pub fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    #[inline]
    #[must_use]
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    /// Consumes `prefix` if the input continues with it.
    pub fn remove_prefix(&mut self, prefix: &str) -> bool {
        if self.has_prefix(prefix) {
            self.advance(prefix.len());
            true
        } else {
            false
        }
    }

    /// The text matched by an anchored `pattern` at the current position.
    #[must_use]
    pub fn peek_match(&self, pattern: &Regex) -> Option<&'a str> {
        let rest = self.rest();
        pattern
            .find(rest)
            .filter(|m| m.start() == 0)
            .map(|m| &rest[..m.end()])
    }

    /// Consumes and returns the text matched by an anchored `pattern`.
    ///
    /// Callers check the match first with [`Cursor::has_prefix`] or
    /// [`Cursor::peek_match`]; `None` means that check was skipped or wrong.
    pub fn take_match(&mut self, pattern: &Regex) -> Option<&'a str> {
        let matched = self.peek_match(pattern)?;
        self.advance(matched.len());
        Some(matched)
    }

    /// Consumes exactly `n` characters.
    pub fn take(&mut self, n: usize) -> Result<&'a str> {
        let rest = self.rest();
        let mut chars = rest.char_indices();
        let end = match chars.nth(n) {
            Some((i, _)) => i,
            None if rest.chars().count() == n => rest.len(),
            None => return Err(self.error("unexpected end of input")),
        };
        self.advance(end);
        Ok(&rest[..end])
    }

    /// Consumes one character.
    pub fn next_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.advance(c.len_utf8());
        Some(c)
    }

    /// Consumes characters while `pred` holds.
    pub fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        let rest = self.rest();
        let end = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.advance(end);
    }

    /// Consumes spaces and tabs.
    pub fn eat_inline_ws(&mut self) {
        self.eat_while(|c| c == ' ' || c == '\t');
    }

    /// Consumes whitespace, newlines and `#` comments.
    ///
    /// With `must_advance`, the cursor has to cross at least one newline
    /// unless it reaches the end of input; anything else left on the line is
    /// an error.
    pub fn eat_ws(&mut self, must_advance: bool) -> Result<()> {
        let start_line = self.line;
        loop {
            match self.peek_char() {
                Some('#') => {
                    let rest = self.rest();
                    let end = rest.find('\n').unwrap_or(rest.len());
                    self.advance(end);
                }
                Some(' ' | '\t' | '\r' | '\n') => {
                    self.eat_while(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));
                }
                _ => break,
            }
        }

        if must_advance && self.line == start_line && !self.eof() {
            return Err(self.error(format!(
                "unexpected content on line: {}",
                self.remaining_line()
            )));
        }
        Ok(())
    }

    /// Moves forward by `len` bytes, keeping line and column in step.
    fn advance(&mut self, len: usize) {
        let taken = &self.text[self.pos..self.pos + len];
        match taken.rfind('\n') {
            Some(last) => {
                let lines = taken.matches('\n').count();
                self.line += lines;
                self.column = taken[last + 1..].chars().count() + 1;
                trace!("cursor crossed {} line(s) to line {}", lines, self.line);
            }
            None => self.column += taken.chars().count(),
        }
        self.pos += len;
    }
}
