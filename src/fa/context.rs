// src/fa/context.rs
//! Positioned character stream consumed by the matching engines.
//!
//! The context exposes one character of lookahead, 1-based line/column and
//! a 0-based absolute position, plus an append-only capture buffer. Engines
//! never seek backward in the stream; matched text and capture substrings
//! are sliced out of the buffer by byte offset.

pub struct ParseContext<I: Iterator<Item = char>> {
    input: I,
    current: Option<char>,
    started: bool,
    line: u32,
    column: u32,
    position: usize,
    capture: String,
}

impl<I: Iterator<Item = char>> ParseContext<I> {
    pub fn new(input: I) -> Self {
        Self {
            input,
            current: None,
            started: false,
            line: 1,
            column: 1,
            position: 0,
            capture: String::new(),
        }
    }

    /// Pulls the first character on the first call; idempotent afterwards.
    pub fn ensure_started(&mut self) {
        if !self.started {
            self.started = true;
            self.current = self.input.next();
        }
    }

    /// The lookahead character, or `None` at end of input.
    #[inline]
    pub fn current(&self) -> Option<char> {
        self.current
    }

    /// Consumes the lookahead character and advances the position counters.
    pub fn advance(&mut self) {
        debug_assert!(self.started);
        if let Some(prev) = self.current {
            self.position += 1;
            if prev == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.current = self.input.next();
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Appends the lookahead character to the capture buffer.
    pub fn capture_current(&mut self) {
        if let Some(ch) = self.current {
            self.capture.push(ch);
        }
    }

    /// Byte length of the capture buffer; always a char boundary.
    pub fn capture_len(&self) -> usize {
        self.capture.len()
    }

    pub fn capture_buffer(&self) -> &str {
        &self.capture
    }

    /// The buffer suffix starting at `from` (a value previously returned by
    /// `capture_len`).
    pub fn get_capture(&self, from: usize) -> &str {
        &self.capture[from..]
    }
}

impl<'a> ParseContext<std::str::Chars<'a>> {
    pub fn from_text(text: &'a str) -> Self {
        Self::new(text.chars())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_line_column_position() {
        let mut ctx = ParseContext::from_text("ab\ncd");
        ctx.ensure_started();
        assert_eq!(ctx.current(), Some('a'));
        assert_eq!((ctx.line(), ctx.column(), ctx.position()), (1, 1, 0));
        ctx.advance();
        ctx.advance(); // now at '\n'
        assert_eq!((ctx.line(), ctx.column(), ctx.position()), (1, 3, 2));
        ctx.advance(); // past the newline
        assert_eq!(ctx.current(), Some('c'));
        assert_eq!((ctx.line(), ctx.column(), ctx.position()), (2, 1, 3));
    }

    #[test]
    fn capture_buffer_grows_by_byte_offset() {
        let mut ctx = ParseContext::from_text("héllo");
        ctx.ensure_started();
        ctx.capture_current();
        ctx.advance();
        let mark = ctx.capture_len();
        ctx.capture_current();
        ctx.advance();
        ctx.capture_current();
        ctx.advance();
        assert_eq!(ctx.capture_buffer(), "hél");
        assert_eq!(ctx.get_capture(mark), "él");
    }

    #[test]
    fn empty_input_starts_exhausted() {
        let mut ctx = ParseContext::from_text("");
        ctx.ensure_started();
        assert_eq!(ctx.current(), None);
        assert_eq!(ctx.position(), 0);
    }
}
