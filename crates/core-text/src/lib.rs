//! Rope-based text buffer abstraction.
//!
//! Only the line-oriented operations an editor host exposes to plugins are
//! provided: reading a line, replacing a line's content, inserting line
//! breaks at a position. Lines are addressed by index; the content of a line
//! never includes its terminating `\n`.

use anyhow::Result;
use ropey::Rope;

/// A text buffer backed by a `ropey::Rope`.
#[derive(Clone)]
pub struct Buffer {
    rope: Rope,
    pub name: String,
}

/// A position inside a buffer expressed as (line index, byte offset within that line).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub byte: usize,
}

impl Position {
    pub fn new(line: usize, byte: usize) -> Self {
        Self { line, byte }
    }
    pub fn origin() -> Self {
        Self { line: 0, byte: 0 }
    }
    pub fn clamp_to<F>(&mut self, line_count: usize, mut line_len_fn: F)
    where
        F: FnMut(usize) -> usize,
    {
        if line_count == 0 {
            self.line = 0;
            self.byte = 0;
            return;
        }
        if self.line >= line_count {
            self.line = line_count - 1;
        }
        let max_len = line_len_fn(self.line);
        if self.byte > max_len {
            self.byte = max_len;
        }
    }
}

/// A line is blank when nothing but whitespace remains after trimming.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Leading whitespace of a line (the indentation a new line inherits).
pub fn leading_whitespace(line: &str) -> &str {
    let end = line.len() - line.trim_start().len();
    &line[..end]
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice.
    pub fn from_str(name: impl Into<String>, content: &str) -> Result<Self> {
        Ok(Self {
            rope: Rope::from_str(content),
            name: name.into(),
        })
    }

    /// Construct a buffer whose lines are `lines` joined with `\n`.
    pub fn from_lines(name: impl Into<String>, lines: &[&str]) -> Result<Self> {
        Self::from_str(name, &lines.join("\n"))
    }

    /// Total number of lines in the buffer. An empty buffer still has one (empty) line, and a
    /// trailing `\n` opens a new empty last line.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Index of the last line.
    pub fn last_line(&self) -> usize {
        self.line_count().saturating_sub(1)
    }

    /// Return the requested line without its terminating newline.
    pub fn line_content(&self, idx: usize) -> Option<String> {
        if idx >= self.rope.len_lines() {
            return None;
        }
        Some(self.line_content_string(idx))
    }

    /// Byte length of a line (excluding any newline) for clamping purposes.
    pub fn line_byte_len(&self, idx: usize) -> usize {
        if idx >= self.rope.len_lines() {
            return 0;
        }
        self.line_content_string(idx).len()
    }

    /// Position just past the last character of the buffer.
    pub fn end_position(&self) -> Position {
        let last = self.last_line();
        Position::new(last, self.line_byte_len(last))
    }

    fn line_content_string(&self, idx: usize) -> String {
        let mut s = self.rope.line(idx).to_string();
        if s.ends_with('\n') {
            s.pop();
        }
        s
    }

    fn byte_to_char_index(&self, line: usize, byte_in_line: usize) -> usize {
        let line_start_char = self.rope.line_to_char(line);
        let content = self.line_content_string(line);
        let byte = byte_in_line.min(content.len());
        line_start_char + content[..byte].chars().count()
    }

    /// Insert `text` at the given position; the position is not moved.
    pub fn insert_text(&mut self, pos: Position, text: &str) {
        if pos.line >= self.rope.len_lines() {
            return;
        }
        let char_index = self.byte_to_char_index(pos.line, pos.byte);
        self.rope.insert(char_index, text);
    }

    /// Insert a newline at the given position, splitting the current line. Cursor moves to start of new line.
    pub fn insert_newline(&mut self, pos: &mut Position) {
        let char_index = self.byte_to_char_index(pos.line, pos.byte);
        self.rope.insert(char_index, "\n");
        pos.line += 1;
        pos.byte = 0;
    }

    /// Replace the content of line `idx` (its terminating newline is kept). `text` may itself
    /// contain newlines, in which case the line is split. Returns false when `idx` is out of range.
    pub fn set_line(&mut self, idx: usize, text: &str) -> bool {
        if idx >= self.rope.len_lines() {
            return false;
        }
        let start = self.rope.line_to_char(idx);
        let len = self.line_content_string(idx).chars().count();
        self.rope.remove(start..start + len);
        self.rope.insert(start, text);
        true
    }

    /// Full buffer contents.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_buffer_and_read_line() {
        let b = Buffer::from_str("test", "hello\nworld").unwrap();
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line_content(0).unwrap(), "hello");
        assert_eq!(b.line_content(1).unwrap(), "world");
        assert!(b.line_content(2).is_none());
    }

    #[test]
    fn trailing_newline_opens_empty_last_line() {
        let b = Buffer::from_lines("t", &["hello", ""]).unwrap();
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.last_line(), 1);
        assert_eq!(b.line_content(1).unwrap(), "");
    }

    #[test]
    fn empty_buffer_has_single_line() {
        let b = Buffer::from_str("t", "").unwrap();
        assert_eq!(b.line_count(), 1);
        assert_eq!(b.last_line(), 0);
        assert_eq!(b.end_position(), Position::origin());
    }

    #[test]
    fn blank_detection_trims_whitespace() {
        assert!(is_blank(""));
        assert!(is_blank("  \t "));
        assert!(!is_blank("  x "));
    }

    #[test]
    fn leading_whitespace_prefix() {
        assert_eq!(leading_whitespace("  - item"), "  ");
        assert_eq!(leading_whitespace("\tx"), "\t");
        assert_eq!(leading_whitespace("x"), "");
        assert_eq!(leading_whitespace("   "), "   ");
    }

    #[test]
    fn insert_newline_split() {
        let mut b = Buffer::from_str("t", "abcd").unwrap();
        let mut pos = Position::new(0, 2);
        b.insert_newline(&mut pos);
        assert_eq!(b.line_count(), 2);
        assert_eq!(b.line_content(0).unwrap(), "ab");
        assert_eq!(b.line_content(1).unwrap(), "cd");
        assert_eq!(b.text(), "ab\ncd");
        assert_eq!(pos, Position::new(1, 0));
    }

    #[test]
    fn insert_text_multibyte_position() {
        let mut b = Buffer::from_str("t", "héllo").unwrap();
        // byte 3 is just after 'é' (2 bytes)
        b.insert_text(Position::new(0, 3), "X");
        assert_eq!(b.text(), "héXllo");
    }

    #[test]
    fn set_line_with_newlines_appends_lines() {
        let mut b = Buffer::from_str("t", "hello").unwrap();
        assert!(b.set_line(0, "hello\n\n"));
        assert_eq!(b.line_count(), 3);
        assert_eq!(b.text(), "hello\n\n");
    }

    #[test]
    fn set_line_keeps_terminating_newline() {
        let mut b = Buffer::from_str("t", "a\nb\nc").unwrap();
        assert!(b.set_line(1, "middle"));
        assert_eq!(b.text(), "a\nmiddle\nc");
        assert!(!b.set_line(9, "nope"));
    }

    #[test]
    fn clamp_position_to_buffer() {
        let b = Buffer::from_str("t", "ab\ncdef").unwrap();
        let mut p = Position::new(5, 10);
        p.clamp_to(b.line_count(), |l| b.line_byte_len(l));
        assert_eq!(p, Position::new(1, 4));
    }
}
