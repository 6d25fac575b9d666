//! Text editing capability exposed to plugins.

use core_text::{Buffer, Position, leading_whitespace};

/// Editor commands a plugin may execute against a text view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    /// Move the cursor to the end of the document.
    GoDocEnd,
    /// Split the line at the cursor; the new line inherits the current line's indentation.
    NewlineAndIndent,
}

/// Line-level read/write access plus cursor placement.
pub trait TextEditor {
    fn last_line(&self) -> usize;
    /// Content of line `idx` without its newline.
    fn line(&self, idx: usize) -> Option<String>;
    /// Replace the content of line `idx`. Returns false when out of range.
    fn set_line(&mut self, idx: usize, text: &str) -> bool;
    fn cursor(&self) -> Position;
    /// Place the cursor; out-of-range positions are clamped.
    fn set_cursor(&mut self, pos: Position);
    fn exec(&mut self, cmd: EditorCommand);
}

/// Buffer plus cursor of a text view.
#[derive(Clone)]
pub struct TextView {
    pub buffer: Buffer,
    cursor: Position,
}

impl TextView {
    pub fn new(buffer: Buffer) -> Self {
        Self {
            buffer,
            cursor: Position::origin(),
        }
    }
}

impl TextEditor for TextView {
    fn last_line(&self) -> usize {
        self.buffer.last_line()
    }

    fn line(&self, idx: usize) -> Option<String> {
        self.buffer.line_content(idx)
    }

    fn set_line(&mut self, idx: usize, text: &str) -> bool {
        let changed = self.buffer.set_line(idx, text);
        if changed {
            // keep the cursor valid if the line shrank
            self.set_cursor(self.cursor);
        }
        changed
    }

    fn cursor(&self) -> Position {
        self.cursor
    }

    fn set_cursor(&mut self, pos: Position) {
        let mut pos = pos;
        let buffer = &self.buffer;
        pos.clamp_to(buffer.line_count(), |l| buffer.line_byte_len(l));
        self.cursor = pos;
    }

    fn exec(&mut self, cmd: EditorCommand) {
        match cmd {
            EditorCommand::GoDocEnd => self.cursor = self.buffer.end_position(),
            EditorCommand::NewlineAndIndent => {
                let current = self.buffer.line_content(self.cursor.line).unwrap_or_default();
                let indent = leading_whitespace(&current).to_string();
                let mut pos = self.cursor;
                self.buffer.insert_newline(&mut pos);
                self.buffer.insert_text(pos, &indent);
                pos.byte = indent.len();
                self.cursor = pos;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(lines: &[&str]) -> TextView {
        TextView::new(Buffer::from_lines("t", lines).unwrap())
    }

    #[test]
    fn go_doc_end_then_newline() {
        let mut v = view(&["hello", "world"]);
        v.exec(EditorCommand::GoDocEnd);
        assert_eq!(v.cursor(), Position::new(1, 5));
        v.exec(EditorCommand::NewlineAndIndent);
        assert_eq!(v.buffer.text(), "hello\nworld\n");
        assert_eq!(v.cursor(), Position::new(2, 0));
    }

    #[test]
    fn newline_and_indent_copies_leading_whitespace() {
        let mut v = view(&["  - item"]);
        v.exec(EditorCommand::GoDocEnd);
        v.exec(EditorCommand::NewlineAndIndent);
        assert_eq!(v.line(1).as_deref(), Some("  "));
        assert_eq!(v.cursor(), Position::new(1, 2));
    }

    #[test]
    fn set_cursor_clamps() {
        let mut v = view(&["ab"]);
        v.set_cursor(Position::new(4, 9));
        assert_eq!(v.cursor(), Position::new(0, 2));
    }

    #[test]
    fn set_line_reclamps_cursor() {
        let mut v = view(&["abcdef"]);
        v.set_cursor(Position::new(0, 6));
        assert!(v.set_line(0, "ab"));
        assert_eq!(v.cursor(), Position::new(0, 2));
        assert!(!v.set_line(3, "x"));
    }
}
