//! Writes the decided number of blank lines after the last line.

use core_config::AppendStrategy;
use core_model::{EditorCommand, TextEditor};
use core_text::Position;

/// Append `lines` blank lines after the current last line and move the cursor
/// onto the final one. Returns the resulting cursor position.
pub fn append_lines(editor: &mut dyn TextEditor, lines: u8, strategy: AppendStrategy) -> Position {
    if lines == 0 {
        return editor.cursor();
    }
    match strategy {
        AppendStrategy::Direct => {
            let last = editor.last_line();
            let mut content = editor.line(last).unwrap_or_default();
            content.push_str(&"\n".repeat(lines as usize));
            editor.set_line(last, &content);
            editor.set_cursor(Position::new(last + lines as usize, 0));
        }
        AppendStrategy::Commands => {
            editor.exec(EditorCommand::GoDocEnd);
            for _ in 0..lines {
                editor.exec(EditorCommand::NewlineAndIndent);
            }
        }
    }
    editor.cursor()
}
