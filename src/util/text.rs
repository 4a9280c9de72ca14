use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate to `max_cells` terminal cells, ending in `…` when cut
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 1 {
        return "\u{2026}".to_string();
    }
    let budget = max_cells - 1;
    let mut width = 0;
    let mut out = String::new();
    for g in s.graphemes(true) {
        let gw = display_width(g);
        if width + gw > budget {
            break;
        }
        width += gw;
        out.push_str(g);
    }
    out.push('\u{2026}');
    out
}

/// Single-line text input with a grapheme-aware cursor, used by the rename
/// and search prompts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineEdit {
    text: String,
    /// Byte offset, always on a grapheme boundary
    cursor: usize,
}

impl LineEdit {
    pub fn new(text: &str) -> Self {
        LineEdit {
            text: text.to_string(),
            cursor: text.len(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor position in terminal cells
    pub fn cursor_col(&self) -> usize {
        display_width(&self.text[..self.cursor])
    }

    pub fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.text.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.text.replace_range(self.cursor..next, "");
        }
    }

    pub fn left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn right(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.cursor = next;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.len();
    }

    /// Delete the word before the cursor (Ctrl-W)
    pub fn delete_word_back(&mut self) {
        let prefix = &self.text[..self.cursor];
        let graphemes: Vec<(usize, &str)> = prefix.grapheme_indices(true).collect();
        let mut idx = graphemes.len();
        while idx > 0 && graphemes[idx - 1].1.trim().is_empty() {
            idx -= 1;
        }
        while idx > 0 && !graphemes[idx - 1].1.trim().is_empty() {
            idx -= 1;
        }
        let start = graphemes.get(idx).map_or(self.cursor, |(i, _)| *i);
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor]
            .grapheme_indices(true)
            .next_back()
            .map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        let g = self.text[self.cursor..].graphemes(true).next()?;
        Some(self.cursor + g.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_counts_cells() {
        assert_eq!(truncate_to_width("Camera", 10), "Camera");
        assert_eq!(truncate_to_width("Camera", 4), "Cam\u{2026}");
        assert_eq!(truncate_to_width("日本語", 4), "日\u{2026}");
        assert_eq!(truncate_to_width("Camera", 1), "\u{2026}");
        assert_eq!(truncate_to_width("Camera", 0), "");
    }

    #[test]
    fn editing_moves_by_grapheme() {
        let mut edit = LineEdit::new("cafe\u{301}");
        edit.backspace();
        assert_eq!(edit.text(), "caf");
        edit.home();
        edit.right();
        edit.insert('X');
        assert_eq!(edit.text(), "cXaf");
        assert_eq!(edit.cursor_col(), 2);
        edit.delete();
        assert_eq!(edit.text(), "cXf");
        edit.end();
        edit.left();
        edit.left();
        assert_eq!(edit.cursor(), 1);
    }

    #[test]
    fn boundaries_are_no_ops() {
        let mut edit = LineEdit::new("");
        edit.backspace();
        edit.delete();
        edit.left();
        edit.right();
        assert_eq!(edit, LineEdit::default());
    }

    #[test]
    fn delete_word_back_skips_trailing_space() {
        let mut edit = LineEdit::new("Main Camera  ");
        edit.delete_word_back();
        assert_eq!(edit.text(), "Main ");
        edit.delete_word_back();
        assert_eq!(edit.text(), "");
    }
}
