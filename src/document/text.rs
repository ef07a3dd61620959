//! Byte offset <-> LSP position conversion.

use tower_lsp::lsp_types::{Position, Range};

use crate::mapping::Span;

/// Pre-computed line starts for one document version.
///
/// LSP positions are line/character with the character measured in UTF-16
/// code units; the core works in byte offsets. Line lookup is a binary
/// search, column conversion scans only the containing line.
#[derive(Debug, Clone)]
pub struct LineIndex {
    text: String,
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: String) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self { text, line_starts }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn line_bounds(&self, line: usize) -> (usize, usize) {
        let start = self.line_starts[line];
        let end = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or(self.text.len());
        (start, end)
    }

    /// Convert a byte offset to an LSP position. Offsets past the end of
    /// the text clamp to the final position.
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(insert) => insert - 1,
        };
        let (line_start, line_end) = self.line_bounds(line);

        let mut character = 0u32;
        for (i, c) in self.text[line_start..line_end].char_indices() {
            if line_start + i >= offset {
                break;
            }
            character += c.len_utf16() as u32;
        }

        Position::new(line as u32, character)
    }

    /// Convert an LSP position to a byte offset. `None` when the line does
    /// not exist; a character past the end of its line clamps to the line
    /// end.
    pub fn offset_at(&self, position: Position) -> Option<usize> {
        let line = position.line as usize;
        if line >= self.line_starts.len() {
            return None;
        }
        let (line_start, mut line_end) = self.line_bounds(line);
        // Keep the cursor on this line, before the newline.
        if line_end > line_start && self.text.as_bytes()[line_end - 1] == b'\n' {
            line_end -= 1;
        }

        let mut character = 0u32;
        for (i, c) in self.text[line_start..line_end].char_indices() {
            if character >= position.character {
                return Some(line_start + i);
            }
            character += c.len_utf16() as u32;
        }
        Some(line_end)
    }

    pub fn range_of(&self, span: Span) -> Range {
        Range::new(self.position_at(span.start), self.position_at(span.end))
    }

    pub fn span_of(&self, range: Range) -> Option<Span> {
        let start = self.offset_at(range.start)?;
        let end = self.offset_at(range.end)?;
        Some(Span::new(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_across_lines() {
        let idx = LineIndex::new("ab\ncd\ne".to_string());
        assert_eq!(idx.position_at(0), Position::new(0, 0));
        assert_eq!(idx.position_at(2), Position::new(0, 2));
        assert_eq!(idx.position_at(3), Position::new(1, 0));
        assert_eq!(idx.position_at(6), Position::new(2, 0));
    }

    #[test]
    fn offsets_round_trip() {
        let idx = LineIndex::new("ab\ncd".to_string());
        for offset in 0..5 {
            let pos = idx.position_at(offset);
            assert_eq!(idx.offset_at(pos), Some(offset));
        }
    }

    #[test]
    fn utf16_columns() {
        // '😀' is 4 bytes in UTF-8, 2 code units in UTF-16.
        let idx = LineIndex::new("a😀b".to_string());
        assert_eq!(idx.position_at(1), Position::new(0, 1));
        assert_eq!(idx.position_at(5), Position::new(0, 3));
        assert_eq!(idx.offset_at(Position::new(0, 3)), Some(5));
    }

    #[test]
    fn out_of_range_inputs() {
        let idx = LineIndex::new("ab".to_string());
        assert_eq!(idx.offset_at(Position::new(3, 0)), None);
        // past end of line clamps
        assert_eq!(idx.offset_at(Position::new(0, 99)), Some(2));
        // past end of text clamps
        assert_eq!(idx.position_at(99), Position::new(0, 2));
    }

    #[test]
    fn span_and_range_convert_both_ways() {
        let idx = LineIndex::new("ab\ncd\n".to_string());
        let range = idx.range_of(Span::new(3, 5));
        assert_eq!(range.start, Position::new(1, 0));
        assert_eq!(range.end, Position::new(1, 2));
        assert_eq!(idx.span_of(range), Some(Span::new(3, 5)));
    }
}
