//! Text buffer abstraction and the rope-backed reference implementation.

use crate::error::BufferError;
use ropey::Rope;
use std::borrow::Cow;
use std::ops::Range;
use typeassist_highlight::{Attribute, EditRegion, TextSource};

/// Kind of a primitive edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    /// Text was inserted.
    Insert,
    /// Text was removed.
    Remove,
}

/// A primitive change to the document, reported after it was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditEvent {
    /// Insert or remove.
    pub kind: EditKind,
    /// Char offset where the change happened.
    pub offset: usize,
    /// Inserted or removed text.
    pub text: String,
}

impl EditEvent {
    /// An insertion of `text` at `offset`.
    pub fn inserted(offset: usize, text: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Insert,
            offset,
            text: text.into(),
        }
    }

    /// A removal of `text` that used to start at `offset`.
    pub fn removed(offset: usize, text: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Remove,
            offset,
            text: text.into(),
        }
    }

    /// Length of the text in chars.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Returns `true` if the event carries no text.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of line breaks added (insert) or removed (remove).
    pub fn line_breaks(&self) -> usize {
        self.text.matches('\n').count()
    }

    /// The region a highlighter has to revisit for this event.
    pub fn region(&self) -> EditRegion {
        match self.kind {
            EditKind::Insert => EditRegion::Inserted {
                offset: self.offset,
                text: self.text.clone(),
            },
            EditKind::Remove => EditRegion::Removed {
                offset: self.offset,
                text: self.text.clone(),
            },
        }
    }
}

/// The document store the mediator drives.
///
/// Reads come from [`TextSource`]. Offsets are char offsets; `paint` clamps to the document,
/// while `insert` and `remove` reject out-of-range positions.
pub trait TextBuffer: TextSource {
    /// Insert `text` at `offset`.
    fn insert(&mut self, offset: usize, text: &str) -> Result<(), BufferError>;

    /// Remove `len` chars starting at `offset`, returning the removed text.
    fn remove(&mut self, offset: usize, len: usize) -> Result<String, BufferError>;

    /// Set the display attribute of `len` chars starting at `start`.
    fn paint(&mut self, start: usize, len: usize, attribute: Attribute);

    /// Display attribute at `offset` (`Normal` past the end).
    fn attribute_at(&self, offset: usize) -> Attribute;

    /// Caret offset.
    fn caret(&self) -> usize;

    /// Move the caret (clamped to the document).
    fn set_caret(&mut self, offset: usize);

    /// Current selection, if any.
    fn selection(&self) -> Option<Range<usize>>;

    /// Replace the selection.
    fn set_selection(&mut self, selection: Option<Range<usize>>);
}

/// A [`Rope`] plus one display attribute per char.
///
/// Inserted text starts out `Normal`; attributes of surviving text move with it.
#[derive(Debug, Clone, Default)]
pub struct RopeBuffer {
    rope: Rope,
    attributes: Vec<Attribute>,
    caret: usize,
    selection: Option<Range<usize>>,
}

impl RopeBuffer {
    /// Create a buffer holding `text`, caret at the start.
    pub fn new(text: &str) -> Self {
        let rope = Rope::from_str(text);
        let attributes = vec![Attribute::Normal; rope.len_chars()];
        Self {
            rope,
            attributes,
            caret: 0,
            selection: None,
        }
    }

    /// The whole text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// The underlying rope.
    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    /// One attribute per char.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    fn shift_after_insert(position: usize, offset: usize, len: usize) -> usize {
        if position >= offset {
            position + len
        } else {
            position
        }
    }

    fn shift_after_remove(position: usize, offset: usize, len: usize) -> usize {
        if position >= offset + len {
            position - len
        } else {
            position.min(offset)
        }
    }
}

impl TextSource for RopeBuffer {
    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.rope.get_char(offset)
    }

    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line_of(&self, offset: usize) -> usize {
        TextSource::line_of(&self.rope, offset)
    }

    fn line_start(&self, line: usize) -> usize {
        TextSource::line_start(&self.rope, line)
    }

    fn slice(&self, start: usize, end: usize) -> String {
        TextSource::slice(&self.rope, start, end)
    }

    fn line_text(&self, line: usize) -> Cow<'_, str> {
        TextSource::line_text(&self.rope, line)
    }
}

impl TextBuffer for RopeBuffer {
    fn insert(&mut self, offset: usize, text: &str) -> Result<(), BufferError> {
        let len = self.rope.len_chars();
        if offset > len {
            return Err(BufferError::OutOfBounds { offset, len });
        }
        let count = text.chars().count();
        self.rope.insert(offset, text);
        self.attributes.splice(
            offset..offset,
            std::iter::repeat_n(Attribute::Normal, count),
        );
        self.caret = Self::shift_after_insert(self.caret, offset, count);
        self.selection = self.selection.take().map(|range| {
            Self::shift_after_insert(range.start, offset, count)
                ..Self::shift_after_insert(range.end, offset, count)
        });
        Ok(())
    }

    fn remove(&mut self, offset: usize, len: usize) -> Result<String, BufferError> {
        let doc_len = self.rope.len_chars();
        let end = offset.saturating_add(len);
        if end > doc_len {
            return Err(BufferError::InvalidRange {
                start: offset,
                end,
                len: doc_len,
            });
        }
        let removed = self.rope.slice(offset..end).to_string();
        self.rope.remove(offset..end);
        self.attributes.drain(offset..end);
        self.caret = Self::shift_after_remove(self.caret, offset, len);
        self.selection = self.selection.take().map(|range| {
            Self::shift_after_remove(range.start, offset, len)
                ..Self::shift_after_remove(range.end, offset, len)
        });
        Ok(removed)
    }

    fn paint(&mut self, start: usize, len: usize, attribute: Attribute) {
        let end = start.saturating_add(len).min(self.attributes.len());
        let start = start.min(end);
        self.attributes[start..end].fill(attribute);
    }

    fn attribute_at(&self, offset: usize) -> Attribute {
        self.attributes
            .get(offset)
            .copied()
            .unwrap_or(Attribute::Normal)
    }

    fn caret(&self) -> usize {
        self.caret
    }

    fn set_caret(&mut self, offset: usize) {
        self.caret = offset.min(self.rope.len_chars());
    }

    fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    fn set_selection(&mut self, selection: Option<Range<usize>>) {
        let len = self.rope.len_chars();
        self.selection = selection.map(|range| range.start.min(len)..range.end.min(len));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_moves_caret_and_attributes() {
        let mut buffer = RopeBuffer::new("ab");
        buffer.paint(0, 2, Attribute::Comment);
        buffer.set_caret(1);
        buffer.insert(1, "xy").unwrap();
        assert_eq!(buffer.text(), "axyb");
        assert_eq!(buffer.caret(), 3);
        assert_eq!(
            buffer.attributes(),
            &[
                Attribute::Comment,
                Attribute::Normal,
                Attribute::Normal,
                Attribute::Comment
            ]
        );
    }

    #[test]
    fn test_remove_returns_text() {
        let mut buffer = RopeBuffer::new("hello world");
        buffer.set_caret(11);
        let removed = buffer.remove(5, 6).unwrap();
        assert_eq!(removed, " world");
        assert_eq!(buffer.text(), "hello");
        assert_eq!(buffer.caret(), 5);
        assert_eq!(buffer.attributes().len(), 5);
    }

    #[test]
    fn test_out_of_range_edits_are_rejected() {
        let mut buffer = RopeBuffer::new("abc");
        assert_eq!(
            buffer.insert(4, "x"),
            Err(BufferError::OutOfBounds { offset: 4, len: 3 })
        );
        assert_eq!(
            buffer.remove(2, 5),
            Err(BufferError::InvalidRange {
                start: 2,
                end: 7,
                len: 3
            })
        );
        assert_eq!(buffer.text(), "abc");
    }

    #[test]
    fn test_paint_clamps() {
        let mut buffer = RopeBuffer::new("abc");
        buffer.paint(1, 100, Attribute::KeywordRed);
        assert_eq!(buffer.attribute_at(0), Attribute::Normal);
        assert_eq!(buffer.attribute_at(2), Attribute::KeywordRed);
        assert_eq!(buffer.attribute_at(3), Attribute::Normal);
    }

    #[test]
    fn test_event_line_breaks() {
        let event = EditEvent::inserted(0, "a\nb\n");
        assert_eq!(event.len(), 4);
        assert_eq!(event.line_breaks(), 2);
        assert_eq!(
            EditEvent::removed(3, "x").region(),
            EditRegion::Removed {
                offset: 3,
                text: "x".to_string()
            }
        );
    }
}
