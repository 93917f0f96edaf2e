//! Read-only, character-indexed access to document text.

use ropey::Rope;
use std::borrow::Cow;

/// A char-indexed view of a document.
///
/// Offsets are Unicode scalar value offsets. Lines are separated by `\n`; the separator belongs
/// to the line it terminates but is never part of [`line_text`](TextSource::line_text).
/// Out-of-range offsets and lines are clamped rather than rejected.
pub trait TextSource {
    /// Total character count.
    fn len_chars(&self) -> usize;

    /// Character at `offset`, or `None` past the end.
    fn char_at(&self, offset: usize) -> Option<char>;

    /// Number of lines (always at least 1).
    fn line_count(&self) -> usize;

    /// Line containing `offset`.
    fn line_of(&self, offset: usize) -> usize;

    /// Offset of the first character of `line`.
    fn line_start(&self, line: usize) -> usize;

    /// Text in `[start, end)`.
    fn slice(&self, start: usize, end: usize) -> String;

    /// Offset just past the last character of `line`, excluding its `\n`.
    fn line_end(&self, line: usize) -> usize {
        if line + 1 < self.line_count() {
            self.line_start(line + 1).saturating_sub(1)
        } else {
            self.len_chars()
        }
    }

    /// Text of `line` without its trailing `\n`.
    fn line_text(&self, line: usize) -> Cow<'_, str> {
        Cow::Owned(self.slice(self.line_start(line), self.line_end(line)))
    }

    /// Whether the document is empty.
    fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }
}

impl TextSource for Rope {
    fn len_chars(&self) -> usize {
        Rope::len_chars(self)
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.get_char(offset)
    }

    fn line_count(&self) -> usize {
        self.len_lines()
    }

    fn line_of(&self, offset: usize) -> usize {
        self.char_to_line(offset.min(Rope::len_chars(self)))
    }

    fn line_start(&self, line: usize) -> usize {
        self.line_to_char(line.min(self.len_lines()))
    }

    fn slice(&self, start: usize, end: usize) -> String {
        let len = Rope::len_chars(self);
        let end = end.min(len);
        let start = start.min(end);
        Rope::slice(self, start..end).to_string()
    }

    fn line_text(&self, line: usize) -> Cow<'_, str> {
        if line >= self.len_lines() {
            return Cow::Borrowed("");
        }
        let text: Cow<'_, str> = self.line(line).into();
        match text {
            Cow::Borrowed(s) => Cow::Borrowed(s.strip_suffix('\n').unwrap_or(s)),
            Cow::Owned(mut s) => {
                if s.ends_with('\n') {
                    s.pop();
                }
                Cow::Owned(s)
            }
        }
    }
}
