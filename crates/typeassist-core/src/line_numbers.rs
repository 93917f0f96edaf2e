//! Line-number gutter.

use crate::buffer::{EditEvent, EditKind};

/// The line-number column shown next to the document.
///
/// Holds one rendered entry per buffer line. Edits add or drop trailing entries by counting the
/// line breaks they carry, so keeping the column in sync costs nothing per ordinary keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineNumberTracker {
    entries: Vec<String>,
}

impl Default for LineNumberTracker {
    fn default() -> Self {
        Self::new(1)
    }
}

impl LineNumberTracker {
    /// A column for `line_count` lines (at least one).
    pub fn new(line_count: usize) -> Self {
        let mut tracker = Self {
            entries: Vec::new(),
        };
        tracker.rebuild(line_count);
        tracker
    }

    /// Regenerate every entry, e.g. after a bulk load.
    pub fn rebuild(&mut self, line_count: usize) {
        self.entries = (1..=line_count.max(1)).map(|n| n.to_string()).collect();
    }

    /// Follow one primitive edit.
    pub fn apply(&mut self, event: &EditEvent) {
        let breaks = event.line_breaks();
        match event.kind {
            EditKind::Insert => {
                let next = self.entries.len() + 1;
                self.entries
                    .extend((next..next + breaks).map(|n| n.to_string()));
            }
            EditKind::Remove => {
                let keep = self.entries.len().saturating_sub(breaks).max(1);
                self.entries.truncate(keep);
            }
        }
    }

    /// Number of entries (equals the buffer's line count while in sync).
    pub fn line_count(&self) -> usize {
        self.entries.len()
    }

    /// The rendered entries.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Entries joined by `\n`, ready for a gutter widget.
    pub fn gutter_text(&self) -> String {
        self.entries.join("\n")
    }

    /// Digits needed for the largest line number.
    pub fn gutter_width(&self) -> usize {
        self.entries.last().map_or(1, String::len)
    }
}
