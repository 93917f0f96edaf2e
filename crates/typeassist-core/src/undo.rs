//! Grouped undo/redo history.
//!
//! Keystrokes are merged into word-like units: a single-char insert that continues the previous
//! one joins the open unit, while a boundary char (space, newline, parentheses, braces) starts
//! a new unit that the following word chars join. Typing `abc def` therefore yields the units
//! `abc` and ` def`. Removals and multi-char inserts always form their own unit.

use crate::buffer::{EditEvent, EditKind, TextBuffer};
use crate::error::BufferError;
use log::debug;
use std::collections::VecDeque;

/// Default number of undo units kept.
pub const DEFAULT_UNDO_CAPACITY: usize = 1000;

const UNIT_BOUNDARY_CHARS: [char; 6] = [' ', '\n', '(', ')', '{', '}'];

/// One recorded edit plus the caret observed right after it was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimitiveEdit {
    /// Insert or remove.
    pub kind: EditKind,
    /// Char offset of the edit.
    pub offset: usize,
    /// Inserted or removed text.
    pub text: String,
    /// Caret after the edit.
    pub caret: usize,
}

impl PrimitiveEdit {
    /// Record `event` with the caret that followed it.
    pub fn from_event(event: &EditEvent, caret: usize) -> Self {
        Self {
            kind: event.kind,
            offset: event.offset,
            text: event.text.clone(),
            caret,
        }
    }

    fn single_char(&self) -> Option<char> {
        let mut chars = self.text.chars();
        match (self.kind, chars.next(), chars.next()) {
            (EditKind::Insert, Some(c), None) => Some(c),
            _ => None,
        }
    }

    fn inverse(&self) -> EditEvent {
        match self.kind {
            EditKind::Insert => EditEvent::removed(self.offset, self.text.clone()),
            EditKind::Remove => EditEvent::inserted(self.offset, self.text.clone()),
        }
    }

    fn forward(&self) -> EditEvent {
        EditEvent {
            kind: self.kind,
            offset: self.offset,
            text: self.text.clone(),
        }
    }
}

/// Edits undone or redone as one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoUnit {
    edits: Vec<PrimitiveEdit>,
}

impl UndoUnit {
    /// The edits in the order they were made.
    pub fn edits(&self) -> &[PrimitiveEdit] {
        &self.edits
    }
}

/// What a replay did to the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    /// The primitive changes applied, in order.
    pub events: Vec<EditEvent>,
    /// Where the caret was put.
    pub caret: usize,
}

/// Capacity-bounded undo/redo stacks with keystroke merging.
#[derive(Debug, Clone)]
pub struct UndoStack {
    undo: VecDeque<UndoUnit>,
    redo: Vec<UndoUnit>,
    capacity: usize,
    /// Offset where a contiguous typed char would land, while the last unit accepts typing.
    typing_at: Option<usize>,
    merge_depth: usize,
    /// Whether the open merge window already started its unit.
    merge_started: bool,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_CAPACITY)
    }
}

impl UndoStack {
    /// Create a stack keeping at most `capacity` units (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            capacity: capacity.max(1),
            typing_at: None,
            merge_depth: 0,
            merge_started: false,
        }
    }

    /// Maximum number of undo units.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity, evicting the oldest units if needed.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.evict();
    }

    /// Returns `true` if there is something to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Returns `true` if there is something to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of undo units.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Number of redo units.
    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Returns `true` while an explicit merge window is open.
    pub fn in_merge_window(&self) -> bool {
        self.merge_depth > 0
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.reset_window();
    }

    /// Record an edit made by the user. Clears the redo stack.
    pub fn record(&mut self, edit: PrimitiveEdit) {
        self.redo.clear();

        if self.merge_depth > 0 {
            self.typing_at = None;
            if self.merge_started {
                self.append(edit);
            } else {
                self.merge_started = true;
                self.push_unit(edit);
            }
            return;
        }

        match edit.single_char() {
            Some(c) => {
                let continues = self.typing_at == Some(edit.offset);
                self.typing_at = Some(edit.offset + 1);
                if continues && !UNIT_BOUNDARY_CHARS.contains(&c) {
                    self.append(edit);
                } else {
                    self.push_unit(edit);
                }
            }
            None => {
                self.typing_at = None;
                self.push_unit(edit);
            }
        }
    }

    /// Record a follow-up edit (auto-indent, outdent) as part of the most recent unit.
    pub fn attach(&mut self, edit: PrimitiveEdit) {
        self.redo.clear();
        let len = edit.text.chars().count();
        self.typing_at = match (self.typing_at, edit.kind) {
            (Some(at), EditKind::Insert) if at >= edit.offset => Some(at + len),
            (Some(at), EditKind::Remove) if at >= edit.offset + len => Some(at - len),
            (Some(at), _) if at < edit.offset => Some(at),
            _ => None,
        };
        self.append(edit);
    }

    /// Close the current unit; the next edit starts a new one.
    pub fn break_unit(&mut self) {
        self.typing_at = None;
        self.merge_started = false;
    }

    /// Open a merge window: every edit until the matching [`end_merge`](Self::end_merge)
    /// joins one unit. Windows nest.
    pub fn begin_merge(&mut self) {
        if self.merge_depth == 0 {
            self.typing_at = None;
            self.merge_started = false;
        }
        self.merge_depth += 1;
    }

    /// Close a merge window. Closing more windows than were opened is ignored.
    pub fn end_merge(&mut self) {
        if self.merge_depth == 0 {
            debug!("end_merge without an open merge window ignored");
            return;
        }
        self.merge_depth -= 1;
        if self.merge_depth == 0 {
            self.merge_started = false;
        }
    }

    /// The events [`undo`](Self::undo) would apply, in order.
    pub fn pending_undo(&self) -> Option<Vec<EditEvent>> {
        self.undo
            .back()
            .map(|unit| unit.edits.iter().rev().map(PrimitiveEdit::inverse).collect())
    }

    /// The events [`redo`](Self::redo) would apply, in order.
    pub fn pending_redo(&self) -> Option<Vec<EditEvent>> {
        self.redo
            .last()
            .map(|unit| unit.edits.iter().map(PrimitiveEdit::forward).collect())
    }

    /// Revert the most recent unit directly on `buffer`.
    ///
    /// The caret goes back to the offset of the unit's first edit. Returns `None` when there is
    /// nothing to undo.
    pub fn undo<B: TextBuffer + ?Sized>(
        &mut self,
        buffer: &mut B,
    ) -> Result<Option<Replay>, BufferError> {
        self.reset_window();
        let Some(events) = self.pending_undo() else {
            return Ok(None);
        };
        let Some(unit) = self.undo.pop_back() else {
            return Ok(None);
        };
        apply_events(buffer, &events)?;
        let caret = unit.edits.first().map_or(0, |edit| edit.offset);
        buffer.set_caret(caret);
        self.redo.push(unit);
        Ok(Some(Replay { events, caret }))
    }

    /// Re-apply the most recently undone unit directly on `buffer`.
    ///
    /// The caret goes to where it was after the unit's last edit.
    pub fn redo<B: TextBuffer + ?Sized>(
        &mut self,
        buffer: &mut B,
    ) -> Result<Option<Replay>, BufferError> {
        self.reset_window();
        let Some(events) = self.pending_redo() else {
            return Ok(None);
        };
        let Some(unit) = self.redo.pop() else {
            return Ok(None);
        };
        apply_events(buffer, &events)?;
        let caret = unit.edits.last().map_or(0, |edit| edit.caret);
        buffer.set_caret(caret);
        self.undo.push_back(unit);
        Ok(Some(Replay { events, caret }))
    }

    fn append(&mut self, edit: PrimitiveEdit) {
        match self.undo.back_mut() {
            Some(unit) => unit.edits.push(edit),
            None => self.push_unit(edit),
        }
    }

    fn push_unit(&mut self, edit: PrimitiveEdit) {
        self.undo.push_back(UndoUnit { edits: vec![edit] });
        self.evict();
    }

    fn evict(&mut self) {
        while self.undo.len() > self.capacity {
            if let Some(unit) = self.undo.pop_front() {
                debug!("undo capacity reached, evicted a unit of {} edits", unit.edits.len());
            }
        }
    }

    fn reset_window(&mut self) {
        self.typing_at = None;
        self.merge_depth = 0;
        self.merge_started = false;
    }
}

fn apply_events<B: TextBuffer + ?Sized>(
    buffer: &mut B,
    events: &[EditEvent],
) -> Result<(), BufferError> {
    for event in events {
        match event.kind {
            EditKind::Insert => buffer.insert(event.offset, &event.text)?,
            EditKind::Remove => {
                buffer.remove(event.offset, event.len())?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::RopeBuffer;
    use typeassist_highlight::TextSource;

    fn type_text(stack: &mut UndoStack, buffer: &mut RopeBuffer, at: usize, text: &str) {
        for (i, c) in text.chars().enumerate() {
            let offset = at + i;
            buffer.insert(offset, &c.to_string()).unwrap();
            let event = EditEvent::inserted(offset, c);
            stack.record(PrimitiveEdit::from_event(&event, buffer.caret()));
        }
    }

    #[test]
    fn test_word_units() {
        let mut stack = UndoStack::default();
        let mut buffer = RopeBuffer::new("");
        type_text(&mut stack, &mut buffer, 0, "abc def");
        assert_eq!(stack.undo_depth(), 2);

        stack.undo(&mut buffer).unwrap();
        assert_eq!(buffer.text(), "abc");
        stack.undo(&mut buffer).unwrap();
        assert_eq!(buffer.text(), "");
        assert!(!stack.can_undo());
        assert_eq!(stack.redo_depth(), 2);
    }

    #[test]
    fn test_non_contiguous_typing_starts_new_unit() {
        let mut stack = UndoStack::default();
        let mut buffer = RopeBuffer::new("");
        type_text(&mut stack, &mut buffer, 0, "ab");
        type_text(&mut stack, &mut buffer, 0, "x");
        assert_eq!(buffer.text(), "xab");
        assert_eq!(stack.undo_depth(), 2);
    }

    #[test]
    fn test_undo_restores_first_offset_and_redo_last_caret() {
        let mut stack = UndoStack::default();
        let mut buffer = RopeBuffer::new("");
        type_text(&mut stack, &mut buffer, 0, "abc");
        let replay = stack.undo(&mut buffer).unwrap().unwrap();
        assert_eq!(replay.caret, 0);
        assert_eq!(replay.events.len(), 3);
        assert_eq!(replay.events[0], EditEvent::removed(2, "c"));

        let replay = stack.redo(&mut buffer).unwrap().unwrap();
        assert_eq!(buffer.text(), "abc");
        assert_eq!(replay.caret, 3);
        assert_eq!(buffer.caret(), 3);
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut stack = UndoStack::default();
        let mut buffer = RopeBuffer::new("");
        type_text(&mut stack, &mut buffer, 0, "ab");
        stack.undo(&mut buffer).unwrap();
        assert!(stack.can_redo());
        type_text(&mut stack, &mut buffer, 0, "z");
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_attach_joins_previous_unit() {
        let mut stack = UndoStack::default();
        let mut buffer = RopeBuffer::new("{");
        type_text(&mut stack, &mut buffer, 1, "\n");
        buffer.insert(2, "    ").unwrap();
        stack.attach(PrimitiveEdit::from_event(
            &EditEvent::inserted(2, "    "),
            buffer.caret(),
        ));
        type_text(&mut stack, &mut buffer, 6, "x");
        assert_eq!(stack.undo_depth(), 1);

        stack.undo(&mut buffer).unwrap();
        assert_eq!(buffer.text(), "{");
    }

    #[test]
    fn test_merge_window_and_stray_end() {
        let mut stack = UndoStack::default();
        let mut buffer = RopeBuffer::new("");
        stack.end_merge();
        stack.begin_merge();
        stack.begin_merge();
        type_text(&mut stack, &mut buffer, 0, "a b");
        stack.end_merge();
        type_text(&mut stack, &mut buffer, 3, "(c");
        stack.end_merge();
        assert!(!stack.in_merge_window());
        assert_eq!(stack.undo_depth(), 1);

        type_text(&mut stack, &mut buffer, 5, "d");
        assert_eq!(stack.undo_depth(), 2);
    }

    #[test]
    fn test_undo_resets_open_window() {
        let mut stack = UndoStack::default();
        let mut buffer = RopeBuffer::new("");
        stack.begin_merge();
        type_text(&mut stack, &mut buffer, 0, "ab");
        stack.undo(&mut buffer).unwrap();
        assert!(!stack.in_merge_window());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut stack = UndoStack::new(2);
        let mut buffer = RopeBuffer::new("");
        type_text(&mut stack, &mut buffer, 0, "one two three");
        assert_eq!(stack.undo_depth(), 2);
        while stack.can_undo() {
            stack.undo(&mut buffer).unwrap();
        }
        assert_eq!(buffer.text(), "one");
        assert_eq!(buffer.len_chars(), 3);
    }
}
