//! Edit mediation: the single entry point a host drives.
//!
//! # Workflow
//!
//! 1. The host routes a keystroke through [`EditMediator::insert`] / [`EditMediator::remove`]
//!    (or mutates its own buffer and reports the change with [`EditMediator::on_edit`])
//! 2. The mediator synchronously updates line numbers and the undo history
//! 3. Recoloring and indentation are queued as [`DeferredTask`]s
//! 4. The host calls [`EditMediator::run_deferred`] before accepting the next input
//!
//! Follow-up edits made by queued tasks join the undo unit of the keystroke that caused them
//! and queue their own recolor, so attributes always match a full recolor once the queue is
//! empty.

use crate::buffer::{EditEvent, EditKind, TextBuffer};
use crate::error::AssistError;
use crate::indent::{IndentContext, IndentEdit, IndentEngine};
use crate::line_numbers::LineNumberTracker;
use crate::notify::{EdgeSignal, UndoAvailability};
use crate::settings::AssistSettings;
use crate::tasks::{DeferredTask, TaskQueue};
use crate::undo::{PrimitiveEdit, Replay, UndoStack};
use log::debug;
use std::ops::{Deref, DerefMut, Range};
use typeassist_highlight::{Attribute, EditRegion, Highlighter, Language, LanguageMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// A keystroke or host edit.
    User,
    /// An edit made by a deferred task.
    FollowUp,
    /// A selection indent/outdent step.
    Structural,
}

/// Coordinates one document's buffer, highlighter, indentation, undo history and gutter.
pub struct EditMediator<B: TextBuffer> {
    buffer: B,
    highlighter: Highlighter,
    indent: IndentEngine,
    undo: UndoStack,
    lines: LineNumberTracker,
    tasks: TaskQueue,
    listening: bool,
    type_assist: bool,
    undo_signal: EdgeSignal<UndoAvailability>,
    selection_signal: EdgeSignal<bool>,
}

impl<B: TextBuffer> EditMediator<B> {
    /// Wrap `buffer` with plain-text mode and default settings.
    pub fn new(buffer: B) -> Self {
        let lines = LineNumberTracker::new(buffer.line_count());
        Self {
            buffer,
            highlighter: Highlighter::default(),
            indent: IndentEngine::default(),
            undo: UndoStack::default(),
            lines,
            tasks: TaskQueue::new(),
            listening: true,
            type_assist: true,
            undo_signal: EdgeSignal::new(UndoAvailability::default()),
            selection_signal: EdgeSignal::new(false),
        }
    }

    /// Wrap `buffer` configured from persisted settings, then recolor the whole document.
    pub fn with_settings(buffer: B, settings: &AssistSettings) -> Result<Self, AssistError> {
        let context = settings.indent_context()?;
        let mut mediator = Self::new(buffer);
        mediator.indent = IndentEngine::new(context);
        mediator.undo = UndoStack::new(settings.undo_capacity);
        mediator.type_assist = settings.type_assist;
        mediator.highlighter = Highlighter::for_language(settings.language);
        mediator.recolor(None);
        Ok(mediator)
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> AssistSettings {
        let context = self.indent.context();
        AssistSettings {
            language: self.highlighter.language(),
            indent_unit: context.unit().to_string(),
            tab_width: context.tab_width(),
            curly_bracket_mode: context.curly_bracket_mode(),
            type_assist: self.type_assist,
            undo_capacity: self.undo.capacity(),
        }
    }

    // ==================== Mode ====================

    /// Language of the document.
    pub fn mode(&self) -> Language {
        self.highlighter.language()
    }

    /// Switch the document language and recolor it once.
    ///
    /// Pending tasks run first, against the previous mode. Closing-brace outdent follows the
    /// new language's use of curly brackets.
    pub fn set_mode(&mut self, language: Language) -> Result<(), AssistError> {
        self.run_deferred()?;
        debug!("mode {:?} -> {:?}", self.highlighter.language(), language);
        let curly = LanguageMode::for_language(language).uses_curly_brackets;
        let context = self.indent.context().clone().with_curly_bracket_mode(curly);
        self.indent.set_context(context);
        self.highlighter = Highlighter::for_language(language);
        self.recolor(None);
        Ok(())
    }

    /// Turn per-keystroke recoloring and indentation on or off.
    ///
    /// Turning it off drops queued work; turning it back on recolors the document.
    pub fn enable_type_assist(&mut self, enabled: bool) {
        if enabled == self.type_assist {
            return;
        }
        self.type_assist = enabled;
        if enabled {
            self.recolor(None);
        } else {
            self.tasks.clear();
        }
    }

    /// Whether type assist is switched on (it still does nothing in plain text).
    pub fn type_assist_enabled(&self) -> bool {
        self.type_assist
    }

    fn type_assist_active(&self) -> bool {
        self.type_assist && !self.highlighter.is_plain()
    }

    // ==================== Editing ====================

    /// Insert `text` at `offset` as a user edit and put the caret after it.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<(), AssistError> {
        if text.is_empty() {
            return Ok(());
        }
        self.buffer.insert(offset, text)?;
        let event = EditEvent::inserted(offset, text);
        self.buffer.set_caret(offset + event.len());
        self.handle(event, Origin::User);
        Ok(())
    }

    /// Remove `len` chars at `offset` as a user edit and put the caret there.
    pub fn remove(&mut self, offset: usize, len: usize) -> Result<String, AssistError> {
        if len == 0 {
            return Ok(String::new());
        }
        let removed = self.buffer.remove(offset, len)?;
        self.buffer.set_caret(offset);
        self.handle(EditEvent::removed(offset, removed.clone()), Origin::User);
        Ok(removed)
    }

    /// Report an edit the host already applied to the buffer.
    pub fn on_edit(&mut self, event: EditEvent) {
        if !event.is_empty() {
            self.handle(event, Origin::User);
        }
    }

    fn handle(&mut self, event: EditEvent, origin: Origin) {
        if !self.listening {
            return;
        }
        self.lines.apply(&event);
        self.publish_selection_state();
        let edit = PrimitiveEdit::from_event(&event, self.buffer.caret());
        match origin {
            Origin::FollowUp => self.undo.attach(edit),
            Origin::User | Origin::Structural => self.undo.record(edit),
        }
        self.publish_undo_state();

        if !self.type_assist_active() || origin == Origin::Structural {
            return;
        }
        let follow_up = match (origin, event.kind, event.text.as_str()) {
            (Origin::User, EditKind::Insert, "\n") => Some(DeferredTask::AutoIndent {
                newline: event.offset,
            }),
            (Origin::User, EditKind::Insert, "}")
                if self.indent.context().curly_bracket_mode() =>
            {
                Some(DeferredTask::Outdent {
                    brace: event.offset,
                })
            }
            _ => None,
        };
        self.tasks.push_recolor(&event, &self.buffer);
        if let Some(task) = follow_up {
            self.tasks.push(task);
        }
    }

    // ==================== Deferred work ====================

    /// Drain the task queue in FIFO order, including tasks queued while draining.
    pub fn run_deferred(&mut self) -> Result<(), AssistError> {
        while let Some(task) = self.tasks.pop() {
            match task {
                DeferredTask::AutoIndent { newline } => {
                    if let Some(edit) = self.indent.newline_indent(&self.buffer, newline) {
                        self.apply_indent_edit(edit, Origin::FollowUp)?;
                    }
                }
                DeferredTask::Outdent { brace } => {
                    for edit in self.indent.close_brace_outdent(&self.buffer, brace) {
                        self.apply_indent_edit(edit, Origin::FollowUp)?;
                    }
                }
                DeferredTask::Recolor(region) => self.paint(&region),
                DeferredTask::RecolorAll => self.paint(&EditRegion::Document),
            }
        }
        Ok(())
    }

    /// Returns `true` while deferred tasks are waiting.
    pub fn has_pending_tasks(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// The queued tasks, oldest first.
    pub fn pending_tasks(&self) -> &TaskQueue {
        &self.tasks
    }

    fn apply_indent_edit(&mut self, edit: IndentEdit, origin: Origin) -> Result<(), AssistError> {
        let event = match edit {
            IndentEdit::Insert { offset, text } => {
                self.buffer.insert(offset, &text)?;
                EditEvent::inserted(offset, text)
            }
            IndentEdit::Remove { offset, len } => {
                let removed = self.buffer.remove(offset, len)?;
                EditEvent::removed(offset, removed)
            }
        };
        self.handle(event, origin);
        Ok(())
    }

    // ==================== Undo/Redo ====================

    /// Revert the most recent undo unit. Returns `false` when there was nothing to undo.
    pub fn undo(&mut self) -> Result<bool, AssistError> {
        self.run_deferred()?;
        let Some(events) = self.undo.pending_undo() else {
            return Ok(false);
        };
        let region = self.replay_region(&events);
        let Some(replay) = self.undo.undo(&mut self.buffer)? else {
            return Ok(false);
        };
        self.after_replay(&replay, region);
        Ok(true)
    }

    /// Re-apply the most recently undone unit. Returns `false` when there was nothing to redo.
    pub fn redo(&mut self) -> Result<bool, AssistError> {
        self.run_deferred()?;
        let Some(events) = self.undo.pending_redo() else {
            return Ok(false);
        };
        let region = self.replay_region(&events);
        let Some(replay) = self.undo.redo(&mut self.buffer)? else {
            return Ok(false);
        };
        self.after_replay(&replay, region);
        Ok(true)
    }

    /// Returns `true` if there is something to undo.
    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    /// Returns `true` if there is something to redo.
    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    /// The span `events` will change, as a region valid once they are applied.
    ///
    /// Chars before the lowest edit offset and after the shortest untouched suffix survive
    /// every event; everything in between is treated as replaced.
    fn replay_region(&self, events: &[EditEvent]) -> EditRegion {
        let original_len = self.buffer.len_chars();
        let mut len = original_len;
        let mut prefix = usize::MAX;
        let mut suffix = usize::MAX;
        for event in events {
            let removed = match event.kind {
                EditKind::Insert => 0,
                EditKind::Remove => event.len(),
            };
            prefix = prefix.min(event.offset);
            suffix = suffix.min(len.saturating_sub(event.offset + removed));
            len = match event.kind {
                EditKind::Insert => len + event.len(),
                EditKind::Remove => len.saturating_sub(removed),
            };
        }
        if prefix == usize::MAX {
            return EditRegion::Span(0..0);
        }
        let previous_end = original_len.saturating_sub(suffix).max(prefix);
        EditRegion::Replaced {
            range: prefix..len.saturating_sub(suffix).max(prefix),
            previous: self.buffer.slice(prefix, previous_end),
        }
    }

    fn after_replay(&mut self, replay: &Replay, region: EditRegion) {
        for event in &replay.events {
            self.lines.apply(event);
        }
        self.publish_selection_state();
        self.publish_undo_state();
        if !self.type_assist_active() {
            return;
        }
        let crosses = replay
            .events
            .iter()
            .any(|event| self.highlighter.crosses_block_boundary(&event.text));
        if crosses {
            debug!("replayed unit crosses a block boundary, recoloring the document");
            self.paint(&EditRegion::Document);
        } else {
            self.paint(&region);
        }
    }

    fn publish_undo_state(&mut self) {
        self.undo_signal.set(UndoAvailability {
            can_undo: self.undo.can_undo(),
            can_redo: self.undo.can_redo(),
        });
    }

    // ==================== Indentation ====================

    /// The literal text of one indent level.
    pub fn indent_unit(&self) -> &str {
        self.indent.context().unit()
    }

    /// Change the indent unit for future indentation. Mixed tab/space units are rejected.
    pub fn set_indent_unit(&mut self, unit: &str) -> Result<(), AssistError> {
        let context = self.indent.context();
        let context = IndentContext::new(unit, context.tab_width(), context.curly_bracket_mode())?;
        self.indent.set_context(context);
        Ok(())
    }

    /// Replace all indentation settings.
    pub fn set_indent_context(&mut self, context: IndentContext) {
        self.indent.set_context(context);
    }

    /// Add one indent level to every non-empty line touched by `selection`.
    ///
    /// The whole change undoes as one step. Returns `false` when nothing changed.
    pub fn indent_selection(&mut self, selection: Range<usize>) -> Result<bool, AssistError> {
        let lines = self.selected_lines(&selection);
        let edits = self.indent.indent_lines(&self.buffer, lines.clone());
        self.apply_structural(edits, lines)
    }

    /// Remove one indent level from every line touched by `selection`.
    ///
    /// Leaves the buffer untouched and returns `false` if any non-blank line is indented by less
    /// than one level.
    pub fn outdent_selection(&mut self, selection: Range<usize>) -> Result<bool, AssistError> {
        let lines = self.selected_lines(&selection);
        let Some(edits) = self.indent.outdent_lines(&self.buffer, lines.clone()) else {
            return Ok(false);
        };
        self.apply_structural(edits, lines)
    }

    /// Lines covered by `selection`; a selection ending at a line start excludes that line.
    fn selected_lines(&self, selection: &Range<usize>) -> Range<usize> {
        let len = self.buffer.len_chars();
        let start = selection.start.min(len);
        let end = selection.end.clamp(start, len);
        let first = self.buffer.line_of(start);
        let mut last = self.buffer.line_of(end);
        if end > start && last > first && self.buffer.line_start(last) == end {
            last -= 1;
        }
        first..last + 1
    }

    fn apply_structural(
        &mut self,
        edits: Vec<IndentEdit>,
        lines: Range<usize>,
    ) -> Result<bool, AssistError> {
        if edits.is_empty() {
            return Ok(false);
        }
        self.undo.begin_merge();
        let applied = edits
            .into_iter()
            .try_for_each(|edit| self.apply_indent_edit(edit, Origin::Structural));
        self.undo.end_merge();
        self.undo.break_unit();
        applied?;

        if self.type_assist_active() {
            let last = lines.end.saturating_sub(1).max(lines.start);
            let span = self.buffer.line_start(lines.start)..self.buffer.line_end(last);
            self.paint(&EditRegion::Span(span));
        }
        Ok(true)
    }

    // ==================== Recoloring and line numbers ====================

    /// Recolor the lines covering `range` now, or the whole document for `None`.
    pub fn recolor(&mut self, range: Option<Range<usize>>) {
        let region = match range {
            Some(range) => EditRegion::Span(range),
            None => {
                debug!(
                    "full recolor of {} chars as {:?}",
                    self.buffer.len_chars(),
                    self.highlighter.language()
                );
                EditRegion::Document
            }
        };
        self.paint(&region);
    }

    fn paint(&mut self, region: &EditRegion) {
        let highlight = self.highlighter.highlight(&self.buffer, region);
        let range = highlight.range;
        self.buffer.paint(range.start, range.len(), Attribute::Normal);
        for run in highlight.runs {
            self.buffer.paint(run.start, run.length, run.attribute);
        }
    }

    /// Rebuild the line-number column from the buffer.
    pub fn renumber_lines(&mut self) {
        self.lines.rebuild(self.buffer.line_count());
    }

    // ==================== Suppression and bulk load ====================

    /// Stop per-edit tracking until the returned guard is dropped.
    ///
    /// Afterwards call [`recolor`](Self::recolor) with `None` and
    /// [`renumber_lines`](Self::renumber_lines).
    pub fn suppress_listening(&mut self) -> SuppressedScope<'_, B> {
        let previous = self.listening;
        self.listening = false;
        SuppressedScope {
            mediator: self,
            previous,
        }
    }

    /// Returns `true` unless a [`SuppressedScope`] is active.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Replace the whole document, clear history, renumber and recolor once.
    pub fn load_text(&mut self, text: &str) -> Result<(), AssistError> {
        self.tasks.clear();
        {
            let mut scope = self.suppress_listening();
            let len = scope.buffer.len_chars();
            scope.remove(0, len)?;
            scope.insert(0, text)?;
        }
        self.buffer.set_caret(0);
        self.undo.clear();
        self.renumber_lines();
        self.recolor(None);
        self.publish_selection_state();
        self.publish_undo_state();
        debug!("loaded {} lines", self.lines.line_count());
        Ok(())
    }

    // ==================== Selection and notifications ====================

    /// Replace the selection; an empty range counts as no selection.
    pub fn set_selection(&mut self, selection: Option<Range<usize>>) {
        let selection = selection.filter(|range| range.start < range.end);
        let present = selection.is_some();
        self.buffer.set_selection(selection);
        self.selection_signal.set(present);
    }

    fn publish_selection_state(&mut self) {
        let present = self
            .buffer
            .selection()
            .is_some_and(|range| range.start < range.end);
        self.selection_signal.set(present);
    }

    /// Call `callback` whenever undo or redo availability changes.
    pub fn on_undo_availability_changed<F>(&mut self, callback: F)
    where
        F: FnMut(UndoAvailability) + Send + 'static,
    {
        self.undo_signal.subscribe(callback);
    }

    /// Call `callback` whenever a selection appears or disappears.
    pub fn on_selection_presence_changed<F>(&mut self, callback: F)
    where
        F: FnMut(bool) + Send + 'static,
    {
        self.selection_signal.subscribe(callback);
    }

    // ==================== Compound edits ====================

    /// Group every edit until [`end_compound_edit`](Self::end_compound_edit) into one undo unit.
    pub fn begin_compound_edit(&mut self) {
        self.undo.begin_merge();
    }

    /// Close a compound edit opened by [`begin_compound_edit`](Self::begin_compound_edit).
    pub fn end_compound_edit(&mut self) {
        self.undo.end_merge();
    }

    /// Make the next edit start a new undo unit.
    pub fn break_undo_unit(&mut self) {
        self.undo.break_unit();
    }

    // ==================== Access ====================

    /// The buffer.
    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    /// Mutable buffer access. Changes made here are not tracked; report them with
    /// [`on_edit`](Self::on_edit).
    pub fn buffer_mut(&mut self) -> &mut B {
        &mut self.buffer
    }

    /// The line-number column.
    pub fn line_numbers(&self) -> &LineNumberTracker {
        &self.lines
    }

    /// The undo history.
    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo
    }

    /// The active highlighter.
    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    /// Give the buffer back.
    pub fn into_buffer(self) -> B {
        self.buffer
    }
}

impl<B: TextBuffer + std::fmt::Debug> std::fmt::Debug for EditMediator<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditMediator")
            .field("buffer", &self.buffer)
            .field("language", &self.highlighter.language())
            .field("pending_tasks", &self.tasks.len())
            .field("listening", &self.listening)
            .field("type_assist", &self.type_assist)
            .finish_non_exhaustive()
    }
}

/// Guard returned by [`EditMediator::suppress_listening`].
///
/// Dereferences to the mediator; tracking resumes when it is dropped.
pub struct SuppressedScope<'a, B: TextBuffer> {
    mediator: &'a mut EditMediator<B>,
    previous: bool,
}

impl<B: TextBuffer> Deref for SuppressedScope<'_, B> {
    type Target = EditMediator<B>;

    fn deref(&self) -> &Self::Target {
        self.mediator
    }
}

impl<B: TextBuffer> DerefMut for SuppressedScope<'_, B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.mediator
    }
}

impl<B: TextBuffer> Drop for SuppressedScope<'_, B> {
    fn drop(&mut self) {
        self.mediator.listening = self.previous;
    }
}
