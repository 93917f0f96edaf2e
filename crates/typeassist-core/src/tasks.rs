//! Deferred follow-up work.
//!
//! Edits are reported while the buffer is still inside its change notification, where it must
//! not be mutated again. Reactions (indentation, recoloring) are therefore queued here and
//! drained in FIFO order by [`EditMediator::run_deferred`](crate::EditMediator::run_deferred)
//! before the next input is accepted.

use crate::buffer::{EditEvent, EditKind};
use log::{debug, trace};
use std::collections::VecDeque;
use typeassist_highlight::{EditRegion, TextSource};

/// One queued reaction to an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeferredTask {
    /// Indent the line opened by the newline at `newline`.
    AutoIndent {
        /// Offset of the typed `\n`.
        newline: usize,
    },
    /// Outdent the line holding the `}` at `brace`.
    Outdent {
        /// Offset of the typed `}`.
        brace: usize,
    },
    /// Repaint what an edit affected.
    Recolor(EditRegion),
    /// Repaint the whole document.
    RecolorAll,
}

impl DeferredTask {
    fn is_recolor(&self) -> bool {
        matches!(self, DeferredTask::Recolor(_) | DeferredTask::RecolorAll)
    }
}

/// FIFO queue of [`DeferredTask`]s.
#[derive(Debug, Clone, Default)]
pub struct TaskQueue {
    tasks: VecDeque<DeferredTask>,
}

impl TaskQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task.
    pub fn push(&mut self, task: DeferredTask) {
        self.tasks.push_back(task);
    }

    /// Queue a recolor for `event`, which has already been applied to `src`.
    ///
    /// At most one recolor is pending. A second edit before the queue drains folds into the
    /// pending region, which becomes one `Replaced` region spanning both edits. Only a pending
    /// region without edit information widens to the whole document.
    pub fn push_recolor<S: TextSource + ?Sized>(&mut self, event: &EditEvent, src: &S) {
        let Some(index) = self.tasks.iter().position(DeferredTask::is_recolor) else {
            self.tasks.push_back(DeferredTask::Recolor(event.region()));
            return;
        };
        let merged = match &self.tasks[index] {
            DeferredTask::Recolor(pending) => coalesce(pending, event, src),
            _ => None,
        };
        match merged {
            Some(region) => {
                trace!("recolor coalesced into {region:?}");
                self.tasks[index] = DeferredTask::Recolor(region);
            }
            None if self.tasks[index] != DeferredTask::RecolorAll => {
                debug!("pending recolor has no edit information, widened to the document");
                self.tasks[index] = DeferredTask::RecolorAll;
            }
            None => {}
        }
    }

    /// Iterate over the queued tasks, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &DeferredTask> {
        self.tasks.iter()
    }

    /// Take the oldest task.
    pub fn pop(&mut self) -> Option<DeferredTask> {
        self.tasks.pop_front()
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Drop every queued task.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

/// Fold `event` into `pending`, producing one region relative to the text before both.
///
/// `src` holds the text after `event`. The text `event` saw is rebuilt from `src` and the
/// removed chars, and the pending region's replaced text is spliced back into it.
fn coalesce<S: TextSource + ?Sized>(
    pending: &EditRegion,
    event: &EditEvent,
    src: &S,
) -> Option<EditRegion> {
    let (start, end, previous) = match pending {
        EditRegion::Inserted { offset, text } => {
            (*offset, offset + text.chars().count(), String::new())
        }
        EditRegion::Removed { offset, text } => (*offset, *offset, text.clone()),
        EditRegion::Replaced { range, previous } => (range.start, range.end, previous.clone()),
        EditRegion::Span(_) | EditRegion::Document => return None,
    };
    let (removed, inserted) = match event.kind {
        EditKind::Insert => ("", event.len()),
        EditKind::Remove => (event.text.as_str(), 0),
    };
    let removed_len = removed.chars().count();
    let len = src.len_chars();
    let before = (len + removed_len).checked_sub(inserted)?;
    let event_end = event.offset + removed_len;
    if start > end || end > before || event_end > before {
        return None;
    }

    let first = start.min(event.offset);
    let keep = (before - end).min(before - event_end);
    let last = len - keep;

    let mut seen = src.slice(first, event.offset);
    seen.push_str(removed);
    seen.push_str(&src.slice(event.offset + inserted, last));

    let mut replaced: String = seen.chars().take(start - first).collect();
    replaced.push_str(&previous);
    replaced.extend(seen.chars().skip(end - first));
    Some(EditRegion::Replaced {
        range: first..last,
        previous: replaced,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = TaskQueue::new();
        queue.push(DeferredTask::AutoIndent { newline: 3 });
        queue.push(DeferredTask::Outdent { brace: 9 });
        assert_eq!(queue.pop(), Some(DeferredTask::AutoIndent { newline: 3 }));
        assert_eq!(queue.pop(), Some(DeferredTask::Outdent { brace: 9 }));
        assert!(queue.pop().is_none());
    }

    use pretty_assertions::assert_eq;
    use ropey::Rope;

    #[test]
    fn test_replace_keystroke_coalesces() {
        // "abcdef" -> remove "cd" -> "abef" -> insert "x" -> "abxef"
        let mut queue = TaskQueue::new();
        queue.push_recolor(&EditEvent::removed(2, "cd"), &Rope::from_str("abef"));
        queue.push(DeferredTask::AutoIndent { newline: 0 });
        queue.push_recolor(&EditEvent::inserted(2, "x"), &Rope::from_str("abxef"));
        assert_eq!(queue.len(), 2);
        assert_eq!(
            queue.pop(),
            Some(DeferredTask::Recolor(EditRegion::Replaced {
                range: 2..3,
                previous: "cd".to_string(),
            }))
        );
        assert_eq!(queue.pop(), Some(DeferredTask::AutoIndent { newline: 0 }));
    }

    #[test]
    fn test_disjoint_edits_coalesce_into_covering_region() {
        // "0123456789" -> insert "ab" at 1 -> "0ab123456789" -> remove "67" at 8 -> "0ab1234589"
        let mut queue = TaskQueue::new();
        queue.push_recolor(&EditEvent::inserted(1, "ab"), &Rope::from_str("0ab123456789"));
        queue.push_recolor(&EditEvent::removed(8, "67"), &Rope::from_str("0ab1234589"));
        assert_eq!(
            queue.iter().collect::<Vec<_>>(),
            vec![&DeferredTask::Recolor(EditRegion::Replaced {
                range: 1..8,
                previous: "1234567".to_string(),
            })]
        );
    }

    #[test]
    fn test_edit_before_pending_region() {
        // "hello" -> replace region "ll"->"LL" pending, then insert "__" at 0
        let mut queue = TaskQueue::new();
        queue.push(DeferredTask::Recolor(EditRegion::Replaced {
            range: 2..4,
            previous: "ll".to_string(),
        }));
        queue.push_recolor(&EditEvent::inserted(0, "__"), &Rope::from_str("__heLLo"));
        assert_eq!(
            queue.pop(),
            Some(DeferredTask::Recolor(EditRegion::Replaced {
                range: 0..6,
                previous: "hell".to_string(),
            }))
        );
    }

    #[test]
    fn test_span_without_edit_information_widens_to_document() {
        let mut queue = TaskQueue::new();
        queue.push(DeferredTask::Recolor(EditRegion::Span(0..1)));
        queue.push_recolor(&EditEvent::inserted(0, "x"), &Rope::from_str("xab"));
        queue.push_recolor(&EditEvent::inserted(0, "y"), &Rope::from_str("yxab"));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop(), Some(DeferredTask::RecolorAll));
    }
}
