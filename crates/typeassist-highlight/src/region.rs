//! Incremental region selection.
//!
//! Given one edit, decide which span of the document must be repainted so that the result is
//! identical to lexing the whole document again. The span starts at the first edited line,
//! lexed in the state the document is in at that line. It ends at the first line end after
//! the edit where the pre-edit and post-edit texts reach the same lexical state, which is the
//! edit's own last line unless a block marker was created, destroyed or touched.

use crate::lexer::{LexState, LineLexer, Lexicon, RunSink};
use crate::source::TextSource;
use crate::{EditRegion, Highlight};
use log::{debug, trace};
use std::ops::Range;

/// When lexing past the edit may stop.
#[derive(Debug, Clone, Copy)]
enum Convergence {
    /// The edit cannot change the state at its last line end.
    Settled,
    /// Stop where the pre-edit state (tracked in lockstep) matches the new state.
    Track(LexState),
    /// No pre-edit text to compare with; stop at the first line end outside any construct.
    UntilNormal,
}

fn chars_of(text: &str) -> Vec<char> {
    text.chars().collect()
}

/// Offset, post-edit length and pre-edit text of a region describing a concrete change.
fn change(region: &EditRegion) -> Option<(usize, usize, &str)> {
    match region {
        EditRegion::Inserted { offset, text } => Some((*offset, text.chars().count(), "")),
        EditRegion::Removed { offset, text } => Some((*offset, 0, text.as_str())),
        EditRegion::Replaced { range, previous } => Some((
            range.start,
            range.end.saturating_sub(range.start),
            previous.as_str(),
        )),
        EditRegion::Span(_) | EditRegion::Document => None,
    }
}

pub(crate) fn full<S: TextSource + ?Sized>(lex: &Lexicon, lexer: LineLexer, src: &S) -> Highlight {
    let mut sink = RunSink::recording();
    let mut state = LexState::Normal;
    for line in 0..src.line_count() {
        let chars = chars_of(&src.line_text(line));
        state = lexer(lex, &chars, src.line_start(line), state, &mut sink);
    }
    let runs = sink.into_runs();
    debug!(
        "full recolor of {} chars produced {} runs",
        src.len_chars(),
        runs.len()
    );
    Highlight {
        range: 0..src.len_chars(),
        runs,
    }
}

/// Lexical state at the start of `line`.
///
/// Lines without any block marker cannot change the state, so only marker lines are lexed.
pub(crate) fn state_at_line<S: TextSource + ?Sized>(
    lex: &Lexicon,
    lexer: LineLexer,
    src: &S,
    line: usize,
) -> LexState {
    if !lex.has_blocks() {
        return LexState::Normal;
    }
    let mut sink = RunSink::discarding();
    let mut state = LexState::Normal;
    for l in 0..line.min(src.line_count()) {
        let text = src.line_text(l);
        if lex.contains_marker(&text) {
            state = lexer(lex, &chars_of(&text), 0, state, &mut sink);
        }
    }
    state
}

/// Whether `region` created or destroyed a block marker at its edit point.
///
/// Compares marker counts in a window around the edit before and after it, so markers split
/// or completed by the edit are caught along with markers inside the edited text itself.
pub(crate) fn boundary_toggled<S: TextSource + ?Sized>(
    lex: &Lexicon,
    src: &S,
    region: &EditRegion,
) -> bool {
    if !lex.has_blocks() {
        return false;
    }
    let Some((offset, inserted, removed)) = change(region) else {
        return false;
    };
    let reach = lex.longest_marker().saturating_sub(1);
    let left = src.slice(offset.saturating_sub(reach), offset);
    let middle = src.slice(offset, offset + inserted);
    let right = src.slice(offset + inserted, offset + inserted + reach);
    let before = format!("{left}{removed}{right}");
    let after = format!("{left}{middle}{right}");
    lex.markers()
        .iter()
        .any(|m| before.matches(m.as_str()).count() != after.matches(m.as_str()).count())
}

pub(crate) fn lines_touch_blocks<S: TextSource + ?Sized>(
    lex: &Lexicon,
    src: &S,
    mut lines: Range<usize>,
) -> bool {
    lex.has_blocks() && lines.any(|l| lex.contains_marker(&src.line_text(l)))
}

/// Post-edit char span of `region`, clamped to the document.
fn edit_span(region: &EditRegion, len: usize) -> (usize, usize) {
    let (start, end) = match change(region) {
        Some((offset, inserted, _)) => (offset, offset + inserted),
        None => match region {
            EditRegion::Span(range) => (range.start, range.end.max(range.start)),
            _ => (0, len),
        },
    };
    (start.min(len), end.min(len))
}

/// Whether the source still holds what `region` claims was just inserted or removed.
fn region_is_current<S: TextSource + ?Sized>(src: &S, region: &EditRegion) -> bool {
    match region {
        EditRegion::Inserted { offset, text } => {
            src.slice(*offset, offset + text.chars().count()) == *text
        }
        EditRegion::Removed { offset, .. } => *offset <= src.len_chars(),
        EditRegion::Replaced { range, .. } => range.start <= range.end && range.end <= src.len_chars(),
        EditRegion::Span(_) | EditRegion::Document => true,
    }
}

/// State at the end of the edited lines as they read before the edit.
fn pre_edit_state<S: TextSource + ?Sized>(
    lex: &Lexicon,
    lexer: LineLexer,
    src: &S,
    region: &EditRegion,
    lines: Range<usize>,
    state: LexState,
) -> LexState {
    let start = src.line_start(lines.start);
    let end = src.line_end(lines.end - 1);
    let text = match change(region) {
        Some((offset, inserted, previous)) => format!(
            "{}{}{}",
            src.slice(start, offset),
            previous,
            src.slice(offset + inserted, end)
        ),
        None => src.slice(start, end),
    };
    let mut sink = RunSink::discarding();
    text.split('\n').fold(state, |state, line| {
        lexer(lex, &chars_of(line), 0, state, &mut sink)
    })
}

pub(crate) fn incremental<S: TextSource + ?Sized>(
    lex: &Lexicon,
    lexer: LineLexer,
    src: &S,
    region: &EditRegion,
) -> Highlight {
    if matches!(region, EditRegion::Document) || !region_is_current(src, region) {
        return full(lex, lexer, src);
    }

    let (edit_start, edit_end) = edit_span(region, src.len_chars());
    let first = src.line_of(edit_start);
    let last = src.line_of(edit_end);
    let start = src.line_start(first);
    let entry = state_at_line(lex, lexer, src, first);

    let mut convergence = match region {
        EditRegion::Span(_) => Convergence::UntilNormal,
        _ if boundary_toggled(lex, src, region) || lines_touch_blocks(lex, src, first..last + 1) => {
            Convergence::Track(pre_edit_state(lex, lexer, src, region, first..last + 1, entry))
        }
        _ => Convergence::Settled,
    };
    trace!("recolor from line {first} in {entry:?}, convergence {convergence:?}");

    let mut sink = RunSink::recording();
    let mut discard = RunSink::discarding();
    let mut state = entry;
    for line in first..=last {
        let chars = chars_of(&src.line_text(line));
        state = lexer(lex, &chars, src.line_start(line), state, &mut sink);
    }

    let mut line = last;
    loop {
        let settled = match convergence {
            Convergence::Settled => true,
            Convergence::Track(old) => old == state,
            Convergence::UntilNormal => state == LexState::Normal,
        };
        if settled || line + 1 >= src.line_count() {
            break;
        }
        line += 1;
        let chars = chars_of(&src.line_text(line));
        state = lexer(lex, &chars, src.line_start(line), state, &mut sink);
        if let Convergence::Track(old) = &mut convergence {
            *old = lexer(lex, &chars, 0, *old, &mut discard);
        }
    }

    let end = src.line_end(line);
    if line > last {
        trace!("recolor extended to line {line}");
    }
    Highlight {
        range: start..end,
        runs: sink.into_runs(),
    }
}
