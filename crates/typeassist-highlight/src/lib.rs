#![warn(missing_docs)]
//! `typeassist-highlight` - incremental, block-aware lexical highlighting.
//!
//! A [`Highlighter`] is a pure function of the document text and an [`EditRegion`]: it reports
//! which span must be repainted and the styled runs inside it. Callers reset the span to
//! [`Attribute::Normal`] and then paint the runs. Painting only the reported span after every
//! edit yields the same attributes as highlighting the whole document from scratch.
//!
//! Lexing is line based. The only state that crosses a line break is being inside a block
//! comment or a triple-quoted string; everything else (strings, line comments, markup tag
//! context) ends at the line end.

mod lexer;
mod markup;
mod region;
mod source;

pub use source::TextSource;
pub use typeassist_lang::{Attribute, Language, LanguageMode};

use lexer::{LineLexer, Lexicon, lex_code_line};
use markup::lex_markup_line;
use std::ops::Range;

/// A run of characters sharing one display attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StyledRun {
    /// Char offset of the first character.
    pub start: usize,
    /// Length in chars.
    pub length: usize,
    /// Attribute to paint.
    pub attribute: Attribute,
}

impl StyledRun {
    /// Char offset just past the run.
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// The output of one highlighting pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Highlight {
    /// Span to reset to [`Attribute::Normal`] before painting `runs`.
    pub range: Range<usize>,
    /// Non-normal runs inside `range`, sorted and non-overlapping.
    pub runs: Vec<StyledRun>,
}

impl Highlight {
    /// The attribute this pass assigns to `offset`, or `None` outside [`range`](Self::range).
    pub fn attribute_at(&self, offset: usize) -> Option<Attribute> {
        if !self.range.contains(&offset) {
            return None;
        }
        let attribute = self
            .runs
            .iter()
            .find(|run| run.start <= offset && offset < run.end())
            .map_or(Attribute::Normal, |run| run.attribute);
        Some(attribute)
    }
}

/// What changed since the document was last highlighted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditRegion {
    /// `text` was inserted at `offset` and is present in the source.
    Inserted {
        /// Char offset of the insertion.
        offset: usize,
        /// The inserted text.
        text: String,
    },
    /// `text` was removed at `offset` and is gone from the source.
    Removed {
        /// Char offset of the removal.
        offset: usize,
        /// The removed text.
        text: String,
    },
    /// The text now in `range` replaced `previous`.
    Replaced {
        /// Char range of the new text.
        range: Range<usize>,
        /// The text it replaced.
        previous: String,
    },
    /// Repaint the lines covering a char range without edit information.
    Span(Range<usize>),
    /// Repaint everything.
    Document,
}

#[derive(Debug, Clone)]
enum Strategy {
    Plain,
    Code(Lexicon),
    Markup(Lexicon),
}

/// Per-language highlighting strategy.
#[derive(Debug, Clone)]
pub struct Highlighter {
    language: Language,
    strategy: Strategy,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::for_language(Language::PlainText)
    }
}

impl Highlighter {
    /// Highlighter with the built-in tables for `language`.
    pub fn for_language(language: Language) -> Self {
        Self::for_mode(LanguageMode::for_language(language))
    }

    /// Highlighter for custom language tables.
    pub fn for_mode(mode: LanguageMode) -> Self {
        let language = mode.language;
        let strategy = if mode.is_plain() {
            Strategy::Plain
        } else if mode.is_markup() {
            Strategy::Markup(Lexicon::new(mode))
        } else {
            Strategy::Code(Lexicon::new(mode))
        };
        Self { language, strategy }
    }

    /// The language this highlighter was built for.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Returns `true` when this highlighter never paints anything.
    pub fn is_plain(&self) -> bool {
        matches!(self.strategy, Strategy::Plain)
    }

    fn lexer(&self) -> Option<(&Lexicon, LineLexer)> {
        match &self.strategy {
            Strategy::Plain => None,
            Strategy::Code(lex) => Some((lex, lex_code_line as LineLexer)),
            Strategy::Markup(lex) => Some((lex, lex_markup_line as LineLexer)),
        }
    }

    /// Compute the repaint span and runs for `region` against the current text in `src`.
    ///
    /// A region that no longer matches the source (inserted text missing, range past the end)
    /// falls back to a whole-document pass.
    pub fn highlight<S: TextSource + ?Sized>(&self, src: &S, region: &EditRegion) -> Highlight {
        match self.lexer() {
            Some((lex, lexer)) => region::incremental(lex, lexer, src, region),
            None => Highlight {
                range: plain_range(src, region),
                runs: Vec::new(),
            },
        }
    }

    /// Highlight the whole document.
    pub fn highlight_all<S: TextSource + ?Sized>(&self, src: &S) -> Highlight {
        self.highlight(src, &EditRegion::Document)
    }

    /// Whether `text` contains a marker that opens or closes a multi-line construct.
    pub fn crosses_block_boundary(&self, text: &str) -> bool {
        self.lexer().is_some_and(|(lex, _)| lex.contains_marker(text))
    }

    /// Whether applying `region` created or destroyed a block marker at its edit point.
    pub fn boundary_toggled<S: TextSource + ?Sized>(&self, src: &S, region: &EditRegion) -> bool {
        self.lexer()
            .is_some_and(|(lex, _)| region::boundary_toggled(lex, src, region))
    }
}

fn plain_range<S: TextSource + ?Sized>(src: &S, region: &EditRegion) -> Range<usize> {
    let len = src.len_chars();
    let (start, end) = match region {
        EditRegion::Inserted { offset, text } => (*offset, offset + text.chars().count()),
        EditRegion::Removed { offset, .. } => (*offset, *offset),
        EditRegion::Replaced { range, .. } | EditRegion::Span(range) => {
            (range.start, range.end.max(range.start))
        }
        EditRegion::Document => return 0..len,
    };
    let first = src.line_of(start.min(len));
    let last = src.line_of(end.min(len));
    src.line_start(first)..src.line_end(last)
}
