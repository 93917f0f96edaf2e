//! Line lexer for code languages, plus the marker helpers shared with the markup lexer.

use crate::StyledRun;
use typeassist_lang::{Attribute, LanguageMode};

/// Lexical state carried from the end of one line to the start of the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LexState {
    Normal,
    BlockComment,
    /// Inside a triple-quoted string; the index selects the closing quote.
    TripleQuote(usize),
}

/// Collects styled runs, merging adjacent runs of the same attribute.
#[derive(Debug)]
pub(crate) struct RunSink {
    runs: Vec<StyledRun>,
    record: bool,
}

impl RunSink {
    pub(crate) fn recording() -> Self {
        Self {
            runs: Vec::new(),
            record: true,
        }
    }

    /// A sink that only lets the lexer advance its state.
    pub(crate) fn discarding() -> Self {
        Self {
            runs: Vec::new(),
            record: false,
        }
    }

    pub(crate) fn push(&mut self, start: usize, end: usize, attribute: Attribute) {
        if !self.record || end <= start || attribute == Attribute::Normal {
            return;
        }
        if let Some(last) = self.runs.last_mut()
            && last.attribute == attribute
            && last.end() == start
        {
            last.length += end - start;
            return;
        }
        self.runs.push(StyledRun {
            start,
            length: end - start,
            attribute,
        });
    }

    pub(crate) fn into_runs(self) -> Vec<StyledRun> {
        self.runs
    }
}

/// Lexes one line (without its `\n`) whose first character sits at document offset `base`.
pub(crate) type LineLexer = fn(&Lexicon, &[char], usize, LexState, &mut RunSink) -> LexState;

/// A [`LanguageMode`] with its markers pre-split into chars.
#[derive(Debug, Clone)]
pub(crate) struct Lexicon {
    pub(crate) mode: LanguageMode,
    line_comment: Option<Vec<char>>,
    block: Option<(Vec<char>, Vec<char>)>,
    triples: Vec<Vec<char>>,
    markers: Vec<String>,
}

impl Lexicon {
    pub(crate) fn new(mode: LanguageMode) -> Self {
        let line_comment = mode.comments.line_token().map(|t| t.chars().collect());
        let block = mode
            .comments
            .block_tokens()
            .map(|(open, close)| (open.chars().collect(), close.chars().collect()));
        let triples = mode.triple_quotes.iter().map(|q| q.chars().collect()).collect();
        let markers = mode.block_markers().into_iter().map(str::to_string).collect();
        Self {
            mode,
            line_comment,
            block,
            triples,
            markers,
        }
    }

    /// Every marker that opens or closes a multi-line construct.
    pub(crate) fn markers(&self) -> &[String] {
        &self.markers
    }

    pub(crate) fn has_blocks(&self) -> bool {
        !self.markers.is_empty()
    }

    pub(crate) fn contains_marker(&self, text: &str) -> bool {
        self.markers.iter().any(|m| text.contains(m.as_str()))
    }

    pub(crate) fn longest_marker(&self) -> usize {
        self.markers
            .iter()
            .map(|m| m.chars().count())
            .max()
            .unwrap_or(0)
    }

    pub(crate) fn line_comment_at(&self, line: &[char], i: usize) -> bool {
        self.line_comment
            .as_deref()
            .is_some_and(|marker| matches_at(line, i, marker))
    }

    /// Advance through an open multi-line construct starting at `i`.
    ///
    /// Returns the index where lexing resumes and the state after the close marker (or at the end
    /// of the line when the construct stays open).
    pub(crate) fn continue_block(
        &self,
        line: &[char],
        base: usize,
        i: usize,
        state: LexState,
        sink: &mut RunSink,
    ) -> (usize, LexState) {
        let (close, attribute, escaped) = match state {
            LexState::Normal => return (i, state),
            LexState::BlockComment => match &self.block {
                Some((_, close)) => (close, Attribute::Comment, false),
                None => return (line.len(), LexState::Normal),
            },
            LexState::TripleQuote(q) => match self.triples.get(q) {
                Some(quote) => (quote, Attribute::StringLiteral, true),
                None => return (line.len(), LexState::Normal),
            },
        };
        let found = if escaped {
            find_unescaped(line, i, close, self.mode.escape)
        } else {
            find_marker(line, i, close)
        };
        match found {
            Some(j) => {
                let end = j + close.len();
                sink.push(base + i, base + end, attribute);
                (end, LexState::Normal)
            }
            None => {
                sink.push(base + i, base + line.len(), attribute);
                (line.len(), state)
            }
        }
    }

    /// Open a multi-line construct if one starts at `i`.
    pub(crate) fn open_block_at(
        &self,
        line: &[char],
        base: usize,
        i: usize,
        sink: &mut RunSink,
    ) -> Option<(usize, LexState)> {
        if let Some(q) = self.triples.iter().position(|t| matches_at(line, i, t))
            && !is_escaped(line, i, self.mode.escape)
        {
            let end = i + self.triples[q].len();
            sink.push(base + i, base + end, Attribute::StringLiteral);
            return Some((end, LexState::TripleQuote(q)));
        }
        if let Some((open, _)) = &self.block
            && matches_at(line, i, open)
        {
            let end = i + open.len();
            sink.push(base + i, base + end, Attribute::Comment);
            return Some((end, LexState::BlockComment));
        }
        None
    }

    /// Paint a single-line string opened by `quote` at `i`; returns the index past it.
    pub(crate) fn string_at(
        &self,
        line: &[char],
        base: usize,
        i: usize,
        quote: char,
        sink: &mut RunSink,
    ) -> usize {
        let end = (i + 1..line.len())
            .find(|&j| line[j] == quote && !is_escaped(line, j, self.mode.escape))
            .map_or(line.len(), |j| j + 1);
        sink.push(base + i, base + end, Attribute::StringLiteral);
        end
    }
}

pub(crate) fn matches_at(line: &[char], i: usize, marker: &[char]) -> bool {
    !marker.is_empty() && line.get(i..i + marker.len()) == Some(marker)
}

/// A character is escaped when an odd number of escape characters precede it.
pub(crate) fn is_escaped(line: &[char], i: usize, escape: char) -> bool {
    line[..i.min(line.len())]
        .iter()
        .rev()
        .take_while(|&&c| c == escape)
        .count()
        % 2
        == 1
}

fn find_marker(line: &[char], from: usize, marker: &[char]) -> Option<usize> {
    (from..line.len()).find(|&j| matches_at(line, j, marker))
}

fn find_unescaped(line: &[char], from: usize, marker: &[char], escape: char) -> Option<usize> {
    (from..line.len()).find(|&j| matches_at(line, j, marker) && !is_escaped(line, j, escape))
}

pub(crate) fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

pub(crate) fn word_end(line: &[char], from: usize) -> usize {
    (from..line.len())
        .find(|&j| !(line[j].is_alphanumeric() || line[j] == '_'))
        .unwrap_or(line.len())
}

pub(crate) fn lex_code_line(
    lex: &Lexicon,
    line: &[char],
    base: usize,
    mut state: LexState,
    sink: &mut RunSink,
) -> LexState {
    let mode = &lex.mode;
    let mut i = 0;
    while i < line.len() {
        if state != LexState::Normal {
            (i, state) = lex.continue_block(line, base, i, state, sink);
            continue;
        }
        if let Some((next, opened)) = lex.open_block_at(line, base, i, sink) {
            i = next;
            state = opened;
            continue;
        }
        if lex.line_comment_at(line, i) {
            sink.push(base + i, base + line.len(), Attribute::Comment);
            break;
        }

        let c = line[i];
        if mode.string_delimiters.contains(&c) && !is_escaped(line, i, mode.escape) {
            i = lex.string_at(line, base, i, c, sink);
            continue;
        }
        if Some(c) == mode.variable_sigil
            && line.get(i + 1).is_some_and(|&next| is_word_start(next))
        {
            let end = word_end(line, i + 1);
            sink.push(base + i, base + end, Attribute::Variable);
            i = end;
            continue;
        }
        if is_word_start(c) {
            let end = word_end(line, i);
            let word: String = line[i..end].iter().collect();
            if let Some(attribute) = mode.keyword_attribute(&word) {
                sink.push(base + i, base + end, attribute);
            }
            i = end;
            continue;
        }
        if c.is_ascii_digit() {
            i = word_end(line, i);
            continue;
        }
        match c {
            '{' | '}' if mode.uses_curly_brackets => {
                sink.push(base + i, base + i + 1, Attribute::BraceBold)
            }
            '(' | ')' | '[' | ']' => sink.push(base + i, base + i + 1, Attribute::BraceBlue),
            _ => {}
        }
        i += 1;
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use typeassist_lang::Language;

    fn lex(language: Language, text: &str, state: LexState) -> (Vec<StyledRun>, LexState) {
        let lexicon = Lexicon::new(LanguageMode::for_language(language));
        let chars: Vec<char> = text.chars().collect();
        let mut sink = RunSink::recording();
        let end = lex_code_line(&lexicon, &chars, 0, state, &mut sink);
        (sink.into_runs(), end)
    }

    fn run(start: usize, length: usize, attribute: Attribute) -> StyledRun {
        StyledRun {
            start,
            length,
            attribute,
        }
    }

    #[test]
    fn test_keywords_and_braces() {
        let (runs, state) = lex(Language::Java, "while (x) {", LexState::Normal);
        assert_eq!(state, LexState::Normal);
        assert_eq!(
            runs,
            vec![
                run(0, 5, Attribute::KeywordRed),
                run(6, 1, Attribute::BraceBlue),
                run(8, 1, Attribute::BraceBlue),
                run(10, 1, Attribute::BraceBold),
            ]
        );
    }

    #[test]
    fn test_escaped_quote_stays_inside_string() {
        let text = r#"say "a \" b" end;"#;
        let (runs, _) = lex(Language::Java, text, LexState::Normal);
        assert_eq!(runs, vec![run(4, 8, Attribute::StringLiteral)]);
    }

    #[test]
    fn test_double_backslash_does_not_escape() {
        let text = r#"x = "a\\" + y"#;
        let (runs, _) = lex(Language::JavaScript, text, LexState::Normal);
        assert_eq!(runs, vec![run(4, 5, Attribute::StringLiteral)]);
    }

    #[test]
    fn test_unterminated_string_ends_at_line_end() {
        let (runs, state) = lex(Language::C, "a = \"open", LexState::Normal);
        assert_eq!(runs, vec![run(4, 5, Attribute::StringLiteral)]);
        assert_eq!(state, LexState::Normal);
    }

    #[test]
    fn test_block_comment_spans_lines() {
        let (runs, state) = lex(Language::C, "int x; /* start", LexState::Normal);
        assert_eq!(state, LexState::BlockComment);
        assert_eq!(runs.last(), Some(&run(7, 8, Attribute::Comment)));

        let (runs, state) = lex(Language::C, "end */ int", LexState::BlockComment);
        assert_eq!(state, LexState::Normal);
        assert_eq!(
            runs,
            vec![run(0, 6, Attribute::Comment), run(7, 3, Attribute::KeywordBlue)]
        );
    }

    #[test]
    fn test_line_comment_hides_block_marker() {
        let (runs, state) = lex(Language::Java, "x // no /* here", LexState::Normal);
        assert_eq!(state, LexState::Normal);
        assert_eq!(runs, vec![run(2, 13, Attribute::Comment)]);
    }

    #[test]
    fn test_marker_inside_string_is_inert() {
        let (_, state) = lex(Language::Java, "s = \"/*\";", LexState::Normal);
        assert_eq!(state, LexState::Normal);
    }

    #[test]
    fn test_python_triple_quotes() {
        let (runs, state) = lex(Language::Python, "x = \"\"\"doc", LexState::Normal);
        assert_eq!(state, LexState::TripleQuote(0));
        assert_eq!(runs, vec![run(4, 6, Attribute::StringLiteral)]);

        // A single-quote triple does not close a double-quote triple.
        let (_, state) = lex(Language::Python, "still ''' open", LexState::TripleQuote(0));
        assert_eq!(state, LexState::TripleQuote(0));

        let (_, state) = lex(Language::Python, "done\"\"\" x", LexState::TripleQuote(0));
        assert_eq!(state, LexState::Normal);
    }

    #[test]
    fn test_shell_variables() {
        let (runs, _) = lex(Language::Shell, "echo $HOME # note", LexState::Normal);
        assert_eq!(
            runs,
            vec![
                run(0, 4, Attribute::KeywordBlue),
                run(5, 5, Attribute::Variable),
                run(11, 6, Attribute::Comment),
            ]
        );
    }

    #[test]
    fn test_identifier_containing_keyword_is_plain() {
        let (runs, _) = lex(Language::Java, "whilex iffy", LexState::Normal);
        assert!(runs.is_empty());
    }

    #[test]
    fn test_is_escaped() {
        let line: Vec<char> = r#"a\"b\\"c"#.chars().collect();
        assert!(is_escaped(&line, 2, '\\'));
        assert!(!is_escaped(&line, 6, '\\'));
        assert!(!is_escaped(&line, 0, '\\'));
    }
}
