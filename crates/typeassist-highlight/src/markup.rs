//! Line lexer for tag-based languages.
//!
//! Tag names are colored only right after `<` or `</`, attribute names and quoted values only
//! inside an open `<...>` span. Tag context is judged within the current line.

use crate::lexer::{LexState, Lexicon, RunSink, is_escaped, lex_code_line};
use typeassist_lang::{Attribute, MarkupTables};

pub(crate) fn lex_markup_line(
    lex: &Lexicon,
    line: &[char],
    base: usize,
    mut state: LexState,
    sink: &mut RunSink,
) -> LexState {
    let Some(tables) = &lex.mode.markup else {
        return lex_code_line(lex, line, base, state, sink);
    };

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

        let c = line[i];
        if c == '<' {
            let mut name_start = i + 1;
            if matches!(line.get(name_start), Some('/' | '?' | '!')) {
                name_start += 1;
            }
            let end = name_end(line, name_start);
            if end > name_start && name_matches(tables, tables.tag_names, &line[name_start..end]) {
                sink.push(base + name_start, base + end, Attribute::KeywordBlue);
            }
            i = end.max(i + 1);
            continue;
        }
        if is_name_start(c) {
            let end = name_end(line, i);
            if inside_open_tag(line, i)
                && name_matches(tables, tables.attribute_names, &line[i..end])
            {
                sink.push(base + i, base + end, Attribute::KeywordRed);
            }
            i = end;
            continue;
        }
        if lex.mode.string_delimiters.contains(&c)
            && !is_escaped(line, i, lex.mode.escape)
            && inside_open_tag(line, i)
        {
            i = lex.string_at(line, base, i, c, sink);
            continue;
        }
        i += 1;
    }
    state
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn name_end(line: &[char], from: usize) -> usize {
    let mut j = from;
    if !line.get(j).is_some_and(|&c| is_name_start(c)) {
        return j;
    }
    while j < line.len() && (line[j].is_alphanumeric() || matches!(line[j], '_' | '-' | ':' | '.')) {
        j += 1;
    }
    j
}

fn name_matches(tables: &MarkupTables, vocabulary: &[&str], name: &[char]) -> bool {
    if tables.any_name {
        return true;
    }
    let name: String = name.iter().collect();
    vocabulary.iter().any(|word| {
        if tables.case_insensitive {
            word.eq_ignore_ascii_case(&name)
        } else {
            *word == name
        }
    })
}

/// `i` lies after an unclosed `<` on this line, and no new `<` starts before the next `>`.
fn inside_open_tag(line: &[char], i: usize) -> bool {
    let opened = line[..i]
        .iter()
        .rev()
        .find(|&&c| c == '<' || c == '>')
        .is_some_and(|&c| c == '<');
    opened
        && line[i..]
            .iter()
            .find(|&&c| c == '<' || c == '>')
            .is_none_or(|&c| c == '>')
}
