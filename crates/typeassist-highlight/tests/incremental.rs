use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ropey::Rope;
use std::iter;
use typeassist_highlight::{Attribute, EditRegion, Highlight, Highlighter, Language, TextSource};

/// A document plus the attributes painted on it, kept up to date edit by edit.
struct Painted {
    rope: Rope,
    attributes: Vec<Attribute>,
    highlighter: Highlighter,
}

impl Painted {
    fn new(language: Language, text: &str) -> Self {
        let rope = Rope::from_str(text);
        let attributes = vec![Attribute::Normal; rope.len_chars()];
        let mut painted = Self {
            rope,
            attributes,
            highlighter: Highlighter::for_language(language),
        };
        let highlight = painted.highlighter.highlight_all(&painted.rope);
        painted.apply(&highlight);
        painted
    }

    fn apply(&mut self, highlight: &Highlight) {
        for attribute in &mut self.attributes[highlight.range.clone()] {
            *attribute = Attribute::Normal;
        }
        for run in &highlight.runs {
            for attribute in &mut self.attributes[run.start..run.end()] {
                *attribute = run.attribute;
            }
        }
    }

    fn insert(&mut self, offset: usize, text: &str) -> Highlight {
        let count = text.chars().count();
        self.rope.insert(offset, text);
        self.attributes
            .splice(offset..offset, iter::repeat_n(Attribute::Normal, count));
        let region = EditRegion::Inserted {
            offset,
            text: text.to_string(),
        };
        let highlight = self.highlighter.highlight(&self.rope, &region);
        self.apply(&highlight);
        highlight
    }

    fn remove(&mut self, start: usize, end: usize) -> Highlight {
        let text = self.rope.slice(start..end).to_string();
        self.rope.remove(start..end);
        self.attributes.drain(start..end);
        let region = EditRegion::Removed {
            offset: start,
            text,
        };
        let highlight = self.highlighter.highlight(&self.rope, &region);
        self.apply(&highlight);
        highlight
    }

    fn from_scratch(&self) -> Vec<Attribute> {
        Painted::new(self.highlighter.language(), &self.rope.to_string()).attributes
    }

    fn attribute_of(&self, needle: &str) -> Attribute {
        let text = self.rope.to_string();
        let byte = text.find(needle).expect("needle present");
        self.attributes[text[..byte].chars().count()]
    }
}

#[test]
fn test_escaped_quote_does_not_end_string() {
    let doc = Painted::new(Language::Java, "say \"a \\\" b\" end;\nint x;");
    assert_eq!(doc.attribute_of("b\""), Attribute::StringLiteral);
    assert_eq!(doc.attribute_of("end"), Attribute::Normal);
    assert_eq!(doc.attribute_of("int"), Attribute::KeywordBlue);
}

#[test]
fn test_plain_edit_repaints_only_its_line() {
    let mut doc = Painted::new(Language::Java, "int a;\n/* c */\nint b;\nint c;");
    let line_start = doc.rope.line_to_char(2);
    let highlight = doc.insert(line_start + 3, "x");
    assert_eq!(highlight.range, doc.rope.line_to_char(2)..doc.rope.line_end(2));
    assert_eq!(doc.attributes, doc.from_scratch());
}

#[test]
fn test_typing_inside_comment_stays_on_its_line() {
    let text = "/* one\ntwo\nthree */\nint x;";
    let mut doc = Painted::new(Language::C, text);
    let highlight = doc.insert(doc.rope.line_to_char(1) + 1, "w");
    assert_eq!(highlight.range, doc.rope.line_to_char(1)..doc.rope.line_end(1));
    assert_eq!(highlight.runs.len(), 1);
    assert_eq!(highlight.runs[0].attribute, Attribute::Comment);
    assert_eq!(doc.attributes, doc.from_scratch());
}

#[test]
fn test_opening_marker_recolors_to_the_next_close() {
    let text = "int a;\nint b;\nint c; */\nint d;";
    let mut doc = Painted::new(Language::C, text);
    assert_eq!(doc.attribute_of("int b"), Attribute::KeywordBlue);

    let highlight = doc.insert(0, "/*");
    assert_eq!(doc.attribute_of("int b"), Attribute::Comment);
    assert_eq!(doc.attribute_of("int d"), Attribute::KeywordBlue);
    assert_eq!(highlight.range.end, doc.rope.line_end(2));
    assert_eq!(doc.attributes, doc.from_scratch());
}

#[test]
fn test_closing_marker_ends_comment_and_nothing_past_it() {
    let text = "/* open\nint a;\nint b;\nint c;";
    let mut doc = Painted::new(Language::Java, text);
    assert_eq!(doc.attribute_of("int c"), Attribute::Comment);

    let at = doc.rope.line_to_char(1) + "int a;".len();
    doc.insert(at, " */");
    assert_eq!(doc.attribute_of("int a"), Attribute::Comment);
    assert_eq!(doc.attribute_of("*/"), Attribute::Comment);
    assert_eq!(doc.attribute_of("int b"), Attribute::KeywordBlue);
    assert_eq!(doc.attribute_of("int c"), Attribute::KeywordBlue);
    assert_eq!(doc.attributes, doc.from_scratch());
}

#[test]
fn test_removing_close_marker_reopens_comment() {
    let text = "/* a */\nint b;\n/* c */\nint d;";
    let mut doc = Painted::new(Language::C, text);
    doc.remove(5, 7);
    assert_eq!(doc.attribute_of("int b"), Attribute::Comment);
    assert_eq!(doc.attribute_of("int d"), Attribute::KeywordBlue);
    assert_eq!(doc.attributes, doc.from_scratch());
}

#[test]
fn test_quote_hiding_open_marker() {
    let text = "x = /* y\nint z;\n*/ int w;";
    let mut doc = Painted::new(Language::Java, text);
    assert_eq!(doc.attribute_of("int z"), Attribute::Comment);

    // A quote before the marker swallows it into a string.
    doc.insert(4, "\"");
    assert_eq!(doc.attribute_of("int z"), Attribute::KeywordBlue);
    assert_eq!(doc.attributes, doc.from_scratch());

    doc.remove(4, 5);
    assert_eq!(doc.attribute_of("int z"), Attribute::Comment);
    assert_eq!(doc.attributes, doc.from_scratch());
}

#[test]
fn test_triple_quote_flips_rest_of_document() {
    let text = "a = 1\nb = \"\"\"doc\"\"\"\nif x:\n    pass";
    let mut doc = Painted::new(Language::Python, text);
    assert_eq!(doc.attribute_of("if"), Attribute::KeywordRed);

    let highlight = doc.insert(0, "'''");
    assert_eq!(doc.attribute_of("if"), Attribute::StringLiteral);
    assert_eq!(highlight.range.end, doc.rope.len_chars());
    assert_eq!(doc.attributes, doc.from_scratch());
}

#[test]
fn test_markup_context() {
    let text = "<div class=\"a\">class</div>\n<!-- <p> -->\n<span id=x>";
    let doc = Painted::new(Language::Html, text);
    assert_eq!(doc.attribute_of("div"), Attribute::KeywordBlue);
    assert_eq!(doc.attribute_of("class="), Attribute::KeywordRed);
    assert_eq!(doc.attribute_of("class<"), Attribute::Normal);
    assert_eq!(doc.attribute_of("<p>"), Attribute::Comment);
    assert_eq!(doc.attribute_of("id="), Attribute::KeywordRed);
}

#[test]
fn test_highlight_is_idempotent() {
    let text = "/* a\n b */ int main() { return \"s\"; }\n// end";
    let rope = Rope::from_str(text);
    let highlighter = Highlighter::for_language(Language::C);
    let first = highlighter.highlight_all(&rope);
    let second = highlighter.highlight_all(&rope);
    assert_eq!(first, second);

    let mut doc = Painted::new(Language::C, text);
    let before = doc.attributes.clone();
    let highlight = doc.highlighter.highlight(&doc.rope, &EditRegion::Span(5..9));
    doc.apply(&highlight);
    assert_eq!(doc.attributes, before);
}

fn random_session(language: Language, seed: u64, pieces: &[&str], steps: usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut doc = Painted::new(language, "");
    for step in 0..steps {
        let len = doc.rope.len_chars();
        if len > 0 && rng.gen_bool(0.35) {
            let start = rng.gen_range(0..len);
            let end = (start + rng.gen_range(1..=4)).min(len);
            doc.remove(start, end);
        } else {
            let offset = rng.gen_range(0..=len);
            let piece = pieces[rng.gen_range(0..pieces.len())];
            doc.insert(offset, piece);
        }
        assert_eq!(
            doc.attributes,
            doc.from_scratch(),
            "step {step} diverged on {:?}",
            doc.rope.to_string()
        );
    }
}

#[test]
fn test_random_edits_match_full_highlight_java() {
    let pieces = [
        "a", " ", "\n", "/", "*", "/*", "*/", "//", "\"", "\\", "'", "{", "}", "(", "int", "while",
    ];
    for seed in 0..8 {
        random_session(Language::Java, seed, &pieces, 250);
    }
}

#[test]
fn test_random_edits_match_full_highlight_python() {
    let pieces = [
        "a", " ", "\n", "\"", "'", "\"\"\"", "'''", "#", "\\", "def", "(", ")",
    ];
    for seed in 0..8 {
        random_session(Language::Python, seed, &pieces, 250);
    }
}

#[test]
fn test_random_edits_match_full_highlight_html() {
    let pieces = [
        "<", ">", "/", "!", "-", "<!--", "-->", "\"", "=", " ", "\n", "div", "class", "x",
    ];
    for seed in 0..8 {
        random_session(Language::Html, seed, &pieces, 250);
    }
}
