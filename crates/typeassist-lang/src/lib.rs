#![warn(missing_docs)]
//! `typeassist-lang` - data-driven language tables for `typeassist`.
//!
//! This crate intentionally stays lightweight and does **not** contain any lexing logic. It
//! provides the keyword sets, comment/string markers and markup tables that the highlighter and
//! indentation engine consult, plus the display [`Attribute`] vocabulary shared by every crate.

mod builtin;

use serde::{Deserialize, Serialize};

/// Display attribute painted over a run of text.
///
/// These are only identifiers. The host maps them to actual colors and font weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Attribute {
    /// Plain text.
    #[default]
    Normal,
    /// Reserved words and control flow.
    KeywordRed,
    /// Types, builtins, markup tag names.
    KeywordBlue,
    /// Line and block comments.
    Comment,
    /// String and character literals (including triple-quoted strings).
    StringLiteral,
    /// Curly braces.
    BraceBold,
    /// Parentheses and square brackets.
    BraceBlue,
    /// Sigil variables such as `$HOME`.
    Variable,
}

/// Languages with built-in tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Language {
    /// No highlighting, no indentation assistance.
    #[default]
    PlainText,
    /// Java.
    Java,
    /// C.
    C,
    /// C++.
    Cpp,
    /// JavaScript.
    #[serde(rename = "javascript")]
    JavaScript,
    /// Python.
    Python,
    /// POSIX shell.
    Shell,
    /// HTML.
    Html,
    /// XML.
    Xml,
}

impl Language {
    /// Every built-in language, in menu order.
    pub const ALL: [Language; 9] = [
        Language::PlainText,
        Language::Java,
        Language::C,
        Language::Cpp,
        Language::JavaScript,
        Language::Python,
        Language::Shell,
        Language::Html,
        Language::Xml,
    ];

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Language::PlainText => "Plain Text",
            Language::Java => "Java",
            Language::C => "C",
            Language::Cpp => "C++",
            Language::JavaScript => "JavaScript",
            Language::Python => "Python",
            Language::Shell => "Shell",
            Language::Html => "HTML",
            Language::Xml => "XML",
        }
    }

    /// Guess the language from a file extension (without the leading dot, case-insensitive).
    ///
    /// Unknown extensions map to [`Language::PlainText`].
    pub fn from_extension(ext: &str) -> Language {
        match ext.to_ascii_lowercase().as_str() {
            "java" => Language::Java,
            "c" | "h" => Language::C,
            "cc" | "cpp" | "cxx" | "hpp" | "hh" | "hxx" => Language::Cpp,
            "js" | "mjs" | "cjs" => Language::JavaScript,
            "py" | "pyw" => Language::Python,
            "sh" | "bash" | "zsh" => Language::Shell,
            "html" | "htm" | "xhtml" => Language::Html,
            "xml" | "xsd" | "xsl" | "svg" => Language::Xml,
            _ => Language::PlainText,
        }
    }
}

/// Comment tokens for a given language.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentConfig {
    /// Line comment token (e.g. `//`, `#`).
    pub line: Option<String>,
    /// Block comment start token (e.g. `/*`).
    pub block_start: Option<String>,
    /// Block comment end token (e.g. `*/`).
    pub block_end: Option<String>,
}

impl CommentConfig {
    /// No comment syntax at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// Create a config that supports only line comments.
    pub fn line(token: impl Into<String>) -> Self {
        Self {
            line: Some(token.into()),
            block_start: None,
            block_end: None,
        }
    }

    /// Create a config that supports only block comments.
    pub fn block(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            line: None,
            block_start: Some(start.into()),
            block_end: Some(end.into()),
        }
    }

    /// Create a config that supports both line and block comments.
    pub fn line_and_block(
        line: impl Into<String>,
        block_start: impl Into<String>,
        block_end: impl Into<String>,
    ) -> Self {
        Self {
            line: Some(line.into()),
            block_start: Some(block_start.into()),
            block_end: Some(block_end.into()),
        }
    }

    /// The line comment token, if configured and non-empty.
    pub fn line_token(&self) -> Option<&str> {
        self.line.as_deref().filter(|s| !s.is_empty())
    }

    /// The block comment delimiters, if both are configured and non-empty.
    pub fn block_tokens(&self) -> Option<(&str, &str)> {
        let start = self.block_start.as_deref().filter(|s| !s.is_empty())?;
        let end = self.block_end.as_deref().filter(|s| !s.is_empty())?;
        Some((start, end))
    }
}

/// A set of words painted with one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    /// Attribute applied to every word of the set.
    pub attribute: Attribute,
    /// The words.
    pub words: &'static [&'static str],
}

/// Tag and attribute vocabularies for markup languages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupTables {
    /// Tag names, colored only right after `<` or `</`.
    pub tag_names: &'static [&'static str],
    /// Attribute names, colored only inside an open `<...>` span.
    pub attribute_names: &'static [&'static str],
    /// Whether names match case-insensitively (HTML) or exactly (XML).
    pub case_insensitive: bool,
    /// Accept any well-formed name as a tag/attribute instead of the fixed vocabulary.
    pub any_name: bool,
}

/// Everything the highlighter needs to know about one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageMode {
    /// Which language these tables describe.
    pub language: Language,
    /// Keyword sets, checked in order; the first set containing a word wins.
    pub keyword_sets: Vec<KeywordSet>,
    /// Comment markers.
    pub comments: CommentConfig,
    /// Single-line string delimiters.
    pub string_delimiters: Vec<char>,
    /// Multi-line string delimiters whose open and close markers are identical (`"""`).
    pub triple_quotes: Vec<String>,
    /// Escape character inside strings.
    pub escape: char,
    /// Whether blocks are delimited by `{` / `}`.
    pub uses_curly_brackets: bool,
    /// Sigil introducing a variable name (`$` for shells).
    pub variable_sigil: Option<char>,
    /// Markup vocabulary, present only for tag-based languages.
    pub markup: Option<MarkupTables>,
}

impl LanguageMode {
    /// Built-in tables for `language`.
    pub fn for_language(language: Language) -> Self {
        builtin::mode(language)
    }

    /// Returns `true` for the plain-text mode (nothing to highlight, no indentation help).
    pub fn is_plain(&self) -> bool {
        self.language == Language::PlainText
    }

    /// Returns `true` if this is a tag-based language.
    pub fn is_markup(&self) -> bool {
        self.markup.is_some()
    }

    /// All markers that open or close a multi-line construct, without duplicates.
    pub fn block_markers(&self) -> Vec<&str> {
        let mut markers: Vec<&str> = Vec::new();
        if let Some((start, end)) = self.comments.block_tokens() {
            markers.push(start);
            markers.push(end);
        }
        for quote in &self.triple_quotes {
            markers.push(quote.as_str());
        }
        markers.dedup();
        markers
    }

    /// The attribute for `word`, if it belongs to a keyword set.
    pub fn keyword_attribute(&self, word: &str) -> Option<Attribute> {
        self.keyword_sets
            .iter()
            .find(|set| set.words.contains(&word))
            .map(|set| set.attribute)
    }
}
