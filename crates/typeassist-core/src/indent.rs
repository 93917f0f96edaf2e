//! Brace-aware auto-indentation.
//!
//! All computations read the buffer and return the edits to apply; the mediator applies them
//! as follow-up edits so they join the keystroke's undo unit.

use crate::error::SettingsError;
use std::ops::Range;
use typeassist_highlight::TextSource;

/// Returns `true` if `unit` is non-empty and made only of spaces or only of tabs.
pub fn is_valid_indent_unit(unit: &str) -> bool {
    !unit.is_empty() && (unit.chars().all(|c| c == ' ') || unit.chars().all(|c| c == '\t'))
}

/// Indentation settings for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentContext {
    unit: String,
    tab_width: usize,
    curly_bracket_mode: bool,
}

impl Default for IndentContext {
    fn default() -> Self {
        Self {
            unit: "    ".to_string(),
            tab_width: 4,
            curly_bracket_mode: true,
        }
    }
}

impl IndentContext {
    /// Create a context; the unit must be all spaces or all tabs.
    pub fn new(
        unit: impl Into<String>,
        tab_width: usize,
        curly_bracket_mode: bool,
    ) -> Result<Self, SettingsError> {
        let unit = unit.into();
        if !is_valid_indent_unit(&unit) {
            return Err(SettingsError::InvalidIndentUnit(unit));
        }
        Ok(Self {
            unit,
            tab_width: tab_width.max(1),
            curly_bracket_mode,
        })
    }

    /// The literal text of one indent level.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Whether generated indentation uses tabs (derived from the unit).
    pub fn use_tabs(&self) -> bool {
        self.unit.starts_with('\t')
    }

    /// Columns per tab stop.
    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Whether `{` / `}` drive indentation.
    pub fn curly_bracket_mode(&self) -> bool {
        self.curly_bracket_mode
    }

    /// The same context with `{` / `}` handling switched on or off.
    pub fn with_curly_bracket_mode(self, curly_bracket_mode: bool) -> Self {
        Self {
            curly_bracket_mode,
            ..self
        }
    }

    /// Width of one indent level in columns.
    pub fn unit_width(&self) -> usize {
        self.width_of(&self.unit)
    }

    /// Column width of leading whitespace; tabs advance to the next tab stop.
    pub fn width_of(&self, whitespace: &str) -> usize {
        whitespace.chars().fold(0, |width, c| self.advance(width, c))
    }

    fn advance(&self, width: usize, c: char) -> usize {
        if c == '\t' {
            width + self.tab_width - width % self.tab_width
        } else {
            width + 1
        }
    }

    /// Whitespace of exactly `width` columns in this document's style.
    pub fn render(&self, width: usize) -> String {
        if self.use_tabs() {
            let mut text = "\t".repeat(width / self.tab_width);
            text.push_str(&" ".repeat(width % self.tab_width));
            text
        } else {
            " ".repeat(width)
        }
    }
}

/// A whitespace edit computed by the [`IndentEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndentEdit {
    /// Insert `text` at `offset`.
    Insert {
        /// Char offset.
        offset: usize,
        /// Whitespace to insert.
        text: String,
    },
    /// Remove `len` chars at `offset`.
    Remove {
        /// Char offset.
        offset: usize,
        /// Number of chars.
        len: usize,
    },
}

fn leading_whitespace(line: &str) -> &str {
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}

/// Computes indentation edits for newlines, closing braces and selections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndentEngine {
    context: IndentContext,
}

impl IndentEngine {
    /// Create an engine for `context`.
    pub fn new(context: IndentContext) -> Self {
        Self { context }
    }

    /// The active settings.
    pub fn context(&self) -> &IndentContext {
        &self.context
    }

    /// Replace the settings; applies to future edits only.
    pub fn set_context(&mut self, context: IndentContext) {
        self.context = context;
    }

    /// Indentation for the line that starts right after the newline at `newline`.
    ///
    /// Reproduces the previous line's leading width, one level deeper when the newline directly
    /// follows `{`. Returns `None` when there is nothing to insert or `newline` no longer points
    /// at a line break.
    pub fn newline_indent<S: TextSource + ?Sized>(
        &self,
        src: &S,
        newline: usize,
    ) -> Option<IndentEdit> {
        if src.char_at(newline) != Some('\n') {
            return None;
        }
        let line = src.line_of(newline);
        let mut width = self.context.width_of(leading_whitespace(&src.line_text(line)));
        if newline > 0 && src.char_at(newline - 1) == Some('{') {
            width += self.context.unit_width();
        }
        if width == 0 {
            return None;
        }
        Some(IndentEdit::Insert {
            offset: newline + 1,
            text: self.context.render(width),
        })
    }

    /// Outdent the line holding the `}` at `brace` to the width of the line with its match.
    ///
    /// Does nothing outside curly-bracket mode, when anything but whitespace precedes the brace
    /// on its line, when no matching `{` exists, or when the line is not wider than the target.
    pub fn close_brace_outdent<S: TextSource + ?Sized>(
        &self,
        src: &S,
        brace: usize,
    ) -> Vec<IndentEdit> {
        if !self.context.curly_bracket_mode || src.char_at(brace) != Some('}') {
            return Vec::new();
        }
        let line_start = src.line_start(src.line_of(brace));
        let prefix = src.slice(line_start, brace);
        if prefix.chars().any(|c| c != ' ' && c != '\t') {
            return Vec::new();
        }
        let Some(open) = matching_open_brace(src, brace) else {
            return Vec::new();
        };
        let target = self
            .context
            .width_of(leading_whitespace(&src.line_text(src.line_of(open))));
        let current = self.context.width_of(&prefix);
        if target >= current {
            return Vec::new();
        }

        let prefix_len = prefix.chars().count();
        let mut width = 0;
        for (i, c) in prefix.chars().enumerate() {
            if width == target {
                return vec![IndentEdit::Remove {
                    offset: line_start + i,
                    len: prefix_len - i,
                }];
            }
            width = self.context.advance(width, c);
            if width > target {
                break;
            }
        }
        let mut edits = vec![IndentEdit::Remove {
            offset: line_start,
            len: prefix_len,
        }];
        if target > 0 {
            edits.push(IndentEdit::Insert {
                offset: line_start,
                text: self.context.render(target),
            });
        }
        edits
    }

    /// Add one indent level to every non-empty line in `lines`.
    ///
    /// Edits are ordered by descending offset so they can be applied one after another.
    pub fn indent_lines<S: TextSource + ?Sized>(
        &self,
        src: &S,
        lines: Range<usize>,
    ) -> Vec<IndentEdit> {
        lines
            .rev()
            .filter(|&line| line < src.line_count() && !src.line_text(line).is_empty())
            .map(|line| IndentEdit::Insert {
                offset: src.line_start(line),
                text: self.context.unit.clone(),
            })
            .collect()
    }

    /// Remove one indent level from every line in `lines`.
    ///
    /// Returns `None` (and changes nothing) if any non-blank line is indented by less than one
    /// level. Blank lines lose up to one level of whatever whitespace they hold.
    pub fn outdent_lines<S: TextSource + ?Sized>(
        &self,
        src: &S,
        lines: Range<usize>,
    ) -> Option<Vec<IndentEdit>> {
        let unit_width = self.context.unit_width();
        let lines = lines.start..lines.end.min(src.line_count());
        let mut edits = Vec::new();
        for line in lines.rev() {
            let text = src.line_text(line);
            let leading = leading_whitespace(&text);
            let blank = leading.len() == text.len();
            if !blank && self.context.width_of(leading) < unit_width {
                return None;
            }
            let mut width = 0;
            let mut len = 0;
            for c in leading.chars() {
                if width >= unit_width {
                    break;
                }
                width = self.context.advance(width, c);
                len += 1;
            }
            if len > 0 {
                edits.push(IndentEdit::Remove {
                    offset: src.line_start(line),
                    len,
                });
            }
        }
        Some(edits)
    }
}

/// Backward depth-counting scan for the `{` matching the `}` at `close`.
fn matching_open_brace<S: TextSource + ?Sized>(src: &S, close: usize) -> Option<usize> {
    let mut depth = 0usize;
    for offset in (0..close).rev() {
        match src.char_at(offset) {
            Some('}') => depth += 1,
            Some('{') if depth == 0 => return Some(offset),
            Some('{') => depth -= 1,
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use ropey::Rope;

    fn spaces() -> IndentEngine {
        IndentEngine::default()
    }

    fn tabs() -> IndentEngine {
        IndentEngine::new(IndentContext::new("\t", 4, true).unwrap())
    }

    #[test]
    fn test_indent_unit_validation() {
        assert!(is_valid_indent_unit("  "));
        assert!(is_valid_indent_unit("\t"));
        assert!(!is_valid_indent_unit(""));
        assert!(!is_valid_indent_unit(" \t"));
        assert!(matches!(
            IndentContext::new("\t ", 4, true),
            Err(SettingsError::InvalidIndentUnit(_))
        ));
    }

    #[test]
    fn test_width_and_render() {
        let context = IndentContext::new("\t", 4, true).unwrap();
        assert_eq!(context.width_of("  \t"), 4);
        assert_eq!(context.width_of("\t  "), 6);
        assert_eq!(context.render(6), "\t  ");
        assert_eq!(IndentContext::default().render(6), "      ");
    }

    #[test]
    fn test_newline_after_open_brace() {
        let rope = Rope::from_str("  if (x) {\n");
        let edit = spaces().newline_indent(&rope, 10);
        assert_eq!(
            edit,
            Some(IndentEdit::Insert {
                offset: 11,
                text: " ".repeat(6)
            })
        );
    }

    #[test]
    fn test_newline_copies_tab_indent() {
        let rope = Rope::from_str("\t\tx;\n");
        assert_eq!(
            tabs().newline_indent(&rope, 4),
            Some(IndentEdit::Insert {
                offset: 5,
                text: "\t\t".to_string()
            })
        );
    }

    #[test]
    fn test_newline_without_indent_or_stale() {
        let rope = Rope::from_str("x;\ny");
        assert_eq!(spaces().newline_indent(&rope, 2), None);
        assert_eq!(spaces().newline_indent(&rope, 1), None);
    }

    #[test]
    fn test_close_brace_outdent_keeps_prefix() {
        let rope = Rope::from_str("  f {\n      }");
        let edits = spaces().close_brace_outdent(&rope, 12);
        assert_eq!(edits, vec![IndentEdit::Remove { offset: 8, len: 4 }]);
    }

    #[test]
    fn test_close_brace_outdent_rewrites_mixed_prefix() {
        // Target width 2 falls inside the tab's span, so the prefix is rebuilt.
        let rope = Rope::from_str("  f {\n \t}");
        let edits = tabs().close_brace_outdent(&rope, 8);
        assert_eq!(
            edits,
            vec![
                IndentEdit::Remove { offset: 6, len: 2 },
                IndentEdit::Insert {
                    offset: 6,
                    text: "  ".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_close_brace_noops() {
        let engine = spaces();
        // No matching open brace.
        assert!(engine.close_brace_outdent(&Rope::from_str("    }"), 4).is_empty());
        // Text before the brace.
        assert!(engine.close_brace_outdent(&Rope::from_str("{\n  x }"), 6).is_empty());
        // Already at or left of the target.
        assert!(engine.close_brace_outdent(&Rope::from_str("    {\n  }"), 8).is_empty());
        // Nested braces are skipped by depth.
        let rope = Rope::from_str("{\n  { }\n    }");
        assert_eq!(
            engine.close_brace_outdent(&rope, 12),
            vec![IndentEdit::Remove { offset: 8, len: 4 }]
        );
    }

    #[test]
    fn test_indent_lines_skips_empty() {
        let rope = Rope::from_str("a\n\nb");
        let edits = spaces().indent_lines(&rope, 0..3);
        assert_eq!(
            edits,
            vec![
                IndentEdit::Insert {
                    offset: 3,
                    text: "    ".to_string()
                },
                IndentEdit::Insert {
                    offset: 0,
                    text: "    ".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_outdent_lines_requires_full_unit() {
        let engine = spaces();
        let rope = Rope::from_str("    a\n  b");
        assert_eq!(engine.outdent_lines(&rope, 0..2), None);

        let rope = Rope::from_str("      a\n\n  \n\tb");
        let edits = engine.outdent_lines(&rope, 0..4).unwrap();
        assert_eq!(
            edits,
            vec![
                IndentEdit::Remove { offset: 12, len: 1 },
                IndentEdit::Remove { offset: 9, len: 2 },
                IndentEdit::Remove { offset: 0, len: 4 },
            ]
        );
    }
}
