//! Persisted per-document settings.

use crate::error::SettingsError;
use crate::indent::{IndentContext, is_valid_indent_unit};
use crate::undo::DEFAULT_UNDO_CAPACITY;
use serde::{Deserialize, Serialize};
use typeassist_highlight::Language;

/// Settings a host stores and restores between sessions.
///
/// Missing fields take their defaults, so partial JSON documents are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AssistSettings {
    /// Language of the document.
    pub language: Language,
    /// Literal text of one indent level (all spaces or all tabs).
    pub indent_unit: String,
    /// Columns per tab stop.
    pub tab_width: usize,
    /// Whether `{` / `}` drive indentation.
    pub curly_bracket_mode: bool,
    /// Master switch for per-keystroke recoloring and indentation.
    pub type_assist: bool,
    /// Maximum number of undo units.
    pub undo_capacity: usize,
}

impl Default for AssistSettings {
    fn default() -> Self {
        Self {
            language: Language::PlainText,
            indent_unit: "    ".to_string(),
            tab_width: 4,
            curly_bracket_mode: true,
            type_assist: true,
            undo_capacity: DEFAULT_UNDO_CAPACITY,
        }
    }
}

impl AssistSettings {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every field for a usable value.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.undo_capacity == 0 {
            return Err(SettingsError::ZeroUndoCapacity);
        }
        if self.tab_width == 0 {
            return Err(SettingsError::ZeroTabWidth);
        }
        if !is_valid_indent_unit(&self.indent_unit) {
            return Err(SettingsError::InvalidIndentUnit(self.indent_unit.clone()));
        }
        Ok(())
    }

    /// The indentation settings these values describe.
    pub fn indent_context(&self) -> Result<IndentContext, SettingsError> {
        self.validate()?;
        IndentContext::new(
            self.indent_unit.clone(),
            self.tab_width,
            self.curly_bracket_mode,
        )
    }
}
