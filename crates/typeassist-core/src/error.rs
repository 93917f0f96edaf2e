//! Error types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors reported by a [`TextBuffer`](crate::TextBuffer).
pub enum BufferError {
    #[error("offset {offset} is out of bounds (length {len})")]
    /// An offset past the end of the document.
    OutOfBounds {
        /// The rejected offset.
        offset: usize,
        /// Document length in chars.
        len: usize,
    },

    #[error("invalid range {start}..{end} (length {len})")]
    /// A range that is reversed or extends past the end of the document.
    InvalidRange {
        /// Range start.
        start: usize,
        /// Range end.
        end: usize,
        /// Document length in chars.
        len: usize,
    },
}

#[derive(Debug, Error)]
/// Errors produced while loading or validating [`AssistSettings`](crate::AssistSettings).
pub enum SettingsError {
    #[error("settings parse error: {0}")]
    /// The JSON document could not be parsed.
    Parse(#[from] serde_json::Error),

    #[error("undo capacity must be at least 1")]
    /// The undo stack cannot be bounded to zero units.
    ZeroUndoCapacity,

    #[error("tab width must be at least 1")]
    /// Tab stops need a positive width.
    ZeroTabWidth,

    #[error("invalid indent unit {0:?}: must be non-empty and all spaces or all tabs")]
    /// The configured indent unit mixes tabs and spaces or holds other characters.
    InvalidIndentUnit(String),
}

#[derive(Debug, Error)]
/// Errors surfaced by [`EditMediator`](crate::EditMediator) operations.
pub enum AssistError {
    #[error(transparent)]
    /// The buffer rejected an edit.
    Buffer(#[from] BufferError),

    #[error(transparent)]
    /// Settings were invalid.
    Settings(#[from] SettingsError),
}
