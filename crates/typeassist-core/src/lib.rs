#![warn(missing_docs)]
//! TypeAssist Core - edit-state engine for a code editor
//!
//! # Overview
//!
//! `typeassist-core` sits between a host's text buffer and its display. On every keystroke it
//! recolors only the part of the document the edit affected, keeps multi-line constructs
//! (block comments, triple-quoted strings) correct when a single edit opens or closes them,
//! indents new lines and closing braces, and records the edit in a grouped undo history.
//!
//! It draws nothing and reads no files: the host supplies a [`TextBuffer`] and shows whatever
//! attributes the mediator paints into it.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  EditMediator (host API, deferred tasks)    │  ← Public API
//! ├──────────────┬───────────────┬──────────────┤
//! │  Highlighter │  IndentEngine │  UndoStack   │  ← Reactions
//! ├──────────────┴───────────────┴──────────────┤
//! │  LineNumberTracker                          │  ← Gutter
//! ├─────────────────────────────────────────────┤
//! │  TextBuffer (RopeBuffer reference impl)     │  ← Text + attributes
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use typeassist_core::{Attribute, EditMediator, Language, RopeBuffer, TextBuffer};
//!
//! let mut mediator = EditMediator::new(RopeBuffer::new(""));
//! mediator.set_mode(Language::Java).unwrap();
//!
//! for c in "if (x) {\n".chars() {
//!     let caret = mediator.buffer().caret();
//!     mediator.insert(caret, &c.to_string()).unwrap();
//!     mediator.run_deferred().unwrap();
//! }
//!
//! assert_eq!(mediator.buffer().text(), "if (x) {\n    ");
//! assert_eq!(mediator.buffer().attribute_at(0), Attribute::KeywordRed);
//!
//! mediator.undo().unwrap();
//! assert_eq!(mediator.buffer().text(), "if (x) {");
//! ```
//!
//! # Module Description
//!
//! - [`buffer`] - text buffer trait and the rope-backed reference buffer
//! - [`mediator`] - the host-facing edit mediator
//! - [`undo`] - grouped undo/redo history
//! - [`indent`] - brace-aware auto-indentation
//! - [`line_numbers`] - line-number gutter column
//! - [`tasks`] - deferred follow-up queue
//! - [`settings`] - persisted per-document settings

pub mod buffer;
pub mod error;
pub mod indent;
pub mod line_numbers;
pub mod mediator;
pub mod notify;
pub mod settings;
pub mod tasks;
pub mod undo;

pub use buffer::{EditEvent, EditKind, RopeBuffer, TextBuffer};
pub use error::{AssistError, BufferError, SettingsError};
pub use indent::{IndentContext, IndentEdit, IndentEngine, is_valid_indent_unit};
pub use line_numbers::LineNumberTracker;
pub use mediator::{EditMediator, SuppressedScope};
pub use notify::{EdgeSignal, SignalCallback, UndoAvailability};
pub use settings::AssistSettings;
pub use tasks::{DeferredTask, TaskQueue};
pub use typeassist_highlight::{EditRegion, Highlight, Highlighter, StyledRun, TextSource};
pub use typeassist_lang::{Attribute, Language, LanguageMode};
pub use undo::{DEFAULT_UNDO_CAPACITY, PrimitiveEdit, Replay, UndoStack, UndoUnit};
