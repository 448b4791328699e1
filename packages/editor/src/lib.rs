//! # Quillpad Editor
//!
//! Document-mutation engine behind a rich-text editing surface.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ UI event source: intents (JSON or typed)    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ EditSession::dispatch                       │
//! │  - selection tracking                       │
//! │  - structural edits (blocks, tables, images)│
//! │  - search / replace                         │
//! │  - snapshot history                         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ model: content tree → markup / plain text   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Tree is source of truth**: markup is a derived view
//! 2. **All-or-nothing intents**: a rejected intent changes nothing
//! 3. **Ids are stable**: nodes are addressed by id, never by pointer
//! 4. **History is snapshots**: undo restores whole committed states
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quillpad_editor::{EditSession, Intent, FormatCommand};
//! use quillpad_model::BlockKind;
//!
//! let mut session = EditSession::untitled();
//! session.dispatch(Intent::InsertText { text: "Title".into() });
//! session.dispatch(Intent::Format {
//!     command: FormatCommand::Block { block: BlockKind::Heading1 },
//! });
//! session.dispatch(Intent::Enter);
//!
//! assert_eq!(session.to_html(), "<h1>Title</h1><p><br></p>");
//! ```

pub mod blocks;
pub mod config;
mod errors;
pub mod formatting;
pub mod gesture;
pub mod images;
mod intent;
pub mod notify;
pub mod search;
pub mod selection;
mod session;
pub mod tables;
mod text_ops;
mod undo_stack;

pub use config::EditorConfig;
pub use errors::{EditError, EditResult, ErrorKind};
pub use formatting::ClearFormattingPolicy;
pub use gesture::{DragKind, PointerEvent};
pub use images::{CropJob, CropOutcome, ImageCommand, Region};
pub use intent::{FormatCommand, Intent};
pub use notify::{LogNotifier, Notice, Notifier, RecordingNotifier};
pub use search::{Match, SearchEngine, SearchState};
pub use selection::{Position, Selection};
pub use session::{EditSession, Outcome};
pub use tables::{TableCommand, TableDimensions};
pub use undo_stack::{UndoStack, DEFAULT_HISTORY_DEPTH};
