//! # UI Intents
//!
//! Discrete requests delivered by the UI event source. Each one maps to a
//! single operation of [`EditSession::dispatch`](crate::EditSession::dispatch).
//!
//! Intents are plain serde data so a front end (or a script) can send them
//! as JSON:
//!
//! ```json
//! { "type": "insertTable", "rows": "2", "columns": "3" }
//! { "type": "format", "command": { "kind": "bold" } }
//! { "type": "table", "target": "a1b2c3d4-7", "command": "addRow" }
//! ```

use crate::gesture::PointerEvent;
use crate::images::{CropOutcome, ImageCommand};
use crate::selection::Selection;
use crate::tables::TableCommand;
use quillpad_model::{BlockKind, NodeId};
use serde::{Deserialize, Serialize};

/// Toolbar format commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    /// Heading selector: p / h1 / h2 / h3
    Block { block: BlockKind },
    FontName { family: String },
    FontSize { size: String },
    Link { href: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Intent {
    /// Explicit selection change (pointer or keyboard)
    SetSelection { selection: Selection },

    /// Caret moved without a new selection (key-up, pointer-up)
    CaretMoved,

    InsertText { text: String },

    /// Enter key
    Enter,

    Format { command: FormatCommand },

    InsertImage {
        #[serde(with = "quillpad_model::base64_bytes")]
        bytes: Vec<u8>,
    },

    InsertImageUri { uri: String, width: u32, height: u32 },

    /// Raw dialog input; validated before anything is touched
    InsertTable { rows: String, columns: String },

    Image { target: NodeId, command: ImageCommand },

    Table { target: NodeId, command: TableCommand },

    Pointer { event: PointerEvent },

    /// Result of a crop rasterized off the edit path
    CompleteCrop { outcome: CropOutcome },

    Find { pattern: String },

    FindNext,

    Replace { replacement: String },

    ReplaceAll { pattern: String, replacement: String },

    Undo,

    Redo,

    ClearFormatting,

    Reset,
}

impl Intent {
    /// Whether applying this intent may change the document
    pub fn can_mutate(&self) -> bool {
        match self {
            Intent::SetSelection { .. } | Intent::CaretMoved | Intent::Find { .. } | Intent::FindNext => {
                false
            }
            Intent::Pointer { event } => matches!(event, PointerEvent::Up { .. }),
            _ => true,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Intent::SetSelection { .. } => "setSelection",
            Intent::CaretMoved => "caretMoved",
            Intent::InsertText { .. } => "insertText",
            Intent::Enter => "enter",
            Intent::Format { .. } => "format",
            Intent::InsertImage { .. } => "insertImage",
            Intent::InsertImageUri { .. } => "insertImageUri",
            Intent::InsertTable { .. } => "insertTable",
            Intent::Image { .. } => "image",
            Intent::Table { .. } => "table",
            Intent::Pointer { .. } => "pointer",
            Intent::CompleteCrop { .. } => "completeCrop",
            Intent::Find { .. } => "find",
            Intent::FindNext => "findNext",
            Intent::Replace { .. } => "replace",
            Intent::ReplaceAll { .. } => "replaceAll",
            Intent::Undo => "undo",
            Intent::Redo => "redo",
            Intent::ClearFormatting => "clearFormatting",
            Intent::Reset => "reset",
        }
    }
}
