//! # Undo/Redo Stack
//!
//! Snapshot history for document editing.
//!
//! ## Design
//!
//! - Every committed edit records a full serialized snapshot
//! - The top of the undo stack is always the current document state
//! - Identical consecutive snapshots are recorded once
//! - The first snapshot is the floor: it is never undone away
//! - A newly recorded state clears the redo stack
//! - Both stacks are bounded; the oldest entry is evicted first
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//! stack.record(&doc)?;            // initial state
//!
//! // ... edit doc ...
//! stack.record(&doc)?;
//!
//! stack.undo(&mut doc)?;          // back to the initial state
//! stack.redo(&mut doc)?;
//! ```

use crate::errors::{EditError, EditResult};
use quillpad_model::Document;

/// Default number of states kept
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

#[derive(Debug)]
pub struct UndoStack {
    /// Past states, oldest first; the last one is the current state
    undo_stack: Vec<String>,

    /// Undone states, most recently undone last
    redo_stack: Vec<String>,

    /// Maximum number of states per stack (at least 1)
    max_levels: usize,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_HISTORY_DEPTH)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels: max_levels.max(1),
        }
    }

    /// Snapshot the document; returns whether a new state was recorded
    pub fn record(&mut self, doc: &Document) -> EditResult<bool> {
        let snapshot = doc.to_snapshot()?;
        Ok(self.push(snapshot))
    }

    /// Push a serialized state unless it equals the current top
    pub fn push(&mut self, snapshot: String) -> bool {
        if self.undo_stack.last() == Some(&snapshot) {
            return false;
        }
        push_bounded(&mut self.undo_stack, snapshot, self.max_levels);

        // New state invalidates the future
        self.redo_stack.clear();
        true
    }

    /// Restore the previous state
    pub fn undo(&mut self, doc: &mut Document) -> EditResult<()> {
        if self.undo_stack.len() < 2 {
            return Err(EditError::no_op("Nothing to undo"));
        }

        let previous = &self.undo_stack[self.undo_stack.len() - 2];
        doc.restore_snapshot(previous)?;

        if let Some(current) = self.undo_stack.pop() {
            push_bounded(&mut self.redo_stack, current, self.max_levels);
        }
        Ok(())
    }

    /// Restore the most recently undone state
    pub fn redo(&mut self, doc: &mut Document) -> EditResult<()> {
        let next = self
            .redo_stack
            .last()
            .ok_or_else(|| EditError::no_op("Nothing to redo"))?;
        doc.restore_snapshot(next)?;

        if let Some(state) = self.redo_stack.pop() {
            push_bounded(&mut self.undo_stack, state, self.max_levels);
        }
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() >= 2
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of recorded states, including the current one
    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Serialized current state
    pub fn current(&self) -> Option<&str> {
        self.undo_stack.last().map(String::as_str)
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

fn push_bounded(stack: &mut Vec<String>, snapshot: String, max_levels: usize) {
    stack.push(snapshot);
    if stack.len() > max_levels {
        let excess = stack.len() - max_levels;
        stack.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quillpad_model::{Block, BlockKind, Inline};

    fn doc_with(text: &str) -> Document {
        Document::from_blocks(vec![Block::new("p".into(), BlockKind::Paragraph)
            .with_children(vec![Inline::text("t".into(), text)])])
    }

    fn set_text(doc: &mut Document, text: &str) {
        if let Some(Inline::Text { text: current, .. }) = doc.inline_mut("t") {
            *current = text.to_string();
        }
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_record_skips_identical_state() {
        let doc = doc_with("a");
        let mut stack = UndoStack::new();

        assert!(stack.record(&doc).unwrap());
        assert!(!stack.record(&doc).unwrap());
        assert_eq!(stack.undo_levels(), 1);
    }

    #[test]
    fn test_floor_state_is_never_undone() {
        let mut doc = doc_with("a");
        let mut stack = UndoStack::new();
        stack.record(&doc).unwrap();

        let result = stack.undo(&mut doc);
        assert!(matches!(result, Err(EditError::NoOp(_))));
        assert_eq!(stack.undo_levels(), 1);
    }

    #[test]
    fn test_undo_and_redo_restore_states() {
        let mut doc = doc_with("a");
        let mut stack = UndoStack::new();
        stack.record(&doc).unwrap();
        set_text(&mut doc, "b");
        stack.record(&doc).unwrap();

        stack.undo(&mut doc).unwrap();
        assert_eq!(doc.to_plain_text(), "a");
        assert_eq!(stack.current(), Some(doc.to_snapshot().unwrap().as_str()));
        assert!(stack.can_redo());

        stack.redo(&mut doc).unwrap();
        assert_eq!(doc.to_plain_text(), "b");
        assert!(matches!(stack.redo(&mut doc), Err(EditError::NoOp(_))));
    }

    #[test]
    fn test_new_state_clears_redo() {
        let mut doc = doc_with("a");
        let mut stack = UndoStack::new();
        stack.record(&doc).unwrap();
        set_text(&mut doc, "b");
        stack.record(&doc).unwrap();
        stack.undo(&mut doc).unwrap();
        assert_eq!(stack.redo_levels(), 1);

        // Re-recording the restored state is not a new edit
        stack.record(&doc).unwrap();
        assert_eq!(stack.redo_levels(), 1);

        set_text(&mut doc, "c");
        stack.record(&doc).unwrap();
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut doc = doc_with("start");
        let mut stack = UndoStack::with_max_levels(3);

        for i in 0..5 {
            set_text(&mut doc, &format!("Text {}", i));
            stack.record(&doc).unwrap();
        }

        assert_eq!(stack.undo_levels(), 3);
        stack.undo(&mut doc).unwrap();
        stack.undo(&mut doc).unwrap();
        assert_eq!(doc.to_plain_text(), "Text 2");
        assert!(!stack.can_undo());
    }
}
