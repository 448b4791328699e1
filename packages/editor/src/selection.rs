//! # Cursor/Selection Tracker
//!
//! Selections are plain values threaded through every operation; there is
//! no ambient "current selection" anywhere else.
//!
//! A [`Position`] names a node plus an offset. For a text run the offset
//! counts characters, for a block or styled wrapper it is a child index.
//! [`resolve`] turns a position into a concrete [`InsertionPoint`].

use quillpad_model::{BlockKind, Document, Inline, NodeId, NodeRef};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub node: NodeId,
    pub offset: usize,
}

impl Position {
    pub fn new(node: impl Into<NodeId>, offset: usize) -> Self {
        Self {
            node: node.into(),
            offset,
        }
    }
}

/// Anchor/focus pair; collapsed when both are equal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Position,
    pub focus: Position,
}

impl Selection {
    pub fn new(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(position: Position) -> Self {
        Self {
            anchor: position.clone(),
            focus: position,
        }
    }

    /// Caret at the start of a node (policy for freshly inserted blocks)
    pub fn start_of(node: impl Into<NodeId>) -> Self {
        Self::collapsed(Position::new(node, 0))
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// The moving end of the selection
    pub fn caret(&self) -> &Position {
        &self.focus
    }

    /// Keep the selection when both ends still exist (clamping offsets),
    /// otherwise fall back to the end of the document
    pub fn revalidate(&self, doc: &Document) -> Option<Selection> {
        match (clamp(doc, &self.anchor), clamp(doc, &self.focus)) {
            (Some(anchor), Some(focus)) => Some(Selection::new(anchor, focus)),
            _ => end_of_document(doc),
        }
    }
}

/// Concrete place where content can be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertionPoint {
    /// Inside a text run, at a character offset
    Text { run: NodeId, offset: usize },
    /// Between children of a block or styled wrapper
    Children { container: NodeId, index: usize },
}

/// Map an abstract position to an insertion point
pub fn resolve(doc: &Document, position: &Position) -> Option<InsertionPoint> {
    let path = doc.path_to(&position.node)?;
    let node = *path.last()?;

    match node {
        NodeRef::Inline(Inline::Text { id, text }) => Some(InsertionPoint::Text {
            run: id.clone(),
            offset: position.offset.min(text.chars().count()),
        }),
        NodeRef::Inline(Inline::Styled { id, children, .. }) => Some(InsertionPoint::Children {
            container: id.clone(),
            index: position.offset.min(children.len()),
        }),
        NodeRef::Block(block) => Some(InsertionPoint::Children {
            container: block.id.clone(),
            index: position.offset.min(block.children.len()),
        }),
        // Leaf objects: before them at offset 0, after them otherwise
        NodeRef::Inline(inline) => {
            let (container, index) = parent_of(doc, inline.id())?;
            Some(InsertionPoint::Children {
                container,
                index: if position.offset == 0 { index } else { index + 1 },
            })
        }
        NodeRef::Cell(cell) => cell.blocks.first().map(|block| InsertionPoint::Children {
            container: block.id.clone(),
            index: 0,
        }),
        NodeRef::Row(row) => row
            .cells
            .first()
            .and_then(|cell| cell.blocks.first())
            .map(|block| InsertionPoint::Children {
                container: block.id.clone(),
                index: 0,
            }),
    }
}

/// Owning container (block or wrapper) of an inline node and its index there
pub fn parent_of(doc: &Document, id: &str) -> Option<(NodeId, usize)> {
    let path = doc.path_to(id)?;
    if path.len() < 2 {
        return None;
    }
    let children: &[Inline] = match path[path.len() - 2] {
        NodeRef::Block(block) => &block.children,
        NodeRef::Inline(Inline::Styled { children, .. }) => children,
        _ => return None,
    };
    let index = children.iter().position(|child| child.id() == id)?;
    Some((path[path.len() - 2].id().to_string(), index))
}

/// Collapsed caret at the very end of the document
pub fn end_of_document(doc: &Document) -> Option<Selection> {
    doc.end_point()
        .map(|(node, offset)| Selection::collapsed(Position::new(node, offset)))
}

/// Block kind reported to the heading selector for a caret
///
/// Only paragraph and heading kinds are reported; anything else reads as
/// a paragraph.
pub fn block_kind_indicator(doc: &Document, selection: Option<&Selection>) -> BlockKind {
    let kind = selection
        .and_then(|sel| doc.enclosing_block(&sel.anchor.node))
        .map(|block| block.kind);

    match kind {
        Some(kind @ (BlockKind::Heading1 | BlockKind::Heading2 | BlockKind::Heading3)) => kind,
        _ => BlockKind::Paragraph,
    }
}

fn clamp(doc: &Document, position: &Position) -> Option<Position> {
    let limit = match doc.find(&position.node)? {
        NodeRef::Inline(Inline::Text { text, .. }) => text.chars().count(),
        NodeRef::Inline(Inline::Styled { children, .. }) => children.len(),
        NodeRef::Block(block) => block.children.len(),
        NodeRef::Inline(_) => 1,
        NodeRef::Row(row) => row.cells.len(),
        NodeRef::Cell(cell) => cell.blocks.len(),
    };
    Some(Position::new(position.node.clone(), position.offset.min(limit)))
}
