//! # Document
//!
//! The content tree: an ordered list of blocks that own inline content,
//! which may in turn own embedded tables whose cells own blocks again.
//!
//! Nodes are addressed by id. There are no parent pointers; ancestry is
//! recovered by walking down from the root (`path_to`), and mutation goes
//! through a [`Slot`], the sibling list that holds a node plus its index.

use crate::id_generator::IdGenerator;
use crate::node::*;
use crate::ModelError;
use serde::{Deserialize, Serialize};

/// Root of the content tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Incremented on every committed mutation (not part of snapshots)
    #[serde(skip)]
    pub version: u64,

    pub blocks: Vec<Block>,
}

/// Borrowed view of any node on a path
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Block(&'a Block),
    Inline(&'a Inline),
    Row(&'a TableRow),
    Cell(&'a TableCell),
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            NodeRef::Block(block) => &block.id,
            NodeRef::Inline(inline) => inline.id(),
            NodeRef::Row(row) => &row.id,
            NodeRef::Cell(cell) => &cell.id,
        }
    }
}

/// Mutable location of a node inside its parent's child list
pub enum Slot<'a> {
    Block {
        siblings: &'a mut Vec<Block>,
        index: usize,
    },
    Inline {
        siblings: &'a mut Vec<Inline>,
        index: usize,
    },
    Row {
        siblings: &'a mut Vec<TableRow>,
        index: usize,
    },
    Cell {
        siblings: &'a mut Vec<TableCell>,
        index: usize,
    },
}

impl Document {
    /// Document holding a single empty paragraph
    pub fn new(ids: &mut IdGenerator) -> Self {
        Self {
            version: 0,
            blocks: vec![Block::new(ids.new_id(), BlockKind::Paragraph)],
        }
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { version: 0, blocks }
    }

    /// Mark a committed mutation
    pub fn touch(&mut self) {
        self.version += 1;
    }

    /// Discard all content and return to a single empty paragraph
    pub fn reset(&mut self, ids: &mut IdGenerator) {
        self.blocks = vec![Block::new(ids.new_id(), BlockKind::Paragraph)];
    }

    /// Serialized form used for history and persistence
    pub fn to_snapshot(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(&self.blocks)?)
    }

    /// Replace content from a snapshot, keeping the version counter
    pub fn restore_snapshot(&mut self, snapshot: &str) -> Result<(), ModelError> {
        self.blocks = serde_json::from_str(snapshot)?;
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.path_to(id).is_some()
    }

    /// Chain of nodes from a top-level block down to `id` (inclusive)
    pub fn path_to(&self, id: &str) -> Option<Vec<NodeRef<'_>>> {
        let mut path = Vec::new();
        if path_in_blocks(&self.blocks, id, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    pub fn find(&self, id: &str) -> Option<NodeRef<'_>> {
        self.path_to(id).and_then(|path| path.last().copied())
    }

    /// Nearest block at or above `id`
    pub fn enclosing_block(&self, id: &str) -> Option<&Block> {
        self.path_to(id)?.into_iter().rev().find_map(|node| match node {
            NodeRef::Block(block) => Some(block),
            _ => None,
        })
    }

    /// Nearest table at or above `id`
    pub fn enclosing_table(&self, id: &str) -> Option<&Table> {
        self.path_to(id)?.into_iter().rev().find_map(|node| match node {
            NodeRef::Inline(Inline::Embed {
                object: EmbeddedObject::Table(table),
            }) => Some(table),
            _ => None,
        })
    }

    pub fn find_image(&self, id: &str) -> Option<&Image> {
        match self.find(id)? {
            NodeRef::Inline(Inline::Embed {
                object: EmbeddedObject::Image(image),
            }) => Some(image),
            _ => None,
        }
    }

    pub fn find_table(&self, id: &str) -> Option<&Table> {
        match self.find(id)? {
            NodeRef::Inline(Inline::Embed {
                object: EmbeddedObject::Table(table),
            }) => Some(table),
            _ => None,
        }
    }

    pub fn slot_mut(&mut self, id: &str) -> Option<Slot<'_>> {
        locate_in_blocks(&mut self.blocks, id)
    }

    pub fn block_mut(&mut self, id: &str) -> Option<&mut Block> {
        match self.slot_mut(id)? {
            Slot::Block { siblings, index } => siblings.get_mut(index),
            _ => None,
        }
    }

    pub fn inline_mut(&mut self, id: &str) -> Option<&mut Inline> {
        match self.slot_mut(id)? {
            Slot::Inline { siblings, index } => siblings.get_mut(index),
            _ => None,
        }
    }

    pub fn image_mut(&mut self, id: &str) -> Option<&mut Image> {
        match self.inline_mut(id)? {
            Inline::Embed {
                object: EmbeddedObject::Image(image),
            } => Some(image),
            _ => None,
        }
    }

    pub fn table_mut(&mut self, id: &str) -> Option<&mut Table> {
        match self.inline_mut(id)? {
            Inline::Embed {
                object: EmbeddedObject::Table(table),
            } => Some(table),
            _ => None,
        }
    }

    /// Inline child list owned by a block or a styled wrapper
    pub fn inline_children_mut(&mut self, container_id: &str) -> Option<&mut Vec<Inline>> {
        match self.slot_mut(container_id)? {
            Slot::Block { siblings, index } => siblings.get_mut(index).map(|b| &mut b.children),
            Slot::Inline { siblings, index } => match siblings.get_mut(index)? {
                Inline::Styled { children, .. } => Some(children),
                _ => None,
            },
            _ => None,
        }
    }

    /// Remove a node wherever it lives, returning whether it existed
    pub fn remove(&mut self, id: &str) -> bool {
        match self.slot_mut(id) {
            Some(Slot::Block { siblings, index }) => {
                siblings.remove(index);
            }
            Some(Slot::Inline { siblings, index }) => {
                siblings.remove(index);
            }
            Some(Slot::Row { siblings, index }) => {
                siblings.remove(index);
            }
            Some(Slot::Cell { siblings, index }) => {
                siblings.remove(index);
            }
            None => return false,
        }
        true
    }

    /// Last insertion point in document order: `(node, offset)` where the
    /// offset is a character count for text runs and a child index otherwise
    pub fn end_point(&self) -> Option<(NodeId, usize)> {
        let block = self.blocks.last()?;
        Some(end_of_children(&block.id, &block.children))
    }

    /// Plain text rendition: one line per block
    pub fn to_plain_text(&self) -> String {
        let mut lines = Vec::new();
        collect_lines(&self.blocks, &mut lines);
        lines.join("\n")
    }
}

fn end_of_children(owner: &str, children: &[Inline]) -> (NodeId, usize) {
    match children.last() {
        Some(Inline::Text { id, text }) => (id.clone(), text.chars().count()),
        Some(Inline::Styled { id, children, .. }) if !children.is_empty() => {
            end_of_children(id, children)
        }
        _ => (owner.to_string(), children.len()),
    }
}

fn collect_lines(blocks: &[Block], lines: &mut Vec<String>) {
    for block in blocks {
        lines.push(block.text());
        for child in &block.children {
            if let Inline::Embed {
                object: EmbeddedObject::Table(table),
            } = child
            {
                for row in &table.rows {
                    for cell in &row.cells {
                        collect_lines(&cell.blocks, lines);
                    }
                }
            }
        }
    }
}

fn path_in_blocks<'a>(blocks: &'a [Block], id: &str, path: &mut Vec<NodeRef<'a>>) -> bool {
    for block in blocks {
        path.push(NodeRef::Block(block));
        if block.id == id || path_in_inlines(&block.children, id, path) {
            return true;
        }
        path.pop();
    }
    false
}

fn path_in_inlines<'a>(inlines: &'a [Inline], id: &str, path: &mut Vec<NodeRef<'a>>) -> bool {
    for inline in inlines {
        path.push(NodeRef::Inline(inline));
        if inline.id() == id {
            return true;
        }
        let found = match inline {
            Inline::Styled { children, .. } => path_in_inlines(children, id, path),
            Inline::Embed {
                object: EmbeddedObject::Table(table),
            } => path_in_table(table, id, path),
            _ => false,
        };
        if found {
            return true;
        }
        path.pop();
    }
    false
}

fn path_in_table<'a>(table: &'a Table, id: &str, path: &mut Vec<NodeRef<'a>>) -> bool {
    for row in &table.rows {
        path.push(NodeRef::Row(row));
        if row.id == id {
            return true;
        }
        for cell in &row.cells {
            path.push(NodeRef::Cell(cell));
            if cell.id == id || path_in_blocks(&cell.blocks, id, path) {
                return true;
            }
            path.pop();
        }
        path.pop();
    }
    false
}

fn locate_in_blocks<'a>(blocks: &'a mut Vec<Block>, id: &str) -> Option<Slot<'a>> {
    if let Some(index) = blocks.iter().position(|b| b.id == id) {
        return Some(Slot::Block {
            siblings: blocks,
            index,
        });
    }
    for block in blocks.iter_mut() {
        if let Some(slot) = locate_in_inlines(&mut block.children, id) {
            return Some(slot);
        }
    }
    None
}

fn locate_in_inlines<'a>(inlines: &'a mut Vec<Inline>, id: &str) -> Option<Slot<'a>> {
    if let Some(index) = inlines.iter().position(|i| i.id() == id) {
        return Some(Slot::Inline {
            siblings: inlines,
            index,
        });
    }
    for inline in inlines.iter_mut() {
        let found = match inline {
            Inline::Styled { children, .. } => locate_in_inlines(children, id),
            Inline::Embed {
                object: EmbeddedObject::Table(table),
            } => locate_in_table(table, id),
            _ => None,
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

fn locate_in_table<'a>(table: &'a mut Table, id: &str) -> Option<Slot<'a>> {
    if let Some(index) = table.rows.iter().position(|r| r.id == id) {
        return Some(Slot::Row {
            siblings: &mut table.rows,
            index,
        });
    }
    for row in table.rows.iter_mut() {
        if let Some(index) = row.cells.iter().position(|c| c.id == id) {
            return Some(Slot::Cell {
                siblings: &mut row.cells,
                index,
            });
        }
        for cell in row.cells.iter_mut() {
            if let Some(slot) = locate_in_blocks(&mut cell.blocks, id) {
                return Some(slot);
            }
        }
    }
    None
}
