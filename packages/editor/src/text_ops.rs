//! Low-level inline splicing shared by the structural edits
//!
//! Every operation here works on an [`InsertionPoint`] or a [`Selection`]
//! and reports where the caret should land afterwards.

use crate::errors::{EditError, EditResult};
use crate::selection::{self, parent_of, InsertionPoint, Position, Selection};
use quillpad_model::{Block, BlockKind, Document, IdGenerator, Inline, NodeId, Slot};

/// A gap between two children of a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Boundary {
    pub container: NodeId,
    pub index: usize,
    /// A text run was split to create this boundary
    pub split: bool,
}

/// Byte index of the `chars`-th character
pub(crate) fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Turn an insertion point into a child boundary, splitting a text run
/// when the point lies strictly inside it
pub(crate) fn to_boundary(
    doc: &mut Document,
    point: &InsertionPoint,
    ids: &mut IdGenerator,
) -> EditResult<Boundary> {
    match point {
        InsertionPoint::Children { container, index } => Ok(Boundary {
            container: container.clone(),
            index: *index,
            split: false,
        }),
        InsertionPoint::Text { run, offset } => {
            let (container, _) = parent_of(doc, run).ok_or_else(|| EditError::not_found(run))?;
            let (siblings, index) = match doc.slot_mut(run) {
                Some(Slot::Inline { siblings, index }) => (siblings, index),
                _ => return Err(EditError::not_found(run)),
            };

            let right = match &mut siblings[index] {
                Inline::Text { text, .. } => {
                    let len = text.chars().count();
                    if *offset == 0 {
                        return Ok(Boundary {
                            container,
                            index,
                            split: false,
                        });
                    }
                    if *offset >= len {
                        return Ok(Boundary {
                            container,
                            index: index + 1,
                            split: false,
                        });
                    }
                    let at = byte_offset(text, *offset);
                    text.split_off(at)
                }
                _ => return Err(EditError::not_found(run)),
            };

            siblings.insert(index + 1, Inline::text(ids.new_id(), right));
            Ok(Boundary {
                container,
                index: index + 1,
                split: true,
            })
        }
    }
}

/// Splice inline nodes in at a point; returns the caret just after them
pub(crate) fn insert_inlines(
    doc: &mut Document,
    point: &InsertionPoint,
    nodes: Vec<Inline>,
    ids: &mut IdGenerator,
) -> EditResult<Position> {
    let boundary = to_boundary(doc, point, ids)?;
    let children = doc
        .inline_children_mut(&boundary.container)
        .ok_or_else(|| EditError::not_found(&boundary.container))?;

    let count = nodes.len();
    let index = boundary.index.min(children.len());
    children.splice(index..index, nodes);
    Ok(Position::new(boundary.container, index + count))
}

/// Insert typed text at a point; returns the caret after the text
pub(crate) fn insert_text(
    doc: &mut Document,
    point: &InsertionPoint,
    input: &str,
    ids: &mut IdGenerator,
) -> EditResult<Position> {
    let added = input.chars().count();

    match point {
        InsertionPoint::Text { run, offset } => match doc.inline_mut(run) {
            Some(Inline::Text { text, .. }) => {
                let at = byte_offset(text, *offset);
                text.insert_str(at, input);
                Ok(Position::new(run.clone(), offset + added))
            }
            _ => Err(EditError::not_found(run)),
        },
        InsertionPoint::Children { container, index } => {
            let children = doc
                .inline_children_mut(container)
                .ok_or_else(|| EditError::not_found(container))?;
            let index = (*index).min(children.len());

            // Extend a neighbouring run instead of fragmenting the text
            if index > 0 {
                if let Inline::Text { id, text } = &mut children[index - 1] {
                    text.push_str(input);
                    return Ok(Position::new(id.clone(), text.chars().count()));
                }
            }
            if let Some(Inline::Text { id, text }) = children.get_mut(index) {
                text.insert_str(0, input);
                return Ok(Position::new(id.clone(), added));
            }

            let id = ids.new_id();
            children.insert(index, Inline::text(id.clone(), input));
            Ok(Position::new(id, added))
        }
    }
}

/// Boundaries of a non-collapsed selection within one container, ordered
///
/// Both ends must live in the same block or wrapper; runs at the ends are
/// split so the range covers whole children `lo..hi`.
pub(crate) fn range_boundaries(
    doc: &mut Document,
    selection: &Selection,
    ids: &mut IdGenerator,
) -> EditResult<(NodeId, usize, usize)> {
    let a = selection::resolve(doc, &selection.anchor)
        .ok_or_else(|| EditError::not_found(&selection.anchor.node))?;
    let b = selection::resolve(doc, &selection.focus)
        .ok_or_else(|| EditError::not_found(&selection.focus.node))?;

    let key_a = sort_key(doc, &a)?;
    let key_b = sort_key(doc, &b)?;
    if key_a.0 != key_b.0 {
        return Err(EditError::validation(
            "Selection must stay within a single line",
        ));
    }

    let (start, end) = if (key_a.1, key_a.2) <= (key_b.1, key_b.2) {
        (a, b)
    } else {
        (b, a)
    };

    // Split the later end first so the earlier index stays put
    let end_boundary = to_boundary(doc, &end, ids)?;
    let start_boundary = to_boundary(doc, &start, ids)?;
    let hi = if start_boundary.split {
        end_boundary.index + 1
    } else {
        end_boundary.index
    };

    Ok((start_boundary.container, start_boundary.index, hi))
}

/// `(container, child index, char offset)` ordering key of a point
fn sort_key(doc: &Document, point: &InsertionPoint) -> EditResult<(NodeId, usize, usize)> {
    match point {
        InsertionPoint::Children { container, index } => Ok((container.clone(), *index, 0)),
        InsertionPoint::Text { run, offset } => {
            let (container, index) = parent_of(doc, run).ok_or_else(|| EditError::not_found(run))?;
            Ok((container, index, *offset))
        }
    }
}

/// Delete the selected content; returns the collapsed caret
pub(crate) fn delete_selection(
    doc: &mut Document,
    selection: &Selection,
    ids: &mut IdGenerator,
) -> EditResult<Position> {
    if selection.is_collapsed() {
        return Ok(selection.anchor.clone());
    }

    // Same run: edit the string in place so the run keeps its id
    if selection.anchor.node == selection.focus.node {
        if let Some(Inline::Text { text, .. }) = doc.inline_mut(&selection.anchor.node) {
            let lo = selection.anchor.offset.min(selection.focus.offset);
            let hi = selection.anchor.offset.max(selection.focus.offset);
            let start = byte_offset(text, lo);
            let end = byte_offset(text, hi);
            text.replace_range(start..end, "");
            return Ok(Position::new(selection.anchor.node.clone(), lo));
        }
    }

    let (container, lo, hi) = range_boundaries(doc, selection, ids)?;
    let children = doc
        .inline_children_mut(&container)
        .ok_or_else(|| EditError::not_found(&container))?;
    let hi = hi.min(children.len());
    if lo < hi {
        children.drain(lo..hi);
    }
    Ok(Position::new(container, lo))
}

/// Replace `len` characters of a run starting at `start`; returns the caret
/// collapsed after the replacement
pub(crate) fn replace_in_run(
    doc: &mut Document,
    run: &str,
    start: usize,
    len: usize,
    replacement: &str,
) -> EditResult<Position> {
    match doc.inline_mut(run) {
        Some(Inline::Text { text, .. }) => {
            let from = byte_offset(text, start);
            let to = byte_offset(text, start + len);
            text.replace_range(from..to, replacement);
            Ok(Position::new(run, start + replacement.chars().count()))
        }
        Some(_) => Err(EditError::Model(quillpad_model::ModelError::NotText(
            run.to_string(),
        ))),
        None => Err(EditError::not_found(run)),
    }
}

/// Where an insertion lands: at the caret, or appended at the end of the
/// document when there is no usable caret
pub(crate) fn insertion_point_or_end(
    doc: &mut Document,
    selection: Option<&Selection>,
    ids: &mut IdGenerator,
) -> EditResult<InsertionPoint> {
    if let Some(selection) = selection {
        if let Some(point) = selection::resolve(doc, selection.caret()) {
            if !selection.is_collapsed() {
                match delete_selection(doc, selection, ids) {
                    Ok(caret) => {
                        if let Some(point) = selection::resolve(doc, &caret) {
                            return Ok(point);
                        }
                    }
                    // A selection crossing lines is not replaced; insert at the caret
                    Err(EditError::Validation(_)) => return Ok(point),
                    Err(e) => return Err(e),
                }
            }
            return Ok(point);
        }
    }
    Ok(end_of_document_point(doc, ids))
}

fn end_of_document_point(doc: &mut Document, ids: &mut IdGenerator) -> InsertionPoint {
    if doc.blocks.is_empty() {
        doc.blocks.push(Block::new(ids.new_id(), BlockKind::Paragraph));
    }
    let last = doc.blocks.len() - 1;
    let block = &doc.blocks[last];
    InsertionPoint::Children {
        container: block.id.clone(),
        index: block.children.len(),
    }
}
