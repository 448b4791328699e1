//! Block-level structural edits: Enter handling and block kind changes

use crate::errors::{EditError, EditResult};
use crate::selection::{self, parent_of, Position, Selection};
use crate::text_ops::to_boundary;
use quillpad_model::{Block, BlockKind, Document, IdGenerator, Inline, NodeRef, Slot};
use tracing::debug;

/// What happened on a line-break request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnterOutcome {
    /// The caret was in a heading: a paragraph was opened after it
    EscapedHeading { paragraph: Selection },
    /// Default behavior: the block was split at the caret
    Split { caret: Selection },
}

impl EnterOutcome {
    pub fn caret(&self) -> &Selection {
        match self {
            EnterOutcome::EscapedHeading { paragraph } => paragraph,
            EnterOutcome::Split { caret } => caret,
        }
    }
}

/// Handle Enter at the caret
///
/// Inside a heading the default line break is suppressed: a new empty
/// paragraph goes right after the heading and the caret moves to its
/// start. Any other block is split at the caret.
pub fn enter(doc: &mut Document, caret: &Position, ids: &mut IdGenerator) -> EditResult<EnterOutcome> {
    let block = doc
        .enclosing_block(&caret.node)
        .ok_or_else(|| EditError::not_found(&caret.node))?;

    if block.kind.is_heading() {
        let heading_id = block.id.clone();
        let paragraph = escape_heading(doc, &heading_id, ids)?;
        return Ok(EnterOutcome::EscapedHeading { paragraph });
    }

    let caret = split_block(doc, caret, ids)?;
    Ok(EnterOutcome::Split { caret })
}

/// Insert an empty paragraph immediately after a heading
pub fn escape_heading(doc: &mut Document, heading_id: &str, ids: &mut IdGenerator) -> EditResult<Selection> {
    let (siblings, index) = match doc.slot_mut(heading_id) {
        Some(Slot::Block { siblings, index }) => (siblings, index),
        _ => return Err(EditError::not_found(heading_id)),
    };

    let paragraph = Block::new(ids.new_id(), BlockKind::Paragraph);
    let paragraph_id = paragraph.id.clone();
    siblings.insert(index + 1, paragraph);

    debug!(heading = heading_id, paragraph = %paragraph_id, "Escaped heading on Enter");
    Ok(Selection::start_of(paragraph_id))
}

/// Split the enclosing block at the caret, splitting styled wrappers on
/// the way up; the caret lands at the start of the new block
pub fn split_block(doc: &mut Document, caret: &Position, ids: &mut IdGenerator) -> EditResult<Selection> {
    let point = selection::resolve(doc, caret).ok_or_else(|| EditError::not_found(&caret.node))?;
    let mut boundary = to_boundary(doc, &point, ids)?;

    loop {
        let is_block = matches!(doc.find(&boundary.container), Some(NodeRef::Block(_)));
        if is_block {
            break;
        }

        let (parent, index) =
            parent_of(doc, &boundary.container).ok_or_else(|| EditError::not_found(&boundary.container))?;
        let len = doc
            .inline_children_mut(&boundary.container)
            .map(|children| children.len())
            .ok_or_else(|| EditError::not_found(&boundary.container))?;

        // At a wrapper edge the split moves outside it; no empty copies
        if boundary.index == 0 || boundary.index >= len {
            let after = usize::from(boundary.index > 0 && len > 0);
            boundary.container = parent;
            boundary.index = index + after;
            continue;
        }

        // Move the tail of a wrapper into a fresh copy placed after it
        let tail_copy = match doc.inline_mut(&boundary.container) {
            Some(Inline::Styled {
                wrapper,
                attributes,
                children,
                ..
            }) => {
                let at = boundary.index.min(children.len());
                Inline::Styled {
                    id: ids.new_id(),
                    wrapper: wrapper.clone(),
                    attributes: attributes.clone(),
                    children: children.split_off(at),
                }
            }
            _ => return Err(EditError::not_found(&boundary.container)),
        };

        let siblings = doc
            .inline_children_mut(&parent)
            .ok_or_else(|| EditError::not_found(&parent))?;
        siblings.insert(index + 1, tail_copy);
        boundary.container = parent;
        boundary.index = index + 1;
    }

    let (siblings, index) = match doc.slot_mut(&boundary.container) {
        Some(Slot::Block { siblings, index }) => (siblings, index),
        _ => return Err(EditError::not_found(&boundary.container)),
    };

    let block = &mut siblings[index];
    let at = boundary.index.min(block.children.len());
    let tail = block.children.split_off(at);
    let mut next = Block::new(ids.new_id(), block.kind);
    next.attributes = block.attributes.clone();
    next.children = tail;
    let next_id = next.id.clone();
    siblings.insert(index + 1, next);

    Ok(Selection::start_of(next_id))
}

/// Change the kind of the block enclosing the caret (heading selector)
pub fn set_block_kind(doc: &mut Document, caret: &Position, kind: BlockKind) -> EditResult<()> {
    let block_id = doc
        .enclosing_block(&caret.node)
        .map(|block| block.id.clone())
        .ok_or_else(|| EditError::not_found(&caret.node))?;

    let block = doc
        .block_mut(&block_id)
        .ok_or_else(|| EditError::not_found(&block_id))?;
    if block.kind == kind {
        return Err(EditError::no_op(format!("Line is already {}", kind.tag_name())));
    }
    block.kind = kind;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quillpad_model::Wrapper;

    fn ids() -> IdGenerator {
        IdGenerator::from_seed("n".into())
    }

    #[test]
    fn test_enter_in_heading_opens_paragraph_after_it() {
        let mut doc = Document::from_blocks(vec![
            Block::new("h".into(), BlockKind::Heading1)
                .with_children(vec![Inline::text("ht".into(), "Title")]),
            Block::new("p".into(), BlockKind::Paragraph),
        ]);
        let mut ids = ids();

        let outcome = enter(&mut doc, &Position::new("ht", 2), &mut ids).unwrap();

        assert_eq!(doc.blocks.len(), 3);
        assert_eq!(doc.blocks[0].text(), "Title");
        assert_eq!(doc.blocks[1].kind, BlockKind::Paragraph);
        assert!(doc.blocks[1].is_empty());
        assert_eq!(
            outcome,
            EnterOutcome::EscapedHeading {
                paragraph: Selection::start_of(doc.blocks[1].id.clone())
            }
        );
    }

    #[test]
    fn test_enter_in_last_heading_keeps_paragraph_reachable() {
        let mut doc = Document::from_blocks(vec![Block::new("h".into(), BlockKind::Heading3)]);
        let mut ids = ids();

        enter(&mut doc, &Position::new("h", 0), &mut ids).unwrap();

        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.blocks[1].kind, BlockKind::Paragraph);
    }

    #[test]
    fn test_enter_in_paragraph_splits_through_wrappers() {
        let mut doc = Document::from_blocks(vec![Block::new("p".into(), BlockKind::Paragraph)
            .with_children(vec![
                Inline::text("t1".into(), "one "),
                Inline::styled("b".into(), Wrapper::Bold, vec![Inline::text("t2".into(), "twothree")]),
            ])]);
        let mut ids = ids();

        let outcome = enter(&mut doc, &Position::new("t2", 3), &mut ids).unwrap();

        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.blocks[0].text(), "one two");
        assert_eq!(doc.blocks[1].text(), "three");
        assert_eq!(doc.blocks[1].kind, BlockKind::Paragraph);
        match &doc.blocks[1].children[0] {
            Inline::Styled { wrapper, .. } => assert_eq!(*wrapper, Wrapper::Bold),
            other => panic!("Expected bold wrapper, got {:?}", other),
        }
        assert_eq!(outcome.caret(), &Selection::start_of(doc.blocks[1].id.clone()));
    }

    fn bold_paragraph() -> Document {
        Document::from_blocks(vec![Block::new("p".into(), BlockKind::Paragraph).with_children(vec![
            Inline::styled("b".into(), Wrapper::Bold, vec![Inline::text("t".into(), "bold")]),
        ])])
    }

    #[test]
    fn test_enter_at_end_of_wrapper_leaves_no_empty_copy() {
        let mut doc = bold_paragraph();
        let mut ids = ids();

        enter(&mut doc, &Position::new("t", 4), &mut ids).unwrap();

        assert_eq!(
            quillpad_model::serialize(&doc),
            "<p><b>bold</b></p><p><br></p>"
        );
    }

    #[test]
    fn test_enter_at_start_of_wrapper_leaves_no_empty_copy() {
        let mut doc = bold_paragraph();
        let mut ids = ids();

        let outcome = enter(&mut doc, &Position::new("t", 0), &mut ids).unwrap();

        assert_eq!(
            quillpad_model::serialize(&doc),
            "<p><br></p><p><b>bold</b></p>"
        );
        assert_eq!(outcome.caret(), &Selection::start_of(doc.blocks[1].id.clone()));
    }

    #[test]
    fn test_set_block_kind() {
        let mut doc = Document::from_blocks(vec![Block::new("p".into(), BlockKind::Paragraph)
            .with_children(vec![Inline::text("t".into(), "x")])]);

        set_block_kind(&mut doc, &Position::new("t", 0), BlockKind::Heading2).unwrap();
        assert_eq!(doc.blocks[0].kind, BlockKind::Heading2);

        let again = set_block_kind(&mut doc, &Position::new("t", 0), BlockKind::Heading2);
        assert!(matches!(again, Err(EditError::NoOp(_))));
    }
}
