//! Inline formatting: clear-formatting and wrapper commands

use crate::errors::{EditError, EditResult};
use crate::selection::{Position, Selection};
use crate::text_ops::range_boundaries;
use quillpad_common::{walk_block_mut, walk_inlines_mut, VisitorMut};
use quillpad_model::{Attributes, BlockKind, Document, IdGenerator, Inline, NodeRef, Wrapper};
use serde::{Deserialize, Serialize};

/// Which wrappers clear-formatting unwraps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClearFormattingPolicy {
    /// Unwrap plain spans only; bold/italic/underline/links/headings stay
    #[default]
    PreserveSemantic,
    /// Legacy policy: also unwrap bold/italic/underline and demote headings
    Strict,
}

/// Post-order pass that strips presentation attributes and unwraps
/// presentational wrappers in place
pub struct ClearFormatting {
    policy: ClearFormattingPolicy,
    pub unwrapped: usize,
}

impl ClearFormatting {
    pub fn new(policy: ClearFormattingPolicy) -> Self {
        Self {
            policy,
            unwrapped: 0,
        }
    }

    fn should_unwrap(&self, wrapper: &Wrapper) -> bool {
        match self.policy {
            ClearFormattingPolicy::PreserveSemantic => !wrapper.is_semantic(),
            ClearFormattingPolicy::Strict => !matches!(wrapper, Wrapper::Link { .. }),
        }
    }
}

impl VisitorMut for ClearFormatting {
    fn visit_block_mut(&mut self, block: &mut quillpad_model::Block) {
        walk_block_mut(self, block);
        block.attributes.clear();
        if self.policy == ClearFormattingPolicy::Strict && block.kind.is_heading() {
            block.kind = BlockKind::Paragraph;
        }
    }

    fn visit_inlines_mut(&mut self, inlines: &mut Vec<Inline>) {
        // Children first, so nested wrappers are already flattened
        walk_inlines_mut(self, inlines);

        let mut index = 0;
        while index < inlines.len() {
            let unwrap = match &mut inlines[index] {
                Inline::Styled {
                    wrapper,
                    attributes,
                    ..
                } => {
                    attributes.clear();
                    self.should_unwrap(wrapper)
                }
                _ => false,
            };

            if unwrap {
                if let Inline::Styled { children, .. } = inlines.remove(index) {
                    let count = children.len();
                    inlines.splice(index..index, children);
                    index += count;
                    self.unwrapped += 1;
                    continue;
                }
            }
            index += 1;
        }
    }
}

/// Run clear-formatting over the whole document
pub fn clear_formatting(doc: &mut Document, policy: ClearFormattingPolicy) -> usize {
    let mut pass = ClearFormatting::new(policy);
    pass.visit_document_mut(doc);
    pass.unwrapped
}

/// Wrap the selection in a wrapper, or unwrap it when the whole selection
/// already sits inside a wrapper of the same kind (toolbar toggles)
pub fn toggle_wrapper(
    doc: &mut Document,
    selection: &Selection,
    wrapper: Wrapper,
    ids: &mut IdGenerator,
) -> EditResult<Selection> {
    if let Some(existing) = common_wrapper(doc, selection, &wrapper) {
        unwrap_node(doc, &existing)?;
        return Ok(selection.revalidate(doc).unwrap_or_else(|| selection.clone()));
    }
    wrap_selection(doc, selection, wrapper, Attributes::default(), ids)
}

/// Wrap the selected children of one container in a new wrapper
pub fn wrap_selection(
    doc: &mut Document,
    selection: &Selection,
    wrapper: Wrapper,
    attributes: Attributes,
    ids: &mut IdGenerator,
) -> EditResult<Selection> {
    if selection.is_collapsed() {
        return Err(EditError::validation("Select some text to format"));
    }

    let (container, lo, hi) = range_boundaries(doc, selection, ids)?;
    let children = doc
        .inline_children_mut(&container)
        .ok_or_else(|| EditError::not_found(&container))?;
    let hi = hi.min(children.len());
    if lo >= hi {
        return Err(EditError::validation("Select some text to format"));
    }

    let wrapped: Vec<Inline> = children.drain(lo..hi).collect();
    let count = wrapped.len();
    let id = ids.new_id();
    children.insert(
        lo,
        Inline::Styled {
            id: id.clone(),
            wrapper,
            attributes,
            children: wrapped,
        },
    );

    Ok(Selection::new(Position::new(id.clone(), 0), Position::new(id, count)))
}

/// CSS value for a toolbar font size: legacy steps 1-7 or a CSS length
pub fn font_size_value(size: &str) -> EditResult<String> {
    const STEPS: [&str; 7] = [
        "x-small", "small", "medium", "large", "x-large", "xx-large", "xxx-large",
    ];

    let size = size.trim();
    if let Ok(step) = size.parse::<usize>() {
        return match step {
            1..=7 => Ok(STEPS[step - 1].to_string()),
            _ => Err(EditError::validation("Font size must be between 1 and 7")),
        };
    }
    let is_length = size
        .find(|c: char| c.is_ascii_alphabetic() || c == '%')
        .map(|unit| unit > 0 && size[..unit].parse::<f64>().map(|n| n > 0.0).unwrap_or(false))
        .unwrap_or(false);
    if is_length {
        Ok(size.to_string())
    } else {
        Err(EditError::validation(format!("Unsupported font size: {}", size)))
    }
}

/// Wrap the selection in a span carrying one style property
pub fn apply_style(
    doc: &mut Document,
    selection: &Selection,
    property: &str,
    value: &str,
    ids: &mut IdGenerator,
) -> EditResult<Selection> {
    if value.trim().is_empty() {
        return Err(EditError::validation(format!("Missing value for {}", property)));
    }
    wrap_selection(
        doc,
        selection,
        Wrapper::Span,
        Attributes::with_style(property, value.trim()),
        ids,
    )
}

/// Turn the selection into a link
pub fn apply_link(
    doc: &mut Document,
    selection: &Selection,
    href: &str,
    ids: &mut IdGenerator,
) -> EditResult<Selection> {
    let href = href.trim();
    if href.is_empty() {
        return Err(EditError::validation("Enter a link address"));
    }
    wrap_selection(
        doc,
        selection,
        Wrapper::Link {
            href: href.to_string(),
        },
        Attributes::default(),
        ids,
    )
}

/// Nearest wrapper of the same kind enclosing both ends of the selection
fn common_wrapper(doc: &Document, selection: &Selection, wrapper: &Wrapper) -> Option<String> {
    let same_kind = |candidate: &Wrapper| {
        std::mem::discriminant(candidate) == std::mem::discriminant(wrapper)
    };

    let anchor_path = doc.path_to(&selection.anchor.node)?;
    let focus_path = doc.path_to(&selection.focus.node)?;

    anchor_path.iter().rev().find_map(|node| match node {
        NodeRef::Inline(Inline::Styled { id, wrapper, .. })
            if same_kind(wrapper) && focus_path.iter().any(|n| n.id() == id.as_str()) =>
        {
            Some(id.clone())
        }
        _ => None,
    })
}

/// Replace a wrapper with its children at its own position
pub fn unwrap_node(doc: &mut Document, id: &str) -> EditResult<()> {
    let (container, index) =
        crate::selection::parent_of(doc, id).ok_or_else(|| EditError::not_found(id))?;
    let siblings = doc
        .inline_children_mut(&container)
        .ok_or_else(|| EditError::not_found(&container))?;

    match siblings.remove(index) {
        Inline::Styled { children, .. } => {
            siblings.splice(index..index, children);
            Ok(())
        }
        other => {
            siblings.insert(index, other);
            Err(EditError::validation("Only styled content can be unwrapped"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quillpad_model::Block;

    fn styled_doc() -> Document {
        let mut outer_span = Inline::styled(
            "s1".into(),
            Wrapper::Span,
            vec![
                Inline::text("a".into(), "a"),
                Inline::styled("s2".into(), Wrapper::Span, vec![Inline::text("b".into(), "b")]),
                Inline::styled("bold".into(), Wrapper::Bold, vec![Inline::text("c".into(), "c")]),
            ],
        );
        if let Inline::Styled { attributes, .. } = &mut outer_span {
            *attributes = Attributes::with_style("color", "red");
        }

        let mut heading = Block::new("h".into(), BlockKind::Heading1)
            .with_children(vec![Inline::text("ht".into(), "T")]);
        heading.attributes.class.push("fancy".into());

        Document::from_blocks(vec![
            heading,
            Block::new("p".into(), BlockKind::Paragraph)
                .with_children(vec![outer_span, Inline::text("d".into(), "d")]),
        ])
    }

    #[test]
    fn test_clear_formatting_unwraps_spans_in_order() {
        let mut doc = styled_doc();
        let unwrapped = clear_formatting(&mut doc, ClearFormattingPolicy::PreserveSemantic);

        assert_eq!(unwrapped, 2);
        let ids: Vec<&str> = doc.blocks[1].children.iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["a", "b", "bold", "d"]);
        assert!(doc.blocks[0].attributes.is_empty());
        assert_eq!(doc.blocks[0].kind, BlockKind::Heading1);
    }

    #[test]
    fn test_clear_formatting_is_idempotent() {
        let mut once = styled_doc();
        clear_formatting(&mut once, ClearFormattingPolicy::PreserveSemantic);
        let mut twice = once.clone();
        let unwrapped = clear_formatting(&mut twice, ClearFormattingPolicy::PreserveSemantic);

        assert_eq!(unwrapped, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_strict_policy_unwraps_semantic_tags() {
        let mut doc = styled_doc();
        clear_formatting(&mut doc, ClearFormattingPolicy::Strict);

        assert_eq!(doc.blocks[0].kind, BlockKind::Paragraph);
        assert!(doc.blocks[1]
            .children
            .iter()
            .all(|c| matches!(c, Inline::Text { .. })));
        assert_eq!(doc.blocks[1].text(), "abcd");
    }

    #[test]
    fn test_toggle_bold_wraps_then_unwraps() {
        let mut doc = Document::from_blocks(vec![Block::new("p".into(), BlockKind::Paragraph)
            .with_children(vec![Inline::text("t".into(), "make this bold")])]);
        let mut ids = IdGenerator::from_seed("f".into());

        let sel = Selection::new(Position::new("t", 10), Position::new("t", 14));
        let wrapped = toggle_wrapper(&mut doc, &sel, Wrapper::Bold, &mut ids).unwrap();

        let children = &doc.blocks[0].children;
        assert_eq!(children.len(), 2);
        assert!(matches!(&children[1], Inline::Styled { wrapper: Wrapper::Bold, .. }));
        assert_eq!(doc.blocks[0].text(), "make this bold");

        toggle_wrapper(&mut doc, &wrapped, Wrapper::Bold, &mut ids).unwrap();
        assert!(doc.blocks[0]
            .children
            .iter()
            .all(|c| matches!(c, Inline::Text { .. })));
        assert_eq!(doc.blocks[0].text(), "make this bold");
    }

    #[test]
    fn test_font_size_values() {
        assert_eq!(font_size_value("3").unwrap(), "medium");
        assert_eq!(font_size_value("7").unwrap(), "xxx-large");
        assert_eq!(font_size_value("14px").unwrap(), "14px");
        assert_eq!(font_size_value("1.5em").unwrap(), "1.5em");
        assert!(font_size_value("0").is_err());
        assert!(font_size_value("px").is_err());
        assert!(font_size_value("big").is_err());
    }

    #[test]
    fn test_link_wraps_selection() {
        let mut doc = Document::from_blocks(vec![Block::new("p".into(), BlockKind::Paragraph)
            .with_children(vec![Inline::text("t".into(), "see docs")])]);
        let mut ids = IdGenerator::from_seed("f".into());
        let sel = Selection::new(Position::new("t", 4), Position::new("t", 8));

        assert!(apply_link(&mut doc, &sel, "  ", &mut ids).is_err());
        apply_link(&mut doc, &sel, "https://example.com", &mut ids).unwrap();

        let html = quillpad_model::serialize(&doc);
        assert_eq!(html, r#"<p>see <a href="https://example.com">docs</a></p>"#);
    }

    #[test]
    fn test_wrap_requires_a_range() {
        let mut doc = Document::from_blocks(vec![Block::new("p".into(), BlockKind::Paragraph)
            .with_children(vec![Inline::text("t".into(), "x")])]);
        let mut ids = IdGenerator::from_seed("f".into());
        let caret = Selection::collapsed(Position::new("t", 0));

        let result = toggle_wrapper(&mut doc, &caret, Wrapper::Italic, &mut ids);
        assert!(matches!(result, Err(EditError::Validation(_))));
    }
}
