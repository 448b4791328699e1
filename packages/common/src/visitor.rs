use quillpad_model::*;

/// Visitor pattern for traversing the content tree immutably
///
/// This trait provides default implementations that walk the entire tree
/// in document order. Override specific visit_* methods to act on nodes.
pub trait Visitor: Sized {
    fn visit_document(&mut self, doc: &Document) {
        walk_document(self, doc);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_inline(&mut self, inline: &Inline) {
        walk_inline(self, inline);
    }

    fn visit_text(&mut self, _id: &str, _text: &str) {
        // Leaf node, no children to walk
    }

    fn visit_image(&mut self, _image: &Image) {
        // Leaf node, no children to walk
    }

    fn visit_table(&mut self, table: &Table) {
        walk_table(self, table);
    }
}

/// Mutable visitor pattern for transforming the content tree
///
/// `visit_inlines_mut` receives whole sibling lists so implementors can
/// splice children in place (unwrap, merge, drop).
pub trait VisitorMut: Sized {
    fn visit_document_mut(&mut self, doc: &mut Document) {
        walk_document_mut(self, doc);
    }

    fn visit_block_mut(&mut self, block: &mut Block) {
        walk_block_mut(self, block);
    }

    fn visit_inlines_mut(&mut self, inlines: &mut Vec<Inline>) {
        walk_inlines_mut(self, inlines);
    }

    fn visit_inline_mut(&mut self, inline: &mut Inline) {
        walk_inline_mut(self, inline);
    }

    fn visit_table_mut(&mut self, table: &mut Table) {
        walk_table_mut(self, table);
    }
}

// Default walk implementations for immutable visitor

pub fn walk_document<V: Visitor>(visitor: &mut V, doc: &Document) {
    for block in &doc.blocks {
        visitor.visit_block(block);
    }
}

pub fn walk_block<V: Visitor>(visitor: &mut V, block: &Block) {
    for child in &block.children {
        visitor.visit_inline(child);
    }
}

pub fn walk_inline<V: Visitor>(visitor: &mut V, inline: &Inline) {
    match inline {
        Inline::Text { id, text } => visitor.visit_text(id, text),
        Inline::Styled { children, .. } => {
            for child in children {
                visitor.visit_inline(child);
            }
        }
        Inline::LineBreak { .. } => {
            // No children to walk
        }
        Inline::Embed { object } => match object {
            EmbeddedObject::Image(image) => visitor.visit_image(image),
            EmbeddedObject::Table(table) => visitor.visit_table(table),
        },
    }
}

pub fn walk_table<V: Visitor>(visitor: &mut V, table: &Table) {
    for row in &table.rows {
        for cell in &row.cells {
            for block in &cell.blocks {
                visitor.visit_block(block);
            }
        }
    }
}

// Default walk implementations for mutable visitor

pub fn walk_document_mut<V: VisitorMut>(visitor: &mut V, doc: &mut Document) {
    for block in &mut doc.blocks {
        visitor.visit_block_mut(block);
    }
}

pub fn walk_block_mut<V: VisitorMut>(visitor: &mut V, block: &mut Block) {
    visitor.visit_inlines_mut(&mut block.children);
}

pub fn walk_inlines_mut<V: VisitorMut>(visitor: &mut V, inlines: &mut Vec<Inline>) {
    for inline in inlines.iter_mut() {
        visitor.visit_inline_mut(inline);
    }
}

pub fn walk_inline_mut<V: VisitorMut>(visitor: &mut V, inline: &mut Inline) {
    match inline {
        Inline::Styled { children, .. } => visitor.visit_inlines_mut(children),
        Inline::Embed {
            object: EmbeddedObject::Table(table),
        } => visitor.visit_table_mut(table),
        Inline::Text { .. } | Inline::LineBreak { .. } | Inline::Embed { .. } => {}
    }
}

pub fn walk_table_mut<V: VisitorMut>(visitor: &mut V, table: &mut Table) {
    for row in &mut table.rows {
        for cell in &mut row.cells {
            for block in &mut cell.blocks {
                visitor.visit_block_mut(block);
            }
        }
    }
}

/// Collects `(id, text)` for every text run in document order
#[derive(Debug, Default)]
pub struct TextRunCollector {
    pub runs: Vec<(NodeId, String)>,
}

impl TextRunCollector {
    pub fn collect(doc: &Document) -> Vec<(NodeId, String)> {
        let mut collector = Self::default();
        collector.visit_document(doc);
        collector.runs
    }
}

impl Visitor for TextRunCollector {
    fn visit_text(&mut self, id: &str, text: &str) {
        self.runs.push((id.to_string(), text.to_string()));
    }
}

/// Collects the id of every node in the tree
#[derive(Debug, Default)]
pub struct IdCollector {
    pub ids: Vec<NodeId>,
}

impl IdCollector {
    pub fn collect(doc: &Document) -> Vec<NodeId> {
        let mut collector = Self::default();
        collector.visit_document(doc);
        collector.ids
    }
}

impl Visitor for IdCollector {
    fn visit_block(&mut self, block: &Block) {
        self.ids.push(block.id.clone());
        walk_block(self, block);
    }

    fn visit_inline(&mut self, inline: &Inline) {
        self.ids.push(inline.id().to_string());
        walk_inline(self, inline);
    }

    fn visit_table(&mut self, table: &Table) {
        for row in &table.rows {
            self.ids.push(row.id.clone());
            for cell in &row.cells {
                self.ids.push(cell.id.clone());
            }
        }
        walk_table(self, table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_table() -> Document {
        let table = Table {
            id: "tbl".into(),
            rows: vec![TableRow {
                id: "r".into(),
                cells: vec![TableCell {
                    id: "c".into(),
                    blocks: vec![Block::new("cp".into(), BlockKind::Paragraph)
                        .with_children(vec![Inline::text("ct".into(), "in cell")])],
                }],
            }],
            placement: None,
        };
        Document::from_blocks(vec![
            Block::new("p1".into(), BlockKind::Paragraph).with_children(vec![
                Inline::text("t1".into(), "one"),
                Inline::styled("b".into(), Wrapper::Bold, vec![Inline::text("t2".into(), "two")]),
            ]),
            Block::new("p2".into(), BlockKind::Paragraph).with_children(vec![Inline::Embed {
                object: EmbeddedObject::Table(table),
            }]),
        ])
    }

    #[test]
    fn test_text_runs_in_document_order() {
        let runs = TextRunCollector::collect(&doc_with_table());
        let ids: Vec<&str> = runs.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2", "ct"]);
        assert_eq!(runs[2].1, "in cell");
    }

    #[test]
    fn test_id_collector_reaches_table_parts() {
        let ids = IdCollector::collect(&doc_with_table());
        for expected in ["p1", "t1", "b", "t2", "p2", "tbl", "r", "c", "cp", "ct"] {
            assert!(ids.iter().any(|id| id == expected), "missing {}", expected);
        }
    }

    struct Uppercase;

    impl VisitorMut for Uppercase {
        fn visit_inline_mut(&mut self, inline: &mut Inline) {
            if let Inline::Text { text, .. } = inline {
                *text = text.to_uppercase();
            }
            walk_inline_mut(self, inline);
        }
    }

    #[test]
    fn test_visitor_mut_reaches_nested_text() {
        let mut doc = doc_with_table();
        Uppercase.visit_document_mut(&mut doc);
        assert_eq!(doc.to_plain_text(), "ONETWO\n\nIN CELL");
    }
}
