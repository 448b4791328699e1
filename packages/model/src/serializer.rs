use crate::document::Document;
use crate::node::*;
use std::fmt::Write;

/// Serializer renders the content tree as nested semantic markup
///
/// This is the presentation direction only: model → markup. Output is
/// always well-formed; text and attribute values are escaped, empty
/// blocks carry a `<br>` so they stay editable.
pub struct Serializer {
    include_ids: bool,
}

impl Serializer {
    pub fn new() -> Self {
        Self { include_ids: false }
    }

    /// Emit `id` attributes on embedded objects and table parts
    pub fn with_ids() -> Self {
        Self { include_ids: true }
    }

    pub fn serialize(&mut self, doc: &Document) -> String {
        let mut output = String::new();
        self.serialize_blocks(&doc.blocks, &mut output);
        output
    }

    fn serialize_blocks(&mut self, blocks: &[Block], output: &mut String) {
        for block in blocks {
            self.serialize_block(block, output);
        }
    }

    fn serialize_block(&mut self, block: &Block, output: &mut String) {
        let tag = block.kind.tag_name();
        write!(output, "<{}", tag).unwrap();
        write_attributes(&block.attributes, output);
        output.push('>');

        if block.children.is_empty() {
            output.push_str("<br>");
        } else {
            for child in &block.children {
                self.serialize_inline(child, output);
            }
        }

        write!(output, "</{}>", tag).unwrap();
    }

    fn serialize_inline(&mut self, inline: &Inline, output: &mut String) {
        match inline {
            Inline::Text { text, .. } => output.push_str(&escape(text)),
            Inline::LineBreak { .. } => output.push_str("<br>"),
            Inline::Styled {
                wrapper,
                attributes,
                children,
                ..
            } => {
                let tag = wrapper.tag_name();
                write!(output, "<{}", tag).unwrap();
                if let Wrapper::Link { href } = wrapper {
                    write!(output, " href=\"{}\"", escape(href)).unwrap();
                }
                write_attributes(attributes, output);
                output.push('>');
                for child in children {
                    self.serialize_inline(child, output);
                }
                write!(output, "</{}>", tag).unwrap();
            }
            Inline::Embed { object } => match object {
                EmbeddedObject::Image(image) => self.serialize_image(image, output),
                EmbeddedObject::Table(table) => self.serialize_table(table, output),
            },
        }
    }

    fn serialize_image(&mut self, image: &Image, output: &mut String) {
        output.push_str("<img");
        self.write_id(&image.id, output);
        write!(
            output,
            " src=\"{}\" width=\"{}\" height=\"{}\"",
            escape(&image.source.to_src()),
            image.width,
            image.height
        )
        .unwrap();
        if let Some(crop) = &image.crop {
            write!(
                output,
                " data-crop=\"{},{},{},{}\"",
                crop.x, crop.y, crop.width, crop.height
            )
            .unwrap();
        }
        write_placement(image.placement, output);
        output.push('>');
    }

    fn serialize_table(&mut self, table: &Table, output: &mut String) {
        output.push_str("<table");
        self.write_id(&table.id, output);
        write_placement(table.placement, output);
        output.push('>');
        for row in &table.rows {
            output.push_str("<tr");
            self.write_id(&row.id, output);
            output.push('>');
            for cell in &row.cells {
                output.push_str("<td");
                self.write_id(&cell.id, output);
                output.push('>');
                self.serialize_blocks(&cell.blocks, output);
                output.push_str("</td>");
            }
            output.push_str("</tr>");
        }
        output.push_str("</table>");
    }

    fn write_id(&self, id: &str, output: &mut String) {
        if self.include_ids {
            write!(output, " id=\"{}\"", escape(id)).unwrap();
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

fn write_attributes(attributes: &Attributes, output: &mut String) {
    if !attributes.style.is_empty() {
        let style = attributes
            .style
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("; ");
        write!(output, " style=\"{}\"", escape(&style)).unwrap();
    }
    if !attributes.class.is_empty() {
        write!(output, " class=\"{}\"", escape(&attributes.class.join(" "))).unwrap();
    }
}

fn write_placement(placement: Option<Placement>, output: &mut String) {
    if let Some(p) = placement {
        write!(
            output,
            " style=\"position: relative; left: {}px; top: {}px\"",
            p.x, p.y
        )
        .unwrap();
    }
}

/// Escape text for markup content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Convenience function to serialize a document
pub fn serialize(doc: &Document) -> String {
    Serializer::new().serialize(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_blocks_and_wrappers() {
        let mut paragraph = Block::new("p".into(), BlockKind::Paragraph).with_children(vec![
            Inline::text("t1".into(), "a < b & "),
            Inline::styled("s".into(), Wrapper::Italic, vec![Inline::text("t2".into(), "c")]),
        ]);
        paragraph.attributes.class.push("lead".into());

        let doc = Document::from_blocks(vec![
            Block::new("h".into(), BlockKind::Heading2)
                .with_children(vec![Inline::text("ht".into(), "Title")]),
            paragraph,
        ]);

        assert_eq!(
            serialize(&doc),
            "<h2>Title</h2><p class=\"lead\">a &lt; b &amp; <i>c</i></p>"
        );
    }

    #[test]
    fn test_empty_block_stays_editable() {
        let doc = Document::from_blocks(vec![Block::new("p".into(), BlockKind::Paragraph)]);
        assert_eq!(serialize(&doc), "<p><br></p>");
    }

    #[test]
    fn test_serialize_link_and_styled_span() {
        let mut span = Inline::styled("s".into(), Wrapper::Span, vec![Inline::text("t".into(), "x")]);
        if let Inline::Styled { attributes, .. } = &mut span {
            *attributes = Attributes::with_style("font-size", "18px");
        }
        let link = Inline::styled(
            "a".into(),
            Wrapper::Link {
                href: "https://example.com/?q=\"1\"".into(),
            },
            vec![Inline::text("lt".into(), "go")],
        );
        let doc = Document::from_blocks(vec![
            Block::new("p".into(), BlockKind::Container).with_children(vec![span, link])
        ]);

        assert_eq!(
            serialize(&doc),
            "<div><span style=\"font-size: 18px\">x</span><a href=\"https://example.com/?q=&quot;1&quot;\">go</a></div>"
        );
    }

    #[test]
    fn test_serialize_table_with_ids() {
        let table = Table {
            id: "t".into(),
            rows: vec![TableRow {
                id: "r".into(),
                cells: vec![TableCell {
                    id: "c".into(),
                    blocks: vec![Block::new("cp".into(), BlockKind::Paragraph)],
                }],
            }],
            placement: None,
        };
        let doc = Document::from_blocks(vec![Block::new("p".into(), BlockKind::Paragraph)
            .with_children(vec![Inline::Embed {
                object: EmbeddedObject::Table(table),
            }])]);

        assert_eq!(
            Serializer::with_ids().serialize(&doc),
            "<p><table id=\"t\"><tr id=\"r\"><td id=\"c\"><p><br></p></td></tr></table></p>"
        );
    }
}
