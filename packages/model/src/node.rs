use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of any node in the content tree
pub type NodeId = String;

/// Presentation attributes (inline style and class list)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub class: Vec<String>,
}

impl Attributes {
    pub fn with_style(property: impl Into<String>, value: impl Into<String>) -> Self {
        let mut attributes = Self::default();
        attributes.style.insert(property.into(), value.into());
        attributes
    }

    pub fn is_empty(&self) -> bool {
        self.style.is_empty() && self.class.is_empty()
    }

    pub fn clear(&mut self) {
        self.style.clear();
        self.class.clear();
    }
}

/// Block kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    /// Generic container (a plain `div` line)
    Container,
}

impl BlockKind {
    pub fn is_heading(&self) -> bool {
        matches!(self, BlockKind::Heading1 | BlockKind::Heading2 | BlockKind::Heading3)
    }

    pub fn tag_name(&self) -> &'static str {
        match self {
            BlockKind::Paragraph => "p",
            BlockKind::Heading1 => "h1",
            BlockKind::Heading2 => "h2",
            BlockKind::Heading3 => "h3",
            BlockKind::Container => "div",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "p" => Some(BlockKind::Paragraph),
            "h1" => Some(BlockKind::Heading1),
            "h2" => Some(BlockKind::Heading2),
            "h3" => Some(BlockKind::Heading3),
            "div" => Some(BlockKind::Container),
            _ => None,
        }
    }
}

/// Block node: a top-level structural unit (or a block inside a table cell)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: NodeId,
    pub kind: BlockKind,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
    pub children: Vec<Inline>,
}

impl Block {
    pub fn new(id: NodeId, kind: BlockKind) -> Self {
        Self {
            id,
            kind,
            attributes: Attributes::default(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Inline>) -> Self {
        self.children = children;
        self
    }

    /// True when the block holds no visible content
    pub fn is_empty(&self) -> bool {
        self.children.iter().all(Inline::is_blank)
    }

    /// Concatenated text of all runs in the block
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }
}

/// Wrapper kinds for styled inline content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Wrapper {
    Bold,
    Italic,
    Underline,
    /// Purely presentational wrapper
    Span,
    Link { href: String },
}

impl Wrapper {
    pub fn tag_name(&self) -> &'static str {
        match self {
            Wrapper::Bold => "b",
            Wrapper::Italic => "i",
            Wrapper::Underline => "u",
            Wrapper::Span => "span",
            Wrapper::Link { .. } => "a",
        }
    }

    /// Semantic wrappers carry meaning beyond presentation
    pub fn is_semantic(&self) -> bool {
        !matches!(self, Wrapper::Span)
    }
}

/// Inline content inside a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Inline {
    Text {
        id: NodeId,
        text: String,
    },

    Styled {
        id: NodeId,
        wrapper: Wrapper,
        #[serde(default, skip_serializing_if = "Attributes::is_empty")]
        attributes: Attributes,
        children: Vec<Inline>,
    },

    LineBreak {
        id: NodeId,
    },

    Embed {
        object: EmbeddedObject,
    },
}

impl Inline {
    pub fn text(id: NodeId, text: impl Into<String>) -> Self {
        Inline::Text {
            id,
            text: text.into(),
        }
    }

    pub fn styled(id: NodeId, wrapper: Wrapper, children: Vec<Inline>) -> Self {
        Inline::Styled {
            id,
            wrapper,
            attributes: Attributes::default(),
            children,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Inline::Text { id, .. } | Inline::Styled { id, .. } | Inline::LineBreak { id } => id,
            Inline::Embed { object } => object.id(),
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            Inline::Text { text, .. } => text.is_empty(),
            Inline::LineBreak { .. } => true,
            Inline::Styled { children, .. } => children.iter().all(Inline::is_blank),
            Inline::Embed { .. } => false,
        }
    }

    pub(crate) fn collect_text(&self, out: &mut String) {
        match self {
            Inline::Text { text, .. } => out.push_str(text),
            Inline::Styled { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
            Inline::LineBreak { .. } | Inline::Embed { .. } => {}
        }
    }
}

/// Embedded objects addressable by id from context menus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EmbeddedObject {
    Image(Image),
    Table(Table),
}

impl EmbeddedObject {
    pub fn id(&self) -> &str {
        match self {
            EmbeddedObject::Image(image) => &image.id,
            EmbeddedObject::Table(table) => &table.id,
        }
    }
}

/// Free placement of a dragged object, relative to its flow position
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
}

/// Rectangle in image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Where an image's pixels come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    Data {
        mime: String,
        #[serde(with = "base64_bytes")]
        bytes: Vec<u8>,
    },
    Uri(String),
}

impl ImageSource {
    /// `src` attribute value
    pub fn to_src(&self) -> String {
        use base64::{engine::general_purpose::STANDARD, Engine as _};

        match self {
            ImageSource::Data { mime, bytes } => {
                format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
            }
            ImageSource::Uri(uri) => uri.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: NodeId,
    pub source: ImageSource,
    pub width: u32,
    pub height: u32,
    /// Non-destructive crop, used when the pixels cannot be rasterized locally
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropRect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: NodeId,
    pub rows: Vec<TableRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column count, taken from the first row
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|row| row.cells.len()).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub id: NodeId,
    pub cells: Vec<TableCell>,
}

/// A table cell is itself a block container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub id: NodeId,
    pub blocks: Vec<Block>,
}

/// Serde adapter storing binary payloads as base64 strings
pub mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
