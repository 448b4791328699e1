//! Embedded images: insertion, resize, move, crop and delete
//!
//! Cropping is split in two: [`rasterize_crop`] is a pure function that
//! does the pixel work and may run off the edit path, and [`apply_crop`]
//! commits its [`CropOutcome`] like any other edit.

use crate::errors::{EditError, EditResult};
use crate::selection::Selection;
use crate::text_ops::{insert_inlines, insertion_point_or_end};
use image::{DynamicImage, ImageFormat};
use quillpad_model::{
    CropRect, Document, EmbeddedObject, IdGenerator, Image, ImageSource, Inline, NodeId, Placement,
};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tracing::debug;

/// Smallest width or height a resize may produce
pub const MIN_IMAGE_SIZE: u32 = 16;

/// Rectangle in on-screen coordinates, relative to the image's top-left
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Region {
    /// Rectangle spanned by two corner points, in either order
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            x: a.0.min(b.0),
            y: a.1.min(b.1),
            width: (a.0 - b.0).abs(),
            height: (a.1 - b.1).abs(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width < 1.0 || self.height < 1.0
    }
}

/// Context-menu commands scoped to one image instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ImageCommand {
    Resize { width: u32, height: u32 },
    Move { x: f64, y: f64 },
    Crop { region: Region },
    Delete,
}

/// Result of rasterizing a crop, ready to be committed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropOutcome {
    pub image_id: NodeId,
    pub source: ImageSource,
    pub width: u32,
    pub height: u32,
    pub crop: Option<CropRect>,
}

/// Crop work captured from the document, runnable off the edit path
///
/// The job owns a copy of the image, so running it never touches the
/// document; its result comes back through [`apply_crop`].
#[derive(Debug, Clone)]
pub struct CropJob {
    image: Image,
    region: Region,
}

impl CropJob {
    pub fn new(doc: &Document, image_id: &str, region: Region) -> EditResult<Self> {
        let image = doc
            .find_image(image_id)
            .ok_or_else(|| EditError::not_found(image_id))?
            .clone();
        Ok(Self { image, region })
    }

    pub fn image_id(&self) -> &str {
        &self.image.id
    }

    pub fn run(&self) -> EditResult<CropOutcome> {
        rasterize_crop(&self.image, &self.region)
    }
}

/// Sniff the format of a binary payload and read its natural size
pub fn decode(bytes: &[u8]) -> EditResult<(ImageFormat, DynamicImage)> {
    let format = image::guess_format(bytes)?;
    let decoded = image::load_from_memory_with_format(bytes, format)?;
    Ok((format, decoded))
}

/// Insert an image from binary data at the caret; the caret moves after it
pub fn insert_image(
    doc: &mut Document,
    selection: Option<&Selection>,
    bytes: Vec<u8>,
    ids: &mut IdGenerator,
) -> EditResult<(NodeId, Selection)> {
    // Decode before touching the tree so a bad payload leaves it unchanged
    let (format, decoded) = decode(&bytes)?;
    let image = Image {
        id: ids.new_id(),
        source: ImageSource::Data {
            mime: format.to_mime_type().to_string(),
            bytes,
        },
        width: decoded.width(),
        height: decoded.height(),
        crop: None,
        placement: None,
    };
    insert_object(doc, selection, image, ids)
}

/// Insert an image that references external content
pub fn insert_image_uri(
    doc: &mut Document,
    selection: Option<&Selection>,
    uri: String,
    width: u32,
    height: u32,
    ids: &mut IdGenerator,
) -> EditResult<(NodeId, Selection)> {
    if uri.trim().is_empty() {
        return Err(EditError::validation("Image address is empty"));
    }
    let image = Image {
        id: ids.new_id(),
        source: ImageSource::Uri(uri),
        width: width.max(1),
        height: height.max(1),
        crop: None,
        placement: None,
    };
    insert_object(doc, selection, image, ids)
}

fn insert_object(
    doc: &mut Document,
    selection: Option<&Selection>,
    image: Image,
    ids: &mut IdGenerator,
) -> EditResult<(NodeId, Selection)> {
    let point = insertion_point_or_end(doc, selection, ids)?;
    let id = image.id.clone();
    debug!(image = %id, width = image.width, height = image.height, "Inserting image");

    let caret = insert_inlines(
        doc,
        &point,
        vec![Inline::Embed {
            object: EmbeddedObject::Image(image),
        }],
        ids,
    )?;
    Ok((id, Selection::collapsed(caret)))
}

/// Apply a context-menu command to the image with the given id
pub fn apply_image_command(doc: &mut Document, image_id: &str, command: &ImageCommand) -> EditResult<()> {
    match command {
        ImageCommand::Resize { width, height } => resize(doc, image_id, *width, *height),
        ImageCommand::Move { x, y } => {
            let image = doc
                .image_mut(image_id)
                .ok_or_else(|| EditError::not_found(image_id))?;
            image.placement = Some(Placement { x: *x, y: *y });
            Ok(())
        }
        ImageCommand::Crop { region } => {
            let image = doc
                .find_image(image_id)
                .ok_or_else(|| EditError::not_found(image_id))?;
            let outcome = rasterize_crop(image, region)?;
            apply_crop(doc, outcome)
        }
        ImageCommand::Delete => {
            if doc.find_image(image_id).is_none() {
                return Err(EditError::not_found(image_id));
            }
            doc.remove(image_id);
            Ok(())
        }
    }
}

/// Set the display size, never below [`MIN_IMAGE_SIZE`]
pub fn resize(doc: &mut Document, image_id: &str, width: u32, height: u32) -> EditResult<()> {
    let image = doc
        .image_mut(image_id)
        .ok_or_else(|| EditError::not_found(image_id))?;
    let width = width.max(MIN_IMAGE_SIZE);
    let height = height.max(MIN_IMAGE_SIZE);
    if image.width == width && image.height == height {
        return Err(EditError::no_op("Image size unchanged"));
    }
    image.width = width;
    image.height = height;
    Ok(())
}

/// Rasterize the part of an image under an on-screen region
///
/// Embedded pixel data is cropped and re-encoded as PNG. External images
/// cannot be read here, so they keep their source and get a crop rectangle
/// instead.
pub fn rasterize_crop(image: &Image, region: &Region) -> EditResult<CropOutcome> {
    let display_w = f64::from(image.width.max(1));
    let display_h = f64::from(image.height.max(1));

    // Clamp to the displayed image
    let left = region.x.clamp(0.0, display_w);
    let top = region.y.clamp(0.0, display_h);
    let right = (region.x + region.width).clamp(0.0, display_w);
    let bottom = (region.y + region.height).clamp(0.0, display_h);
    let shown = Region {
        x: left,
        y: top,
        width: right - left,
        height: bottom - top,
    };
    if shown.is_empty() {
        return Err(EditError::validation("Crop area does not cover the image"));
    }

    let out_width = shown.width.round() as u32;
    let out_height = shown.height.round() as u32;

    match &image.source {
        ImageSource::Data { bytes, .. } => {
            let (_, decoded) = decode(bytes)?;
            let rect = to_pixels(&shown, display_w, display_h, decoded.width(), decoded.height());
            let cropped = decoded.crop_imm(rect.x, rect.y, rect.width, rect.height);

            let mut png = Vec::new();
            cropped.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
            debug!(image = %image.id, bytes = png.len(), "Rasterized crop");

            Ok(CropOutcome {
                image_id: image.id.clone(),
                source: ImageSource::Data {
                    mime: "image/png".to_string(),
                    bytes: png,
                },
                width: out_width,
                height: out_height,
                crop: None,
            })
        }
        ImageSource::Uri(_) => {
            // Crop rectangles compose: new coordinates are inside the old crop
            let (base_x, base_y, base_w, base_h) = match image.crop {
                Some(c) => (c.x, c.y, c.width, c.height),
                None => (0, 0, image.width, image.height),
            };
            let inner = to_pixels(&shown, display_w, display_h, base_w, base_h);

            Ok(CropOutcome {
                image_id: image.id.clone(),
                source: image.source.clone(),
                width: out_width,
                height: out_height,
                crop: Some(CropRect {
                    x: base_x + inner.x,
                    y: base_y + inner.y,
                    width: inner.width,
                    height: inner.height,
                }),
            })
        }
    }
}

/// Commit a rasterized crop; the image may have been deleted meanwhile
pub fn apply_crop(doc: &mut Document, outcome: CropOutcome) -> EditResult<()> {
    let image = doc
        .image_mut(&outcome.image_id)
        .ok_or_else(|| EditError::not_found(&outcome.image_id))?;
    image.source = outcome.source;
    image.width = outcome.width.max(1);
    image.height = outcome.height.max(1);
    image.crop = outcome.crop;
    Ok(())
}

/// Scale a display-space region to pixel space, keeping at least one pixel
fn to_pixels(shown: &Region, display_w: f64, display_h: f64, natural_w: u32, natural_h: u32) -> CropRect {
    let scale_x = f64::from(natural_w) / display_w;
    let scale_y = f64::from(natural_h) / display_h;

    let x = ((shown.x * scale_x).floor() as u32).min(natural_w.saturating_sub(1));
    let y = ((shown.y * scale_y).floor() as u32).min(natural_h.saturating_sub(1));
    let width = ((shown.width * scale_x).round() as u32).clamp(1, natural_w - x);
    let height = ((shown.height * scale_y).round() as u32).clamp(1, natural_h - y);

    CropRect { x, y, width, height }
}
