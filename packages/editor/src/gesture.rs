//! Pointer-drag gestures over embedded objects
//!
//! A drag is a small state machine fed with discrete pointer messages.
//! Nothing touches the document while a drag is in flight; releasing the
//! pointer yields at most one [`GestureCommit`], cancelling yields none.

use crate::errors::{EditError, EditResult};
use crate::images::{Region, MIN_IMAGE_SIZE};
use quillpad_model::{Document, EmbeddedObject, Inline, NodeId, Placement};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DragKind {
    /// Corner handle of an image
    Resize,
    /// Rectangle drawn over an image
    Crop,
    /// Whole image or table
    Move,
}

/// Pointer messages, in the coordinate space of the editing surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum PointerEvent {
    Down {
        target: NodeId,
        kind: DragKind,
        x: f64,
        y: f64,
        /// On-screen top-left of the target; defaults to its placement
        #[serde(default, skip_serializing_if = "Option::is_none")]
        origin: Option<Placement>,
    },
    Move {
        x: f64,
        y: f64,
    },
    Up {
        x: f64,
        y: f64,
    },
    Cancel,
}

/// State captured when the pointer went down
#[derive(Debug, Clone, PartialEq)]
pub struct Drag {
    pub target: NodeId,
    pub kind: DragKind,
    pub origin: (f64, f64),
    pub current: (f64, f64),
    /// Top-left of the target on the surface
    target_origin: Placement,
    start_size: (u32, u32),
    start_placement: Placement,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging(Drag),
}

/// The single mutation a finished drag asks for
#[derive(Debug, Clone, PartialEq)]
pub enum GestureCommit {
    Resize {
        target: NodeId,
        width: u32,
        height: u32,
    },
    Crop {
        target: NodeId,
        region: Region,
    },
    Move {
        target: NodeId,
        placement: Placement,
    },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    /// Feed one pointer message; returns a commit when a drag completes
    pub fn handle(&mut self, doc: &Document, event: PointerEvent) -> EditResult<Option<GestureCommit>> {
        match event {
            PointerEvent::Down {
                target,
                kind,
                x,
                y,
                origin,
            } => {
                *self = Gesture::Dragging(start_drag(doc, target, kind, (x, y), origin)?);
                Ok(None)
            }
            PointerEvent::Move { x, y } => {
                if let Gesture::Dragging(drag) = self {
                    drag.current = (x, y);
                }
                Ok(None)
            }
            PointerEvent::Up { x, y } => match std::mem::take(self) {
                Gesture::Dragging(mut drag) => {
                    drag.current = (x, y);
                    Ok(drag.finish())
                }
                Gesture::Idle => Ok(None),
            },
            PointerEvent::Cancel => {
                *self = Gesture::Idle;
                Ok(None)
            }
        }
    }
}

fn start_drag(
    doc: &Document,
    target: NodeId,
    kind: DragKind,
    origin: (f64, f64),
    target_origin: Option<Placement>,
) -> EditResult<Drag> {
    let (start_size, start_placement) = match doc.find(&target) {
        Some(quillpad_model::NodeRef::Inline(Inline::Embed { object })) => match object {
            EmbeddedObject::Image(image) => (
                (image.width, image.height),
                image.placement.unwrap_or_default(),
            ),
            EmbeddedObject::Table(table) if kind == DragKind::Move => {
                ((0, 0), table.placement.unwrap_or_default())
            }
            EmbeddedObject::Table(_) => {
                return Err(EditError::validation("Tables can only be moved"));
            }
        },
        _ => return Err(EditError::not_found(&target)),
    };

    Ok(Drag {
        target,
        kind,
        origin,
        current: origin,
        target_origin: target_origin.unwrap_or(start_placement),
        start_size,
        start_placement,
    })
}

impl Drag {
    fn delta(&self) -> (f64, f64) {
        (self.current.0 - self.origin.0, self.current.1 - self.origin.1)
    }

    fn finish(self) -> Option<GestureCommit> {
        let (dx, dy) = self.delta();
        match self.kind {
            DragKind::Resize => {
                if dx == 0.0 && dy == 0.0 {
                    return None;
                }
                let grow = |start: u32, delta: f64| {
                    (f64::from(start) + delta).round().max(f64::from(MIN_IMAGE_SIZE)) as u32
                };
                Some(GestureCommit::Resize {
                    width: grow(self.start_size.0, dx),
                    height: grow(self.start_size.1, dy),
                    target: self.target,
                })
            }
            DragKind::Crop => {
                // Regions are relative to the image's top-left
                let local = |(x, y): (f64, f64)| (x - self.target_origin.x, y - self.target_origin.y);
                let region = Region::from_corners(local(self.origin), local(self.current));
                if region.is_empty() {
                    return None;
                }
                Some(GestureCommit::Crop {
                    target: self.target,
                    region,
                })
            }
            DragKind::Move => {
                if dx == 0.0 && dy == 0.0 {
                    return None;
                }
                Some(GestureCommit::Move {
                    target: self.target,
                    placement: Placement {
                        x: self.start_placement.x + dx,
                        y: self.start_placement.y + dy,
                    },
                })
            }
        }
    }
}

/// Set the free placement of an image or table
pub fn set_placement(doc: &mut Document, target: &str, placement: Placement) -> EditResult<()> {
    match doc.inline_mut(target) {
        Some(Inline::Embed {
            object: EmbeddedObject::Image(image),
        }) => image.placement = Some(placement),
        Some(Inline::Embed {
            object: EmbeddedObject::Table(table),
        }) => table.placement = Some(placement),
        _ => return Err(EditError::not_found(target)),
    }
    Ok(())
}
