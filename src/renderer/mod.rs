//! The drawing seam between the compositor and a concrete backend.
//!
//! A backend implements [`DrawingContext`] once. The compositor only ever
//! issues translated, clipped, shape-aware fill/stroke/shadow calls, so a
//! backend can be a GPU renderer, a software rasterizer or the
//! [`RecordingContext`] used in tests.

mod commands;
pub mod compositor;

use std::fmt;
use std::sync::Arc;

pub use commands::{CommandLog, DrawCommand, RecordingContext};
pub use compositor::{composite, FrameStats};

use crate::corners::{Corners, Shape};
use crate::geometry::{Color, Point, Rect, Size};

/// Region a clip is pushed with, in the current origin's coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClipShape {
    Rect(Rect),
    Shape(Shape),
}

impl From<Rect> for ClipShape {
    fn from(rect: Rect) -> Self {
        ClipShape::Rect(rect)
    }
}

impl From<Shape> for ClipShape {
    fn from(shape: Shape) -> Self {
        if shape.corners.is_rect() {
            ClipShape::Rect(shape.rect)
        } else {
            ClipShape::Shape(shape)
        }
    }
}

struct ShadowImageInner {
    id: u64,
    size: Size,
    corners: Corners,
    blur: f32,
    color: Color,
}

/// A pre-rendered shadow owned by the backend.
///
/// Cheap to clone. The compositor caches one per view and asks the backend
/// for a new one only when the view's size, corners, blur or shadow color
/// change.
#[derive(Clone)]
pub struct ShadowImage(Arc<ShadowImageInner>);

impl ShadowImage {
    /// `id` is whatever handle the backend uses to find its texture again.
    pub fn new(id: u64, size: Size, corners: Corners, blur: f32, color: Color) -> Self {
        Self(Arc::new(ShadowImageInner {
            id,
            size,
            corners,
            blur,
            color,
        }))
    }

    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn size(&self) -> Size {
        self.0.size
    }

    pub fn corners(&self) -> Corners {
        self.0.corners
    }

    pub fn blur(&self) -> f32 {
        self.0.blur
    }

    pub fn color(&self) -> Color {
        self.0.color
    }

    /// Whether this image can be reused for a shadow with these parameters.
    pub fn matches(&self, size: Size, corners: Corners, blur: f32, color: Color) -> bool {
        self.0.size == size
            && self.0.corners == corners
            && self.0.blur == blur
            && self.0.color == color
    }
}

impl fmt::Debug for ShadowImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShadowImage")
            .field("id", &self.0.id)
            .field("size", &self.0.size)
            .field("blur", &self.0.blur)
            .finish()
    }
}

/// Drawing backend.
///
/// Coordinates passed to every call are relative to the current origin,
/// which the compositor moves with [`DrawingContext::move_origin`] as it
/// descends the tree. Clips nest: each `push_clip` intersects with the
/// active clip until the matching `pop_clip`.
pub trait DrawingContext: Send {
    fn begin_frame(&mut self);

    /// Present the frame.
    fn end_frame(&mut self);

    fn push_clip(&mut self, clip: ClipShape);

    fn pop_clip(&mut self);

    /// Translate the origin by `delta`.
    fn move_origin(&mut self, delta: Point);

    fn fill_rect(&mut self, shape: Shape, color: Color);

    fn stroke_rect(&mut self, shape: Shape, width: f32, color: Color);

    /// Render a blurred shadow for a shape of `size` with `corners`.
    fn create_shadow_image(
        &mut self,
        size: Size,
        corners: Corners,
        blur: f32,
        color: Color,
    ) -> ShadowImage;

    /// Draw a shadow stretched over `rect`.
    fn draw_shadow(&mut self, image: &ShadowImage, rect: Rect);
}
