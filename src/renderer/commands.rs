//! A drawing backend that records what it is asked to do.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{ClipShape, DrawingContext, ShadowImage};
use crate::corners::{Corners, Shape};
use crate::geometry::{Color, Point, Rect, Size};

/// A single recorded drawing call.
///
/// `origin` is the accumulated origin at the time of the call, so a
/// command's absolute position is `origin` plus its local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    BeginFrame,
    EndFrame,
    PushClip {
        clip: ClipShape,
        origin: Point,
    },
    PopClip,
    MoveOrigin(Point),
    Fill {
        shape: Shape,
        color: Color,
        origin: Point,
    },
    Stroke {
        shape: Shape,
        width: f32,
        color: Color,
        origin: Point,
    },
    CreateShadow {
        id: u64,
        size: Size,
        blur: f32,
    },
    Shadow {
        id: u64,
        rect: Rect,
        origin: Point,
    },
}

/// Shared handle to the commands recorded by a [`RecordingContext`].
pub type CommandLog = Arc<Mutex<Vec<DrawCommand>>>;

#[derive(Debug, Default)]
pub struct RecordingContext {
    log: CommandLog,
    origin: Point,
    next_shadow: u64,
    frames: u64,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle that stays readable after the context is handed off.
    pub fn log(&self) -> CommandLog {
        Arc::clone(&self.log)
    }

    pub fn commands(&self) -> Vec<DrawCommand> {
        self.log.lock().clone()
    }

    pub fn take_commands(&self) -> Vec<DrawCommand> {
        std::mem::take(&mut *self.log.lock())
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Number of frames presented
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn record(&self, command: DrawCommand) {
        self.log.lock().push(command);
    }
}

impl DrawingContext for RecordingContext {
    fn begin_frame(&mut self) {
        self.origin = Point::ZERO;
        self.record(DrawCommand::BeginFrame);
    }

    fn end_frame(&mut self) {
        self.frames += 1;
        if self.origin != Point::ZERO {
            log::warn!("frame ended with origin at {:?}", self.origin);
        }
        self.record(DrawCommand::EndFrame);
    }

    fn push_clip(&mut self, clip: ClipShape) {
        self.record(DrawCommand::PushClip {
            clip,
            origin: self.origin,
        });
    }

    fn pop_clip(&mut self) {
        self.record(DrawCommand::PopClip);
    }

    fn move_origin(&mut self, delta: Point) {
        self.origin = self.origin + delta;
        self.record(DrawCommand::MoveOrigin(delta));
    }

    fn fill_rect(&mut self, shape: Shape, color: Color) {
        self.record(DrawCommand::Fill {
            shape,
            color,
            origin: self.origin,
        });
    }

    fn stroke_rect(&mut self, shape: Shape, width: f32, color: Color) {
        self.record(DrawCommand::Stroke {
            shape,
            width,
            color,
            origin: self.origin,
        });
    }

    fn create_shadow_image(
        &mut self,
        size: Size,
        corners: Corners,
        blur: f32,
        color: Color,
    ) -> ShadowImage {
        self.next_shadow += 1;
        let id = self.next_shadow;
        self.record(DrawCommand::CreateShadow { id, size, blur });
        ShadowImage::new(id, size, corners, blur, color)
    }

    fn draw_shadow(&mut self, image: &ShadowImage, rect: Rect) {
        self.record(DrawCommand::Shadow {
            id: image.id(),
            rect,
            origin: self.origin,
        });
    }
}
