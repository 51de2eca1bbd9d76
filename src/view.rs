//! The contract between the compositor core and concrete views.
//!
//! The core never needs to know what a view is: it stores `Box<dyn View>` in
//! the tree and calls these hooks. Every hook has a default, so a plain
//! container is just `EmptyView`.

use std::time::Instant;

use crate::corners::{Corners, Shape};
use crate::event::{Event, EventResponse};
use crate::geometry::{Color, Point, Rect, Size};
use crate::platform::CursorIcon;
use crate::renderer::DrawingContext;
use crate::scene::Scene;
use crate::theme::{keys, Theme};
use crate::tree::ViewId;

/// What a view needs to know while drawing.
///
/// The drawing origin is the view's top-left corner and the active clip is
/// the view's own shape.
#[derive(Debug, Clone, Copy)]
pub struct DrawInfo<'a> {
    pub id: ViewId,
    pub size: Size,
    pub corners: Corners,
    pub elevation: f32,
    pub theme: &'a Theme,
}

impl DrawInfo<'_> {
    /// The view's shape in local coordinates.
    pub fn shape(&self) -> Shape {
        Shape::new(Rect::from_size(self.size), self.corners)
    }
}

/// Result of an animation update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResponse {
    /// Still animating: queue another update for the next frame
    Continue,
    /// Nothing left to animate
    Done,
}

pub trait View: Send {
    /// Paint this view's own content (below its children).
    fn draw(&self, ctx: &mut dyn DrawingContext, info: &DrawInfo<'_>) {
        let _ = (ctx, info);
    }

    /// Paint on top of the children (focus rings, ripples).
    fn draw_over_children(&self, ctx: &mut dyn DrawingContext, info: &DrawInfo<'_>) {
        let _ = (ctx, info);
    }

    /// Color of the elevation shadow, or `None` for no shadow.
    fn shadow_color(&self, theme: &Theme) -> Option<Color> {
        Some(theme.color(keys::SHADOW))
    }

    /// Whether `point` (local coordinates) hits this view.
    ///
    /// `shape` is the view's local shape; the default is corner-aware
    /// containment.
    fn hit_test(&self, point: Point, shape: &Shape) -> bool {
        shape.contains(point)
    }

    /// Advance animations. Only called for views that were queued with
    /// `Scene::queue_animation_update`.
    fn update(&mut self, scene: &mut Scene, id: ViewId, now: Instant) -> UpdateResponse {
        let _ = (scene, id, now);
        UpdateResponse::Done
    }

    fn event(&mut self, scene: &mut Scene, id: ViewId, event: &Event) -> EventResponse {
        let _ = (scene, id, event);
        EventResponse::Ignored
    }

    /// Cursor to show while this view is the topmost hovered target.
    fn cursor(&self) -> CursorIcon {
        CursorIcon::Default
    }

    /// This view was attached to a parent.
    fn attached(&mut self, scene: &mut Scene, id: ViewId) {
        let _ = (scene, id);
    }

    /// This view is about to be detached from its parent.
    ///
    /// Only the root of the detached subtree is notified. Its descendants
    /// stay attached to it, and when the subtree is destroyed they are
    /// dropped without a call; put cleanup in `Drop`.
    fn detached(&mut self, scene: &mut Scene, id: ViewId) {
        let _ = (scene, id);
    }

    fn child_attached(&mut self, scene: &mut Scene, id: ViewId, child: ViewId) {
        let _ = (scene, id, child);
    }

    fn child_detached(&mut self, scene: &mut Scene, id: ViewId, child: ViewId) {
        let _ = (scene, id, child);
    }

    fn size_changed(&mut self, scene: &mut Scene, id: ViewId, old: Size, new: Size) {
        let _ = (scene, id, old, new);
    }

    /// The theme visible to this view was replaced or edited.
    fn theme_changed(&mut self, scene: &mut Scene, id: ViewId) {
        let _ = (scene, id);
    }
}

impl View for Box<dyn View> {
    fn draw(&self, ctx: &mut dyn DrawingContext, info: &DrawInfo<'_>) {
        (**self).draw(ctx, info)
    }
    fn draw_over_children(&self, ctx: &mut dyn DrawingContext, info: &DrawInfo<'_>) {
        (**self).draw_over_children(ctx, info)
    }
    fn shadow_color(&self, theme: &Theme) -> Option<Color> {
        (**self).shadow_color(theme)
    }
    fn hit_test(&self, point: Point, shape: &Shape) -> bool {
        (**self).hit_test(point, shape)
    }
    fn update(&mut self, scene: &mut Scene, id: ViewId, now: Instant) -> UpdateResponse {
        (**self).update(scene, id, now)
    }
    fn event(&mut self, scene: &mut Scene, id: ViewId, event: &Event) -> EventResponse {
        (**self).event(scene, id, event)
    }
    fn cursor(&self) -> CursorIcon {
        (**self).cursor()
    }
    fn attached(&mut self, scene: &mut Scene, id: ViewId) {
        (**self).attached(scene, id)
    }
    fn detached(&mut self, scene: &mut Scene, id: ViewId) {
        (**self).detached(scene, id)
    }
    fn child_attached(&mut self, scene: &mut Scene, id: ViewId, child: ViewId) {
        (**self).child_attached(scene, id, child)
    }
    fn child_detached(&mut self, scene: &mut Scene, id: ViewId, child: ViewId) {
        (**self).child_detached(scene, id, child)
    }
    fn size_changed(&mut self, scene: &mut Scene, id: ViewId, old: Size, new: Size) {
        (**self).size_changed(scene, id, old, new)
    }
    fn theme_changed(&mut self, scene: &mut Scene, id: ViewId) {
        (**self).theme_changed(scene, id)
    }
}

/// A view with no content of its own. Useful as a plain container.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyView;

impl View for EmptyView {}

/// A view that fills its shape with a theme color.
#[derive(Debug, Clone)]
pub struct FillView {
    color_key: String,
}

impl FillView {
    pub fn new(color_key: impl Into<String>) -> Self {
        Self {
            color_key: color_key.into(),
        }
    }
}

impl View for FillView {
    fn draw(&self, ctx: &mut dyn DrawingContext, info: &DrawInfo<'_>) {
        let color = info.theme.color(&self.color_key);
        if color.a > 0.0 {
            ctx.fill_rect(info.shape(), color);
        }
    }
}
