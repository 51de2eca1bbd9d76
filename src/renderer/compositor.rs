//! Redraw driver: turns the pending dirty rectangles into drawing calls.
//!
//! Each dirty rectangle is composited independently under its own clip.
//! Inside a rectangle the tree is walked in paint order (parents before
//! children, lower elevation first) and subtrees that touch neither the
//! rectangle nor their own shadow area are skipped entirely.

use super::{ClipShape, DrawingContext};
use crate::geometry::Rect;
use crate::scene::Scene;
use crate::tree::{shadow_blur, Node, Tree, ViewId};
use crate::view::DrawInfo;

/// What one call to [`composite`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Dirty rectangles composited
    pub rects: usize,
    pub views_drawn: usize,
    pub shadows_drawn: usize,
}

impl FrameStats {
    pub fn is_empty(&self) -> bool {
        self.rects == 0
    }
}

/// Redraw everything that was invalidated since the last call.
///
/// Does nothing (and does not begin a frame) when nothing is pending.
pub fn composite(scene: &mut Scene, ctx: &mut dyn DrawingContext) -> FrameStats {
    let mut stats = FrameStats::default();
    let rects = scene.take_pending();
    if rects.is_empty() {
        return stats;
    }

    let root = scene.root();
    let tree = scene.tree_mut();

    ctx.begin_frame();
    for rect in &rects {
        ctx.push_clip(ClipShape::Rect(*rect));
        draw_node(tree, root, rect, ctx, &mut stats);
        ctx.pop_clip();
    }
    ctx.end_frame();

    stats.rects = rects.len();
    log::debug!(
        "composited {} rects: {} views, {} shadows",
        stats.rects,
        stats.views_drawn,
        stats.shadows_drawn
    );
    stats
}

/// Draw `id` and its subtree. The origin is the parent's top-left corner.
fn draw_node(
    tree: &mut Tree,
    id: ViewId,
    rect: &Rect,
    ctx: &mut dyn DrawingContext,
    stats: &mut FrameStats,
) {
    let Some(node) = tree.node(id) else {
        log::warn!("skipping stale view {} while compositing", id);
        return;
    };
    if !node.is_visible() || node.size().is_empty() {
        return;
    }

    let content_hit = node.absolute_bounds().intersects(rect);
    let shadow_hit = node.elevation() > 0.0 && node.absolute_shadow_bounds().intersects(rect);
    if !content_hit && !shadow_hit {
        return;
    }

    if shadow_hit {
        draw_shadow(tree, id, ctx, stats);
    }
    if !content_hit {
        return;
    }

    let Some(node) = tree.node(id) else {
        return;
    };
    let top_left = node.bounds().top_left();
    let children = node.children().to_vec();

    ctx.move_origin(top_left);
    ctx.push_clip(ClipShape::from(node.local_shape()));
    node.view().draw(ctx, &draw_info(id, node));
    stats.views_drawn += 1;

    for child in children {
        draw_node(tree, child, rect, ctx, stats);
    }

    ctx.pop_clip();
    if let Some(node) = tree.node(id) {
        node.view().draw_over_children(ctx, &draw_info(id, node));
    }
    ctx.move_origin(-top_left);
}

fn draw_info(id: ViewId, node: &Node) -> DrawInfo<'_> {
    DrawInfo {
        id,
        size: node.size(),
        corners: node.corners(),
        elevation: node.elevation(),
        theme: node.theme(),
    }
}

/// Draw the shadow of `id` in its parent's coordinates, refreshing the
/// cached shadow image when its parameters changed.
fn draw_shadow(
    tree: &mut Tree,
    id: ViewId,
    ctx: &mut dyn DrawingContext,
    stats: &mut FrameStats,
) {
    let Some(node) = tree.node_mut(id) else {
        return;
    };
    let Some(color) = node.view().shadow_color(node.theme()) else {
        return;
    };
    if color.a <= 0.0 {
        return;
    }

    let size = node.size();
    let corners = node.corners();
    let blur = shadow_blur(node.elevation());

    let cached = node
        .shadow_image
        .as_ref()
        .filter(|image| image.matches(size, corners, blur, color))
        .cloned();
    let image = match cached {
        Some(image) => image,
        None => {
            let image = ctx.create_shadow_image(size, corners, blur, color);
            node.shadow_image = Some(image.clone());
            image
        }
    };

    ctx.draw_shadow(&image, node.shadow_bounds());
    stats.shadows_drawn += 1;
}
