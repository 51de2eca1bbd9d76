//! Arena storage for the view tree.
//!
//! Views live in a sparse-set arena addressed by generational [`ViewId`]s:
//!
//! - **Generational ids**: a `ViewId` carries the slot index and a generation
//!   counter. Freeing a slot bumps the generation, so a stale id can never
//!   resolve to a view that later reused the slot.
//! - **Dense storage**: nodes are stored contiguously and removed with
//!   swap-remove, the sparse map is fixed up through a back-pointer.
//! - **Ownership**: a parent owns its children through its `children` list.
//!   The `parent` link is a plain id and never keeps anything alive.
//!
//! Every structural mutation keeps the derived data consistent right away:
//! absolute positions and depths are shifted by delta over the affected
//! subtree only, sibling lists stay ordered by elevation and every child's
//! `index` matches its slot in the parent list.

pub mod elevation;

use std::fmt;
use std::mem;
use std::ops::RangeInclusive;

use bitflags::bitflags;

use crate::corners::{Corners, Shape};
use crate::error::SceneError;
use crate::geometry::{Point, Rect, Size};
use crate::renderer::ShadowImage;
use crate::theme::Theme;
use crate::view::{EmptyView, View};

/// Elevation above which shadows stop growing.
pub const MAX_SHADOW_ELEVATION: f32 = 24.0;

/// Blur radius of the shadow cast at `elevation`.
pub fn shadow_blur(elevation: f32) -> f32 {
    elevation.clamp(0.0, MAX_SHADOW_ELEVATION)
}

/// Area covered by a view and its shadow, in the same space as `bounds`.
///
/// The shadow is blurred by [`shadow_blur`] in every direction and dropped
/// down by half the blur, so it always contains `bounds`.
pub fn shadow_bounds(bounds: Rect, elevation: f32) -> Rect {
    if elevation <= 0.0 {
        return bounds;
    }
    let blur = shadow_blur(elevation);
    bounds
        .inflate(blur, blur)
        .offset(0.0, blur * 0.5)
        .union(&bounds)
}

/// Unique identifier for a view in the tree.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ViewId {
    index: u32,
    generation: u32,
}

impl ViewId {
    fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Generation in the high bits, slot index in the low bits.
    pub fn as_u64(self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

bitflags! {
    /// Per-view behaviour switches.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ViewFlags: u8 {
        /// Drawn and hit tested. Invisible views hide their whole subtree.
        const VISIBLE = 0b0001;
        /// Lets pointer hits pass through to the siblings below.
        const OVERLAY = 0b0010;
        /// Receives pointer events
        const ACCEPTS_MOUSE = 0b0100;
        const ACCEPTS_DRAG_DROP = 0b1000;
    }
}

impl Default for ViewFlags {
    fn default() -> Self {
        ViewFlags::VISIBLE | ViewFlags::ACCEPTS_MOUSE
    }
}

/// Slot in the sparse map. The generation survives while the slot is free.
struct SparseEntry {
    dense_index: Option<usize>,
    generation: u32,
}

/// A view and its place in the tree.
pub struct Node {
    view: Box<dyn View>,
    pub(crate) parent: Option<ViewId>,
    pub(crate) children: Vec<ViewId>,
    /// Parent-relative bounds
    pub(crate) bounds: Rect,
    /// Top-left corner in root coordinates
    pub(crate) absolute: Point,
    pub(crate) elevation: f32,
    pub(crate) corners: Corners,
    pub(crate) flags: ViewFlags,
    /// Parent-relative, always contains `bounds`
    pub(crate) shadow_bounds: Rect,
    pub(crate) index: usize,
    pub(crate) depth: usize,
    pub(crate) theme: Theme,
    pub(crate) owns_theme: bool,
    pub(crate) shadow_image: Option<ShadowImage>,
    sparse_index: u32,
}

impl Node {
    pub fn view(&self) -> &dyn View {
        &*self.view
    }

    pub fn parent(&self) -> Option<ViewId> {
        self.parent
    }

    pub fn children(&self) -> &[ViewId] {
        &self.children
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn size(&self) -> Size {
        self.bounds.size()
    }

    pub fn absolute_position(&self) -> Point {
        self.absolute
    }

    pub fn absolute_bounds(&self) -> Rect {
        self.bounds.with_origin(self.absolute)
    }

    pub fn shadow_bounds(&self) -> Rect {
        self.shadow_bounds
    }

    pub fn absolute_shadow_bounds(&self) -> Rect {
        self.shadow_bounds
            .translate(self.absolute - self.bounds.top_left())
    }

    /// The view's shape in its own coordinate space.
    pub fn local_shape(&self) -> Shape {
        Shape::new(Rect::from_size(self.bounds.size()), self.corners)
    }

    pub fn elevation(&self) -> f32 {
        self.elevation
    }

    pub fn corners(&self) -> Corners {
        self.corners
    }

    pub fn flags(&self) -> ViewFlags {
        self.flags
    }

    pub fn is_visible(&self) -> bool {
        self.flags.contains(ViewFlags::VISIBLE)
    }

    pub fn is_overlay(&self) -> bool {
        self.flags.contains(ViewFlags::OVERLAY)
    }

    /// Position in the parent's child list
    pub fn index(&self) -> usize {
        self.index
    }

    /// Distance from the root of the tree this node belongs to.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn owns_theme(&self) -> bool {
        self.owns_theme
    }
}

/// Arena of view nodes.
pub struct Tree {
    dense: Vec<Node>,
    sparse: Vec<SparseEntry>,
    free_indices: Vec<u32>,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            sparse: Vec::new(),
            free_indices: Vec::new(),
        }
    }

    /// Store a detached view and return its id.
    pub fn insert(&mut self, view: Box<dyn View>, bounds: Rect) -> ViewId {
        let (sparse_index, generation) = match self.free_indices.pop() {
            Some(idx) => (idx, self.sparse[idx as usize].generation.wrapping_add(1)),
            None => {
                let idx = self.sparse.len() as u32;
                self.sparse.push(SparseEntry {
                    dense_index: None,
                    generation: 0,
                });
                (idx, 0)
            }
        };

        let dense_index = self.dense.len();
        self.dense.push(Node {
            view,
            parent: None,
            children: Vec::new(),
            bounds,
            absolute: bounds.top_left(),
            elevation: 0.0,
            corners: Corners::NONE,
            flags: ViewFlags::default(),
            shadow_bounds: bounds,
            index: 0,
            depth: 0,
            theme: Theme::default(),
            owns_theme: false,
            shadow_image: None,
            sparse_index,
        });
        self.sparse[sparse_index as usize] = SparseEntry {
            dense_index: Some(dense_index),
            generation,
        };

        ViewId::new(sparse_index, generation)
    }

    fn dense_index(&self, id: ViewId) -> Option<usize> {
        self.sparse
            .get(id.index as usize)
            .filter(|e| e.generation == id.generation)
            .and_then(|e| e.dense_index)
    }

    fn live(&self, id: ViewId) -> Result<usize, SceneError> {
        self.dense_index(id).ok_or(SceneError::StaleView(id))
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.dense_index(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn node(&self, id: ViewId) -> Option<&Node> {
        self.dense_index(id).map(|idx| &self.dense[idx])
    }

    pub(crate) fn node_mut(&mut self, id: ViewId) -> Option<&mut Node> {
        let idx = self.dense_index(id)?;
        Some(&mut self.dense[idx])
    }

    pub fn parent(&self, id: ViewId) -> Option<ViewId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: ViewId) -> &[ViewId] {
        self.node(id).map(|node| node.children()).unwrap_or(&[])
    }

    fn elevation_of(&self, id: ViewId) -> f32 {
        self.node(id).map(|node| node.elevation).unwrap_or(0.0)
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: ViewId, id: ViewId) -> bool {
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    /// Topmost ancestor of `id` (itself when detached).
    pub fn root_of(&self, id: ViewId) -> Option<ViewId> {
        let mut current = id;
        self.node(current)?;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        Some(current)
    }

    /// `id` and all its descendants, parents before children.
    pub fn subtree(&self, id: ViewId) -> Vec<ViewId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Whether `id` and every ancestor are visible.
    pub fn is_visible_chain(&self, id: ViewId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.node(node_id) {
                Some(node) if node.is_visible() => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Find `id` in the child list of `parent_dense`, trying `hint` first.
    fn slot_in_parent(&self, parent_dense: usize, id: ViewId, hint: usize) -> Option<usize> {
        let children = &self.dense[parent_dense].children;
        if children.get(hint) == Some(&id) {
            return Some(hint);
        }
        log::warn!("child index of {} out of sync, searching", id);
        children.iter().position(|&child| child == id)
    }

    /// Rewrite the `index` of the children of `parent_dense` in `range`.
    fn renumber(&mut self, parent_dense: usize, range: RangeInclusive<usize>) {
        for slot in range {
            let Some(&child) = self.dense[parent_dense].children.get(slot) else {
                break;
            };
            if let Some(idx) = self.dense_index(child) {
                self.dense[idx].index = slot;
            }
        }
    }

    /// Shift the absolute position and depth of a whole subtree.
    fn shift_subtree(&mut self, id: ViewId, delta: Point, depth: usize) {
        let Some(idx) = self.dense_index(id) else {
            return;
        };
        let depth_delta = depth as isize - self.dense[idx].depth as isize;
        if delta == Point::ZERO && depth_delta == 0 {
            return;
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(idx) = self.dense_index(current) else {
                continue;
            };
            let node = &mut self.dense[idx];
            node.absolute = node.absolute + delta;
            node.depth = (node.depth as isize + depth_delta).max(0) as usize;
            stack.extend(node.children.iter().copied());
        }
    }

    /// Attach a view as a child of `parent`, detaching it first if needed.
    ///
    /// The child lands at its elevation-ordered slot, after every sibling of
    /// equal elevation. Returns that slot.
    pub fn attach(&mut self, child: ViewId, parent: ViewId) -> Result<usize, SceneError> {
        self.live(child)?;
        let parent_dense = self.live(parent)?;
        if child == parent || self.is_ancestor(child, parent) {
            return Err(SceneError::Cycle { child, parent });
        }

        self.detach(child)?;

        let parent_node = &self.dense[parent_dense];
        let (parent_abs, parent_depth) = (parent_node.absolute, parent_node.depth);

        let child_dense = self.live(child)?;
        let node = &mut self.dense[child_dense];
        node.parent = Some(parent);
        let delta = parent_abs + node.bounds.top_left() - node.absolute;
        self.shift_subtree(child, delta, parent_depth + 1);

        let mut children = mem::take(&mut self.dense[parent_dense].children);
        children.push(child);
        let last = children.len() - 1;
        let slot = elevation::settle(&mut children, last, |id| self.elevation_of(id));
        self.dense[parent_dense].children = children;
        self.renumber(parent_dense, slot..=last);

        log::trace!("attached {} to {} at slot {}", child, parent, slot);
        Ok(slot)
    }

    /// Unlink a view from its parent. Returns the former parent.
    ///
    /// The view keeps its subtree and becomes the root of it.
    pub fn detach(&mut self, id: ViewId) -> Result<Option<ViewId>, SceneError> {
        let idx = self.live(id)?;
        let Some(parent) = self.dense[idx].parent else {
            return Ok(None);
        };

        if let Some(parent_dense) = self.dense_index(parent) {
            let hint = self.dense[idx].index;
            if let Some(slot) = self.slot_in_parent(parent_dense, id, hint) {
                self.dense[parent_dense].children.remove(slot);
                let len = self.dense[parent_dense].children.len();
                if slot < len {
                    self.renumber(parent_dense, slot..=len - 1);
                }
            }
        }

        let node = &mut self.dense[idx];
        node.parent = None;
        node.index = 0;
        let delta = node.bounds.top_left() - node.absolute;
        self.shift_subtree(id, delta, 0);

        Ok(Some(parent))
    }

    /// Detach a view and release it together with its whole subtree.
    ///
    /// Returns the ids that were freed, parents first.
    pub fn remove_subtree(&mut self, id: ViewId) -> Result<Vec<ViewId>, SceneError> {
        self.detach(id)?;
        let removed = self.subtree(id);
        let mut views = Vec::with_capacity(removed.len());
        for &node_id in &removed {
            if let Some(node) = self.remove_node(node_id) {
                views.push(node);
            }
        }
        // Views are dropped only once the arena is consistent again
        drop(views);
        Ok(removed)
    }

    fn remove_node(&mut self, id: ViewId) -> Option<Node> {
        let dense_index = self.dense_index(id)?;
        let last = self.dense.len() - 1;
        let node = self.dense.swap_remove(dense_index);

        if dense_index != last {
            let moved = self.dense[dense_index].sparse_index;
            self.sparse[moved as usize].dense_index = Some(dense_index);
        }

        self.sparse[id.index as usize].dense_index = None;
        self.free_indices.push(id.index);
        Some(node)
    }

    /// Replace the parent-relative bounds. Returns the previous bounds.
    pub fn set_bounds(&mut self, id: ViewId, bounds: Rect) -> Result<Rect, SceneError> {
        let idx = self.live(id)?;
        let node = &mut self.dense[idx];
        let old = node.bounds;
        node.bounds = bounds;
        node.shadow_bounds = shadow_bounds(bounds, node.elevation);
        let depth = node.depth;

        let delta = bounds.top_left() - old.top_left();
        self.shift_subtree(id, delta, depth);
        Ok(old)
    }

    pub fn move_by(&mut self, id: ViewId, dx: f32, dy: f32) -> Result<Rect, SceneError> {
        let bounds = self.live(id).map(|idx| self.dense[idx].bounds)?;
        self.set_bounds(id, bounds.offset(dx, dy))
    }

    pub fn set_top_left(&mut self, id: ViewId, top_left: Point) -> Result<Rect, SceneError> {
        let bounds = self.live(id).map(|idx| self.dense[idx].bounds)?;
        self.set_bounds(id, bounds.with_origin(top_left))
    }

    pub fn set_size(&mut self, id: ViewId, size: Size) -> Result<Rect, SceneError> {
        let bounds = self.live(id).map(|idx| self.dense[idx].bounds)?;
        self.set_bounds(id, Rect::from_origin_size(bounds.top_left(), size))
    }

    /// Change the elevation and move the view to its new sibling slot.
    ///
    /// Negative elevations are normalized. Returns the previous (normalized)
    /// elevation.
    pub fn set_elevation(&mut self, id: ViewId, elevation: f32) -> Result<f32, SceneError> {
        let idx = self.live(id)?;
        let value = elevation::normalize(elevation);
        let node = &mut self.dense[idx];
        let old = node.elevation;
        node.elevation = value;
        node.shadow_bounds = shadow_bounds(node.bounds, value);

        let (parent, hint) = (node.parent, node.index);
        let Some(parent_dense) = parent.and_then(|p| self.dense_index(p)) else {
            return Ok(old);
        };
        let Some(index) = self.slot_in_parent(parent_dense, id, hint) else {
            return Ok(old);
        };

        let mut children = mem::take(&mut self.dense[parent_dense].children);
        let slot = elevation::settle(&mut children, index, |child| self.elevation_of(child));
        self.dense[parent_dense].children = children;
        self.renumber(parent_dense, index.min(slot)..=index.max(slot));

        if slot != index {
            log::trace!("{} moved from slot {} to {}", id, index, slot);
        }
        Ok(old)
    }

    pub fn set_corners(&mut self, id: ViewId, corners: Corners) -> Result<Corners, SceneError> {
        let idx = self.live(id)?;
        Ok(mem::replace(&mut self.dense[idx].corners, corners))
    }

    pub fn set_flags(&mut self, id: ViewId, flags: ViewFlags) -> Result<ViewFlags, SceneError> {
        let idx = self.live(id)?;
        Ok(mem::replace(&mut self.dense[idx].flags, flags))
    }

    /// Temporarily take a view out of its node, leaving an empty view behind.
    ///
    /// The node keeps its place in the tree, so the view can be handed a
    /// `&mut Scene` while it is out. Put it back with [`Tree::restore_view`].
    pub(crate) fn take_view(&mut self, id: ViewId) -> Option<Box<dyn View>> {
        let idx = self.dense_index(id)?;
        Some(mem::replace(&mut self.dense[idx].view, Box::new(EmptyView)))
    }

    /// Put back a view taken with [`Tree::take_view`].
    ///
    /// Returns the view back if the node was destroyed in the meantime.
    pub(crate) fn restore_view(
        &mut self,
        id: ViewId,
        view: Box<dyn View>,
    ) -> Option<Box<dyn View>> {
        match self.dense_index(id) {
            Some(idx) => {
                self.dense[idx].view = view;
                None
            }
            None => Some(view),
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}
