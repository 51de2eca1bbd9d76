//! The scene: a view tree plus everything that reacts to changes in it.
//!
//! Every mutation goes through [`Scene`] so it can keep the dirty-rect
//! tracker, the animation queue and the input state in step with the tree,
//! and call the lifecycle hooks of the views involved. Hooks receive
//! `&mut Scene`, so views can mutate the scene from inside a callback.

use std::time::Instant;

use crate::animation::{AnimationQueue, DEFAULT_PRECISION};
use crate::corners::Corners;
use crate::error::SceneError;
use crate::geometry::{Point, Rect, Size};
use crate::hit_test;
use crate::input::InputState;
use crate::invalidation::InvalidationTracker;
use crate::platform::Window;
use crate::theme::Theme;
use crate::tree::{Node, Tree, ViewFlags, ViewId};
use crate::view::{UpdateResponse, View};

pub struct Scene {
    tree: Tree,
    root: ViewId,
    tracker: InvalidationTracker,
    animations: AnimationQueue,
    pub(crate) input: InputState,
    pub(crate) window: Box<dyn Window>,
    easing_precision: f32,
}

impl Scene {
    /// Create a scene whose root fills the window.
    ///
    /// The root gets [`Theme::standard`] and the whole window starts out
    /// invalidated, so the first composite draws everything.
    pub fn new(root_view: Box<dyn View>, window: Box<dyn Window>) -> Self {
        let bounds = Rect::from_size(window.size());
        let mut tree = Tree::new();
        let root = tree.insert(root_view, bounds);
        if let Some(node) = tree.node_mut(root) {
            node.theme = Theme::standard();
            node.owns_theme = true;
        }

        let mut tracker = InvalidationTracker::new(bounds);
        tracker.invalidate_all();

        Self {
            tree,
            root,
            tracker,
            animations: AnimationQueue::new(),
            input: InputState::default(),
            window,
            easing_precision: DEFAULT_PRECISION,
        }
    }

    pub fn root(&self) -> ViewId {
        self.root
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn node(&self, id: ViewId) -> Option<&Node> {
        self.tree.node(id)
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.tree.contains(id)
    }

    pub fn view_count(&self) -> usize {
        self.tree.len()
    }

    pub fn window(&self) -> &dyn Window {
        &*self.window
    }

    fn check(&self, id: ViewId) -> Result<(), SceneError> {
        if self.tree.contains(id) {
            Ok(())
        } else {
            log::warn!("rejected stale view {}", id);
            Err(SceneError::StaleView(id))
        }
    }

    /// Run `f` with the view taken out of the tree.
    ///
    /// Returns `None` if `id` is stale. While `f` runs, the node keeps its
    /// place but holds an empty placeholder view.
    pub fn with_view_mut<R>(
        &mut self,
        id: ViewId,
        f: impl FnOnce(&mut dyn View, &mut Scene) -> R,
    ) -> Option<R> {
        let mut view = self.tree.take_view(id)?;
        let result = f(&mut *view, self);
        if self.tree.restore_view(id, view).is_some() {
            log::debug!("{} was destroyed by its own callback", id);
        }
        Some(result)
    }

    // Structure

    /// Insert a view and attach it to `parent`, or leave it detached.
    pub fn add_view(
        &mut self,
        view: Box<dyn View>,
        parent: Option<ViewId>,
        bounds: Rect,
    ) -> Result<ViewId, SceneError> {
        if let Some(parent) = parent {
            self.check(parent)?;
        }
        let id = self.tree.insert(view, bounds);
        if let Some(parent) = parent {
            self.set_parent(id, Some(parent))?;
        }
        Ok(id)
    }

    /// Move `id` under `parent`, or detach it with `None`.
    ///
    /// Making a view its own parent detaches it.
    pub fn set_parent(&mut self, id: ViewId, parent: Option<ViewId>) -> Result<(), SceneError> {
        self.check(id)?;
        if id == self.root {
            return Err(SceneError::RootImmutable);
        }
        let parent = parent.filter(|&parent| parent != id);
        if let Some(parent) = parent {
            self.check(parent)?;
            if self.tree.is_ancestor(id, parent) {
                return Err(SceneError::Cycle { child: id, parent });
            }
        }

        self.detach_view(id)?;
        match parent {
            Some(parent) => self.attach_view(id, parent),
            None => Ok(()),
        }
    }

    pub fn detach(&mut self, id: ViewId) -> Result<(), SceneError> {
        self.set_parent(id, None)
    }

    fn attach_view(&mut self, id: ViewId, parent: ViewId) -> Result<(), SceneError> {
        self.tree.attach(id, parent)?;
        log::debug!("attached {} to {}", id, parent);

        let inherited = self.tree.node(parent).map(|node| node.theme.clone());
        let owns_theme = self.tree.node(id).is_some_and(|node| node.owns_theme);
        if let (Some(theme), false) = (inherited, owns_theme) {
            self.apply_theme(id, theme, false);
        }

        self.with_view_mut(parent, |view, scene| view.child_attached(scene, parent, id));
        self.with_view_mut(id, |view, scene| view.attached(scene, id));
        self.invalidate_view(id);
        Ok(())
    }

    fn detach_view(&mut self, id: ViewId) -> Result<(), SceneError> {
        let Some(parent) = self.tree.parent(id) else {
            return Ok(());
        };

        self.invalidate_view(id);
        self.with_view_mut(id, |view, scene| view.detached(scene, id));
        self.with_view_mut(parent, |view, scene| view.child_detached(scene, parent, id));

        // A hook may already have moved or destroyed the view
        if !self.tree.contains(id) {
            return Ok(());
        }
        self.tree.detach(id)?;

        let subtree = self.tree.subtree(id);
        self.animations.remove_all(&subtree);
        if self.input.purge(&subtree) {
            self.window.set_mouse_capture(false);
        }
        log::debug!("detached {} ({} views) from {}", id, subtree.len(), parent);
        Ok(())
    }

    /// Destroy `child`, which must be a child of `parent`.
    pub fn remove_child(&mut self, parent: ViewId, child: ViewId) -> Result<(), SceneError> {
        self.check(parent)?;
        self.check(child)?;
        if self.tree.parent(child) != Some(parent) {
            log::warn!("{} is not a child of {}", child, parent);
            return Ok(());
        }
        self.destroy(child)
    }

    /// Destroy every child of `parent`.
    pub fn remove_all_children(&mut self, parent: ViewId) -> Result<(), SceneError> {
        self.check(parent)?;
        let children = self.tree.children(parent).to_vec();
        for child in children.into_iter().rev() {
            if self.tree.contains(child) {
                self.destroy(child)?;
            }
        }
        Ok(())
    }

    /// Detach `id` and release it with its whole subtree.
    pub fn destroy(&mut self, id: ViewId) -> Result<(), SceneError> {
        self.check(id)?;
        if id == self.root {
            return Err(SceneError::RootImmutable);
        }
        self.detach_view(id)?;
        if !self.tree.contains(id) {
            return Ok(());
        }

        let removed = self.tree.remove_subtree(id)?;
        self.animations.remove_all(&removed);
        if self.input.purge(&removed) {
            self.window.set_mouse_capture(false);
        }
        log::debug!("destroyed {} ({} views)", id, removed.len());
        Ok(())
    }

    // Geometry

    /// Replace the parent-relative bounds of `id`.
    pub fn set_bounds(&mut self, id: ViewId, bounds: Rect) -> Result<(), SceneError> {
        self.check(id)?;
        self.invalidate_view(id);
        let old = self.tree.set_bounds(id, bounds)?;
        self.invalidate_view(id);

        let (old_size, new_size) = (old.size(), bounds.size());
        if old_size != new_size {
            self.with_view_mut(id, |view, scene| {
                view.size_changed(scene, id, old_size, new_size)
            });
        }
        Ok(())
    }

    pub fn move_by(&mut self, id: ViewId, dx: f32, dy: f32) -> Result<(), SceneError> {
        let bounds = self.bounds(id)?;
        self.set_bounds(id, bounds.offset(dx, dy))
    }

    pub fn set_top_left(&mut self, id: ViewId, top_left: Point) -> Result<(), SceneError> {
        let bounds = self.bounds(id)?;
        self.set_bounds(id, bounds.with_origin(top_left))
    }

    pub fn set_size(&mut self, id: ViewId, size: Size) -> Result<(), SceneError> {
        let bounds = self.bounds(id)?;
        self.set_bounds(id, Rect::from_origin_size(bounds.top_left(), size))
    }

    fn bounds(&self, id: ViewId) -> Result<Rect, SceneError> {
        self.tree
            .node(id)
            .map(|node| node.bounds())
            .ok_or(SceneError::StaleView(id))
    }

    pub fn set_elevation(&mut self, id: ViewId, elevation: f32) -> Result<(), SceneError> {
        self.check(id)?;
        self.invalidate_view(id);
        self.tree.set_elevation(id, elevation)?;
        self.invalidate_view(id);
        Ok(())
    }

    pub fn set_corners(&mut self, id: ViewId, corners: Corners) -> Result<(), SceneError> {
        self.check(id)?;
        self.tree.set_corners(id, corners)?;
        self.invalidate_view(id);
        Ok(())
    }

    // Flags

    pub fn set_flags(&mut self, id: ViewId, flags: ViewFlags) -> Result<(), SceneError> {
        self.check(id)?;
        // Covers the old area while still visible, then the new one
        self.invalidate_view(id);
        let old = self.tree.set_flags(id, flags)?;
        self.invalidate_view(id);

        if old.contains(ViewFlags::VISIBLE) && !flags.contains(ViewFlags::VISIBLE) {
            let hidden = self.tree.subtree(id);
            if self.input.purge_pointer(&hidden) {
                self.window.set_mouse_capture(false);
            }
        }
        Ok(())
    }

    fn update_flag(&mut self, id: ViewId, flag: ViewFlags, on: bool) -> Result<(), SceneError> {
        let mut flags = self
            .tree
            .node(id)
            .map(|node| node.flags())
            .ok_or(SceneError::StaleView(id))?;
        flags.set(flag, on);
        self.set_flags(id, flags)
    }

    pub fn set_visible(&mut self, id: ViewId, visible: bool) -> Result<(), SceneError> {
        self.update_flag(id, ViewFlags::VISIBLE, visible)
    }

    pub fn set_overlay(&mut self, id: ViewId, overlay: bool) -> Result<(), SceneError> {
        self.update_flag(id, ViewFlags::OVERLAY, overlay)
    }

    pub fn set_accepts_mouse(&mut self, id: ViewId, accepts: bool) -> Result<(), SceneError> {
        self.update_flag(id, ViewFlags::ACCEPTS_MOUSE, accepts)
    }

    pub fn set_accepts_drag_drop(&mut self, id: ViewId, accepts: bool) -> Result<(), SceneError> {
        self.update_flag(id, ViewFlags::ACCEPTS_DRAG_DROP, accepts)
    }

    // Invalidation

    /// Mark a rectangle (root coordinates) for redraw.
    pub fn invalidate(&mut self, rect: Rect) {
        self.tracker.invalidate(rect);
    }

    pub fn invalidate_all(&mut self) {
        self.tracker.invalidate_all();
    }

    /// Mark the area covered by `id` and its shadow for redraw.
    ///
    /// Ignored unless the view is visible and attached to the scene root.
    pub fn invalidate_view(&mut self, id: ViewId) {
        if self.tree.root_of(id) != Some(self.root) || !self.tree.is_visible_chain(id) {
            return;
        }
        if let Some(node) = self.tree.node(id) {
            let area = node.absolute_bounds().union(&node.absolute_shadow_bounds());
            self.tracker.invalidate(area);
        }
    }

    pub fn has_pending(&self) -> bool {
        self.tracker.has_pending()
    }

    pub fn pending(&self) -> &[Rect] {
        self.tracker.pending()
    }

    /// Take every pending dirty rectangle.
    pub fn take_pending(&mut self) -> Vec<Rect> {
        self.tracker.take_pending()
    }

    /// Resize the root to the new window size and redraw everything.
    pub fn resize(&mut self, size: Size) {
        let bounds = Rect::from_size(size);
        log::info!("resizing scene to {}x{}", size.width, size.height);
        self.tracker.set_bounds(bounds);
        if let Err(err) = self.set_bounds(self.root, bounds) {
            log::warn!("failed to resize root: {}", err);
        }
        self.tracker.invalidate_all();
    }

    // Animation

    /// Ask for `View::update` to be called on the next animation pass.
    ///
    /// Returns false when the view is stale or already queued.
    pub fn queue_animation_update(&mut self, id: ViewId) -> bool {
        if !self.tree.contains(id) {
            return false;
        }
        self.animations.queue(id)
    }

    /// Precision views should pass to the animations they create.
    pub fn easing_precision(&self) -> f32 {
        self.easing_precision
    }

    pub fn set_easing_precision(&mut self, precision: f32) {
        self.easing_precision = precision;
    }

    pub fn is_animating(&self, id: ViewId) -> bool {
        self.animations.contains(id)
    }

    pub fn has_animations(&self) -> bool {
        !self.animations.is_empty()
    }

    /// Update every queued view once. Returns how many were updated.
    ///
    /// Views queued while the pass runs wait for the next pass.
    pub fn run_animation_pass(&mut self, now: Instant) -> usize {
        let queued = self.animations.drain();
        let mut updated = 0;
        for id in queued {
            let home = self.tree.root_of(id);
            match self.with_view_mut(id, |view, scene| view.update(scene, id, now)) {
                Some(UpdateResponse::Continue) => {
                    // Detaching during the update already purged the queue
                    if self.tree.root_of(id) == home {
                        self.animations.queue(id);
                    } else {
                        log::trace!("{} was detached by its update, not requeued", id);
                    }
                    updated += 1;
                }
                Some(UpdateResponse::Done) => updated += 1,
                None => log::trace!("skipping update of destroyed view {}", id),
            }
        }
        updated
    }

    // Hit testing

    pub fn view_at(&self, point: Point) -> Option<ViewId> {
        hit_test::view_at(&self.tree, self.root, point)
    }

    pub fn mouse_listeners_at(&self, point: Point) -> Vec<ViewId> {
        hit_test::mouse_listeners_at(&self.tree, self.root, point)
    }

    pub fn drag_drop_listeners_at(&self, point: Point) -> Vec<ViewId> {
        hit_test::drag_drop_listeners_at(&self.tree, self.root, point)
    }

    // Theme

    pub fn theme(&self, id: ViewId) -> Option<&Theme> {
        self.tree.node(id).map(|node| node.theme())
    }

    /// Install `theme` on `id` and every descendant that does not have its
    /// own.
    pub fn set_theme(&mut self, id: ViewId, theme: Theme) -> Result<(), SceneError> {
        self.check(id)?;
        self.apply_theme(id, theme, true);
        Ok(())
    }

    /// Drop a theme installed with [`Scene::set_theme`] and inherit the
    /// parent's again.
    pub fn clear_theme(&mut self, id: ViewId) -> Result<(), SceneError> {
        self.check(id)?;
        if id == self.root {
            return Err(SceneError::RootImmutable);
        }
        let inherited = self
            .tree
            .parent(id)
            .and_then(|parent| self.tree.node(parent))
            .map(|node| node.theme.clone())
            .unwrap_or_default();
        self.apply_theme(id, inherited, false);
        Ok(())
    }

    /// Edit the theme seen by `id`.
    ///
    /// The edit is made on a private copy, so it only reaches `id` and the
    /// descendants that inherit from it.
    pub fn edit_theme(&mut self, id: ViewId, f: impl FnOnce(&mut Theme)) -> Result<(), SceneError> {
        let mut theme = self
            .theme(id)
            .cloned()
            .ok_or(SceneError::StaleView(id))?;
        f(&mut theme);
        self.apply_theme(id, theme, true);
        Ok(())
    }

    fn apply_theme(&mut self, id: ViewId, theme: Theme, owns: bool) {
        let mut changed = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.tree.node_mut(current) else {
                continue;
            };
            if current == id {
                node.owns_theme = owns;
            } else if node.owns_theme {
                continue;
            }
            if !node.theme.ptr_eq(&theme) {
                node.theme = theme.clone();
                changed.push(current);
            }
            stack.extend(node.children.iter().copied());
        }

        for view in changed {
            self.with_view_mut(view, |v, scene| v.theme_changed(scene, view));
            self.invalidate_view(view);
        }
    }
}
