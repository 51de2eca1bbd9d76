//! Queue of views waiting for an animation update.
//!
//! Views are only visited when they asked for it through
//! `Scene::queue_animation_update`, so an animation pass costs O(animating
//! views) rather than O(all views). Each view appears at most once.

use std::collections::HashSet;

use crate::tree::ViewId;

#[derive(Debug, Default)]
pub struct AnimationQueue {
    order: Vec<ViewId>,
    queued: HashSet<ViewId>,
}

impl AnimationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a view. Returns false if it was already queued.
    pub fn queue(&mut self, id: ViewId) -> bool {
        if self.queued.insert(id) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.queued.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn remove(&mut self, id: ViewId) {
        if self.queued.remove(&id) {
            self.order.retain(|&queued| queued != id);
        }
    }

    /// Remove every view in `ids` (used when a subtree is detached).
    pub fn remove_all(&mut self, ids: &[ViewId]) {
        let before = self.order.len();
        for id in ids {
            self.queued.remove(id);
        }
        if self.queued.len() != before {
            let queued = &self.queued;
            self.order.retain(|id| queued.contains(id));
        }
    }

    /// Take every queued view, leaving the queue empty.
    ///
    /// Views queued after this call land in the fresh queue and are handled
    /// by the next pass.
    pub fn drain(&mut self) -> Vec<ViewId> {
        self.queued.clear();
        std::mem::take(&mut self.order)
    }
}
