//! Dirty-rectangle tracking.
//!
//! Pending rectangles are kept pairwise disjoint and clipped to the root
//! bounds. A new rectangle swallows every entry it overlaps until a fixed
//! point is reached, so a burst of small invalidations in one area collapses
//! into one entry instead of growing the list.

use std::mem;

use crate::geometry::Rect;

#[derive(Debug, Clone, Default)]
pub struct InvalidationTracker {
    bounds: Rect,
    pending: Vec<Rect>,
}

impl InvalidationTracker {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            pending: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Mark `rect` (root coordinates) as needing a redraw.
    pub fn invalidate(&mut self, rect: Rect) {
        let mut rect = rect.intersection(&self.bounds);
        if rect.is_empty() {
            return;
        }

        if self.pending.iter().any(|entry| entry.contains_rect(&rect)) {
            return;
        }

        // Growing the rect can make it reach entries it missed before
        while let Some(pos) = self.pending.iter().position(|entry| entry.intersects(&rect)) {
            let entry = self.pending.swap_remove(pos);
            log::trace!("merging {:?} into {:?}", entry, rect);
            rect = rect.union(&entry);
        }

        self.pending.push(rect);
    }

    pub fn invalidate_all(&mut self) {
        self.invalidate(self.bounds);
    }

    /// Change the root bounds, clipping what is already pending.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.pending = mem::take(&mut self.pending)
            .into_iter()
            .map(|rect| rect.intersection(&bounds))
            .filter(|rect| !rect.is_empty())
            .collect();
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending(&self) -> &[Rect] {
        &self.pending
    }

    /// Take every pending rect, leaving the tracker empty.
    pub fn take_pending(&mut self) -> Vec<Rect> {
        mem::take(&mut self.pending)
    }
}
