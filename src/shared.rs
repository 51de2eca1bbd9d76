//! Shared access to the scene and its drawing context.
//!
//! The event thread and the animation thread both work on the same
//! [`Stage`]. It lives behind a re-entrant mutex so code that already holds
//! the lock (a view hook calling back into the compositor, say) can take it
//! again on the same thread without deadlocking. Mutable access inside the
//! lock goes through a `RefCell`; nested code is handed `&mut Scene` as an
//! argument instead of borrowing a second time.

use std::cell::{Ref, RefCell, RefMut};
use std::sync::Arc;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

use crate::renderer::{composite, DrawingContext, FrameStats};
use crate::scene::Scene;

/// Everything the compositor threads share.
pub struct Stage {
    pub scene: Scene,
    pub ctx: Box<dyn DrawingContext>,
}

impl Stage {
    pub fn new(scene: Scene, ctx: Box<dyn DrawingContext>) -> Self {
        Self { scene, ctx }
    }

    /// Composite whatever is pending.
    pub fn composite(&mut self) -> FrameStats {
        composite(&mut self.scene, self.ctx.as_mut())
    }
}

#[derive(Clone)]
pub struct SharedState {
    inner: Arc<ReentrantMutex<RefCell<Stage>>>,
}

impl SharedState {
    pub fn new(stage: Stage) -> Self {
        Self {
            inner: Arc::new(ReentrantMutex::new(RefCell::new(stage))),
        }
    }

    /// Block until the stage is available. Re-entrant on the same thread.
    pub fn lock(&self) -> StageGuard<'_> {
        StageGuard {
            guard: self.inner.lock(),
        }
    }

    /// Lock, borrow the scene mutably and run `f`.
    ///
    /// # Panics
    ///
    /// Panics when called while the scene is already borrowed on this
    /// thread, e.g. from inside a view hook. Hooks get `&mut Scene` as an
    /// argument; code that cannot tell whether it is nested should use
    /// [`SharedState::try_with_scene`].
    pub fn with_scene<R>(&self, f: impl FnOnce(&mut Scene) -> R) -> R {
        let guard = self.lock();
        let mut stage = guard.borrow_mut();
        f(&mut stage.scene)
    }

    /// Like [`SharedState::with_scene`], but returns `None` instead of
    /// panicking when the scene is already borrowed on this thread.
    pub fn try_with_scene<R>(&self, f: impl FnOnce(&mut Scene) -> R) -> Option<R> {
        let guard = self.lock();
        let Some(mut stage) = guard.try_borrow_mut() else {
            log::warn!("scene is already borrowed on this thread, skipping nested access");
            return None;
        };
        Some(f(&mut stage.scene))
    }
}

/// Scoped access to the [`Stage`]. Unlocks on drop.
pub struct StageGuard<'a> {
    guard: ReentrantMutexGuard<'a, RefCell<Stage>>,
}

impl StageGuard<'_> {
    pub fn borrow(&self) -> Ref<'_, Stage> {
        self.guard.borrow()
    }

    /// Mutable access.
    ///
    /// # Panics
    ///
    /// Panics if the stage is already borrowed further up the same thread's
    /// stack.
    pub fn borrow_mut(&self) -> RefMut<'_, Stage> {
        self.guard.borrow_mut()
    }

    /// Mutable access, or `None` when already borrowed on this thread.
    pub fn try_borrow_mut(&self) -> Option<RefMut<'_, Stage>> {
        self.guard.try_borrow_mut().ok()
    }
}
