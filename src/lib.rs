//! A retained-mode view tree compositor.
//!
//! `veneer` keeps a tree of rectangular views, tracks which parts of the
//! window became dirty, composites them through a pluggable
//! [`DrawingContext`], routes pointer and keyboard input to the right views
//! and drives per-view animations on a dedicated thread.
//!
//! Windowing and drawing are injected: implement [`platform::Window`] and
//! [`renderer::DrawingContext`] for a target, or use
//! [`platform::HeadlessWindow`] and [`renderer::RecordingContext`].
//!
//! ```ignore
//! use veneer::prelude::*;
//!
//! let compositor = Compositor::new()
//!     .frame_interval(Duration::from_millis(8))
//!     .start_headless(Box::new(EmptyView), Box::new(RecordingContext::new()))?;
//!
//! compositor.with_scene(|scene| {
//!     let root = scene.root();
//!     scene.add_view(Box::new(FillView::new(keys::ACCENT)), Some(root), rect)
//! })?;
//! ```

pub mod animation;
pub mod corners;
pub mod error;
pub mod event;
pub mod geometry;
pub mod hit_test;
pub mod input;
pub mod invalidation;
pub mod platform;
pub mod renderer;
pub mod scene;
pub mod shared;
pub mod theme;
pub mod tree;
pub mod view;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use animation::driver::{self, DriverConfig};
use animation::DEFAULT_PRECISION;
use event::EventResponse;
use geometry::Size;
use input::InputEvent;
use platform::{HeadlessWindow, Window};
use renderer::{DrawingContext, FrameStats};
use scene::Scene;
use shared::{SharedState, Stage, StageGuard};
use view::View;

pub use error::{CompositorError, SceneError};

pub mod prelude {
    pub use crate::animation::{Animation, Easing, PlayState};
    pub use crate::corners::{Corner, CornerKind, Corners, Shape};
    pub use crate::event::{Event, EventResponse, Key, Modifiers, MouseButton, ScrollSource};
    pub use crate::geometry::{Color, Point, Rect, Size};
    pub use crate::input::InputEvent;
    pub use crate::platform::{CursorIcon, HeadlessWindow, Window};
    pub use crate::renderer::{ClipShape, DrawingContext, RecordingContext, ShadowImage};
    pub use crate::scene::Scene;
    pub use crate::theme::{keys, Theme};
    pub use crate::tree::{ViewFlags, ViewId};
    pub use crate::view::{DrawInfo, EmptyView, FillView, UpdateResponse, View};
    pub use crate::{Compositor, CompositorConfig, CompositorError, CompositorHandle, SceneError};
}

#[derive(Debug, Clone)]
pub struct CompositorConfig {
    /// Time between animation frames
    pub frame_interval: Duration,
    /// Whether the backend's `end_frame` waits for the vertical blank
    pub vsync: bool,
    /// Default precision for easing curve evaluation
    pub easing_precision: f32,
    /// Window size used by [`Compositor::start_headless`]
    pub initial_size: Size,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_micros(16_600),
            vsync: false,
            easing_precision: DEFAULT_PRECISION,
            initial_size: Size::new(800.0, 600.0),
        }
    }
}

/// Builder for a running compositor.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    config: CompositorConfig,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CompositorConfig) -> Self {
        Self { config }
    }

    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.config.frame_interval = interval;
        self
    }

    pub fn vsync(mut self, vsync: bool) -> Self {
        self.config.vsync = vsync;
        self
    }

    pub fn easing_precision(mut self, precision: f32) -> Self {
        self.config.easing_precision = precision;
        self
    }

    pub fn initial_size(mut self, size: Size) -> Self {
        self.config.initial_size = size;
        self
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Build the scene and start the animation thread.
    pub fn start(
        self,
        root: Box<dyn View>,
        window: Box<dyn Window>,
        ctx: Box<dyn DrawingContext>,
    ) -> Result<CompositorHandle, CompositorError> {
        // Ignore the error: a logger may already be installed by the host
        let _ = env_logger::try_init();

        let mut scene = Scene::new(root, window);
        scene.set_easing_precision(self.config.easing_precision);
        let size = scene.window().size();
        let state = SharedState::new(Stage::new(scene, ctx));

        let closing = Arc::new(AtomicBool::new(false));
        let thread = driver::spawn(
            state.clone(),
            Arc::clone(&closing),
            DriverConfig {
                frame_interval: self.config.frame_interval,
                vsync: self.config.vsync,
            },
        )?;

        log::info!(
            "compositor started: {}x{}, frame interval {:?}",
            size.width,
            size.height,
            self.config.frame_interval
        );

        Ok(CompositorHandle {
            config: self.config,
            state,
            closing,
            thread: Some(thread),
        })
    }

    /// Start with a [`HeadlessWindow`] of the configured initial size.
    pub fn start_headless(
        self,
        root: Box<dyn View>,
        ctx: Box<dyn DrawingContext>,
    ) -> Result<CompositorHandle, CompositorError> {
        let window = HeadlessWindow::new(self.config.initial_size);
        self.start(root, Box::new(window), ctx)
    }
}

/// A running compositor. Closing it (or dropping it) stops the animation
/// thread.
pub struct CompositorHandle {
    config: CompositorConfig,
    state: SharedState,
    closing: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl CompositorHandle {
    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Another handle to the shared state, for use on other threads.
    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    pub fn lock(&self) -> StageGuard<'_> {
        self.state.lock()
    }

    /// Run `f` on the scene and wake the animation thread.
    ///
    /// # Panics
    ///
    /// Panics if called from inside a view hook on the thread that is
    /// already working on the scene. See [`SharedState::try_with_scene`].
    pub fn with_scene<R>(&self, f: impl FnOnce(&mut Scene) -> R) -> R {
        let result = self.state.with_scene(f);
        self.request_frame();
        result
    }

    /// Feed one platform input event to the scene.
    ///
    /// # Panics
    ///
    /// Same as [`CompositorHandle::with_scene`]: not to be called from a
    /// view hook.
    pub fn handle_input(&self, input: InputEvent) -> EventResponse {
        let response = self.state.with_scene(|scene| scene.dispatch_input(input));
        self.request_frame();
        response
    }

    /// Composite on the calling thread if anything is dirty.
    pub fn redraw_if_needed(&self) -> FrameStats {
        let guard = self.state.lock();
        let mut stage = guard.borrow_mut();
        if stage.scene.has_pending() {
            stage.composite()
        } else {
            FrameStats::default()
        }
    }

    /// Wake the animation thread so it does not wait out the frame interval.
    pub fn request_frame(&self) {
        if let Some(thread) = &self.thread {
            thread.thread().unpark();
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    /// Stop the animation thread and wait for it to exit.
    pub fn close(&mut self) {
        self.closing.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            thread.thread().unpark();
            if thread.join().is_err() {
                log::warn!("animation thread panicked");
            }
            log::info!("compositor closed");
        }
    }
}

impl Drop for CompositorHandle {
    fn drop(&mut self) {
        self.close();
    }
}
