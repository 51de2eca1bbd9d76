//! The animation thread.
//!
//! Runs independently of the platform event loop: once per frame it takes
//! the shared lock, advances every queued animation and composites what
//! became dirty. Between frames it parks, so `unpark` is enough to wake it
//! early (new input, close request).

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::renderer::FrameStats;
use crate::shared::SharedState;

pub(crate) const THREAD_NAME: &str = "veneer-animation";

#[derive(Debug, Clone, Copy)]
pub(crate) struct DriverConfig {
    pub frame_interval: Duration,
    /// `end_frame` blocks until the next vertical blank
    pub vsync: bool,
}

/// Run one animation pass and composite the result.
pub fn tick(state: &SharedState, now: Instant) -> FrameStats {
    let guard = state.lock();
    let mut stage = guard.borrow_mut();
    stage.scene.run_animation_pass(now);
    if stage.scene.has_pending() {
        stage.composite()
    } else {
        FrameStats::default()
    }
}

pub(crate) fn spawn(
    state: SharedState,
    closing: Arc<AtomicBool>,
    config: DriverConfig,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(THREAD_NAME.to_string())
        .spawn(move || run(state, closing, config))
}

fn run(state: SharedState, closing: Arc<AtomicBool>, config: DriverConfig) {
    log::info!(
        "animation thread started ({:?} per frame, vsync {})",
        config.frame_interval,
        config.vsync
    );

    let mut frames = 0u64;
    while !closing.load(Ordering::Acquire) {
        let stats = tick(&state, Instant::now());
        if !stats.is_empty() {
            frames += 1;
        }

        // With vsync the present already waited for the next frame
        if stats.is_empty() || !config.vsync {
            thread::park_timeout(config.frame_interval);
        }
    }

    log::info!("animation thread stopped after {} frames", frames);
}
