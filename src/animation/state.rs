//! Per-animation playback state.
//!
//! An [`Animation`] produces one progress value per tick. It never schedules
//! itself: the owning view advances it from its `update` hook and asks for
//! another tick while [`Animation::is_running`] is true.
//!
//! All time-dependent methods take an explicit `now` so playback can be
//! driven by the animation thread's frame clock (or a test).

use std::time::{Duration, Instant};

use super::timing::{Easing, DEFAULT_PRECISION};

/// Callback receiving the progress value on every tick.
pub type Listener = Box<dyn FnMut(f32) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayState {
    Stopped,
    Running,
    Paused,
}

pub struct Animation {
    duration: Duration,
    easing: Easing,
    precision: f32,
    start_time: Instant,
    /// Set while paused
    paused_at: Option<Instant>,
    state: PlayState,
    is_reversed: bool,
    is_done: bool,
    /// Last value produced by a tick
    value: f32,
    listeners: Vec<Listener>,
}

impl Animation {
    pub fn new(duration: Duration, easing: Easing) -> Self {
        Self {
            duration,
            easing,
            precision: DEFAULT_PRECISION,
            start_time: Instant::now(),
            paused_at: None,
            state: PlayState::Stopped,
            is_reversed: false,
            is_done: false,
            value: 0.0,
            listeners: Vec::new(),
        }
    }

    /// Set the easing solver precision
    pub fn with_precision(mut self, precision: f32) -> Self {
        self.precision = precision;
        self
    }

    /// Add a listener (builder form of [`Animation::on_update`])
    pub fn with_listener<F: FnMut(f32) + Send + 'static>(mut self, listener: F) -> Self {
        self.on_update(listener);
        self
    }

    pub fn on_update<F: FnMut(f32) + Send + 'static>(&mut self, listener: F) {
        self.listeners.push(Box::new(listener));
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn easing(&self) -> &Easing {
        &self.easing
    }

    pub fn set_easing(&mut self, easing: Easing) {
        self.easing = easing;
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PlayState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.state == PlayState::Paused
    }

    pub fn is_done(&self) -> bool {
        self.is_done
    }

    pub fn is_reversed(&self) -> bool {
        self.is_reversed
    }

    /// Value produced by the most recent tick
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn play(&mut self) {
        self.play_at(Instant::now());
    }

    /// Start from the beginning when stopped, or resume when paused.
    ///
    /// Resuming shifts the start time forward by the time spent paused, so
    /// progress continues where it left off.
    pub fn play_at(&mut self, now: Instant) {
        match self.state {
            PlayState::Stopped => {
                self.start_time = now;
                self.is_done = false;
                self.state = PlayState::Running;
                self.value = self.output(0.0);
            }
            PlayState::Paused => {
                if let Some(paused_at) = self.paused_at.take() {
                    self.start_time += now.saturating_duration_since(paused_at);
                }
                self.state = PlayState::Running;
            }
            PlayState::Running => {}
        }
    }

    pub fn pause(&mut self) {
        self.pause_at(Instant::now());
    }

    pub fn pause_at(&mut self, now: Instant) {
        if self.state == PlayState::Running {
            self.paused_at = Some(now);
            self.state = PlayState::Paused;
        }
    }

    /// Stop playback, keeping the last produced value.
    pub fn stop(&mut self) {
        self.state = PlayState::Stopped;
        self.paused_at = None;
    }

    pub fn set_reversed(&mut self, reversed: bool) {
        self.set_reversed_at(reversed, Instant::now());
    }

    /// Change direction without a visual jump.
    ///
    /// While running or paused, the start time is moved so the value at `now`
    /// (or at the pause instant) is the same in the new direction.
    pub fn set_reversed_at(&mut self, reversed: bool, now: Instant) {
        if reversed == self.is_reversed {
            return;
        }
        if self.state == PlayState::Stopped {
            self.is_reversed = reversed;
            return;
        }

        let at = self.paused_at.unwrap_or(now);
        let current = self.output(self.normalized_at(at));
        self.is_reversed = reversed;

        let eased_target = if reversed { 1.0 - current } else { current };
        let normalized = self.easing.inverse(eased_target, self.precision);
        let offset = self.duration.mul_f32(normalized);
        self.start_time = at.checked_sub(offset).unwrap_or(at);
        log::trace!(
            "animation reversed={} at value {:.4} (normalized {:.4})",
            reversed,
            current,
            normalized
        );
    }

    /// Advance to `now` and notify listeners.
    ///
    /// Returns the new value. Outside the running state this returns the last
    /// value without calling listeners.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        if self.state != PlayState::Running {
            return self.value;
        }

        let mut normalized = self.raw_normalized_at(now);
        if normalized >= 1.0 {
            normalized = 1.0;
            self.is_done = true;
            self.state = PlayState::Stopped;
        }

        self.value = self.output(normalized);
        for listener in &mut self.listeners {
            listener(self.value);
        }
        self.value
    }

    /// Value the animation would produce at `now`, without side effects.
    pub fn sample_at(&self, now: Instant) -> f32 {
        match self.state {
            PlayState::Running => self.output(self.normalized_at(now)),
            PlayState::Paused => self.output(self.normalized_at(self.paused_at.unwrap_or(now))),
            PlayState::Stopped => self.value,
        }
    }

    fn raw_normalized_at(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        now.saturating_duration_since(self.start_time).as_secs_f32() / self.duration.as_secs_f32()
    }

    fn normalized_at(&self, now: Instant) -> f32 {
        self.raw_normalized_at(now).min(1.0)
    }

    fn output(&self, normalized: f32) -> f32 {
        let eased = self.easing.evaluate(normalized, self.precision);
        if self.is_reversed {
            1.0 - eased
        } else {
            eased
        }
    }
}

impl std::fmt::Debug for Animation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animation")
            .field("duration", &self.duration)
            .field("easing", &self.easing)
            .field("state", &self.state)
            .field("is_reversed", &self.is_reversed)
            .field("is_done", &self.is_done)
            .field("value", &self.value)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
