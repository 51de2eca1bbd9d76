//! Theme lookup tables shared down the view tree.
//!
//! A [`Theme`] is a cheap handle to an immutable table of colors, easings and
//! plain values. Views inherit their parent's handle unless they install
//! their own. Editing a handle that is shared makes a private copy first
//! (copy-on-write), so a subtree can diverge without touching its ancestors.
//!
//! Lookups never fail: missing keys resolve to [`Color::TRANSPARENT`],
//! [`Easing::default`] and `0.0`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::animation::Easing;
use crate::geometry::Color;

/// Well-known theme keys used by the core.
pub mod keys {
    /// Color of elevation shadows
    pub const SHADOW: &str = "shadow";
    pub const BACKGROUND: &str = "background";
    pub const FOREGROUND: &str = "foreground";
    pub const ACCENT: &str = "accent";
    /// Easing for press/hover feedback
    pub const FEEDBACK_EASING: &str = "easing.feedback";
    /// Duration of press/hover feedback in milliseconds
    pub const FEEDBACK_DURATION_MS: &str = "duration.feedback";
}

#[derive(Debug, Clone, Default)]
struct ThemeData {
    colors: HashMap<String, Color>,
    easings: HashMap<String, Easing>,
    values: HashMap<String, f32>,
}

#[derive(Debug, Clone, Default)]
pub struct Theme {
    data: Arc<ThemeData>,
}

impl Theme {
    /// An empty theme; every lookup returns its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// A theme with the keys the core itself reads.
    pub fn standard() -> Self {
        Theme::new()
            .with_color(keys::SHADOW, Color::rgba(0.0, 0.0, 0.0, 0.3))
            .with_color(keys::BACKGROUND, Color::WHITE)
            .with_color(keys::FOREGROUND, Color::BLACK)
            .with_color(keys::ACCENT, Color::from_hex(0x3F51B5))
            .with_easing(keys::FEEDBACK_EASING, Easing::CubicBezier(0.4, 0.0, 0.2, 1.0))
            .with_value(keys::FEEDBACK_DURATION_MS, 150.0)
    }

    pub fn color(&self, key: &str) -> Color {
        self.data.colors.get(key).copied().unwrap_or(Color::TRANSPARENT)
    }

    pub fn easing(&self, key: &str) -> Easing {
        self.data.easings.get(key).cloned().unwrap_or_default()
    }

    pub fn value(&self, key: &str) -> f32 {
        self.data.values.get(key).copied().unwrap_or(0.0)
    }

    pub fn set_color(&mut self, key: impl Into<String>, color: Color) {
        Arc::make_mut(&mut self.data).colors.insert(key.into(), color);
    }

    pub fn set_easing(&mut self, key: impl Into<String>, easing: Easing) {
        Arc::make_mut(&mut self.data).easings.insert(key.into(), easing);
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: f32) {
        Arc::make_mut(&mut self.data).values.insert(key.into(), value);
    }

    pub fn with_color(mut self, key: impl Into<String>, color: Color) -> Self {
        self.set_color(key, color);
        self
    }

    pub fn with_easing(mut self, key: impl Into<String>, easing: Easing) -> Self {
        self.set_easing(key, easing);
        self
    }

    pub fn with_value(mut self, key: impl Into<String>, value: f32) -> Self {
        self.set_value(key, value);
        self
    }

    /// Whether another handle refers to the same table.
    pub fn is_shared(&self) -> bool {
        Arc::strong_count(&self.data) > 1
    }

    pub fn ptr_eq(&self, other: &Theme) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}
