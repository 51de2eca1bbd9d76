//! Easing curves for animations.
//!
//! An easing maps normalized time in `[0, 1]` to a progress value in
//! `[0, 1]`. The presets are cubic Bezier curves with the usual CSS control
//! points; [`Easing::CubicBezier`] takes arbitrary ones.
//!
//! Bezier curves are solved by bisecting the curve parameter until the
//! x-coordinate is within the requested precision of the input time. Values
//! closer than `0.0001` to either end snap to exactly `0` or `1`, so an
//! animation always starts and finishes on its endpoints.

use std::sync::Arc;

/// Precision used when an animation does not configure its own.
pub const DEFAULT_PRECISION: f32 = 0.0001;

const SNAP_LOW: f32 = 0.0001;
const SNAP_HIGH: f32 = 0.9999;
const MAX_ITERATIONS: usize = 64;

#[derive(Clone, Default)]
pub enum Easing {
    /// Constant speed (no easing)
    Linear,
    /// Starts slow, ends fast
    EaseIn,
    /// Starts fast, ends slow
    EaseOut,
    /// Slow start and end, fast middle
    #[default]
    EaseInOut,
    /// CSS cubic-bezier curve (x1, y1, x2, y2)
    CubicBezier(f32, f32, f32, f32),
    /// User-defined curve
    Custom(Arc<dyn Fn(f32) -> f32 + Send + Sync>),
}

impl Easing {
    /// Create a custom easing from a closure
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f32) -> f32 + Send + Sync + 'static,
    {
        Easing::Custom(Arc::new(f))
    }

    /// Bezier control points for the curve, if it is one.
    pub fn control_points(&self) -> Option<(f32, f32, f32, f32)> {
        match self {
            Easing::Linear => Some((0.0, 0.0, 1.0, 1.0)),
            Easing::EaseIn => Some((0.42, 0.0, 1.0, 1.0)),
            Easing::EaseOut => Some((0.0, 0.0, 0.58, 1.0)),
            Easing::EaseInOut => Some((0.42, 0.0, 0.58, 1.0)),
            Easing::CubicBezier(x1, y1, x2, y2) => Some((*x1, *y1, *x2, *y2)),
            Easing::Custom(_) => None,
        }
    }

    /// Evaluate the curve at normalized time `t`.
    ///
    /// The result is always within `[0, 1]`.
    pub fn evaluate(&self, t: f32, precision: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let raw = match self {
            Easing::Linear => t,
            Easing::Custom(f) => f(t),
            _ => match self.control_points() {
                Some((x1, y1, x2, y2)) => cubic_bezier(t, x1, y1, x2, y2, precision),
                None => t,
            },
        };
        snap(raw)
    }

    /// Find the normalized time at which the curve reaches `value`.
    ///
    /// Assumes the curve is non-decreasing, which holds for every preset and
    /// for Bezier curves whose y control points lie in `[0, 1]`.
    pub fn inverse(&self, value: f32, precision: f32) -> f32 {
        let value = value.clamp(0.0, 1.0);
        if value <= 0.0 {
            return 0.0;
        }
        if value >= 1.0 {
            return 1.0;
        }

        let precision = effective_precision(precision);
        let (mut low, mut high) = (0.0_f32, 1.0_f32);
        for _ in 0..MAX_ITERATIONS {
            if high - low < precision {
                break;
            }
            let mid = (low + high) / 2.0;
            if self.evaluate(mid, precision) < value {
                low = mid;
            } else {
                high = mid;
            }
        }
        (low + high) / 2.0
    }
}

impl std::fmt::Debug for Easing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Easing::Linear => write!(f, "Linear"),
            Easing::EaseIn => write!(f, "EaseIn"),
            Easing::EaseOut => write!(f, "EaseOut"),
            Easing::EaseInOut => write!(f, "EaseInOut"),
            Easing::CubicBezier(x1, y1, x2, y2) => {
                write!(f, "CubicBezier({}, {}, {}, {})", x1, y1, x2, y2)
            }
            Easing::Custom(_) => write!(f, "Custom"),
        }
    }
}

fn effective_precision(precision: f32) -> f32 {
    if precision.is_finite() && precision > 0.0 {
        precision
    } else {
        DEFAULT_PRECISION
    }
}

fn snap(value: f32) -> f32 {
    if value.is_nan() || value < SNAP_LOW {
        0.0
    } else if value > SNAP_HIGH {
        1.0
    } else {
        value
    }
}

/// Solve the curve parameter for `x == t`, then return its y.
fn cubic_bezier(t: f32, x1: f32, y1: f32, x2: f32, y2: f32, precision: f32) -> f32 {
    // x must stay monotonic for the parameter search to be well-defined
    let x1 = x1.clamp(0.0, 1.0);
    let x2 = x2.clamp(0.0, 1.0);
    let precision = effective_precision(precision);

    let (mut low, mut high) = (0.0_f32, 1.0_f32);
    let mut s = t;
    for _ in 0..MAX_ITERATIONS {
        let x = cubic_bezier_component(s, x1, x2);
        if (x - t).abs() < precision {
            break;
        }
        if x < t {
            low = s;
        } else {
            high = s;
        }
        s = (low + high) / 2.0;
    }

    cubic_bezier_component(s, y1, y2)
}

fn cubic_bezier_component(s: f32, p1: f32, p2: f32) -> f32 {
    let s2 = s * s;
    let s3 = s2 * s;
    let ms = 1.0 - s;
    let ms2 = ms * ms;
    3.0 * ms2 * s * p1 + 3.0 * ms * s2 * p2 + s3
}
