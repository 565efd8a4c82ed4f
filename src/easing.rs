// Easing curves and time-based tweens.
// A tween is a pure function of the sample timestamp; nothing advances on its own.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Easing function for transitions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Easing {
    Linear,
    EaseOut,
    /// Damped overshoot; settles exactly on 1.
    Spring,
    /// CSS `cubic-bezier(x1, y1, x2, y2)`.
    CubicBezier(f64, f64, f64, f64),
}

impl Easing {
    /// The house curve, `cubic-bezier(.22,.8,.2,1)`.
    pub const HOUSE: Easing = Easing::CubicBezier(0.22, 0.8, 0.2, 1.0);

    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match *self {
            Easing::Linear => t,
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
            Easing::Spring => {
                // Simple spring approximation.
                let c4 = (2.0 * std::f64::consts::PI) / 3.0;
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else {
                    2.0_f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
                }
            }
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier(x1, y1, x2, y2, t),
        }
    }
}

fn bezier_axis(a1: f64, a2: f64, s: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * a1 + 3.0 * inv * s * s * a2 + s * s * s
}

fn bezier_axis_slope(a1: f64, a2: f64, s: f64) -> f64 {
    let inv = 1.0 - s;
    3.0 * inv * inv * a1 + 6.0 * inv * s * (a2 - a1) + 3.0 * s * s * (1.0 - a2)
}

/// Solve x(s) = t for s, then return y(s). Newton first, bisection fallback.
fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, t: f64) -> f64 {
    if t <= 0.0 || t >= 1.0 {
        return t;
    }
    let x1 = x1.clamp(0.0, 1.0);
    let x2 = x2.clamp(0.0, 1.0);

    let mut s = t;
    for _ in 0..8 {
        let err = bezier_axis(x1, x2, s) - t;
        if err.abs() < 1e-7 {
            return bezier_axis(y1, y2, s);
        }
        let slope = bezier_axis_slope(x1, x2, s);
        if slope.abs() < 1e-6 {
            break;
        }
        s -= err / slope;
    }

    let (mut lo, mut hi) = (0.0, 1.0);
    s = t;
    for _ in 0..40 {
        let x = bezier_axis(x1, x2, s);
        if (x - t).abs() < 1e-7 {
            break;
        }
        if x < t {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    bezier_axis(y1, y2, s)
}

/// Values that can be linearly interpolated.
pub trait Lerp: Copy {
    fn lerp(self, to: Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(self, to: Self, t: f64) -> Self {
        lerp(self, to, t)
    }
}

impl Lerp for Point {
    fn lerp(self, to: Self, t: f64) -> Self {
        Point::new(lerp(self.x, to.x, t), lerp(self.y, to.y, t))
    }
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// A single from→to transition anchored at a start timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween<T> {
    pub from: T,
    pub to: T,
    pub start: Timestamp,
    pub duration_secs: f64,
    pub easing: Easing,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T, start: Timestamp, duration_secs: f64, easing: Easing) -> Self {
        Tween {
            from,
            to,
            start,
            duration_secs: duration_secs.max(0.0),
            easing,
        }
    }

    /// A tween that already sits at its end value.
    pub fn settled(value: T) -> Self {
        Tween::new(value, value, Timestamp::default(), 0.0, Easing::Linear)
    }

    /// Linear progress in [0, 1]. Zero duration is always finished.
    pub fn progress(&self, now: Timestamp) -> f64 {
        if self.duration_secs <= 0.0 {
            return 1.0;
        }
        (now.secs_since(self.start) / self.duration_secs).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, now: Timestamp) -> bool {
        self.progress(now) >= 1.0
    }

    pub fn sample(&self, now: Timestamp) -> T {
        let p = self.progress(now);
        if p >= 1.0 {
            return self.to;
        }
        self.from.lerp(self.to, self.easing.apply(p))
    }
}
