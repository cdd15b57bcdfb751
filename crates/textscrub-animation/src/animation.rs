//! Fixed-duration animations driven by an external clock.
//!
//! Nothing here owns a timer: callers sample [`TimedAnimation::value_at`]
//! from their frame loop (or from a test with synthetic instants) until
//! [`TimedAnimation::is_finished`] reports completion.

use web_time::{Duration, Instant};

/// Trait for types that can be linearly interpolated.
pub trait Lerp {
    fn lerp(&self, target: &Self, fraction: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        self + (target - self) * fraction
    }
}

impl Lerp for f64 {
    fn lerp(&self, target: &Self, fraction: f32) -> Self {
        self + (target - self) * fraction as f64
    }
}

/// Easing curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    /// No easing; constant velocity.
    Linear,
    /// Material fast-out-slow-in, cubic bezier (0.4, 0.0, 0.2, 1.0).
    FastOutSlowIn,
}

impl Easing {
    /// Maps a linear fraction in `[0, 1]` through the curve.
    pub fn transform(&self, fraction: f32) -> f32 {
        match self {
            Easing::Linear => fraction,
            Easing::FastOutSlowIn => cubic_bezier(0.4, 0.0, 0.2, 1.0, fraction),
        }
    }
}

/// Evaluates y for the given x fraction on a cubic bezier easing curve.
/// Solves the x polynomial by bisection; 20 halvings is well below visual
/// precision for easing purposes.
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, fraction: f32) -> f32 {
    if fraction <= 0.0 {
        return 0.0;
    }
    if fraction >= 1.0 {
        return 1.0;
    }

    fn axis(p1: f32, p2: f32, t: f32) -> f32 {
        let inv = 1.0 - t;
        3.0 * inv * inv * t * p1 + 3.0 * inv * t * t * p2 + t * t * t
    }

    let mut lo = 0.0_f32;
    let mut hi = 1.0_f32;
    let mut t = fraction;
    for _ in 0..20 {
        if axis(x1, x2, t) < fraction {
            lo = t;
        } else {
            hi = t;
        }
        t = (lo + hi) * 0.5;
    }
    axis(y1, y2, t)
}

/// A fixed-duration interpolation from a start to an end value.
#[derive(Debug, Clone)]
pub struct TimedAnimation<T: Lerp + Clone> {
    start: T,
    end: T,
    started_at: Instant,
    duration: Duration,
    easing: Easing,
}

impl<T: Lerp + Clone> TimedAnimation<T> {
    pub fn new(start: T, end: T, started_at: Instant, duration: Duration, easing: Easing) -> Self {
        Self {
            start,
            end,
            started_at,
            duration,
            easing,
        }
    }

    /// Linear progress in `[0, 1]` at `now`, before easing.
    pub fn fraction_at(&self, now: Instant) -> f32 {
        if self.duration.is_zero() || now <= self.started_at {
            return if self.duration.is_zero() { 1.0 } else { 0.0 };
        }
        let elapsed = now.duration_since(self.started_at).as_secs_f32();
        (elapsed / self.duration.as_secs_f32()).min(1.0)
    }

    /// Interpolated value at `now`.
    pub fn value_at(&self, now: Instant) -> T {
        let fraction = self.easing.transform(self.fraction_at(now));
        self.start.lerp(&self.end, fraction)
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.fraction_at(now) >= 1.0
    }

    pub fn end_value(&self) -> &T {
        &self.end
    }

    /// Restarts toward `new_end` from the value currently displayed, so an
    /// in-flight animation never snaps back to its old endpoint.
    pub fn retargeted(&self, now: Instant, new_end: T) -> Self {
        Self {
            start: self.value_at(now),
            end: new_end,
            started_at: now,
            duration: self.duration,
            easing: self.easing,
        }
    }
}
