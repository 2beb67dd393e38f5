//! Eased snap animation for the sheet.
//!
//! The animator owns the position actually drawn.  While the controller
//! reports [`RenderMode::Dragging`] it copies the target every frame; in
//! any resting mode a change of target starts a fixed-duration ease-out
//! tween from wherever the sheet currently is.

use std::time::{Duration, Instant};

use crate::core::sheet::RenderMode;

const EPSILON: f64 = 0.01;

#[derive(Debug, Clone, Copy)]
struct Tween {
    from: f64,
    to: f64,
    started: Instant,
}

#[derive(Debug, Clone)]
pub struct SheetAnimator {
    displayed: f64,
    target: f64,
    tween: Option<Tween>,
    duration: Duration,
}

/// Cubic ease-out: fast start, gentle landing.
fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

impl SheetAnimator {
    pub fn new(duration: Duration) -> Self {
        Self {
            displayed: 0.0,
            target: 0.0,
            tween: None,
            duration,
        }
    }

    /// Place the sheet at `target` with no transition.
    pub fn jump(&mut self, target: f64) {
        self.displayed = target;
        self.target = target;
        self.tween = None;
    }

    /// Advance one frame toward `target`.
    pub fn update(&mut self, mode: RenderMode, target: f64, now: Instant) {
        if !mode.is_animated() || self.duration.is_zero() {
            self.jump(target);
            return;
        }

        if (target - self.target).abs() > EPSILON {
            self.target = target;
            self.tween = Some(Tween {
                from: self.displayed,
                to: target,
                started: now,
            });
        }

        let Some(tween) = self.tween else {
            return;
        };
        let elapsed = now.saturating_duration_since(tween.started);
        let t = (elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0);
        self.displayed = tween.from + (tween.to - tween.from) * ease_out_cubic(t);
        if t >= 1.0 {
            self.displayed = tween.to;
            self.tween = None;
        }
    }

    pub fn position(&self) -> f64 {
        self.displayed
    }

    /// True while a tween is still in flight.
    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }
}
