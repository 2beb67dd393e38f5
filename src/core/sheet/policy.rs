//! Release policy: where a drag lands once the pointer lets go.
//!
//! `delta` is measured as `start - end`, so dragging toward the top of the
//! screen yields a positive value.  Boundaries are intentionally asymmetric;
//! each comparison below is either strict or not and must stay that way.

use super::snap::SnapState;

/// Distances (in layout units) a drag must cover to change state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Closed → Half when `delta > closed_to_half`.
    pub closed_to_half: f64,
    /// Closed → Open when `delta > closed_to_open`.
    pub closed_to_open: f64,
    /// Half → Open when `delta > half_to_open`.
    pub half_to_open: f64,
    /// Half → Closed when `delta < -half_to_closed`.
    pub half_to_closed: f64,
    /// Open → Half when `delta < -open_to_half`.
    pub open_to_half: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            closed_to_half: 120.0,
            closed_to_open: 320.0,
            half_to_open: 120.0,
            half_to_closed: 50.0,
            open_to_half: 120.0,
        }
    }
}

impl Thresholds {
    /// Resolve the state a drag of `delta` ends in, starting from `from`.
    pub fn resolve(&self, from: SnapState, delta: f64) -> SnapState {
        match from {
            SnapState::Closed => {
                if delta > self.closed_to_open {
                    SnapState::Open
                } else if delta > self.closed_to_half {
                    SnapState::Half
                } else {
                    SnapState::Closed
                }
            }
            SnapState::Half => {
                if delta > self.half_to_open {
                    SnapState::Open
                } else if delta < -self.half_to_closed {
                    SnapState::Closed
                } else {
                    SnapState::Half
                }
            }
            SnapState::Open => {
                if delta < -self.open_to_half {
                    SnapState::Half
                } else {
                    SnapState::Open
                }
            }
        }
    }

    /// All thresholds must be non-negative and `closed_to_open` must not be
    /// below `closed_to_half`, otherwise Closed could never reach Half.
    pub fn is_valid(&self) -> bool {
        [
            self.closed_to_half,
            self.closed_to_open,
            self.half_to_open,
            self.half_to_closed,
            self.open_to_half,
        ]
        .iter()
        .all(|t| t.is_finite() && *t >= 0.0)
            && self.closed_to_half <= self.closed_to_open
    }
}
