//! Snap states and the offsets they rest at.
//!
//! Offsets grow downward from the top of the container: a smaller offset
//! means more of the sheet is visible.

use std::fmt;
use std::str::FromStr;

/// Discrete resting position of the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SnapState {
    Open,
    Half,
    #[default]
    Closed,
}

impl SnapState {
    /// Ordered from most to least visible.
    pub const ALL: &[SnapState] = &[SnapState::Open, SnapState::Half, SnapState::Closed];

    /// Human-readable label for the UI.
    pub fn label(self) -> &'static str {
        match self {
            SnapState::Open => "Open",
            SnapState::Half => "Half",
            SnapState::Closed => "Closed",
        }
    }

    /// Lower-case key used in the config file and on the bridge.
    pub fn key(self) -> &'static str {
        match self {
            SnapState::Open => "open",
            SnapState::Half => "half",
            SnapState::Closed => "closed",
        }
    }

    /// One step more visible, saturating at `Open`.
    pub fn raised(self) -> Self {
        match self {
            SnapState::Closed => SnapState::Half,
            SnapState::Half | SnapState::Open => SnapState::Open,
        }
    }

    /// One step less visible, saturating at `Closed`.
    pub fn lowered(self) -> Self {
        match self {
            SnapState::Open => SnapState::Half,
            SnapState::Half | SnapState::Closed => SnapState::Closed,
        }
    }
}

impl fmt::Display for SnapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sheet state `{0}` (expected open, half or closed)")]
pub struct ParseSnapStateError(pub String);

impl FromStr for SnapState {
    type Err = ParseSnapStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(SnapState::Open),
            "half" => Ok(SnapState::Half),
            "closed" | "close" => Ok(SnapState::Closed),
            other => Err(ParseSnapStateError(other.to_string())),
        }
    }
}

// ───────────────────────────────────────── fractions ─────────

/// Fraction of the container height each state rests at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapFractions {
    pub open: f64,
    pub half: f64,
    pub closed: f64,
}

impl Default for SnapFractions {
    fn default() -> Self {
        Self {
            open: 0.01,
            half: 0.45,
            closed: 0.70,
        }
    }
}

impl SnapFractions {
    /// Fractions must lie in `[0, 1]` and be strictly ordered
    /// `open < half < closed`.
    pub fn is_valid(&self) -> bool {
        let in_range = |f: f64| (0.0..=1.0).contains(&f);
        in_range(self.open)
            && in_range(self.half)
            && in_range(self.closed)
            && self.open < self.half
            && self.half < self.closed
    }

    pub fn get(&self, state: SnapState) -> f64 {
        match state {
            SnapState::Open => self.open,
            SnapState::Half => self.half,
            SnapState::Closed => self.closed,
        }
    }
}

// ───────────────────────────────────────── positions ─────────

/// Resolved offsets for a measured container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SnapPositions {
    open: f64,
    half: f64,
    closed: f64,
}

impl SnapPositions {
    pub fn compute(container_height: f64, fractions: &SnapFractions) -> Self {
        let h = container_height.max(0.0);
        Self {
            open: h * fractions.get(SnapState::Open),
            half: h * fractions.get(SnapState::Half),
            closed: h * fractions.get(SnapState::Closed),
        }
    }

    pub fn get(&self, state: SnapState) -> f64 {
        match state {
            SnapState::Open => self.open,
            SnapState::Half => self.half,
            SnapState::Closed => self.closed,
        }
    }
}
