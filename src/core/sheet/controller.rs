//! Snap-state sheet controller.
//!
//! Owns the discrete snap state and the live drag session, and derives the
//! single value the presentation layer draws from: the render position.
//! All mutation happens on the UI event loop; nothing here is shared.

use super::policy::Thresholds;
use super::snap::{SnapFractions, SnapPositions, SnapState};

/// What to do with `request_state` calls that arrive mid-drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MidDragPolicy {
    /// Keep the latest request and apply it once the drag is released.
    #[default]
    Defer,
    /// Drop the request.
    Ignore,
}

impl MidDragPolicy {
    pub fn key(self) -> &'static str {
        match self {
            MidDragPolicy::Defer => "defer",
            MidDragPolicy::Ignore => "ignore",
        }
    }

    pub fn from_key(s: &str) -> Option<Self> {
        match s {
            "defer" => Some(MidDragPolicy::Defer),
            "ignore" => Some(MidDragPolicy::Ignore),
            _ => None,
        }
    }
}

/// How the presentation layer should move toward the render position.
///
/// `Dragging` tracks the position with no easing; the three resting modes
/// ease toward their snap offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Dragging,
    Open,
    Half,
    Closed,
}

impl RenderMode {
    pub fn is_animated(self) -> bool {
        !matches!(self, RenderMode::Dragging)
    }
}

impl From<SnapState> for RenderMode {
    fn from(state: SnapState) -> Self {
        match state {
            SnapState::Open => RenderMode::Open,
            SnapState::Half => RenderMode::Half,
            SnapState::Closed => RenderMode::Closed,
        }
    }
}

/// Result of an external `request_state` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Applied,
    /// Already in the requested state.
    Unchanged,
    /// Held until the active drag is released.
    Deferred,
    /// Dropped because a drag is active.
    Ignored,
}

/// Tunables for a controller instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetSettings {
    pub fractions: SnapFractions,
    pub thresholds: Thresholds,
    /// Height of the grab handle; subtracted from pointer positions so the
    /// sheet edge sits under the handle, not under the pointer.
    pub grab_offset: f64,
    pub initial: SnapState,
    pub mid_drag: MidDragPolicy,
}

impl Default for SheetSettings {
    fn default() -> Self {
        Self {
            fractions: SnapFractions::default(),
            thresholds: Thresholds::default(),
            grab_offset: 16.0,
            initial: SnapState::Closed,
            mid_drag: MidDragPolicy::Defer,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct DragSession {
    start: f64,
    offset: f64,
}

#[derive(Debug)]
pub struct SheetController {
    settings: SheetSettings,
    state: SnapState,
    positions: SnapPositions,
    container_height: Option<f64>,
    drag: Option<DragSession>,
    pending: Option<SnapState>,
    /// False until the first frame after mount has been presented.
    transitions_armed: bool,
}

impl SheetController {
    pub fn new(settings: SheetSettings) -> Self {
        Self {
            state: settings.initial,
            settings,
            positions: SnapPositions::default(),
            container_height: None,
            drag: None,
            pending: None,
            transitions_armed: false,
        }
    }

    // ── measurement ─────────────────────────────────────────────

    /// Recompute snap positions for a newly measured container.  Returns
    /// `true` when the height actually changed.
    pub fn set_container_height(&mut self, height: f64) -> bool {
        if self.container_height == Some(height) {
            return false;
        }
        self.container_height = Some(height);
        self.positions = SnapPositions::compute(height, &self.settings.fractions);
        tracing::debug!(height, positions = ?self.positions, "sheet: container measured");
        true
    }

    pub fn container_height(&self) -> Option<f64> {
        self.container_height
    }

    pub fn snap_positions(&self) -> SnapPositions {
        self.positions
    }

    // ── gestures ────────────────────────────────────────────────

    /// `start` is the pointer position on the handle, one grab offset below
    /// the sheet's drawn top edge, so the drag begins from what is on screen
    /// even when a snap transition is still easing.
    pub fn on_drag_start(&mut self, start: f64) {
        let offset = start - self.settings.grab_offset;
        self.drag = Some(DragSession { start, offset });
        tracing::debug!(start, state = %self.state, "sheet: drag start");
    }

    pub fn on_drag_move(&mut self, current: f64) {
        if let Some(drag) = self.drag.as_mut() {
            drag.offset = current - self.settings.grab_offset;
        }
    }

    /// Release the drag and apply the transition policy.  Returns the state
    /// the sheet settles in, or `None` when no drag was active.
    pub fn on_drag_end(&mut self, end: f64) -> Option<SnapState> {
        let drag = self.drag.take()?;
        let delta = drag.start - end;
        let from = self.state;
        self.state = self.settings.thresholds.resolve(from, delta);
        tracing::debug!(delta, %from, to = %self.state, "sheet: drag end");

        if let Some(target) = self.pending.take() {
            tracing::debug!(%target, "sheet: applying deferred request");
            self.state = target;
        }
        Some(self.state)
    }

    // ── external control ────────────────────────────────────────

    /// Move the sheet to `target` without any threshold check.
    pub fn request_state(&mut self, target: SnapState) -> RequestOutcome {
        if self.drag.is_some() {
            return match self.settings.mid_drag {
                MidDragPolicy::Defer => {
                    self.pending = Some(target);
                    RequestOutcome::Deferred
                }
                MidDragPolicy::Ignore => RequestOutcome::Ignored,
            };
        }
        if self.state == target {
            return RequestOutcome::Unchanged;
        }
        tracing::debug!(from = %self.state, to = %target, "sheet: state requested");
        self.state = target;
        RequestOutcome::Applied
    }

    // ── rendering ───────────────────────────────────────────────

    /// Call once after each presented frame.
    pub fn frame_presented(&mut self) {
        self.transitions_armed = true;
    }

    pub fn state(&self) -> SnapState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn render_position(&self) -> f64 {
        match self.drag {
            Some(drag) => drag.offset,
            None => self.positions.get(self.state),
        }
    }

    pub fn render_mode(&self) -> RenderMode {
        if self.drag.is_some() || !self.transitions_armed {
            RenderMode::Dragging
        } else {
            self.state.into()
        }
    }
}
