//! Central application state.
//!
//! All mutable state lives here so that the rest of the app can be pure
//! functions over `&AppState` (rendering) or `&mut AppState` (event handling).

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;

use crate::app::gesture::{DragEvent, GestureRecognizer};
use crate::config::AppConfig;
use crate::core::bridge::HostContext;
use crate::core::sheet::{RequestOutcome, SheetController, SnapState};
use crate::ui::animation::SheetAnimator;
use crate::ui::layout::{AppLayout, SheetGeometry};

/// Entries kept in the sheet's activity list.
const ACTIVITY_LEN: usize = 4;

/// Top-level application state.
pub struct AppState {
    /// Sheet state machine.  Only reachable through the methods below so
    /// the single external entry point stays `request_sheet`.
    sheet: SheetController,
    /// Position actually drawn, eased toward the controller's target.
    pub animator: SheetAnimator,
    /// Mouse → drag translation for the grab handle.
    pub gesture: GestureRecognizer,
    pub config: AppConfig,
    /// Values fetched from the host at startup.
    pub host: HostContext,
    /// Name of the transport answering bridge calls.
    pub transport: &'static str,
    /// Full terminal area as of the last frame.
    pub terminal_area: Rect,
    /// Marker last tapped on the background.
    pub selected_marker: Option<usize>,
    /// Most recent notable events, newest last.
    pub activity: VecDeque<String>,
    /// An optional status message shown in the bottom bar.
    pub status_message: Option<String>,
    /// Controls the main event loop.
    pub should_quit: bool,
}

impl AppState {
    pub fn new(config: AppConfig, transport: &'static str) -> Self {
        Self {
            sheet: SheetController::new(config.sheet),
            animator: SheetAnimator::new(Duration::from_millis(config.transition_ms)),
            gesture: GestureRecognizer::new(config.units_per_row),
            config,
            host: HostContext::default(),
            transport,
            terminal_area: Rect::default(),
            selected_marker: None,
            activity: VecDeque::new(),
            status_message: None,
            should_quit: false,
        }
    }

    pub fn sheet(&self) -> &SheetController {
        &self.sheet
    }

    pub fn layout(&self) -> AppLayout {
        AppLayout::from_area(self.terminal_area, self.host.status_bar_height)
    }

    /// Where the sheet is drawn this frame.
    pub fn sheet_geometry(&self) -> SheetGeometry {
        SheetGeometry::compute(
            self.layout().container,
            self.animator.position(),
            self.config.units_per_row,
        )
    }

    pub fn log_activity(&mut self, entry: impl Into<String>) {
        if self.activity.len() == ACTIVITY_LEN {
            self.activity.pop_front();
        }
        self.activity.push_back(entry.into());
    }

    /// Measure the container for the current terminal area.  A changed
    /// height moves the sheet immediately; resizes never animate.
    pub fn measure(&mut self, area: Rect) {
        self.terminal_area = area;
        let rows = self.layout().container.height;
        let height = f64::from(rows) * self.config.units_per_row;
        if self.sheet.set_container_height(height) && !self.sheet.is_dragging() {
            self.animator.jump(self.sheet.render_position());
        }
    }

    /// Bring the animator up to date; call right before drawing.
    pub fn prepare_frame(&mut self, area: Rect, now: Instant) {
        self.measure(area);
        self.animator
            .update(self.sheet.render_mode(), self.sheet.render_position(), now);
    }

    /// Call right after a frame has been presented.
    pub fn frame_presented(&mut self) {
        self.sheet.frame_presented();
    }

    /// The one external control surface of the sheet.
    pub fn request_sheet(&mut self, target: SnapState, source: &str) -> RequestOutcome {
        let outcome = self.sheet.request_state(target);
        match outcome {
            RequestOutcome::Applied => self.log_activity(format!("{source}: {}", target.key())),
            RequestOutcome::Deferred => {
                self.status_message = Some(format!("{source}: {} after drag", target.key()));
            }
            RequestOutcome::Ignored => {
                self.status_message = Some(format!("{source}: ignored while dragging"));
            }
            RequestOutcome::Unchanged => {}
        }
        outcome
    }

    /// Forward a recognised drag to the controller.
    pub fn apply_drag(&mut self, event: DragEvent) {
        match event {
            DragEvent::Start(y) => self.sheet.on_drag_start(y),
            DragEvent::Move(y) => self.sheet.on_drag_move(y),
            DragEvent::End(y) => {
                let before = self.sheet.state();
                if let Some(after) = self.sheet.on_drag_end(y) {
                    if after != before {
                        self.log_activity(format!("drag: {}", after.key()));
                    }
                }
            }
        }
    }

    pub fn set_host_context(&mut self, host: HostContext) {
        self.host = host;
        if self.terminal_area.height > 0 {
            self.measure(self.terminal_area);
        }
    }
}
