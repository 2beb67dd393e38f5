//! Input handling: maps key/mouse/host events to state mutations.

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::config::Action;
use crate::core::bridge::{HostCommand, HostHandlers};
use crate::core::sheet::SnapState;
use crate::ui::background;

use super::state::AppState;

/// Process a key event.
pub fn handle_key(state: &mut AppState, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }
    // Ctrl+c always quits.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    let Some(action) = state.config.match_key(key) else {
        return;
    };
    state.status_message = None;

    let current = state.sheet().state();
    let target = match action {
        Action::Quit => {
            state.should_quit = true;
            return;
        }
        Action::OpenSheet => SnapState::Open,
        Action::HalfSheet => SnapState::Half,
        Action::CloseSheet => SnapState::Closed,
        Action::RaiseSheet => current.raised(),
        Action::LowerSheet => current.lowered(),
    };
    state.request_sheet(target, "key");
}

// ── Mouse ───────────────────────────────────────────────────────

/// Process a mouse event.
pub fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    let container = state.layout().container;
    let geometry = state.sheet_geometry();

    if let Some(drag) = state.gesture.feed(mouse, geometry.handle, container) {
        state.apply_drag(drag);
        return;
    }
    if state.gesture.is_active() {
        return;
    }

    // Taps on the visible background select a marker and raise the sheet.
    if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
        if mouse.row >= geometry.sheet.y {
            return;
        }
        if let Some(marker) = background::marker_at(container, mouse.column, mouse.row) {
            state.selected_marker = Some(marker);
            state.log_activity(format!("marker {}", background::marker_label(marker)));
            if state.sheet().state() == SnapState::Closed {
                state.request_sheet(SnapState::Half, "marker");
            }
        }
    }
}

/// Terminal resized.  An in-flight drag is resolved where it last was,
/// since its coordinates no longer line up with the new layout.
pub fn handle_resize(state: &mut AppState, width: u16, height: u16) {
    let container = state.layout().container;
    if let Some(end) = state.gesture.cancel(container.y, container) {
        state.apply_drag(end);
    }
    let area = ratatui::layout::Rect::new(0, 0, width, height);
    state.measure(area);
}

// ── Host ────────────────────────────────────────────────────────

/// Run a host command through the registration table.
pub fn handle_host_command(
    state: &mut AppState,
    handlers: &HostHandlers<AppState>,
    command: HostCommand,
) {
    if let Err(e) = handlers.dispatch(state, &command) {
        tracing::warn!("host command failed: {e}");
        state.status_message = Some(e.to_string());
    }
}
