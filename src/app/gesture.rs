//! Turns raw mouse events into vertical drag gestures on the sheet handle.
//!
//! Only presses that land on the grab handle start a gesture.  Once
//! started, the gesture follows the pointer anywhere on screen until the
//! button is released; horizontal movement is discarded.

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

/// A vertical drag, positions in layout units relative to the container top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEvent {
    Start(f64),
    Move(f64),
    End(f64),
}

#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    units_per_row: f64,
    active: bool,
    /// Last reported row, so repeated events on the same row collapse.
    last_row: Option<u16>,
}

impl GestureRecognizer {
    pub fn new(units_per_row: f64) -> Self {
        Self {
            units_per_row,
            active: false,
            last_row: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Convert a terminal row to a container-relative coordinate.
    pub fn to_units(&self, row: u16, container: Rect) -> f64 {
        f64::from(row.saturating_sub(container.y)) * self.units_per_row
    }

    /// Feed one mouse event.  `handle` is the grab handle's current screen
    /// rect; `container` is the area the sheet moves within.
    pub fn feed(&mut self, mouse: MouseEvent, handle: Rect, container: Rect) -> Option<DragEvent> {
        let y = self.to_units(mouse.row, container);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let on_handle = mouse.column >= handle.x
                    && mouse.column < handle.x.saturating_add(handle.width)
                    && mouse.row >= handle.y
                    && mouse.row < handle.y.saturating_add(handle.height);
                if !on_handle {
                    return None;
                }
                self.active = true;
                self.last_row = Some(mouse.row);
                Some(DragEvent::Start(y))
            }
            MouseEventKind::Drag(MouseButton::Left) if self.active => {
                if self.last_row == Some(mouse.row) {
                    return None;
                }
                self.last_row = Some(mouse.row);
                Some(DragEvent::Move(y))
            }
            MouseEventKind::Up(MouseButton::Left) if self.active => {
                self.active = false;
                self.last_row = None;
                Some(DragEvent::End(y))
            }
            _ => None,
        }
    }

    /// Abandon an in-flight gesture (e.g. focus lost) and report where it
    /// ended so the controller can still resolve it.
    pub fn cancel(&mut self, last_row: u16, container: Rect) -> Option<DragEvent> {
        if !self.active {
            return None;
        }
        self.active = false;
        let row = self.last_row.take().unwrap_or(last_row);
        Some(DragEvent::End(self.to_units(row, container)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    const CONTAINER: Rect = Rect {
        x: 0,
        y: 2,
        width: 80,
        height: 40,
    };
    const HANDLE: Rect = Rect {
        x: 30,
        y: 30,
        width: 20,
        height: 1,
    };

    #[test]
    fn press_outside_handle_is_ignored() {
        let mut g = GestureRecognizer::new(16.0);
        let ev = g.feed(mouse(MouseEventKind::Down(MouseButton::Left), 5, 30), HANDLE, CONTAINER);
        assert_eq!(ev, None);
        let ev = g.feed(mouse(MouseEventKind::Drag(MouseButton::Left), 5, 20), HANDLE, CONTAINER);
        assert_eq!(ev, None);
    }

    #[test]
    fn full_vertical_drag() {
        let mut g = GestureRecognizer::new(16.0);
        let start = g.feed(mouse(MouseEventKind::Down(MouseButton::Left), 35, 30), HANDLE, CONTAINER);
        assert_eq!(start, Some(DragEvent::Start(28.0 * 16.0)));
        assert!(g.is_active());

        // Column changes are irrelevant; only the row moves the sheet.
        let mv = g.feed(mouse(MouseEventKind::Drag(MouseButton::Left), 70, 10), HANDLE, CONTAINER);
        assert_eq!(mv, Some(DragEvent::Move(8.0 * 16.0)));
        let same_row = g.feed(mouse(MouseEventKind::Drag(MouseButton::Left), 2, 10), HANDLE, CONTAINER);
        assert_eq!(same_row, None);

        let end = g.feed(mouse(MouseEventKind::Up(MouseButton::Left), 0, 10), HANDLE, CONTAINER);
        assert_eq!(end, Some(DragEvent::End(8.0 * 16.0)));
        assert!(!g.is_active());
    }

    #[test]
    fn rows_above_container_clamp_to_zero() {
        let g = GestureRecognizer::new(16.0);
        assert_eq!(g.to_units(0, CONTAINER), 0.0);
    }

    #[test]
    fn cancel_ends_at_last_seen_row() {
        let mut g = GestureRecognizer::new(10.0);
        g.feed(mouse(MouseEventKind::Down(MouseButton::Left), 35, 30), HANDLE, CONTAINER);
        g.feed(mouse(MouseEventKind::Drag(MouseButton::Left), 35, 20), HANDLE, CONTAINER);
        assert_eq!(g.cancel(0, CONTAINER), Some(DragEvent::End(180.0)));
        assert_eq!(g.cancel(0, CONTAINER), None);
    }
}
