//! Layout helpers: split the terminal area into regions and place the
//! sheet inside its container.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Primary screen layout: host chrome inset on top, the container the
/// sheet moves within, and a bottom status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub inset_area: Rect,
    pub container: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    pub fn from_area(area: Rect, top_inset: u16) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(top_inset), // host status bar
                Constraint::Min(3),            // container
                Constraint::Length(1),         // status bar
            ])
            .split(area);

        Self {
            inset_area: chunks[0],
            container: chunks[1],
            status_area: chunks[2],
        }
    }
}

/// Where the sheet lands on screen for a given render position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetGeometry {
    /// From the sheet's top edge down to the container bottom.
    pub sheet: Rect,
    /// Grab handle, one row below the top edge.
    pub handle: Rect,
}

/// Width of the grab handle in columns.
const HANDLE_WIDTH: u16 = 12;

impl SheetGeometry {
    /// `position` is the render position in layout units from the
    /// container top; `units_per_row` converts it to terminal rows.
    pub fn compute(container: Rect, position: f64, units_per_row: f64) -> Self {
        let max_row = container.height.saturating_sub(2);
        let row = (position.max(0.0) / units_per_row).round();
        let row = if row >= f64::from(max_row) { max_row } else { row as u16 };

        let sheet = Rect {
            x: container.x,
            y: container.y + row,
            width: container.width,
            height: container.height - row,
        };
        let width = HANDLE_WIDTH.min(sheet.width);
        let handle = Rect {
            x: sheet.x + (sheet.width - width) / 2,
            y: sheet.y + 1,
            width,
            height: 1,
        };
        Self { sheet, handle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_reserves_inset_and_status_rows() {
        let l = AppLayout::from_area(Rect::new(0, 0, 80, 30), 2);
        assert_eq!(l.inset_area.height, 2);
        assert_eq!(l.container, Rect::new(0, 2, 80, 27));
        assert_eq!(l.status_area, Rect::new(0, 29, 80, 1));
    }

    #[test]
    fn sheet_top_follows_position() {
        let container = Rect::new(0, 1, 80, 40);
        let g = SheetGeometry::compute(container, 160.0, 16.0);
        assert_eq!(g.sheet.y, 11);
        assert_eq!(g.sheet.height, 30);
        assert_eq!(g.handle.y, 12);
        assert_eq!(g.handle.x, 34);
    }

    #[test]
    fn sheet_keeps_handle_visible() {
        let container = Rect::new(0, 0, 80, 20);
        let g = SheetGeometry::compute(container, 10_000.0, 16.0);
        assert_eq!(g.sheet.y, 18);
        assert_eq!(g.handle.y, 19);

        let g = SheetGeometry::compute(container, -50.0, 16.0);
        assert_eq!(g.sheet.y, 0);
    }
}
