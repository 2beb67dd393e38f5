//! Background pane the sheet slides over: a dotted grid with a few
//! tappable markers.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use super::theme::Theme;

/// Marker anchors as fractions of the container (x, y).
const MARKERS: &[(f64, f64)] = &[(0.18, 0.22), (0.52, 0.12), (0.78, 0.35), (0.33, 0.48)];

/// Screen cell of marker `index` inside `area`.
pub fn marker_cell(area: Rect, index: usize) -> Option<(u16, u16)> {
    let &(fx, fy) = MARKERS.get(index)?;
    let x = area.x + (f64::from(area.width.saturating_sub(1)) * fx).round() as u16;
    let y = area.y + (f64::from(area.height.saturating_sub(1)) * fy).round() as u16;
    Some((x, y))
}

/// Marker under a clicked cell, if any.  The label to the right of the
/// pin counts as part of it.
pub fn marker_at(area: Rect, column: u16, row: u16) -> Option<usize> {
    (0..MARKERS.len()).find(|&i| {
        marker_cell(area, i).is_some_and(|(x, y)| y == row && column >= x && column < x + 3)
    })
}

pub fn marker_label(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}

pub struct Background {
    pub selected: Option<usize>,
}

impl Widget for Background {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        for y in area.top()..area.bottom() {
            for x in (area.left()..area.right()).step_by(4) {
                if (y - area.y) % 2 == 0 {
                    buf.set_string(x, y, "·", Theme::grid_style());
                }
            }
        }

        for i in 0..MARKERS.len() {
            let Some((x, y)) = marker_cell(area, i) else {
                continue;
            };
            let style = if self.selected == Some(i) {
                Theme::selected_marker_style()
            } else {
                Theme::marker_style()
            };
            let line = Line::from(Span::styled(format!("◆{}", marker_label(i)), style));
            buf.set_line(x, y, &line, area.right().saturating_sub(x));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_are_hit_on_their_cells() {
        let area = Rect::new(0, 0, 101, 51);
        let (x, y) = marker_cell(area, 1).unwrap();
        assert_eq!((x, y), (52, 6));
        assert_eq!(marker_at(area, x, y), Some(1));
        assert_eq!(marker_at(area, x + 1, y), Some(1));
        assert_eq!(marker_at(area, x, y + 1), None);
    }

    #[test]
    fn labels_are_letters() {
        assert_eq!(marker_label(0), 'A');
        assert_eq!(marker_label(3), 'D');
    }
}
