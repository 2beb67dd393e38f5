//! Bottom sheet overlay: grab handle, title and a small info panel.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use super::layout::SheetGeometry;
use super::theme::Theme;
use crate::core::sheet::{SnapPositions, SnapState};

/// Everything the sheet shows, borrowed from app state for one frame.
pub struct SheetWidget<'a> {
    pub geometry: SheetGeometry,
    pub state: SnapState,
    /// "tracking", "easing" or "resting".
    pub motion: &'static str,
    pub dragging: bool,
    /// Layout-unit offset of the sheet top and the snap targets it moves between.
    pub position: f64,
    pub container_height: f64,
    pub snaps: SnapPositions,
    pub user_name: &'a str,
    pub transport: &'a str,
    pub activity: &'a [String],
}

fn row<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!(" {label:<10}"), Theme::label_style()),
        Span::styled(value, Theme::value_style()),
    ])
}

impl<'a> Widget for SheetWidget<'a> {
    fn render(self, _area: Rect, buf: &mut Buffer) {
        let sheet = self.geometry.sheet;
        if sheet.height == 0 || sheet.width == 0 {
            return;
        }
        Clear.render(sheet, buf);

        let block = Block::default()
            .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
            .border_type(BorderType::Rounded)
            .border_style(Theme::sheet_border_style());
        let inner = block.inner(sheet);
        block.render(sheet, buf);

        let handle = self.geometry.handle;
        if handle.y < sheet.bottom() {
            let bar = "━".repeat(handle.width as usize);
            buf.set_string(handle.x, handle.y, bar, Theme::handle_style(self.dragging));
        }

        // Body starts under the handle row.
        let body = Rect {
            y: inner.y.saturating_add(1),
            height: inner.height.saturating_sub(1),
            ..inner
        };
        if body.height == 0 {
            return;
        }

        let user = if self.user_name.is_empty() {
            "(anonymous)".to_string()
        } else {
            self.user_name.to_string()
        };
        let snaps = format!(
            "{:.0} · {:.0} · {:.0}",
            self.snaps.get(SnapState::Open),
            self.snaps.get(SnapState::Half),
            self.snaps.get(SnapState::Closed),
        );

        let mut lines = vec![
            Line::from(Span::styled(
                format!(" Sheet · {}", self.state.label()),
                Theme::title_style(),
            )),
            Line::raw(""),
            row("state", self.state.label().to_string()),
            row("motion", self.motion.to_string()),
            row(
                "offset",
                format!("{:.0} / {:.0}", self.position, self.container_height),
            ),
            row("snaps", snaps),
            row("user", user),
            row("bridge", self.transport.to_string()),
        ];
        if !self.activity.is_empty() {
            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled(" Recent", Theme::label_style())));
            for entry in self.activity.iter().rev() {
                lines.push(Line::from(Span::styled(
                    format!("  {entry}"),
                    Theme::value_style(),
                )));
            }
        }

        Paragraph::new(lines).render(body, buf);
    }
}
