//! Colour palette and text styles used across the UI.

use ratatui::style::{Color, Modifier, Style};

/// Central theme.  All colours live here.
pub struct Theme;

impl Theme {
    // ── background ─────────────────────────────────────────────
    pub fn grid_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn marker_style() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected_marker_style() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    // ── sheet ──────────────────────────────────────────────────
    pub fn sheet_border_style() -> Style {
        Style::default().fg(Color::Gray)
    }

    pub fn handle_style(dragging: bool) -> Style {
        if dragging {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        }
    }

    pub fn title_style() -> Style {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    }

    pub fn label_style() -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn value_style() -> Style {
        Style::default().fg(Color::White)
    }

    // ── chrome ─────────────────────────────────────────────────
    pub fn inset_style() -> Style {
        Style::default().bg(Color::Blue).fg(Color::White)
    }

    pub fn status_bar_style() -> Style {
        Style::default().bg(Color::DarkGray).fg(Color::White)
    }
}
