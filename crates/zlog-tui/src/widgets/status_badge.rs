//! Colored HTTP status badge for the log table.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;

use crate::theme;

/// Badge color by status class: 5xx red, 4xx yellow, everything else green.
pub fn status_color(status: u16) -> Color {
    match status {
        500.. => theme::ERROR_RED,
        400..=499 => theme::ELECTRIC_YELLOW,
        _ => theme::SUCCESS_GREEN,
    }
}

pub fn status_badge(status: u16) -> Span<'static> {
    let label = if status == 0 {
        " ─── ".to_owned()
    } else {
        format!(" {status} ")
    };
    Span::styled(
        label,
        Style::default()
            .fg(theme::BG_DARK)
            .bg(status_color(status))
            .add_modifier(Modifier::BOLD),
    )
}
