//! Dashboard panels. Each panel is a Component rendered into a fixed slot.

pub mod logs;
pub mod projects;
pub mod snippets;
pub mod stats;

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::theme;

/// Panels that can take keyboard focus, in Tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelId {
    #[default]
    Projects,
    Logs,
    Snippets,
}

impl PanelId {
    pub fn next(self) -> Self {
        match self {
            Self::Projects => Self::Logs,
            Self::Logs => Self::Snippets,
            Self::Snippets => Self::Projects,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Projects => Self::Snippets,
            Self::Logs => Self::Projects,
            Self::Snippets => Self::Logs,
        }
    }
}

/// Rounded panel frame with the focus-dependent border.
pub(crate) fn panel_block(title: impl Into<Line<'static>>, focused: bool) -> Block<'static> {
    Block::default()
        .title(title)
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_for(focused))
}

/// One-line error banner across the top of a panel.
pub(crate) fn render_banner(frame: &mut Frame, area: Rect, message: &str) {
    let line = Line::from(vec![
        Span::styled(" ✗ ", theme::banner_error()),
        Span::styled(message.to_owned(), theme::banner_error()),
    ]);
    frame.render_widget(Paragraph::new(line).style(theme::banner_error()), area);
}

/// Centered placeholder for panels without rows.
pub(crate) fn render_placeholder(frame: &mut Frame, area: Rect, text: &str) {
    if area.height == 0 {
        return;
    }
    let line_area = Rect::new(area.x, area.y + area.height / 2, area.width, 1);
    frame.render_widget(
        Paragraph::new(Span::styled(text.to_owned(), theme::empty_state()))
            .alignment(Alignment::Center),
        line_area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_cycles_both_ways() {
        for id in [PanelId::Projects, PanelId::Logs, PanelId::Snippets] {
            assert_eq!(id.next().prev(), id);
        }
        assert_eq!(PanelId::Snippets.next(), PanelId::Projects);
        assert_eq!(PanelId::Projects.prev(), PanelId::Snippets);
    }
}
