//! Stats cards: total, last 24h, and server errors for the selected project.

use color_eyre::eyre::Result;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use throbber_widgets_tui::{Throbber, ThrobberState};

use zlog_core::{PollPhase, StatCounters, StatsState};

use crate::action::Action;
use crate::component::Component;
use crate::panels::{panel_block, render_banner, render_placeholder};
use crate::theme;
use crate::widgets::format::fmt_count;

pub struct StatsPanel {
    state: StatsState,
    throbber_state: ThrobberState,
}

impl StatsPanel {
    pub fn new() -> Self {
        Self {
            state: StatsState::default(),
            throbber_state: ThrobberState::default(),
        }
    }

    fn counters(&self) -> StatCounters {
        StatCounters::from_snapshot(self.state.data.as_deref())
    }

    fn render_card(frame: &mut Frame, area: Rect, label: &str, value: u64, accent: Color) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::BORDER_GRAY));
        let text = vec![
            Line::from(Span::styled(label.to_owned(), theme::key_hint())),
            Line::from(Span::styled(
                fmt_count(value),
                Style::default().fg(accent).add_modifier(Modifier::BOLD),
            )),
        ];
        frame.render_widget(
            Paragraph::new(text).alignment(Alignment::Center).block(block),
            area,
        );
    }
}

impl Component for StatsPanel {
    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::StatsUpdated(state) => self.state = state.clone(),
            Action::Tick => {
                if self.state.is_loading() {
                    self.throbber_state.calc_next();
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = panel_block(" Stats ", false);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.state.phase == PollPhase::Idle && self.state.data.is_none() {
            render_placeholder(frame, inner, "Select a project to view stats");
            return;
        }

        let layout = Layout::vertical([
            Constraint::Length(1), // banner / throbber
            Constraint::Min(3),    // cards
        ])
        .split(inner);

        if let Some(err) = &self.state.error {
            render_banner(frame, layout[0], &err.banner("stats"));
        } else if self.state.is_loading() {
            let label = if self.state.data.is_some() {
                " Refreshing…"
            } else {
                " Loading stats…"
            };
            let throbber = Throbber::default()
                .label(label)
                .style(Style::default().fg(theme::BORDER_GRAY))
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(
                throbber,
                layout[0],
                &mut self.throbber_state.clone(),
            );
        }

        let counters = self.counters();
        let cards = Layout::horizontal([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(layout[1]);

        Self::render_card(frame, cards[0], "Total", counters.total, theme::NEON_CYAN);
        Self::render_card(frame, cards[1], "24h", counters.last_24h, theme::ELECTRIC_PURPLE);
        let errors_color = if counters.errors > 0 {
            theme::ERROR_RED
        } else {
            theme::SUCCESS_GREEN
        };
        Self::render_card(frame, cards[2], "Errors", counters.errors, errors_color);
    }

    fn id(&self) -> &str {
        "stats"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use zlog_core::StatsSnapshot;

    use super::*;

    #[test]
    fn missing_snapshot_reads_as_zero() {
        let panel = StatsPanel::new();
        assert_eq!(panel.counters(), StatCounters::default());
    }

    #[test]
    fn counters_come_from_latest_snapshot() {
        let mut panel = StatsPanel::new();
        let snapshot = StatsSnapshot {
            total: 120,
            last_24h: 30,
            by_status: [("2xx".to_owned(), 110), ("5xx".to_owned(), 10)]
                .into_iter()
                .collect(),
        };
        let mut state = StatsState::default();
        assert!(state.apply(state.epoch, Ok(snapshot)));
        panel.update(&Action::StatsUpdated(state)).unwrap();

        assert_eq!(
            panel.counters(),
            StatCounters {
                total: 120,
                last_24h: 30,
                errors: 10,
            }
        );
    }
}
