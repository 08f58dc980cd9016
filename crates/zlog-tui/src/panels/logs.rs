//! Live request table for the selected project, with a filter line.

use std::time::Duration;

use chrono::Local;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tui_input::{Input, InputRequest};

use zlog_core::{LogEntry, LogsState, PollPhase};

use crate::action::Action;
use crate::component::Component;
use crate::panels::{panel_block, render_banner, render_placeholder};
use crate::theme;
use crate::widgets::format::{fmt_latency, fmt_log_time, truncate};
use crate::widgets::status_badge::status_badge;

pub struct LogsPanel {
    focused: bool,
    state: LogsState,
    project_name: Option<String>,
    filter: Input,
    /// Filter line has keyboard capture.
    editing: bool,
    interval: Duration,
    paused: bool,
    table_state: TableState,
    throbber_state: ThrobberState,
}

impl LogsPanel {
    pub fn new(interval: Duration) -> Self {
        Self {
            focused: false,
            state: LogsState::default(),
            project_name: None,
            filter: Input::default(),
            editing: false,
            interval,
            paused: false,
            table_state: TableState::default(),
            throbber_state: ThrobberState::default(),
        }
    }

    /// Whether keystrokes go to the filter line.
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    #[cfg(test)]
    pub fn filter_text(&self) -> &str {
        self.filter.value()
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn rows(&self) -> &[LogEntry] {
        self.state.data.as_deref().map(Vec::as_slice).unwrap_or_default()
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let current = self.table_state.selected().unwrap_or(0);
        let next = current.saturating_add_signed(delta).min(len - 1);
        self.table_state.select(Some(next));
    }

    /// Take a new snapshot. A highlighted row stays highlighted as newer
    /// rows push it down; if it scrolled out of the page the cursor is
    /// clamped instead.
    fn apply(&mut self, state: LogsState) {
        let Some(cursor) = self.table_state.selected() else {
            self.state = state;
            return;
        };
        let key = self.rows().get(cursor).map(LogEntry::row_key);
        self.state = state;

        let rows = self.rows();
        let next = key
            .and_then(|key| rows.iter().position(|row| row.row_key() == key))
            .or_else(|| rows.len().checked_sub(1).map(|last| cursor.min(last)));
        self.table_state.select(next);
    }

    /// Route a key to the filter line. Every edit reports the new text.
    fn handle_filter_key(&mut self, key: KeyEvent) -> Option<Action> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let request = match key.code {
            KeyCode::Esc => return Some(Action::CloseFilter),
            KeyCode::Enter => return Some(Action::FilterSubmit),
            KeyCode::Char('u') if ctrl => InputRequest::DeleteLine,
            KeyCode::Char('w') if ctrl => InputRequest::DeletePrevWord,
            KeyCode::Char('a') if ctrl => InputRequest::GoToStart,
            KeyCode::Char('e') if ctrl => InputRequest::GoToEnd,
            KeyCode::Char(c) if !ctrl => InputRequest::InsertChar(c),
            KeyCode::Backspace => InputRequest::DeletePrevChar,
            KeyCode::Delete => InputRequest::DeleteNextChar,
            KeyCode::Left => InputRequest::GoToPrevChar,
            KeyCode::Right => InputRequest::GoToNextChar,
            KeyCode::Home => InputRequest::GoToStart,
            KeyCode::End => InputRequest::GoToEnd,
            _ => return None,
        };
        let before = self.filter.value().to_owned();
        self.filter.handle(request);
        (self.filter.value() != before)
            .then(|| Action::FilterEdited(self.filter.value().to_owned()))
    }

    fn title(&self) -> Line<'static> {
        let mut spans = vec![Span::styled(" Logs ", theme::title_style())];
        if let Some(name) = &self.project_name {
            spans.push(Span::styled(
                format!("· {} ", truncate(name, 32)),
                Style::default().fg(theme::ELECTRIC_PURPLE),
            ));
        }
        if self.project_name.is_some() {
            if self.paused {
                spans.push(Span::styled(
                    "⏸ Paused ",
                    Style::default().fg(theme::ELECTRIC_YELLOW),
                ));
            } else {
                spans.push(Span::styled(
                    format!("Auto refresh {} ", humantime::format_duration(self.interval)),
                    theme::key_hint(),
                ));
            }
        }
        Line::from(spans)
    }

    fn render_filter(&self, frame: &mut Frame, area: Rect) {
        let prompt = Span::styled(" / ", theme::key_hint_key());
        let prompt_width = 3;
        let width = usize::from(area.width.saturating_sub(prompt_width));
        let scroll = self.filter.visual_scroll(width);

        let line = if self.filter.value().is_empty() && !self.editing {
            Line::from(vec![
                prompt,
                Span::styled("filter logs", theme::empty_state()),
            ])
        } else {
            let visible: String = self.filter.value().chars().skip(scroll).collect();
            let style = if self.editing {
                Style::default().fg(theme::NEON_CYAN)
            } else {
                Style::default().fg(theme::DIM_WHITE)
            };
            Line::from(vec![prompt, Span::styled(visible, style)])
        };
        frame.render_widget(Paragraph::new(line), area);

        if self.editing {
            let offset = self.filter.visual_cursor().saturating_sub(scroll);
            let x = area.x + prompt_width + u16::try_from(offset).unwrap_or(u16::MAX);
            frame.set_cursor_position(Position::new(
                x.min(area.right().saturating_sub(1)),
                area.y,
            ));
        }
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let header = Row::new(vec![
            Cell::from("Time").style(theme::table_header()),
            Cell::from("Method").style(theme::table_header()),
            Cell::from("Path").style(theme::table_header()),
            Cell::from("Status").style(theme::table_header()),
            Cell::from("Latency").style(theme::table_header()),
            Cell::from("IP").style(theme::table_header()),
            Cell::from("Message").style(theme::table_header()),
        ]);

        let today = Local::now().date_naive();
        let rows: Vec<Row> = self
            .rows()
            .iter()
            .map(|entry| {
                Row::new(vec![
                    Cell::from(fmt_log_time(entry.time, today)),
                    Cell::from(entry.method.clone()).style(
                        Style::default()
                            .fg(theme::method_color(&entry.method))
                            .add_modifier(Modifier::BOLD),
                    ),
                    Cell::from(entry.path.clone()),
                    Cell::from(status_badge(entry.status)),
                    Cell::from(fmt_latency(entry.latency_ms)),
                    Cell::from(entry.ip.clone().unwrap_or_else(|| "─".into()))
                        .style(Style::default().fg(theme::CORAL)),
                    Cell::from(entry.message.clone().unwrap_or_default()),
                ])
                .style(theme::table_row())
            })
            .collect();

        let widths = [
            Constraint::Length(14),
            Constraint::Length(7),
            Constraint::Min(16),
            Constraint::Length(7),
            Constraint::Length(8),
            Constraint::Length(15),
            Constraint::Min(10),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());

        let mut state = self.table_state;
        frame.render_stateful_widget(table, area, &mut state);
    }
}

impl Component for LogsPanel {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.editing {
            return Ok(self.handle_filter_key(key));
        }
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1),
            KeyCode::PageDown => self.move_cursor(10),
            KeyCode::PageUp => self.move_cursor(-10),
            KeyCode::Char('g') | KeyCode::Home => {
                if !self.rows().is_empty() {
                    self.table_state.select(Some(0));
                }
            }
            KeyCode::Char('G') | KeyCode::End => {
                let len = self.rows().len();
                if len > 0 {
                    self.table_state.select(Some(len - 1));
                }
            }
            KeyCode::Esc => self.table_state.select(None),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::LogsUpdated(state) => self.apply(state.clone()),
            Action::ProjectsUpdated(directory) => {
                self.project_name = directory
                    .selected_project()
                    .map(|p| p.display_name().to_owned());
            }
            Action::OpenFilter => self.editing = true,
            Action::ClearFilter => self.filter = Input::default(),
            Action::CloseFilter | Action::FilterSubmit => self.editing = false,
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
        let block = panel_block(self.title(), self.focused || self.editing);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Length(1), // filter
            Constraint::Length(1), // banner / throbber
            Constraint::Min(1),    // table
        ])
        .split(inner);

        self.render_filter(frame, layout[0]);

        if let Some(err) = &self.state.error {
            render_banner(frame, layout[1], &err.banner("logs"));
        } else if self.state.is_loading() {
            let throbber = Throbber::default()
                .label(" Loading logs…")
                .style(Style::default().fg(theme::BORDER_GRAY))
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(
                throbber,
                layout[1],
                &mut self.throbber_state.clone(),
            );
        }

        match self.state.data.as_deref() {
            None if self.state.phase == PollPhase::Idle => {
                render_placeholder(frame, layout[2], "Select a project to view logs");
            }
            None if self.state.is_loading() => {}
            None => render_placeholder(frame, layout[2], "No data to display"),
            Some(rows) if rows.is_empty() => {
                render_placeholder(frame, layout[2], "No data to display");
            }
            Some(_) => self.render_table(frame, layout[2]),
        }
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "logs"
    }
}
