//! Project directory table with the active selection marked.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Row, Table, TableState};

use zlog_core::{DirectoryState, ProjectId};

use crate::action::Action;
use crate::component::Component;
use crate::panels::{panel_block, render_banner, render_placeholder};
use crate::theme;
use crate::widgets::format::{fmt_created, truncate};

const EMPTY_TEXT: &str = "No projects yet. Create one to get started.";

pub struct ProjectsPanel {
    focused: bool,
    state: DirectoryState,
    table_state: TableState,
}

impl ProjectsPanel {
    pub fn new() -> Self {
        Self {
            focused: true,
            state: DirectoryState::default(),
            table_state: TableState::default(),
        }
    }

    fn cursor(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.state.projects.len();
        if len == 0 {
            return;
        }
        let next = self.cursor().saturating_add_signed(delta).min(len - 1);
        self.table_state.select(Some(next));
    }

    fn project_at_cursor(&self) -> Option<&ProjectId> {
        self.state.projects.get(self.cursor()).map(|p| &p.id)
    }

    /// Take a new directory snapshot. The cursor jumps to the selection
    /// when the selection changed, and stays in range otherwise.
    fn apply(&mut self, state: DirectoryState) {
        let selection_moved = state.selected != self.state.selected;
        self.state = state;

        let len = self.state.projects.len();
        if len == 0 {
            self.table_state.select(None);
            return;
        }
        let target = if selection_moved {
            self.state
                .selected
                .as_ref()
                .and_then(|id| self.state.position_of(id))
        } else {
            None
        };
        let cursor = target.unwrap_or_else(|| self.cursor().min(len - 1));
        self.table_state.select(Some(cursor));
    }
}

impl Component for ProjectsPanel {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1),
            KeyCode::Char('g') | KeyCode::Home => {
                if !self.state.projects.is_empty() {
                    self.table_state.select(Some(0));
                }
            }
            KeyCode::Char('G') | KeyCode::End => {
                let len = self.state.projects.len();
                if len > 0 {
                    self.table_state.select(Some(len - 1));
                }
            }
            KeyCode::Enter => {
                return Ok(self.project_at_cursor().cloned().map(Action::SelectProject));
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::ProjectsUpdated(state) = action {
            self.apply(state.clone());
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let mut title = vec![Span::styled(
            format!(" Projects ({}) ", self.state.projects.len()),
            theme::title_style(),
        )];
        if self.state.creating {
            title.push(Span::styled("creating… ", theme::key_hint()));
        } else if self.state.loading && self.state.loaded {
            title.push(Span::styled("refreshing… ", theme::key_hint()));
        }

        let block = panel_block(Line::from(title), self.focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Length(u16::from(self.state.error.is_some())),
            Constraint::Min(1),
        ])
        .split(inner);

        if let Some(error) = &self.state.error {
            render_banner(frame, layout[0], error);
        }

        if !self.state.loaded && self.state.projects.is_empty() {
            let text = if self.state.loading {
                "Loading projects…"
            } else {
                "Projects unavailable"
            };
            render_placeholder(frame, layout[1], text);
            return;
        }
        if self.state.is_empty() {
            render_placeholder(frame, layout[1], EMPTY_TEXT);
            return;
        }

        let header = Row::new(vec![
            Cell::from(" Name").style(theme::table_header()),
            Cell::from("Created").style(theme::table_header()),
            Cell::from("API key").style(theme::table_header()),
        ]);

        let name_width = usize::from(inner.width.saturating_sub(28)).max(8);
        let rows: Vec<Row> = self
            .state
            .projects
            .iter()
            .map(|project| {
                let active = self.state.selected.as_ref() == Some(&project.id);
                let marker = if active { "●" } else { " " };
                let name_style = if active {
                    Style::default()
                        .fg(theme::SUCCESS_GREEN)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme::NEON_CYAN)
                };
                Row::new(vec![
                    Cell::from(format!(
                        "{marker}{}",
                        truncate(project.display_name(), name_width)
                    ))
                    .style(name_style),
                    Cell::from(fmt_created(project.created_at)),
                    Cell::from(project.masked_api_key().unwrap_or_else(|| "─".into()))
                        .style(Style::default().fg(theme::CORAL)),
                ])
                .style(theme::table_row())
            })
            .collect();

        let widths = [
            Constraint::Min(10),
            Constraint::Length(11),
            Constraint::Length(11),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());

        let mut state = self.table_state;
        frame.render_stateful_widget(table, layout[1], &mut state);
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "projects"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use zlog_core::Project;

    use super::*;

    fn directory(ids: &[&str], selected: Option<&str>) -> DirectoryState {
        DirectoryState {
            projects: Arc::new(
                ids.iter()
                    .map(|id| Project::new(*id, format!("Project {id}"), None, None))
                    .collect(),
            ),
            selected: selected.map(ProjectId::from),
            loaded: true,
            ..DirectoryState::default()
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn cursor_follows_new_selection() {
        let mut panel = ProjectsPanel::new();
        panel
            .update(&Action::ProjectsUpdated(directory(&["a", "b", "c"], Some("c"))))
            .unwrap();
        assert_eq!(panel.cursor(), 2);

        // Navigating without selecting leaves the cursor where the user put it
        panel.handle_key_event(key(KeyCode::Up)).unwrap();
        panel
            .update(&Action::ProjectsUpdated(directory(&["a", "b", "c"], Some("c"))))
            .unwrap();
        assert_eq!(panel.cursor(), 1);
    }

    #[test]
    fn enter_selects_project_under_cursor() {
        let mut panel = ProjectsPanel::new();
        panel
            .update(&Action::ProjectsUpdated(directory(&["a", "b"], None)))
            .unwrap();
        panel.handle_key_event(key(KeyCode::Char('j'))).unwrap();

        let action = panel.handle_key_event(key(KeyCode::Enter)).unwrap();
        match action {
            Some(Action::SelectProject(id)) => assert_eq!(id, ProjectId::from("b")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn cursor_is_clamped_when_list_shrinks() {
        let mut panel = ProjectsPanel::new();
        panel
            .update(&Action::ProjectsUpdated(directory(&["a", "b", "c"], None)))
            .unwrap();
        panel.handle_key_event(key(KeyCode::Char('G'))).unwrap();
        assert_eq!(panel.cursor(), 2);

        panel
            .update(&Action::ProjectsUpdated(directory(&["a"], None)))
            .unwrap();
        assert_eq!(panel.cursor(), 0);

        panel
            .update(&Action::ProjectsUpdated(directory(&[], None)))
            .unwrap();
        assert_eq!(panel.table_state.selected(), None);
        assert!(panel.handle_key_event(key(KeyCode::Enter)).unwrap().is_none());
    }
}
