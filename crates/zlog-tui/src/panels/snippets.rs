//! Integration snippets, one tab per middleware framework.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Tabs};

use zlog_core::{ResolvedSnippets, SnippetKind};

use crate::action::Action;
use crate::component::Component;
use crate::panels::{panel_block, render_placeholder};
use crate::theme;

pub struct SnippetsPanel {
    focused: bool,
    snippets: Option<ResolvedSnippets>,
    tab: SnippetKind,
    scroll: u16,
}

impl SnippetsPanel {
    pub fn new() -> Self {
        Self {
            focused: false,
            snippets: None,
            tab: SnippetKind::Express,
            scroll: 0,
        }
    }

    pub fn loaded(&self) -> Option<&ResolvedSnippets> {
        self.snippets.as_ref()
    }

    fn switch_tab(&mut self) {
        self.tab = match self.tab {
            SnippetKind::Express => SnippetKind::Hono,
            SnippetKind::Hono => SnippetKind::Express,
        };
        self.scroll = 0;
    }

    fn line_count(&self) -> u16 {
        self.snippets.as_ref().map_or(0, |s| {
            u16::try_from(s.get(self.tab).lines().count()).unwrap_or(u16::MAX)
        })
    }
}

impl Component for SnippetsPanel {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('h' | 'l') | KeyCode::Left | KeyCode::Right => self.switch_tab(),
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll = (self.scroll + 1).min(self.line_count().saturating_sub(1));
            }
            KeyCode::Char('k') | KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Char('g') | KeyCode::Home => self.scroll = 0,
            KeyCode::Char('y') if self.snippets.is_some() => {
                return Ok(Some(Action::CopySnippet(self.tab)));
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::SnippetsLoaded(snippets) = action {
            self.snippets = Some(snippets.clone());
            self.scroll = 0;
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = panel_block(" Integrations ", self.focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Length(1), // tabs
            Constraint::Min(1),    // code
        ])
        .split(inner);

        let titles: Vec<Line> = SnippetKind::ALL
            .iter()
            .map(|kind| Line::from(kind.label()))
            .collect();
        let selected = SnippetKind::ALL
            .iter()
            .position(|kind| *kind == self.tab)
            .unwrap_or(0);
        let tabs = Tabs::new(titles)
            .select(selected)
            .style(theme::key_hint())
            .highlight_style(
                Style::default()
                    .fg(theme::ELECTRIC_PURPLE)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            );
        frame.render_widget(tabs, layout[0]);

        let Some(snippets) = &self.snippets else {
            render_placeholder(frame, layout[1], "Loading snippets…");
            return;
        };

        let code: Vec<Line> = snippets
            .get(self.tab)
            .lines()
            .map(|line| {
                Line::from(Span::styled(
                    line.to_owned(),
                    Style::default().fg(theme::DIM_WHITE),
                ))
            })
            .collect();
        frame.render_widget(Paragraph::new(code).scroll((self.scroll, 0)), layout[1]);
    }

    fn focused(&self) -> bool {
        self.focused
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "snippets"
    }
}
