//! Application core — event loop, focus management, action dispatch.

use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use secrecy::ExposeSecret;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tui_input::{Input, InputRequest};

use zlog_core::{CoreError, Dashboard, Debouncer, SnippetKind, load_snippets};

use crate::action::{Action, Notification, NotificationLevel};
use crate::clipboard::{Clipboard, SystemClipboard};
use crate::component::Component;
use crate::data_bridge::{Subscriptions, spawn_data_bridge};
use crate::event::{Event, EventReader};
use crate::panels::PanelId;
use crate::panels::logs::LogsPanel;
use crate::panels::projects::ProjectsPanel;
use crate::panels::snippets::SnippetsPanel;
use crate::panels::stats::StatsPanel;
use crate::theme;
use crate::tui::Tui;

/// How long a toast stays in the status area.
const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Top-level application state and event loop.
pub struct App {
    dashboard: Dashboard,
    /// Panel receiving navigation keys.
    focus: PanelId,
    projects: ProjectsPanel,
    logs: LogsPanel,
    stats: StatsPanel,
    snippets: SnippetsPanel,
    /// Filter keystrokes waiting to become a committed query.
    filter: Debouncer,
    /// New-project name prompt, when open.
    prompt: Option<Input>,
    help_visible: bool,
    /// Backend reachability from the startup probe; `None` until it answers.
    health: Option<bool>,
    notification: Option<(Notification, Instant)>,
    clipboard: Box<dyn Clipboard>,
    running: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    /// Cancels the data bridge and one-shot background reads.
    data_cancel: CancellationToken,
}

impl App {
    pub fn new(dashboard: Dashboard) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let config = dashboard.config();
        let filter = Debouncer::new(config.debounce);
        let logs = LogsPanel::new(config.poll_interval);

        let mut projects = ProjectsPanel::new();
        projects.set_focused(true);

        Self {
            dashboard,
            focus: PanelId::Projects,
            projects,
            logs,
            stats: StatsPanel::new(),
            snippets: SnippetsPanel::new(),
            filter,
            prompt: None,
            help_visible: false,
            health: None,
            notification: None,
            clipboard: Box::new(SystemClipboard::new()),
            running: true,
            action_tx,
            action_rx,
            data_cancel: CancellationToken::new(),
        }
    }

    #[cfg(test)]
    fn with_clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    /// Run the main event loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        self.spawn_background();

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            // 1. Wait for the next terminal event or a filter commit
            tokio::select! {
                event = events.next() => {
                    let Some(event) = event else {
                        break;
                    };
                    let action = match event {
                        Event::Key(key) => self.handle_key_event(key)?,
                        Event::Resize(w, h) => Some(Action::Resize(w, h)),
                        Event::Tick => Some(Action::Tick),
                        Event::Render => Some(Action::Render),
                    };
                    if let Some(action) = action {
                        self.action_tx.send(action)?;
                    }
                }
                Some(query) = self.filter.wait_commit(), if self.filter.is_pending() => {
                    self.action_tx.send(Action::FilterCommitted(query))?;
                }
            }

            // 2. Drain and process all queued actions
            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.filter.cancel();
        self.data_cancel.cancel();
        events.stop();
        self.dashboard.shutdown();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Data bridge, initial project list, health probe, and snippets.
    fn spawn_background(&self) {
        let subs = Subscriptions {
            directory: self.dashboard.directory().subscribe(),
            logs: self.dashboard.logs().subscribe(),
            stats: self.dashboard.stats().subscribe(),
        };
        tokio::spawn(spawn_data_bridge(
            subs,
            self.action_tx.clone(),
            self.data_cancel.clone(),
        ));

        self.spawn_refresh();

        let backend = Arc::clone(self.dashboard.backend());
        let base_url = self.dashboard.config().base_url.clone();
        let tx = self.action_tx.clone();
        let cancel = self.data_cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                () = async {
                    let healthy = zlog_core::Backend::ping(backend.as_ref()).await.is_ok();
                    let _ = tx.send(Action::HealthChecked(healthy));
                    let snippets = load_snippets(backend.as_ref(), &base_url).await;
                    let _ = tx.send(Action::SnippetsLoaded(snippets));
                } => {}
            }
        });
    }

    fn spawn_refresh(&self) {
        let directory = self.dashboard.directory().clone();
        tokio::spawn(async move {
            match directory.refresh().await {
                Ok(()) | Err(CoreError::Superseded) => {}
                // Already surfaced as the projects banner
                Err(e) => debug!(error = %e, "project refresh failed"),
            }
        });
    }

    // ── Input ────────────────────────────────────────────────────────

    /// Map a key event to an action. Modal input captures keys first,
    /// then global bindings, then the focused panel.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if let Some(prompt) = &mut self.prompt {
            return Ok(match key.code {
                KeyCode::Esc => Some(Action::ClosePrompt),
                KeyCode::Enter => Some(Action::CreateProject(prompt.value().to_owned())),
                _ => {
                    if let Some(request) = input_request(key) {
                        prompt.handle(request);
                    }
                    None
                }
            });
        }

        if self.logs.is_editing() {
            return self.logs.handle_key_event(key);
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::NONE, KeyCode::Tab) => return Ok(Some(Action::FocusNext)),
            (KeyModifiers::SHIFT, KeyCode::BackTab) => return Ok(Some(Action::FocusPrev)),
            (KeyModifiers::NONE, KeyCode::Char('/')) => return Ok(Some(Action::OpenFilter)),
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => return Ok(Some(Action::ClearFilter)),
            (KeyModifiers::NONE, KeyCode::Char('n')) => {
                return Ok(Some(Action::OpenCreateProject));
            }
            (KeyModifiers::NONE, KeyCode::Char('r')) => {
                return Ok(Some(Action::RefreshProjects));
            }
            (KeyModifiers::NONE, KeyCode::Char('x')) => return Ok(Some(Action::DismissBanner)),
            (KeyModifiers::NONE, KeyCode::Char('p')) => return Ok(Some(Action::TogglePause)),
            (KeyModifiers::NONE, KeyCode::Char('c')) => return Ok(Some(Action::CopyApiKey)),
            _ => {}
        }

        self.focused_panel_mut().handle_key_event(key)
    }

    fn focused_panel_mut(&mut self) -> &mut dyn Component {
        match self.focus {
            PanelId::Projects => &mut self.projects,
            PanelId::Logs => &mut self.logs,
            PanelId::Snippets => &mut self.snippets,
        }
    }

    fn set_focus(&mut self, target: PanelId) {
        if target == self.focus {
            return;
        }
        debug!(from = ?self.focus, to = ?target, "focus change");
        self.focused_panel_mut().set_focused(false);
        self.focus = target;
        self.focused_panel_mut().set_focused(true);
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Process a single action: update app state, then let every panel see it.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Tick => {
                let expired = self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() >= NOTIFICATION_TTL);
                if expired {
                    self.notification = None;
                }
            }

            Action::FocusNext => self.set_focus(self.focus.next()),
            Action::FocusPrev => self.set_focus(self.focus.prev()),

            Action::ProjectsUpdated(_) => self.dashboard.sync_selection(),

            Action::HealthChecked(healthy) => {
                self.health = Some(*healthy);
                if !healthy {
                    warn!(url = %self.dashboard.config().base_url, "backend unreachable");
                }
            }

            Action::SelectProject(id) => {
                if let Err(e) = self.dashboard.select_project(Some(id.clone())) {
                    self.notify(Notification::error(e.to_string()));
                }
            }

            Action::RefreshProjects => self.spawn_refresh(),

            Action::OpenCreateProject => self.prompt = Some(Input::default()),
            Action::ClosePrompt => self.prompt = None,
            Action::CreateProject(name) => {
                self.prompt = None;
                self.create_project(name.clone());
            }

            Action::CopyApiKey => self.copy_api_key(),
            Action::CopySnippet(kind) => self.copy_snippet(*kind),

            Action::OpenFilter => self.set_focus(PanelId::Logs),
            Action::FilterEdited(text) => self.filter.edit(text.clone()),
            // Leaving the input commits whatever is typed
            Action::CloseFilter | Action::FilterSubmit => {
                if let Some(query) = self.filter.flush() {
                    self.action_tx.send(Action::FilterCommitted(query))?;
                }
            }
            Action::FilterCommitted(query) => {
                debug!(query = %query, "filter committed");
                self.dashboard.set_filter(query.clone());
            }
            Action::ClearFilter => {
                self.filter.sync("");
                self.dashboard.set_filter("");
            }

            Action::TogglePause => {
                if self.dashboard.directory().selected().is_none() {
                    self.notify(Notification::info("Select a project first"));
                } else if self.dashboard.is_paused() {
                    self.dashboard.resume();
                    self.notify(Notification::info("Auto refresh resumed"));
                } else {
                    self.dashboard.pause();
                    self.notify(Notification::info("Auto refresh paused"));
                }
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,
            Action::DismissBanner => self.dashboard.directory().dismiss_error(),
            Action::Notify(notification) => self.notify(notification.clone()),

            _ => {}
        }

        // Selecting or filtering restarts a paused view
        self.logs.set_paused(self.dashboard.is_paused());

        let panels: [&mut dyn Component; 4] = [
            &mut self.projects,
            &mut self.logs,
            &mut self.stats,
            &mut self.snippets,
        ];
        for panel in panels {
            if let Some(follow_up) = panel.update(action)? {
                debug!(panel = panel.id(), ?follow_up, "follow-up action");
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    fn notify(&mut self, notification: Notification) {
        self.notification = Some((notification, Instant::now()));
    }

    fn create_project(&self, name: String) {
        let directory = self.dashboard.directory().clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let notification = match directory.create(&name).await {
                Ok(project) => {
                    Notification::success(format!("Created {}", project.display_name()))
                }
                Err(e) => {
                    warn!(error = %e, "project create failed");
                    Notification::error("Failed to create project")
                }
            };
            let _ = tx.send(Action::Notify(notification));
        });
    }

    fn copy_api_key(&mut self) {
        let state = self.dashboard.directory().state();
        let Some(project) = state.selected_project() else {
            self.notify(Notification::info("Select a project first"));
            return;
        };
        let Some(key) = project.api_key() else {
            self.notify(Notification::error("This project has no API key"));
            return;
        };
        let result = self.clipboard.set(key.expose_secret());
        let notification = match result {
            Ok(()) => {
                Notification::success(format!("Copied API key for {}", project.display_name()))
            }
            Err(e) => {
                warn!(error = %e, "clipboard write failed");
                Notification::error("Clipboard unavailable")
            }
        };
        self.notify(notification);
    }

    fn copy_snippet(&mut self, kind: SnippetKind) {
        let base_url = self.dashboard.config().base_url.clone();
        let text = match self.snippets_text(kind) {
            Some(text) => text,
            None => zlog_core::ResolvedSnippets::fallback(&base_url)
                .get(kind)
                .to_owned(),
        };
        let notification = match self.clipboard.set(&text) {
            Ok(()) => Notification::success(format!("Copied {} snippet", kind.label())),
            Err(e) => {
                warn!(error = %e, "clipboard write failed");
                Notification::error("Clipboard unavailable")
            }
        };
        self.notify(notification);
    }

    fn snippets_text(&self, kind: SnippetKind) -> Option<String> {
        self.snippets.loaded().map(|s| s.get(kind).to_owned())
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // Layout: [header] [body] [status bar]
        let layout = Layout::vertical([
            Constraint::Length(1), // Header
            Constraint::Min(1),    // Panels
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        self.render_header(frame, layout[0]);

        let columns = Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(layout[1]);
        let left = Layout::vertical([
            Constraint::Percentage(45), // Projects
            Constraint::Length(6),      // Stats
            Constraint::Min(6),         // Integrations
        ])
        .split(columns[0]);

        self.projects.render(frame, left[0]);
        self.stats.render(frame, left[1]);
        self.snippets.render(frame, left[2]);
        self.logs.render(frame, columns[1]);

        self.render_status_bar(frame, layout[2]);

        // Overlays on top (last = topmost)
        if let Some((ref notification, _)) = self.notification {
            Self::render_notification(frame, area, notification);
        }
        if let Some(ref prompt) = self.prompt {
            Self::render_prompt(frame, area, prompt);
        }
        if self.help_visible {
            Self::render_help_overlay(frame, area);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let health = match self.health {
            Some(true) => Span::styled("● reachable", Style::default().fg(theme::SUCCESS_GREEN)),
            Some(false) => Span::styled("○ unreachable", Style::default().fg(theme::ERROR_RED)),
            None => Span::styled("◐ checking", Style::default().fg(theme::ELECTRIC_YELLOW)),
        };
        let line = Line::from(vec![
            Span::styled(
                " ZLog ",
                Style::default()
                    .fg(theme::BG_DARK)
                    .bg(theme::ELECTRIC_PURPLE)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" {} ", self.dashboard.config().base_url),
                theme::key_hint(),
            ),
            health,
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let hints: &[(&str, &str)] = if self.prompt.is_some() {
            &[("Enter", "create"), ("Esc", "cancel")]
        } else if self.logs.is_editing() {
            &[("Enter", "apply"), ("Esc", "done"), ("Ctrl+u", "clear")]
        } else {
            match self.focus {
                PanelId::Projects => &[
                    ("Enter", "select"),
                    ("n", "new"),
                    ("c", "copy key"),
                    ("r", "refresh"),
                    ("/", "filter"),
                    ("?", "help"),
                    ("q", "quit"),
                ],
                PanelId::Logs => &[
                    ("j/k", "scroll"),
                    ("/", "filter"),
                    ("Ctrl+u", "clear filter"),
                    ("p", "pause"),
                    ("?", "help"),
                    ("q", "quit"),
                ],
                PanelId::Snippets => &[
                    ("h/l", "tab"),
                    ("y", "copy"),
                    ("j/k", "scroll"),
                    ("?", "help"),
                    ("q", "quit"),
                ],
            }
        };

        let mut spans = vec![Span::raw(" ")];
        for (key, label) in hints {
            spans.push(Span::styled(format!("{key} "), theme::key_hint_key()));
            spans.push(Span::styled(format!("{label}  "), theme::key_hint()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    /// Centered single-line prompt for a new project name.
    fn render_prompt(frame: &mut Frame, area: Rect, prompt: &Input) {
        let width = 56u16.min(area.width.saturating_sub(4));
        let height = 5u16;
        let x = (area.width.saturating_sub(width)) / 2;
        let y = (area.height.saturating_sub(height)) / 2;
        let dialog_area = Rect::new(area.x + x, area.y + y, width, height);

        frame.render_widget(Clear, dialog_area);
        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            dialog_area,
        );

        let block = Block::default()
            .title(" New project ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let rows = Layout::vertical([
            Constraint::Length(1), // name
            Constraint::Length(1),
            Constraint::Length(1), // hints
        ])
        .split(inner);

        let field_width = usize::from(rows[0].width.saturating_sub(2));
        let scroll = prompt.visual_scroll(field_width);
        let visible: String = prompt.value().chars().skip(scroll).collect();
        let field = if prompt.value().is_empty() {
            Span::styled("Leave empty for a timestamped name", theme::empty_state())
        } else {
            Span::styled(visible, Style::default().fg(theme::NEON_CYAN))
        };
        frame.render_widget(Paragraph::new(Line::from(vec![Span::raw("  "), field])), rows[0]);

        let offset =
            u16::try_from(prompt.visual_cursor().saturating_sub(scroll)).unwrap_or(u16::MAX);
        frame.set_cursor_position(Position::new(
            (rows[0].x + 2).saturating_add(offset).min(rows[0].right().saturating_sub(1)),
            rows[0].y,
        ));

        let hints = Line::from(vec![
            Span::styled("  Enter ", theme::key_hint_key()),
            Span::styled("create    ", theme::key_hint()),
            Span::styled("Esc ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), rows[2]);
    }

    /// Render the help overlay centered on screen.
    fn render_help_overlay(frame: &mut Frame, area: Rect) {
        let help_width = 58u16.min(area.width.saturating_sub(4));
        let help_height = 24u16.min(area.height.saturating_sub(4));
        let x = (area.width.saturating_sub(help_width)) / 2;
        let y = (area.height.saturating_sub(help_height)) / 2;
        let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

        frame.render_widget(Clear, help_area);
        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            help_area,
        );

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let section = |title: &'static str| {
            Line::from(Span::styled(
                format!("  {title}"),
                Style::default().fg(theme::NEON_CYAN),
            ))
        };
        let entry = |key: &'static str, label: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {key:<12}"), theme::key_hint_key()),
                Span::styled(label, theme::key_hint()),
            ])
        };

        let help_text = vec![
            Line::from(""),
            section("Navigation"),
            entry("Tab/S-Tab", "Cycle panel focus"),
            entry("j/k ↑/↓", "Move up/down"),
            entry("g/G", "Top / bottom"),
            entry("h/l ←/→", "Switch snippet tab"),
            Line::from(""),
            section("Projects"),
            entry("Enter", "Select project"),
            entry("n", "New project"),
            entry("c", "Copy API key"),
            entry("r", "Refresh list"),
            entry("x", "Dismiss error banner"),
            Line::from(""),
            section("Logs"),
            entry("/", "Edit filter (Esc to leave)"),
            entry("Ctrl+u", "Clear filter"),
            entry("p", "Pause / resume auto refresh"),
            entry("y", "Copy focused snippet"),
            Line::from(""),
            entry("q Ctrl+C", "Quit"),
            Line::from(Span::styled(
                "                      Esc or ? to close",
                theme::key_hint(),
            )),
        ];
        frame.render_widget(Paragraph::new(help_text), inner);
    }

    /// Render a notification toast in the bottom-right corner.
    fn render_notification(frame: &mut Frame, area: Rect, notification: &Notification) {
        let msg_len = u16::try_from(notification.message.chars().count()).unwrap_or(u16::MAX);
        let width = msg_len.saturating_add(6).clamp(20, 60).min(area.width);
        let height = 3u16;
        let x = area.width.saturating_sub(width + 1);
        let y = area.height.saturating_sub(height + 1); // above status bar
        let toast_area = Rect::new(area.x + x, area.y + y, width, height.min(area.height));

        let (border_color, icon) = match notification.level {
            NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
            NotificationLevel::Error => (theme::ERROR_RED, "✗"),
            NotificationLevel::Info => (theme::NEON_CYAN, "·"),
        };

        frame.render_widget(Clear, toast_area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color))
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(toast_area);
        frame.render_widget(block, toast_area);

        let line = Line::from(vec![
            Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
            Span::styled(
                notification.message.clone(),
                Style::default().fg(theme::DIM_WHITE),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), inner);
    }
}

/// Line-editing keys shared by the name prompt.
fn input_request(key: KeyEvent) -> Option<InputRequest> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    Some(match key.code {
        KeyCode::Char('u') if ctrl => InputRequest::DeleteLine,
        KeyCode::Char('w') if ctrl => InputRequest::DeletePrevWord,
        KeyCode::Char(c) if !ctrl => InputRequest::InsertChar(c),
        KeyCode::Backspace => InputRequest::DeletePrevChar,
        KeyCode::Delete => InputRequest::DeleteNextChar,
        KeyCode::Left => InputRequest::GoToPrevChar,
        KeyCode::Right => InputRequest::GoToNextChar,
        KeyCode::Home => InputRequest::GoToStart,
        KeyCode::End => InputRequest::GoToEnd,
        _ => return None,
    })
}
