//! All possible UI actions. Actions are the sole mechanism for state mutation.

use zlog_core::{DirectoryState, LogsState, ProjectId, ResolvedSnippets, SnippetKind, StatsState};

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A toast shown in the status bar until it expires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    FocusNext,
    FocusPrev,

    // ── Data Events (from zlog-core) ──────────────────────────────
    ProjectsUpdated(DirectoryState),
    LogsUpdated(LogsState),
    StatsUpdated(StatsState),
    SnippetsLoaded(ResolvedSnippets),
    HealthChecked(bool),

    // ── Projects ──────────────────────────────────────────────────
    SelectProject(ProjectId),
    RefreshProjects,
    OpenCreateProject,
    CreateProject(String),
    ClosePrompt,
    CopyApiKey,

    // ── Filter ────────────────────────────────────────────────────
    OpenFilter,
    CloseFilter,
    FilterEdited(String),
    FilterSubmit,
    FilterCommitted(String),
    /// Reset the filter to empty without going through the debouncer.
    ClearFilter,

    // ── Snippets ──────────────────────────────────────────────────
    CopySnippet(SnippetKind),

    // ── Polling ───────────────────────────────────────────────────
    TogglePause,

    // ── Overlays ──────────────────────────────────────────────────
    ToggleHelp,
    DismissBanner,
    Notify(Notification),
}
