//! Data-synchronization engine between `zlog-api` and the terminal dashboard.
//!
//! Keeps a selected project's logs, filter text, and aggregate stats
//! consistent under continuous polling, filter edits, and project switches:
//!
//! - **[`PollingFetcher`]** runs one background task per subscription and
//!   publishes a [`PollState`] through a `tokio::sync::watch` channel. Each
//!   (re)start opens a new epoch; responses tagged with any other epoch are
//!   rejected, so a slow reply for a previous project never lands.
//!
//! - **[`LogView`]** / **[`StatsView`]** are fetchers keyed by
//!   `(project, filter, limit)` and `(project)` respectively.
//!
//! - **[`Debouncer`]** turns keystrokes into committed filter text.
//!
//! - **[`ProjectDirectory`]** lists and creates projects and owns the
//!   selection that drives both views.
//!
//! - **[`Dashboard`]** composes all of the above from a [`DashboardConfig`].

pub mod backend;
pub mod config;
pub mod dashboard;
pub mod debounce;
pub mod error;
pub mod logs;
pub mod poll;
pub mod projects;
pub mod snippets;
pub mod stats;

#[cfg(test)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::Backend;
pub use config::DashboardConfig;
pub use dashboard::Dashboard;
pub use debounce::Debouncer;
pub use error::{CoreError, ErrorKind, FetchError};
pub use logs::{LogView, LogsQuery, LogsState};
pub use poll::{Fetch, MIN_POLL_INTERVAL, PollPhase, PollState, PollingFetcher};
pub use projects::{DirectoryState, ProjectDirectory, default_project_name};
pub use snippets::{ResolvedSnippets, SnippetKind, load_snippets};
pub use stats::{StatCounters, StatsQuery, StatsState, StatsView};

// Wire models, re-exported so consumers need not depend on `zlog-api`.
pub use zlog_api::{LogEntry, Project, ProjectId, RecordId, Snippets, StatsSnapshot, mask_secret};
