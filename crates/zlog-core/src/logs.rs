// ── Live log table ──
//
// Subscription over `/api/logs` keyed by (project, filter, limit). A new
// project or a committed filter restarts the subscription; the table keeps
// showing the previous rows until the first response of the new epoch.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use zlog_api::{LogEntry, ProjectId};

use crate::backend::Backend;
use crate::error::FetchError;
use crate::poll::{Fetch, PollState, PollingFetcher};

/// Field under which `/api/logs` may wrap its rows.
pub const LOGS_FIELD: &str = "logs";

/// What a log subscription asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogsQuery {
    pub project_id: ProjectId,
    /// Free-text filter; empty means unfiltered.
    pub query: String,
    pub limit: u32,
}

pub type LogsState = PollState<Vec<LogEntry>>;

/// `Fetch` adapter that normalizes both listing shapes into rows.
pub struct LogsFetch<B> {
    backend: Arc<B>,
}

impl<B: Backend> Fetch for LogsFetch<B> {
    type Descriptor = LogsQuery;
    type Output = Vec<LogEntry>;

    async fn fetch(&self, q: &LogsQuery) -> Result<Vec<LogEntry>, FetchError> {
        let query = Some(q.query.as_str()).filter(|s| !s.is_empty());
        let listing = self.backend.fetch_logs(&q.project_id, query, q.limit).await?;
        Ok(listing.into_items(LOGS_FIELD))
    }
}

/// Controller for the log table.
pub struct LogView<B: Backend> {
    fetcher: PollingFetcher<LogsFetch<B>>,
    project: Option<ProjectId>,
    query: String,
    limit: u32,
}

impl<B: Backend> LogView<B> {
    pub fn new(backend: Arc<B>, interval: Duration, limit: u32) -> Self {
        Self {
            fetcher: PollingFetcher::new(Arc::new(LogsFetch { backend }), interval),
            project: None,
            query: String::new(),
            limit,
        }
    }

    /// Switch project. `None` idles the table.
    pub fn set_project(&mut self, project: Option<ProjectId>) {
        self.project = project;
        self.resubscribe();
    }

    /// Apply a committed filter.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.resubscribe();
    }

    pub fn set_interval(&self, interval: Duration) {
        self.fetcher.set_interval(interval);
    }

    pub fn project(&self) -> Option<&ProjectId> {
        self.project.as_ref()
    }

    /// Effective polling period, after clamping.
    pub fn interval(&self) -> Duration {
        self.fetcher.interval()
    }

    pub fn state(&self) -> LogsState {
        self.fetcher.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<LogsState> {
        self.fetcher.subscribe()
    }

    /// Stop polling, keeping the rows on screen.
    pub fn pause(&mut self) {
        self.fetcher.stop();
    }

    /// Resume after `pause`.
    pub fn resume(&mut self) {
        self.resubscribe();
    }

    pub fn is_polling(&self) -> bool {
        self.fetcher.is_running()
    }

    fn resubscribe(&mut self) {
        match &self.project {
            Some(project_id) => self.fetcher.start(LogsQuery {
                project_id: project_id.clone(),
                query: self.query.clone(),
                limit: self.limit,
            }),
            None => self.fetcher.idle(),
        }
    }
}
