// ── Stats cards ──

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use zlog_api::{ProjectId, StatsSnapshot};

use crate::backend::Backend;
use crate::error::FetchError;
use crate::poll::{Fetch, PollState, PollingFetcher};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsQuery {
    pub project_id: ProjectId,
}

pub type StatsState = PollState<StatsSnapshot>;

/// The three counters shown on the dashboard. Missing data reads as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatCounters {
    pub total: u64,
    pub last_24h: u64,
    pub errors: u64,
}

impl StatCounters {
    pub fn from_snapshot(snapshot: Option<&StatsSnapshot>) -> Self {
        snapshot.map_or_else(Self::default, |s| Self {
            total: s.total,
            last_24h: s.last_24h,
            errors: s.errors(),
        })
    }
}

pub struct StatsFetch<B> {
    backend: Arc<B>,
}

impl<B: Backend> Fetch for StatsFetch<B> {
    type Descriptor = StatsQuery;
    type Output = StatsSnapshot;

    async fn fetch(&self, q: &StatsQuery) -> Result<StatsSnapshot, FetchError> {
        self.backend.fetch_stats(&q.project_id).await
    }
}

/// Controller for the stats cards.
pub struct StatsView<B: Backend> {
    fetcher: PollingFetcher<StatsFetch<B>>,
    project: Option<ProjectId>,
}

impl<B: Backend> StatsView<B> {
    pub fn new(backend: Arc<B>, interval: Duration) -> Self {
        Self {
            fetcher: PollingFetcher::new(Arc::new(StatsFetch { backend }), interval),
            project: None,
        }
    }

    pub fn set_project(&mut self, project: Option<ProjectId>) {
        self.project = project;
        self.resubscribe();
    }

    pub fn set_interval(&self, interval: Duration) {
        self.fetcher.set_interval(interval);
    }

    pub fn project(&self) -> Option<&ProjectId> {
        self.project.as_ref()
    }

    pub fn state(&self) -> StatsState {
        self.fetcher.snapshot()
    }

    pub fn counters(&self) -> StatCounters {
        StatCounters::from_snapshot(self.fetcher.snapshot().data.as_deref())
    }

    pub fn subscribe(&self) -> watch::Receiver<StatsState> {
        self.fetcher.subscribe()
    }

    pub fn pause(&mut self) {
        self.fetcher.stop();
    }

    pub fn resume(&mut self) {
        self.resubscribe();
    }

    pub fn is_polling(&self) -> bool {
        self.fetcher.is_running()
    }

    fn resubscribe(&mut self) {
        match &self.project {
            Some(project_id) => self.fetcher.start(StatsQuery {
                project_id: project_id.clone(),
            }),
            None => self.fetcher.idle(),
        }
    }
}
