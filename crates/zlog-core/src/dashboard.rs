// ── Dashboard facade ──
//
// Composes the project directory with the log and stats views. The
// directory's selection is upstream of both views; `sync_selection`
// pushes it down after anything (local call or background create)
// changes it.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};
use zlog_api::{Project, ProjectId, TransportConfig, ZlogClient};

use crate::backend::Backend;
use crate::config::DashboardConfig;
use crate::error::CoreError;
use crate::logs::LogView;
use crate::projects::ProjectDirectory;
use crate::snippets::{ResolvedSnippets, load_snippets};
use crate::stats::StatsView;

pub struct Dashboard<B: Backend = ZlogClient> {
    config: DashboardConfig,
    backend: Arc<B>,
    directory: ProjectDirectory<B>,
    logs: LogView<B>,
    stats: StatsView<B>,
}

impl Dashboard<ZlogClient> {
    /// Build against a live backend described by `config`.
    pub fn connect(config: DashboardConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let client = ZlogClient::new(config.base_url.as_str(), &transport)?;
        info!(url = %config.base_url, "dashboard connected");
        Ok(Self::with_backend(config, Arc::new(client)))
    }
}

impl<B: Backend> Dashboard<B> {
    pub fn with_backend(mut config: DashboardConfig, backend: Arc<B>) -> Self {
        let logs = LogView::new(Arc::clone(&backend), config.poll_interval, config.log_limit);
        config.poll_interval = logs.interval();
        Self {
            directory: ProjectDirectory::new(Arc::clone(&backend)),
            stats: StatsView::new(Arc::clone(&backend), config.poll_interval),
            logs,
            backend,
            config,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn directory(&self) -> &ProjectDirectory<B> {
        &self.directory
    }

    pub fn logs(&self) -> &LogView<B> {
        &self.logs
    }

    pub fn stats(&self) -> &StatsView<B> {
        &self.stats
    }

    /// Shared backend handle, for one-shot reads spawned off the UI thread.
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Select a project (or none) and retarget both views.
    pub fn select_project(&mut self, id: Option<ProjectId>) -> Result<(), CoreError> {
        self.directory.select(id)?;
        self.sync_selection();
        Ok(())
    }

    /// Point both views at the directory's current selection. A no-op when
    /// they already follow it, so a paused view stays paused.
    pub fn sync_selection(&mut self) {
        let selected = self.directory.selected();
        if self.logs.project() == selected.as_ref() && self.stats.project() == selected.as_ref() {
            return;
        }
        debug!(project = ?selected, "retargeting views");
        self.logs.set_project(selected.clone());
        self.stats.set_project(selected);
    }

    /// Apply a committed filter to the log view.
    pub fn set_filter(&mut self, query: impl Into<String>) {
        self.logs.set_query(query);
    }

    /// Change both views' polling period. Periods below
    /// [`MIN_POLL_INTERVAL`](crate::poll::MIN_POLL_INTERVAL) are raised to it.
    pub fn set_poll_interval(&mut self, interval: Duration) {
        self.logs.set_interval(interval);
        self.config.poll_interval = self.logs.interval();
        self.stats.set_interval(self.config.poll_interval);
    }

    // ── Directory operations ─────────────────────────────────────────

    pub async fn refresh_projects(&self) -> Result<(), CoreError> {
        self.directory.refresh().await
    }

    /// Create a project, select it, and retarget the views.
    pub async fn create_project(&mut self, name: &str) -> Result<Project, CoreError> {
        let project = self.directory.create(name).await?;
        self.sync_selection();
        Ok(project)
    }

    // ── One-shot reads ───────────────────────────────────────────────

    /// Integration snippets, falling back to built-in templates on any
    /// failure.
    pub async fn snippets(&self) -> ResolvedSnippets {
        load_snippets(self.backend.as_ref(), &self.config.base_url).await
    }

    pub async fn health(&self) -> Result<(), CoreError> {
        Ok(self.backend.ping().await?)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Pause both subscriptions; data stays on screen.
    pub fn pause(&mut self) {
        self.logs.pause();
        self.stats.pause();
    }

    pub fn resume(&mut self) {
        self.logs.resume();
        self.stats.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.directory.selected().is_some() && !self.logs.is_polling()
    }

    /// Stop all polling. Late responses are discarded.
    pub fn shutdown(&mut self) {
        self.pause();
        info!("dashboard shut down");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::debounce::Debouncer;
    use crate::poll::PollPhase;
    use crate::testing::{FakeBackend, LogRequest};

    fn dashboard(fake: &Arc<FakeBackend>) -> Dashboard<FakeBackend> {
        Dashboard::with_backend(DashboardConfig::default(), Arc::clone(fake))
    }

    async fn settle(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    fn two_projects(fake: &FakeBackend) {
        fake.set_projects(json!([
            { "id": "p1", "name": "Shop", "created_at": "2024-06-01T00:00:00Z" },
            { "id": "p2", "name": "Blog", "created_at": "2024-05-01T00:00:00Z" }
        ]));
    }

    #[tokio::test(start_paused = true)]
    async fn selected_project_fills_table_and_cards() {
        let fake = Arc::new(FakeBackend::new());
        two_projects(&fake);
        fake.set_logs("p1", json!([{ "id": 1, "status": 200, "path": "/a" }]));
        fake.set_stats(
            "p1",
            json!({ "total": 1, "last_24h": 1, "by_status": { "2xx": 1 } }),
        );
        let mut dash = dashboard(&fake);
        dash.refresh_projects().await.unwrap();

        dash.select_project(Some(ProjectId::from("p1"))).unwrap();
        settle(10).await;

        let logs = dash.logs().state();
        let rows = logs.data.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].path, "/a");
        assert_eq!(rows[0].status, 200);

        let counters = dash.stats().counters();
        assert_eq!(counters.total, 1);
        assert_eq!(counters.last_24h, 1);
        assert_eq!(counters.errors, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn late_response_for_previous_project_is_discarded() {
        let fake = Arc::new(FakeBackend::new());
        two_projects(&fake);
        fake.set_logs("p1", json!([{ "id": 1, "status": 500, "path": "/p1" }]));
        fake.set_logs_delay("p1", Duration::from_secs(2));
        fake.set_logs("p2", json!({ "logs": [{ "id": 9, "status": 201, "path": "/p2" }] }));
        let mut dash = dashboard(&fake);
        dash.refresh_projects().await.unwrap();

        dash.select_project(Some(ProjectId::from("p1"))).unwrap();
        settle(100).await;
        dash.select_project(Some(ProjectId::from("p2"))).unwrap();
        settle(3_000).await;

        let rows = dash.logs().state().data.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].path, "/p2");
        assert!(dash.logs().state().is_current());
    }

    #[tokio::test(start_paused = true)]
    async fn late_stats_for_previous_project_are_discarded() {
        let fake = Arc::new(FakeBackend::new());
        two_projects(&fake);
        fake.set_stats("p1", json!({ "total": 100, "by_status": { "5xx": 40 } }));
        fake.set_stats_delay("p1", Duration::from_secs(2));
        fake.set_stats("p2", json!({ "total": 3, "last_24h": 3 }));
        let mut dash = dashboard(&fake);
        dash.refresh_projects().await.unwrap();

        dash.select_project(Some(ProjectId::from("p1"))).unwrap();
        settle(100).await;
        dash.select_project(Some(ProjectId::from("p2"))).unwrap();
        settle(3_000).await;

        let counters = dash.stats().counters();
        assert_eq!(counters.total, 3);
        assert_eq!(counters.last_24h, 3);
        assert_eq!(counters.errors, 0);
        assert!(dash.stats().state().is_current());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_poll_interval_is_raised_to_minimum() {
        let fake = Arc::new(FakeBackend::new());
        two_projects(&fake);
        let mut dash = dashboard(&fake);
        dash.refresh_projects().await.unwrap();
        dash.select_project(Some(ProjectId::from("p1"))).unwrap();
        settle(10).await;

        dash.set_poll_interval(Duration::ZERO);
        assert_eq!(dash.config().poll_interval, crate::poll::MIN_POLL_INTERVAL);
        settle(1_000).await;

        assert!(dash.logs().is_polling());
        assert_eq!(dash.logs().state().phase, PollPhase::Success);
        assert!(fake.log_requests().len() > 2);
    }

    #[tokio::test(start_paused = true)]
    async fn typing_burst_issues_one_filtered_request() {
        let fake = Arc::new(FakeBackend::new());
        two_projects(&fake);
        let mut dash = dashboard(&fake);
        dash.refresh_projects().await.unwrap();
        dash.select_project(Some(ProjectId::from("p1"))).unwrap();
        settle(10).await;

        let mut filter = Debouncer::new(dash.config().debounce);
        filter.edit("500");
        settle(200).await;
        filter.edit("500 err");
        if let Some(q) = filter.wait_commit().await {
            dash.set_filter(q);
        }
        settle(10).await;

        let filtered: Vec<LogRequest> = fake
            .log_requests()
            .into_iter()
            .filter(|r| r.query.is_some())
            .collect();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].query.as_deref(), Some("500 err"));
        assert_eq!(filtered[0].limit, 200);
    }

    #[tokio::test(start_paused = true)]
    async fn partial_stats_render_as_zero() {
        let fake = Arc::new(FakeBackend::new());
        two_projects(&fake);
        fake.set_stats("p1", json!({ "total": 5, "by_status": { "5xx": null } }));
        let mut dash = dashboard(&fake);
        dash.refresh_projects().await.unwrap();

        dash.select_project(Some(ProjectId::from("p1"))).unwrap();
        settle(10).await;

        let counters = dash.stats().counters();
        assert_eq!(counters.total, 5);
        assert_eq!(counters.last_24h, 0);
        assert_eq!(counters.errors, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn repolls_do_not_flicker() {
        let fake = Arc::new(FakeBackend::new());
        two_projects(&fake);
        fake.set_logs("p1", json!([{ "id": 1, "status": 200, "path": "/a" }]));
        let mut dash = dashboard(&fake);
        dash.refresh_projects().await.unwrap();
        dash.select_project(Some(ProjectId::from("p1"))).unwrap();
        settle(10).await;
        let first = dash.logs().state().data.unwrap();

        let mut rx = dash.logs().subscribe();
        let watcher = tokio::spawn(async move {
            let mut seen = Vec::new();
            let _ = tokio::time::timeout(Duration::from_millis(10_050), async {
                while rx.changed().await.is_ok() {
                    let state = rx.borrow_and_update().clone();
                    seen.push((state.phase, state.data.is_some(), state.error.is_some()));
                }
            })
            .await;
            seen
        });

        settle(10_100).await;
        let seen = watcher.await.unwrap();
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|&(_, has_data, has_error)| has_data && !has_error));
        assert_eq!(dash.logs().state().data.unwrap(), first);
        assert_eq!(dash.logs().state().phase, PollPhase::Success);
        assert_eq!(fake.log_requests().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_projects_is_not_an_error() {
        let fake = Arc::new(FakeBackend::new());
        let mut dash = dashboard(&fake);
        dash.refresh_projects().await.unwrap();
        dash.sync_selection();

        let dir = dash.directory().state();
        assert!(dir.is_empty());
        assert!(dir.error.is_none());
        assert_eq!(dash.logs().state().phase, PollPhase::Idle);
        assert!(fake.log_requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn create_selects_and_starts_polling() {
        let fake = Arc::new(FakeBackend::new());
        let mut dash = dashboard(&fake);
        dash.refresh_projects().await.unwrap();

        let project = dash.create_project("").await.unwrap();
        settle(10).await;

        assert_eq!(dash.logs().project(), Some(&project.id));
        assert_eq!(dash.stats().project(), Some(&project.id));
        assert_eq!(fake.stats_requests(), vec![project.id.clone()]);
    }

    #[tokio::test(start_paused = true)]
    async fn clearing_selection_idles_views() {
        let fake = Arc::new(FakeBackend::new());
        two_projects(&fake);
        let mut dash = dashboard(&fake);
        dash.refresh_projects().await.unwrap();
        dash.select_project(Some(ProjectId::from("p1"))).unwrap();
        settle(10).await;

        dash.select_project(None).unwrap();
        settle(10_000).await;

        assert_eq!(dash.logs().state().phase, PollPhase::Idle);
        assert!(dash.stats().state().data.is_none());
        assert_eq!(fake.log_requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_polling() {
        let fake = Arc::new(FakeBackend::new());
        two_projects(&fake);
        let mut dash = dashboard(&fake);
        dash.refresh_projects().await.unwrap();
        dash.select_project(Some(ProjectId::from("p1"))).unwrap();
        settle(10).await;

        dash.shutdown();
        settle(20_000).await;

        assert_eq!(fake.log_requests().len(), 1);
        assert_eq!(dash.logs().state().phase, PollPhase::Stopped);
        assert!(dash.is_paused());
    }

    #[tokio::test(start_paused = true)]
    async fn pause_survives_directory_refresh() {
        let fake = Arc::new(FakeBackend::new());
        two_projects(&fake);
        let mut dash = dashboard(&fake);
        dash.refresh_projects().await.unwrap();
        dash.select_project(Some(ProjectId::from("p1"))).unwrap();
        settle(10).await;

        dash.pause();
        dash.refresh_projects().await.unwrap();
        dash.sync_selection();
        settle(20_000).await;

        assert!(dash.is_paused());
        assert_eq!(fake.log_requests().len(), 1);

        dash.resume();
        settle(10).await;
        assert_eq!(fake.log_requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn snippets_fall_back_when_backend_has_none() {
        let fake = Arc::new(FakeBackend::new());
        let dash = dashboard(&fake);

        let snippets = dash.snippets().await;
        assert!(snippets.express.contains("http://localhost:8000"));

        fake.set_healthy(false);
        assert!(matches!(
            dash.health().await,
            Err(CoreError::Unreachable { .. })
        ));
    }
}
