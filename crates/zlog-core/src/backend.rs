// ── Backend seam ──
//
// The sync engine talks to the backend through this trait so controllers
// can be driven by an in-memory fake under paused time. `ZlogClient` is
// the production implementation.

use std::future::Future;

use zlog_api::{Listing, Project, ProjectId, Snippets, StatsSnapshot, ZlogClient};

use crate::error::FetchError;

/// Read/write access to a ZLog backend.
///
/// List endpoints return the raw [`Listing`]; shape normalization happens
/// in the controllers that consume them.
pub trait Backend: Send + Sync + 'static {
    fn fetch_projects(&self) -> impl Future<Output = Result<Listing, FetchError>> + Send;

    fn create_project(&self, name: &str)
    -> impl Future<Output = Result<Project, FetchError>> + Send;

    fn fetch_logs(
        &self,
        project_id: &ProjectId,
        query: Option<&str>,
        limit: u32,
    ) -> impl Future<Output = Result<Listing, FetchError>> + Send;

    fn fetch_stats(
        &self,
        project_id: &ProjectId,
    ) -> impl Future<Output = Result<StatsSnapshot, FetchError>> + Send;

    fn fetch_snippets(&self) -> impl Future<Output = Result<Snippets, FetchError>> + Send;

    fn ping(&self) -> impl Future<Output = Result<(), FetchError>> + Send;
}

impl Backend for ZlogClient {
    async fn fetch_projects(&self) -> Result<Listing, FetchError> {
        Ok(self.list_projects().await?)
    }

    async fn create_project(&self, name: &str) -> Result<Project, FetchError> {
        Ok(ZlogClient::create_project(self, name).await?)
    }

    async fn fetch_logs(
        &self,
        project_id: &ProjectId,
        query: Option<&str>,
        limit: u32,
    ) -> Result<Listing, FetchError> {
        Ok(self.list_logs(project_id, query, limit).await?)
    }

    async fn fetch_stats(&self, project_id: &ProjectId) -> Result<StatsSnapshot, FetchError> {
        Ok(self.get_stats(project_id).await?)
    }

    async fn fetch_snippets(&self) -> Result<Snippets, FetchError> {
        Ok(self.get_snippets().await?)
    }

    async fn ping(&self) -> Result<(), FetchError> {
        Ok(self.health().await?)
    }
}
