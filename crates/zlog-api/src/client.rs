// Async HTTP client for the ZLog backend.
//
// Base path: the configured backend root (e.g. `http://localhost:8000/`).
// Resources: /api/projects, /api/logs, /api/stats, /api/snippets.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::models::{Listing, Project, ProjectId, Snippets, StatsSnapshot};
use crate::transport::TransportConfig;

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize)]
struct CreateProject<'a> {
    name: &'a str,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the ZLog backend.
///
/// Cheap to clone: the underlying `reqwest::Client` is reference counted,
/// so every poll task can own a handle.
#[derive(Debug, Clone)]
pub struct ZlogClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ZlogClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a backend URL and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base path ends with `/` so relative joins keep any prefix
    /// (a backend mounted at `https://host/zlog` resolves to `/zlog/api/...`).
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        url.set_query(None);
        Ok(url)
    }

    /// The normalized backend root.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        Self::handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        let message = match serde_json::from_str::<ErrorResponse>(&raw) {
            Ok(ErrorResponse {
                message: Some(msg), ..
            }) => msg,
            Ok(ErrorResponse {
                detail: Some(serde_json::Value::String(detail)),
                ..
            }) => detail,
            _ if raw.is_empty() => status.to_string(),
            _ => raw.chars().take(200).collect(),
        };

        Error::Http {
            status: status.as_u16(),
            message,
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Health ───────────────────────────────────────────────────────

    /// Probe the backend root. Any 2xx counts as reachable; the body is ignored.
    pub async fn health(&self) -> Result<(), Error> {
        let url = self.base_url.clone();
        debug!("GET {url} (health)");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    // ── Projects ─────────────────────────────────────────────────────

    /// All projects, in backend order. Normalize with `into_items("projects")`.
    pub async fn list_projects(&self) -> Result<Listing, Error> {
        self.get("api/projects", &[]).await
    }

    /// Create a project; the backend generates its id and API key.
    pub async fn create_project(&self, name: &str) -> Result<Project, Error> {
        self.post("api/projects", &CreateProject { name }).await
    }

    // ── Logs ─────────────────────────────────────────────────────────

    /// Most recent logs of a project. An empty or absent `query` omits `q`.
    /// Normalize with `into_items("logs")`.
    pub async fn list_logs(
        &self,
        project_id: &ProjectId,
        query: Option<&str>,
        limit: u32,
    ) -> Result<Listing, Error> {
        let mut params = vec![("project_id", project_id.to_string())];
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            params.push(("q", q.to_owned()));
        }
        params.push(("limit", limit.to_string()));
        self.get("api/logs", &params).await
    }

    // ── Stats ────────────────────────────────────────────────────────

    pub async fn get_stats(&self, project_id: &ProjectId) -> Result<StatsSnapshot, Error> {
        self.get("api/stats", &[("project_id", project_id.to_string())])
            .await
    }

    // ── Snippets ─────────────────────────────────────────────────────

    pub async fn get_snippets(&self) -> Result<Snippets, Error> {
        self.get("api/snippets", &[]).await
    }
}
