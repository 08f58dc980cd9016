// In-memory backend for controller tests. Pair with paused Tokio time.
#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use secrecy::SecretString;
use serde_json::{Value, json};
use zlog_api::{Listing, Project, ProjectId, Snippets, StatsSnapshot};

use crate::backend::Backend;
use crate::error::FetchError;

/// A `/api/logs` request as the fake saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LogRequest {
    pub project_id: ProjectId,
    pub query: Option<String>,
    pub limit: u32,
}

#[derive(Default)]
struct Script {
    projects: Value,
    projects_delay: Duration,
    projects_fail: bool,
    created: Vec<String>,
    logs: HashMap<ProjectId, Value>,
    log_delays: HashMap<ProjectId, Duration>,
    logs_fail: bool,
    log_requests: Vec<LogRequest>,
    stats: HashMap<ProjectId, Value>,
    stats_delays: HashMap<ProjectId, Duration>,
    stats_requests: Vec<ProjectId>,
    snippets: Option<Snippets>,
    healthy: bool,
}

pub(crate) struct FakeBackend {
    script: Mutex<Script>,
}

fn network() -> FetchError {
    FetchError::Network("connection refused".into())
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script {
                projects: json!([]),
                healthy: true,
                ..Script::default()
            }),
        }
    }

    pub fn set_projects(&self, body: Value) {
        self.script.lock().unwrap().projects = body;
    }

    pub fn set_projects_delay(&self, delay: Duration) {
        self.script.lock().unwrap().projects_delay = delay;
    }

    pub fn fail_projects(&self, fail: bool) {
        self.script.lock().unwrap().projects_fail = fail;
    }

    pub fn created_names(&self) -> Vec<String> {
        self.script.lock().unwrap().created.clone()
    }

    pub fn set_logs(&self, project: &str, body: Value) {
        self.script
            .lock()
            .unwrap()
            .logs
            .insert(ProjectId::from(project), body);
    }

    pub fn set_logs_delay(&self, project: &str, delay: Duration) {
        self.script
            .lock()
            .unwrap()
            .log_delays
            .insert(ProjectId::from(project), delay);
    }

    pub fn fail_logs(&self, fail: bool) {
        self.script.lock().unwrap().logs_fail = fail;
    }

    pub fn log_requests(&self) -> Vec<LogRequest> {
        self.script.lock().unwrap().log_requests.clone()
    }

    pub fn set_stats(&self, project: &str, body: Value) {
        self.script
            .lock()
            .unwrap()
            .stats
            .insert(ProjectId::from(project), body);
    }

    pub fn set_stats_delay(&self, project: &str, delay: Duration) {
        self.script
            .lock()
            .unwrap()
            .stats_delays
            .insert(ProjectId::from(project), delay);
    }

    pub fn stats_requests(&self) -> Vec<ProjectId> {
        self.script.lock().unwrap().stats_requests.clone()
    }

    pub fn set_snippets(&self, snippets: Option<Snippets>) {
        self.script.lock().unwrap().snippets = snippets;
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.script.lock().unwrap().healthy = healthy;
    }
}

impl Backend for FakeBackend {
    async fn fetch_projects(&self) -> Result<Listing, FetchError> {
        let (body, delay, fail) = {
            let script = self.script.lock().unwrap();
            (
                script.projects.clone(),
                script.projects_delay,
                script.projects_fail,
            )
        };
        tokio::time::sleep(delay).await;
        if fail {
            return Err(network());
        }
        Ok(Listing::new(body))
    }

    async fn create_project(&self, name: &str) -> Result<Project, FetchError> {
        let fail = self.script.lock().unwrap().projects_fail;
        if fail {
            return Err(network());
        }
        let mut script = self.script.lock().unwrap();
        script.created.push(name.to_owned());
        let id = format!("new-{}", script.created.len());
        Ok(Project::new(
            id,
            name,
            Some(SecretString::from(String::from("zlog_test_key_0001"))),
            Some(Utc::now()),
        ))
    }

    async fn fetch_logs(
        &self,
        project_id: &ProjectId,
        query: Option<&str>,
        limit: u32,
    ) -> Result<Listing, FetchError> {
        let (body, delay, fail) = {
            let mut script = self.script.lock().unwrap();
            script.log_requests.push(LogRequest {
                project_id: project_id.clone(),
                query: query.map(str::to_owned),
                limit,
            });
            (
                script.logs.get(project_id).cloned().unwrap_or(json!([])),
                script.log_delays.get(project_id).copied().unwrap_or_default(),
                script.logs_fail,
            )
        };
        tokio::time::sleep(delay).await;
        if fail {
            return Err(network());
        }
        Ok(Listing::new(body))
    }

    async fn fetch_stats(&self, project_id: &ProjectId) -> Result<StatsSnapshot, FetchError> {
        let (body, delay) = {
            let mut script = self.script.lock().unwrap();
            script.stats_requests.push(project_id.clone());
            (
                script.stats.get(project_id).cloned().unwrap_or(json!({})),
                script
                    .stats_delays
                    .get(project_id)
                    .copied()
                    .unwrap_or_default(),
            )
        };
        tokio::time::sleep(delay).await;
        serde_json::from_value(body).map_err(|e| FetchError::Shape(e.to_string()))
    }

    async fn fetch_snippets(&self) -> Result<Snippets, FetchError> {
        self.script.lock().unwrap().snippets.clone().ok_or_else(|| FetchError::Http {
            status: 404,
            message: "Not Found".into(),
        })
    }

    async fn ping(&self) -> Result<(), FetchError> {
        if self.script.lock().unwrap().healthy {
            Ok(())
        } else {
            Err(network())
        }
    }
}
