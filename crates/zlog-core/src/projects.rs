// ── Project directory ──
//
// The project list, the current selection, and the create flow. Shared
// between the UI and background tasks: clones refer to the same state.
// Every list/create bumps a generation counter, and a completion whose
// generation is no longer current is dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use zlog_api::{Project, ProjectId};

use crate::backend::Backend;
use crate::error::CoreError;

/// Field under which `/api/projects` may wrap its rows.
pub const PROJECTS_FIELD: &str = "projects";

const LIST_FAILED: &str = "Failed to load projects. Check that the backend is running.";
const CREATE_FAILED: &str = "Failed to create project. Check that the backend is running.";

/// Observable directory state.
#[derive(Debug, Clone, Default)]
pub struct DirectoryState {
    /// Newest first.
    pub projects: Arc<Vec<Project>>,
    pub selected: Option<ProjectId>,
    pub loading: bool,
    pub creating: bool,
    /// At least one list request has succeeded.
    pub loaded: bool,
    /// Banner text for the last failed list or create.
    pub error: Option<String>,
}

impl DirectoryState {
    pub fn selected_project(&self) -> Option<&Project> {
        let id = self.selected.as_ref()?;
        self.projects.iter().find(|p| &p.id == id)
    }

    pub fn position_of(&self, id: &ProjectId) -> Option<usize> {
        self.projects.iter().position(|p| &p.id == id)
    }

    /// Loaded and empty: the UI shows a "create your first project" hint.
    pub fn is_empty(&self) -> bool {
        self.loaded && self.projects.is_empty()
    }
}

/// Name used when the user creates a project without typing one.
pub fn default_project_name(now: DateTime<Local>) -> String {
    format!("Project {}", now.format("%Y-%m-%d %H:%M:%S"))
}

/// Newest first; projects without a creation time sink to the bottom.
fn sort_newest_first(projects: &mut [Project]) {
    projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

struct DirectoryInner<B> {
    backend: Arc<B>,
    state: watch::Sender<DirectoryState>,
    generation: AtomicU64,
}

/// Handle to the shared project directory.
pub struct ProjectDirectory<B: Backend> {
    inner: Arc<DirectoryInner<B>>,
}

impl<B: Backend> Clone for ProjectDirectory<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: Backend> ProjectDirectory<B> {
    pub fn new(backend: Arc<B>) -> Self {
        let (state, _) = watch::channel(DirectoryState::default());
        Self {
            inner: Arc::new(DirectoryInner {
                backend,
                state,
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn state(&self) -> DirectoryState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DirectoryState> {
        self.inner.state.subscribe()
    }

    pub fn selected(&self) -> Option<ProjectId> {
        self.inner.state.borrow().selected.clone()
    }

    fn next_generation(&self) -> u64 {
        self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.generation.load(Ordering::SeqCst) == generation
    }

    // ── Listing ──────────────────────────────────────────────────────

    /// Reload the project list.
    ///
    /// The selection survives if the project still exists. Returns
    /// [`CoreError::Superseded`] when a newer list or create finished the
    /// job first.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        let generation = self.next_generation();
        self.inner.state.send_modify(|s| s.loading = true);

        let result = self.inner.backend.fetch_projects().await;
        if !self.is_current(generation) {
            debug!(generation, "discarding superseded project list");
            return Err(CoreError::Superseded);
        }

        match result {
            Ok(listing) => {
                let mut projects: Vec<Project> = listing.into_items(PROJECTS_FIELD);
                sort_newest_first(&mut projects);
                debug!(count = projects.len(), "project list loaded");

                self.inner.state.send_modify(|s| {
                    let vanished = s
                        .selected
                        .as_ref()
                        .is_some_and(|id| !projects.iter().any(|p| &p.id == id));
                    if vanished {
                        info!("selected project no longer exists");
                        s.selected = None;
                    }
                    s.projects = Arc::new(projects);
                    s.loading = false;
                    s.loaded = true;
                    s.error = None;
                });
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to list projects");
                self.inner.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(LIST_FAILED.to_owned());
                });
                Err(e.into())
            }
        }
    }

    // ── Create ───────────────────────────────────────────────────────

    /// Create a project and select it.
    ///
    /// A blank `name` falls back to [`default_project_name`]. The new
    /// project is prepended locally; no re-list is needed.
    pub async fn create(&self, name: &str) -> Result<Project, CoreError> {
        let name = match name.trim() {
            "" => default_project_name(Local::now()),
            trimmed => trimmed.to_owned(),
        };
        // Invalidate any list in flight; it would not contain the new project.
        let generation = self.next_generation();
        self.inner.state.send_modify(|s| s.creating = true);

        match self.inner.backend.create_project(&name).await {
            Ok(project) => {
                info!(project = %project.id, name = %project.name, "project created");
                let created = project.clone();
                self.inner.state.send_modify(|s| {
                    let mut projects: Vec<Project> = s
                        .projects
                        .iter()
                        .filter(|p| p.id != created.id)
                        .cloned()
                        .collect();
                    projects.insert(0, created);
                    s.selected = Some(project.id.clone());
                    s.projects = Arc::new(projects);
                    s.creating = false;
                    s.error = None;
                    if self.is_current(generation) {
                        s.loading = false;
                    }
                });
                Ok(project)
            }
            Err(e) => {
                warn!(error = %e, %name, "failed to create project");
                self.inner.state.send_modify(|s| {
                    s.creating = false;
                    s.error = Some(CREATE_FAILED.to_owned());
                    if self.is_current(generation) {
                        s.loading = false;
                    }
                });
                Err(e.into())
            }
        }
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Select a listed project, or clear the selection with `None`.
    pub fn select(&self, id: Option<ProjectId>) -> Result<(), CoreError> {
        let mut result = Ok(());
        self.inner.state.send_if_modified(|s| {
            if let Some(id) = &id {
                if s.position_of(id).is_none() {
                    result = Err(CoreError::ProjectNotFound { id: id.to_string() });
                    return false;
                }
            }
            if s.selected == id {
                return false;
            }
            s.selected = id;
            true
        });
        result
    }

    pub fn clear_selection(&self) {
        self.inner.state.send_if_modified(|s| s.selected.take().is_some());
    }

    pub fn dismiss_error(&self) {
        self.inner.state.send_if_modified(|s| s.error.take().is_some());
    }
}
