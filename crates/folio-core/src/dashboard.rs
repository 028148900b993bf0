//! Application root: boards, the active editor, navigation and global prompts

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::board::{ProjectBoard, RecordBoard};
use crate::config::DashboardConfig;
use crate::confirm::{ConfirmationGate, ConfirmationRequest, Severity};
use crate::edit::EditBuffer;
use crate::error::{Error, Result};
use crate::integrations::{AuthProvider, DeployHook, TextGenerator};
use crate::models::{Client, Experience, MediaKind, Overview, Project, SecuritySettings};
use crate::notify::NotificationChannel;
use crate::store::{records, RemoteStore};
use crate::util::{is_http_url, lock};

/// Top-level screens of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Dashboard,
    Overview,
    Projects,
    Experience,
    Clients,
    Settings,
}

impl View {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Overview => "overview",
            Self::Projects => "projects",
            Self::Experience => "experience",
            Self::Clients => "clients",
            Self::Settings => "settings",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dashboard" => Ok(Self::Dashboard),
            "overview" | "profile" => Ok(Self::Overview),
            "projects" => Ok(Self::Projects),
            "experience" => Ok(Self::Experience),
            "clients" => Ok(Self::Clients),
            "settings" => Ok(Self::Settings),
            other => Err(Error::InvalidInput(format!("unknown view '{other}'"))),
        }
    }
}

/// What an editor is opened on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditTarget {
    Project(String),
    Experience(String),
    NewExperience,
    Client(String),
    NewClient,
    Overview,
}

/// The single active editor
#[derive(Debug, Clone)]
pub enum EditSession {
    Project(EditBuffer<Project>),
    Experience(EditBuffer<Experience>),
    Client(EditBuffer<Client>),
    Overview(EditBuffer<Overview>),
}

impl EditSession {
    pub const fn is_dirty(&self) -> bool {
        match self {
            Self::Project(buffer) => buffer.is_dirty(),
            Self::Experience(buffer) => buffer.is_dirty(),
            Self::Client(buffer) => buffer.is_dirty(),
            Self::Overview(buffer) => buffer.is_dirty(),
        }
    }

    /// Set a dotted field path on the working copy.
    pub fn set_path(&mut self, path: &str, value: Value) -> Result<()> {
        match self {
            Self::Project(buffer) => buffer.set_path(path, value),
            Self::Experience(buffer) => buffer.set_path(path, value),
            Self::Client(buffer) => buffer.set_path(path, value),
            Self::Overview(buffer) => buffer.set_path(path, value),
        }
    }

    pub fn as_project_mut(&mut self) -> Option<&mut EditBuffer<Project>> {
        match self {
            Self::Project(buffer) => Some(buffer),
            _ => None,
        }
    }

    pub fn as_overview_mut(&mut self) -> Option<&mut EditBuffer<Overview>> {
        match self {
            Self::Overview(buffer) => Some(buffer),
            _ => None,
        }
    }

    /// Label of the record under edit
    pub fn label(&self) -> String {
        match self {
            Self::Project(buffer) => buffer.working().title.clone(),
            Self::Experience(buffer) => {
                let working = buffer.working();
                format!("{} at {}", working.role, working.company)
            }
            Self::Client(buffer) => buffer.working().name.clone(),
            Self::Overview(_) => "Profile overview".to_string(),
        }
    }
}

/// Record counts shown on the landing screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub projects: usize,
    pub featured_projects: usize,
    pub experience: usize,
    pub clients: usize,
    pub profile_stats: usize,
}

/// Every collection at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardExport {
    pub exported_at: DateTime<Utc>,
    pub projects: Vec<Project>,
    pub experience: Vec<Experience>,
    pub clients: Vec<Client>,
    pub overview: Overview,
}

/// Owns the store, the boards and the one active edit session.
///
/// Notifications and confirmations are explicit handles shared with every
/// board.
pub struct Dashboard<S> {
    store: Arc<S>,
    notifier: NotificationChannel,
    gate: ConfirmationGate,
    projects: ProjectBoard<S>,
    experience: RecordBoard<S, Experience>,
    clients: RecordBoard<S, Client>,
    overview: Arc<Mutex<Overview>>,
    view: Arc<Mutex<View>>,
    session: Arc<tokio::sync::Mutex<Option<EditSession>>>,
}

impl<S> Clone for Dashboard<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifier: self.notifier.clone(),
            gate: self.gate.clone(),
            projects: self.projects.clone(),
            experience: self.experience.clone(),
            clients: self.clients.clone(),
            overview: Arc::clone(&self.overview),
            view: Arc::clone(&self.view),
            session: Arc::clone(&self.session),
        }
    }
}

impl<S: RemoteStore> Dashboard<S> {
    pub fn new(store: Arc<S>, config: &DashboardConfig) -> Self {
        let notifier = NotificationChannel::new(config.notify_dismiss());
        Self {
            projects: ProjectBoard::new(
                Arc::clone(&store),
                notifier.clone(),
                config.collision_threshold_px,
                config.reorder_debounce(),
            ),
            experience: RecordBoard::new(Arc::clone(&store), notifier.clone()),
            clients: RecordBoard::new(Arc::clone(&store), notifier.clone()),
            store,
            notifier,
            gate: ConfirmationGate::new(),
            overview: Arc::new(Mutex::new(Overview::default())),
            view: Arc::new(Mutex::new(View::default())),
            session: Arc::new(tokio::sync::Mutex::new(None)),
        }
    }

    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub const fn notifier(&self) -> &NotificationChannel {
        &self.notifier
    }

    pub const fn gate(&self) -> &ConfirmationGate {
        &self.gate
    }

    pub const fn projects(&self) -> &ProjectBoard<S> {
        &self.projects
    }

    pub const fn experience(&self) -> &RecordBoard<S, Experience> {
        &self.experience
    }

    pub const fn clients(&self) -> &RecordBoard<S, Client> {
        &self.clients
    }

    pub fn overview(&self) -> Overview {
        lock(&self.overview).clone()
    }

    pub fn view(&self) -> View {
        *lock(&self.view)
    }

    /// Load every collection concurrently.
    pub async fn load_all(&self) -> Result<()> {
        let (projects, experience, clients, overview) = tokio::join!(
            self.projects.load(),
            self.experience.load(),
            self.clients.load(),
            records::load_overview(self.store.as_ref()),
        );

        let result = projects
            .and(experience)
            .and(clients)
            .and(overview.map(Option::unwrap_or_default));

        match result {
            Ok(overview) => {
                *lock(&self.overview) = overview;
                Ok(())
            }
            Err(error) => {
                self.notifier.error(format!("Sync error: {error}"));
                Err(error)
            }
        }
    }

    /// Open an editor on `target`, replacing a clean session.
    ///
    /// The working copy and its snapshot stay frozen until the session ends,
    /// whatever happens to the boards meanwhile.
    pub fn begin_edit(&self, target: EditTarget) -> Result<()> {
        let mut session = self
            .session
            .try_lock()
            .map_err(|_| Error::Busy("a save is in progress".to_string()))?;
        if session.as_ref().is_some_and(EditSession::is_dirty) {
            return Err(Error::Busy("the current editor has unsaved changes".to_string()));
        }

        let opened = match target {
            EditTarget::Project(id) => EditSession::Project(EditBuffer::begin(
                self.projects.get(&id).ok_or(Error::NotFound(id))?,
            )),
            EditTarget::Experience(id) => EditSession::Experience(EditBuffer::begin(
                self.experience.get(&id).ok_or(Error::NotFound(id))?,
            )),
            EditTarget::NewExperience => EditSession::Experience(EditBuffer::begin(Experience::draft())),
            EditTarget::Client(id) => EditSession::Client(EditBuffer::begin(
                self.clients.get(&id).ok_or(Error::NotFound(id))?,
            )),
            EditTarget::NewClient => EditSession::Client(EditBuffer::begin(Client::draft())),
            EditTarget::Overview => EditSession::Overview(EditBuffer::begin(self.overview())),
        };
        tracing::debug!("Editing {}", opened.label());
        *session = Some(opened);
        Ok(())
    }

    /// Mutate the active session.
    pub fn edit_session<R>(&self, change: impl FnOnce(&mut EditSession) -> R) -> Result<R> {
        let mut session = self
            .session
            .try_lock()
            .map_err(|_| Error::Busy("a save is in progress".to_string()))?;
        let session = session
            .as_mut()
            .ok_or_else(|| Error::InvalidInput("no record is being edited".to_string()))?;
        Ok(change(session))
    }

    /// Snapshot of the active session, if any.
    pub fn session(&self) -> Option<EditSession> {
        self.session.try_lock().ok().and_then(|session| session.clone())
    }

    /// Whether the active editor holds unsaved changes. A save in progress
    /// counts as dirty.
    pub fn is_dirty(&self) -> bool {
        self.session
            .try_lock()
            .map_or(true, |session| session.as_ref().is_some_and(EditSession::is_dirty))
    }

    /// Persist the active session.
    ///
    /// Failures are notified and leave the working copy dirty.
    pub async fn save_session(&self) -> Result<()> {
        let mut session = self
            .session
            .try_lock()
            .map_err(|_| Error::Busy("a save is in progress".to_string()))?;
        let session = session
            .as_mut()
            .ok_or_else(|| Error::InvalidInput("no record is being edited".to_string()))?;

        match session {
            EditSession::Project(buffer) => buffer.commit(|project| self.projects.save(project)).await,
            EditSession::Experience(buffer) => buffer.commit(|entry| self.experience.save(entry)).await,
            EditSession::Client(buffer) => buffer.commit(|client| self.clients.save(client)).await,
            EditSession::Overview(buffer) => {
                buffer.commit(|overview| self.persist_overview(overview)).await
            }
        }
    }

    /// Drop the active session, returning it.
    pub async fn discard_session(&self) -> Option<EditSession> {
        self.session.lock().await.take()
    }

    /// Switch views. Unsaved changes are guarded by a confirmation whose
    /// accept discards them; returns whether the switch happened now.
    pub async fn navigate(&self, view: View) -> bool {
        if !self.is_dirty() {
            self.switch_view(view).await;
            return true;
        }

        let dashboard = self.clone();
        self.gate.request(ConfirmationRequest::new(
            "Unsaved Changes",
            "You have unsaved changes. Discard them and leave this editor?",
            Severity::Info,
            move || async move {
                dashboard.switch_view(view).await;
                Ok(())
            },
        ));
        false
    }

    /// Save first, then switch views only if the save succeeded.
    pub async fn save_and_navigate(&self, view: View) -> Result<()> {
        if self.is_dirty() {
            self.save_session().await?;
        }
        self.switch_view(view).await;
        Ok(())
    }

    pub fn request_sign_out<A: AuthProvider>(&self, auth: Arc<A>) {
        let notifier = self.notifier.clone();
        self.gate.request(ConfirmationRequest::new(
            "Confirm Sign Out",
            "Are you sure you want to end your current session?",
            Severity::Info,
            move || async move {
                auth.sign_out().await.inspect_err(|error| {
                    notifier.error(format!("Sign out failed: {error}"));
                })
            },
        ));
    }

    pub fn request_deploy<H: DeployHook>(&self, hook: Arc<H>) {
        let notifier = self.notifier.clone();
        self.gate.request(ConfirmationRequest::new(
            "Trigger Production Build",
            "This will push your current database state to the live production environment. Proceed?",
            Severity::Info,
            move || async move {
                notifier.loading("Triggering deployment...");
                match hook.trigger().await {
                    Ok(()) => {
                        notifier.success("Deployment triggered");
                        Ok(())
                    }
                    Err(error) => {
                        notifier.error(format!("Deployment failed: {error}"));
                        Err(error)
                    }
                }
            },
        ));
    }

    /// Generate text into a field of the active editor.
    pub async fn generate_field<G: TextGenerator>(
        &self,
        generator: &G,
        path: &str,
        prompt: &str,
    ) -> Result<String> {
        self.notifier.loading("Generating copy...");
        let text = match generator.generate_text(prompt).await {
            Ok(text) => text,
            Err(error) => {
                self.notifier.error(format!("Generation failed: {error}"));
                return Err(error);
            }
        };

        self.edit_session(|session| session.set_path(path, Value::String(text.clone())))
            .and_then(|applied| applied)
            .inspect_err(|error| self.notifier.error(format!("Generation failed: {error}")))?;
        self.notifier.success("Copy generated");
        Ok(text)
    }

    /// Upload a media file into the gallery of the project under edit.
    pub async fn upload_to_gallery(
        &self,
        file_name: &str,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> Result<String> {
        let editing_project = self
            .edit_session(|session| session.as_project_mut().is_some())
            .unwrap_or(false);
        if !editing_project {
            return Err(Error::InvalidInput(
                "media can only be added while editing a project".to_string(),
            ));
        }

        self.notifier.loading("Uploading media...");
        let url = match self.store.upload_blob(file_name, bytes, content_type).await {
            Ok(url) => url,
            Err(error) => {
                self.notifier.error(format!("Upload failed: {error}"));
                return Err(error);
            }
        };

        let kind = if content_type.is_some_and(|value| value.starts_with("video/")) {
            MediaKind::Video
        } else {
            MediaKind::Image
        };
        self.edit_session(|session| {
            session.as_project_mut().map_or(Ok(()), |buffer| {
                buffer.try_update(|draft| draft.add_gallery_item(kind, &url).map(|_| ()))
            })
        })
        .and_then(|applied| applied)?;
        self.notifier.success("Media uploaded");
        Ok(url)
    }

    pub async fn security(&self) -> Result<SecuritySettings> {
        records::load_security(self.store.as_ref()).await
    }

    pub async fn save_security(&self, settings: &SecuritySettings) -> Result<()> {
        if let Some(url) = settings.webhook_url.as_deref() {
            if !is_http_url(url) {
                return Err(Error::InvalidInput(
                    "webhook url must include http:// or https://".to_string(),
                ));
            }
        }
        match records::save_security(self.store.as_ref(), settings).await {
            Ok(()) => {
                self.notifier.success("Security settings updated");
                Ok(())
            }
            Err(error) => {
                self.notifier.error(format!("Update failed: {error}"));
                Err(error)
            }
        }
    }

    pub fn stats(&self) -> DashboardStats {
        let projects = self.projects.items();
        DashboardStats {
            projects: projects.len(),
            featured_projects: projects.iter().filter(|project| project.featured).count(),
            experience: self.experience.len(),
            clients: self.clients.len(),
            profile_stats: lock(&self.overview).stats.len(),
        }
    }

    pub fn export(&self) -> DashboardExport {
        DashboardExport {
            exported_at: Utc::now(),
            projects: self.projects.items(),
            experience: self.experience.items(),
            clients: self.clients.items(),
            overview: self.overview(),
        }
    }

    async fn persist_overview(&self, overview: Overview) -> Result<Overview> {
        match records::save_overview(self.store.as_ref(), &overview).await {
            Ok(()) => {
                *lock(&self.overview) = overview.clone();
                self.notifier.success("Profile synced");
                Ok(overview)
            }
            Err(error) => {
                self.notifier.error(format!("Profile sync failed: {error}"));
                Err(error)
            }
        }
    }

    async fn switch_view(&self, view: View) {
        let ended = self.session.lock().await.take();
        if ended.is_some() {
            tracing::debug!("Editor closed on navigation to {view}");
        }
        *lock(&self.view) = view;
    }
}
