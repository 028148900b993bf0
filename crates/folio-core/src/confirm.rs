//! Single-slot confirmation protocol for destructive and disruptive actions

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::error::Result;
use crate::util::lock;

type ConfirmFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;
type ConfirmAction = Box<dyn FnOnce() -> ConfirmFuture + Send>;

/// Presentation urgency of a prompt. Has no effect on control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Danger,
    Info,
}

impl Severity {
    /// Label of the accept button
    #[must_use]
    pub const fn confirm_label(self) -> &'static str {
        match self {
            Self::Danger => "Purge",
            Self::Info => "Execute",
        }
    }
}

/// A pending action together with the prompt that guards it.
pub struct ConfirmationRequest {
    prompt: PendingPrompt,
    on_confirm: ConfirmAction,
}

impl ConfirmationRequest {
    pub fn new<F, Fut>(
        title: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        on_confirm: F,
    ) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            prompt: PendingPrompt {
                title: title.into(),
                message: message.into(),
                severity,
            },
            on_confirm: Box::new(move || Box::pin(on_confirm())),
        }
    }

    pub const fn prompt(&self) -> &PendingPrompt {
        &self.prompt
    }
}

impl fmt::Debug for ConfirmationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfirmationRequest")
            .field("prompt", &self.prompt)
            .finish_non_exhaustive()
    }
}

/// What a renderer needs to show the active prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPrompt {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl PendingPrompt {
    #[must_use]
    pub const fn confirm_label(&self) -> &'static str {
        self.severity.confirm_label()
    }
}

/// At most one request is active; a newer request silently replaces it.
#[derive(Clone)]
pub struct ConfirmationGate {
    active: Arc<Mutex<Option<ConfirmationRequest>>>,
    prompt: watch::Sender<Option<PendingPrompt>>,
}

impl Default for ConfirmationGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfirmationGate {
    #[must_use]
    pub fn new() -> Self {
        let (prompt, _) = watch::channel(None);
        Self {
            active: Arc::new(Mutex::new(None)),
            prompt,
        }
    }

    /// Make `request` the active prompt, dropping any earlier one.
    pub fn request(&self, request: ConfirmationRequest) {
        let prompt = request.prompt.clone();
        let replaced = lock(&self.active).replace(request);
        if let Some(replaced) = replaced {
            tracing::debug!("Confirmation '{}' superseded", replaced.prompt.title);
        }
        tracing::debug!("Confirmation requested: {}", prompt.title);
        self.prompt.send_replace(Some(prompt));
    }

    /// Run the active action exactly once and clear the prompt.
    ///
    /// Returns `Ok(false)` when nothing was pending.
    pub async fn accept(&self) -> Result<bool> {
        let Some(request) = self.take() else {
            return Ok(false);
        };
        tracing::debug!("Confirmation accepted: {}", request.prompt.title);
        (request.on_confirm)().await?;
        Ok(true)
    }

    /// Clear the active prompt without running it.
    pub fn cancel(&self) -> bool {
        match self.take() {
            Some(request) => {
                tracing::debug!("Confirmation cancelled: {}", request.prompt.title);
                true
            }
            None => false,
        }
    }

    pub fn active(&self) -> Option<PendingPrompt> {
        self.prompt.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.active).is_some()
    }

    /// Watch the active prompt for reactive rendering.
    pub fn subscribe(&self) -> watch::Receiver<Option<PendingPrompt>> {
        self.prompt.subscribe()
    }

    fn take(&self) -> Option<ConfirmationRequest> {
        let request = lock(&self.active).take();
        if request.is_some() {
            self.prompt.send_replace(None);
        }
        request
    }
}
