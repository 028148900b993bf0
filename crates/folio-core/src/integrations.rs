//! Collaborators the dashboard calls but does not implement

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Signed-in administrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Gatekeeper of the editors. Only consulted, never implemented here.
pub trait AuthProvider: Send + Sync + 'static {
    fn current_user(&self) -> Option<AuthUser>;

    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<AuthUser>> + Send;

    fn sign_out(&self) -> impl Future<Output = Result<()>> + Send;
}

/// Optional writing aid used from field editors.
pub trait TextGenerator: Send + Sync + 'static {
    fn generate_text(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Site rebuild trigger.
pub trait DeployHook: Send + Sync + 'static {
    fn trigger(&self) -> impl Future<Output = Result<()>> + Send;
}
