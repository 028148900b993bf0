//! Dashboard security settings

use serde::{Deserialize, Serialize};

/// Access policy, stored as the `security` settings document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySettings {
    #[serde(default)]
    pub allow_sign_up: bool,
    #[serde(default)]
    pub maintenance_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl SecuritySettings {
    /// Settings document key
    pub const SETTINGS_KEY: &'static str = "security";
}
