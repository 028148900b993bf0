//! Dashboard runtime configuration.
//!
//! Values come from an optional JSON file and may be overridden by `FOLIO_*`
//! environment variables.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::notify::DEFAULT_NOTIFY_DISMISS;
use crate::reorder::DEFAULT_COLLISION_THRESHOLD_PX;
use crate::schedule::DEFAULT_REORDER_DEBOUNCE;
use crate::util::{is_http_url, normalize_text_option};

const ENV_REORDER_DEBOUNCE_MS: &str = "FOLIO_REORDER_DEBOUNCE_MS";
const ENV_NOTIFY_DISMISS_MS: &str = "FOLIO_NOTIFY_DISMISS_MS";
const ENV_COLLISION_THRESHOLD_PX: &str = "FOLIO_COLLISION_THRESHOLD_PX";
const ENV_DB_PATH: &str = "FOLIO_DB_PATH";
const ENV_MEDIA_BASE_URL: &str = "FOLIO_MEDIA_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Quiet period before a reorder burst is written
    pub reorder_debounce_ms: u64,
    /// Visibility window of success and error notifications
    pub notify_dismiss_ms: u64,
    /// Pointer distance that captures a drop slot
    pub collision_threshold_px: f64,
    /// Local document store file
    pub db_path: Option<PathBuf>,
    /// Public prefix of uploaded media urls
    pub media_base_url: Option<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            reorder_debounce_ms: duration_ms(DEFAULT_REORDER_DEBOUNCE),
            notify_dismiss_ms: duration_ms(DEFAULT_NOTIFY_DISMISS),
            collision_threshold_px: DEFAULT_COLLISION_THRESHOLD_PX,
            db_path: None,
            media_base_url: None,
        }
    }
}

impl DashboardConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json(payload: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(payload)
            .map_err(|error| Error::InvalidInput(format!("invalid config JSON: {error}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let payload = std::fs::read_to_string(path)?;
        Self::from_json(&payload)
    }

    /// Apply `FOLIO_*` overrides from the process environment.
    pub fn with_env(self) -> Result<Self> {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let value = |key: &str| normalize_text_option(lookup(key));

        if let Some(raw) = value(ENV_REORDER_DEBOUNCE_MS) {
            self.reorder_debounce_ms = parse_number(ENV_REORDER_DEBOUNCE_MS, &raw)?;
        }
        if let Some(raw) = value(ENV_NOTIFY_DISMISS_MS) {
            self.notify_dismiss_ms = parse_number(ENV_NOTIFY_DISMISS_MS, &raw)?;
        }
        if let Some(raw) = value(ENV_COLLISION_THRESHOLD_PX) {
            self.collision_threshold_px = parse_number(ENV_COLLISION_THRESHOLD_PX, &raw)?;
        }
        if let Some(raw) = value(ENV_DB_PATH) {
            self.db_path = Some(PathBuf::from(raw));
        }
        if let Some(raw) = value(ENV_MEDIA_BASE_URL) {
            self.media_base_url = Some(raw);
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.reorder_debounce_ms == 0 {
            return Err(Error::InvalidInput(
                "reorder_debounce_ms must be greater than zero".to_string(),
            ));
        }
        if self.notify_dismiss_ms == 0 {
            return Err(Error::InvalidInput(
                "notify_dismiss_ms must be greater than zero".to_string(),
            ));
        }
        if !self.collision_threshold_px.is_finite() || self.collision_threshold_px <= 0.0 {
            return Err(Error::InvalidInput(
                "collision_threshold_px must be a positive number".to_string(),
            ));
        }
        if let Some(url) = &self.media_base_url {
            if !is_http_url(url) {
                return Err(Error::InvalidInput(
                    "media_base_url must include http:// or https://".to_string(),
                ));
            }
        }
        Ok(())
    }

    #[must_use]
    pub const fn reorder_debounce(&self) -> Duration {
        Duration::from_millis(self.reorder_debounce_ms)
    }

    #[must_use]
    pub const fn notify_dismiss(&self) -> Duration {
        Duration::from_millis(self.notify_dismiss_ms)
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| Error::InvalidInput(format!("{key} must be a number, got '{raw}'")))
}
