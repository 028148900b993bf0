//! Data models for Folio

mod client;
mod experience;
mod grid;
mod overview;
mod project;
mod settings;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use client::Client;
pub use experience::{Experience, ExperienceKind};
pub use grid::{GridArea, GridPreset, GRID_PRESETS};
pub use overview::{Overview, Stat};
pub use project::{
    validate_hex_color, FilterCategory, GalleryItem, MediaKind, Narrative, Project, ProjectSpecs,
};
pub use settings::SecuritySettings;

/// Named document collections in the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Projects,
    Experience,
    Clients,
    Settings,
}

impl Collection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Experience => "experience",
            Self::Clients => "clients",
            Self::Settings => "settings",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record persisted as one document in a named collection.
pub trait Document:
    Serialize + DeserializeOwned + Clone + PartialEq + fmt::Debug + Send + Sync + 'static
{
    /// Collection this record type lives in
    const COLLECTION: Collection;

    /// Stable identifier, assigned at creation
    fn id(&self) -> &str;

    /// Human-readable label used in prompts and notifications
    fn display_name(&self) -> String;
}

/// A document whose position in its collection is persisted as `order`.
pub trait OrderedRecord: Document {
    fn order(&self) -> Option<i64>;

    fn set_order(&mut self, order: i64);
}

/// One `{id, order}` pair of a batched reorder write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub id: String,
    pub order: i64,
}

impl OrderUpdate {
    /// Build the full dense `0..N-1` ordering for the given display order.
    pub fn from_display_order<R: OrderedRecord>(records: &[R]) -> Vec<Self> {
        records
            .iter()
            .zip(0_i64..)
            .map(|(record, order)| Self {
                id: record.id().to_string(),
                order,
            })
            .collect()
    }
}

/// Generate a new record id of the form `<prefix>_<uuid v7>`.
#[must_use]
pub fn new_record_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::now_v7().simple())
}
