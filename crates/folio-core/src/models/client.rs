//! Client partnership model

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::{new_record_id, Collection, Document};

/// A client on the partnership roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub role: String,
    pub year: String,
    #[serde(default)]
    pub description: String,
}

impl Client {
    /// An empty client record stamped with the current year.
    #[must_use]
    pub fn draft() -> Self {
        Self {
            id: new_record_id("client"),
            name: String::new(),
            role: String::new(),
            year: chrono::Utc::now().year().to_string(),
            description: String::new(),
        }
    }
}

impl Document for Client {
    const COLLECTION: Collection = Collection::Clients;

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            "Unnamed client".to_string()
        } else {
            self.name.clone()
        }
    }
}
