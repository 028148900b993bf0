//! Experience (career timeline) model

use serde::{Deserialize, Serialize};

use super::{new_record_id, Collection, Document};

/// Whether a timeline entry is a job or a diploma
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceKind {
    #[default]
    Work,
    Education,
}

/// One milestone on the career timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub id: String,
    pub role: String,
    pub company: String,
    pub period: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: ExperienceKind,
}

impl Experience {
    #[must_use]
    pub fn draft() -> Self {
        Self {
            id: new_record_id("exp"),
            role: "New Position".to_string(),
            company: "Company Name".to_string(),
            period: "Start - Present".to_string(),
            description: "Describe your achievements and impact in this role...".to_string(),
            kind: ExperienceKind::Work,
        }
    }
}

impl Document for Experience {
    const COLLECTION: Collection = Collection::Experience;

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        format!("{} at {}", self.role, self.company)
    }
}
