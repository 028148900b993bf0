//! Profile overview singleton

use serde::{Deserialize, Serialize};

/// A headline metric shown on the profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub label: String,
    pub value: String,
}

/// Global profile copy, stored as the `profile` settings document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Overview {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    #[serde(default)]
    pub stats: Vec<Stat>,
}

impl Overview {
    /// Settings document key
    pub const SETTINGS_KEY: &'static str = "profile";

    pub fn add_stat(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.stats.push(Stat {
            label: label.into(),
            value: value.into(),
        });
    }

    /// Remove the stat at `index`, returning it when present.
    pub fn remove_stat(&mut self, index: usize) -> Option<Stat> {
        (index < self.stats.len()).then(|| self.stats.remove(index))
    }
}
