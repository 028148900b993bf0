//! Project model

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{new_record_id, Collection, Document, GridArea, OrderedRecord};
use crate::error::{Error, Result};
use crate::util::is_http_url;

const DEFAULT_COVER_IMAGE: &str =
    "https://images.unsplash.com/photo-1618005182384-a83a8bd57fbe?auto=format&fit=crop&w=800";

/// Portfolio filter bucket a project is listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FilterCategory {
    #[default]
    Coding,
    Graphic,
    Motion,
    PhotoVideo,
}

impl FilterCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Coding => "coding",
            Self::Graphic => "graphic",
            Self::Motion => "motion",
            Self::PhotoVideo => "photo-video",
        }
    }
}

impl fmt::Display for FilterCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coding" => Ok(Self::Coding),
            "graphic" => Ok(Self::Graphic),
            "motion" => Ok(Self::Motion),
            "photo-video" => Ok(Self::PhotoVideo),
            other => Err(Error::InvalidInput(format!(
                "unknown filter category '{other}'"
            ))),
        }
    }
}

/// Media type of a gallery asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// One media asset in a project gallery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
}

/// Design specification block shown on the case study page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProjectSpecs {
    pub typography: String,
    pub colors: Vec<String>,
    pub grid: String,
}

/// Case study narrative
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Narrative {
    pub challenge: String,
    pub execution: String,
    pub result: String,
}

/// A portfolio project; the ordered collection of the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub filter_category: FilterCategory,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub specs: ProjectSpecs,
    #[serde(default)]
    pub narrative: Narrative,
    #[serde(default)]
    pub gallery: Vec<GalleryItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl Project {
    /// A fresh, not yet persisted project with dashboard defaults.
    #[must_use]
    pub fn draft() -> Self {
        Self {
            id: new_record_id("proj"),
            title: "Untitled Project".to_string(),
            category: "Design & Development".to_string(),
            filter_category: FilterCategory::Coding,
            featured: false,
            image: DEFAULT_COVER_IMAGE.to_string(),
            description: "Record summary...".to_string(),
            link: None,
            tags: vec!["New".to_string()],
            specs: ProjectSpecs {
                typography: "Inter".to_string(),
                colors: vec!["#000000".to_string()],
                grid: "12-Col".to_string(),
            },
            narrative: Narrative::default(),
            gallery: Vec::new(),
            grid_area: Some(GridArea::new(6, 1).to_class_string()),
            order: None,
        }
    }

    /// A draft project with a fixed id.
    #[must_use]
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::draft()
        }
    }

    /// Add a tag; trimmed, non-empty and not already present.
    ///
    /// Returns `Ok(false)` when the tag already exists.
    pub fn add_tag(&mut self, tag: &str) -> Result<bool> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(Error::InvalidInput("tag must not be empty".to_string()));
        }
        if self.tags.iter().any(|existing| existing == tag) {
            return Ok(false);
        }
        self.tags.push(tag.to_string());
        Ok(true)
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|existing| existing != tag.trim());
        before != self.tags.len()
    }

    /// Add a palette color given as `#rgb` or `#rrggbb`.
    ///
    /// Returns `Ok(false)` when the color is already in the palette.
    pub fn add_color(&mut self, color: &str) -> Result<bool> {
        let color = validate_hex_color(color)?;
        if self.specs.colors.iter().any(|existing| *existing == color) {
            return Ok(false);
        }
        self.specs.colors.push(color);
        Ok(true)
    }

    pub fn remove_color(&mut self, color: &str) -> bool {
        let before = self.specs.colors.len();
        self.specs.colors.retain(|existing| existing != color.trim());
        before != self.specs.colors.len()
    }

    /// Append a media asset to the gallery, ignoring duplicate urls.
    pub fn add_gallery_item(&mut self, kind: MediaKind, url: &str) -> Result<bool> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::InvalidInput("media url must not be empty".to_string()));
        }
        if self.gallery.iter().any(|item| item.url == url) {
            return Ok(false);
        }
        self.gallery.push(GalleryItem {
            kind,
            url: url.to_string(),
        });
        Ok(true)
    }

    /// Remove a gallery asset. The cover image is left as is.
    pub fn remove_gallery_item(&mut self, url: &str) -> bool {
        let before = self.gallery.len();
        self.gallery.retain(|item| item.url != url);
        before != self.gallery.len()
    }

    pub fn set_cover(&mut self, url: &str) -> Result<()> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::InvalidInput("cover url must not be empty".to_string()));
        }
        let in_gallery = self.gallery.iter().any(|item| item.url == url);
        if !in_gallery && !is_http_url(url) {
            return Err(Error::InvalidInput(
                "cover must be a gallery item or an http(s) url".to_string(),
            ));
        }
        self.image = url.to_string();
        Ok(())
    }

    /// Bento grid footprint; unparsable or missing values fall back to 4x1.
    #[must_use]
    pub fn grid(&self) -> GridArea {
        self.grid_area
            .as_deref()
            .map_or_else(GridArea::default, GridArea::parse)
    }

    pub fn set_grid(&mut self, grid: GridArea) {
        self.grid_area = Some(grid.to_class_string());
    }
}

impl Document for Project {
    const COLLECTION: Collection = Collection::Projects;

    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> String {
        self.title.clone()
    }
}

impl OrderedRecord for Project {
    fn order(&self) -> Option<i64> {
        self.order
    }

    fn set_order(&mut self, order: i64) {
        self.order = Some(order);
    }
}

/// Validate a `#rgb` / `#rrggbb` color code, returning the trimmed value.
pub fn validate_hex_color(color: &str) -> Result<String> {
    static HEX_COLOR: OnceLock<Regex> = OnceLock::new();
    let re = HEX_COLOR
        .get_or_init(|| Regex::new(r"^#([A-Fa-f0-9]{3}){1,2}$").expect("Invalid regex"));

    let color = color.trim();
    if re.is_match(color) {
        Ok(color.to_string())
    } else {
        Err(Error::InvalidInput(format!(
            "'{color}' is not a valid hex color"
        )))
    }
}
