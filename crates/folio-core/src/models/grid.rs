//! Bento grid footprint of a project card (12 columns x 4 rows)

use std::sync::OnceLock;

use regex::Regex;

pub const MAX_GRID_COLS: u8 = 12;
pub const MAX_GRID_ROWS: u8 = 4;

/// Column/row span of a card on the desktop grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridArea {
    pub cols: u8,
    pub rows: u8,
}

impl GridArea {
    /// Build a footprint, clamping into `1..=12` columns and `1..=4` rows.
    #[must_use]
    pub fn new(cols: u8, rows: u8) -> Self {
        Self {
            cols: cols.clamp(1, MAX_GRID_COLS),
            rows: rows.clamp(1, MAX_GRID_ROWS),
        }
    }

    /// Parse a class string such as `md:col-span-8 md:row-span-2`.
    ///
    /// Missing spans fall back to 4 columns and 1 row.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        static SPANS: OnceLock<(Regex, Regex)> = OnceLock::new();
        let (cols_re, rows_re) = SPANS.get_or_init(|| {
            (
                Regex::new(r"col-span-(\d+)").expect("Invalid regex"),
                Regex::new(r"row-span-(\d+)").expect("Invalid regex"),
            )
        });

        let span = |re: &Regex, fallback: u8| {
            re.captures(value)
                .and_then(|cap| cap[1].parse::<u32>().ok())
                .map_or(fallback, |span| {
                    u8::try_from(span.min(u32::from(u8::MAX))).unwrap_or(u8::MAX)
                })
        };

        Self::new(span(cols_re, 4), span(rows_re, 1))
    }

    #[must_use]
    pub fn to_class_string(self) -> String {
        format!("md:col-span-{} md:row-span-{}", self.cols, self.rows)
    }

    /// The named preset matching this footprint, if any.
    #[must_use]
    pub fn preset(self) -> Option<&'static GridPreset> {
        GRID_PRESETS
            .iter()
            .find(|preset| preset.area() == self)
    }
}

impl Default for GridArea {
    fn default() -> Self {
        Self { cols: 4, rows: 1 }
    }
}

/// A named grid footprint offered by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPreset {
    pub id: &'static str,
    pub label: &'static str,
    pub cols: u8,
    pub rows: u8,
}

impl GridPreset {
    #[must_use]
    pub fn area(&self) -> GridArea {
        GridArea::new(self.cols, self.rows)
    }
}

pub static GRID_PRESETS: [GridPreset; 6] = [
    GridPreset { id: "standard", label: "Standard", cols: 4, rows: 1 },
    GridPreset { id: "medium", label: "Portrait", cols: 6, rows: 1 },
    GridPreset { id: "hero", label: "Hero Feature", cols: 8, rows: 2 },
    GridPreset { id: "tall", label: "Vertical Tall", cols: 4, rows: 3 },
    GridPreset { id: "panoramic", label: "Full Strip", cols: 12, rows: 1 },
    GridPreset { id: "cinema", label: "Cinematic", cols: 12, rows: 3 },
];
