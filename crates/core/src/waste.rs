//! Waste categories and the per-category points table.
//!
//! The category set is closed and its order is the classifier's output order.
//! Point values live in [`PointsTable`], which can be replaced from a JSON
//! file at startup without touching the decision engine.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// A waste category recognised by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WasteCategory {
    Battery,
    Keyboard,
    Microwave,
    Mobile,
    Mouse,
    Pcb,
    Player,
    Printer,
    Television,
    WashingMachine,
    Laptop,
}

impl WasteCategory {
    /// Every category, in classifier output order.
    pub const ALL: [WasteCategory; 11] = [
        Self::Battery,
        Self::Keyboard,
        Self::Microwave,
        Self::Mobile,
        Self::Mouse,
        Self::Pcb,
        Self::Player,
        Self::Printer,
        Self::Television,
        Self::WashingMachine,
        Self::Laptop,
    ];

    /// Classifier label, also used as the database value.
    pub fn label(self) -> &'static str {
        match self {
            Self::Battery => "Battery",
            Self::Keyboard => "Keyboard",
            Self::Microwave => "Microwave",
            Self::Mobile => "Mobile",
            Self::Mouse => "Mouse",
            Self::Pcb => "PCB",
            Self::Player => "Player",
            Self::Printer => "Printer",
            Self::Television => "Television",
            Self::WashingMachine => "Washing Machine",
            Self::Laptop => "Laptop",
        }
    }

    /// Category at a classifier output index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Parse a label. Case, spaces, underscores and hyphens are ignored, so
    /// `"Washing Machine"`, `"WashingMachine"` and `"washing_machine"` all
    /// resolve to [`WasteCategory::WashingMachine`].
    pub fn from_label(label: &str) -> Result<Self, CoreError> {
        let wanted = squash(label);
        Self::ALL
            .into_iter()
            .find(|c| squash(c.label()) == wanted)
            .ok_or_else(|| {
                CoreError::Validation(format!("Unknown waste category '{}'", label.trim()))
            })
    }
}

fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WasteCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
    }
}

impl Serialize for WasteCategory {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for WasteCategory {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_label(&raw).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Points table
// ---------------------------------------------------------------------------

/// Points for the category when no entry exists in the table.
pub const DEFAULT_CATEGORY_POINTS: CategoryPoints = CategoryPoints {
    base_points: 0,
    override_points: 50,
};

/// Reward constants for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPoints {
    /// Reward when the classification is trusted.
    pub base_points: i32,
    /// Flat reward when the classification is bypassed or not trusted.
    pub override_points: i32,
}

/// Errors loading a points table from disk.
#[derive(Debug, thiserror::Error)]
pub enum PointsTableError {
    #[error("Failed to read points table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid points table JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] CoreError),
}

/// File format for [`PointsTable::from_json_str`].
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PointsTableFile {
    #[serde(default)]
    default: Option<CategoryPoints>,
    #[serde(default)]
    categories: HashMap<String, CategoryPoints>,
}

/// Category -> points mapping with a fallback for missing categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointsTable {
    entries: HashMap<WasteCategory, CategoryPoints>,
    default: CategoryPoints,
}

impl Default for PointsTable {
    fn default() -> Self {
        Self::reference()
    }
}

impl PointsTable {
    /// A table with no entries; every lookup yields `default`.
    pub fn empty(default: CategoryPoints) -> Self {
        Self {
            entries: HashMap::new(),
            default,
        }
    }

    /// The built-in reward table.
    pub fn reference() -> Self {
        use WasteCategory::*;

        let entries = [
            (Battery, 110, 60),
            (Keyboard, 36, 20),
            (Microwave, 270, 150),
            (Mobile, 150, 80),
            (Mouse, 27, 15),
            (Pcb, 165, 90),
            (Player, 90, 50),
            (Printer, 200, 120),
            (Television, 330, 180),
            (WashingMachine, 400, 220),
            (Laptop, 180, 100),
        ]
        .into_iter()
        .map(|(category, base_points, override_points)| {
            (
                category,
                CategoryPoints {
                    base_points,
                    override_points,
                },
            )
        })
        .collect();

        Self {
            entries,
            default: DEFAULT_CATEGORY_POINTS,
        }
    }

    /// Overlay a JSON document on the built-in table.
    ///
    /// Listed categories replace their built-in values; a `default` key
    /// replaces the fallback. Unknown category labels and negative point
    /// values are rejected.
    pub fn from_json_str(json: &str) -> Result<Self, PointsTableError> {
        let file: PointsTableFile = serde_json::from_str(json)?;
        let mut table = Self::reference();

        if let Some(default) = file.default {
            validate_points("default", default)?;
            table.default = default;
        }
        for (label, points) in file.categories {
            let category = WasteCategory::from_label(&label)?;
            validate_points(category.label(), points)?;
            table.entries.insert(category, points);
        }
        Ok(table)
    }

    /// Read and parse a table file.
    pub fn load(path: &Path) -> Result<Self, PointsTableError> {
        let json = std::fs::read_to_string(path).map_err(|source| PointsTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Set (or replace) the points for a category.
    pub fn insert(&mut self, category: WasteCategory, points: CategoryPoints) {
        self.entries.insert(category, points);
    }

    /// Remove a category so that it falls back to the default.
    pub fn remove(&mut self, category: WasteCategory) -> Option<CategoryPoints> {
        self.entries.remove(&category)
    }

    /// Points for `category`, or the default when the table has no entry.
    pub fn lookup(&self, category: WasteCategory) -> CategoryPoints {
        self.entries.get(&category).copied().unwrap_or(self.default)
    }

    /// The fallback used for categories missing from the table.
    pub fn default_points(&self) -> CategoryPoints {
        self.default
    }

    /// Effective points for every category, in classifier order.
    pub fn effective(&self) -> Vec<(WasteCategory, CategoryPoints)> {
        WasteCategory::ALL
            .into_iter()
            .map(|c| (c, self.lookup(c)))
            .collect()
    }
}

fn validate_points(name: &str, points: CategoryPoints) -> Result<(), CoreError> {
    if points.base_points < 0 || points.override_points < 0 {
        return Err(CoreError::Validation(format!(
            "Points for '{name}' must be non-negative"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
