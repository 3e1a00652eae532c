//! # Configuration
//!
//! The raw, file-level description of a label sheet. A configuration is a
//! JSON document with one object per section:
//!
//! ```text
//! global    fill color, output document name
//! document  page size, page margin, margin between cells
//! mask      cut-guide outlines: on/off, color, corner radius, thickness
//! cell      cell size, inner margin
//! code      symbology, barcode height, ID range
//! text      label prefix, font, size, position adjustment
//! ```
//!
//! Lengths are millimetres; `mask.thickness` and `text.size` are points.
//! Nothing here is derived; see
//! [`LayoutSettings`](crate::layout::LayoutSettings) for that.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::barcode::Symbology;
use crate::error::{Result, SheetError};
use crate::style::{Color, Edges, Offset};

/// Extension of configuration files inside the configs directory.
pub const CONFIG_EXTENSION: &str = "json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub global: GlobalSection,
    pub document: DocumentSection,
    #[serde(default)]
    pub mask: MaskSection,
    pub cell: CellSection,
    pub code: CodeSection,
    pub text: TextSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSection {
    /// Fill color for the label text.
    #[serde(default)]
    pub fill_color: Color,
    /// Output document name, without the `.pdf` extension.
    pub pdf_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSection {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub margin: Edges,
    /// Spacing between neighbouring cells.
    #[serde(default)]
    pub cell_margin: Offset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskSection {
    #[serde(default)]
    pub add: bool,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub border_radius: f64,
    #[serde(default = "default_thickness")]
    pub thickness: f64,
    /// Fill the outline with `color` as well as stroking it.
    #[serde(default)]
    pub fill: bool,
}

fn default_thickness() -> f64 {
    0.5
}

impl Default for MaskSection {
    fn default() -> Self {
        Self {
            add: false,
            color: Color::default(),
            border_radius: 0.0,
            thickness: default_thickness(),
            fill: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSection {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub inner_margin: Edges,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSection {
    #[serde(default)]
    pub symbology: Symbology,
    /// Height of the barcode image inside the cell.
    pub height: f64,
    pub values: IdRange,
}

/// Half-open range of barcode payloads: `start` inclusive, `end` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRange {
    pub start: u64,
    pub end: u64,
}

impl IdRange {
    /// Number of IDs in the range; zero for an empty or reversed range.
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> std::ops::Range<u64> {
        self.start..self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSection {
    #[serde(default)]
    pub prefix: String,
    /// A standard PDF font name or a TrueType file in the fonts directory.
    #[serde(default = "default_font")]
    pub font: String,
    pub size: f64,
    #[serde(default)]
    pub adjust_position: Offset,
}

fn default_font() -> String {
    "Helvetica".to_string()
}

impl Config {
    /// Parse a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load `<dir>/<name>.json`.
    pub fn load(dir: &Path, name: &str) -> Result<Self> {
        let path = config_path(dir, name);
        if !path.is_file() {
            return Err(SheetError::MissingConfig(path));
        }
        let json = fs::read_to_string(&path).map_err(|e| SheetError::io(&path, e))?;
        let config = Self::from_json(&json)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}

/// Path of the configuration file called `name` inside `dir`.
pub fn config_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.{}", name, CONFIG_EXTENSION))
}

/// Names (without extension) of every configuration in `dir`, sorted.
pub fn list_configs(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|e| SheetError::io(dir, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| SheetError::io(dir, e))?.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(CONFIG_EXTENSION) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}
