//! Table Catalog
//!
//! The table nodes placed on the canvas. A catalog is usually produced by the
//! backend's table listing and handed to us as JSON, either as a bare array of
//! nodes or wrapped in `{ "tables": [...] }`.
//!
//! Ingestion normalizes what the detector sees:
//! - column names are trimmed and blank entries dropped
//! - every node must carry a non-empty, unique id

use crate::error::{CanvasError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// A table or collection as drawn on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableNode {
    pub id: String,

    /// Display name, not used for matching
    pub name: String,

    /// Node kind shown in the palette, e.g. "table" or "collection"
    #[serde(rename = "type", default = "default_node_type")]
    pub node_type: String,

    #[serde(default)]
    pub columns: Vec<String>,

    /// Canvas position
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,

    // Backend metadata, rendering only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_data: Option<serde_json::Map<String, serde_json::Value>>,
}

fn default_node_type() -> String {
    "table".to_string()
}

impl TableNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type: default_node_type(),
            columns,
            x: 0.0,
            y: 0.0,
            source_file: None,
            record_count: None,
            description: None,
            sample_data: None,
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Trim column names and drop the blank ones
    fn normalize_columns(&mut self) -> usize {
        let before = self.columns.len();
        self.columns = self
            .columns
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        before - self.columns.len()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Wrapped { tables: Vec<TableNode> },
    Bare(Vec<TableNode>),
}

/// Validated set of table nodes, in canvas order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableCatalog {
    pub tables: Vec<TableNode>,
}

impl TableCatalog {
    /// Build a catalog from nodes, normalizing columns and checking ids
    pub fn new(mut tables: Vec<TableNode>) -> Result<Self> {
        let mut seen = HashSet::new();

        for table in tables.iter_mut() {
            if table.id.trim().is_empty() {
                return Err(CanvasError::InvalidCatalog(format!(
                    "table '{}' has an empty id",
                    table.name
                )));
            }
            if !seen.insert(table.id.clone()) {
                return Err(CanvasError::DuplicateTableId(table.id.clone()));
            }
            let dropped = table.normalize_columns();
            if dropped > 0 {
                warn!("Dropped {} blank column name(s) from table '{}'", dropped, table.id);
            }
        }

        Ok(Self { tables })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let document: CatalogDocument = serde_json::from_str(content)?;
        let tables = match document {
            CatalogDocument::Wrapped { tables } => tables,
            CatalogDocument::Bare(tables) => tables,
        };
        Self::new(tables)
    }

    /// Load catalog from JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&content)?;
        info!("Loaded {} table(s) from {:?}", catalog.tables.len(), path);
        Ok(catalog)
    }

    /// Save catalog to JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(&self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&TableNode> {
        self.tables.iter().find(|t| t.id == id)
    }
}
