//! Canvas export/import format
//!
//! ```json
//! { "version": "1.0", "tables": [...], "lines": [...] }
//! ```
//!
//! Import only checks that `tables` is present. Files written before walls
//! existed have no `lines` and load with an empty wall list. There is no
//! version migration.

use crate::error::{AppError, AppResult, ErrorCode};
use crate::models::{Line, Table};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Format version written on export
pub const CANVAS_VERSION: &str = "1.0";

/// Serialized floor plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasState {
    #[serde(default)]
    pub version: String,
    pub tables: Vec<Table>,
    #[serde(default)]
    pub lines: Vec<Line>,
}

impl CanvasState {
    pub fn new(tables: Vec<Table>, lines: Vec<Line>) -> Self {
        Self {
            version: CANVAS_VERSION.to_string(),
            tables,
            lines,
        }
    }

    pub fn to_json_pretty(&self) -> AppResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Parse a canvas file
    pub fn from_json(json: &str) -> AppResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(|e| {
            tracing::error!(error = %e, "Error parsing canvas JSON");
            AppError::invalid_format("Failed to load canvas file. Please check the file format.")
        })?;

        if value.get("tables").is_none_or(|t| t.is_null()) {
            return Err(AppError::with_message(
                ErrorCode::InvalidFormat,
                "Invalid canvas file format",
            ));
        }

        let state: CanvasState = serde_json::from_value(value).map_err(|e| {
            tracing::error!(error = %e, "Canvas file has unexpected shape");
            AppError::invalid_format(format!("Invalid canvas file format: {}", e))
        })?;

        if state.version != CANVAS_VERSION {
            tracing::warn!(version = %state.version, "Loading canvas file with unknown version");
        }
        Ok(state)
    }

    pub fn write_to_path(&self, path: impl AsRef<Path>) -> AppResult<()> {
        std::fs::write(path.as_ref(), self.to_json_pretty()?)?;
        tracing::debug!(path = %path.as_ref().display(), tables = self.tables.len(), "Canvas exported");
        Ok(())
    }

    pub fn read_from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

/// Download name for an export made at `now`
pub fn export_file_name(now: chrono::DateTime<chrono::Utc>) -> String {
    format!("canvas-{}.json", now.timestamp_millis())
}
