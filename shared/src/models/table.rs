//! Floor-plan table model

use crate::error::{AppError, AppResult, ErrorCode};
use crate::layout::{self, Point, SeatDistribution};
use crate::naming::table_name;
use crate::state::{TableState, deserialize_optional_state};
use serde::{Deserialize, Serialize};

/// Editor-assigned table identifier
pub type TableId = i64;

/// Identifier of an order in the POS
pub type OrderId = i64;

pub const DEFAULT_CAPACITY: u32 = 4;
pub const DEFAULT_WIDTH: f64 = 120.0;
pub const DEFAULT_HEIGHT: f64 = 80.0;
pub const DEFAULT_ORIGIN: Point = Point { x: 20.0, y: 20.0 };
pub const DEFAULT_COLOR: &str = "#f3f4f6";

/// Seating status shown on the floor plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
    Reserved,
}

/// Floor-plan table
///
/// Serialized camelCase, the same shape as the exported canvas file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "TableRecord")]
pub struct Table {
    pub id: TableId,
    pub name: String,
    /// Maximum number of seated guests
    pub capacity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_capacity: Option<u32>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub status: TableStatus,
    pub color: String,
    /// POS order tracking this table's seating session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_state: Option<TableState>,
    /// Locked tables cannot be moved, resized or rotated
    pub locked: bool,
    /// Seat slots that may hold a chair
    pub available_positions: Vec<u32>,
}

/// Lenient on-disk form of [`Table`]
///
/// Older files omit most optional fields; missing seat positions are
/// re-derived from the table size.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableRecord {
    id: TableId,
    #[serde(default, alias = "label")]
    name: Option<String>,
    #[serde(default)]
    capacity: Option<u32>,
    #[serde(default)]
    min_capacity: Option<u32>,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    #[serde(default)]
    rotation: f64,
    #[serde(default)]
    status: TableStatus,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    order_id: Option<OrderId>,
    #[serde(default, deserialize_with = "deserialize_optional_state")]
    current_state: Option<TableState>,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    available_positions: Option<Vec<u32>>,
}

impl From<TableRecord> for Table {
    fn from(r: TableRecord) -> Self {
        let mut table = create_table(TableDraft {
            id: Some(r.id),
            name: r.name,
            capacity: r.capacity,
            min_capacity: r.min_capacity,
            x: Some(r.x),
            y: Some(r.y),
            width: Some(r.width),
            height: Some(r.height),
            rotation: Some(r.rotation),
            status: Some(r.status),
            color: r.color,
            available_positions: r.available_positions,
        });
        table.order_id = r.order_id;
        table.current_state = r.current_state;
        table.locked = r.locked;
        table
    }
}

/// Partial table input; unset fields fall back to defaults
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableDraft {
    pub id: Option<TableId>,
    pub name: Option<String>,
    pub capacity: Option<u32>,
    pub min_capacity: Option<u32>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub status: Option<TableStatus>,
    pub color: Option<String>,
    pub available_positions: Option<Vec<u32>>,
}

/// Build a table from a draft
///
/// When `available_positions` is given it is taken verbatim; otherwise every
/// slot the table size allows is available.
pub fn create_table(draft: TableDraft) -> Table {
    let id = draft
        .id
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
    let width = draft.width.unwrap_or(DEFAULT_WIDTH);
    let height = draft.height.unwrap_or(DEFAULT_HEIGHT);

    let available_positions = draft.available_positions.unwrap_or_else(|| {
        (0..layout::calculate_max_chair_positions(width, height)).collect()
    });

    Table {
        id,
        name: draft.name.unwrap_or_else(|| table_name(id)),
        capacity: draft.capacity.unwrap_or(DEFAULT_CAPACITY),
        min_capacity: draft.min_capacity,
        x: draft.x.unwrap_or(DEFAULT_ORIGIN.x),
        y: draft.y.unwrap_or(DEFAULT_ORIGIN.y),
        width,
        height,
        rotation: draft.rotation.unwrap_or(0.0),
        status: draft.status.unwrap_or_default(),
        color: draft.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        order_id: None,
        current_state: None,
        locked: false,
        available_positions,
    }
}

/// Check capacity bounds: both positive and `min <= max`
pub fn validate_capacity(max_capacity: u32, min_capacity: u32) -> AppResult<()> {
    if max_capacity == 0 || min_capacity == 0 {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            "All values must be greater than 0",
        ));
    }
    if min_capacity > max_capacity {
        return Err(AppError::new(ErrorCode::CapacityInvalid)
            .with_detail("min_capacity", min_capacity)
            .with_detail("max_capacity", max_capacity));
    }
    Ok(())
}

impl Table {
    /// Top-left corner
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn seat_distribution(&self) -> SeatDistribution {
        layout::distribute_chair_positions(self.width, self.height)
    }

    /// Number of seat slots this table's size allows
    pub fn max_positions(&self) -> u32 {
        layout::calculate_max_chair_positions(self.width, self.height)
    }

    pub fn allows_position(&self, position: u32) -> bool {
        self.available_positions.contains(&position)
    }

    /// Minimum guests, 1 when unset
    pub fn effective_min_capacity(&self) -> u32 {
        self.min_capacity.unwrap_or(1)
    }

    /// Normalize a set of seat slots for this table
    ///
    /// Returns the slots sorted and deduplicated, or an error naming the
    /// first slot past the table's maximum.
    pub fn validate_positions(&self, positions: &[u32]) -> AppResult<Vec<u32>> {
        let max = self.max_positions();
        if let Some(bad) = positions.iter().find(|p| **p >= max) {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("Position {} is outside 0..{} for {}", bad, max, self.name),
            )
            .with_detail("position", *bad)
            .with_detail("max_positions", max));
        }

        let mut normalized = positions.to_vec();
        normalized.sort_unstable();
        normalized.dedup();
        Ok(normalized)
    }
}
