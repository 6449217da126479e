//! In-memory floor plan
//!
//! [`Editor`] owns the tables, the walls, the selection and each table's
//! sync status. All mutation goes through its methods; remote effects are
//! left to the session.

pub mod snap;

use crate::session::SyncStatus;
use shared::canvas::CanvasState;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::layout::{self, Point};
use shared::models::{Line, OrderId, Table, TableDraft, TableId, create_table, validate_capacity};
use shared::naming::{TABLE_NAME_PREFIX, next_line_id, next_table_id, table_name_with_prefix};
use shared::state::TableState;
use std::collections::HashMap;

pub use snap::{MIN_LINE_LENGTH, SNAP_THRESHOLD, find_nearest_endpoint};

/// Drawn rectangles must exceed this in both directions
pub const MIN_DRAWN_SIZE: f64 = 10.0;
/// Smallest side a resize may produce
pub const MIN_TABLE_SIZE: f64 = 30.0;
/// Offset of a copied table from its original
pub const COPY_OFFSET: f64 = 30.0;

/// Bulk table creation request
#[derive(Debug, Clone, PartialEq)]
pub struct TableCreationConfig {
    pub width: f64,
    pub height: f64,
    pub max_capacity: u32,
    pub min_capacity: u32,
    pub count: usize,
}

impl TableCreationConfig {
    pub fn validate(&self) -> AppResult<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.width) || !positive(self.height) || self.count == 0 {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                "All values must be greater than 0",
            ));
        }
        validate_capacity(self.max_capacity, self.min_capacity)
    }
}

/// End state of a move/resize/rotate gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation: f64,
}

#[derive(Debug, Clone)]
pub struct Editor {
    tables: Vec<Table>,
    lines: Vec<Line>,
    selected: Option<TableId>,
    sync: HashMap<TableId, SyncStatus>,
    name_prefix: String,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::with_name_prefix(TABLE_NAME_PREFIX)
    }

    pub fn with_name_prefix(prefix: impl Into<String>) -> Self {
        Self {
            tables: Vec::new(),
            lines: Vec::new(),
            selected: None,
            sync: HashMap::new(),
            name_prefix: prefix.into(),
        }
    }

    pub fn from_canvas(canvas: CanvasState) -> Self {
        let mut editor = Self::new();
        editor.import(canvas);
        editor
    }

    // ========== Queries ==========

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }

    pub fn selected(&self) -> Option<TableId> {
        self.selected
    }

    pub fn selected_table(&self) -> Option<&Table> {
        self.selected.and_then(|id| self.table(id))
    }

    pub fn sync_status(&self, id: TableId) -> Option<&SyncStatus> {
        self.sync.get(&id)
    }

    fn table_mut(&mut self, id: TableId) -> AppResult<&mut Table> {
        self.tables
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| AppError::table_not_found(id))
    }

    fn unlocked_mut(&mut self, id: TableId) -> AppResult<&mut Table> {
        let table = self.table_mut(id)?;
        if table.locked {
            return Err(AppError::with_message(
                ErrorCode::TableLocked,
                format!("{} is locked", table.name),
            ));
        }
        Ok(table)
    }

    fn next_name(&self, id: TableId) -> String {
        table_name_with_prefix(id, &self.name_prefix)
    }

    // ========== Selection ==========

    pub fn select(&mut self, id: Option<TableId>) {
        self.selected = id.filter(|id| self.table(*id).is_some());
    }

    /// Select a table; returns whether its details dialog should open
    ///
    /// Only locked tables open the dialog; unlocked ones are being arranged.
    pub fn click_table(&mut self, id: TableId) -> bool {
        self.select(Some(id));
        self.table(id).is_some_and(|t| t.locked)
    }

    // ========== Tables ==========

    /// Draw a table between two corners; tiny rectangles are ignored
    pub fn draw_table(&mut self, start: Point, end: Point) -> Option<TableId> {
        let width = (end.x - start.x).abs().round();
        let height = (end.y - start.y).abs().round();
        if width <= MIN_DRAWN_SIZE || height <= MIN_DRAWN_SIZE {
            return None;
        }

        let id = next_table_id(&self.tables);
        self.tables.push(create_table(TableDraft {
            id: Some(id),
            name: Some(self.next_name(id)),
            x: Some(start.x.min(end.x).round()),
            y: Some(start.y.min(end.y).round()),
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }));
        self.selected = Some(id);
        tracing::debug!(table_id = id, width, height, "Table drawn");
        Some(id)
    }

    /// Add `count` identical tables laid out on a grid
    pub fn add_tables(&mut self, config: &TableCreationConfig) -> AppResult<Vec<TableId>> {
        config.validate()?;

        let first_id = next_table_id(&self.tables);
        let positions = layout::calculate_table_positions(config.count, config.width, config.height);
        let mut ids = Vec::with_capacity(positions.len());

        for (offset, pos) in positions.into_iter().enumerate() {
            let id = first_id + offset as TableId;
            self.tables.push(create_table(TableDraft {
                id: Some(id),
                name: Some(self.next_name(id)),
                capacity: Some(config.max_capacity),
                min_capacity: Some(config.min_capacity),
                x: Some(pos.x),
                y: Some(pos.y),
                width: Some(config.width),
                height: Some(config.height),
                ..Default::default()
            }));
            ids.push(id);
        }

        tracing::info!(count = ids.len(), "Tables added");
        Ok(ids)
    }

    /// Duplicate the selected table next to it and select the copy
    pub fn copy_selected(&mut self) -> Option<TableId> {
        let source = self.selected_table()?.clone();
        let id = next_table_id(&self.tables);
        self.tables.push(create_table(TableDraft {
            id: Some(id),
            name: Some(self.next_name(id)),
            capacity: Some(source.capacity),
            min_capacity: source.min_capacity,
            x: Some(source.x + COPY_OFFSET),
            y: Some(source.y + COPY_OFFSET),
            width: Some(source.width),
            height: Some(source.height),
            rotation: Some(source.rotation),
            ..Default::default()
        }));
        self.selected = Some(id);
        Some(id)
    }

    pub fn move_table(&mut self, id: TableId, x: f64, y: f64) -> AppResult<()> {
        let table = self.unlocked_mut(id)?;
        table.x = x;
        table.y = y;
        Ok(())
    }

    /// Apply a finished transform; sides never shrink below [`MIN_TABLE_SIZE`]
    ///
    /// Seat slots that no longer fit the new size are dropped.
    pub fn transform_table(&mut self, id: TableId, transform: Transform) -> AppResult<()> {
        let table = self.unlocked_mut(id)?;
        table.x = transform.x;
        table.y = transform.y;
        table.width = (table.width * transform.scale_x).max(MIN_TABLE_SIZE).round();
        table.height = (table.height * transform.scale_y).max(MIN_TABLE_SIZE).round();
        table.rotation = transform.rotation;

        let max = table.max_positions();
        let before = table.available_positions.len();
        table.available_positions.retain(|p| *p < max);
        if table.available_positions.len() != before {
            tracing::debug!(
                table_id = id,
                dropped = before - table.available_positions.len(),
                "Seat slots dropped after resize"
            );
        }
        Ok(())
    }

    /// Flip the lock; returns the new value
    pub fn toggle_lock(&mut self, id: TableId) -> AppResult<bool> {
        let table = self.table_mut(id)?;
        table.locked = !table.locked;
        Ok(table.locked)
    }

    pub fn set_capacity(&mut self, id: TableId, max_capacity: u32, min_capacity: u32) -> AppResult<()> {
        validate_capacity(max_capacity, min_capacity)?;
        let table = self.table_mut(id)?;
        table.capacity = max_capacity;
        table.min_capacity = Some(min_capacity);
        Ok(())
    }

    pub fn set_available_positions(&mut self, id: TableId, positions: &[u32]) -> AppResult<()> {
        let table = self.table_mut(id)?;
        table.available_positions = table.validate_positions(positions)?;
        Ok(())
    }

    /// Remove a table; returns its order so the caller can delete it remotely
    pub fn delete_table(&mut self, id: TableId) -> AppResult<Option<OrderId>> {
        let index = self
            .tables
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| AppError::table_not_found(id))?;
        let table = self.tables.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.sync.remove(&id);
        Ok(table.order_id)
    }

    // ========== Walls ==========

    /// Draw a wall, snapping both ends onto nearby wall ends
    pub fn draw_line(&mut self, start: Point, end: Point) -> Option<String> {
        let start = snap::snap(start, &self.lines);
        let end = snap::snap(end, &self.lines);
        let start = Point::new(start.x.round(), start.y.round());
        let end = Point::new(end.x.round(), end.y.round());

        if start.distance(&end) < MIN_LINE_LENGTH {
            return None;
        }

        let mut id = next_line_id(chrono::Utc::now().timestamp_millis());
        while self.lines.iter().any(|l| l.id == id) {
            id.push('+');
        }
        self.lines.push(Line::new(id.clone(), start, end));
        Some(id)
    }

    pub fn remove_line(&mut self, id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.id != id);
        self.lines.len() != before
    }

    // ========== Remote confirmation ==========

    pub(crate) fn set_sync(&mut self, id: TableId, status: SyncStatus) {
        self.sync.insert(id, status);
    }

    /// Record a confirmed order: attached, no state yet
    pub(crate) fn confirm_order(&mut self, id: TableId, order_id: OrderId) -> AppResult<()> {
        let table = self.table_mut(id)?;
        table.order_id = Some(order_id);
        table.current_state = None;
        self.sync.insert(id, SyncStatus::Confirmed);
        Ok(())
    }

    /// Record the canonical state read back from the POS
    pub(crate) fn confirm_state(&mut self, id: TableId, state: Option<TableState>) -> AppResult<()> {
        let table = self.table_mut(id)?;
        table.current_state = state;
        self.sync.insert(id, SyncStatus::Confirmed);
        Ok(())
    }

    // ========== Files ==========

    pub fn export(&self) -> CanvasState {
        CanvasState::new(self.tables.clone(), self.lines.clone())
    }

    /// Replace the whole plan
    pub fn import(&mut self, canvas: CanvasState) {
        self.tables = canvas.tables;
        self.lines = canvas.lines;
        self.selected = None;
        self.sync.clear();
    }
}
