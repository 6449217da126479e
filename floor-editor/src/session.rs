//! Editor coupled to the POS
//!
//! Local table state changes only after the POS confirms. While a request
//! is in flight the table is marked [`SyncStatus::Pending`]; a failure marks
//! it [`SyncStatus::Failed`] and leaves the table as it was.

use crate::core::{ServiceError, ServiceResult};
use crate::editor::Editor;
use crate::services::{ChairService, MenuService, TableStateService};
use onslip_client::OnslipApi;
use shared::error::{AppError, ErrorCode};
use shared::models::{Chair, OrderId, TableId};
use shared::state::{Direction, TableState};
use std::sync::Arc;

/// Remote confirmation status of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Pending,
    Confirmed,
    Failed(String),
}

pub struct FloorSession {
    editor: Editor,
    states: TableStateService,
    chairs: ChairService,
    menu: MenuService,
}

impl FloorSession {
    pub fn new(editor: Editor, api: Arc<dyn OnslipApi>) -> Self {
        Self {
            editor,
            states: TableStateService::new(api.clone()),
            chairs: ChairService::new(api.clone()),
            menu: MenuService::new(api),
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn into_editor(self) -> Editor {
        self.editor
    }

    pub fn states(&self) -> &TableStateService {
        &self.states
    }

    pub fn chairs(&self) -> &ChairService {
        &self.chairs
    }

    pub fn menu(&self) -> &MenuService {
        &self.menu
    }

    async fn create_remote_order(&self, name: &str) -> ServiceResult<OrderId> {
        let location = self.states.find_location().await?.ok_or_else(|| {
            AppError::with_message(ErrorCode::StatesMissing, "Location not available; install the table states first")
        })?;
        self.states.create_order(name, location.id).await
    }

    async fn advance_remote_state(&self, order_id: OrderId, direction: Direction) -> ServiceResult<Option<TableState>> {
        self.states.change_state(order_id, direction).await?;
        self.states.order_state(order_id).await
    }

    fn record_failure(&mut self, table_id: TableId, err: &ServiceError) {
        tracing::error!(table_id, error = %err, "Table sync failed");
        self.editor.set_sync(table_id, SyncStatus::Failed(err.to_string()));
    }

    /// Give a table its POS order, if it has none yet
    pub async fn initialize_table_order(&mut self, table_id: TableId) -> ServiceResult<OrderId> {
        let table = self
            .editor
            .table(table_id)
            .ok_or_else(|| AppError::table_not_found(table_id))?;
        if let Some(order_id) = table.order_id {
            return Ok(order_id);
        }
        let name = table.name.clone();

        self.editor.set_sync(table_id, SyncStatus::Pending);
        let created = self.create_remote_order(&name).await;

        match created {
            Ok(order_id) => {
                self.editor.confirm_order(table_id, order_id)?;
                tracing::info!(table_id, order_id, "Table order initialized");
                Ok(order_id)
            }
            Err(e) => {
                self.record_failure(table_id, &e);
                Err(e)
            }
        }
    }

    /// Step a table's state
    ///
    /// A table without an order only gets one, in the "no state" state.
    /// Otherwise the state is advanced on the POS and read back before the
    /// table is updated.
    pub async fn change_table_state(&mut self, table_id: TableId, direction: Direction) -> ServiceResult<Option<TableState>> {
        let table = self
            .editor
            .table(table_id)
            .ok_or_else(|| AppError::table_not_found(table_id))?;
        let Some(order_id) = table.order_id else {
            self.initialize_table_order(table_id).await?;
            return Ok(None);
        };

        self.editor.set_sync(table_id, SyncStatus::Pending);
        let changed = self.advance_remote_state(order_id, direction).await;

        match changed {
            Ok(state) => {
                self.editor.confirm_state(table_id, state.clone())?;
                Ok(state)
            }
            Err(e) => {
                self.record_failure(table_id, &e);
                Err(e)
            }
        }
    }

    /// Re-read a table's state from the POS
    pub async fn refresh_table_state(&mut self, table_id: TableId) -> ServiceResult<Option<TableState>> {
        let table = self
            .editor
            .table(table_id)
            .ok_or_else(|| AppError::table_not_found(table_id))?;
        let Some(order_id) = table.order_id else {
            return Ok(None);
        };

        match self.states.order_state(order_id).await {
            Ok(state) => {
                self.editor.confirm_state(table_id, state.clone())?;
                Ok(state)
            }
            Err(e) => {
                self.record_failure(table_id, &e);
                Err(e)
            }
        }
    }

    /// Delete a table locally and its order remotely
    ///
    /// The local delete stands even when the remote one fails.
    pub async fn delete_table(&mut self, table_id: TableId) -> ServiceResult<()> {
        let order_id = self.editor.delete_table(table_id)?;
        if let Some(order_id) = order_id
            && let Err(e) = self.states.delete_order(order_id).await
        {
            tracing::error!(table_id, order_id, error = %e, "Error deleting order from backend");
        }
        Ok(())
    }

    /// Chairs currently seated at a table
    pub async fn table_chairs(&self, table_id: TableId) -> ServiceResult<Vec<Chair>> {
        let table = self
            .editor
            .table(table_id)
            .ok_or_else(|| AppError::table_not_found(table_id))?;
        match table.order_id {
            Some(order_id) => self.chairs.table_chairs(order_id).await,
            None => Ok(Vec::new()),
        }
    }

    /// Seat a chair, checking the slot against the chairs already seated
    pub async fn create_chair(&self, table_id: TableId, name: Option<&str>, position: u32) -> ServiceResult<Chair> {
        let table = self
            .editor
            .table(table_id)
            .ok_or_else(|| AppError::table_not_found(table_id))?;
        let existing = self.table_chairs(table_id).await?;
        self.chairs.create_chair(table, &existing, name, position).await
    }
}
