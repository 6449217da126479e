//! Shared types for the floor editor
//!
//! Floor-plan domain used across the workspace: table, chair and wall
//! models, seat layout geometry, id allocation, the table workflow state
//! machine, the canvas export format and the error types.

pub mod canvas;
pub mod error;
pub mod layout;
pub mod models;
pub mod naming;
pub mod state;

// Re-exports
pub use canvas::CanvasState;
pub use error::{AppError, AppResult, ErrorCode};
pub use layout::{Point, SeatDistribution, SeatZone};
pub use models::{Chair, ChairId, Line, OrderId, Table, TableDraft, TableId, create_table};
pub use state::{Direction, StateSequence, TableState};
