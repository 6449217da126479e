//! Chair model
//!
//! A chair is a seat bound to one slot of a table. In the POS it is a tab
//! holding the guest's itemized purchases.

use super::table::{OrderId, Table};
use crate::error::{AppError, AppResult, ErrorCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// POS tab identifier backing a chair
pub type ChairId = i64;

/// Marks a chair whose tab has been settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    /// Number of chairs paid together on this tab
    pub merged_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chair {
    pub chair_id: ChairId,
    /// Seat slot on the owning table
    pub position: u32,
    /// Owning table's order
    pub order_id: Option<OrderId>,
    pub name: Option<String>,
    /// Present once the chair has been paid
    pub settlement: Option<Settlement>,
}

impl Chair {
    pub fn is_paid(&self) -> bool {
        self.settlement.is_some()
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Chair {}", self.position + 1))
    }
}

/// Slots already holding a chair
pub fn occupied_positions(chairs: &[Chair]) -> BTreeSet<u32> {
    chairs.iter().map(|c| c.position).collect()
}

/// Check that a new chair may be seated at `position`
///
/// The slot must be available on the table, free, and the table must be
/// below capacity.
pub fn check_seat_available(table: &Table, chairs: &[Chair], position: u32) -> AppResult<()> {
    if !table.allows_position(position) {
        return Err(AppError::with_message(
            ErrorCode::PositionUnavailable,
            format!("Position {} is not available on {}", position, table.name),
        )
        .with_detail("position", position));
    }

    if chairs.iter().any(|c| c.position == position) {
        return Err(AppError::with_message(
            ErrorCode::PositionOccupied,
            format!("Position {} on {} is already occupied", position, table.name),
        )
        .with_detail("position", position));
    }

    if chairs.len() >= table.capacity as usize {
        return Err(AppError::with_message(
            ErrorCode::CapacityReached,
            format!("{} already seats {} guests", table.name, table.capacity),
        )
        .with_detail("capacity", table.capacity));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TableDraft, create_table};

    fn chair(id: ChairId, position: u32) -> Chair {
        Chair {
            chair_id: id,
            position,
            order_id: Some(1),
            name: None,
            settlement: None,
        }
    }

    fn table() -> Table {
        create_table(TableDraft {
            id: Some(1),
            capacity: Some(2),
            available_positions: Some(vec![0, 1, 2]),
            ..Default::default()
        })
    }

    #[test]
    fn test_seat_available() {
        assert!(check_seat_available(&table(), &[], 1).is_ok());
    }

    #[test]
    fn test_seat_outside_available_positions() {
        let err = check_seat_available(&table(), &[], 4).unwrap_err();
        assert_eq!(err.code, ErrorCode::PositionUnavailable);
    }

    #[test]
    fn test_seat_occupied() {
        let err = check_seat_available(&table(), &[chair(10, 1)], 1).unwrap_err();
        assert_eq!(err.code, ErrorCode::PositionOccupied);
    }

    #[test]
    fn test_capacity_reached() {
        let chairs = [chair(10, 0), chair(11, 1)];
        let err = check_seat_available(&table(), &chairs, 2).unwrap_err();
        assert_eq!(err.code, ErrorCode::CapacityReached);
    }

    #[test]
    fn test_occupied_positions() {
        let set = occupied_positions(&[chair(1, 4), chair(2, 0)]);
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![0, 4]);
    }

    #[test]
    fn test_display_name() {
        let mut c = chair(1, 2);
        assert_eq!(c.display_name(), "Chair 3");
        c.name = Some("Anna".into());
        assert_eq!(c.display_name(), "Anna");
        assert!(!c.is_paid());
    }
}
