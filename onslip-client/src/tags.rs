//! Name encodings stored on the POS
//!
//! The POS has no fields for table state, seat position or settlement, so
//! they are packed into entity names. Everything else in the workspace uses
//! the structured forms below.

use shared::models::{OrderId, Settlement};
use shared::state::{NULL_STATE, TableState};
use std::fmt;

/// Label category holding the workflow vocabulary
pub const STATE_CATEGORY: &str = "table-states";
/// Resource listing the vocabulary labels
pub const STATES_RESOURCE: &str = "table-states-resource";
/// Location anchoring all state resources
pub const STATES_LOCATION: &str = "table-states-location";
/// Label category for seat positions
pub const POSITION_CATEGORY: &str = "chair-positions";

const POSITION_PREFIX: &str = "chair-position-";

/// Current state of an order: `order-{id}-state:{state}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTag {
    pub order_id: OrderId,
    pub state: Option<TableState>,
}

impl StateTag {
    pub fn new(order_id: OrderId, state: Option<TableState>) -> Self {
        Self { order_id, state }
    }

    /// Name prefix shared by every state holder of `order_id`
    pub fn prefix(order_id: OrderId) -> String {
        format!("order-{}-state:", order_id)
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }

    pub fn decode(name: &str) -> Option<Self> {
        let rest = name.strip_prefix("order-")?;
        let (id, state) = rest.split_once("-state:")?;
        let order_id = id.parse().ok()?;
        Some(Self::new(order_id, TableState::parse_optional(state)))
    }

    /// Decode only if the name belongs to `order_id`
    pub fn decode_for(order_id: OrderId, name: &str) -> Option<Self> {
        Self::decode(name).filter(|tag| tag.order_id == order_id)
    }
}

impl fmt::Display for StateTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            Some(state) => write!(f, "{}{}", Self::prefix(self.order_id), state),
            None => write!(f, "{}{}", Self::prefix(self.order_id), NULL_STATE),
        }
    }
}

/// Seat slot label: `chair-position-{n}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionTag(pub u32);

impl PositionTag {
    pub fn encode(&self) -> String {
        self.to_string()
    }

    pub fn decode(name: &str) -> Option<Self> {
        name.strip_prefix(POSITION_PREFIX)?.parse().ok().map(PositionTag)
    }
}

impl fmt::Display for PositionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", POSITION_PREFIX, self.0)
    }
}

/// Settled tab name: `[PAID-{n}] {name}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaidName {
    pub settlement: Settlement,
    pub name: String,
}

impl PaidName {
    /// Name for a tab settling `chair_count` chairs, with the fallback
    /// used when the primary tab has no name
    pub fn for_payment(chair_count: u32, primary_name: Option<&str>) -> Self {
        let fallback = if chair_count > 1 { "Combined" } else { "Single" };
        let name = primary_name
            .filter(|n| !n.is_empty())
            .unwrap_or(fallback)
            .to_string();
        Self {
            settlement: Settlement {
                merged_count: chair_count,
            },
            name,
        }
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }

    pub fn decode(name: &str) -> Option<Self> {
        let rest = name.strip_prefix("[PAID-")?;
        let (count, rest) = rest.split_once(']')?;
        let merged_count = count.parse().ok()?;
        Some(Self {
            settlement: Settlement { merged_count },
            name: rest.strip_prefix(' ').unwrap_or(rest).to_string(),
        })
    }
}

impl fmt::Display for PaidName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[PAID-{}] {}", self.settlement.merged_count, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_tag_encoding() {
        let tag = StateTag::new(42, Some(TableState::new(Some(3), "drinks_ordered")));
        assert_eq!(tag.encode(), "order-42-state:3:drinks_ordered");
        assert_eq!(StateTag::decode("order-42-state:3:drinks_ordered"), Some(tag));

        let empty = StateTag::new(42, None);
        assert_eq!(empty.encode(), "order-42-state:null");
        assert_eq!(StateTag::decode("order-42-state:null"), Some(empty));
    }

    #[test]
    fn test_state_tag_rejects_other_names() {
        assert_eq!(StateTag::decode("table-states-resource"), None);
        assert_eq!(StateTag::decode("order-x-state:1:ready"), None);
        assert_eq!(StateTag::decode_for(7, "order-42-state:1:ready"), None);
        assert!(StateTag::decode_for(42, "order-42-state:1:ready").is_some());
    }

    #[test]
    fn test_position_tag() {
        assert_eq!(PositionTag(3).encode(), "chair-position-3");
        assert_eq!(PositionTag::decode("chair-position-11"), Some(PositionTag(11)));
        assert_eq!(PositionTag::decode("chair-position-"), None);
        assert_eq!(PositionTag::decode("1:ready"), None);
    }

    #[test]
    fn test_paid_name() {
        assert_eq!(PaidName::for_payment(3, Some("Anna")).encode(), "[PAID-3] Anna");
        assert_eq!(PaidName::for_payment(2, None).encode(), "[PAID-2] Combined");
        assert_eq!(PaidName::for_payment(1, Some("")).encode(), "[PAID-1] Single");

        let decoded = PaidName::decode("[PAID-2] Bob").unwrap();
        assert_eq!(decoded.settlement.merged_count, 2);
        assert_eq!(decoded.name, "Bob");
        assert_eq!(PaidName::decode("Bob"), None);
    }
}
