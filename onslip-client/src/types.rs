//! Onslip 360 wire types
//!
//! Field names follow the API's kebab-case JSON. Optional fields are left
//! out of request bodies so a PATCH only touches what it names.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Remote entity id
pub type RemoteId = i64;

// ========== Orders ==========

/// A seating session; one per table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Order {
    pub id: RemoteId,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<RemoteId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Attached resources: the state holder and the chair tabs
    #[serde(default)]
    pub resources: Vec<RemoteId>,
    /// Set once the order was removed on the POS side
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<String>,
}

impl Order {
    pub fn is_deleted(&self) -> bool {
        self.deleted.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OrderCreate {
    pub name: String,
    pub location: RemoteId,
    pub state: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OrderUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<RemoteId>>,
}

// ========== Resources ==========

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Resource {
    pub id: RemoteId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<RemoteId>,
    #[serde(default)]
    pub labels: Vec<RemoteId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResourceCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<RemoteId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<RemoteId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResourceUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<RemoteId>>,
}

// ========== Labels ==========

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Label {
    pub id: RemoteId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_category: Option<RemoteId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LabelCreate {
    pub name: String,
    pub label_category: RemoteId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LabelCategory {
    pub id: RemoteId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LabelCategoryCreate {
    pub name: String,
}

// ========== Locations ==========

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Location {
    pub id: RemoteId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LocationCreate {
    pub name: String,
}

// ========== Tabs ==========

/// Kind of a sold item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemType {
    #[default]
    Goods,
    Service,
    Giftcard,
    Deposit,
    #[serde(other)]
    Other,
}

/// One line on a tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TabItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<RemoteId>,
    #[serde(default)]
    pub product_name: String,
    #[serde(rename = "type", default)]
    pub item_type: ItemType,
    pub quantity: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl TabItem {
    pub fn price_or_zero(&self) -> Decimal {
        self.price.unwrap_or(Decimal::ZERO)
    }
}

/// A guest's bill; backs one chair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Tab {
    pub id: RemoteId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub labels: Vec<RemoteId>,
    #[serde(default)]
    pub items: Vec<TabItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TabCreate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub labels: Vec<RemoteId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TabUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<RemoteId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<TabItem>>,
}

// ========== Menu ==========

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Product {
    pub id: RemoteId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_group: Option<RemoteId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
}

/// Body for both creating and replacing a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProductCreate {
    pub name: String,
    pub product_group: RemoteId,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProductGroup {
    pub id: RemoteId,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<ItemType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_uses_kebab_case_and_defaults() {
        let order: Order = serde_json::from_str(r#"{"id": 7, "name": "T-1", "location": 3}"#).unwrap();
        assert_eq!(order.id, 7);
        assert!(order.resources.is_empty());
        assert!(!order.is_deleted());

        let deleted: Order =
            serde_json::from_str(r#"{"id": 8, "deleted": "2024-01-01T00:00:00Z"}"#).unwrap();
        assert!(deleted.is_deleted());
    }

    #[test]
    fn test_update_omits_unset_fields() {
        let update = OrderUpdate {
            resources: Some(vec![1, 2]),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"resources":[1,2]}"#);
    }

    #[test]
    fn test_label_category_field_name() {
        let body = LabelCreate {
            name: "1:ready".to_string(),
            label_category: 4,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["label-category"], 4);
    }

    #[test]
    fn test_tab_item_wire_form() {
        let item: TabItem = serde_json::from_str(
            r#"{"product": 2, "product-name": "Pasta", "type": "goods", "quantity": 1, "price": 129.5}"#,
        )
        .unwrap();
        assert_eq!(item.product_name, "Pasta");
        assert_eq!(item.item_type, ItemType::Goods);
        assert_eq!(item.price_or_zero(), Decimal::new(1295, 1));

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["product-name"], "Pasta");
        assert_eq!(json["type"], "goods");
        assert!(json.get("comment").is_none());
    }

    #[test]
    fn test_unknown_item_type() {
        let group: ProductGroup =
            serde_json::from_str(r#"{"id": 1, "name": "Misc", "type": "something-new"}"#).unwrap();
        assert_eq!(group.item_type, Some(ItemType::Other));
    }
}
