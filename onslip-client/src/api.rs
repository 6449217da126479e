//! The Onslip 360 operations used by the floor editor

use crate::ClientResult;
use crate::types::*;
use async_trait::async_trait;

/// List query, sent as the `q` parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Entities whose name equals the value
    NameEquals(String),
    /// Labels in one label category
    LabelCategory(RemoteId),
    /// Query passed through verbatim
    Raw(String),
}

impl Filter {
    pub fn name(name: impl Into<String>) -> Self {
        Filter::NameEquals(name.into())
    }

    /// Query string value
    pub fn to_query(&self) -> String {
        match self {
            Filter::NameEquals(name) => format!("name={}", name),
            Filter::LabelCategory(id) => format!("label-category:{}", id),
            Filter::Raw(q) => q.clone(),
        }
    }
}

/// CRUD access to the POS
///
/// Object safe so callers can hold an `Arc<dyn OnslipApi>` and tests can
/// swap in the in-memory implementation.
#[async_trait]
pub trait OnslipApi: Send + Sync {
    // Orders
    async fn list_orders(&self) -> ClientResult<Vec<Order>>;
    async fn get_order(&self, id: RemoteId) -> ClientResult<Order>;
    async fn add_order(&self, order: &OrderCreate) -> ClientResult<Order>;
    async fn update_order(&self, id: RemoteId, update: &OrderUpdate) -> ClientResult<Order>;
    async fn remove_order(&self, id: RemoteId) -> ClientResult<()>;

    // Resources
    async fn list_resources(&self, filter: Option<&Filter>) -> ClientResult<Vec<Resource>>;
    async fn get_resource(&self, id: RemoteId) -> ClientResult<Resource>;
    async fn add_resource(&self, resource: &ResourceCreate) -> ClientResult<Resource>;
    async fn update_resource(&self, id: RemoteId, update: &ResourceUpdate) -> ClientResult<Resource>;
    async fn remove_resource(&self, id: RemoteId) -> ClientResult<()>;

    // Labels
    async fn list_labels(&self, filter: Option<&Filter>) -> ClientResult<Vec<Label>>;
    async fn get_label(&self, id: RemoteId) -> ClientResult<Label>;
    async fn add_label(&self, label: &LabelCreate) -> ClientResult<Label>;
    async fn remove_label(&self, id: RemoteId) -> ClientResult<()>;

    // Label categories
    async fn list_label_categories(&self, filter: Option<&Filter>) -> ClientResult<Vec<LabelCategory>>;
    async fn add_label_category(&self, category: &LabelCategoryCreate) -> ClientResult<LabelCategory>;

    // Locations
    async fn list_locations(&self) -> ClientResult<Vec<Location>>;
    async fn add_location(&self, location: &LocationCreate) -> ClientResult<Location>;

    // Tabs
    async fn list_tabs(&self) -> ClientResult<Vec<Tab>>;
    async fn get_tab(&self, id: RemoteId) -> ClientResult<Tab>;
    async fn add_tab(&self, tab: &TabCreate) -> ClientResult<Tab>;
    async fn update_tab(&self, id: RemoteId, update: &TabUpdate) -> ClientResult<Tab>;
    async fn remove_tab(&self, id: RemoteId) -> ClientResult<()>;

    // Products
    async fn list_products(&self) -> ClientResult<Vec<Product>>;
    async fn get_product(&self, id: RemoteId) -> ClientResult<Product>;
    async fn add_product(&self, product: &ProductCreate) -> ClientResult<Product>;
    async fn update_product(&self, id: RemoteId, product: &ProductCreate) -> ClientResult<Product>;
    async fn remove_product(&self, id: RemoteId) -> ClientResult<()>;

    // Product groups
    async fn list_product_groups(&self) -> ClientResult<Vec<ProductGroup>>;
    async fn get_product_group(&self, id: RemoteId) -> ClientResult<ProductGroup>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_query() {
        assert_eq!(Filter::name("table-states-resource").to_query(), "name=table-states-resource");
        assert_eq!(Filter::LabelCategory(12).to_query(), "label-category:12");
        assert_eq!(Filter::Raw("table-states".into()).to_query(), "table-states");
    }
}
