//! In-memory `OnslipApi`
//!
//! Behaves like the remote service for the operations the editor uses:
//! sequential ids per entity type (a tab and a resource can share an id),
//! `NotFound` for missing entities, PATCH semantics for updates. Every call is counted so tests can assert that validation
//! happened before any remote traffic.

use crate::api::{Filter, OnslipApi};
use crate::types::*;
use crate::{ClientError, ClientResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Store {
    last_ids: HashMap<&'static str, RemoteId>,
    orders: BTreeMap<RemoteId, Order>,
    resources: BTreeMap<RemoteId, Resource>,
    labels: BTreeMap<RemoteId, Label>,
    label_categories: BTreeMap<RemoteId, LabelCategory>,
    locations: BTreeMap<RemoteId, Location>,
    tabs: BTreeMap<RemoteId, Tab>,
    products: BTreeMap<RemoteId, Product>,
    product_groups: BTreeMap<RemoteId, ProductGroup>,
}

impl Store {
    fn next_id(&mut self, kind: &'static str) -> RemoteId {
        let last = self.last_ids.entry(kind).or_default();
        *last += 1;
        *last
    }
}

#[derive(Debug, Default)]
pub struct MemoryApi {
    store: Mutex<Store>,
    calls: AtomicUsize,
    failing: Mutex<HashSet<&'static str>>,
}

fn not_found(kind: &str, id: RemoteId) -> ClientError {
    ClientError::NotFound(format!("{} {} not found", kind, id))
}

fn matches(filter: Option<&Filter>, name: &str, category: Option<RemoteId>) -> bool {
    match filter {
        None => true,
        Some(Filter::NameEquals(expected)) => name == expected,
        Some(Filter::LabelCategory(id)) => category == Some(*id),
        Some(Filter::Raw(q)) => name.contains(q.as_str()),
    }
}

fn lookup<T: Clone>(map: &BTreeMap<RemoteId, T>, kind: &str, id: RemoteId) -> ClientResult<T> {
    map.get(&id).cloned().ok_or_else(|| not_found(kind, id))
}

fn delete<T>(map: &mut BTreeMap<RemoteId, T>, kind: &str, id: RemoteId) -> ClientResult<()> {
    map.remove(&id).map(|_| ()).ok_or_else(|| not_found(kind, id))
}

impl MemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of API calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }

    /// Make every later call to `operation` (e.g. `"add_order"`) fail
    pub fn fail_on(&self, operation: &'static str) {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(operation);
    }

    pub fn clear_failures(&self) {
        self.failing.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Add a product group; the API itself offers no way to create one
    pub fn insert_product_group(&self, name: impl Into<String>, item_type: Option<ItemType>) -> ProductGroup {
        let mut store = self.lock();
        let group = ProductGroup {
            id: store.next_id("product_group"),
            name: name.into(),
            item_type,
        };
        store.product_groups.insert(group.id, group.clone());
        group
    }

    /// Flag an order as deleted the way the POS does for voided orders
    pub fn mark_order_deleted(&self, id: RemoteId) -> bool {
        match self.lock().orders.get_mut(&id) {
            Some(order) => {
                order.deleted = Some(chrono::Utc::now().to_rfc3339());
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Count the call and apply injected failures
    fn enter(&self, operation: &'static str) -> ClientResult<MutexGuard<'_, Store>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failing = self.failing.lock().unwrap_or_else(|e| e.into_inner());
        if failing.contains(operation) {
            return Err(ClientError::Internal(format!("{} failed", operation)));
        }
        drop(failing);
        Ok(self.lock())
    }
}

#[async_trait]
impl OnslipApi for MemoryApi {
    async fn list_orders(&self) -> ClientResult<Vec<Order>> {
        Ok(self.enter("list_orders")?.orders.values().cloned().collect())
    }

    async fn get_order(&self, id: RemoteId) -> ClientResult<Order> {
        lookup(&self.enter("get_order")?.orders, "Order", id)
    }

    async fn add_order(&self, order: &OrderCreate) -> ClientResult<Order> {
        let mut store = self.enter("add_order")?;
        let order = Order {
            id: store.next_id("order"),
            name: order.name.clone(),
            location: Some(order.location),
            state: Some(order.state.clone()),
            resources: Vec::new(),
            deleted: None,
        };
        store.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn update_order(&self, id: RemoteId, update: &OrderUpdate) -> ClientResult<Order> {
        let mut store = self.enter("update_order")?;
        let order = store.orders.get_mut(&id).ok_or_else(|| not_found("Order", id))?;
        if let Some(name) = &update.name {
            order.name = name.clone();
        }
        if let Some(state) = &update.state {
            order.state = Some(state.clone());
        }
        if let Some(resources) = &update.resources {
            order.resources = resources.clone();
        }
        Ok(order.clone())
    }

    async fn remove_order(&self, id: RemoteId) -> ClientResult<()> {
        delete(&mut self.enter("remove_order")?.orders, "Order", id)
    }

    async fn list_resources(&self, filter: Option<&Filter>) -> ClientResult<Vec<Resource>> {
        let store = self.enter("list_resources")?;
        Ok(store
            .resources
            .values()
            .filter(|r| matches(filter, &r.name, None))
            .cloned()
            .collect())
    }

    async fn get_resource(&self, id: RemoteId) -> ClientResult<Resource> {
        lookup(&self.enter("get_resource")?.resources, "Resource", id)
    }

    async fn add_resource(&self, resource: &ResourceCreate) -> ClientResult<Resource> {
        let mut store = self.enter("add_resource")?;
        let resource = Resource {
            id: store.next_id("resource"),
            name: resource.name.clone(),
            location: resource.location,
            labels: resource.labels.clone(),
        };
        store.resources.insert(resource.id, resource.clone());
        Ok(resource)
    }

    async fn update_resource(&self, id: RemoteId, update: &ResourceUpdate) -> ClientResult<Resource> {
        let mut store = self.enter("update_resource")?;
        let resource = store
            .resources
            .get_mut(&id)
            .ok_or_else(|| not_found("Resource", id))?;
        if let Some(name) = &update.name {
            resource.name = name.clone();
        }
        if let Some(labels) = &update.labels {
            resource.labels = labels.clone();
        }
        Ok(resource.clone())
    }

    async fn remove_resource(&self, id: RemoteId) -> ClientResult<()> {
        delete(&mut self.enter("remove_resource")?.resources, "Resource", id)
    }

    async fn list_labels(&self, filter: Option<&Filter>) -> ClientResult<Vec<Label>> {
        let store = self.enter("list_labels")?;
        Ok(store
            .labels
            .values()
            .filter(|l| matches(filter, &l.name, l.label_category))
            .cloned()
            .collect())
    }

    async fn get_label(&self, id: RemoteId) -> ClientResult<Label> {
        lookup(&self.enter("get_label")?.labels, "Label", id)
    }

    async fn add_label(&self, label: &LabelCreate) -> ClientResult<Label> {
        let mut store = self.enter("add_label")?;
        let label = Label {
            id: store.next_id("label"),
            name: label.name.clone(),
            label_category: Some(label.label_category),
        };
        store.labels.insert(label.id, label.clone());
        Ok(label)
    }

    async fn remove_label(&self, id: RemoteId) -> ClientResult<()> {
        delete(&mut self.enter("remove_label")?.labels, "Label", id)
    }

    async fn list_label_categories(&self, filter: Option<&Filter>) -> ClientResult<Vec<LabelCategory>> {
        let store = self.enter("list_label_categories")?;
        Ok(store
            .label_categories
            .values()
            .filter(|c| matches(filter, &c.name, None))
            .cloned()
            .collect())
    }

    async fn add_label_category(&self, category: &LabelCategoryCreate) -> ClientResult<LabelCategory> {
        let mut store = self.enter("add_label_category")?;
        let category = LabelCategory {
            id: store.next_id("label_category"),
            name: category.name.clone(),
        };
        store.label_categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn list_locations(&self) -> ClientResult<Vec<Location>> {
        Ok(self.enter("list_locations")?.locations.values().cloned().collect())
    }

    async fn add_location(&self, location: &LocationCreate) -> ClientResult<Location> {
        let mut store = self.enter("add_location")?;
        let location = Location {
            id: store.next_id("location"),
            name: location.name.clone(),
        };
        store.locations.insert(location.id, location.clone());
        Ok(location)
    }

    async fn list_tabs(&self) -> ClientResult<Vec<Tab>> {
        Ok(self.enter("list_tabs")?.tabs.values().cloned().collect())
    }

    async fn get_tab(&self, id: RemoteId) -> ClientResult<Tab> {
        lookup(&self.enter("get_tab")?.tabs, "Tab", id)
    }

    async fn add_tab(&self, tab: &TabCreate) -> ClientResult<Tab> {
        let mut store = self.enter("add_tab")?;
        let tab = Tab {
            id: store.next_id("tab"),
            name: tab.name.clone(),
            labels: tab.labels.clone(),
            items: Vec::new(),
        };
        store.tabs.insert(tab.id, tab.clone());
        Ok(tab)
    }

    async fn update_tab(&self, id: RemoteId, update: &TabUpdate) -> ClientResult<Tab> {
        let mut store = self.enter("update_tab")?;
        let tab = store.tabs.get_mut(&id).ok_or_else(|| not_found("Tab", id))?;
        if let Some(name) = &update.name {
            tab.name = Some(name.clone());
        }
        if let Some(labels) = &update.labels {
            tab.labels = labels.clone();
        }
        if let Some(items) = &update.items {
            tab.items = items.clone();
        }
        Ok(tab.clone())
    }

    async fn remove_tab(&self, id: RemoteId) -> ClientResult<()> {
        delete(&mut self.enter("remove_tab")?.tabs, "Tab", id)
    }

    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        Ok(self.enter("list_products")?.products.values().cloned().collect())
    }

    async fn get_product(&self, id: RemoteId) -> ClientResult<Product> {
        lookup(&self.enter("get_product")?.products, "Product", id)
    }

    async fn add_product(&self, product: &ProductCreate) -> ClientResult<Product> {
        let mut store = self.enter("add_product")?;
        let product = Product {
            id: store.next_id("product"),
            name: product.name.clone(),
            product_group: Some(product.product_group),
            price: Some(product.price),
        };
        store.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: RemoteId, update: &ProductCreate) -> ClientResult<Product> {
        let mut store = self.enter("update_product")?;
        let product = store
            .products
            .get_mut(&id)
            .ok_or_else(|| not_found("Product", id))?;
        product.name = update.name.clone();
        product.product_group = Some(update.product_group);
        product.price = Some(update.price);
        Ok(product.clone())
    }

    async fn remove_product(&self, id: RemoteId) -> ClientResult<()> {
        delete(&mut self.enter("remove_product")?.products, "Product", id)
    }

    async fn list_product_groups(&self) -> ClientResult<Vec<ProductGroup>> {
        Ok(self.enter("list_product_groups")?.product_groups.values().cloned().collect())
    }

    async fn get_product_group(&self, id: RemoteId) -> ClientResult<ProductGroup> {
        lookup(&self.enter("get_product_group")?.product_groups, "Product group", id)
    }
}
