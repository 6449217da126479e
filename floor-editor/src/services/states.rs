//! Table workflow states on the POS
//!
//! The vocabulary lives as labels in the `table-states` category, collected
//! on the `table-states-resource` resource. Each table's order owns one
//! state holder resource whose name carries the current state.

use super::{ensure_label_category, is_state_holder};
use crate::core::ServiceResult;
use onslip_client::tags::{STATE_CATEGORY, STATES_LOCATION, STATES_RESOURCE};
use onslip_client::{
    Filter, LabelCreate, Location, LocationCreate, OnslipApi, Order, OrderCreate, OrderUpdate, RemoteId, Resource,
    ResourceCreate, ResourceUpdate, StateTag,
};
use shared::error::{AppError, ErrorCode};
use shared::models::OrderId;
use shared::state::{Direction, StateError, StateSequence, TableState};
use std::collections::HashSet;
use std::sync::Arc;

/// State the POS order itself is created in
const ORDER_STATE_ACTIVE: &str = "active";

/// One state holder moved to a new state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub resource_id: RemoteId,
    pub from: Option<TableState>,
    pub to: TableState,
}

pub struct TableStateService {
    api: Arc<dyn OnslipApi>,
}

impl TableStateService {
    pub fn new(api: Arc<dyn OnslipApi>) -> Self {
        Self { api }
    }

    /// Install `states` as the workflow vocabulary
    ///
    /// Creates whatever is missing (category, labels, location, resource),
    /// removes labels no longer listed and points the vocabulary resource at
    /// the remaining labels. Returns the installed sequence.
    pub async fn install_states(&self, states: &[String]) -> ServiceResult<StateSequence> {
        if states.is_empty() {
            return Err(StateError::Empty.into());
        }
        for state in states {
            state.parse::<TableState>().map_err(|_| {
                AppError::validation(format!("Invalid state name \"{}\"", state))
            })?;
        }

        let category = ensure_label_category(self.api.as_ref(), STATE_CATEGORY).await?;
        let category_filter = Filter::LabelCategory(category.id);
        let existing = self.api.list_labels(Some(&category_filter)).await?;

        for state in states {
            if existing.iter().any(|l| &l.name == state) {
                tracing::debug!(state = %state, "State label already exists");
                continue;
            }
            let label = self
                .api
                .add_label(&LabelCreate {
                    name: state.clone(),
                    label_category: category.id,
                })
                .await?;
            tracing::info!(state = %state, id = label.id, "State label added");
        }

        for label in existing.iter().filter(|l| !states.contains(&l.name)) {
            self.api.remove_label(label.id).await?;
            tracing::info!(state = %label.name, "Deleted obsolete state label");
        }

        let current = self.api.list_labels(Some(&category_filter)).await?;
        let label_ids: Vec<RemoteId> = current.iter().map(|l| l.id).collect();

        match self.vocabulary_resource().await? {
            Some(resource) => {
                self.api
                    .update_resource(
                        resource.id,
                        &ResourceUpdate {
                            labels: Some(label_ids),
                            ..Default::default()
                        },
                    )
                    .await?;
                tracing::info!(resource_id = resource.id, "Updated state vocabulary resource");
            }
            None => {
                let location = self.ensure_location().await?;
                let resource = self
                    .api
                    .add_resource(&ResourceCreate {
                        name: STATES_RESOURCE.to_string(),
                        location: Some(location.id),
                        labels: label_ids,
                    })
                    .await?;
                tracing::info!(resource_id = resource.id, "Created state vocabulary resource");
            }
        }

        Ok(StateSequence::from_names(current.into_iter().map(|l| l.name)))
    }

    async fn vocabulary_resource(&self) -> ServiceResult<Option<Resource>> {
        let resources = self.api.list_resources(Some(&Filter::name(STATES_RESOURCE))).await?;
        Ok(resources.into_iter().find(|r| r.name == STATES_RESOURCE))
    }

    /// Read the installed vocabulary, ordered by rank
    ///
    /// Empty when nothing has been installed yet.
    pub async fn fetch_states(&self) -> ServiceResult<StateSequence> {
        let Some(resource) = self.vocabulary_resource().await? else {
            tracing::error!("Table states resource not found");
            return Ok(StateSequence::default());
        };

        let mut names = Vec::with_capacity(resource.labels.len());
        for label_id in &resource.labels {
            names.push(self.api.get_label(*label_id).await?.name);
        }

        let states = StateSequence::from_names(names);
        tracing::debug!(states = ?states.names(), "Fetched table states");
        Ok(states)
    }

    /// The location anchoring state resources, if installed
    pub async fn find_location(&self) -> ServiceResult<Option<Location>> {
        let locations = self.api.list_locations().await?;
        Ok(locations.into_iter().find(|l| l.name == STATES_LOCATION))
    }

    pub async fn ensure_location(&self) -> ServiceResult<Location> {
        if let Some(location) = self.find_location().await? {
            return Ok(location);
        }
        let location = self
            .api
            .add_location(&LocationCreate {
                name: STATES_LOCATION.to_string(),
            })
            .await?;
        tracing::info!(location_id = location.id, "Location created");
        Ok(location)
    }

    /// Create an order plus its state holder in the "no state" state
    pub async fn create_order(&self, name: &str, location: RemoteId) -> ServiceResult<OrderId> {
        let order = self
            .api
            .add_order(&OrderCreate {
                name: name.to_string(),
                location,
                state: ORDER_STATE_ACTIVE.to_string(),
            })
            .await?;
        tracing::info!(order_id = order.id, name = %name, "Created order");

        let holder = self
            .api
            .add_resource(&ResourceCreate {
                name: StateTag::new(order.id, None).encode(),
                location: Some(location),
                labels: Vec::new(),
            })
            .await?;

        self.api
            .update_order(
                order.id,
                &OrderUpdate {
                    resources: Some(vec![holder.id]),
                    ..Default::default()
                },
            )
            .await?;
        tracing::info!(order_id = order.id, resource_id = holder.id, "Created state resource for order");

        Ok(order.id)
    }

    /// State holders attached to an order
    ///
    /// Order resources also list chair tabs. A tab id either answers 404 or
    /// names some other resource without this order's tag; both are skipped.
    async fn state_holders(&self, order: &Order) -> ServiceResult<Vec<(Resource, StateTag)>> {
        let mut holders = Vec::new();
        for resource_id in &order.resources {
            if holders.iter().any(|(r, _): &(Resource, StateTag)| r.id == *resource_id) {
                continue;
            }
            let resource = match self.api.get_resource(*resource_id).await {
                Ok(resource) => resource,
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e.into()),
            };
            match StateTag::decode_for(order.id, &resource.name) {
                Some(tag) => holders.push((resource, tag)),
                None => tracing::debug!(
                    order_id = order.id,
                    resource_id = resource.id,
                    "Attachment is not a state holder"
                ),
            }
        }
        Ok(holders)
    }

    /// Current state of an order; `None` when it has none yet
    pub async fn order_state(&self, order_id: OrderId) -> ServiceResult<Option<TableState>> {
        let order = self.api.get_order(order_id).await?;
        let holders = self.state_holders(&order).await?;
        Ok(holders.into_iter().next().and_then(|(_, tag)| tag.state))
    }

    /// Move every state holder of an order one step in `direction`
    ///
    /// A holder whose state is not in the vocabulary is logged and left
    /// alone; the others still move.
    pub async fn change_state(&self, order_id: OrderId, direction: Direction) -> ServiceResult<Vec<StateChange>> {
        let order = self.api.get_order(order_id).await?;
        if order.resources.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::StatesMissing,
                format!("Order {} does not have a state resource", order_id),
            )
            .into());
        }

        let states = self.fetch_states().await?;
        if states.is_empty() {
            return Err(StateError::Empty.into());
        }

        let mut changes = Vec::new();
        for (resource, tag) in self.state_holders(&order).await? {
            let next = match states.advance(tag.state.as_ref(), direction) {
                Ok(next) => next,
                Err(StateError::Unknown(current)) => {
                    tracing::error!(order_id, state = %current, "Current state not found");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            self.api
                .update_resource(
                    resource.id,
                    &ResourceUpdate {
                        name: Some(StateTag::new(order_id, Some(next.clone())).encode()),
                        ..Default::default()
                    },
                )
                .await?;

            tracing::info!(
                order_id,
                from = %tag.state.as_ref().map(ToString::to_string).unwrap_or_else(|| "null".into()),
                to = %next,
                "Order state changed"
            );
            changes.push(StateChange {
                resource_id: resource.id,
                from: tag.state,
                to: next,
            });
        }

        Ok(changes)
    }

    /// Remove an order and everything attached to it
    ///
    /// Attachments that fail to delete are logged; the order itself is
    /// already gone by then.
    pub async fn delete_order(&self, order_id: OrderId) -> ServiceResult<()> {
        let order = self.api.get_order(order_id).await?;
        self.api.remove_order(order_id).await?;
        tracing::info!(order_id, "Deleted order");

        let mut holders = HashSet::new();
        for resource_id in &order.resources {
            let lookup = if holders.contains(resource_id) {
                Ok(false)
            } else {
                is_state_holder(self.api.as_ref(), order_id, *resource_id).await
            };
            let holder = match lookup {
                Ok(holder) => holder,
                Err(e) => {
                    tracing::warn!(order_id, resource_id, error = %e, "Failed to look up order resource");
                    continue;
                }
            };
            let removed = if holder {
                holders.insert(*resource_id);
                self.api.remove_resource(*resource_id).await
            } else {
                self.api.remove_tab(*resource_id).await
            };
            match removed {
                Ok(()) => tracing::info!(order_id, resource_id, holder, "Deleted order resource"),
                Err(e) => tracing::warn!(order_id, resource_id, error = %e, "Failed to delete order resource"),
            }
        }
        Ok(())
    }

    /// Orders not flagged as deleted
    pub async fn list_active_orders(&self) -> ServiceResult<Vec<Order>> {
        let orders = self.api.list_orders().await?;
        let active: Vec<Order> = orders.into_iter().filter(|o| !o.is_deleted()).collect();
        tracing::debug!(count = active.len(), "Active orders");
        Ok(active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onslip_client::mock::MemoryApi;
    use shared::state::DEFAULT_TABLE_STATES;

    fn default_states() -> Vec<String> {
        DEFAULT_TABLE_STATES.iter().map(|s| s.to_string()).collect()
    }

    fn service() -> (Arc<MemoryApi>, TableStateService) {
        let api = Arc::new(MemoryApi::new());
        (api.clone(), TableStateService::new(api))
    }

    #[tokio::test]
    async fn test_install_and_fetch() {
        let (_, service) = service();
        let installed = service.install_states(&default_states()).await.unwrap();
        assert_eq!(installed.len(), 10);

        let fetched = service.fetch_states().await.unwrap();
        assert_eq!(fetched.names(), default_states());
        assert!(service.find_location().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_reinstall_removes_obsolete_labels() {
        let (_, service) = service();
        service.install_states(&default_states()).await.unwrap();

        let smaller = vec!["1:ready".to_string(), "2:seated".to_string()];
        service.install_states(&smaller).await.unwrap();

        assert_eq!(service.fetch_states().await.unwrap().names(), smaller);
    }

    #[tokio::test]
    async fn test_install_rejects_bad_input_without_calls() {
        let (api, service) = service();
        assert!(service.install_states(&[]).await.is_err());
        assert!(service.install_states(&["null".to_string()]).await.is_err());
        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_without_install_is_empty() {
        let (_, service) = service();
        assert!(service.fetch_states().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_order_state_cycle() {
        let (_, service) = service();
        service.install_states(&default_states()).await.unwrap();
        let location = service.ensure_location().await.unwrap();
        let order_id = service.create_order("T-1", location.id).await.unwrap();

        assert_eq!(service.order_state(order_id).await.unwrap(), None);

        let changes = service.change_state(order_id, Direction::Next).await.unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].to.to_string(), "1:ready");
        assert_eq!(
            service.order_state(order_id).await.unwrap().unwrap().to_string(),
            "1:ready"
        );

        service.change_state(order_id, Direction::Previous).await.unwrap();
        assert_eq!(
            service.order_state(order_id).await.unwrap().unwrap().to_string(),
            "10:cleaned"
        );
    }

    #[tokio::test]
    async fn test_previous_from_null_is_last() {
        let (_, service) = service();
        service.install_states(&default_states()).await.unwrap();
        let location = service.ensure_location().await.unwrap();
        let order_id = service.create_order("T-2", location.id).await.unwrap();

        let changes = service.change_state(order_id, Direction::Previous).await.unwrap();
        assert_eq!(changes[0].from, None);
        assert_eq!(changes[0].to.to_string(), "10:cleaned");
    }

    #[tokio::test]
    async fn test_change_without_vocabulary_fails() {
        let (_, service) = service();
        let location = service.ensure_location().await.unwrap();
        let order_id = service.create_order("T-3", location.id).await.unwrap();

        let err = service.change_state(order_id, Direction::Next).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::StatesMissing);
    }

    #[tokio::test]
    async fn test_delete_order_removes_state_resource() {
        let (api, service) = service();
        let location = service.ensure_location().await.unwrap();
        let order_id = service.create_order("T-4", location.id).await.unwrap();
        let holder = api.get_order(order_id).await.unwrap().resources[0];

        service.delete_order(order_id).await.unwrap();
        assert!(api.get_order(order_id).await.unwrap_err().is_not_found());
        assert!(api.get_resource(holder).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_order_keeps_resource_sharing_a_tab_id() {
        let (api, service) = service();
        let unrelated = api
            .add_resource(&ResourceCreate {
                name: STATES_RESOURCE.to_string(),
                location: None,
                labels: vec![],
            })
            .await
            .unwrap();
        let location = service.ensure_location().await.unwrap();
        let order_id = service.create_order("T-4", location.id).await.unwrap();
        let holder = api.get_order(order_id).await.unwrap().resources[0];

        let tab = api.add_tab(&onslip_client::TabCreate { name: None, labels: vec![] }).await.unwrap();
        assert_eq!(tab.id, unrelated.id);
        api.update_order(
            order_id,
            &OrderUpdate {
                resources: Some(vec![holder, tab.id]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        service.delete_order(order_id).await.unwrap();
        assert!(api.get_tab(tab.id).await.unwrap_err().is_not_found());
        assert!(api.get_resource(holder).await.unwrap_err().is_not_found());
        assert_eq!(api.get_resource(unrelated.id).await.unwrap().name, STATES_RESOURCE);
    }

    #[tokio::test]
    async fn test_list_active_orders_skips_deleted() {
        let (api, service) = service();
        let location = service.ensure_location().await.unwrap();
        let kept = service.create_order("T-5", location.id).await.unwrap();
        let voided = service.create_order("T-6", location.id).await.unwrap();
        api.mark_order_deleted(voided);

        let active = service.list_active_orders().await.unwrap();
        assert_eq!(active.iter().map(|o| o.id).collect::<Vec<_>>(), vec![kept]);
    }
}
