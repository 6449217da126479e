//! Chairs on the POS
//!
//! A chair is a tab attached to its table's order. The seat slot is a
//! `chair-position-{n}` label on the tab.

use super::{ensure_label_category, is_state_holder};
use crate::core::ServiceResult;
use onslip_client::tags::POSITION_CATEGORY;
use onslip_client::{Filter, Label, LabelCreate, OnslipApi, OrderUpdate, PaidName, PositionTag, RemoteId, Tab, TabCreate};
use shared::error::{AppError, ErrorCode};
use shared::models::{Chair, ChairId, OrderId, Table, check_seat_available};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Build a chair from its tab, given the names of all known labels
///
/// Returns `None` when the tab carries no position label.
pub fn chair_from_tab(tab: &Tab, label_names: &HashMap<RemoteId, String>, order_id: Option<OrderId>) -> Option<Chair> {
    let position = tab
        .labels
        .iter()
        .filter_map(|id| label_names.get(id))
        .find_map(|name| PositionTag::decode(name))?;

    let (name, settlement) = match tab.name.as_deref().and_then(PaidName::decode) {
        Some(paid) => (Some(paid.name), Some(paid.settlement)),
        None => (tab.name.clone(), None),
    };

    Some(Chair {
        chair_id: tab.id,
        position: position.0,
        order_id,
        name,
        settlement,
    })
}

pub struct ChairService {
    api: Arc<dyn OnslipApi>,
}

impl ChairService {
    pub fn new(api: Arc<dyn OnslipApi>) -> Self {
        Self { api }
    }

    async fn position_label(&self, position: u32) -> ServiceResult<Label> {
        let category = ensure_label_category(self.api.as_ref(), POSITION_CATEGORY).await?;
        let name = PositionTag(position).encode();

        let labels = self.api.list_labels(Some(&Filter::LabelCategory(category.id))).await?;
        if let Some(label) = labels.into_iter().find(|l| l.name == name) {
            return Ok(label);
        }

        let label = self
            .api
            .add_label(&LabelCreate {
                name,
                label_category: category.id,
            })
            .await?;
        tracing::debug!(position, label_id = label.id, "Position label added");
        Ok(label)
    }

    async fn label_names(&self) -> ServiceResult<HashMap<RemoteId, String>> {
        Ok(self
            .api
            .list_labels(None)
            .await?
            .into_iter()
            .map(|l| (l.id, l.name))
            .collect())
    }

    /// Seat a new chair at `position` on `table`
    ///
    /// The slot, occupancy, capacity and order are all checked against
    /// `existing_chairs` before anything is sent.
    pub async fn create_chair(
        &self,
        table: &Table,
        existing_chairs: &[Chair],
        name: Option<&str>,
        position: u32,
    ) -> ServiceResult<Chair> {
        check_seat_available(table, existing_chairs, position)?;
        let order_id = table.order_id.ok_or_else(|| {
            AppError::with_message(
                ErrorCode::TableHasNoOrder,
                format!("{} has no order yet", table.name),
            )
            .with_detail("table_id", table.id)
        })?;

        let label = self.position_label(position).await?;
        let tab = self
            .api
            .add_tab(&TabCreate {
                name: name.map(str::to_string),
                labels: vec![label.id],
            })
            .await?;

        let order = self.api.get_order(order_id).await?;
        let mut resources = order.resources;
        resources.push(tab.id);
        self.api
            .update_order(
                order_id,
                &OrderUpdate {
                    resources: Some(resources),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(order_id, chair_id = tab.id, position, "Chair created");
        Ok(Chair {
            chair_id: tab.id,
            position,
            order_id: Some(order_id),
            name: tab.name,
            settlement: None,
        })
    }

    /// Chairs seated at an order's table, in attachment order
    pub async fn table_chairs(&self, order_id: OrderId) -> ServiceResult<Vec<Chair>> {
        let order = self.api.get_order(order_id).await?;
        if order.resources.is_empty() {
            return Ok(Vec::new());
        }

        let label_names = self.label_names().await?;
        let mut chairs = Vec::new();
        let mut holders = HashSet::new();
        for resource_id in &order.resources {
            // a repeated id is the holder first, then a chair tab
            if !holders.contains(resource_id) && is_state_holder(self.api.as_ref(), order_id, *resource_id).await? {
                holders.insert(*resource_id);
                continue;
            }
            let tab = match self.api.get_tab(*resource_id).await {
                Ok(tab) => tab,
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e.into()),
            };
            match chair_from_tab(&tab, &label_names, Some(order_id)) {
                Some(chair) => chairs.push(chair),
                None => tracing::warn!(order_id, tab_id = tab.id, "Tab has no position label"),
            }
        }
        Ok(chairs)
    }

    /// Detach a chair from its order and delete its tab
    pub async fn remove_chair(&self, order_id: OrderId, chair_id: ChairId) -> ServiceResult<()> {
        let mut resources = self.api.get_order(order_id).await?.resources;
        // chairs are attached after the state holder, which may share the id
        let Some(index) = resources.iter().rposition(|id| *id == chair_id) else {
            return Err(AppError::with_message(
                ErrorCode::ChairNotFound,
                format!("Chair {} is not seated at order {}", chair_id, order_id),
            )
            .into());
        };

        self.api.remove_tab(chair_id).await?;
        resources.remove(index);
        self.api
            .update_order(
                order_id,
                &OrderUpdate {
                    resources: Some(resources),
                    ..Default::default()
                },
            )
            .await?;

        tracing::info!(order_id, chair_id, "Chair removed");
        Ok(())
    }

    /// Every tab that decodes as a chair, regardless of table
    pub async fn list_all_chairs(&self) -> ServiceResult<Vec<Chair>> {
        let tabs = self.api.list_tabs().await?;
        let label_names = self.label_names().await?;
        Ok(tabs
            .iter()
            .filter_map(|tab| chair_from_tab(tab, &label_names, None))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onslip_client::mock::MemoryApi;
    use shared::models::{TableDraft, create_table};

    fn table_with_order(order_id: OrderId) -> Table {
        let mut table = create_table(TableDraft {
            id: Some(1),
            capacity: Some(2),
            width: Some(120.0),
            height: Some(80.0),
            available_positions: Some(vec![0, 1, 2]),
            ..Default::default()
        });
        table.order_id = Some(order_id);
        table
    }

    async fn setup() -> (Arc<MemoryApi>, ChairService, Table) {
        let api = Arc::new(MemoryApi::new());
        let order = api
            .add_order(&onslip_client::OrderCreate {
                name: "T-1".into(),
                location: 1,
                state: "active".into(),
            })
            .await
            .unwrap();
        let service = ChairService::new(api.clone());
        (api, service, table_with_order(order.id))
    }

    #[tokio::test]
    async fn test_create_and_list_chairs() {
        let (_, service, table) = setup().await;
        let order_id = table.order_id.unwrap();

        let first = service.create_chair(&table, &[], Some("Anna"), 0).await.unwrap();
        let second = service
            .create_chair(&table, std::slice::from_ref(&first), None, 2)
            .await
            .unwrap();

        let chairs = service.table_chairs(order_id).await.unwrap();
        assert_eq!(chairs, vec![first, second]);
        assert_eq!(chairs[0].name.as_deref(), Some("Anna"));
        assert_eq!(chairs[1].display_name(), "Chair 3");
    }

    #[tokio::test]
    async fn test_position_label_is_reused() {
        let (api, service, table) = setup().await;
        let a = service.create_chair(&table, &[], None, 1).await.unwrap();
        service.remove_chair(table.order_id.unwrap(), a.chair_id).await.unwrap();
        service.create_chair(&table, &[], None, 1).await.unwrap();

        let labels = api.list_labels(None).await.unwrap();
        assert_eq!(labels.iter().filter(|l| l.name == "chair-position-1").count(), 1);
    }

    #[tokio::test]
    async fn test_rejections_make_no_calls() {
        let (api, service, table) = setup().await;
        let seated = service.create_chair(&table, &[], None, 0).await.unwrap();
        api.reset_calls();

        // not an available slot
        let err = service.create_chair(&table, &[], None, 5).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::PositionUnavailable);

        // occupied
        let err = service
            .create_chair(&table, std::slice::from_ref(&seated), None, 0)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::PositionOccupied);

        // at capacity
        let mut other = seated.clone();
        other.position = 1;
        let err = service.create_chair(&table, &[seated, other], None, 2).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CapacityReached);

        // no order
        let mut no_order = table.clone();
        no_order.order_id = None;
        let err = service.create_chair(&no_order, &[], None, 1).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::TableHasNoOrder);

        assert_eq!(api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_state_holder_is_not_a_chair() {
        let (api, service, table) = setup().await;
        let order_id = table.order_id.unwrap();
        let holder = api
            .add_resource(&onslip_client::ResourceCreate {
                name: format!("order-{}-state:null", order_id),
                location: Some(1),
                labels: vec![],
            })
            .await
            .unwrap();
        api.update_order(
            order_id,
            &OrderUpdate {
                resources: Some(vec![holder.id]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let chair = service.create_chair(&table, &[], None, 1).await.unwrap();
        let chairs = service.table_chairs(order_id).await.unwrap();
        assert_eq!(chairs, vec![chair]);
        assert_eq!(api.get_order(order_id).await.unwrap().resources.len(), 2);
    }

    #[tokio::test]
    async fn test_holder_sharing_an_id_with_another_tables_chair() {
        let (api, service, table) = setup().await;
        let order_id = table.order_id.unwrap();
        let other_order = api
            .add_order(&onslip_client::OrderCreate {
                name: "T-2".into(),
                location: 1,
                state: "active".into(),
            })
            .await
            .unwrap();
        let elsewhere = service
            .create_chair(&table_with_order(other_order.id), &[], None, 0)
            .await
            .unwrap();

        let holder = api
            .add_resource(&onslip_client::ResourceCreate {
                name: format!("order-{}-state:null", order_id),
                location: Some(1),
                labels: vec![],
            })
            .await
            .unwrap();
        assert_eq!(holder.id, elsewhere.chair_id);
        api.update_order(
            order_id,
            &OrderUpdate {
                resources: Some(vec![holder.id]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(service.table_chairs(order_id).await.unwrap().is_empty());
        assert_eq!(service.table_chairs(other_order.id).await.unwrap(), vec![elsewhere]);
    }

    #[tokio::test]
    async fn test_remove_unknown_chair() {
        let (_, service, table) = setup().await;
        let err = service.remove_chair(table.order_id.unwrap(), 999).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ChairNotFound);
    }

    #[test]
    fn test_chair_from_paid_tab() {
        let labels = HashMap::from([(4, "chair-position-2".to_string()), (5, "1:ready".to_string())]);
        let tab = Tab {
            id: 9,
            name: Some("[PAID-3] Bob".into()),
            labels: vec![5, 4],
            items: vec![],
        };
        let chair = chair_from_tab(&tab, &labels, Some(1)).unwrap();
        assert_eq!(chair.position, 2);
        assert_eq!(chair.name.as_deref(), Some("Bob"));
        assert_eq!(chair.settlement.unwrap().merged_count, 3);
        assert!(chair.is_paid());

        let unlabelled = Tab { labels: vec![5], ..tab };
        assert!(chair_from_tab(&unlabelled, &labels, None).is_none());
    }
}
