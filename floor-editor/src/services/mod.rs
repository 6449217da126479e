//! Remote services - table states, chairs and the menu on the POS
//!
//! Every service holds the injected `Arc<dyn OnslipApi>` and issues plain
//! sequential requests: no retries, no caching across calls.

pub mod chairs;
pub mod menu;
pub mod states;

pub use chairs::ChairService;
pub use menu::{MenuProduct, MenuService, PaymentOutcome};
pub use states::{StateChange, TableStateService};

use crate::core::ServiceResult;
use onslip_client::{Filter, LabelCategory, LabelCategoryCreate, OnslipApi, RemoteId, StateTag};
use shared::models::OrderId;

/// Whether an id attached to an order is that order's state holder resource
///
/// Attachments mix resource ids and tab ids, and the two id ranges overlap,
/// so an id is a holder only when the resource it names carries this
/// order's state tag.
pub(crate) async fn is_state_holder(api: &dyn OnslipApi, order_id: OrderId, id: RemoteId) -> ServiceResult<bool> {
    match api.get_resource(id).await {
        Ok(resource) => Ok(StateTag::decode_for(order_id, &resource.name).is_some()),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Find a label category by name, creating it when missing
pub(crate) async fn ensure_label_category(api: &dyn OnslipApi, name: &str) -> ServiceResult<LabelCategory> {
    let existing = api.list_label_categories(Some(&Filter::name(name))).await?;
    if let Some(category) = existing.into_iter().find(|c| c.name == name) {
        tracing::debug!(category = %name, id = category.id, "Label category already exists");
        return Ok(category);
    }

    let category = api
        .add_label_category(&LabelCategoryCreate { name: name.to_string() })
        .await?;
    tracing::info!(category = %name, id = category.id, "Label category added");
    Ok(category)
}
