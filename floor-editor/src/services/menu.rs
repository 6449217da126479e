//! Menu and chair bills
//!
//! Products come from the POS catalogue; ordering puts them on the chair's
//! tab. Splitting and combined payment rewrite tabs in place.

use crate::core::ServiceResult;
use onslip_client::{
    OnslipApi, PaidName, Product, ProductCreate, ProductGroup, RemoteId, Tab, TabItem, TabUpdate,
};
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::ChairId;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Group name used when a product's group cannot be resolved
pub const FALLBACK_GROUP_NAME: &str = "other";

/// A product together with its group's name
#[derive(Debug, Clone, PartialEq)]
pub struct MenuProduct {
    pub product: Product,
    pub group_name: String,
}

/// Result of settling a set of chairs on one tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOutcome {
    /// Tab that now holds every item
    pub primary_tab_id: ChairId,
    /// Tabs folded into the primary and removed
    pub merged_tab_ids: Vec<ChairId>,
    /// Name written to the primary tab
    pub name: String,
}

/// Reject edits to a settled tab
fn ensure_unpaid(tab: &Tab) -> ServiceResult<()> {
    if tab.name.as_deref().and_then(PaidName::decode).is_some() {
        return Err(AppError::with_message(
            ErrorCode::ChairSettled,
            format!("Chair {} has already been paid", tab.id),
        )
        .with_detail("chair_id", tab.id)
        .into());
    }
    Ok(())
}

fn check_item_index(tab: &Tab, index: usize) -> ServiceResult<()> {
    if index >= tab.items.len() {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("Invalid item index {}", index),
        )
        .with_detail("items", tab.items.len())
        .into());
    }
    Ok(())
}

fn validate_product(name: &str, price: Decimal) -> ServiceResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::new(ErrorCode::RequiredField).with_detail("field", "name").into());
    }
    if price.is_sign_negative() {
        return Err(AppError::with_message(ErrorCode::ValueOutOfRange, "Price must not be negative").into());
    }
    Ok(())
}

pub struct MenuService {
    api: Arc<dyn OnslipApi>,
}

impl MenuService {
    pub fn new(api: Arc<dyn OnslipApi>) -> Self {
        Self { api }
    }

    // ========== Catalogue ==========

    pub async fn list_product_groups(&self) -> ServiceResult<Vec<ProductGroup>> {
        Ok(self.api.list_product_groups().await?)
    }

    /// All products with their group names
    ///
    /// A group that fails to load is logged and shown as `other`.
    pub async fn list_products(&self) -> ServiceResult<Vec<MenuProduct>> {
        let products = self.api.list_products().await?;
        let mut group_names: HashMap<RemoteId, String> = HashMap::new();
        let mut menu = Vec::with_capacity(products.len());

        for product in products {
            let group_name = match product.product_group {
                Some(group_id) => match group_names.get(&group_id) {
                    Some(name) => name.clone(),
                    None => {
                        let name = match self.api.get_product_group(group_id).await {
                            Ok(group) if !group.name.is_empty() => group.name,
                            Ok(_) => FALLBACK_GROUP_NAME.to_string(),
                            Err(e) => {
                                tracing::error!(product_id = product.id, error = %e, "Failed to get product group");
                                FALLBACK_GROUP_NAME.to_string()
                            }
                        };
                        group_names.insert(group_id, name.clone());
                        name
                    }
                },
                None => FALLBACK_GROUP_NAME.to_string(),
            };
            menu.push(MenuProduct { product, group_name });
        }
        Ok(menu)
    }

    pub async fn get_product(&self, product_id: RemoteId) -> ServiceResult<Product> {
        Ok(self.api.get_product(product_id).await?)
    }

    pub async fn create_product(&self, name: &str, product_group: RemoteId, price: Decimal) -> ServiceResult<Product> {
        validate_product(name, price)?;
        let product = self
            .api
            .add_product(&ProductCreate {
                name: name.to_string(),
                product_group,
                price,
            })
            .await?;
        tracing::info!(product_id = product.id, name = %name, "Product created");
        Ok(product)
    }

    pub async fn update_product(
        &self,
        product_id: RemoteId,
        name: &str,
        product_group: RemoteId,
        price: Decimal,
    ) -> ServiceResult<Product> {
        validate_product(name, price)?;
        Ok(self
            .api
            .update_product(
                product_id,
                &ProductCreate {
                    name: name.to_string(),
                    product_group,
                    price,
                },
            )
            .await?)
    }

    pub async fn delete_product(&self, product_id: RemoteId) -> ServiceResult<()> {
        self.api.remove_product(product_id).await?;
        tracing::info!(product_id, "Product deleted");
        Ok(())
    }

    // ========== Chair bills ==========

    /// Put `quantity` of a product on a chair's tab
    pub async fn add_product_to_chair(&self, chair_id: ChairId, product_id: RemoteId, quantity: Decimal) -> ServiceResult<Tab> {
        if quantity <= Decimal::ZERO {
            return Err(AppError::with_message(ErrorCode::ValueOutOfRange, "Quantity must be greater than 0").into());
        }

        let tab = self.api.get_tab(chair_id).await?;
        ensure_unpaid(&tab)?;

        let product = self.api.get_product(product_id).await?;
        let item_type = match product.product_group {
            Some(group_id) => self.api.get_product_group(group_id).await?.item_type.unwrap_or_default(),
            None => Default::default(),
        };

        let mut items = tab.items;
        items.push(TabItem {
            product: Some(product.id),
            product_name: product.name.clone(),
            item_type,
            quantity,
            price: Some(product.price.unwrap_or(Decimal::ZERO)),
            comment: None,
        });

        let updated = self
            .api
            .update_tab(
                chair_id,
                &TabUpdate {
                    items: Some(items),
                    ..Default::default()
                },
            )
            .await?;
        tracing::info!(chair_id, product_id, %quantity, "Product added to chair");
        Ok(updated)
    }

    pub async fn chair_items(&self, chair_id: ChairId) -> ServiceResult<Vec<TabItem>> {
        Ok(self.api.get_tab(chair_id).await?.items)
    }

    pub async fn delete_item_from_chair(&self, chair_id: ChairId, index: usize) -> ServiceResult<Tab> {
        let tab = self.api.get_tab(chair_id).await?;
        ensure_unpaid(&tab)?;
        check_item_index(&tab, index)?;

        let mut items = tab.items;
        let removed = items.remove(index);
        let updated = self
            .api
            .update_tab(
                chair_id,
                &TabUpdate {
                    items: Some(items),
                    ..Default::default()
                },
            )
            .await?;
        tracing::info!(chair_id, item = %removed.product_name, "Item removed from chair");
        Ok(updated)
    }

    /// Share one item of `source` with `targets`, each paying `share`
    ///
    /// The source item is repriced in place and a copy is appended to every
    /// target. Targets that no longer exist are skipped.
    pub async fn split_item_between_chairs(
        &self,
        source: ChairId,
        targets: &[ChairId],
        index: usize,
        share: Decimal,
    ) -> ServiceResult<()> {
        if share.is_sign_negative() {
            return Err(AppError::with_message(ErrorCode::ValueOutOfRange, "Share must not be negative").into());
        }

        let source_tab = self.api.get_tab(source).await?;
        ensure_unpaid(&source_tab)?;
        check_item_index(&source_tab, index)?;

        let mut target_tabs = Vec::with_capacity(targets.len());
        for target in targets {
            match self.api.get_tab(*target).await {
                Ok(tab) => {
                    ensure_unpaid(&tab)?;
                    target_tabs.push(tab);
                }
                Err(e) if e.is_not_found() => {
                    tracing::error!(chair_id = *target, "Target chair not found, skipping");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let original = source_tab.items[index].clone();
        let chair_list: Vec<String> = std::iter::once(source)
            .chain(targets.iter().copied())
            .map(|id| id.to_string())
            .collect();
        let split_name = format!("{} (Split {} ways)", original.product_name, chair_list.len());
        let comment = format!(
            "Split between chairs: {}. Original price: {:.2} kr",
            chair_list.join(", "),
            original.price_or_zero()
        );

        let split_item = TabItem {
            product_name: split_name,
            price: Some(share),
            comment: Some(comment),
            ..original
        };

        let mut source_items = source_tab.items;
        source_items[index] = split_item.clone();
        self.api
            .update_tab(
                source,
                &TabUpdate {
                    items: Some(source_items),
                    ..Default::default()
                },
            )
            .await?;

        for tab in target_tabs {
            let mut items = tab.items;
            items.push(split_item.clone());
            self.api
                .update_tab(
                    tab.id,
                    &TabUpdate {
                        items: Some(items),
                        ..Default::default()
                    },
                )
                .await?;
        }

        tracing::info!(source, targets = ?targets, %share, "Item split between chairs");
        Ok(())
    }

    /// Settle `chair_ids` on one tab
    ///
    /// The lowest tab id becomes the primary tab: it receives every item and
    /// the `[PAID-n]` name. The other tabs are removed.
    pub async fn combine_and_pay(&self, chair_ids: &[ChairId]) -> ServiceResult<PaymentOutcome> {
        let mut seen = BTreeSet::new();
        let ids: Vec<ChairId> = chair_ids.iter().copied().filter(|id| seen.insert(*id)).collect();
        if ids.is_empty() {
            return Err(AppError::validation("Need at least 1 chair to process payment").into());
        }

        let mut tabs = Vec::with_capacity(ids.len());
        for id in &ids {
            let tab = self.api.get_tab(*id).await?;
            ensure_unpaid(&tab)?;
            tabs.push(tab);
        }

        let items: Vec<TabItem> = tabs.iter().flat_map(|t| t.items.iter().cloned()).collect();
        tabs.sort_by_key(|t| t.id);
        let mut tabs = tabs.into_iter();
        let Some(primary) = tabs.next() else {
            return Err(AppError::internal("No tabs loaded").into());
        };
        let merged: Vec<Tab> = tabs.collect();

        let name = PaidName::for_payment(ids.len() as u32, primary.name.as_deref()).encode();
        self.api
            .update_tab(
                primary.id,
                &TabUpdate {
                    name: Some(name.clone()),
                    items: Some(items),
                    ..Default::default()
                },
            )
            .await?;

        for tab in &merged {
            self.api.remove_tab(tab.id).await?;
        }

        let outcome = PaymentOutcome {
            primary_tab_id: primary.id,
            merged_tab_ids: merged.iter().map(|t| t.id).collect(),
            name,
        };
        tracing::info!(
            primary = outcome.primary_tab_id,
            merged = ?outcome.merged_tab_ids,
            "Chairs combined and paid"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onslip_client::mock::MemoryApi;
    use onslip_client::{ItemType, TabCreate};

    struct Fixture {
        api: Arc<MemoryApi>,
        menu: MenuService,
        coffee: Product,
    }

    async fn fixture() -> Fixture {
        let api = Arc::new(MemoryApi::new());
        let drinks = api.insert_product_group("Drinks", Some(ItemType::Goods));
        let menu = MenuService::new(api.clone());
        let coffee = menu
            .create_product("Coffee", drinks.id, Decimal::new(3500, 2))
            .await
            .unwrap();
        Fixture { api, menu, coffee }
    }

    async fn tab(api: &MemoryApi, name: Option<&str>) -> Tab {
        api.add_tab(&TabCreate {
            name: name.map(str::to_string),
            labels: vec![],
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_products_with_group_fallback() {
        let f = fixture().await;
        // group id that does not exist
        f.api
            .add_product(&ProductCreate {
                name: "Mystery".into(),
                product_group: 999,
                price: Decimal::ONE,
            })
            .await
            .unwrap();

        let products = f.menu.list_products().await.unwrap();
        let groups: Vec<_> = products.iter().map(|p| p.group_name.as_str()).collect();
        assert_eq!(groups, vec!["Drinks", "other"]);
    }

    #[tokio::test]
    async fn test_product_validation() {
        let f = fixture().await;
        f.api.reset_calls();
        assert!(f.menu.create_product(" ", 1, Decimal::ONE).await.is_err());
        assert!(f.menu.create_product("Tea", 1, Decimal::new(-1, 0)).await.is_err());
        assert_eq!(f.api.call_count(), 0);

        let updated = f
            .menu
            .update_product(f.coffee.id, "Espresso", f.coffee.product_group.unwrap(), Decimal::new(30, 0))
            .await
            .unwrap();
        assert_eq!(updated.name, "Espresso");

        f.menu.delete_product(f.coffee.id).await.unwrap();
        assert!(f.menu.get_product(f.coffee.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_add_and_delete_items() {
        let f = fixture().await;
        let chair = tab(&f.api, Some("Anna")).await;

        f.menu.add_product_to_chair(chair.id, f.coffee.id, Decimal::ONE).await.unwrap();
        let updated = f
            .menu
            .add_product_to_chair(chair.id, f.coffee.id, Decimal::new(2, 0))
            .await
            .unwrap();
        assert_eq!(updated.items.len(), 2);
        assert_eq!(updated.items[0].product_name, "Coffee");
        assert_eq!(updated.items[0].price, Some(Decimal::new(3500, 2)));

        let err = f.menu.delete_item_from_chair(chair.id, 5).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValueOutOfRange);

        f.menu.delete_item_from_chair(chair.id, 0).await.unwrap();
        let items = f.menu.chair_items(chair.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, Decimal::new(2, 0));
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected() {
        let f = fixture().await;
        let chair = tab(&f.api, None).await;
        f.api.reset_calls();
        assert!(f.menu.add_product_to_chair(chair.id, f.coffee.id, Decimal::ZERO).await.is_err());
        assert_eq!(f.api.call_count(), 0);
    }

    #[tokio::test]
    async fn test_split_item() {
        let f = fixture().await;
        let a = tab(&f.api, Some("A")).await;
        let b = tab(&f.api, Some("B")).await;
        f.menu.add_product_to_chair(a.id, f.coffee.id, Decimal::ONE).await.unwrap();

        f.menu
            .split_item_between_chairs(a.id, &[b.id, 404], 0, Decimal::new(1750, 2))
            .await
            .unwrap();

        let source = f.menu.chair_items(a.id).await.unwrap();
        let target = f.menu.chair_items(b.id).await.unwrap();
        assert_eq!(source[0].product_name, "Coffee (Split 3 ways)");
        assert_eq!(source[0].price, Some(Decimal::new(1750, 2)));
        assert_eq!(
            source[0].comment.as_deref(),
            Some(format!("Split between chairs: {}, {}, 404. Original price: 35.00 kr", a.id, b.id).as_str())
        );
        assert_eq!(target, source);
    }

    #[tokio::test]
    async fn test_combine_and_pay() {
        let f = fixture().await;
        let a = tab(&f.api, Some("Anna")).await;
        let b = tab(&f.api, None).await;
        let c = tab(&f.api, None).await;
        f.menu.add_product_to_chair(b.id, f.coffee.id, Decimal::ONE).await.unwrap();
        f.menu.add_product_to_chair(c.id, f.coffee.id, Decimal::ONE).await.unwrap();

        let outcome = f.menu.combine_and_pay(&[c.id, a.id, b.id]).await.unwrap();
        assert_eq!(outcome.primary_tab_id, a.id);
        assert_eq!(outcome.merged_tab_ids, vec![b.id, c.id]);
        assert_eq!(outcome.name, "[PAID-3] Anna");

        let primary = f.api.get_tab(a.id).await.unwrap();
        assert_eq!(primary.items.len(), 2);
        assert!(f.api.get_tab(b.id).await.unwrap_err().is_not_found());

        // settled chairs are closed for edits
        let err = f
            .menu
            .add_product_to_chair(a.id, f.coffee.id, Decimal::ONE)
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ChairSettled);
    }

    #[tokio::test]
    async fn test_pay_single_unnamed_chair() {
        let f = fixture().await;
        let a = tab(&f.api, None).await;
        let outcome = f.menu.combine_and_pay(&[a.id, a.id]).await.unwrap();
        assert_eq!(outcome.name, "[PAID-1] Single");
        assert!(outcome.merged_tab_ids.is_empty());

        assert!(f.menu.combine_and_pay(&[]).await.is_err());
    }
}
