//! Session flows against the in-memory POS

use floor_editor::services::{MenuService, TableStateService};
use floor_editor::{Editor, ErrorKind, FloorSession, SyncStatus, TableCreationConfig};
use onslip_client::mock::MemoryApi;
use onslip_client::{Filter, OnslipApi, OrderUpdate, ResourceCreate};
use rust_decimal::Decimal;
use shared::canvas::CanvasState;
use shared::error::ErrorCode;
use shared::state::{DEFAULT_TABLE_STATES, Direction};
use std::sync::Arc;

fn editor_with_tables(count: usize) -> Editor {
    let mut editor = Editor::new();
    editor
        .add_tables(&TableCreationConfig {
            width: 120.0,
            height: 80.0,
            max_capacity: 4,
            min_capacity: 1,
            count,
        })
        .unwrap();
    editor
}

async fn installed_api() -> Arc<MemoryApi> {
    let api = Arc::new(MemoryApi::new());
    let names: Vec<String> = DEFAULT_TABLE_STATES.iter().map(|s| s.to_string()).collect();
    TableStateService::new(api.clone()).install_states(&names).await.unwrap();
    api.reset_calls();
    api
}

#[tokio::test]
async fn test_initialize_confirms_order() {
    let api = installed_api().await;
    let mut session = FloorSession::new(editor_with_tables(1), api.clone());

    let order_id = session.initialize_table_order(1).await.unwrap();

    let table = session.editor().table(1).unwrap();
    assert_eq!(table.order_id, Some(order_id));
    assert!(table.current_state.is_none());
    assert_eq!(session.editor().sync_status(1), Some(&SyncStatus::Confirmed));

    // already initialized: no new order
    api.reset_calls();
    assert_eq!(session.initialize_table_order(1).await.unwrap(), order_id);
    assert_eq!(api.call_count(), 0);
}

#[tokio::test]
async fn test_initialize_failure_leaves_table_unchanged() {
    let api = installed_api().await;
    api.fail_on("add_order");
    let mut session = FloorSession::new(editor_with_tables(1), api.clone());

    let err = session.initialize_table_order(1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Remote);

    let table = session.editor().table(1).unwrap();
    assert!(table.order_id.is_none());
    assert!(matches!(session.editor().sync_status(1), Some(SyncStatus::Failed(_))));
}

#[tokio::test]
async fn test_initialize_without_states_installed() {
    let api = Arc::new(MemoryApi::new());
    let mut session = FloorSession::new(editor_with_tables(1), api);

    let err = session.initialize_table_order(1).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::StatesMissing);
    assert!(session.editor().table(1).unwrap().order_id.is_none());
}

#[tokio::test]
async fn test_state_cycle() {
    let api = installed_api().await;
    let mut session = FloorSession::new(editor_with_tables(1), api);

    // no order yet: the first change only creates it
    assert_eq!(session.change_table_state(1, Direction::Next).await.unwrap(), None);
    assert!(session.editor().table(1).unwrap().order_id.is_some());

    let state = session.change_table_state(1, Direction::Next).await.unwrap().unwrap();
    assert_eq!(state.to_string(), "1:ready");
    let state = session.change_table_state(1, Direction::Previous).await.unwrap().unwrap();
    assert_eq!(state.to_string(), "10:cleaned");
    assert_eq!(
        session.editor().table(1).unwrap().current_state.as_ref(),
        Some(&state)
    );
}

#[tokio::test]
async fn test_state_change_failure_keeps_local_state() {
    let api = installed_api().await;
    let mut session = FloorSession::new(editor_with_tables(1), api.clone());
    session.change_table_state(1, Direction::Next).await.unwrap();
    session.change_table_state(1, Direction::Next).await.unwrap();

    api.fail_on("update_resource");
    assert!(session.change_table_state(1, Direction::Next).await.is_err());

    let table = session.editor().table(1).unwrap();
    assert_eq!(table.current_state.as_ref().map(|s| s.to_string()).as_deref(), Some("1:ready"));
    assert!(matches!(session.editor().sync_status(1), Some(SyncStatus::Failed(_))));

    api.clear_failures();
    session.refresh_table_state(1).await.unwrap();
    assert_eq!(session.editor().sync_status(1), Some(&SyncStatus::Confirmed));
}

#[tokio::test]
async fn test_stale_holder_does_not_block_others() {
    let api = installed_api().await;
    let mut session = FloorSession::new(editor_with_tables(1), api.clone());
    let order_id = session.initialize_table_order(1).await.unwrap();

    let stale = api
        .add_resource(&ResourceCreate {
            name: format!("order-{}-state:42:retired", order_id),
            location: None,
            labels: vec![],
        })
        .await
        .unwrap();
    let mut resources = api.get_order(order_id).await.unwrap().resources;
    resources.push(stale.id);
    api.update_order(
        order_id,
        &OrderUpdate {
            resources: Some(resources),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let state = session.change_table_state(1, Direction::Next).await.unwrap();
    assert_eq!(state.map(|s| s.to_string()).as_deref(), Some("1:ready"));
    assert_eq!(api.get_resource(stale.id).await.unwrap().name, stale.name);
}

#[tokio::test]
async fn test_delete_table_survives_remote_failure() {
    let api = installed_api().await;
    let mut session = FloorSession::new(editor_with_tables(2), api.clone());
    let order_id = session.initialize_table_order(1).await.unwrap();

    api.fail_on("remove_order");
    session.delete_table(1).await.unwrap();

    assert!(session.editor().table(1).is_none());
    assert_eq!(session.editor().tables().len(), 1);
    // still on the POS
    assert!(api.get_order(order_id).await.is_ok());
}

#[tokio::test]
async fn test_delete_table_removes_order_and_attachments() {
    let api = installed_api().await;
    let mut session = FloorSession::new(editor_with_tables(1), api.clone());
    let order_id = session.initialize_table_order(1).await.unwrap();
    let chair = session.create_chair(1, Some("Anna"), 0).await.unwrap();

    session.delete_table(1).await.unwrap();

    assert!(api.get_order(order_id).await.unwrap_err().is_not_found());
    assert!(api.get_tab(chair.chair_id).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_chair_sharing_an_id_with_the_state_holder() {
    let api = installed_api().await;
    let mut session = FloorSession::new(editor_with_tables(1), api.clone());
    let order_id = session.initialize_table_order(1).await.unwrap();
    let holder = api.get_order(order_id).await.unwrap().resources[0];

    // tab and resource ids count separately: the second tab reuses the holder's id
    let first = session.create_chair(1, None, 0).await.unwrap();
    let second = session.create_chair(1, None, 1).await.unwrap();
    assert_eq!(second.chair_id, holder);
    let seated = vec![first, second];
    assert_eq!(session.table_chairs(1).await.unwrap(), seated);

    let state = session.change_table_state(1, Direction::Next).await.unwrap();
    assert_eq!(state.map(|s| s.to_string()).as_deref(), Some("1:ready"));

    session.delete_table(1).await.unwrap();
    assert!(api.get_resource(holder).await.unwrap_err().is_not_found());
    for chair in &seated {
        assert!(api.get_tab(chair.chair_id).await.unwrap_err().is_not_found());
    }
    let vocabulary = api.list_resources(Some(&Filter::name("table-states-resource"))).await.unwrap();
    assert_eq!(vocabulary.len(), 1);
}

#[tokio::test]
async fn test_chair_at_occupied_position_makes_no_calls() {
    let api = installed_api().await;
    let mut session = FloorSession::new(editor_with_tables(1), api.clone());
    session.initialize_table_order(1).await.unwrap();
    let first = session.create_chair(1, None, 2).await.unwrap();

    let seated = session.table_chairs(1).await.unwrap();
    assert_eq!(seated, vec![first.clone()]);

    let order_id = session.editor().table(1).unwrap().order_id.unwrap();
    let table = session.editor().table(1).unwrap().clone();
    api.reset_calls();
    let err = session
        .chairs()
        .create_chair(&table, &seated, None, 2)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::PositionOccupied);
    assert_eq!(api.call_count(), 0);
    assert_eq!(api.get_order(order_id).await.unwrap().resources.len(), 2);
}

#[tokio::test]
async fn test_chairs_need_an_order() {
    let api = installed_api().await;
    let session = FloorSession::new(editor_with_tables(1), api);

    assert!(session.table_chairs(1).await.unwrap().is_empty());
    let err = session.create_chair(1, None, 0).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::TableHasNoOrder);
}

#[tokio::test]
async fn test_order_then_combine_and_pay() {
    let api = installed_api().await;
    let group = api.insert_product_group("drinks", None);
    let mut session = FloorSession::new(editor_with_tables(1), api.clone());
    session.initialize_table_order(1).await.unwrap();

    let menu: &MenuService = session.menu();
    let beer = menu.create_product("Beer", group.id, Decimal::new(6500, 2)).await.unwrap();

    let anna = session.create_chair(1, Some("Anna"), 0).await.unwrap();
    let bob = session.create_chair(1, Some("Bob"), 1).await.unwrap();
    session.menu().add_product_to_chair(anna.chair_id, beer.id, Decimal::ONE).await.unwrap();
    session.menu().add_product_to_chair(bob.chair_id, beer.id, Decimal::TWO).await.unwrap();

    let outcome = session
        .menu()
        .combine_and_pay(&[bob.chair_id, anna.chair_id, bob.chair_id])
        .await
        .unwrap();
    assert_eq!(outcome.primary_tab_id, anna.chair_id);
    assert_eq!(outcome.merged_tab_ids, vec![bob.chair_id]);

    let paid = api.get_tab(anna.chair_id).await.unwrap();
    assert_eq!(paid.name.as_deref(), Some("[PAID-2] Anna"));
    assert_eq!(paid.items.len(), 2);
    assert!(api.get_tab(bob.chair_id).await.unwrap_err().is_not_found());

    // settled chairs take no more items
    let err = session
        .menu()
        .add_product_to_chair(anna.chair_id, beer.id, Decimal::ONE)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ChairSettled);
}

#[tokio::test]
async fn test_export_import_round_trip() {
    let api = installed_api().await;
    let mut session = FloorSession::new(editor_with_tables(3), api);
    session.change_table_state(2, Direction::Next).await.unwrap();
    session.change_table_state(2, Direction::Next).await.unwrap();
    session.editor_mut().toggle_lock(3).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.json");
    session.editor().export().write_to_path(&path).unwrap();

    let restored = Editor::from_canvas(CanvasState::read_from_path(&path).unwrap());
    assert_eq!(restored.tables(), session.editor().tables());
    assert!(restored.table(3).unwrap().locked);
    assert_eq!(
        restored.table(2).unwrap().current_state.as_ref().map(|s| s.to_string()).as_deref(),
        Some("1:ready")
    );
    // sync status is not part of the file
    assert!(restored.sync_status(2).is_none());
}
