use rusqlite::Connection;
use stockpile_core::db::migrations::latest_version;
use stockpile_core::db::open_db_in_memory;
use stockpile_core::{CacheStore, CatalogItem, SqliteCatalogStore, StoreError};

#[test]
fn committed_upserts_are_readable_in_id_order() {
    let store = store();

    store
        .run_atomic(|cache| cache.upsert_all(&[item(3), item(1), item(2)]))
        .unwrap();

    let all = store.items_after(None, 10).unwrap();
    let ids: Vec<i64> = all.iter().map(|found| found.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn clear_then_upsert_in_one_block_replaces_contents() {
    let store = store();
    store
        .run_atomic(|cache| cache.upsert_all(&[item(1), item(2)]))
        .unwrap();

    store
        .run_atomic(|cache| {
            cache.clear_all()?;
            cache.upsert_all(&[item(21), item(22)])
        })
        .unwrap();

    let ids: Vec<i64> = store
        .items_after(None, 10)
        .unwrap()
        .iter()
        .map(|found| found.id)
        .collect();
    assert_eq!(ids, vec![21, 22]);
}

#[test]
fn failing_block_rolls_back_clear_and_partial_upserts() {
    let store = store();
    store
        .run_atomic(|cache| cache.upsert_all(&[item(1), item(2)]))
        .unwrap();
    let version_before = store.version();

    // item(0) fails validation after the clear and the first upsert already
    // ran inside the transaction.
    let err = store
        .run_atomic(|cache| {
            cache.clear_all()?;
            cache.upsert_all(&[item(3), item(0)])
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let ids: Vec<i64> = store
        .items_after(None, 10)
        .unwrap()
        .iter()
        .map(|found| found.id)
        .collect();
    assert_eq!(ids, vec![1, 2], "pre-call contents must survive rollback");
    assert_eq!(store.version(), version_before);
}

#[test]
fn cursor_reads_walk_forward_and_backward() {
    let store = store();
    let items: Vec<CatalogItem> = (1..=7).map(item).collect();
    store.run_atomic(|cache| cache.upsert_all(&items)).unwrap();

    let forward = store.items_after(Some(2), 3).unwrap();
    let forward_ids: Vec<i64> = forward.iter().map(|found| found.id).collect();
    assert_eq!(forward_ids, vec![3, 4, 5]);

    let backward = store.items_before(5, 3).unwrap();
    let backward_ids: Vec<i64> = backward.iter().map(|found| found.id).collect();
    assert_eq!(backward_ids, vec![2, 3, 4], "preceding window, ascending");

    let front = store.items_before(1, 3).unwrap();
    assert!(front.is_empty());
}

#[test]
fn last_item_tracks_the_append_cursor() {
    let store = store();
    assert!(store.last_item().unwrap().is_none());

    store
        .run_atomic(|cache| cache.upsert_all(&[item(47), item(12)]))
        .unwrap();
    assert_eq!(store.last_item().unwrap().map(|found| found.id), Some(47));
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteCatalogStore::try_new(conn) {
        Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn try_new_rejects_connection_without_catalog_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteCatalogStore::try_new(conn);
    assert!(matches!(
        result,
        Err(StoreError::MissingRequiredTable("catalog_items"))
    ));
}

fn store() -> SqliteCatalogStore {
    let conn = open_db_in_memory().unwrap();
    SqliteCatalogStore::try_new(conn).unwrap()
}

fn item(id: i64) -> CatalogItem {
    CatalogItem::new(id, format!("item {id}"), format!("summary {id}"))
}
