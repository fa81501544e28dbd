//! Integration tests for the JSON document store
//!
//! Run with: cargo test --test document_store_tests

use serde_json::json;
use storefront::core::record_from;
use storefront::{DocumentStore, RecordId, ShopError};
use tempfile::TempDir;

fn open_store() -> (TempDir, DocumentStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = DocumentStore::open(temp_dir.path().join("database.json"));
    (temp_dir, store)
}

#[tokio::test]
async fn test_ids_are_sequential_from_one() {
    let (_dir, store) = open_store();

    for expected in 1..=5u64 {
        let record = store
            .create("categories", record_from(json!({ "name": format!("c{}", expected) })))
            .await
            .unwrap();
        assert_eq!(record["id"], expected);
    }
}

#[tokio::test]
async fn test_create_then_update_scenario() {
    let (_dir, store) = open_store();

    let created = store
        .create("categories", record_from(json!({"name": "Books"})))
        .await
        .unwrap();
    assert_eq!(created, record_from(json!({"id": 1, "name": "Books"})));

    let updated = store
        .update("categories", RecordId::new(1), record_from(json!({"description": "Lit"})))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        updated,
        record_from(json!({"id": 1, "name": "Books", "description": "Lit"}))
    );
}

#[tokio::test]
async fn test_update_is_shallow_merge() {
    let (_dir, store) = open_store();

    store
        .create(
            "products",
            record_from(json!({"name": "Dune", "meta": {"pages": 412, "lang": "en"}, "price": 9})),
        )
        .await
        .unwrap();

    let updated = store
        .update(
            "products",
            RecordId::new(1),
            record_from(json!({"meta": {"pages": 500}})),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated["name"], "Dune");
    assert_eq!(updated["price"], 9);
    assert_eq!(updated["meta"], json!({"pages": 500}));
}

#[tokio::test]
async fn test_update_missing_record_returns_none() {
    let (_dir, store) = open_store();

    let result = store
        .update("categories", RecordId::new(42), record_from(json!({"name": "x"})))
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_delete_then_get_is_absent_and_id_not_reused() {
    let (_dir, store) = open_store();

    store.create("categories", record_from(json!({"name": "a"}))).await.unwrap();
    store.create("categories", record_from(json!({"name": "b"}))).await.unwrap();

    assert!(store.delete("categories", RecordId::new(2)).await.unwrap());
    assert!(store.get_by_id("categories", RecordId::new(2)).await.unwrap().is_none());

    let next = store
        .create("categories", record_from(json!({"name": "c"})))
        .await
        .unwrap();
    assert_eq!(next["id"], 3);
}

#[tokio::test]
async fn test_delete_reports_whether_anything_was_removed() {
    let (_dir, store) = open_store();

    store.create("categories", record_from(json!({"name": "a"}))).await.unwrap();

    assert!(!store.delete("categories", RecordId::new(9)).await.unwrap());
    assert!(store.delete("categories", RecordId::new(1)).await.unwrap());
    assert!(!store.delete("categories", RecordId::new(1)).await.unwrap());
    assert!(store.get_all("categories").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_all_absent_collection_is_empty() {
    let (_dir, store) = open_store();
    assert!(store.get_all("products").await.unwrap().is_empty());
    assert_eq!(store.count("products").await.unwrap(), 0);
}

#[tokio::test]
async fn test_get_all_keeps_insertion_order() {
    let (_dir, store) = open_store();

    for name in ["z", "a", "m"] {
        store.create("categories", record_from(json!({"name": name}))).await.unwrap();
    }

    let names: Vec<_> = store
        .get_all("categories")
        .await
        .unwrap()
        .into_iter()
        .map(|record| record["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["z", "a", "m"]);
}

#[tokio::test]
async fn test_find_one_matches_all_pairs() {
    let (_dir, store) = open_store();

    store
        .create("users", record_from(json!({"email": "a@x.com", "role": "customer"})))
        .await
        .unwrap();
    store
        .create("users", record_from(json!({"email": "b@x.com", "role": "admin"})))
        .await
        .unwrap();

    let found = store
        .find_one("users", &record_from(json!({"email": "b@x.com"})))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found["id"], 2);

    let none = store
        .find_one("users", &record_from(json!({"email": "a@x.com", "role": "admin"})))
        .await
        .unwrap();
    assert!(none.is_none());
}

#[tokio::test]
async fn test_every_operation_reads_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("database.json");
    let store = DocumentStore::open(&path);

    store.create("categories", record_from(json!({"name": "a"}))).await.unwrap();

    std::fs::write(
        &path,
        r#"{"categories": [{"id": 7, "name": "edited by hand"}]}"#,
    )
    .unwrap();

    let all = store.get_all("categories").await.unwrap();
    assert_eq!(all, vec![record_from(json!({"id": 7, "name": "edited by hand"}))]);

    let next = store.create("categories", record_from(json!({"name": "b"}))).await.unwrap();
    assert_eq!(next["id"], 8);
}

#[tokio::test]
async fn test_second_handle_sees_writes() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("database.json");

    let writer = DocumentStore::open(&path);
    let reader = DocumentStore::open(&path);

    writer.create("categories", record_from(json!({"name": "Books"}))).await.unwrap();

    let found = reader.get_by_id("categories", RecordId::new(1)).await.unwrap().unwrap();
    assert_eq!(found["name"], "Books");
}

#[tokio::test]
async fn test_concurrent_creates_through_clones_lose_nothing() {
    let (_dir, store) = open_store();

    let mut handles = Vec::new();
    for i in 0..20 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .create("products", record_from(json!({ "name": format!("p{}", i) })))
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let mut ids: Vec<u64> = store
        .get_all("products")
        .await
        .unwrap()
        .iter()
        .map(|record| record["id"].as_u64().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=20).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_list_collections_hides_reserved() {
    let (_dir, store) = open_store();

    store.create("users", record_from(json!({"email": "a@x.com"}))).await.unwrap();
    store.create("categories", record_from(json!({"name": "a"}))).await.unwrap();

    assert_eq!(
        store.list_collections().await.unwrap(),
        vec!["categories".to_string(), "users".to_string()]
    );
}

#[tokio::test]
async fn test_legacy_document_without_sequences() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("database.json");
    std::fs::write(
        &path,
        r#"{"users": [], "categories": [{"id": 1, "name": "Books"}, {"id": 4, "name": "Music"}], "products": []}"#,
    )
    .unwrap();

    let store = DocumentStore::open(&path);
    let created = store.create("categories", record_from(json!({"name": "Toys"}))).await.unwrap();
    assert_eq!(created["id"], 5);

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["categories"].as_array().unwrap().len(), 3);
    assert!(raw["users"].is_array());
}

#[tokio::test]
async fn test_create_after_largest_possible_id_is_storage_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("database.json");
    std::fs::write(
        &path,
        r#"{"categories": [{"id": 18446744073709551615, "name": "last"}]}"#,
    )
    .unwrap();

    let store = DocumentStore::open(&path);
    let err = store
        .create("categories", record_from(json!({"name": "y"})))
        .await
        .unwrap_err();
    assert!(matches!(err, ShopError::Storage(_)));

    assert_eq!(store.count("categories").await.unwrap(), 1);
}

#[tokio::test]
async fn test_any_collection_name_in_the_document_is_readable() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("database.json");
    std::fs::write(&path, r#"{"order-items": [{"id": 1}]}"#).unwrap();

    let store = DocumentStore::open(&path);
    assert_eq!(store.get_all("order-items").await.unwrap().len(), 1);
    assert!(store.get_all("no such collection").await.unwrap().is_empty());

    let created = store
        .create("order-items", record_from(json!({"sku": "A-1"})))
        .await
        .unwrap();
    assert_eq!(created["id"], 2);
}

#[tokio::test]
async fn test_whole_float_ids_are_found() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("database.json");
    std::fs::write(&path, r#"{"categories": [{"id": 2.0, "name": "Books"}]}"#).unwrap();

    let store = DocumentStore::open(&path);
    let found = store
        .get_by_id("categories", RecordId::new(2))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found["name"], "Books");

    assert!(store.delete("categories", RecordId::new(2)).await.unwrap());
}
