//! Store-level integration tests against an in-memory SQLite database.

use sqlx::sqlite::SqlitePoolOptions;

use roomstage_db::models::{CreateCatalogItem, CreateVisit};
use roomstage_db::repositories::{CatalogRepo, TrialUsageRepo, VisitRepo};
use roomstage_db::DbPool;

/// One-connection in-memory pool so every query sees the same database.
async fn test_pool() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    roomstage_db::init_schema(&pool).await.expect("schema");
    pool
}

fn sample_item(name: &str) -> CreateCatalogItem {
    CreateCatalogItem {
        name: name.to_string(),
        item_type: "sofa".to_string(),
        style: "modern".to_string(),
        image_path: format!("data/catalog/{name}.png"),
        image_url: format!("/catalog/{name}.png"),
        description: Some("three-seater".to_string()),
        price: Some(499.0),
    }
}

// -- trial usage --

#[tokio::test]
async fn unknown_client_has_zero_usage() {
    let pool = test_pool().await;
    assert_eq!(TrialUsageRepo::count(&pool, "203.0.113.9").await.unwrap(), 0);
}

#[tokio::test]
async fn increment_counts_per_client() {
    let pool = test_pool().await;

    assert_eq!(TrialUsageRepo::increment(&pool, "a").await.unwrap(), 1);
    assert_eq!(TrialUsageRepo::increment(&pool, "a").await.unwrap(), 2);
    assert_eq!(TrialUsageRepo::increment(&pool, "b").await.unwrap(), 1);

    assert_eq!(TrialUsageRepo::count(&pool, "a").await.unwrap(), 2);
    assert_eq!(TrialUsageRepo::count(&pool, "b").await.unwrap(), 1);
}

// -- catalog --

#[tokio::test]
async fn catalog_create_list_delete() {
    let pool = test_pool().await;

    let sofa = CatalogRepo::create(&pool, &sample_item("sofa")).await.unwrap();
    let lamp = CatalogRepo::create(&pool, &sample_item("lamp")).await.unwrap();
    assert_ne!(sofa.id, lamp.id);

    let items = CatalogRepo::list(&pool).await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].name, "sofa");

    let found = CatalogRepo::find_by_id(&pool, &lamp.id).await.unwrap();
    assert_eq!(found.unwrap().name, "lamp");

    assert!(CatalogRepo::delete(&pool, &sofa.id).await.unwrap());
    assert!(!CatalogRepo::delete(&pool, &sofa.id).await.unwrap());
    assert_eq!(CatalogRepo::list(&pool).await.unwrap().len(), 1);
}

#[tokio::test]
async fn catalog_optional_fields_round_trip() {
    let pool = test_pool().await;
    let input = CreateCatalogItem {
        description: None,
        price: None,
        ..sample_item("stool")
    };
    let item = CatalogRepo::create(&pool, &input).await.unwrap();
    assert_eq!(item.description, None);
    assert_eq!(item.price, None);
}

// -- visits --

#[tokio::test]
async fn visits_are_listed_newest_first_and_capped() {
    let pool = test_pool().await;

    for i in 0..5 {
        VisitRepo::record(
            &pool,
            &CreateVisit {
                ip_address: format!("10.0.0.{i}"),
                user_agent: "test-agent".to_string(),
                path: "/api/v1/generate".to_string(),
                method: "POST".to_string(),
            },
        )
        .await
        .unwrap();
    }

    let recent = VisitRepo::list_recent(&pool, 3).await.unwrap();
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].ip_address, "10.0.0.4");
    assert_eq!(recent[2].ip_address, "10.0.0.2");
}

#[tokio::test]
async fn oversized_user_agent_is_truncated() {
    let pool = test_pool().await;
    VisitRepo::record(
        &pool,
        &CreateVisit {
            ip_address: "10.0.0.1".to_string(),
            user_agent: "x".repeat(2000),
            path: "/".to_string(),
            method: "GET".to_string(),
        },
    )
    .await
    .unwrap();

    let recent = VisitRepo::list_recent(&pool, 1).await.unwrap();
    assert_eq!(recent[0].user_agent.len(), 500);
}
