//! Integration tests for the store and catalog routes.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use mallbots_stores::integration::{
    PRODUCT_CHANNEL, PRODUCT_PRICE_INCREASED, STORE_CHANNEL, STORE_CREATED,
    STORE_PARTICIPATION_TOGGLED,
};
use mallbots_test_support::FailingPublisher;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

async fn create_store(pool: &PgPool, name: &str) -> Uuid {
    let (app, _) = common::build_test_app(pool.clone());
    let (status, json) = common::post_json(
        app,
        "/api/v1/stores",
        &json!({ "name": name, "location": "NY" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    Uuid::parse_str(json["aggregate_id"].as_str().unwrap()).unwrap()
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_store_round_trip(pool: PgPool) {
    // POST /api/v1/stores
    let (app, publisher) = common::build_test_app(pool.clone());
    let (status, json) = common::post_json(
        app,
        "/api/v1/stores",
        &json!({ "name": "Acme", "location": "NY" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let store_id = json["aggregate_id"].as_str().unwrap().to_owned();
    assert_eq!(json["event_ids"].as_array().unwrap().len(), 1);

    let published = publisher.published_on(STORE_CHANNEL);
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].name, STORE_CREATED);
    assert_eq!(published[0].payload["id"], store_id);

    // GET /api/v1/stores/{id}
    let (app, _) = common::build_test_app(pool);
    let (status, json) = common::get_json(app, &format!("/api/v1/stores/{store_id}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Acme");
    assert_eq!(json["location"], "NY");
    assert_eq!(json["participating"], false);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_participation_toggle_publishes_both_states(pool: PgPool) {
    let store_id = create_store(&pool, "Acme").await;
    let uri = format!("/api/v1/stores/{store_id}/participating");

    let (app, publisher) = common::build_test_app(pool.clone());
    let (status, _) = common::send_empty(app.clone(), "PUT", &uri).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = common::send_empty(app, "DELETE", &uri).await;
    assert_eq!(status, StatusCode::OK);

    let toggles: Vec<_> = publisher
        .published_on(STORE_CHANNEL)
        .into_iter()
        .filter(|e| e.name == STORE_PARTICIPATION_TOGGLED)
        .collect();
    assert_eq!(toggles.len(), 2);
    assert_eq!(toggles[0].payload["participating"], true);
    assert_eq!(toggles[1].payload["participating"], false);

    let (app, _) = common::build_test_app(pool);
    let (_, json) = common::get_json(app, "/api/v1/stores/participating").await;
    assert_eq!(json, json!([]));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_price_decrease_below_zero_is_rejected(pool: PgPool) {
    let store_id = create_store(&pool, "Acme").await;
    let (app, publisher) = common::build_test_app(pool.clone());
    let (_, json) = common::post_json(
        app.clone(),
        &format!("/api/v1/stores/{store_id}/products"),
        &json!({ "name": "Widget", "description": "desc", "sku": "SKU1", "price": 100.0 }),
    )
    .await;
    let product_id = json["aggregate_id"].as_str().unwrap().to_owned();

    let (status, _) = common::put_json(
        app.clone(),
        &format!("/api/v1/products/{product_id}/increase-price"),
        &json!({ "delta": 50.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = common::put_json(
        app.clone(),
        &format!("/api/v1/products/{product_id}/decrease-price"),
        &json!({ "delta": 200.0 }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "invariant_violation");

    let (_, json) = common::get_json(app, &format!("/api/v1/products/{product_id}")).await;
    assert_eq!(json["price"], json!(150.0));
    let increases: Vec<_> = publisher
        .published_on(PRODUCT_CHANNEL)
        .into_iter()
        .filter(|e| e.name == PRODUCT_PRICE_INCREASED)
        .collect();
    assert_eq!(increases.len(), 1);
    assert_eq!(increases[0].payload["delta"], json!(50.0));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_broker_outage_leaves_no_product(pool: PgPool) {
    let store_id = create_store(&pool, "Acme").await;
    let app = common::build_test_app_with_publisher(pool.clone(), Arc::new(FailingPublisher));

    let (status, json) = common::post_json(
        app,
        &format!("/api/v1/stores/{store_id}/products"),
        &json!({ "name": "Widget", "sku": "SKU1", "price": 10.0 }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "infrastructure_error");
    let (app, _) = common::build_test_app(pool);
    let (_, catalog) = common::get_json(app, &format!("/api/v1/stores/{store_id}/products")).await;
    assert_eq!(catalog, json!([]));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_rebrand_and_remove_product(pool: PgPool) {
    let store_id = create_store(&pool, "Acme").await;
    let (app, _) = common::build_test_app(pool);
    let (_, json) = common::post_json(
        app.clone(),
        &format!("/api/v1/stores/{store_id}/products"),
        &json!({ "name": "Widget", "price": 10.0 }),
    )
    .await;
    let product_id = json["aggregate_id"].as_str().unwrap().to_owned();

    let (status, _) = common::put_json(
        app.clone(),
        &format!("/api/v1/products/{product_id}/rebrand"),
        &json!({ "name": "Gadget", "description": "shiny" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, json) = common::get_json(app.clone(), &format!("/api/v1/products/{product_id}")).await;
    assert_eq!(json["name"], "Gadget");

    let (status, _) =
        common::send_empty(app.clone(), "DELETE", &format!("/api/v1/products/{product_id}")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = common::get_json(app, &format!("/api/v1/products/{product_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "aggregate_not_found");
}
