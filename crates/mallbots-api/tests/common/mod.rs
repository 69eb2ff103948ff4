//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mallbots_core::dispatcher::HandlerRegistry;
use mallbots_core::publisher::MessagePublisher;
use mallbots_postgres::PgScopeProvider;
use mallbots_stores::application::integration_handlers::{
    IntegrationEventHandlers, register_integration_event_handlers,
};
use mallbots_test_support::{FixedClock, RecordingPublisher};
use sqlx::PgPool;
use tower::ServiceExt;

use mallbots_api::app::build_app;
use mallbots_api::state::AppState;

/// Build the full app with a recording publisher. Uses the same router as
/// `main.rs`.
pub fn build_test_app(pool: PgPool) -> (Router, Arc<RecordingPublisher>) {
    let publisher = Arc::new(RecordingPublisher::new());
    let app = build_test_app_with_publisher(pool, publisher.clone());
    (app, publisher)
}

/// Build the full app around a caller-supplied publisher.
pub fn build_test_app_with_publisher(pool: PgPool, publisher: Arc<dyn MessagePublisher>) -> Router {
    let handlers = Arc::new(IntegrationEventHandlers::new(publisher));
    let registry =
        register_integration_event_handlers(HandlerRegistry::builder(), handlers).build();
    let scopes = PgScopeProvider::new(pool, registry, Arc::new(FixedClock::default()));
    build_app(AppState::new(Arc::new(scopes)), Duration::from_secs(30))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);

    (status, json)
}

/// Send a request with a JSON body and return the response.
pub async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send_json(app, "POST", uri, body).await
}

/// Send a PUT request with a JSON body and return the response.
pub async fn put_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send_json(app, "PUT", uri, body).await
}

/// Send a body-less request and return the response.
pub async fn send_empty(app: Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send_empty(app, "GET", uri).await
}
