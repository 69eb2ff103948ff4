//! Router assembly shared by `main` and the integration tests.

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::routes;
use crate::state::AppState;

/// Builds the full application router.
///
/// Requests running longer than `request_timeout` are answered with 408 and
/// their unit of work is dropped, which rolls it back. A panicking handler
/// becomes a 500 response.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    // TODO: Replace CorsLayer::permissive() with the mall frontends' origins.
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_router())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use mallbots_core::dispatcher::HandlerRegistry;
    use mallbots_stores::memory::{MemoryDatabase, MemoryScopeProvider};
    use mallbots_test_support::FixedClock;
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        let scopes = MemoryScopeProvider::new(
            MemoryDatabase::new(),
            HandlerRegistry::builder().build(),
            Arc::new(FixedClock::default()),
        );
        build_app(AppState::new(Arc::new(scopes)), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_layered_app_serves_health_and_nested_api() {
        // Act
        let health = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let stores = app()
            .oneshot(Request::get("/api/v1/stores").body(Body::empty()).unwrap())
            .await
            .unwrap();

        // Assert
        assert_eq!(health.status(), StatusCode::OK);
        assert_eq!(stores.status(), StatusCode::OK);
    }
}
