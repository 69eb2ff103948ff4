//! Routes for stores and their catalogs.

use axum::extract::{Path, State};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use mallbots_core::scope::run_scoped;
use mallbots_stores::application::query_handlers::{self, ProductView, StoreView};
use mallbots_stores::application::command_handlers;
use mallbots_stores::domain::commands;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::CommandResponse;
use crate::state::AppState;

/// Request body for POST /stores.
#[derive(Debug, Deserialize)]
pub struct CreateStoreRequest {
    /// Display name.
    pub name: String,
    /// Location inside the mall.
    pub location: String,
}

/// Request body for PUT /stores/{id}/rebrand.
#[derive(Debug, Deserialize)]
pub struct RebrandStoreRequest {
    /// The new name.
    pub name: String,
}

/// Request body for POST /stores/{id}/products.
#[derive(Debug, Deserialize)]
pub struct AddProductRequest {
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Stock keeping unit.
    #[serde(default)]
    pub sku: String,
    /// Starting price.
    pub price: f64,
}

/// POST /stores
#[instrument(skip(state, request))]
async fn create_store(
    State(state): State<AppState>,
    Json(request): Json<CreateStoreRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::CreateStore {
        correlation_id: Uuid::new_v4(),
        store_id: Uuid::new_v4(),
        name: request.name,
        location: request.location,
    };

    info!(
        correlation_id = %command.correlation_id,
        store_id = %command.store_id,
        "handling create_store command"
    );

    let result = run_scoped(state.scopes.as_ref(), |scope| async move {
        command_handlers::handle_create_store(&command, &scope).await
    })
    .await?;

    Ok(Json(result.into()))
}

/// PUT /stores/{id}/participating
#[instrument(skip(state))]
async fn enable_participation(
    State(state): State<AppState>,
    Path(store_id): Path<Uuid>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::EnableParticipation {
        correlation_id: Uuid::new_v4(),
        store_id,
    };

    info!(correlation_id = %command.correlation_id, "handling enable_participation command");

    let result = run_scoped(state.scopes.as_ref(), |scope| async move {
        command_handlers::handle_enable_participation(&command, &scope).await
    })
    .await?;

    Ok(Json(result.into()))
}

/// DELETE /stores/{id}/participating
#[instrument(skip(state))]
async fn disable_participation(
    State(state): State<AppState>,
    Path(store_id): Path<Uuid>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::DisableParticipation {
        correlation_id: Uuid::new_v4(),
        store_id,
    };

    info!(correlation_id = %command.correlation_id, "handling disable_participation command");

    let result = run_scoped(state.scopes.as_ref(), |scope| async move {
        command_handlers::handle_disable_participation(&command, &scope).await
    })
    .await?;

    Ok(Json(result.into()))
}

/// PUT /stores/{id}/rebrand
#[instrument(skip(state, request))]
async fn rebrand_store(
    State(state): State<AppState>,
    Path(store_id): Path<Uuid>,
    Json(request): Json<RebrandStoreRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::RebrandStore {
        correlation_id: Uuid::new_v4(),
        store_id,
        name: request.name,
    };

    info!(correlation_id = %command.correlation_id, "handling rebrand_store command");

    let result = run_scoped(state.scopes.as_ref(), |scope| async move {
        command_handlers::handle_rebrand_store(&command, &scope).await
    })
    .await?;

    Ok(Json(result.into()))
}

/// POST /stores/{id}/products
#[instrument(skip(state, request))]
async fn add_product(
    State(state): State<AppState>,
    Path(store_id): Path<Uuid>,
    Json(request): Json<AddProductRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::AddProduct {
        correlation_id: Uuid::new_v4(),
        product_id: Uuid::new_v4(),
        store_id,
        name: request.name,
        description: request.description,
        sku: request.sku,
        price: request.price,
    };

    info!(
        correlation_id = %command.correlation_id,
        product_id = %command.product_id,
        "handling add_product command"
    );

    let result = run_scoped(state.scopes.as_ref(), |scope| async move {
        command_handlers::handle_add_product(&command, &scope).await
    })
    .await?;

    Ok(Json(result.into()))
}

/// GET /stores/{id}
#[instrument(skip(state))]
async fn get_store(
    State(state): State<AppState>,
    Path(store_id): Path<Uuid>,
) -> Result<Json<StoreView>, ApiError> {
    let view = run_scoped(state.scopes.as_ref(), |scope| async move {
        query_handlers::get_store(store_id, &scope).await
    })
    .await?;

    Ok(Json(view))
}

/// GET /stores
async fn list_stores(State(state): State<AppState>) -> Result<Json<Vec<StoreView>>, ApiError> {
    let views = run_scoped(state.scopes.as_ref(), |scope| async move {
        query_handlers::get_stores(&scope).await
    })
    .await?;

    Ok(Json(views))
}

/// GET /stores/participating
async fn list_participating_stores(
    State(state): State<AppState>,
) -> Result<Json<Vec<StoreView>>, ApiError> {
    let views = run_scoped(state.scopes.as_ref(), |scope| async move {
        query_handlers::get_participating_stores(&scope).await
    })
    .await?;

    Ok(Json(views))
}

/// GET /stores/{id}/products
#[instrument(skip(state))]
async fn get_catalog(
    State(state): State<AppState>,
    Path(store_id): Path<Uuid>,
) -> Result<Json<Vec<ProductView>>, ApiError> {
    let views = run_scoped(state.scopes.as_ref(), |scope| async move {
        query_handlers::get_catalog(store_id, &scope).await
    })
    .await?;

    Ok(Json(views))
}

/// Returns the router for stores and store catalogs.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stores", post(create_store).get(list_stores))
        .route("/stores/participating", get(list_participating_stores))
        .route("/stores/{id}", get(get_store))
        .route(
            "/stores/{id}/participating",
            put(enable_participation).delete(disable_participation),
        )
        .route("/stores/{id}/rebrand", put(rebrand_store))
        .route("/stores/{id}/products", post(add_product).get(get_catalog))
}
