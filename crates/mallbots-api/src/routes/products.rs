//! Routes for individual catalog products.

use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use mallbots_core::scope::run_scoped;
use mallbots_stores::application::command_handlers;
use mallbots_stores::application::query_handlers::{self, ProductView};
use mallbots_stores::domain::commands;
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::routes::CommandResponse;
use crate::state::AppState;

/// Request body for PUT /products/{id}/rebrand.
#[derive(Debug, Deserialize)]
pub struct RebrandProductRequest {
    /// The new name.
    pub name: String,
    /// The new description.
    #[serde(default)]
    pub description: String,
}

/// Request body for the price change routes.
#[derive(Debug, Deserialize)]
pub struct PriceChangeRequest {
    /// Amount to add or subtract; must be positive.
    pub delta: f64,
}

/// PUT /products/{id}/rebrand
#[instrument(skip(state, request))]
async fn rebrand_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(request): Json<RebrandProductRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::RebrandProduct {
        correlation_id: Uuid::new_v4(),
        product_id,
        name: request.name,
        description: request.description,
    };

    info!(correlation_id = %command.correlation_id, "handling rebrand_product command");

    let result = run_scoped(state.scopes.as_ref(), |scope| async move {
        command_handlers::handle_rebrand_product(&command, &scope).await
    })
    .await?;

    Ok(Json(result.into()))
}

/// PUT /products/{id}/increase-price
#[instrument(skip(state, request), fields(delta = request.delta))]
async fn increase_price(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(request): Json<PriceChangeRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::IncreaseProductPrice {
        correlation_id: Uuid::new_v4(),
        product_id,
        delta: request.delta,
    };

    info!(correlation_id = %command.correlation_id, "handling increase_product_price command");

    let result = run_scoped(state.scopes.as_ref(), |scope| async move {
        command_handlers::handle_increase_product_price(&command, &scope).await
    })
    .await?;

    Ok(Json(result.into()))
}

/// PUT /products/{id}/decrease-price
#[instrument(skip(state, request), fields(delta = request.delta))]
async fn decrease_price(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(request): Json<PriceChangeRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::DecreaseProductPrice {
        correlation_id: Uuid::new_v4(),
        product_id,
        delta: request.delta,
    };

    info!(correlation_id = %command.correlation_id, "handling decrease_product_price command");

    let result = run_scoped(state.scopes.as_ref(), |scope| async move {
        command_handlers::handle_decrease_product_price(&command, &scope).await
    })
    .await?;

    Ok(Json(result.into()))
}

/// DELETE /products/{id}
#[instrument(skip(state))]
async fn remove_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<CommandResponse>, ApiError> {
    let command = commands::RemoveProduct {
        correlation_id: Uuid::new_v4(),
        product_id,
    };

    info!(correlation_id = %command.correlation_id, "handling remove_product command");

    let result = run_scoped(state.scopes.as_ref(), |scope| async move {
        command_handlers::handle_remove_product(&command, &scope).await
    })
    .await?;

    Ok(Json(result.into()))
}

/// GET /products/{id}
#[instrument(skip(state))]
async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Json<ProductView>, ApiError> {
    let view = run_scoped(state.scopes.as_ref(), |scope| async move {
        query_handlers::get_product(product_id, &scope).await
    })
    .await?;

    Ok(Json(view))
}

/// Returns the router for catalog products.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products/{id}", get(get_product).delete(remove_product))
        .route("/products/{id}/rebrand", put(rebrand_product))
        .route("/products/{id}/increase-price", put(increase_price))
        .route("/products/{id}/decrease-price", put(decrease_price))
}
