//! Route modules.

pub mod health;
pub mod products;
pub mod stores;

use axum::Router;
use mallbots_stores::application::command_handlers::StoresCommandResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;

/// Response body returned after a command is successfully handled.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The aggregate the command created or changed.
    pub aggregate_id: Uuid,
    /// IDs of the domain events recorded and relayed.
    pub event_ids: Vec<Uuid>,
}

impl From<StoresCommandResult> for CommandResponse {
    fn from(result: StoresCommandResult) -> Self {
        Self {
            event_ids: result.event_ids(),
            aggregate_id: result.aggregate_id,
        }
    }
}

/// Returns every `/api/v1` route.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(stores::router())
        .merge(products::router())
}
