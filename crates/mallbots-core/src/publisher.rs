//! Integration event publishing abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Wire-level event published for other systems to consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationEvent {
    /// Identifier shared with the domain event it was translated from.
    pub id: Uuid,
    /// Wire event name, e.g. `storesapi.StoreCreated`.
    pub name: String,
    /// Timestamp of the originating domain event.
    pub occurred_at: DateTime<Utc>,
    /// Wire payload.
    pub payload: serde_json::Value,
}

/// Durable, at-least-once publish primitive.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Publishes `event` on `channel`.
    ///
    /// A successful return means the broker has persisted the event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the broker is unreachable or
    /// rejects the message.
    async fn publish(&self, channel: &str, event: IntegrationEvent) -> Result<(), DomainError>;
}
