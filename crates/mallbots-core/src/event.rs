//! Domain event abstractions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata attached to every domain event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Event name used for handler lookup.
    pub event_name: String,
    /// Aggregate this event belongs to.
    pub aggregate_id: Uuid,
    /// Correlation ID for tracing a command through its effects.
    pub correlation_id: Uuid,
    /// Timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
}

/// Capability every domain event exposes to the dispatcher.
///
/// Dispatch only ever needs the name and the aggregate identifier; the
/// payload is opaque to everything except the handlers that subscribe.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Returns the event name (used for handler lookup).
    fn event_name(&self) -> &'static str;

    /// Returns the identifier of the aggregate that recorded the event.
    fn aggregate_id(&self) -> Uuid {
        self.metadata().aggregate_id
    }

    /// Serializes the event payload to JSON.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if the payload cannot be represented as JSON.
    fn payload(&self) -> Result<serde_json::Value, serde_json::Error>;

    /// Returns the metadata for this event.
    fn metadata(&self) -> &EventMetadata;
}
