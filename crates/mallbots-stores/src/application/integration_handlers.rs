//! Relays domain events to the broker as integration events.
//!
//! [`translate`] maps each of the nine domain event kinds onto its wire
//! schema and channel. [`IntegrationEventHandlers`] runs inside the unit of
//! work that recorded the event, so a failed publish rolls the work back.

use std::sync::Arc;

use async_trait::async_trait;
use mallbots_core::dispatcher::{EventHandler, HandlerRegistryBuilder};
use mallbots_core::error::DomainError;
use mallbots_core::event::DomainEvent;
use mallbots_core::publisher::{IntegrationEvent, MessagePublisher};
use serde::Serialize;
use tracing::debug;

use crate::domain::events::{ALL_EVENTS, StoresEvent, StoresEventKind};
use crate::integration::{
    self, PRODUCT_ADDED, PRODUCT_CHANNEL, PRODUCT_PRICE_DECREASED, PRODUCT_PRICE_INCREASED,
    PRODUCT_REBRANDED, PRODUCT_REMOVED, STORE_CHANNEL, STORE_CREATED,
    STORE_PARTICIPATION_TOGGLED, STORE_REBRANDED,
};

/// An integration event addressed to its channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMessage {
    /// Target channel.
    pub channel: &'static str,
    /// Wire event.
    pub event: IntegrationEvent,
}

fn to_wire<T: Serialize>(payload: &T) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(payload).map_err(|e| {
        DomainError::Infrastructure(format!("integration event serialization failed: {e}"))
    })
}

/// Maps a domain event onto its integration event and channel.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the wire payload cannot be
/// serialized.
pub fn translate(event: &StoresEvent) -> Result<ChannelMessage, DomainError> {
    let id = event.aggregate_id();
    let (channel, name, payload) = match &event.kind {
        StoresEventKind::StoreCreated(created) => (
            STORE_CHANNEL,
            STORE_CREATED,
            to_wire(&integration::StoreCreated {
                id,
                name: created.name.clone(),
                location: created.location.clone(),
            })?,
        ),
        StoresEventKind::StoreParticipationEnabled(_) => (
            STORE_CHANNEL,
            STORE_PARTICIPATION_TOGGLED,
            to_wire(&integration::StoreParticipationToggled {
                id,
                participating: true,
            })?,
        ),
        StoresEventKind::StoreParticipationDisabled(_) => (
            STORE_CHANNEL,
            STORE_PARTICIPATION_TOGGLED,
            to_wire(&integration::StoreParticipationToggled {
                id,
                participating: false,
            })?,
        ),
        StoresEventKind::StoreRebranded(rebranded) => (
            STORE_CHANNEL,
            STORE_REBRANDED,
            to_wire(&integration::StoreRebranded {
                id,
                name: rebranded.name.clone(),
            })?,
        ),
        StoresEventKind::ProductAdded(added) => (
            PRODUCT_CHANNEL,
            PRODUCT_ADDED,
            to_wire(&integration::ProductAdded {
                id,
                store_id: added.store_id,
                name: added.name.clone(),
                description: added.description.clone(),
                sku: added.sku.clone(),
                price: added.price,
            })?,
        ),
        StoresEventKind::ProductRebranded(rebranded) => (
            PRODUCT_CHANNEL,
            PRODUCT_REBRANDED,
            to_wire(&integration::ProductRebranded {
                id,
                name: rebranded.name.clone(),
                description: rebranded.description.clone(),
            })?,
        ),
        StoresEventKind::ProductPriceIncreased(changed) => (
            PRODUCT_CHANNEL,
            PRODUCT_PRICE_INCREASED,
            to_wire(&integration::ProductPriceChanged {
                id,
                delta: changed.delta,
            })?,
        ),
        StoresEventKind::ProductPriceDecreased(changed) => (
            PRODUCT_CHANNEL,
            PRODUCT_PRICE_DECREASED,
            to_wire(&integration::ProductPriceChanged {
                id,
                delta: changed.delta,
            })?,
        ),
        StoresEventKind::ProductRemoved(_) => (
            PRODUCT_CHANNEL,
            PRODUCT_REMOVED,
            to_wire(&integration::ProductRemoved { id })?,
        ),
    };

    Ok(ChannelMessage {
        channel,
        event: IntegrationEvent {
            id: event.metadata.event_id,
            name: name.to_owned(),
            occurred_at: event.metadata.occurred_at,
            payload,
        },
    })
}

/// Translates and publishes every domain event it is subscribed to.
pub struct IntegrationEventHandlers {
    publisher: Arc<dyn MessagePublisher>,
}

impl IntegrationEventHandlers {
    /// Creates handlers that publish through `publisher`.
    #[must_use]
    pub fn new(publisher: Arc<dyn MessagePublisher>) -> Self {
        Self { publisher }
    }
}

#[async_trait]
impl EventHandler<StoresEvent> for IntegrationEventHandlers {
    async fn handle_event(&self, event: &StoresEvent) -> Result<(), DomainError> {
        let ChannelMessage { channel, event: wire } = translate(event)?;
        debug!(
            channel,
            event_name = %wire.name,
            aggregate_id = %event.aggregate_id(),
            "publishing integration event"
        );
        self.publisher.publish(channel, wire).await
    }
}

/// Subscribes `handlers` to every domain event this context records.
#[must_use]
pub fn register_integration_event_handlers(
    builder: HandlerRegistryBuilder<StoresEvent>,
    handlers: Arc<IntegrationEventHandlers>,
) -> HandlerRegistryBuilder<StoresEvent> {
    builder.subscribe(handlers, &ALL_EVENTS)
}
