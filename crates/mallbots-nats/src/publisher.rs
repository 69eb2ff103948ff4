//! JetStream implementation of the `MessagePublisher` trait.

use async_nats::HeaderMap;
use async_nats::jetstream::Context;
use async_trait::async_trait;
use bytes::Bytes;
use mallbots_core::error::DomainError;
use mallbots_core::publisher::{IntegrationEvent, MessagePublisher};
use tracing::{debug, instrument};

use crate::stream::subject_prefix;

/// JetStream de-duplication header.
pub const MSG_ID_HEADER: &str = "Nats-Msg-Id";

/// Carries the wire event name so consumers can route without decoding.
pub const EVENT_NAME_HEADER: &str = "Mallbots-Event-Name";

/// Publishes integration events to a JetStream stream.
pub struct JetStreamPublisher {
    jetstream: Context,
    subject_prefix: String,
}

impl JetStreamPublisher {
    /// Creates a publisher for the channels of `stream`.
    #[must_use]
    pub fn new(jetstream: Context, stream: &str) -> Self {
        Self {
            jetstream,
            subject_prefix: subject_prefix(stream),
        }
    }

    /// Subject that carries `channel`.
    #[must_use]
    pub fn subject(&self, channel: &str) -> String {
        channel_subject(&self.subject_prefix, channel)
    }
}

impl std::fmt::Debug for JetStreamPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JetStreamPublisher")
            .field("subject_prefix", &self.subject_prefix)
            .finish_non_exhaustive()
    }
}

fn channel_subject(prefix: &str, channel: &str) -> String {
    format!("{prefix}.{channel}")
}

fn encode(event: &IntegrationEvent) -> Result<(HeaderMap, Bytes), DomainError> {
    let body = serde_json::to_vec(event).map_err(|e| {
        DomainError::Infrastructure(format!("failed to encode integration event: {e}"))
    })?;
    let mut headers = HeaderMap::new();
    headers.insert(MSG_ID_HEADER, event.id.to_string().as_str());
    headers.insert(EVENT_NAME_HEADER, event.name.as_str());
    Ok((headers, Bytes::from(body)))
}

#[async_trait]
impl MessagePublisher for JetStreamPublisher {
    #[instrument(skip_all, fields(channel = %channel, event_id = %event.id, event_name = %event.name))]
    async fn publish(&self, channel: &str, event: IntegrationEvent) -> Result<(), DomainError> {
        let subject = self.subject(channel);
        let (headers, payload) = encode(&event)?;

        let ack = self
            .jetstream
            .publish_with_headers(subject.clone(), headers, payload)
            .await
            .map_err(|e| DomainError::Infrastructure(format!("failed to publish: {e}")))?
            .await
            .map_err(|e| DomainError::Infrastructure(format!("publish ack failed: {e}")))?;

        debug!(
            subject = %subject,
            stream = %ack.stream,
            sequence = ack.sequence,
            duplicate = ack.duplicate,
            "integration event published"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mallbots_test_support::fixed_now;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    fn event() -> IntegrationEvent {
        IntegrationEvent {
            id: Uuid::new_v4(),
            name: "storesapi.StoreCreated".to_owned(),
            occurred_at: fixed_now(),
            payload: json!({"id": Uuid::nil(), "name": "Acme", "location": "NY"}),
        }
    }

    #[test]
    fn test_channel_subject_nests_under_prefix() {
        assert_eq!(channel_subject("mallbots", "store"), "mallbots.store");
        assert_eq!(channel_subject("mallbots", "product"), "mallbots.product");
    }

    #[test]
    fn test_encode_sets_dedup_and_name_headers() {
        // Arrange
        let event = event();

        // Act
        let (headers, body) = encode(&event).unwrap();

        // Assert
        assert_eq!(
            headers.get(MSG_ID_HEADER).map(|v| v.as_str()),
            Some(event.id.to_string().as_str())
        );
        assert_eq!(
            headers.get(EVENT_NAME_HEADER).map(|v| v.as_str()),
            Some("storesapi.StoreCreated")
        );
        let decoded: IntegrationEvent = serde_json::from_slice(&body).unwrap();
        assert_eq!(decoded, event);
    }
}
