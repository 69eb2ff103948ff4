//! Test publishers: in-memory `MessagePublisher` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use mallbots_core::error::DomainError;
use mallbots_core::publisher::{IntegrationEvent, MessagePublisher};

/// A publisher that keeps every message it accepts, in publish order.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(String, IntegrationEvent)>>,
}

impl RecordingPublisher {
    /// Create an empty recording publisher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all `(channel, event)` pairs published so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn published(&self) -> Vec<(String, IntegrationEvent)> {
        self.published.lock().unwrap().clone()
    }

    /// Returns the events published on `channel`, in publish order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn published_on(&self, channel: &str) -> Vec<IntegrationEvent> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c == channel)
            .map(|(_, e)| e.clone())
            .collect()
    }
}

#[async_trait]
impl MessagePublisher for RecordingPublisher {
    async fn publish(&self, channel: &str, event: IntegrationEvent) -> Result<(), DomainError> {
        self.published
            .lock()
            .unwrap()
            .push((channel.to_owned(), event));
        Ok(())
    }
}

/// A publisher that rejects everything, simulating a broker outage.
#[derive(Debug)]
pub struct FailingPublisher;

#[async_trait]
impl MessagePublisher for FailingPublisher {
    async fn publish(&self, _channel: &str, _event: IntegrationEvent) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("broker unavailable".into()))
    }
}
