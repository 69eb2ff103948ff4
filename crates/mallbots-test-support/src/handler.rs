//! Test event handlers: mock `EventHandler` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use mallbots_core::dispatcher::EventHandler;
use mallbots_core::error::DomainError;
use mallbots_core::event::DomainEvent;

/// A handler that records the name of every event it sees.
#[derive(Debug, Default)]
pub struct RecordingEventHandler {
    seen: Mutex<Vec<&'static str>>,
}

impl RecordingEventHandler {
    /// Create a handler with an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the names of handled events, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn seen(&self) -> Vec<&'static str> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl<E: DomainEvent> EventHandler<E> for RecordingEventHandler {
    async fn handle_event(&self, event: &E) -> Result<(), DomainError> {
        self.seen.lock().unwrap().push(event.event_name());
        Ok(())
    }
}

/// A handler that fails every event it is given.
#[derive(Debug)]
pub struct FailingEventHandler;

#[async_trait]
impl<E: DomainEvent> EventHandler<E> for FailingEventHandler {
    async fn handle_event(&self, _event: &E) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("handler failed".into()))
    }
}
