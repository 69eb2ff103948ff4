//! In-process domain event dispatch.
//!
//! A [`HandlerRegistry`] maps event names to an ordered list of handlers. It
//! is assembled once at startup through [`HandlerRegistryBuilder`] and is
//! read-only afterwards. Each unit of work gets its own [`EventDispatcher`]
//! over the shared registry; handlers run on the caller's task, one after
//! another, and the first failure stops the dispatch.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::DomainError;
use crate::event::DomainEvent;

/// A subscriber to one or more domain event names.
#[async_trait]
pub trait EventHandler<E>: Send + Sync
where
    E: DomainEvent,
{
    /// Handles a single event.
    ///
    /// # Errors
    ///
    /// Any error aborts the remaining handlers and the enclosing unit of work.
    async fn handle_event(&self, event: &E) -> Result<(), DomainError>;
}

/// Immutable table of event name to subscribed handlers.
pub struct HandlerRegistry<E> {
    handlers: HashMap<&'static str, Vec<Arc<dyn EventHandler<E>>>>,
}

impl<E: DomainEvent> HandlerRegistry<E> {
    /// Starts building a registry.
    #[must_use]
    pub fn builder() -> HandlerRegistryBuilder<E> {
        HandlerRegistryBuilder {
            handlers: HashMap::new(),
        }
    }

    /// Returns the handlers subscribed to `event_name`, in registration order.
    #[must_use]
    pub fn handlers_for(&self, event_name: &str) -> &[Arc<dyn EventHandler<E>>] {
        self.handlers
            .get(event_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns every event name with at least one subscriber.
    #[must_use]
    pub fn event_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl<E> fmt::Debug for HandlerRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, handlers) in &self.handlers {
            map.entry(name, &handlers.len());
        }
        map.finish()
    }
}

/// Collects subscriptions before the registry is frozen.
pub struct HandlerRegistryBuilder<E> {
    handlers: HashMap<&'static str, Vec<Arc<dyn EventHandler<E>>>>,
}

impl<E: DomainEvent> HandlerRegistryBuilder<E> {
    /// Subscribes `handler` to each name in `event_names`.
    ///
    /// Handlers for the same name run in the order they were subscribed.
    #[must_use]
    pub fn subscribe(
        mut self,
        handler: Arc<dyn EventHandler<E>>,
        event_names: &[&'static str],
    ) -> Self {
        for name in event_names {
            self.handlers
                .entry(*name)
                .or_default()
                .push(Arc::clone(&handler));
        }
        self
    }

    /// Freezes the subscriptions into a shareable registry.
    #[must_use]
    pub fn build(self) -> Arc<HandlerRegistry<E>> {
        Arc::new(HandlerRegistry {
            handlers: self.handlers,
        })
    }
}

/// Dispatcher bound to a single unit of work.
pub struct EventDispatcher<E> {
    registry: Arc<HandlerRegistry<E>>,
}

impl<E> Clone for EventDispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<E> fmt::Debug for EventDispatcher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("registry", &self.registry)
            .finish()
    }
}

impl<E: DomainEvent> EventDispatcher<E> {
    /// Creates a dispatcher over the shared registry.
    #[must_use]
    pub fn new(registry: Arc<HandlerRegistry<E>>) -> Self {
        Self { registry }
    }

    /// Runs every handler subscribed to the event's name, in order.
    ///
    /// An event with no subscribers is accepted and ignored.
    ///
    /// # Errors
    ///
    /// Returns the first handler error; later handlers are not invoked.
    pub async fn handle_event(&self, event: &E) -> Result<(), DomainError> {
        let name = event.event_name();
        let handlers = self.registry.handlers_for(name);
        debug!(
            event_name = name,
            aggregate_id = %event.aggregate_id(),
            handlers = handlers.len(),
            "dispatching domain event"
        );

        for handler in handlers {
            if let Err(e) = handler.handle_event(event).await {
                warn!(event_name = name, error = %e, "event handler failed");
                return Err(e);
            }
        }

        Ok(())
    }

    /// Dispatches events in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first handler error raised for any event.
    pub async fn dispatch(&self, events: &[E]) -> Result<(), DomainError> {
        for event in events {
            self.handle_event(event).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::event::EventMetadata;

    #[derive(Debug)]
    struct TestEvent {
        name: &'static str,
        metadata: EventMetadata,
    }

    impl TestEvent {
        fn named(name: &'static str) -> Self {
            Self {
                name,
                metadata: EventMetadata {
                    event_id: Uuid::new_v4(),
                    event_name: name.to_owned(),
                    aggregate_id: Uuid::new_v4(),
                    correlation_id: Uuid::new_v4(),
                    occurred_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
                },
            }
        }
    }

    impl DomainEvent for TestEvent {
        fn event_name(&self) -> &'static str {
            self.name
        }

        fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
            Ok(serde_json::Value::Null)
        }

        fn metadata(&self) -> &EventMetadata {
            &self.metadata
        }
    }

    struct LoggingHandler {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl EventHandler<TestEvent> for LoggingHandler {
        async fn handle_event(&self, event: &TestEvent) -> Result<(), DomainError> {
            self.log
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.label, event.event_name()));
            Ok(())
        }
    }

    struct RejectingHandler;

    #[async_trait]
    impl EventHandler<TestEvent> for RejectingHandler {
        async fn handle_event(&self, _event: &TestEvent) -> Result<(), DomainError> {
            Err(DomainError::Infrastructure("broker unavailable".into()))
        }
    }

    fn logging(
        label: &'static str,
        log: &Arc<Mutex<Vec<String>>>,
    ) -> Arc<dyn EventHandler<TestEvent>> {
        Arc::new(LoggingHandler {
            label,
            log: Arc::clone(log),
        })
    }

    #[tokio::test]
    async fn test_handlers_run_in_registration_order() {
        // Arrange
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = HandlerRegistry::builder()
            .subscribe(logging("first", &log), &["created"])
            .subscribe(logging("second", &log), &["created", "removed"])
            .build();
        let dispatcher = EventDispatcher::new(registry);

        // Act
        dispatcher
            .handle_event(&TestEvent::named("created"))
            .await
            .unwrap();

        // Assert
        assert_eq!(
            *log.lock().unwrap(),
            vec!["first:created".to_owned(), "second:created".to_owned()]
        );
    }

    #[tokio::test]
    async fn test_unsubscribed_event_is_ignored() {
        // Arrange
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = HandlerRegistry::builder()
            .subscribe(logging("only", &log), &["created"])
            .build();
        let dispatcher = EventDispatcher::new(registry);

        // Act
        let result = dispatcher.handle_event(&TestEvent::named("renamed")).await;

        // Assert
        assert!(result.is_ok());
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_first_failure_aborts_remaining_handlers() {
        // Arrange
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = HandlerRegistry::builder()
            .subscribe(logging("before", &log), &["created"])
            .subscribe(Arc::new(RejectingHandler), &["created"])
            .subscribe(logging("after", &log), &["created"])
            .build();
        let dispatcher = EventDispatcher::new(registry);

        // Act
        let result = dispatcher.handle_event(&TestEvent::named("created")).await;

        // Assert
        match result {
            Err(DomainError::Infrastructure(msg)) => assert_eq!(msg, "broker unavailable"),
            other => panic!("expected Infrastructure, got {other:?}"),
        }
        assert_eq!(*log.lock().unwrap(), vec!["before:created".to_owned()]);
    }

    #[tokio::test]
    async fn test_dispatch_stops_at_first_failing_event() {
        // Arrange
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = HandlerRegistry::builder()
            .subscribe(logging("audit", &log), &["created", "removed"])
            .subscribe(Arc::new(RejectingHandler), &["renamed"])
            .build();
        let dispatcher = EventDispatcher::new(registry);
        let events = vec![
            TestEvent::named("created"),
            TestEvent::named("renamed"),
            TestEvent::named("removed"),
        ];

        // Act
        let result = dispatcher.dispatch(&events).await;

        // Assert
        assert!(result.is_err());
        assert_eq!(*log.lock().unwrap(), vec!["audit:created".to_owned()]);
    }

    #[test]
    fn test_registry_lists_subscribed_names() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = HandlerRegistry::builder()
            .subscribe(logging("a", &log), &["removed", "created"])
            .build();

        assert_eq!(registry.event_names(), vec!["created", "removed"]);
        assert_eq!(registry.handlers_for("created").len(), 1);
        assert!(registry.handlers_for("missing").is_empty());
    }
}
