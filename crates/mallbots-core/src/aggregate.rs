//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// Trait for aggregate roots that record domain events as they change.
///
/// Aggregates are persisted as current state; the events they record are
/// relayed to other systems and then discarded.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Apply an event to mutate internal state.
    fn apply(&mut self, event: &Self::Event);

    /// Returns events recorded since the aggregate was loaded.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Removes and returns the recorded events, leaving none behind.
    fn take_uncommitted_events(&mut self) -> Vec<Self::Event>;
}
