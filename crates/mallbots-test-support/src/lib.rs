//! Shared test mocks and utilities for the Mallbots stores service.

mod clock;
mod handler;
mod publisher;

pub use clock::{FixedClock, fixed_now};
pub use handler::{FailingEventHandler, RecordingEventHandler};
pub use publisher::{FailingPublisher, RecordingPublisher};
