//! NATS JetStream adapter for integration events.
//!
//! Every channel maps onto a subject under one stream. Publishing waits for
//! the JetStream acknowledgement, so a returned `Ok` means the event is
//! stored.

pub mod connection;
pub mod publisher;
pub mod stream;

pub use connection::{NatsConfig, connect};
pub use publisher::JetStreamPublisher;
pub use stream::provision_stream;
