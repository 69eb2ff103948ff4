//! Stream provisioning.

use async_nats::jetstream::Context;
use async_nats::jetstream::stream::{Config as StreamConfig, RetentionPolicy, StorageType};
use mallbots_core::error::DomainError;
use tracing::info;

/// Subject prefix for every channel in `stream`.
#[must_use]
pub fn subject_prefix(stream: &str) -> String {
    stream.to_lowercase()
}

/// Configuration of the stream that captures every channel subject.
#[must_use]
pub fn stream_config(stream: &str) -> StreamConfig {
    StreamConfig {
        name: stream.to_owned(),
        subjects: vec![format!("{}.>", subject_prefix(stream))],
        retention: RetentionPolicy::Limits,
        storage: StorageType::File,
        ..Default::default()
    }
}

/// Fetches `stream`, creating it first if it does not exist.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if JetStream is unavailable or the
/// stream cannot be created.
pub async fn provision_stream(jetstream: &Context, stream: &str) -> Result<(), DomainError> {
    jetstream
        .get_or_create_stream(stream_config(stream))
        .await
        .map_err(|e| {
            DomainError::Infrastructure(format!("failed to provision stream {stream}: {e}"))
        })?;
    info!(stream, "JetStream stream ready");
    Ok(())
}
