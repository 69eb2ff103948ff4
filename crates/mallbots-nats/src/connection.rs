//! Client connection settings.

use async_nats::{Client, ConnectOptions};
use mallbots_core::error::DomainError;
use tracing::info;

/// Settings for connecting to the NATS server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NatsConfig {
    /// Server URL, e.g. `nats://localhost:4222`.
    pub url: String,
    /// JetStream stream that holds every channel.
    pub stream: String,
    /// Name the client reports to the server.
    pub client_name: String,
    /// Username and password, when the server requires them.
    pub credentials: Option<(String, String)>,
}

impl NatsConfig {
    fn options(&self) -> ConnectOptions {
        let options = match &self.credentials {
            Some((user, password)) => {
                ConnectOptions::with_user_and_password(user.clone(), password.clone())
            }
            None => ConnectOptions::new(),
        };
        options.name(&self.client_name)
    }
}

/// Connects to the server described by `config`.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the server cannot be reached or
/// refuses the credentials.
pub async fn connect(config: &NatsConfig) -> Result<Client, DomainError> {
    let client = config
        .options()
        .connect(config.url.as_str())
        .await
        .map_err(|e| DomainError::Infrastructure(format!("failed to connect to NATS: {e}")))?;
    info!(url = %config.url, client_name = %config.client_name, "connected to NATS");
    Ok(client)
}
