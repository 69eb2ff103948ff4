//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use mallbots_nats::NatsConfig;

use crate::error::AppError;

/// Everything the server needs to start, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Deployment environment name; `development` switches to pretty logs.
    pub environment: String,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// `PostgreSQL` connection string.
    pub database_url: String,
    /// Upper bound on pooled database connections.
    pub db_max_connections: u32,
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Broker connection settings.
    pub nats: NatsConfig,
    /// OTLP collector endpoint; span export is off when unset.
    pub otlp_endpoint: Option<String>,
    /// Budget for a single request before it is cancelled.
    pub request_timeout: Duration,
    /// Budget for draining in-flight requests on shutdown.
    pub shutdown_timeout: Duration,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which returns the value of a
    /// variable if it is set.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or_else(|| {
            AppError::Config("DATABASE_URL environment variable must be set".into())
        })?;

        let credentials = match (get("NATS_USERNAME"), get("NATS_PASSWORD")) {
            (Some(user), Some(password)) => Some((user, password)),
            (None, None) => None,
            _ => {
                return Err(AppError::Config(
                    "NATS_USERNAME and NATS_PASSWORD must be set together".into(),
                ));
            }
        };

        Ok(Self {
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_owned()),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_owned()),
            database_url,
            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 10)?,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port: parse_or(&get, "PORT", 3000)?,
            nats: NatsConfig {
                url: get("NATS_URL").unwrap_or_else(|| "nats://localhost:4222".to_owned()),
                stream: get("NATS_STREAM").unwrap_or_else(|| "mallbots".to_owned()),
                client_name: get("NATS_CLIENT_NAME")
                    .unwrap_or_else(|| "mallbots-stores".to_owned()),
                credentials,
            },
            otlp_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT"),
            request_timeout: Duration::from_secs(parse_or(&get, "REQUEST_TIMEOUT_SECS", 30)?),
            shutdown_timeout: Duration::from_secs(parse_or(&get, "SHUTDOWN_TIMEOUT_SECS", 30)?),
        })
    }

    /// Whether logs should be human-readable rather than JSON.
    #[must_use]
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// The socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST` and `PORT` do not form an address.
    pub fn addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} is invalid: {e}"))),
        None => Ok(default),
    }
}
