//! Mallbots stores API server entry point.

use std::sync::Arc;

use mallbots_api::app::build_app;
use mallbots_api::config::AppConfig;
use mallbots_api::error::AppError;
use mallbots_api::server::{serve, shutdown_signal};
use mallbots_api::state::AppState;
use mallbots_api::telemetry;
use mallbots_core::clock::SystemClock;
use mallbots_core::dispatcher::HandlerRegistry;
use mallbots_nats::{JetStreamPublisher, connect, provision_stream};
use mallbots_postgres::PgScopeProvider;
use mallbots_stores::application::integration_handlers::{
    IntegrationEventHandlers, register_integration_event_handlers,
};
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let telemetry = telemetry::init(&config)?;

    tracing::info!(environment = %config.environment, "starting Mallbots stores API server");

    // Create database connection pool and bring the schema up to date.
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await?;
    mallbots_postgres::migrate(&pool)
        .await
        .map_err(AppError::Migration)?;

    // Connect to the broker; the stream must exist before any command runs.
    let client = connect(&config.nats).await.map_err(AppError::Broker)?;
    let jetstream = async_nats::jetstream::new(client);
    provision_stream(&jetstream, &config.nats.stream)
        .await
        .map_err(AppError::Broker)?;

    // Wire the relay: every stores event is published to its channel.
    let publisher = Arc::new(JetStreamPublisher::new(jetstream, &config.nats.stream));
    let handlers = Arc::new(IntegrationEventHandlers::new(publisher));
    let registry =
        register_integration_event_handlers(HandlerRegistry::builder(), handlers).build();
    tracing::info!(events = ?registry.event_names(), "integration event handlers registered");

    let scopes = PgScopeProvider::new(pool.clone(), registry, Arc::new(SystemClock));
    let app = build_app(AppState::new(Arc::new(scopes)), config.request_timeout);

    let addr = config.addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    let served = serve(listener, app, shutdown_signal(), config.shutdown_timeout).await;

    pool.close().await;
    tracing::info!("server stopped");
    telemetry.shutdown();

    served
}
