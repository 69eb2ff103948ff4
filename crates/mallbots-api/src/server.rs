//! Serving with graceful shutdown.

use std::future::Future;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::error::AppError;

/// Serves `app` on `listener` until `signal` resolves, then gives in-flight
/// requests up to `drain_timeout` to finish.
///
/// # Errors
///
/// Returns `AppError::Server` if the server fails while running.
pub async fn serve<S>(
    listener: TcpListener,
    app: Router,
    signal: S,
    drain_timeout: Duration,
) -> Result<(), AppError>
where
    S: Future<Output = ()> + Send,
{
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        joined = &mut server => return flatten(joined),
        () = signal => info!("shutdown signal received, draining requests"),
    }

    let _ = stop_tx.send(());
    if let Ok(joined) = tokio::time::timeout(drain_timeout, &mut server).await {
        flatten(joined)
    } else {
        warn!(?drain_timeout, "requests still in flight after drain timeout, aborting");
        server.abort();
        Ok(())
    }
}

fn flatten(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    joined.map_err(std::io::Error::other)??;
    Ok(())
}

/// Resolves on Ctrl-C, or on SIGTERM where available.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
