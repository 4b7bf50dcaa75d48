//! KVQ Server - Main Entry Point

use kvq_api::{
    build_router, ApiState, FileSnapshotStore, ServerConfig, SnapshotSaver, SnapshotStore,
};
use kvq_common::SystemClock;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::oneshot;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("KVQ server v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::from_env()?;
    let state = Arc::new(ApiState::new(config.clone(), Arc::new(SystemClock)));

    // Restore persisted state
    let store = config.snapshot_path.as_ref().map(FileSnapshotStore::new);
    if let Some(store) = &store {
        match store.load().await? {
            Some(snapshot) => state.restore(snapshot),
            None => tracing::info!(path = %store.path().display(), "no snapshot, starting empty"),
        }
    }

    let sweeper = state.sweeper().spawn();
    let saver = store.as_ref().map(|store| {
        let store: Arc<dyn SnapshotStore> = Arc::new(store.clone());
        let (stop, stopped) = oneshot::channel();
        let saver = SnapshotSaver::new(state.clone(), store, config.snapshot_interval());
        (stop, saver.spawn(stopped))
    });

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "listening");
    axum::serve(listener, build_router(state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    if let Some((stop, saver)) = saver {
        let _ = stop.send(());
        if let Err(err) = saver.await {
            tracing::error!(error = %err, "snapshot saver task failed");
        }
    }
    if let Some(store) = &store {
        store.save(&state.snapshot()).await?;
        tracing::info!(path = %store.path().display(), "saved snapshot");
    }
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
