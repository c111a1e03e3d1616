// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{error::Error, sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use notes_server::{
    api::{cors_layer, router},
    auth::SessionTokens,
    config::{Config, LogFormat},
    state::AppState,
    storage::Datastore,
};

/// Grace period for in-flight requests once shutdown starts.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    tracing::info!(?config, "Configuration loaded");
    if config.has_weak_secret() {
        tracing::warn!("JWT_SECRET is shorter than 32 bytes; use a longer random value");
    }

    let store = Arc::new(Datastore::open(&config.database_path())?);
    tracing::info!(path = %config.database_path().display(), "Datastore opened");

    let tokens = SessionTokens::new(config.jwt_secret.as_bytes(), config.token_ttl());
    let state = AppState::new(store.clone(), tokens);
    let app = router(state).layer(cors_layer(&config.cors_origins));

    let addr = config.bind_addr()?;

    let shutdown = CancellationToken::new();
    let handle = Handle::new();
    tokio::spawn(watch_signals(shutdown.clone()));
    {
        let shutdown = shutdown.clone();
        let handle = handle.clone();
        tokio::spawn(async move {
            shutdown.cancelled().await;
            tracing::info!(grace_secs = SHUTDOWN_GRACE.as_secs(), "Shutting down");
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        });
    }

    match &config.tls {
        Some(tls) => {
            // Install the ring crypto provider for rustls before any TLS operations
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| "failed to install rustls crypto provider")?;

            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
            tracing::info!(%addr, "Notes server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::info!(%addr, "Notes server listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    // Release the shutdown task if the server stopped on its own
    shutdown.cancel();

    match Arc::try_unwrap(store) {
        Ok(store) => store.close(),
        Err(_) => tracing::warn!("Datastore still referenced at shutdown; leaving it to drop"),
    }

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

/// Cancel `shutdown` on SIGINT or SIGTERM.
async fn watch_signals(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    shutdown.cancel();
}
