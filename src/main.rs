//! Server binary: reads settings, connects the pool, mounts common and resource routes.

use shop_api::{app, ensure_database_exists, AppState, PgStore, RecordStore, Settings, RESOURCES};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("shop_api=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    if settings.ensure_database {
        ensure_database_exists(&settings.database_url).await?;
    }
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect_lazy(&settings.database_url)?;
    let store = PgStore::new(pool, settings.schema.clone());

    match store.ping().await {
        Ok(()) => tracing::info!("database connection established"),
        Err(e) => tracing::error!(error = %e, "could not connect to the database"),
    }
    if settings.ensure_tables {
        store.ensure_tables(&RESOURCES).await?;
    }

    let state = AppState::new(Arc::new(store.clone()));
    let router = app(state, settings.body_limit_bytes);

    let listener = TcpListener::bind(settings.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.pool().close().await;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
