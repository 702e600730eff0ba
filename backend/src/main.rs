use actix_web::{App, HttpServer};
use std::sync::Arc;
use tokio::signal;

mod config;
mod db;
mod api_error;
mod telemetry;
mod middleware;
mod models;
mod store;
mod http;
mod service;

use crate::config::{Config, StoreBackend};
use crate::db::{create_pool, run_migrations};
use crate::telemetry::init_telemetry;
use crate::middleware::cors_middleware;
use crate::store::{MemoryStore, PgStore, SharedStore};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize telemetry
    init_telemetry(&config.server.rust_log);

    // Pick the store; the pool is kept so it can be closed on shutdown
    let (store, db_pool) = match config.store {
        StoreBackend::Postgres => {
            let pool = create_pool(&config).await?;
            run_migrations(&pool).await?;
            tracing::info!("Database migrations applied");
            (Arc::new(PgStore::new(pool.clone())) as SharedStore, Some(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            (Arc::new(MemoryStore::new()) as SharedStore, None)
        }
    };

    tracing::info!(
        backend = ?config.store,
        "Starting league backend on {}:{}",
        config.server.host,
        config.server.port
    );

    let cors = config.cors.clone();
    let server = HttpServer::new(move || {
        let store = store.clone();
        App::new()
            .configure(move |cfg| crate::http::register_services(cfg, store))
            .wrap(cors_middleware(&cors))
            .wrap(actix_web::middleware::Logger::default())
            .configure(crate::http::configure_routes)
    })
    .bind((config.server.host.clone(), config.server.port))?
    .run();

    // Graceful shutdown
    let server_handle = server.handle();
    tokio::spawn(async move {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for shutdown signal");
            return;
        }
        tracing::info!("Shutdown signal received, stopping server...");
        server_handle.stop(true).await;
    });

    server.await?;

    if let Some(pool) = db_pool {
        pool.close().await;
        tracing::info!("Database pool closed");
    }

    Ok(())
}
