use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use chrono::Datelike;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fieldday_api::config::{GalleryBackend, ServerConfig};
use fieldday_api::router::build_app_router;
use fieldday_api::state::AppState;
use fieldday_cloud::{InMemoryObjectStore, S3ObjectStore};
use fieldday_core::store::GalleryProtection;
use fieldday_db::memory::{InMemoryCatalog, InMemoryYearConfigs};
use fieldday_db::repositories::{PgMediaCatalog, PgYearConfigStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fieldday_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");
    if config.admin_api_key.is_none() {
        tracing::warn!("ADMIN_API_KEY is not set; admin endpoints are disabled");
    }
    if config.storage_event_secret.is_none() {
        tracing::warn!("STORAGE_EVENT_SECRET is not set; storage notifications are unauthenticated");
    }

    // --- Stores ---
    let state = build_state(&config).await?;

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST address")?,
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Wire the collaborator stores for the configured backend.
async fn build_state(config: &ServerConfig) -> anyhow::Result<AppState> {
    let shared_config = Arc::new(config.clone());

    match &config.backend {
        GalleryBackend::Postgres {
            database_url,
            bucket,
        } => {
            let pool = fieldday_db::create_pool(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connection pool created");

            fieldday_db::health_check(&pool)
                .await
                .context("Database health check failed")?;
            tracing::info!("Database health check passed");

            fieldday_db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            let objects = S3ObjectStore::from_env(bucket.clone()).await;
            tracing::info!(bucket = %objects.bucket(), "S3 object store configured");

            Ok(AppState {
                config: shared_config,
                years: Arc::new(PgYearConfigStore::new(pool.clone())),
                catalog: Arc::new(PgMediaCatalog::new(pool)),
                objects: Arc::new(objects),
            })
        }
        GalleryBackend::Memory { public_base_url } => {
            // Year administration lives elsewhere; seed the current year as
            // an open gallery so local development has something to hit.
            let years = InMemoryYearConfigs::new();
            let current_year = chrono::Utc::now().year();
            years.insert(GalleryProtection::open(current_year)).await;
            tracing::warn!(
                base_url = %public_base_url,
                seeded_year = current_year,
                "Using in-memory stores; nothing survives a restart"
            );
            Ok(AppState {
                config: shared_config,
                years: Arc::new(years),
                catalog: Arc::new(InMemoryCatalog::new()),
                objects: Arc::new(InMemoryObjectStore::new(public_base_url.clone())),
            })
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
