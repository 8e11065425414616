use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;

use culture_map_api::app::{create_app, AppState};
use culture_map_api::config::Config;
use culture_map_api::jobs::{
    ExportDispatchJob, ImportDispatchJob, JobCleanupJob, JobScheduler, QueueMetricsJob,
};
use culture_map_api::middleware::{init_logging, init_metrics};
use culture_map_api::services::{
    build_geocoder, ExportRunner, FileStore, ImportRunner, ImportSettings,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    init_logging(&config.logging).context("Failed to initialize logging")?;
    init_metrics().context("Failed to install Prometheus recorder")?;

    info!("Starting Culture Map API v{}", env!("CARGO_PKG_VERSION"));

    let pool = persistence::db::create_pool(&config.database.pool_config()).await?;

    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    let geocoder = build_geocoder(&config.geocoding)?;
    info!(provider = geocoder.provider(), "Geocoder ready");

    let shutdown = CancellationToken::new();
    let mut scheduler = JobScheduler::with_cancellation(shutdown.child_token());
    scheduler.register(QueueMetricsJob::new(pool.clone()));

    if config.worker.enabled {
        let files = FileStore::new(&config.storage.root);
        let settings = ImportSettings {
            max_rows: config.import.max_rows,
            row_concurrency: config.import.row_concurrency,
            flush_every: config.import.flush_every,
            bounding_box: config.geocoding.bounding_box.map(Into::into),
            center_of_gravity: config.geocoding.center_of_gravity.map(Into::into),
        };
        let interval = config.worker.dispatch_interval_secs;

        let imports = Arc::new(ImportRunner::new(
            pool.clone(),
            files.clone(),
            geocoder.clone(),
            settings,
        ));
        let exports = Arc::new(ExportRunner::new(pool.clone(), files));

        scheduler.register(ImportDispatchJob::new(pool.clone(), imports, interval));
        scheduler.register(ExportDispatchJob::new(pool.clone(), exports, interval));
        scheduler.register(JobCleanupJob::new(
            pool.clone(),
            config.import.deleted_retention_days,
        ));
    } else {
        info!("Worker disabled, jobs stay queued");
    }
    scheduler.start();

    let addr = config.socket_addr()?;
    let shutdown_timeout = Duration::from_secs(config.worker.shutdown_timeout_secs);
    let state = AppState::new(config, pool, geocoder)?;
    let app = create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(shutdown_timeout).await;
    info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C and cancels background work.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
    shutdown.cancel();
}
