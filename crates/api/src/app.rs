use axum::{extract::DefaultBodyLimit, middleware, routing::get, Router};
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware};
use crate::routes::{data_exports, data_imports, health};
use crate::services::{FileStore, Geocoder};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub files: FileStore,
    pub geocoder: Arc<dyn Geocoder>,
}

impl AppState {
    /// Builds the state from configuration; fails on an unreadable JWT public key.
    pub fn new(config: Config, pool: PgPool, geocoder: Arc<dyn Geocoder>) -> Result<Self, JwtError> {
        let jwt = JwtConfig::from_public_key(&config.jwt.public_key, config.jwt.leeway_secs)?;
        let files = FileStore::new(&config.storage.root);
        Ok(Self {
            pool,
            config: Arc::new(config),
            jwt: Arc::new(jwt),
            files,
            geocoder,
        })
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    // Job routes authenticate per handler through the `UserAuth` extractor
    let api_routes = Router::new()
        .nest("/api/v1/data-imports", data_imports::router())
        .nest("/api/v1/data-exports", data_exports::router())
        .layer(DefaultBodyLimit::max(config.server.max_body_size));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.security.cors_origins))
        .with_state(state)
}
