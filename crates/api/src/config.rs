use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};

use domain::models::{BoundingBox, Coordinates};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    /// JWT authentication configuration
    pub jwt: JwtAuthConfig,
    pub storage: StorageConfig,
    pub import: ImportConfig,
    pub worker: WorkerConfig,
    pub geocoding: GeocodingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Upper bound for request bodies, uploads included.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn pool_config(&self) -> persistence::db::DatabaseConfig {
        persistence::db::DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtAuthConfig {
    /// RSA public key in PEM format for verifying tokens
    pub public_key: String,

    /// Leeway in seconds for clock skew tolerance
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding uploaded imports and generated exports.
    #[serde(default = "default_storage_root")]
    pub root: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// Uploads with more data rows are rejected.
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,

    /// Rows transformed concurrently within one job.
    #[serde(default = "default_row_concurrency")]
    pub row_concurrency: usize,

    /// Progress is persisted after this many rows.
    #[serde(default = "default_flush_every")]
    pub flush_every: usize,

    #[serde(default = "default_deleted_retention_days")]
    pub deleted_retention_days: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Whether this process runs the import/export dispatchers.
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_dispatch_interval")]
    pub dispatch_interval_secs: u64,

    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingConfig {
    /// photon, here or nominatim
    #[serde(default = "default_geocoding_provider")]
    pub provider: String,

    /// Provider endpoint; empty selects the provider's public endpoint.
    #[serde(default)]
    pub base_url: String,

    /// API key (HERE only).
    #[serde(default)]
    pub api_key: String,

    /// Appended to every query when set.
    #[serde(default)]
    pub country: String,

    #[serde(default = "default_geocoding_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_geocoding_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Minimum delay between two provider calls.
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    pub bounding_box: Option<BoundingBoxConfig>,

    #[serde(default)]
    pub center_of_gravity: Option<PointConfig>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BoundingBoxConfig {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

impl From<BoundingBoxConfig> for BoundingBox {
    fn from(c: BoundingBoxConfig) -> Self {
        BoundingBox {
            min_lat: c.min_lat,
            min_lng: c.min_lng,
            max_lat: c.max_lat,
            max_lng: c.max_lng,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PointConfig {
    pub lat: f64,
    pub lng: f64,
}

impl From<PointConfig> for Coordinates {
    fn from(c: PointConfig) -> Self {
        Coordinates::new(c.lat, c.lng)
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_body_size() -> usize {
    20 * 1024 * 1024
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_jwt_leeway() -> u64 {
    30
}
fn default_storage_root() -> String {
    "data".to_string()
}
fn default_max_rows() -> usize {
    5000
}
fn default_row_concurrency() -> usize {
    1
}
fn default_flush_every() -> usize {
    25
}
fn default_deleted_retention_days() -> u32 {
    30
}
fn default_true() -> bool {
    true
}
fn default_dispatch_interval() -> u64 {
    15
}
fn default_shutdown_timeout() -> u64 {
    30
}
fn default_geocoding_provider() -> String {
    "photon".to_string()
}
fn default_geocoding_timeout_ms() -> u64 {
    10_000
}
fn default_geocoding_attempts() -> u32 {
    3
}
fn default_initial_backoff_ms() -> u64 {
    500
}
fn default_max_backoff_ms() -> u64 {
    8_000
}
fn default_throttle_ms() -> u64 {
    1_000
}
fn default_user_agent() -> String {
    format!("culture-map/{}", env!("CARGO_PKG_VERSION"))
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml
    /// 2. config/local.toml (optional, not in git)
    /// 3. Environment variables with CM__ prefix, e.g. `CM__GEOCODING__PROVIDER`
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("CM").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Builds a config from embedded defaults plus overrides, without touching the file system.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [database]
            url = ""
            max_connections = 20
            min_connections = 5

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []

            [jwt]
            public_key = "test-public-key"
            leeway_secs = 30

            [storage]
            root = "data"

            [import]
            max_rows = 5000
            row_concurrency = 1
            flush_every = 25
            deleted_retention_days = 30

            [worker]
            enabled = false
            dispatch_interval_secs = 15

            [geocoding]
            provider = "photon"
            throttle_ms = 0
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "CM__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.import.row_concurrency == 0 || self.import.flush_every == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "import.row_concurrency and import.flush_every must be positive".to_string(),
            ));
        }

        if !["photon", "here", "nominatim"].contains(&self.geocoding.provider.as_str()) {
            return Err(ConfigValidationError::InvalidValue(format!(
                "Unknown geocoding provider: {}",
                self.geocoding.provider
            )));
        }

        if self.geocoding.provider == "here" && self.geocoding.api_key.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "geocoding.api_key is required for the HERE provider".to_string(),
            ));
        }

        if let Some(bbox) = self.geocoding.bounding_box {
            if !BoundingBox::from(bbox).is_valid() {
                return Err(ConfigValidationError::InvalidValue(
                    "geocoding.bounding_box is not a valid box".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
