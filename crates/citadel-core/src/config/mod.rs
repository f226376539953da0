//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: `Default` implementations below
//! 2. **Config file**: TOML file named by the `CITADEL_CONFIG` env var (default
//!    `config/config.toml`, optional)
//! 3. **Environment variables**: `CITADEL__SECTION__FIELD` overrides a single field
//!
//! The endpoint list and the race parameters are read once at startup and handed to the proxy
//! engine as immutable values. Nothing here is mutable at runtime.
//!
//! # Example
//!
//! ```toml
//! branding = "Citadel Proxy Active"
//!
//! [server]
//! bind_port = 3030
//!
//! [race]
//! fast_tier_size = 3
//! request_timeout_ms = 8000
//!
//! [[upstreams.endpoints]]
//! name = "bnbchain"
//! url = "https://bsc-testnet.bnbchain.org"
//!
//! [[upstreams.endpoints]]
//! url = "https://bsc-testnet.publicnode.com"
//! ```

use crate::upstream::{Endpoint, EndpointSet, HttpClientConfig};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// HTTP server configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// IP address to bind the server to. Defaults to `127.0.0.1`.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port number to listen on. Must be greater than 0. Defaults to `3030`.
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Maximum number of inbound requests handled concurrently. Defaults to `500`.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Largest accepted request body in bytes. Defaults to 1 MiB.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Additional path the RPC handler is mounted on, next to `/`. Defaults to `/api/rpc`.
    #[serde(default = "default_rpc_path")]
    pub rpc_path: String,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    3030
}

fn default_max_concurrent_requests() -> usize {
    500
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

fn default_rpc_path() -> String {
    "/api/rpc".to_string()
}

/// One entry of the ordered upstream list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Label for logs and metrics. Derived from the URL host when omitted.
    #[serde(default)]
    pub name: Option<String>,

    /// HTTP(S) JSON-RPC URL.
    pub url: String,
}

impl EndpointConfig {
    fn to_endpoint(&self) -> Endpoint {
        match &self.name {
            Some(name) => Endpoint::new(name.as_str(), self.url.as_str()),
            None => Endpoint::from_url(self.url.as_str()),
        }
    }
}

/// Ordered upstream list and shared HTTP client limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamsConfig {
    /// Upstream nodes in preference order. Cannot be empty.
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<EndpointConfig>,

    /// Maximum upstream requests in flight across all inbound requests. Defaults to `1000`.
    #[serde(default = "default_max_upstream_connections")]
    pub max_concurrent_requests: usize,

    /// TCP/TLS connect timeout in milliseconds. Defaults to `5000`.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_endpoints() -> Vec<EndpointConfig> {
    [
        "https://bsc-testnet.bnbchain.org",
        "https://bsc-testnet.publicnode.com",
        "https://data-seed-prebsc-1-s1.binance.org:8545",
        "https://data-seed-prebsc-2-s1.binance.org:8545",
        "https://data-seed-prebsc-1-s2.binance.org:8545",
        "https://data-seed-prebsc-2-s3.binance.org:8545",
        "https://bsc-testnet.drpc.org",
    ]
    .into_iter()
    .map(|url| EndpointConfig { name: None, url: url.to_string() })
    .collect()
}

fn default_max_upstream_connections() -> usize {
    1000
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

/// Two-tier race parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Number of leading endpoints raced in the first tier. Defaults to `3`.
    #[serde(default = "default_fast_tier_size")]
    pub fast_tier_size: usize,

    /// Deadline for each individual upstream attempt, in milliseconds. Defaults to `8000`.
    ///
    /// Production traffic usually wants this tighter; slow test networks looser.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_fast_tier_size() -> usize {
    3
}

fn default_request_timeout_ms() -> u64 {
    8000
}

/// Application logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is unset. Defaults to `"info"`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: `"json"` or `"pretty"`. Defaults to `"pretty"`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment environment (e.g., "development", "production").
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Identifier reported by the liveness probe.
    #[serde(default = "default_branding")]
    pub branding: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub upstreams: UpstreamsConfig,

    #[serde(default)]
    pub race: RaceConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_branding() -> String {
    "Citadel Proxy Active".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            max_concurrent_requests: default_max_concurrent_requests(),
            max_body_bytes: default_max_body_bytes(),
            rpc_path: default_rpc_path(),
        }
    }
}

impl Default for UpstreamsConfig {
    fn default() -> Self {
        Self {
            endpoints: default_endpoints(),
            max_concurrent_requests: default_max_upstream_connections(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            fast_tier_size: default_fast_tier_size(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format() }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            branding: default_branding(),
            server: ServerConfig::default(),
            upstreams: UpstreamsConfig::default(),
            race: RaceConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// A missing file is not an error; compiled defaults apply. Environment variables with the
    /// `CITADEL__` prefix override single values (e.g. `CITADEL__RACE__REQUEST_TIMEOUT_MS=4000`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be parsed or deserialized.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(config_path.as_ref()).required(false))
            .add_source(Environment::with_prefix("CITADEL").prefix_separator("__").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Loads `config/config.toml` (or the file named by `CITADEL_CONFIG`) and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if loading fails or the result does not pass
    /// [`validate`](Self::validate).
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CITADEL_CONFIG").unwrap_or_else(|_| "config/config.toml".to_string());
        let config = Self::from_file(&config_path)?;
        config.validate().map_err(ConfigError::Message)?;
        Ok(config)
    }

    /// Validates the configuration for correctness and consistency.
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        if self.upstreams.endpoints.is_empty() {
            return Err("No upstream RPC endpoints configured".to_string());
        }

        for endpoint in &self.upstreams.endpoints {
            let Ok(url) = reqwest::Url::parse(&endpoint.url) else {
                return Err(format!("Invalid upstream URL: {}", endpoint.url));
            };
            if !matches!(url.scheme(), "http" | "https") {
                return Err(format!("Upstream URL must use http or https: {}", endpoint.url));
            }
        }

        if self.race.fast_tier_size == 0 {
            return Err("Fast tier size must be greater than 0".to_string());
        }

        if self.race.request_timeout_ms == 0 {
            return Err("Request timeout must be greater than 0".to_string());
        }

        if self.server.bind_port == 0 {
            return Err("Bind port must be greater than 0".to_string());
        }

        if self.server.max_concurrent_requests == 0 {
            return Err("Max concurrent requests must be greater than 0".to_string());
        }

        if self.upstreams.max_concurrent_requests == 0 {
            return Err("Upstream max concurrent requests must be greater than 0".to_string());
        }

        if !self.server.rpc_path.starts_with('/') {
            return Err(format!("RPC path must start with '/': {}", self.server.rpc_path));
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err("Logging format must be 'json' or 'pretty'".to_string());
        }

        Ok(())
    }

    /// Builds the immutable, tiered endpoint list.
    #[must_use]
    pub fn endpoint_set(&self) -> EndpointSet {
        EndpointSet::new(
            self.upstreams.endpoints.iter().map(EndpointConfig::to_endpoint).collect(),
            self.race.fast_tier_size,
        )
    }

    /// Per-attempt upstream deadline.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.race.request_timeout_ms)
    }

    /// HTTP client settings derived from the upstream section.
    #[must_use]
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            concurrent_limit: self.upstreams.max_concurrent_requests,
            connect_timeout_ms: self.upstreams.connect_timeout_ms,
            ..HttpClientConfig::default()
        }
    }

    /// Returns the parsed socket address for the HTTP server.
    ///
    /// # Errors
    ///
    /// Returns an error string if the address cannot be parsed.
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, String> {
        format!("{}:{}", self.server.bind_address, self.server.bind_port).parse().map_err(|_| {
            format!("Invalid socket address: {}:{}", self.server.bind_address, self.server.bind_port)
        })
    }
}
