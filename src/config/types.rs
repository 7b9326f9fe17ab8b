// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub health: HealthConfig,
    pub proxy: ProxyConfig,
    pub directory: DirectoryConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
    /// Listen backlog passed to `listen(2)`
    pub backlog: i32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: None,
            backlog: 1024,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    pub access_log: bool,
    pub show_headers: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            access_log: true,
            show_headers: false,
            access_log_format: "combined".to_string(),
        }
    }
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    #[serde(default)]
    pub max_connections: Option<u64>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive_timeout: 75,
            read_timeout: 30,
            write_timeout: 30,
            max_connections: None,
        }
    }
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            server_name: "sitehost".to_string(),
            enable_cors: false,
            max_body_size: 1_048_576,
        }
    }
}

/// Health check configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct HealthConfig {
    /// Enable health check endpoints
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,
    /// Liveness probe path (default: /healthz)
    #[serde(default = "default_healthz_path")]
    pub liveness_path: String,
    /// Readiness probe path (default: /readyz)
    #[serde(default = "default_readyz_path")]
    pub readiness_path: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_enabled() -> bool {
    true
}

fn default_healthz_path() -> String {
    "/healthz".to_string()
}

fn default_readyz_path() -> String {
    "/readyz".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            liveness_path: default_healthz_path(),
            readiness_path: default_readyz_path(),
        }
    }
}

/// Proxy configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// URL prefix the proxy routes live under
    pub mount_prefix: String,
    /// Whole-request timeout for origin fetches (seconds)
    pub upstream_timeout: u64,
    /// Connect timeout for origin fetches (seconds)
    pub connect_timeout: u64,
    /// `max-age` of proxied asset responses (seconds)
    pub asset_max_age: u32,
    pub user_agent: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            mount_prefix: "/proxy".to_string(),
            upstream_timeout: 30,
            connect_timeout: 10,
            asset_max_age: 31_536_000,
            user_agent: default_user_agent(),
        }
    }
}

pub fn default_user_agent() -> String {
    format!("sitehost/{}", env!("CARGO_PKG_VERSION"))
}

/// Site directory backend selector
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryBackend {
    /// Manifest file loaded into memory at startup
    #[default]
    File,
    /// Document-store REST endpoint
    Remote,
}

/// Site directory configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    pub backend: DirectoryBackend,
    /// Manifest path for the file backend
    pub manifest: PathBuf,
    /// Base URL for the remote backend
    #[serde(default)]
    pub base_url: Option<String>,
    /// Bearer token for the remote backend
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout for the remote backend (seconds)
    pub timeout: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            backend: DirectoryBackend::File,
            manifest: PathBuf::from("sites.json"),
            base_url: None,
            api_key: None,
            timeout: 10,
        }
    }
}
