// Configuration module entry point
// Loads layered configuration and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::{AppState, StartupError};
pub use types::{
    default_user_agent, Config, DirectoryBackend, DirectoryConfig, HealthConfig, HttpConfig,
    LoggingConfig, PerformanceConfig, ProxyConfig, ServerConfig,
};

/// Environment variable prefix, e.g. `SITEHOST_SERVER__PORT=9000`
const ENV_PREFIX: &str = "SITEHOST";

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// Layers, lowest first: built-in defaults, the config file (optional),
    /// `SITEHOST_*` environment variables.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.backlog", 1024)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "sitehost")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB, the proxy takes no bodies
            .set_default("proxy.mount_prefix", "/proxy")?
            .set_default("proxy.upstream_timeout", 30)?
            .set_default("proxy.connect_timeout", 10)?
            .set_default("proxy.asset_max_age", 31_536_000)? // 1 year
            .set_default("proxy.user_agent", default_user_agent())?
            .set_default("directory.backend", "file")?
            .set_default("directory.manifest", "sites.json")?
            .set_default("directory.timeout", 10)?
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate().map_err(config::ConfigError::Message)?;
        Ok(config)
    }

    /// Check cross-field constraints the deserializer cannot express
    pub fn validate(&self) -> Result<(), String> {
        let prefix = &self.proxy.mount_prefix;
        if !prefix.starts_with('/') || prefix.trim_end_matches('/').is_empty() {
            return Err(format!(
                "proxy.mount_prefix must start with '/' and name a path, got '{prefix}'"
            ));
        }

        if self.health.enabled {
            for path in [&self.health.liveness_path, &self.health.readiness_path] {
                if !path.starts_with('/') {
                    return Err(format!("health probe path must start with '/', got '{path}'"));
                }
            }
        }

        if self.directory.backend == DirectoryBackend::Remote && self.directory.base_url.is_none() {
            return Err("directory.base_url is required when directory.backend = \"remote\"".into());
        }

        if self.proxy.upstream_timeout == 0 {
            return Err("proxy.upstream_timeout must be greater than zero".into());
        }

        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
