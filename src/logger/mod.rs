//! Logger module
//!
//! Provides logging utilities for the proxy including:
//! - Subscriber setup (`RUST_LOG` overrides `logging.level`)
//! - Server lifecycle logging
//! - Access logging with multiple formats on the `access` target

mod format;

pub use format::AccessLogEntry;

use crate::config::{Config, LoggingConfig};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// Target used for access log lines so they can be filtered separately
pub const ACCESS_TARGET: &str = "access";

/// Initialize the global subscriber
///
/// Should be called once at application startup. Calling it again is a no-op.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(
        %addr,
        mount_prefix = %config.proxy.mount_prefix,
        directory = ?config.directory.backend,
        workers = ?config.server.workers,
        "sitehost listening on http://{addr}"
    );
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(%peer_addr, "Connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_request(method: &hyper::Method, uri: &hyper::Uri, version: hyper::Version) {
    tracing::debug!("{method} {uri} {version:?}");
}

pub fn log_headers_count(count: usize, show: bool) {
    if show {
        tracing::debug!(count, "Request headers");
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}

pub fn log_shutdown(active: u64) {
    tracing::info!(active_connections = active, "Shutdown requested, draining connections");
}
