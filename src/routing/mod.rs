//! Routing module
//!
//! Maps request paths under the configured mount prefix to proxy routes:
//! - `{mount}/{site_id}` to the index endpoint
//! - `{mount}/{site_id}/{path...}` to the asset endpoint

mod matcher;

pub use matcher::{match_prefix, parse_proxy_path, percent_decode, ProxyRoute};
