//! HTTP protocol layer module
//!
//! Content-type resolution, cache validation and response builders shared by
//! the proxy handlers and the router.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use cache::CachePolicy;
pub use response::{
    build_304_response, build_404_response, build_405_response, build_413_response,
    build_asset_response, build_health_response, build_html_response, build_json_response,
    build_options_response,
};
