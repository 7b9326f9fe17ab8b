//! Site proxy endpoints
//!
//! - `handlers`: index and asset pipelines
//! - `error`: failure taxonomy rendered as JSON

mod error;
mod handlers;

pub use error::{ErrorBody, ProxyError};
pub use handlers::{serve_asset, serve_index};
