//! Request handler module
//!
//! Responsible for request routing dispatch: method and size checks, health
//! probes, then the proxy endpoints.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
