//! sitehost: serves user-uploaded static sites from an asset origin
//!
//! A site's `index.html` is fetched from the origin and its relative links
//! are rewritten under the proxy mount prefix; every other request under
//! that prefix is resolved against the site's file list and streamed back
//! with a usable content type.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod origin;
pub mod proxy;
pub mod routing;
pub mod server;
pub mod site;
