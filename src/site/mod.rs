//! Site records and the logic that reads them
//!
//! - `model`: site, file entry and deployment records
//! - `matcher`: asset and index resolution over file entries
//! - `rewrite`: index HTML link rewriting
//! - `directory`: site directory backends

pub mod directory;
pub mod matcher;
pub mod model;
pub mod rewrite;

pub use directory::{DirectoryError, MemoryDirectory, RemoteDirectory, SiteDirectory};
pub use matcher::{find_asset, find_index, normalize_path};
pub use model::{DeploymentRecord, DeploymentStatus, FileEntry, SiteRecord, SiteStatus};
pub use rewrite::rewrite_links;
