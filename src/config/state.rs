// Application state module
// Holds configuration plus the shared directory and origin clients

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

use super::types::Config;
use crate::origin::{AssetOrigin, HttpOrigin, OriginError};
use crate::site::directory::{self, DirectoryError, SiteDirectory};

/// Failures while building the shared state at startup
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("failed to build origin client: {0}")]
    Origin(#[from] OriginError),
}

/// Application state shared by every connection
pub struct AppState {
    pub config: Config,
    pub directory: Arc<dyn SiteDirectory>,
    pub origin: Arc<dyn AssetOrigin>,

    // Set once shutdown starts so readiness probes fail while draining
    draining: AtomicBool,
}

impl AppState {
    /// Create `AppState` from already built collaborators
    pub fn new(
        config: Config,
        directory: Arc<dyn SiteDirectory>,
        origin: Arc<dyn AssetOrigin>,
    ) -> Self {
        Self {
            config,
            directory,
            origin,
            draining: AtomicBool::new(false),
        }
    }

    /// Build the configured directory backend and origin client
    pub fn from_config(config: Config) -> Result<Self, StartupError> {
        let directory: Arc<dyn SiteDirectory> = Arc::from(directory::from_config(&config.directory)?);
        let origin = Arc::new(HttpOrigin::from_config(&config.proxy)?);
        Ok(Self::new(config, directory, origin))
    }

    pub fn start_draining(&self) {
        self.draining.store(true, Ordering::Relaxed);
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DirectoryBackend;
    use crate::site::{FileEntry, SiteRecord};
    use std::io::Write;

    #[tokio::test]
    async fn test_from_config_file_backend() {
        let mut manifest = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let site = SiteRecord::new(
            "site-1",
            vec![FileEntry::new("index.html", "https://cdn.example.com/i.html")],
        );
        let json = serde_json::json!({ "sites": [site] });
        write!(manifest, "{json}").unwrap();

        let mut config = Config::default();
        config.directory.backend = DirectoryBackend::File;
        config.directory.manifest = manifest.path().to_path_buf();

        let state = AppState::from_config(config).unwrap();
        let found = state.directory.find_site("site-1").await.unwrap();
        assert_eq!(found.map(|s| s.site_id), Some("site-1".to_string()));
        assert!(!state.is_draining());
        state.start_draining();
        assert!(state.is_draining());
    }

    #[test]
    fn test_from_config_missing_manifest() {
        let mut config = Config::default();
        config.directory.manifest = "/nonexistent/sites.json".into();
        assert!(matches!(
            AppState::from_config(config),
            Err(StartupError::Directory(_))
        ));
    }
}
