//! Site directory backends
//!
//! The proxy only ever reads site records. Two backends are provided:
//! an in-memory directory loaded from a manifest file, and a client for a
//! document-store REST endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

use super::model::{DeploymentRecord, SiteRecord};
use crate::config::{DirectoryBackend, DirectoryConfig};

#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The backend is not configured or cannot be reached at all
    #[error("site directory unavailable: {0}")]
    Unavailable(String),

    #[error("site directory request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("site directory returned HTTP {status}")]
    Status { status: u16 },

    #[error("failed to read site manifest {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid site manifest: {0}")]
    Parse(String),
}

/// Lookup service mapping a site id to its record
#[async_trait]
pub trait SiteDirectory: Send + Sync {
    /// Returns `Ok(None)` when no site has this id
    async fn find_site(&self, site_id: &str) -> Result<Option<SiteRecord>, DirectoryError>;
}

/// Build the configured backend
pub fn from_config(config: &DirectoryConfig) -> Result<Box<dyn SiteDirectory>, DirectoryError> {
    match config.backend {
        DirectoryBackend::File => {
            let directory = MemoryDirectory::from_file(&config.manifest)?;
            Ok(Box::new(directory))
        }
        DirectoryBackend::Remote => Ok(Box::new(RemoteDirectory::from_config(config)?)),
    }
}

/// On-disk manifest layout
#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(default)]
    sites: Vec<SiteRecord>,
    #[serde(default)]
    deployments: Vec<DeploymentRecord>,
}

#[derive(Debug, Default)]
struct MemoryState {
    sites: HashMap<String, SiteRecord>,
    deployments: Vec<DeploymentRecord>,
}

/// Directory held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    state: RwLock<MemoryState>,
}

impl MemoryDirectory {
    /// Build from records; on duplicate ids the first record wins
    pub fn from_records(sites: Vec<SiteRecord>, deployments: Vec<DeploymentRecord>) -> Self {
        let mut map = HashMap::with_capacity(sites.len());
        for site in sites {
            if map.contains_key(&site.site_id) {
                tracing::warn!(site_id = %site.site_id, "Duplicate site id in manifest, keeping first");
                continue;
            }
            map.insert(site.site_id.clone(), site);
        }
        Self {
            state: RwLock::new(MemoryState {
                sites: map,
                deployments,
            }),
        }
    }

    pub fn from_sites(sites: Vec<SiteRecord>) -> Self {
        Self::from_records(sites, Vec::new())
    }

    /// Load a JSON or TOML manifest (`{ sites = [...], deployments = [...] }`)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                DirectoryError::Unavailable(format!("manifest {} does not exist", path.display()))
            } else {
                DirectoryError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

        let manifest: Manifest = if is_toml {
            toml::from_str(&text).map_err(|e| DirectoryError::Parse(e.to_string()))?
        } else {
            serde_json::from_str(&text).map_err(|e| DirectoryError::Parse(e.to_string()))?
        };

        tracing::info!(
            manifest = %path.display(),
            sites = manifest.sites.len(),
            deployments = manifest.deployments.len(),
            "Loaded site manifest"
        );
        Ok(Self::from_records(manifest.sites, manifest.deployments))
    }

    /// Insert or replace a site record
    pub async fn insert_site(&self, site: SiteRecord) -> Option<SiteRecord> {
        let mut state = self.state.write().await;
        state.sites.insert(site.site_id.clone(), site)
    }

    /// Delete a site and its deployment history
    pub async fn remove_site(&self, site_id: &str) -> Option<SiteRecord> {
        let mut state = self.state.write().await;
        let removed = state.sites.remove(site_id)?;
        state.deployments.retain(|d| d.site_id != site_id);
        Some(removed)
    }

    pub async fn record_deployment(&self, deployment: DeploymentRecord) {
        self.state.write().await.deployments.push(deployment);
    }

    /// Deployment history of one site, newest first
    pub async fn deployments_for(&self, site_id: &str) -> Vec<DeploymentRecord> {
        let state = self.state.read().await;
        let mut history: Vec<_> = state
            .deployments
            .iter()
            .filter(|d| d.site_id == site_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        history
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.sites.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SiteDirectory for MemoryDirectory {
    async fn find_site(&self, site_id: &str) -> Result<Option<SiteRecord>, DirectoryError> {
        Ok(self.state.read().await.sites.get(site_id).cloned())
    }
}

/// Client for a document-store REST endpoint
///
/// `GET {base_url}/sites/{site_id}` must return a site record document.
#[derive(Debug, Clone)]
pub struct RemoteDirectory {
    client: reqwest::Client,
    base_url: reqwest::Url,
    api_key: Option<String>,
}

impl RemoteDirectory {
    pub fn new(base_url: &str, client: reqwest::Client) -> Result<Self, DirectoryError> {
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|e| DirectoryError::Unavailable(format!("invalid base_url '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(DirectoryError::Unavailable(format!(
                "base_url '{base_url}' cannot be a base URL"
            )));
        }
        Ok(Self {
            client,
            base_url,
            api_key: None,
        })
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn from_config(config: &DirectoryConfig) -> Result<Self, DirectoryError> {
        let base_url = config.base_url.as_deref().ok_or_else(|| {
            DirectoryError::Unavailable("directory.base_url is required for the remote backend".into())
        })?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        let directory = Self::new(base_url, client)?;
        Ok(match &config.api_key {
            Some(key) => directory.with_api_key(key.clone()),
            None => directory,
        })
    }

    fn site_url(&self, site_id: &str) -> reqwest::Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("sites").push(site_id);
        }
        url
    }
}

#[async_trait]
impl SiteDirectory for RemoteDirectory {
    async fn find_site(&self, site_id: &str) -> Result<Option<SiteRecord>, DirectoryError> {
        let url = self.site_url(site_id);
        tracing::debug!(%url, "Querying site directory");

        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(DirectoryError::Status {
                status: status.as_u16(),
            });
        }

        let record = response
            .json::<SiteRecord>()
            .await
            .map_err(|e| DirectoryError::Parse(e.to_string()))?;
        Ok(Some(record))
    }
}
