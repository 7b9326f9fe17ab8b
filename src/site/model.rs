//! Site directory record types
//!
//! Mirrors the documents stored by the dashboard: one `SiteRecord` per
//! deployed site, each holding the ordered list of uploaded `FileEntry`s,
//! plus append-only `DeploymentRecord`s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Lifecycle status of a deployed site
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteStatus {
    #[default]
    Live,
    Paused,
    Building,
    Error,
}

/// Metadata of one uploaded asset
///
/// Every field is optional in storage. Use [`FileEntry::stored_path`] and
/// [`FileEntry::asset_url`] instead of reading `path`/`url` directly so the
/// fallback rules stay in one place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Leaf filename
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Relative path as uploaded, may contain subfolders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Absolute location at the asset origin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Alternate origin location returned by some media hosts
    #[serde(default, alias = "secureUrl", skip_serializing_if = "Option::is_none")]
    pub secure_url: Option<String>,
    /// Best-effort MIME type recorded at upload
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Size in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, url: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().map(ToString::to_string);
        Self {
            name,
            path: Some(path),
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Stored path, falling back to the leaf name
    pub fn stored_path(&self) -> Option<&str> {
        non_empty(self.path.as_deref()).or_else(|| non_empty(self.name.as_deref()))
    }

    /// Retrievable origin URL, falling back to `secure_url`
    pub fn asset_url(&self) -> Option<&str> {
        non_empty(self.url.as_deref()).or_else(|| non_empty(self.secure_url.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// One deployed static site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRecord {
    pub site_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: SiteStatus,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    /// Aggregate storage in megabytes
    #[serde(default)]
    pub storage: f64,
    #[serde(default)]
    pub visits: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_deployed: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SiteRecord {
    pub fn new(site_id: impl Into<String>, files: Vec<FileEntry>) -> Self {
        let mut record = Self {
            site_id: site_id.into(),
            user_id: String::new(),
            name: String::new(),
            status: SiteStatus::Live,
            files,
            storage: 0.0,
            visits: 0,
            last_deployed: None,
            url: None,
        };
        record.recompute_storage();
        record
    }

    pub fn add_file(&mut self, entry: FileEntry) {
        self.files.push(entry);
        self.recompute_storage();
    }

    /// Replace the origin URL and size of the entry stored at `path`
    ///
    /// The entry's path never changes. Returns false when no entry has that
    /// exact stored path.
    pub fn edit_file(&mut self, path: &str, url: impl Into<String>, size: Option<u64>) -> bool {
        let Some(entry) = self
            .files
            .iter_mut()
            .find(|f| f.stored_path() == Some(path))
        else {
            return false;
        };
        entry.url = Some(url.into());
        entry.size = size;
        self.recompute_storage();
        true
    }

    /// Remove the entry stored at `path`, returning it
    pub fn remove_file(&mut self, path: &str) -> Option<FileEntry> {
        let idx = self
            .files
            .iter()
            .position(|f| f.stored_path() == Some(path))?;
        let removed = self.files.remove(idx);
        self.recompute_storage();
        Some(removed)
    }

    /// Flip between live and paused; any other state goes live
    pub fn toggle_status(&mut self) -> SiteStatus {
        self.status = match self.status {
            SiteStatus::Live => SiteStatus::Paused,
            SiteStatus::Paused | SiteStatus::Building | SiteStatus::Error => SiteStatus::Live,
        };
        self.status
    }

    #[allow(clippy::cast_precision_loss)]
    fn recompute_storage(&mut self) {
        let bytes: u64 = self.files.iter().filter_map(|f| f.size).sum();
        self.storage = bytes as f64 / BYTES_PER_MB;
    }
}

/// Outcome of one deploy attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Success,
    Failed,
    Pending,
    Building,
}

/// Denormalized snapshot of a deploy attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub site_id: String,
    #[serde(default)]
    pub user_id: String,
    pub status: DeploymentStatus,
    pub created_at: DateTime<Utc>,
    /// Duration in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
