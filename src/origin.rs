//! Asset origin client
//!
//! Fetches uploaded bytes from the media host. The origin is trusted for the
//! bytes only; its content type may be missing or generic.

use async_trait::async_trait;
use hyper::body::Bytes;
use std::time::Duration;
use thiserror::Error;

use crate::config::ProxyConfig;

/// Upstream bodies kept in error logs are cut to this many bytes
const ERROR_BODY_LIMIT: usize = 512;

#[derive(Debug, Error)]
pub enum OriginError {
    #[error("upstream returned HTTP {status}")]
    Status { status: u16, body: String },

    #[error("upstream request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid upstream URL '{0}'")]
    InvalidUrl(String),
}

impl OriginError {
    /// Status code the origin answered with, if it answered at all
    pub const fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Bytes and headers of a successful upstream response
#[derive(Debug, Clone)]
pub struct UpstreamAsset {
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[async_trait]
pub trait AssetOrigin: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<UpstreamAsset, OriginError>;
}

/// `reqwest`-backed origin with explicit timeouts
#[derive(Debug, Clone)]
pub struct HttpOrigin {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpOrigin {
    pub fn from_config(config: &ProxyConfig) -> Result<Self, OriginError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout))
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self::with_client(client, config.upstream_timeout))
    }

    pub const fn with_client(client: reqwest::Client, timeout_secs: u64) -> Self {
        Self {
            client,
            timeout_secs,
        }
    }
}

#[async_trait]
impl AssetOrigin for HttpOrigin {
    async fn fetch(&self, url: &str) -> Result<UpstreamAsset, OriginError> {
        let url = reqwest::Url::parse(url).map_err(|_| OriginError::InvalidUrl(url.to_string()))?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                OriginError::Timeout {
                    timeout_secs: self.timeout_secs,
                }
            } else {
                OriginError::Transport(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            truncate_at_char_boundary(&mut body, ERROR_BODY_LIMIT);
            return Err(OriginError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                OriginError::Timeout {
                    timeout_secs: self.timeout_secs,
                }
            } else {
                OriginError::Transport(e)
            }
        })?;

        Ok(UpstreamAsset { content_type, body })
    }
}

fn truncate_at_char_boundary(text: &mut String, limit: usize) {
    if text.len() <= limit {
        return;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}
