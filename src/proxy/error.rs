//! Proxy error taxonomy and its JSON rendering

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde::Serialize;
use thiserror::Error;

use crate::http::build_json_response;
use crate::origin::OriginError;
use crate::site::DirectoryError;

/// Body returned by the proxy endpoints on failure
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

/// Every way a proxy request can end early
///
/// The display string of each variant is the client-facing message.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Missing siteId")]
    MissingSiteId,

    #[error("Missing siteId or asset path")]
    MissingAssetPath,

    #[error("Site not found")]
    SiteNotFound { site_id: String },

    #[error("index.html not found for site")]
    IndexNotFound { site_id: String },

    #[error("index.html has no url")]
    IndexWithoutUrl { site_id: String },

    #[error("Asset not found")]
    AssetNotFound { site_id: String, path: String },

    #[error("Asset has no URL")]
    AssetWithoutUrl { site_id: String, path: String },

    #[error("Failed to fetch site asset")]
    IndexFetch {
        site_id: String,
        #[source]
        source: OriginError,
    },

    #[error("Failed to fetch asset")]
    AssetFetch {
        site_id: String,
        path: String,
        #[source]
        source: OriginError,
    },

    #[error("Internal server error")]
    Internal(String),

    #[error("Internal server error")]
    Directory(#[from] DirectoryError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingSiteId | Self::MissingAssetPath => StatusCode::BAD_REQUEST,
            Self::SiteNotFound { .. }
            | Self::IndexNotFound { .. }
            | Self::IndexWithoutUrl { .. }
            | Self::AssetNotFound { .. }
            | Self::AssetWithoutUrl { .. } => StatusCode::NOT_FOUND,
            Self::IndexFetch { .. } => StatusCode::BAD_GATEWAY,
            // Pass upstream error statuses through, anything else is a bad gateway
            Self::AssetFetch { source, .. } => source
                .upstream_status()
                .filter(|s| (400..=599).contains(s))
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            Self::Internal(_) | Self::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Site the failed request was about, if it got that far
    pub fn site_id(&self) -> Option<&str> {
        match self {
            Self::SiteNotFound { site_id }
            | Self::IndexNotFound { site_id }
            | Self::IndexWithoutUrl { site_id }
            | Self::AssetNotFound { site_id, .. }
            | Self::AssetWithoutUrl { site_id, .. }
            | Self::IndexFetch { site_id, .. }
            | Self::AssetFetch { site_id, .. } => Some(site_id),
            _ => None,
        }
    }

    pub fn body(&self) -> ErrorBody {
        let requested_path = match self {
            Self::AssetNotFound { path, .. }
            | Self::AssetWithoutUrl { path, .. }
            | Self::AssetFetch { path, .. } => Some(path.clone()),
            _ => None,
        };
        let upstream_status = match self {
            Self::IndexFetch { source, .. } | Self::AssetFetch { source, .. } => {
                source.upstream_status()
            }
            _ => None,
        };

        ErrorBody {
            error: self.to_string(),
            site_id: self.site_id().map(ToString::to_string),
            requested_path,
            upstream_status,
        }
    }

    /// Render as a JSON error response; internal details only reach the log
    pub fn into_response(self, is_head: bool) -> Response<Full<Bytes>> {
        match &self {
            Self::Internal(detail) => tracing::error!(%detail, "Proxy request failed"),
            Self::Directory(err) => tracing::error!(error = %err, "Site directory lookup failed"),
            other if other.status().is_client_error() => {
                tracing::info!(site_id = ?other.site_id(), "{other}");
            }
            _ => {}
        }

        let body = serde_json::to_value(self.body()).unwrap_or_else(|_| {
            serde_json::json!({ "error": "Internal server error" })
        });
        build_json_response(self.status(), &body, is_head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: u16) -> OriginError {
        OriginError::Status {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ProxyError::MissingSiteId.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ProxyError::SiteNotFound {
                site_id: "s".into()
            }
            .status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ProxyError::IndexFetch {
                site_id: "s".into(),
                source: status_error(404),
            }
            .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ProxyError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_asset_fetch_status_passthrough() {
        let fetch = |source| ProxyError::AssetFetch {
            site_id: "s".into(),
            path: "a.css".into(),
            source,
        };
        assert_eq!(fetch(status_error(403)).status(), StatusCode::FORBIDDEN);
        assert_eq!(fetch(status_error(503)).status(), StatusCode::SERVICE_UNAVAILABLE);
        // Redirect statuses are not errors worth forwarding
        assert_eq!(fetch(status_error(302)).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            fetch(OriginError::Timeout { timeout_secs: 30 }).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_error_body() {
        let err = ProxyError::AssetFetch {
            site_id: "s1".into(),
            path: "css/a.css".into(),
            source: status_error(404),
        };
        let json = serde_json::to_value(err.body()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "error": "Failed to fetch asset",
                "siteId": "s1",
                "requestedPath": "css/a.css",
                "upstreamStatus": 404,
            })
        );

        let json = serde_json::to_value(ProxyError::MissingSiteId.body()).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Missing siteId" }));
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = ProxyError::Directory(DirectoryError::Parse("line 3: bad token".into()));
        assert_eq!(err.body().error, "Internal server error");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
