//! Index and asset request pipelines
//!
//! Both handlers run the same steps: look up the site, pick the file entry,
//! fetch its bytes from the origin, then emit the response. Each step has a
//! single failure exit and nothing is retried.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use tracing::instrument;

use super::error::ProxyError;
use crate::config::AppState;
use crate::http::{build_304_response, build_asset_response, build_html_response, CachePolicy};
use crate::http::{cache, mime};
use crate::site::{find_asset, find_index, rewrite_links, SiteRecord};

async fn load_site(state: &AppState, site_id: &str) -> Result<SiteRecord, ProxyError> {
    state
        .directory
        .find_site(site_id)
        .await?
        .ok_or_else(|| ProxyError::SiteNotFound {
            site_id: site_id.to_string(),
        })
}

/// Serve a site's `index.html` with its relative links rewritten
#[instrument(skip(state))]
pub async fn serve_index(
    state: &AppState,
    site_id: &str,
    is_head: bool,
) -> Result<Response<Full<Bytes>>, ProxyError> {
    if site_id.trim().is_empty() {
        return Err(ProxyError::MissingSiteId);
    }

    let site = load_site(state, site_id).await?;

    let index = find_index(&site.files).ok_or_else(|| ProxyError::IndexNotFound {
        site_id: site_id.to_string(),
    })?;
    let url = index.asset_url().ok_or_else(|| ProxyError::IndexWithoutUrl {
        site_id: site_id.to_string(),
    })?;

    let upstream = state.origin.fetch(url).await.map_err(|source| {
        tracing::warn!(
            %site_id,
            upstream_url = %url,
            upstream_status = ?source.upstream_status(),
            error = %source,
            "Index fetch failed"
        );
        ProxyError::IndexFetch {
            site_id: site_id.to_string(),
            source,
        }
    })?;

    let html = String::from_utf8_lossy(&upstream.body);
    let rewritten = rewrite_links(&html, site_id, &state.config.proxy.mount_prefix);

    Ok(build_html_response(rewritten, CachePolicy::NoCache, is_head))
}

/// Serve one uploaded asset of a site
#[instrument(skip(state, if_none_match))]
pub async fn serve_asset(
    state: &AppState,
    site_id: &str,
    path: &str,
    if_none_match: Option<&str>,
    is_head: bool,
) -> Result<Response<Full<Bytes>>, ProxyError> {
    if site_id.trim().is_empty() || path.trim().is_empty() {
        return Err(ProxyError::MissingAssetPath);
    }

    let site = load_site(state, site_id).await?;

    let entry = find_asset(&site.files, path).ok_or_else(|| ProxyError::AssetNotFound {
        site_id: site_id.to_string(),
        path: path.to_string(),
    })?;
    let url = entry.asset_url().ok_or_else(|| ProxyError::AssetWithoutUrl {
        site_id: site_id.to_string(),
        path: path.to_string(),
    })?;

    let upstream = state.origin.fetch(url).await.map_err(|source| {
        tracing::warn!(
            %site_id,
            requested_path = %path,
            upstream_url = %url,
            upstream_status = ?source.upstream_status(),
            error = %source,
            "Asset fetch failed"
        );
        ProxyError::AssetFetch {
            site_id: site_id.to_string(),
            path: path.to_string(),
            source,
        }
    })?;

    let policy = CachePolicy::Immutable(state.config.proxy.asset_max_age);
    let etag = cache::generate_etag(&upstream.body);
    if cache::check_etag_match(if_none_match, &etag) {
        return Ok(build_304_response(&etag, policy));
    }

    let content_type = mime::resolve_content_type(upstream.content_type.as_deref(), path);
    Ok(build_asset_response(
        upstream.body,
        &content_type,
        &etag,
        policy,
        is_head,
    ))
}
