//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation,
//! route matching, and dispatching to the proxy handlers.

use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::proxy;
use crate::routing::{parse_proxy_path, ProxyRoute};
use http_body_util::Full;
use hyper::body::{Body as _, Bytes};
use hyper::header::{self, HeaderMap, HeaderValue};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, StatusCode, Version};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
}

/// Main entry point for HTTP request handling
///
/// Generic over the body type since no endpoint reads a request body.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let (req, _) = req.into_parts();
    let mut site_id = None;

    let mut response = dispatch(&req, &state, &mut site_id).await;
    apply_common_headers(&mut response, &state);

    if state.config.logging.access_log {
        let entry = access_entry(&req, &response, peer_addr, site_id, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn dispatch(
    req: &Parts,
    state: &AppState,
    site_id: &mut Option<String>,
) -> Response<Full<Bytes>> {
    let method = &req.method;
    logger::log_request(method, &req.uri, req.version);

    // 1. Check HTTP method
    if let Some(resp) = check_http_method(method, state.config.http.enable_cors) {
        return resp;
    }

    // 2. Check body size
    if let Some(resp) = check_body_size(&req.headers, state.config.http.max_body_size) {
        return resp;
    }

    // 3. Log headers if enabled
    logger::log_headers_count(req.headers.len(), state.config.logging.show_headers);

    // 4. Extract what the handlers need
    let ctx = RequestContext {
        path: req.uri.path(),
        is_head: *method == Method::HEAD,
        if_none_match: req
            .headers
            .get(header::IF_NONE_MATCH)
            .and_then(|v| v.to_str().ok()),
    };

    route_request(&ctx, state, site_id).await
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get(header::CONTENT_LENGTH)?;
    let Ok(size_str) = content_length.to_str() else {
        logger::log_warning("Content-Length header contains non-ASCII characters");
        return None;
    };

    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        Ok(_) => None,
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            None
        }
    }
}

/// Route request based on path and configuration
async fn route_request(
    ctx: &RequestContext<'_>,
    state: &AppState,
    site_id: &mut Option<String>,
) -> Response<Full<Bytes>> {
    // 0. Health check endpoints (highest priority, always fast)
    let health = &state.config.health;
    if health.enabled {
        if ctx.path == health.liveness_path {
            return http::build_health_response("ok", ctx.is_head);
        }
        if ctx.path == health.readiness_path {
            if state.is_draining() {
                return http::build_json_response(
                    StatusCode::SERVICE_UNAVAILABLE,
                    &serde_json::json!({ "error": "Shutting down" }),
                    ctx.is_head,
                );
            }
            return http::build_health_response("ok", ctx.is_head);
        }
    }

    // 1. Proxy endpoints under the mount prefix
    let Some(route) = parse_proxy_path(ctx.path, &state.config.proxy.mount_prefix) else {
        // 2. Anything else
        return http::build_404_response(ctx.is_head);
    };

    let deadline = request_deadline(state);
    let result = match route {
        ProxyRoute::MissingSiteId => Err(proxy::ProxyError::MissingSiteId),
        ProxyRoute::Index { site_id: id } => {
            let result =
                with_deadline(deadline, proxy::serve_index(state, &id, ctx.is_head)).await;
            *site_id = Some(id);
            result
        }
        ProxyRoute::Asset { site_id: id, path } => {
            let serve = proxy::serve_asset(state, &id, &path, ctx.if_none_match, ctx.is_head);
            let result = with_deadline(deadline, serve).await;
            *site_id = Some(id);
            result
        }
    };

    result.unwrap_or_else(|err| err.into_response(ctx.is_head))
}

/// Upper bound on one proxied request: directory lookup, origin fetch, then
/// writing the response
fn request_deadline(state: &AppState) -> Duration {
    let config = &state.config;
    Duration::from_secs(
        config.directory.timeout + config.proxy.upstream_timeout + config.performance.write_timeout,
    )
}

/// Backstop for collaborators that ignore their own timeouts
async fn with_deadline<F>(
    deadline: Duration,
    serve: F,
) -> Result<Response<Full<Bytes>>, proxy::ProxyError>
where
    F: Future<Output = Result<Response<Full<Bytes>>, proxy::ProxyError>>,
{
    tokio::time::timeout(deadline, serve).await.unwrap_or_else(|_| {
        Err(proxy::ProxyError::Internal(format!(
            "request handling exceeded {}s",
            deadline.as_secs()
        )))
    })
}

/// Add `Server` and, when enabled, the CORS origin header
fn apply_common_headers(response: &mut Response<Full<Bytes>>, state: &AppState) {
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&state.config.http.server_name) {
        headers.insert(header::SERVER, value);
    }
    if state.config.http.enable_cors {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
    }
}

fn access_entry(
    req: &Parts,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    site_id: Option<String>,
    started: Instant,
) -> AccessLogEntry {
    let header_value = |name: header::HeaderName| {
        req.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method.to_string(),
        req.uri.path().to_string(),
    );
    entry.query = req.uri.query().map(ToString::to_string);
    entry.http_version = version_label(req.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
        .unwrap_or(usize::MAX);
    entry.referer = header_value(header::REFERER);
    entry.user_agent = header_value(header::USER_AGENT);
    entry.site_id = site_id;
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
