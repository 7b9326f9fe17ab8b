//! Route matching module
//!
//! Maps request paths under the mount prefix to proxy routes.

/// A request path that falls under the mount prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyRoute {
    /// `{mount}` or `{mount}/`
    MissingSiteId,
    /// `{mount}/{site_id}` or `{mount}/{site_id}/`
    Index { site_id: String },
    /// `{mount}/{site_id}/{path...}`
    Asset { site_id: String, path: String },
}

/// Strip the mount prefix, respecting segment boundaries
///
/// `/proxy` matches `/proxy` and `/proxy/...` but not `/proxyx`.
pub fn match_prefix<'a>(path: &'a str, mount_prefix: &str) -> Option<&'a str> {
    let mount = mount_prefix.trim_end_matches('/');
    let rest = path.strip_prefix(mount)?;
    (rest.is_empty() || rest.starts_with('/')).then_some(rest)
}

/// Parse a request path into a proxy route
///
/// Returns `None` for paths outside the mount prefix.
pub fn parse_proxy_path(path: &str, mount_prefix: &str) -> Option<ProxyRoute> {
    let rest = match_prefix(path, mount_prefix)?;
    let rest = rest.strip_prefix('/').unwrap_or(rest);

    let (site_segment, asset_part) = rest.split_once('/').unwrap_or((rest, ""));
    if site_segment.is_empty() {
        return Some(ProxyRoute::MissingSiteId);
    }

    let site_id = percent_decode(site_segment);
    if asset_part.is_empty() {
        return Some(ProxyRoute::Index { site_id });
    }

    Some(ProxyRoute::Asset {
        site_id,
        path: percent_decode(asset_part),
    })
}

/// Decode `%XX` escapes; malformed escapes are kept literally
pub fn percent_decode(input: &str) -> String {
    let bytes = urlencoding::decode_binary(input.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(id: &str) -> Option<ProxyRoute> {
        Some(ProxyRoute::Index {
            site_id: id.to_string(),
        })
    }

    fn asset(id: &str, path: &str) -> Option<ProxyRoute> {
        Some(ProxyRoute::Asset {
            site_id: id.to_string(),
            path: path.to_string(),
        })
    }

    #[test]
    fn test_outside_mount() {
        assert_eq!(parse_proxy_path("/", "/proxy"), None);
        assert_eq!(parse_proxy_path("/healthz", "/proxy"), None);
        assert_eq!(parse_proxy_path("/proxyx/s1", "/proxy"), None);
    }

    #[test]
    fn test_missing_site_id() {
        assert_eq!(parse_proxy_path("/proxy", "/proxy"), Some(ProxyRoute::MissingSiteId));
        assert_eq!(parse_proxy_path("/proxy/", "/proxy"), Some(ProxyRoute::MissingSiteId));
        assert_eq!(
            parse_proxy_path("/proxy//a.css", "/proxy"),
            Some(ProxyRoute::MissingSiteId)
        );
    }

    #[test]
    fn test_index_routes() {
        assert_eq!(parse_proxy_path("/proxy/s1", "/proxy"), index("s1"));
        assert_eq!(parse_proxy_path("/proxy/s1/", "/proxy"), index("s1"));
        // Trailing slash on the mount prefix is ignored
        assert_eq!(parse_proxy_path("/proxy/s1", "/proxy/"), index("s1"));
    }

    #[test]
    fn test_asset_routes() {
        assert_eq!(
            parse_proxy_path("/proxy/s1/css/style.css", "/proxy"),
            asset("s1", "css/style.css")
        );
        assert_eq!(
            parse_proxy_path("/sites/s1/a/b/c.js", "/sites"),
            asset("s1", "a/b/c.js")
        );
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(
            parse_proxy_path("/proxy/my%20site/img/hero%20shot.png", "/proxy"),
            asset("my site", "img/hero shot.png")
        );
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz%4"), "%zz%4");
        assert_eq!(percent_decode("caf%C3%A9"), "café");
        assert_eq!(percent_decode("%FF"), "\u{FFFD}");
    }
}
