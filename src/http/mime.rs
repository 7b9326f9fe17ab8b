//! Content-Type resolution for proxied assets
//!
//! The upstream content type is trusted unless it is one of the generic
//! octet-stream placeholders; then the requested path's extension decides.

/// Fallback when the upstream sends no content type at all
pub const OCTET_STREAM: &str = "application/octet-stream";

const GENERIC_TYPES: &[&str] = &["application/octet-stream", "application/x-octet-stream"];

/// Get MIME Content-Type for a lower-cased file extension
///
/// The table is closed; anything else returns `None`.
///
/// # Examples
/// ```
/// use sitehost::http::mime::content_type_for_extension;
/// assert_eq!(content_type_for_extension("css"), Some("text/css; charset=utf-8"));
/// assert_eq!(content_type_for_extension("mp4"), None);
/// ```
pub fn content_type_for_extension(extension: &str) -> Option<&'static str> {
    let content_type = match extension {
        // Text
        "html" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",

        // Scripts and data
        "js" => "application/javascript; charset=utf-8",
        "json" => "application/json",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",

        _ => return None,
    };
    Some(content_type)
}

/// Whether the media type (parameters ignored) is an octet-stream placeholder
pub fn is_generic(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    GENERIC_TYPES
        .iter()
        .any(|generic| essence.eq_ignore_ascii_case(generic))
}

/// Lower-cased extension of the last path segment
pub fn extension_of(path: &str) -> Option<String> {
    let leaf = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = leaf.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Pick the outgoing Content-Type for a proxied asset
pub fn resolve_content_type(upstream: Option<&str>, requested_path: &str) -> String {
    let upstream = upstream
        .map(str::trim)
        .filter(|ct| !ct.is_empty())
        .unwrap_or(OCTET_STREAM);

    if !is_generic(upstream) {
        return upstream.to_string();
    }

    extension_of(requested_path)
        .and_then(|ext| content_type_for_extension(&ext))
        .map_or_else(|| upstream.to_string(), ToString::to_string)
}
