//! Index HTML link rewriting
//!
//! A single regex pass over `src="..."`/`href="..."` attributes. This is not
//! an HTML parser: attributes with whitespace around `=`, `srcset`, inline
//! `style` URLs and URLs built by scripts are left untouched. Hyphenated
//! names ending in `src`/`href` (`data-src`, `data-href`) are rewritten too,
//! which keeps lazy-loading attributes pointing at the proxy.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static LINK_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\b(src|href)=(?:"([^"]*)"|'([^']*)')"#)
        .expect("link attribute pattern is valid")
});

/// Prefixes that already resolve without the proxy
const PASSTHROUGH_PREFIXES: &[&str] = &["http://", "https://", "//", "data:", "mailto:", "#"];

/// Rewrite relative `src`/`href` values to `{mount_prefix}/{site_id}/{path}`
pub fn rewrite_links(html: &str, site_id: &str, mount_prefix: &str) -> String {
    let mount = mount_prefix.trim_end_matches('/');

    LINK_ATTR
        .replace_all(html, |caps: &Captures<'_>| {
            let attr = &caps[1];
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map_or("", |m| m.as_str());

            if is_passthrough(value) {
                return caps[0].to_string();
            }

            format!("{attr}=\"{mount}/{site_id}/{}\"", clean_relative(value))
        })
        .into_owned()
}

fn is_passthrough(value: &str) -> bool {
    PASSTHROUGH_PREFIXES.iter().any(|prefix| {
        value
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

/// Strip one leading `./`, then one leading `/`
fn clean_relative(value: &str) -> &str {
    let value = value.strip_prefix("./").unwrap_or(value);
    value.strip_prefix('/').unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(html: &str) -> String {
        rewrite_links(html, "site123", "/proxy")
    }

    #[test]
    fn test_relative_paths_rewritten() {
        assert_eq!(
            rewrite(r#"<img src="./img/a.png">"#),
            r#"<img src="/proxy/site123/img/a.png">"#
        );
        assert_eq!(
            rewrite(r#"<link rel="stylesheet" href="css/style.css">"#),
            r#"<link rel="stylesheet" href="/proxy/site123/css/style.css">"#
        );
        assert_eq!(
            rewrite(r#"<script src="/js/app.js"></script>"#),
            r#"<script src="/proxy/site123/js/app.js"></script>"#
        );
    }

    #[test]
    fn test_absolute_and_special_values_unchanged() {
        let unchanged = [
            r#"<a href="https://example.com">"#,
            r#"<a href="HTTP://EXAMPLE.COM/x">"#,
            r#"<script src="//cdn.example.com/lib.js"></script>"#,
            r##"<a href="#top">"##,
            r#"<script src="data:text/javascript;base64,AA=="></script>"#,
            r#"<a href="mailto:me@example.com">"#,
        ];
        for html in unchanged {
            assert_eq!(rewrite(html), html);
        }
    }

    #[test]
    fn test_single_quotes_and_attribute_case() {
        assert_eq!(
            rewrite("<img SRC='./a.png'>"),
            r#"<img SRC="/proxy/site123/a.png">"#
        );
        assert_eq!(
            rewrite("<a Href='about.html'>About</a>"),
            r#"<a Href="/proxy/site123/about.html">About</a>"#
        );
    }

    #[test]
    fn test_multiple_attributes_in_document() {
        let html = concat!(
            "<html><head>",
            r#"<link href="./css/style.css" rel="stylesheet">"#,
            r#"<link href="https://fonts.example.com/f.css" rel="stylesheet">"#,
            "</head><body>",
            r##"<img src="img/logo.png"><a href="#main">skip</a>"##,
            r#"<script src="./js/app.js"></script>"#,
            "</body></html>"
        );
        let out = rewrite(html);
        assert!(out.contains(r#"href="/proxy/site123/css/style.css""#));
        assert!(out.contains(r#"href="https://fonts.example.com/f.css""#));
        assert!(out.contains(r#"src="/proxy/site123/img/logo.png""#));
        assert!(out.contains(r##"href="#main""##));
        assert!(out.contains(r#"src="/proxy/site123/js/app.js""#));
    }

    #[test]
    fn test_known_gaps_preserved() {
        // Whitespace around "=" is not recognized
        let spaced = r#"<img src = "./a.png">"#;
        assert_eq!(rewrite(spaced), spaced);

        // srcset is not a src attribute
        let srcset = r#"<img srcset="./a.png 1x, ./b.png 2x">"#;
        assert_eq!(rewrite(srcset), srcset);
    }

    #[test]
    fn test_hyphenated_attributes_rewritten() {
        assert_eq!(
            rewrite(r#"<img data-src="./img/lazy.png" src="./img/blur.png">"#),
            r#"<img data-src="/proxy/site123/img/lazy.png" src="/proxy/site123/img/blur.png">"#
        );
        assert_eq!(
            rewrite(r#"<div data-href='about.html'>"#),
            r#"<div data-href="/proxy/site123/about.html">"#
        );
    }

    #[test]
    fn test_mount_prefix_trailing_slash() {
        assert_eq!(
            rewrite_links(r#"<img src="a.png">"#, "s1", "/sites/"),
            r#"<img src="/sites/s1/a.png">"#
        );
    }
}
