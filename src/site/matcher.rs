//! File entry matching
//!
//! Resolves a requested relative path (or the site entry point) to one of the
//! site's stored file entries. Matching is first-match-in-list-order.

use super::model::FileEntry;

const INDEX_FILE: &str = "index.html";

/// Strip one leading `./`, then any leading `/`
pub fn normalize_path(path: &str) -> &str {
    let path = path.strip_prefix("./").unwrap_or(path);
    path.trim_start_matches('/')
}

/// Find the entry that serves `requested_path`
///
/// An entry matches when its normalized stored path equals the normalized
/// request, or ends with `/` followed by it. With several suffix matches
/// (`css/a.css` and `old/css/a.css`) list order decides.
pub fn find_asset<'a>(files: &'a [FileEntry], requested_path: &str) -> Option<&'a FileEntry> {
    let requested = normalize_path(requested_path);
    if requested.is_empty() {
        return None;
    }

    files.iter().find(|entry| {
        entry
            .stored_path()
            .map(normalize_path)
            .is_some_and(|stored| matches_suffix(stored, requested))
    })
}

/// Find the site's root HTML entry point
///
/// Case-insensitive: the lower-cased stored path must be `index.html` or end
/// with `/index.html`.
pub fn find_index(files: &[FileEntry]) -> Option<&FileEntry> {
    files.iter().find(|entry| {
        entry
            .stored_path()
            .map(|p| normalize_path(p).to_ascii_lowercase())
            .is_some_and(|stored| matches_suffix(&stored, INDEX_FILE))
    })
}

fn matches_suffix(stored: &str, wanted: &str) -> bool {
    stored == wanted
        || stored
            .strip_suffix(wanted)
            .is_some_and(|prefix| prefix.ends_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(paths: &[&str]) -> Vec<FileEntry> {
        paths
            .iter()
            .map(|p| FileEntry::new(*p, format!("https://cdn.example.com/{p}")))
            .collect()
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("./css/a.css"), "css/a.css");
        assert_eq!(normalize_path("/css/a.css"), "css/a.css");
        assert_eq!(normalize_path(".//css/a.css"), "css/a.css");
        assert_eq!(normalize_path("///a.css"), "a.css");
        // Only one "./" is stripped
        assert_eq!(normalize_path("././a.css"), "./a.css");
        assert_eq!(normalize_path("../a.css"), "../a.css");
    }

    #[test]
    fn test_find_asset_exact() {
        let files = entries(&["index.html", "css/style.css"]);
        let found = find_asset(&files, "css/style.css").unwrap();
        assert_eq!(found.stored_path(), Some("css/style.css"));

        let found = find_asset(&files, "./css/style.css").unwrap();
        assert_eq!(found.stored_path(), Some("css/style.css"));

        let files = entries(&["/css/style.css"]);
        assert!(find_asset(&files, "css/style.css").is_some());
    }

    #[test]
    fn test_find_asset_suffix() {
        let files = entries(&["mysite/assets/img/logo.png"]);
        assert!(find_asset(&files, "img/logo.png").is_some());
        assert!(find_asset(&files, "logo.png").is_some());
        // A suffix must start on a segment boundary
        assert!(find_asset(&files, "go.png").is_none());
    }

    #[test]
    fn test_find_asset_first_match_wins() {
        let files = entries(&["a/b.css", "b.css"]);
        let found = find_asset(&files, "b.css").unwrap();
        assert_eq!(found.stored_path(), Some("a/b.css"));

        let files = entries(&["b.css", "a/b.css"]);
        let found = find_asset(&files, "b.css").unwrap();
        assert_eq!(found.stored_path(), Some("b.css"));

        let files = entries(&["old/css/a.css", "css/a.css"]);
        let found = find_asset(&files, "css/a.css").unwrap();
        assert_eq!(found.stored_path(), Some("old/css/a.css"));
    }

    #[test]
    fn test_find_asset_uses_name_fallback() {
        let files = vec![FileEntry {
            name: Some("app.js".to_string()),
            url: Some("https://cdn.example.com/app.js".to_string()),
            ..FileEntry::default()
        }];
        assert!(find_asset(&files, "app.js").is_some());
    }

    #[test]
    fn test_find_asset_not_found() {
        let files = entries(&["index.html"]);
        assert!(find_asset(&files, "missing.css").is_none());
        assert!(find_asset(&files, "").is_none());
        assert!(find_asset(&files, "/").is_none());
        assert!(find_asset(&[FileEntry::default()], "a.css").is_none());
    }

    #[test]
    fn test_find_index_table() {
        let cases = [
            ("index.html", true),
            ("/index.html", true),
            ("./index.html", true),
            ("sub/index.html", true),
            ("INDEX.HTML", true),
            ("Sub/Index.Html", true),
            ("myindex.html", false),
            ("index.htm", false),
            ("index.html.bak", false),
        ];
        for (path, expected) in cases {
            let files = entries(&[path]);
            assert_eq!(
                find_index(&files).is_some(),
                expected,
                "index resolution for {path:?}"
            );
        }
    }

    #[test]
    fn test_find_index_first_match() {
        let files = entries(&["css/a.css", "docs/index.html", "index.html"]);
        let found = find_index(&files).unwrap();
        assert_eq!(found.stored_path(), Some("docs/index.html"));
        assert!(find_index(&entries(&["a.css"])).is_none());
    }
}
