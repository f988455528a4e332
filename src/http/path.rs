//! Request path inspection helpers

/// Whether the last segment of `path` carries a file extension
///
/// A segment has an extension when it contains a `.` that is not its final
/// character, so `/app.js` and `/.env` do while `/dashboard` and `/v1.` do not.
pub fn has_extension(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rfind('.').is_some_and(|dot| dot + 1 < name.len())
}

/// ASCII case-insensitive prefix test
pub fn starts_with_ignore_case(path: &str, prefix: &str) -> bool {
    path.len() >= prefix.len()
        && path.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Strip `prefix` (ASCII case-insensitive) from `path`
pub fn strip_prefix_ignore_case<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    if starts_with_ignore_case(path, prefix) {
        path.get(prefix.len()..)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_extension() {
        assert!(has_extension("/app.js"));
        assert!(has_extension("/assets/app.min.css"));
        assert!(has_extension("/.env"));
        assert!(has_extension("favicon.ico"));
        assert!(!has_extension("/dashboard"));
        assert!(!has_extension("/"));
        assert!(!has_extension(""));
        assert!(!has_extension("/v1."));
        assert!(!has_extension("/static.v2/page"));
    }

    #[test]
    fn test_starts_with_ignore_case() {
        assert!(starts_with_ignore_case("/api/widgets", "/api/"));
        assert!(starts_with_ignore_case("/API/widgets", "/api/"));
        assert!(starts_with_ignore_case("/Api/", "/api/"));
        assert!(!starts_with_ignore_case("/api", "/api/"));
        assert!(!starts_with_ignore_case("/apis/x", "/api/"));
        assert!(!starts_with_ignore_case("/", "/api/"));
    }

    #[test]
    fn test_strip_prefix_ignore_case() {
        assert_eq!(strip_prefix_ignore_case("/API/health", "/api/"), Some("health"));
        assert_eq!(strip_prefix_ignore_case("/api/", "/api/"), Some(""));
        assert_eq!(strip_prefix_ignore_case("/dashboard", "/api/"), None);
    }
}
