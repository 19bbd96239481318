//! Viewer-request URI rewrite executed by the edge function

pub const INDEX_DOCUMENT: &str = "index.html";

/// Map a directory-style URI onto its index document.
///
/// `/docs/` becomes `/docs/index.html`, `/docs` becomes `/docs/index.html`.
/// URIs containing a `.` anywhere are passed through.
pub fn rewrite_uri(uri: &str) -> String {
    if uri.ends_with('/') {
        format!("{}{}", uri, INDEX_DOCUMENT)
    } else if !uri.contains('.') {
        format!("{}/{}", uri, INDEX_DOCUMENT)
    } else {
        uri.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_uri() {
        assert_eq!(rewrite_uri("/"), "/index.html");
        assert_eq!(rewrite_uri("/about"), "/about/index.html");
        assert_eq!(rewrite_uri("/about/"), "/about/index.html");
        assert_eq!(rewrite_uri("/style.css"), "/style.css");
        assert_eq!(rewrite_uri("/a/b"), "/a/b/index.html");
    }

    #[test]
    fn test_dot_in_directory_is_passed_through() {
        assert_eq!(rewrite_uri("/v1.2/docs"), "/v1.2/docs");
    }

    #[test]
    fn test_rewrite_is_stable_on_index() {
        assert_eq!(rewrite_uri("/about/index.html"), "/about/index.html");
    }
}
