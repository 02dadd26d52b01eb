//! Turns raw `href` values into absolute URL identities.

use thiserror::Error;
use url::{ParseError, Url};

/// Why an href produced no crawlable target.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("href is not a valid URL reference: {0}")]
    InvalidHref(String),

    #[error("non-navigable scheme: {0}")]
    NotNavigable(String),

    #[error("base URL is not usable: {0}")]
    InvalidBase(String),
}

/// Schemes the crawler is willing to follow.
pub fn is_navigable_scheme(scheme: &str) -> bool {
    matches!(scheme, "http" | "https")
}

/// Resolve `href` against the page it was found on.
///
/// Relative references are resolved per RFC 3986. The result is the
/// serialized form of the resolved URL and is used verbatim as the page
/// identity: fragments, trailing slashes and query order are left alone.
/// An empty fragment (`href="#"`) is dropped, so it points back at the page.
pub fn normalize_link(href: &str, base: &str) -> Result<String, LinkError> {
    match Url::parse(href) {
        Ok(absolute) => {
            if !is_navigable_scheme(absolute.scheme()) {
                return Err(LinkError::NotNavigable(absolute.scheme().to_string()));
            }
        }
        // Relative references are resolved below
        Err(ParseError::RelativeUrlWithoutBase) => {}
        Err(e) => return Err(LinkError::InvalidHref(format!("{}: {}", href, e))),
    }

    let base_url = Url::parse(base).map_err(|e| LinkError::InvalidBase(format!("{}: {}", base, e)))?;

    let mut resolved = base_url
        .join(href)
        .map_err(|e| LinkError::InvalidHref(format!("{}: {}", href, e)))?;

    // A scheme-relative or odd reference can still land on something we can't fetch
    if !is_navigable_scheme(resolved.scheme()) {
        return Err(LinkError::NotNavigable(resolved.scheme().to_string()));
    }

    if resolved.fragment() == Some("") {
        resolved.set_fragment(None);
    }

    Ok(resolved.to_string())
}

/// Parse a seed URL and return its identity form.
pub fn normalize_seed(seed: &str) -> Result<String, LinkError> {
    let url = Url::parse(seed).map_err(|e| LinkError::InvalidHref(format!("{}: {}", seed, e)))?;
    if !is_navigable_scheme(url.scheme()) {
        return Err(LinkError::NotNavigable(url.scheme().to_string()));
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_resolves_against_page() {
        let target = normalize_link("/about", "https://example.test/").unwrap();
        assert_eq!(target, "https://example.test/about");
    }

    #[test]
    fn test_sibling_path_resolves_against_directory() {
        let target = normalize_link("team.html", "https://example.test/about/index.html").unwrap();
        assert_eq!(target, "https://example.test/about/team.html");
    }

    #[test]
    fn test_dot_segments_are_resolved() {
        let target = normalize_link("../contact", "https://example.test/a/b/c").unwrap();
        assert_eq!(target, "https://example.test/a/contact");
    }

    #[test]
    fn test_query_only_reference_keeps_path() {
        let target = normalize_link("?page=2", "https://example.test/blog").unwrap();
        assert_eq!(target, "https://example.test/blog?page=2");
    }

    #[test]
    fn test_fragment_is_kept() {
        let target = normalize_link("#top", "https://example.test/docs").unwrap();
        assert_eq!(target, "https://example.test/docs#top");
    }

    #[test]
    fn test_empty_fragment_points_back_at_page() {
        assert_eq!(
            normalize_link("#", "https://example.test/docs").unwrap(),
            "https://example.test/docs"
        );
        assert_eq!(
            normalize_link("/about#", "https://example.test/").unwrap(),
            "https://example.test/about"
        );
        // the page's own non-empty fragment is replaced, not kept
        assert_eq!(
            normalize_link("#", "https://example.test/docs#top").unwrap(),
            "https://example.test/docs"
        );
    }

    #[test]
    fn test_scheme_relative_reference_inherits_scheme() {
        let target = normalize_link("//cdn.example.test/x", "https://example.test/").unwrap();
        assert_eq!(target, "https://cdn.example.test/x");
    }

    #[test]
    fn test_absolute_href_ignores_base() {
        let target = normalize_link("http://other.test/page", "https://example.test/").unwrap();
        assert_eq!(target, "http://other.test/page");
    }

    #[test]
    fn test_mailto_is_not_navigable() {
        let err = normalize_link("mailto:x@y.com", "https://example.test/").unwrap_err();
        assert_eq!(err, LinkError::NotNavigable("mailto".to_string()));
    }

    #[test]
    fn test_tel_and_javascript_are_not_navigable() {
        assert!(matches!(
            normalize_link("tel:+441234", "https://example.test/"),
            Err(LinkError::NotNavigable(_))
        ));
        assert!(matches!(
            normalize_link("javascript:void(0)", "https://example.test/"),
            Err(LinkError::NotNavigable(_))
        ));
    }

    #[test]
    fn test_malformed_absolute_href() {
        assert!(matches!(
            normalize_link("http://[::1", "https://example.test/"),
            Err(LinkError::InvalidHref(_))
        ));
    }

    #[test]
    fn test_unusable_base() {
        assert!(matches!(
            normalize_link("/about", "not a url"),
            Err(LinkError::InvalidBase(_))
        ));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for url in [
            "https://example.test/",
            "https://example.test/a/b?c=d",
            "http://example.test:8080/x#frag",
        ] {
            assert_eq!(normalize_link(url, url).unwrap(), url);
        }
    }

    #[test]
    fn test_seed_gets_serialized_form() {
        assert_eq!(normalize_seed("https://example.test").unwrap(), "https://example.test/");
        assert!(normalize_seed("ftp://example.test/").is_err());
        assert!(normalize_seed("example.test").is_err());
    }
}
