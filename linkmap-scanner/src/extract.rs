use scraper::{Html, Selector};
use std::sync::LazyLock;

static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Raw `href` values of every `<a>` element, in document order.
///
/// Values are trimmed and empty ones dropped; nothing is resolved here.
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&LINK_SELECTOR)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether a response with this content type should be searched for links.
///
/// A missing header is treated as HTML.
pub fn is_html(content_type: Option<&str>) -> bool {
    content_type.is_none_or(|ct| ct.to_ascii_lowercase().contains("html"))
}
