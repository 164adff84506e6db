// src/crawl/links.rs
// =============================================================================
// Extracts hyperlink targets from a fetched HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM, tolerating broken markup like a browser does
// - Supports CSS selectors for finding elements
//
// Every <a href> is resolved against the page URL, so the crawl engine only
// ever sees absolute http(s) URLs. Links keep document order, which makes
// the crawl order deterministic for a given site.
//
// Malformed documents never produce an error: at worst we find no links and
// the page is treated as a dead end.
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

// Extracts all links from HTML content
//
// Parameters:
//   html: the page body
//   base_url: the URL the page was fetched from (for relative links)
//
// Example:
//   html = "<a href='/docs/talk.pdf#page=2'>Slides</a>"
//   base_url = "https://example.com/schedule/"
//   result = ["https://example.com/docs/talk.pdf"]
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    // Constant selector; parsing it cannot fail
    let selector = Selector::parse("a[href]").unwrap();
    let document = Html::parse_document(html);

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(base_url, href))
        .collect()
}

// Resolves a possibly-relative href to an absolute, fragment-free URL
//
// Returns None for:
// - in-page anchors ("#section")
// - mailto:, tel:, javascript:, data: and any other non-http scheme
// - hrefs that do not parse even relative to the base
fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    // join() handles both absolute and relative hrefs
    let mut url = base.join(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    // The fragment never reaches the server; "a.pdf#p2" and "a.pdf" are the same file
    url.set_fragment(None);
    Some(url)
}
