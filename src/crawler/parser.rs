//! HTML parser for extracting the page title and links
//!
//! Every `<a href>` is kept, in document order, together with its visible text.
//! Relative, protocol-relative and fragment-only hrefs are resolved against the
//! page URL; whether a link is followed is decided later by the scope check.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Title used when a page has no usable `<title>` element
pub const NO_TITLE: &str = "No title";

/// Text used for anchors without visible text, e.g. image-only links
pub const NO_TEXT: &str = "No text";

/// One anchor found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLink {
    /// Trimmed visible text of the anchor, or [`NO_TEXT`]
    pub text: String,

    /// The href resolved against the page URL
    pub url: Url,
}

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title, or [`NO_TITLE`]
    pub title: String,

    /// All resolvable anchors, in document order
    pub links: Vec<ExtractedLink>,
}

/// Parses HTML content and extracts the title and links
///
/// # Example
///
/// ```
/// use sitesift::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, "Test");
/// assert_eq!(parsed.links[0].url.as_str(), "https://example.com/page");
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document, base_url),
    }
}

/// Extracts the text of the first `<title>` element
fn extract_title(document: &Html) -> String {
    let Ok(title_selector) = Selector::parse("title") else {
        return NO_TITLE.to_string();
    };

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string())
}

/// Extracts every anchor that carries an href
fn extract_links(document: &Html, base_url: &Url) -> Vec<ExtractedLink> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&a_selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            let url = resolve_link(href, base_url)?;
            Some(ExtractedLink {
                text: link_text(&element),
                url,
            })
        })
        .collect()
}

/// Collects the anchor's visible text, falling back to [`NO_TEXT`]
fn link_text(element: &ElementRef<'_>) -> String {
    let text = element.text().collect::<String>();
    let text = text.trim();
    if text.is_empty() {
        NO_TEXT.to_string()
    } else {
        text.to_string()
    }
}

/// Resolves a link href to an absolute URL
///
/// Returns None only when the href cannot be joined onto the base at all (for
/// example a malformed IPv6 literal). Non-HTTP schemes like `mailto:` are kept.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    match base_url.join(href.trim()) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::debug!("Skipping unresolvable href {:?}: {}", href, e);
            None
        }
    }
}
