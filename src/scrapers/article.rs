//! Readability-style article text extraction.
//!
//! Downloads an article page and reduces it to its main text:
//!
//! 1. Pick the content container, trying `article`, `main`, `[role=main]`
//!    and finally `body`; among several matches the one with the most text wins.
//! 2. Walk it while skipping scripts, navigation, page chrome and comment
//!    sections.
//! 3. Normalise whitespace, then keep the result only if it is longer than
//!    [`MIN_TEXT_CHARS`], cut to [`MAX_TEXT_CHARS`].

use crate::errors::DigestError;
use crate::models::{MAX_TEXT_CHARS, MIN_TEXT_CHARS};
use crate::scrapers::TextExtractor;
use crate::utils::{normalize_whitespace, truncate_chars};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::node::Element;
use scraper::{ElementRef, Html, Node, Selector};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const PAGE_TIMEOUT: Duration = Duration::from_secs(20);

static CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["article", "main", "[role=main]", "body"]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});

/// Subtrees that never hold article text.
const SKIPPED_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "aside", "form", "iframe", "svg",
    "template", "button",
];

/// Tags that start a new line of text.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul",
    "ol", "blockquote", "pre", "table", "tr", "dd", "dt", "br", "hr",
];

/// Markers in `id`/`class` values that identify comment threads.
const COMMENT_MARKERS: &[&str] = &["comment", "disqus"];

/// Page text extractor backed by `reqwest` and `scraper`.
#[derive(Debug, Clone)]
pub struct ReadableExtractor {
    client: Client,
}

impl ReadableExtractor {
    pub fn new() -> Result<Self, DigestError> {
        let client = Client::builder().timeout(PAGE_TIMEOUT).build()?;
        Ok(Self { client })
    }

    async fn fetch_page(&self, url: &str) -> Result<String, DigestError> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(body)
    }
}

impl TextExtractor for ReadableExtractor {
    #[instrument(level = "info", skip(self))]
    async fn extract(&self, url: &str) -> String {
        let body = match self.fetch_page(url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Page fetch failed");
                return String::new();
            }
        };
        if body.trim().is_empty() {
            debug!("Page body is empty");
            return String::new();
        }

        let text = clamp_text(readable_text(&body));
        info!(chars = text.chars().count(), "Parsed article");
        text
    }
}

/// Extract the main text of a full HTML document.
///
/// # Arguments
///
/// * `html` - The page source
///
/// # Returns
///
/// The text of the first container kind whose best match is longer than
/// [`MIN_TEXT_CHARS`], one block per line. When none is, the text of the
/// first container found, possibly empty. No length window is applied here;
/// see [`clamp_text`].
pub fn readable_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut fallback = String::new();

    for selector in CONTAINERS.iter() {
        let best = document
            .select(selector)
            .map(element_text)
            .max_by_key(|text| text.chars().count());
        if let Some(text) = best {
            if text.chars().count() > MIN_TEXT_CHARS {
                return text;
            }
            if fallback.is_empty() {
                fallback = text;
            }
        }
    }
    fallback
}

/// Plain-text rendering of an HTML fragment, one block per line.
pub fn fragment_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    element_text(fragment.root_element())
}

/// Apply the length window: too short becomes empty, too long is cut.
pub fn clamp_text(text: String) -> String {
    if text.chars().count() <= MIN_TEXT_CHARS {
        return String::new();
    }
    truncate_chars(&text, MAX_TEXT_CHARS).to_string()
}

fn element_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    normalize_whitespace(&raw)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                if is_boilerplate(el) {
                    continue;
                }
                let Some(child_ref) = ElementRef::wrap(child) else {
                    continue;
                };
                let block = BLOCK_TAGS.contains(&el.name());
                if block {
                    out.push('\n');
                }
                collect_text(child_ref, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

fn is_boilerplate(el: &Element) -> bool {
    if SKIPPED_TAGS.contains(&el.name()) {
        return true;
    }
    if el.attr("hidden").is_some() || el.attr("aria-hidden") == Some("true") {
        return true;
    }
    if matches!(el.attr("role"), Some("navigation" | "complementary" | "banner")) {
        return true;
    }
    el.id()
        .into_iter()
        .chain(el.classes())
        .any(|name| {
            let name = name.to_ascii_lowercase();
            COMMENT_MARKERS.iter().any(|marker| name.contains(marker))
        })
}
