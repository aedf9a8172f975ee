//! Data models passed between the pipeline stages.
//!
//! - [`NewsItem`]: a discovered headline and its link
//! - [`ExtractedDocument`]: a news item plus the readable text of its page
//! - [`Digest`]: the HTML produced by the summarization stage
//!
//! None of these outlive a single run.

use crate::utils::truncate_chars;

/// Minimum number of characters an extracted text must exceed to be kept.
pub const MIN_TEXT_CHARS: usize = 100;

/// Maximum number of characters kept from an extracted text.
pub const MAX_TEXT_CHARS: usize = 10_000;

/// A headline returned by the discovery stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    /// Display title of the entry.
    pub title: String,
    /// Link to the article page.
    pub url: String,
}

/// A news item whose page yielded usable text.
///
/// Only built through [`ExtractedDocument::new`], so `text` always holds
/// more than `MIN_TEXT_CHARS` and at most `MAX_TEXT_CHARS` characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub title: String,
    pub url: String,
    pub text: String,
}

impl ExtractedDocument {
    /// Pair a news item with its extracted text.
    ///
    /// Returns `None` when the text is too short to be worth summarizing;
    /// longer texts are cut down to `MAX_TEXT_CHARS`.
    pub fn new(item: &NewsItem, text: String) -> Option<Self> {
        if text.chars().count() <= MIN_TEXT_CHARS {
            return None;
        }
        Some(Self {
            title: item.title.clone(),
            url: item.url.clone(),
            text: truncate_chars(&text, MAX_TEXT_CHARS).to_string(),
        })
    }

    /// Render the attributed block that goes into the model prompt.
    pub fn context_block(&self) -> String {
        format!(
            "\n\nSOURCE: {}\nLINK: {}\nCONTENT: {}",
            self.title, self.url, self.text
        )
    }
}

/// Concatenate the attributed blocks of every document, in order.
pub fn digest_context(documents: &[ExtractedDocument]) -> String {
    documents.iter().map(ExtractedDocument::context_block).collect()
}

/// The HTML newsletter produced for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub html: String,
}
