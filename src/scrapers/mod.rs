//! News discovery and article text extraction.
//!
//! The pipeline only talks to these stages through two traits, so the
//! orchestrator can be driven by fakes in tests:
//!
//! - [`NewsSource`]: turns a topic into a short, ordered list of headlines
//! - [`TextExtractor`]: turns an article URL into plain readable text
//!
//! # Implementations
//!
//! | Stage | Module | Method | Notes |
//! |-------|--------|--------|-------|
//! | Discovery | [`bing`] | Bing News RSS | First five entries, 10s timeout |
//! | Extraction | [`article`] | HTML scraping | Readability-style, 101..=10000 chars |
//!
//! Neither trait can fail: network and parse problems are logged at the
//! stage boundary and surface as an empty result.

use crate::models::NewsItem;

pub mod article;
pub mod bing;

/// A feed-like provider of headlines.
pub trait NewsSource {
    /// Return at most five items for `topic`, or none if the provider failed.
    async fn search(&self, topic: &str) -> Vec<NewsItem>;
}

/// Reduces a web page to its main text.
pub trait TextExtractor {
    /// Return the readable text of `url`, or an empty string if there is none.
    async fn extract(&self, url: &str) -> String;
}
