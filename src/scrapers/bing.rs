//! Bing News RSS discovery.
//!
//! Queries `https://www.bing.com/news/search?q=<topic>&format=rss&setmkt=<market>`
//! and keeps the first five `<item>` entries of the returned RSS channel.
//! The request carries a desktop browser `User-Agent`; without it Bing tends
//! to answer with a bot challenge page instead of the feed.

use crate::errors::DigestError;
use crate::models::NewsItem;
use crate::scrapers::NewsSource;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use url::Url;

/// Bing News search endpoint.
pub const FEED_ENDPOINT: &str = "https://www.bing.com/news/search";

/// Number of feed entries handed to the rest of the pipeline.
pub const MAX_ITEMS: usize = 5;

/// Browser identification sent with the feed request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const FEED_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<FeedEntry>,
}

#[derive(Debug, Deserialize)]
struct FeedEntry {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
}

/// News discovery backed by the Bing News RSS feed.
#[derive(Debug, Clone)]
pub struct BingNews {
    client: Client,
    endpoint: String,
    market: String,
}

impl BingNews {
    /// Create a source for the given market (e.g. `"en-US"`, `"pt-BR"`).
    pub fn new(market: &str) -> Result<Self, DigestError> {
        Self::with_endpoint(FEED_ENDPOINT, market)
    }

    /// Create a source that queries `endpoint` instead of Bing.
    pub fn with_endpoint(endpoint: &str, market: &str) -> Result<Self, DigestError> {
        let client = Client::builder()
            .timeout(FEED_TIMEOUT)
            .user_agent(BROWSER_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            market: market.to_string(),
        })
    }

    /// Build the feed URL for `topic`. The topic is sent as-is, even when empty.
    pub fn feed_url(&self, topic: &str) -> Result<Url, DigestError> {
        Url::parse_with_params(
            &self.endpoint,
            &[("q", topic), ("format", "rss"), ("setmkt", self.market.as_str())],
        )
        .map_err(|e| DigestError::Parse(format!("invalid feed endpoint: {}", e)))
    }

    async fn fetch_feed(&self, topic: &str) -> Result<Vec<NewsItem>, DigestError> {
        let url = self.feed_url(topic)?;
        debug!(%url, "Requesting news feed");
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_feed(&body)
    }
}

impl NewsSource for BingNews {
    #[instrument(level = "info", skip(self))]
    async fn search(&self, topic: &str) -> Vec<NewsItem> {
        info!(market = %self.market, "🔎 Querying news feed");
        match self.fetch_feed(topic).await {
            Ok(items) => {
                info!(count = items.len(), "✅ Found news links");
                debug!(items = ?items, "Feed items");
                items
            }
            Err(e) => {
                error!(error = %e, "❌ Failed to download news feed");
                Vec::new()
            }
        }
    }
}

/// Parse an RSS document and return its first [`MAX_ITEMS`] entries.
///
/// Entries without a link are dropped. Channel elements interleaved between
/// `<item>`s are tolerated.
///
/// # Arguments
///
/// * `xml` - The raw RSS 2.0 document.
///
/// # Returns
///
/// Up to [`MAX_ITEMS`] items in feed order.
///
/// # Errors
///
/// [`DigestError::Parse`] when the document is not a well-formed RSS feed.
pub fn parse_feed(xml: &str) -> Result<Vec<NewsItem>, DigestError> {
    let rss: Rss = quick_xml::de::from_str(xml)?;
    Ok(rss
        .channel
        .items
        .into_iter()
        .take(MAX_ITEMS)
        .filter_map(|entry| {
            let url = entry.link.trim().to_string();
            if url.is_empty() {
                return None;
            }
            Some(NewsItem {
                title: entry.title.trim().to_string(),
                url,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn sends_browser_agent(request: &Request) -> bool {
        request
            .headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            == Some(BROWSER_USER_AGENT)
    }

    fn rss_with_items(count: usize) -> String {
        let items: String = (1..=count)
            .map(|i| {
                format!(
                    "<item><title>Story {i} &amp; more</title><link>https://news.example.com/{i}</link>\
                     <description>Teaser {i}</description><pubDate>Mon, 19 Oct 2026 08:00:00 GMT</pubDate></item>"
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<rss version="2.0" xmlns:News="https://www.bing.com/news/search?q=test&amp;format=rss">
  <channel>
    <title>test - Bing News</title>
    <link>https://www.bing.com/news/search?q=test</link>
    <description>Search results</description>
    {items}
  </channel>
</rss>"#
        )
    }

    #[test]
    fn test_parse_feed_keeps_first_five() {
        let items = parse_feed(&rss_with_items(8)).unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items[0].title, "Story 1 & more");
        assert_eq!(items[0].url, "https://news.example.com/1");
        assert_eq!(items[4].url, "https://news.example.com/5");
    }

    #[test]
    fn test_parse_feed_fewer_than_five() {
        let items = parse_feed(&rss_with_items(2)).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_parse_feed_empty_channel() {
        let items = parse_feed(&rss_with_items(0)).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_parse_feed_cdata_and_missing_link() {
        let xml = r#"<rss><channel>
            <item><title><![CDATA[Quoted <b>title</b>]]></title><link> https://a.example/x </link></item>
            <item><title>No link</title></item>
        </channel></rss>"#;
        let items = parse_feed(xml).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Quoted <b>title</b>");
        assert_eq!(items[0].url, "https://a.example/x");
    }

    #[test]
    fn test_parse_feed_items_interleaved_with_channel_fields() {
        let xml = r#"<rss version="2.0"><channel>
            <item><title>First</title><link>https://news.example.com/1</link></item>
            <title>t</title>
            <item><title>Second</title><link>https://news.example.com/2</link></item>
        </channel></rss>"#;
        let items = parse_feed(xml).unwrap();
        let urls: Vec<&str> = items.iter().map(|item| item.url.as_str()).collect();
        assert_eq!(urls, ["https://news.example.com/1", "https://news.example.com/2"]);
        assert_eq!(items[1].title, "Second");
    }

    #[test]
    fn test_parse_feed_rejects_html() {
        assert!(parse_feed("<html><body>captcha</body></html>").is_err());
        assert!(parse_feed("").is_err());
    }

    #[test]
    fn test_feed_url_encodes_topic() {
        let source = BingNews::new("pt-BR").unwrap();
        let url = source.feed_url("rust & go").unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(url.host_str(), Some("www.bing.com"));
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "rust & go".to_string()),
                ("format".to_string(), "rss".to_string()),
                ("setmkt".to_string(), "pt-BR".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_search_queries_feed_with_browser_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news/search"))
            .and(query_param("q", "open source"))
            .and(query_param("format", "rss"))
            .and(query_param("setmkt", "en-US"))
            .and(sends_browser_agent)
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(rss_with_items(7), "application/rss+xml"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let source =
            BingNews::with_endpoint(&format!("{}/news/search", server.uri()), "en-US").unwrap();
        let items = source.search("open source").await;
        assert_eq!(items.len(), 5);
        assert_eq!(items[2].title, "Story 3 & more");
    }

    #[tokio::test]
    async fn test_search_passes_empty_topic_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news/search"))
            .and(query_param("q", ""))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(rss_with_items(1), "application/rss+xml"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let source =
            BingNews::with_endpoint(&format!("{}/news/search", server.uri()), "en-US").unwrap();
        assert_eq!(source.search("").await.len(), 1);
    }

    #[tokio::test]
    async fn test_search_degrades_to_empty_on_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source =
            BingNews::with_endpoint(&format!("{}/news/search", server.uri()), "en-US").unwrap();
        assert!(source.search("technology").await.is_empty());
    }

    #[tokio::test]
    async fn test_search_degrades_to_empty_on_garbage_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("definitely not a feed"))
            .mount(&server)
            .await;

        let source =
            BingNews::with_endpoint(&format!("{}/news/search", server.uri()), "en-US").unwrap();
        assert!(source.search("technology").await.is_empty());
    }

    #[tokio::test]
    async fn test_search_degrades_to_empty_when_unreachable() {
        let source = BingNews::with_endpoint("http://127.0.0.1:9/news/search", "en-US").unwrap();
        assert!(source.search("technology").await.is_empty());
    }
}
