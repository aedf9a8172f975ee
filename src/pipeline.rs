//! The four-stage run: discover, extract, summarize, deliver.
//!
//! Each stage handles its own failures. An empty result from one stage ends
//! the run cleanly, and the reason is reported as a [`RunOutcome`] instead of
//! an error.

use crate::api::{AskAsync, summarize};
use crate::config::Config;
use crate::errors::DigestError;
use crate::models::{ExtractedDocument, NewsItem};
use crate::outputs::email::{Mailer, deliver};
use crate::scrapers::{NewsSource, TextExtractor};
use crate::utils::truncate_for_log;
use chrono::Local;
use std::fmt;
use tracing::{debug, error, info, instrument, warn};

/// The external collaborators of one run.
#[derive(Debug)]
pub struct Stages<S, E, A, M> {
    pub source: S,
    pub extractor: E,
    pub model: A,
    pub mailer: M,
}

/// Where a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Discovery returned nothing.
    NoNews,
    /// No discovered page had usable text.
    NoContent,
    /// The model call failed; nothing was sent.
    SummarizationFailed,
    /// Mail credentials are missing; nothing was sent.
    NotConfigured,
    /// The relay rejected the message or could not be reached.
    DeliveryFailed,
    /// The digest went out, built from this many documents.
    Delivered { documents: usize },
}

impl RunOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, RunOutcome::Delivered { .. })
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::NoNews => write!(f, "no_news"),
            RunOutcome::NoContent => write!(f, "no_content"),
            RunOutcome::SummarizationFailed => write!(f, "summarization_failed"),
            RunOutcome::NotConfigured => write!(f, "not_configured"),
            RunOutcome::DeliveryFailed => write!(f, "delivery_failed"),
            RunOutcome::Delivered { documents } => write!(f, "delivered({})", documents),
        }
    }
}

/// Extract every item in order, keeping the ones with usable text.
#[instrument(level = "info", skip_all, fields(items = items.len()))]
pub async fn collect_documents<E: TextExtractor>(
    extractor: &E,
    items: &[NewsItem],
) -> Vec<ExtractedDocument> {
    let mut documents = Vec::with_capacity(items.len());
    for item in items {
        let text = extractor.extract(&item.url).await;
        match ExtractedDocument::new(item, text) {
            Some(document) => {
                info!(title = %truncate_for_log(&item.title, 30), "✅ Read");
                documents.push(document);
            }
            None => debug!(url = %item.url, "No usable text; skipping"),
        }
    }
    documents
}

/// Run the pipeline once for `config.topic`.
///
/// Stages run strictly in order and the first one that yields nothing ends
/// the run.
///
/// # Arguments
///
/// * `config` - Run configuration
/// * `stages` - Discovery, extraction, model and mail implementations
///
/// # Returns
///
/// The [`RunOutcome`] describing where the run stopped. The run never fails.
#[instrument(level = "info", skip_all, fields(topic = %config.topic))]
pub async fn run<S, E, A, M>(config: &Config, stages: &Stages<S, E, A, M>) -> RunOutcome
where
    S: NewsSource,
    E: TextExtractor,
    A: AskAsync<Response = String>,
    M: Mailer,
{
    info!("🤖 Starting news digest run");

    let items = stages.source.search(&config.topic).await;
    if items.is_empty() {
        warn!("No news found; nothing to do");
        return RunOutcome::NoNews;
    }

    info!(count = items.len(), "📖 Reading articles");
    let documents = collect_documents(&stages.extractor, &items).await;
    if documents.is_empty() {
        warn!("❌ No article could be read");
        return RunOutcome::NoContent;
    }

    info!(documents = documents.len(), "🧠 Sending articles to the model");
    let digest = match summarize(&stages.model, &config.topic, &documents).await {
        Ok(digest) => digest,
        Err(e) => {
            error!(error = %e, "❌ Summarization failed");
            return RunOutcome::SummarizationFailed;
        }
    };

    let today = Local::now().date_naive();
    match deliver(config, &stages.mailer, &digest, today).await {
        Ok(()) => RunOutcome::Delivered {
            documents: documents.len(),
        },
        Err(DigestError::Configuration(missing)) => {
            error!(%missing, "❌ Email credentials are not configured");
            RunOutcome::NotConfigured
        }
        Err(e) => {
            error!(error = %e, "❌ Failed to send email");
            RunOutcome::DeliveryFailed
        }
    }
}
