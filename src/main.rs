//! # News Digest Mailer
//!
//! Collects the latest news on a topic, has a language model write an HTML
//! newsletter from the articles, and emails it.
//!
//! ## Usage
//!
//! ```sh
//! TOPIC=technology GEMINI_API_KEY=... EMAIL_FROM=... EMAIL_PASSWORD=... \
//!     EMAIL_TO=... news_digest_mailer
//! ```
//!
//! A `.env` file in the working directory is read before the environment.
//!
//! ## Architecture
//!
//! The application runs four sequential stages:
//! 1. **Discovery**: top five items from the Bing News RSS feed for the topic
//! 2. **Extraction**: readable text of each linked page (skipped when too short)
//! 3. **Summarization**: one Gemini call turns the texts into an HTML digest
//! 4. **Delivery**: the digest is mailed through an authenticated SMTP relay
//!
//! Every stage absorbs its own failures, so the process always exits with
//! status 0; the final log line carries the run outcome.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod errors;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use api::GeminiClient;
use cli::Cli;
use config::Config;
use errors::DigestError;
use outputs::email::SmtpMailer;
use pipeline::Stages;
use scrapers::article::ReadableExtractor;
use scrapers::bing::BingNews;

type ProductionStages = Stages<BingNews, ReadableExtractor, GeminiClient, SmtpMailer>;

fn build_stages(config: &Config) -> Result<ProductionStages, DigestError> {
    Ok(Stages {
        source: BingNews::new(&config.market)?,
        extractor: ReadableExtractor::new()?,
        model: GeminiClient::new(config)?,
        mailer: SmtpMailer::from_config(config),
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load .env first so RUST_LOG from the file applies to the subscriber
    let dotenv = dotenvy::dotenv();

    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!(error = %e, "Failed to read .env file; using process environment"),
    }

    let start_time = std::time::Instant::now();
    info!("news_digest_mailer starting up");

    let config = Config::from(Cli::parse());
    debug!(topic = %config.topic, market = %config.market, model = %config.gemini_model, "Parsed configuration");

    let stages = match build_stages(&config) {
        Ok(stages) => stages,
        Err(e) => {
            error!(error = %e, "Failed to initialise HTTP clients");
            return Ok(());
        }
    };

    let outcome = pipeline::run(&config, &stages).await;

    let elapsed = start_time.elapsed();
    info!(
        %outcome,
        delivered = outcome.is_delivered(),
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
