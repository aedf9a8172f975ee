//! Command-line interface definitions for the digest mailer.
//!
//! The binary is meant to be run without arguments from a scheduler; every
//! option is bound to an environment variable and only exists as a flag so a
//! single value can be overridden by hand.

use crate::config::{
    Config, DEFAULT_GEMINI_MODEL, DEFAULT_MARKET, DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT,
    DEFAULT_TOPIC, parse_port,
};
use clap::Parser;
use tracing::error;

/// Command-line arguments for the digest mailer.
///
/// # Examples
///
/// ```sh
/// # Everything from the environment (or a .env file)
/// news_digest_mailer
///
/// # One-off run on another subject
/// news_digest_mailer --topic "open source"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Topic to search the news for
    #[arg(long, env = "TOPIC", default_value = DEFAULT_TOPIC)]
    pub topic: String,

    /// Market/locale passed to the news feed
    #[arg(long, env = "NEWS_MARKET", default_value = DEFAULT_MARKET)]
    pub market: String,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini model identifier
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub gemini_model: String,

    /// Sender address, also used as the SMTP login
    #[arg(long, env = "EMAIL_FROM")]
    pub email_from: Option<String>,

    /// SMTP password (an app password for Gmail)
    #[arg(long, env = "EMAIL_PASSWORD", hide_env_values = true)]
    pub email_password: Option<String>,

    /// Recipient address
    #[arg(long, env = "EMAIL_TO")]
    pub email_to: Option<String>,

    /// SMTP relay host
    #[arg(long, env = "SMTP_HOST", default_value = DEFAULT_SMTP_HOST)]
    pub smtp_host: String,

    // Validated in `From<Cli> for Config`; a malformed value falls back to
    // the default port.
    /// SMTP submission port
    #[arg(long, env = "SMTP_PORT", default_value_t = DEFAULT_SMTP_PORT.to_string())]
    pub smtp_port: String,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        let smtp_port = parse_port(&cli.smtp_port).unwrap_or_else(|e| {
            error!(error = %e, fallback = DEFAULT_SMTP_PORT, "Ignoring malformed SMTP port");
            DEFAULT_SMTP_PORT
        });
        Config {
            topic: cli.topic,
            market: cli.market,
            gemini_api_key: cli.gemini_api_key,
            gemini_model: cli.gemini_model,
            email_from: cli.email_from,
            email_password: cli.email_password,
            email_to: cli.email_to,
            smtp_host: cli.smtp_host,
            smtp_port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Flags always win over the environment, so these tests stay independent
    // of whatever the developer has exported.

    #[test]
    fn test_cli_flags_override() {
        let cli = Cli::parse_from([
            "news_digest_mailer",
            "--topic",
            "rust",
            "--market",
            "pt-BR",
            "--email-from",
            "me@example.com",
            "--email-to",
            "you@example.com",
            "--smtp-port",
            "2525",
        ]);

        assert_eq!(cli.topic, "rust");
        assert_eq!(cli.market, "pt-BR");
        assert_eq!(cli.email_from.as_deref(), Some("me@example.com"));
        assert_eq!(cli.email_to.as_deref(), Some("you@example.com"));
        assert_eq!(Config::from(cli).smtp_port, 2525);
    }

    #[test]
    fn test_cli_into_config() {
        let cli = Cli::parse_from([
            "news_digest_mailer",
            "--topic",
            "space",
            "--gemini-model",
            "gemini-test",
            "--smtp-host",
            "localhost",
        ]);
        let config = Config::from(cli);

        assert_eq!(config.topic, "space");
        assert_eq!(config.gemini_model, "gemini-test");
        assert_eq!(config.smtp_host, "localhost");
    }

    #[test]
    fn test_cli_bad_port_falls_back_to_default() {
        let cli = Cli::try_parse_from(["news_digest_mailer", "--smtp-port", "not-a-port"]).unwrap();
        assert_eq!(Config::from(cli).smtp_port, DEFAULT_SMTP_PORT);
    }

    #[test]
    fn test_cli_bad_port_from_env_falls_back_to_default() {
        // Only this test touches SMTP_PORT; the others pass the flag explicitly
        // or never read the port.
        unsafe { std::env::set_var("SMTP_PORT", "abc") };
        let parsed = Cli::try_parse_from(["news_digest_mailer"]);
        unsafe { std::env::remove_var("SMTP_PORT") };

        let config = Config::from(parsed.unwrap());
        assert_eq!(config.smtp_port, DEFAULT_SMTP_PORT);
    }
}
