//! Run configuration.
//!
//! Built once in `main` from [`crate::cli::Cli`] and handed to each stage by
//! reference. Nothing reads the environment after startup.

use crate::errors::DigestError;

/// Topic searched when `TOPIC` is not set.
pub const DEFAULT_TOPIC: &str = "technology";

/// Market/locale sent to the news feed.
pub const DEFAULT_MARKET: &str = "en-US";

/// Model used for the summary.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Gmail SMTP relay.
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Standard submission port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

#[derive(Debug, Clone)]
pub struct Config {
    pub topic: String,
    pub market: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub email_from: Option<String>,
    pub email_password: Option<String>,
    pub email_to: Option<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            market: DEFAULT_MARKET.to_string(),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            email_from: None,
            email_password: None,
            email_to: None,
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
        }
    }
}

/// The three values the mail stage cannot run without.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailCredentials {
    pub from: String,
    pub password: String,
    pub to: String,
}

impl Config {
    /// Collect sender, secret and recipient, failing on the first one missing.
    ///
    /// Blank values count as missing.
    pub fn mail_credentials(&self) -> Result<MailCredentials, DigestError> {
        let from = required(&self.email_from, "EMAIL_FROM")?;
        let password = required(&self.email_password, "EMAIL_PASSWORD")?;
        let to = required(&self.email_to, "EMAIL_TO")?;
        Ok(MailCredentials { from, password, to })
    }

    /// The Gemini API key, if one was configured.
    pub fn api_key(&self) -> Result<&str, DigestError> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| DigestError::Configuration("GEMINI_API_KEY".to_string()))
    }
}

/// Parse an SMTP port value taken from the command line or environment.
///
/// # Arguments
///
/// * `raw` - The value as given, surrounding whitespace allowed.
///
/// # Returns
///
/// The port number, or [`DigestError::Configuration`] naming `SMTP_PORT`
/// when the value is not a non-zero `u16`.
pub fn parse_port(raw: &str) -> Result<u16, DigestError> {
    match raw.trim().parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(DigestError::Configuration(format!(
            "SMTP_PORT (invalid value {raw:?})"
        ))),
    }
}

fn required(value: &Option<String>, name: &str) -> Result<String, DigestError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(DigestError::Configuration(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_config() -> Config {
        Config {
            email_from: Some("sender@gmail.com".to_string()),
            email_password: Some("app-password".to_string()),
            email_to: Some("reader@example.com".to_string()),
            gemini_api_key: Some("key".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.topic, "technology");
        assert_eq!(config.smtp_host, "smtp.gmail.com");
        assert_eq!(config.smtp_port, 587);
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
    }

    #[test]
    fn test_mail_credentials_present() {
        let creds = full_config().mail_credentials().unwrap();
        assert_eq!(creds.from, "sender@gmail.com");
        assert_eq!(creds.password, "app-password");
        assert_eq!(creds.to, "reader@example.com");
    }

    #[test]
    fn test_mail_credentials_each_missing() {
        let mut config = full_config();
        config.email_from = None;
        assert!(matches!(
            config.mail_credentials(),
            Err(DigestError::Configuration(ref n)) if n == "EMAIL_FROM"
        ));

        let mut config = full_config();
        config.email_password = Some("   ".to_string());
        assert!(matches!(
            config.mail_credentials(),
            Err(DigestError::Configuration(ref n)) if n == "EMAIL_PASSWORD"
        ));

        let mut config = full_config();
        config.email_to = None;
        assert!(matches!(
            config.mail_credentials(),
            Err(DigestError::Configuration(ref n)) if n == "EMAIL_TO"
        ));
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("587").unwrap(), 587);
        assert_eq!(parse_port(" 2525 ").unwrap(), 2525);
        for raw in ["abc", "", "0", "70000", "-1"] {
            assert!(
                matches!(parse_port(raw), Err(DigestError::Configuration(ref m)) if m.starts_with("SMTP_PORT")),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_api_key() {
        assert_eq!(full_config().api_key().unwrap(), "key");
        assert!(Config::default().api_key().is_err());
    }
}
