//! Email delivery over an authenticated SMTP relay.
//!
//! The message is `multipart/alternative`: a plain-text rendering for
//! clients that refuse HTML, and the model's HTML verbatim. Gmail's relay
//! on port 587 with STARTTLS is the default transport.

use crate::config::{Config, MailCredentials};
use crate::errors::DigestError;
use crate::models::Digest;
use crate::scrapers::article::fragment_text;
use crate::utils::upcase;
use chrono::NaiveDate;
use lettre::message::{Mailbox, MultiPart, SinglePart, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::{info, instrument};

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// A fully composed digest email, independent of any transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Something that can put an [`OutgoingEmail`] on the wire.
pub trait Mailer {
    async fn send(
        &self,
        credentials: &MailCredentials,
        email: &OutgoingEmail,
    ) -> Result<(), DigestError>;
}

/// STARTTLS SMTP submission through `lettre`.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    host: String,
    port: u16,
}

impl SmtpMailer {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.smtp_host, config.smtp_port)
    }
}

impl Mailer for SmtpMailer {
    #[instrument(level = "info", skip_all, fields(host = %self.host, port = self.port))]
    async fn send(
        &self,
        credentials: &MailCredentials,
        email: &OutgoingEmail,
    ) -> Result<(), DigestError> {
        let message = build_message(email)?;
        let creds = Credentials::new(credentials.from.clone(), credentials.password.clone());

        let transport: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host)?
                .port(self.port)
                .credentials(creds)
                .timeout(Some(SMTP_TIMEOUT))
                .build();

        let response = transport.send(message).await?;
        info!(code = %response.code(), "SMTP relay accepted message");
        Ok(())
    }
}

/// Subject line for the digest sent on `date`.
pub fn digest_subject(topic: &str, date: NaiveDate) -> String {
    format!(
        "Daily {} Digest - {}",
        upcase(topic.trim()),
        date.format("%d/%m/%Y")
    )
}

/// Compose the digest email for `date`.
///
/// # Arguments
///
/// * `credentials` - Sender and recipient addresses
/// * `topic` - Topic used in the subject line
/// * `digest` - The HTML digest, sent verbatim
/// * `date` - Local date printed in the subject
///
/// # Returns
///
/// An [`OutgoingEmail`] carrying the HTML body and a plain-text rendering of it.
pub fn compose(
    credentials: &MailCredentials,
    topic: &str,
    digest: &Digest,
    date: NaiveDate,
) -> OutgoingEmail {
    OutgoingEmail {
        from: credentials.from.clone(),
        to: credentials.to.clone(),
        subject: digest_subject(topic, date),
        html: digest.html.clone(),
        text: fragment_text(&digest.html),
    }
}

/// Turn an [`OutgoingEmail`] into a MIME message.
///
/// # Arguments
///
/// * `email` - The composed digest email
///
/// # Returns
///
/// A `multipart/alternative` message with the plain-text part first and the
/// HTML part last.
///
/// # Errors
///
/// [`DigestError::Delivery`] when either address does not parse.
pub fn build_message(email: &OutgoingEmail) -> Result<Message, DigestError> {
    let from: Mailbox = email
        .from
        .parse()
        .map_err(|e| DigestError::Delivery(format!("invalid sender address: {}", e)))?;
    let to: Mailbox = email
        .to
        .parse()
        .map_err(|e| DigestError::Delivery(format!("invalid recipient address: {}", e)))?;

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject.clone())
        .multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(email.text.clone()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(email.html.clone()),
                ),
        )?;
    Ok(message)
}

/// Send `digest` to the configured recipient.
///
/// # Arguments
///
/// * `config` - Run configuration holding topic and mail credentials
/// * `mailer` - Transport used for the single send
/// * `digest` - The HTML digest
/// * `date` - Local date printed in the subject
///
/// # Errors
///
/// [`DigestError::Configuration`] before touching the mailer when sender,
/// password or recipient is missing; [`DigestError::Delivery`] when the
/// message cannot be built or the relay rejects it.
#[instrument(level = "info", skip_all)]
pub async fn deliver<M: Mailer>(
    config: &Config,
    mailer: &M,
    digest: &Digest,
    date: NaiveDate,
) -> Result<(), DigestError> {
    let credentials = config.mail_credentials()?;
    let email = compose(&credentials, &config.topic, digest, date);

    info!(to = %email.to, subject = %email.subject, "📧 Sending email");
    mailer.send(&credentials, &email).await?;
    info!("✅ Email sent");
    Ok(())
}
