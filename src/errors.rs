//! Error taxonomy for the digest pipeline.
//!
//! Every stage converts its failures into a [`DigestError`] at its own
//! boundary. Discovery and extraction then collapse the error into an empty
//! result; summarization and delivery hand it back to the orchestrator,
//! which logs it and ends the run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DigestError {
    #[error("Failed to reach remote service: {0}")]
    Network(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Generative model call failed: {0}")]
    Model(String),

    #[error("Missing configuration: {0}")]
    Configuration(String),

    #[error("Failed to deliver email: {0}")]
    Delivery(String),
}

impl From<reqwest::Error> for DigestError {
    fn from(error: reqwest::Error) -> Self {
        DigestError::Network(error.to_string())
    }
}

impl From<quick_xml::DeError> for DigestError {
    fn from(error: quick_xml::DeError) -> Self {
        DigestError::Parse(error.to_string())
    }
}

impl From<lettre::error::Error> for DigestError {
    fn from(error: lettre::error::Error) -> Self {
        DigestError::Delivery(format!("could not build message: {}", error))
    }
}

impl From<lettre::transport::smtp::Error> for DigestError {
    fn from(error: lettre::transport::smtp::Error) -> Self {
        DigestError::Delivery(error.to_string())
    }
}
