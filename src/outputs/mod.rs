//! Digest delivery.
//!
//! # Submodules
//!
//! - [`email`]: composes the date-stamped message and sends it over SMTP
//!
//! The digest is never written to disk; email is the only output.

pub mod email;
