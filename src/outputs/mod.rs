//! Delivery of finished digests.
//!
//! # Submodules
//!
//! - [`mail`]: turns [`crate::models::OutboundMessage`]s into RFC 5322
//!   messages and hands them to SMTP (or stdout in dry-run mode)
//! - [`json`]: writes a machine-readable summary of the run

pub mod json;
pub mod mail;
