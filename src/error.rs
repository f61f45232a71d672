//! Error types for each stage of the digest pipeline.
//!
//! - [`ComicError`]: why a single comic produced no image. Always handled
//!   locally by the digest builder and turned into a digest line.
//! - [`FetchError`]: the page fetcher could not retrieve content.
//! - [`ConfigError`]: the subscription text or settings file is unusable.
//! - [`MailError`]: a message could not be assembled or delivered.

use chrono::NaiveDate;
use thiserror::Error;

/// Per-comic failure or non-publication outcome.
#[derive(Debug, Error)]
pub enum ComicError {
    /// No source is registered under this key.
    #[error("no comic registered for key `{0}`")]
    UnknownComic(String),

    /// The page for this comic could not be retrieved.
    #[error("failed to fetch comic `{key}`")]
    FetchFailure {
        key: String,
        #[source]
        source: FetchError,
    },

    /// The strip does not run on the reference date. Not a failure.
    #[error("comic `{key}` is not published on {date}")]
    NotPublishedToday { key: String, date: NaiveDate },

    /// Content was retrieved but held no recognizable image.
    #[error("could not find an image for comic `{key}`")]
    ExtractionFailed { key: String },
}

/// Failure reported by a [`crate::fetch::ComicFetcher`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Unusable subscription text or settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("subscription entry `{0}` is missing the `:` between address and comics")]
    MissingSeparator(String),

    #[error("subscription entry `{0}` has no address")]
    MissingAddress(String),

    #[error("`{address}` is not a valid email address")]
    InvalidAddress {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("no subscriptions configured (use --subscriptions, COMIC_SUBSCRIPTIONS or the config file)")]
    NoSubscriptions,

    #[error("could not read settings file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse settings file {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Message assembly or delivery failure.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("`{address}` is not a valid mailbox")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("failed to build message for {recipient}")]
    Build {
        recipient: String,
        #[source]
        source: lettre::error::Error,
    },

    #[error("SMTP delivery to {recipient} failed")]
    Smtp {
        recipient: String,
        #[source]
        source: lettre::transport::smtp::Error,
    },

    #[error("could not set up SMTP relay {host}")]
    Relay {
        host: String,
        #[source]
        source: lettre::transport::smtp::Error,
    },

    #[error("could not write message for {recipient}")]
    Write {
        recipient: String,
        #[source]
        source: std::io::Error,
    },

    #[error("SMTP relay is not configured (missing {0})")]
    NotConfigured(&'static str),
}
