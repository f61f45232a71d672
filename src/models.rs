//! Data models for subscriptions, digests, and the messages built from them.
//!
//! - [`Subscription`]: one subscriber and the comic keys they follow
//! - [`DigestLine`]: the outcome for a single comic key
//! - [`Digest`]: a subscriber's lines, in subscription order
//! - [`OutboundMessage`]: sender, recipient, subject and body ready to mail

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::error::ComicError;

/// A subscriber and the comics they follow, in the order they listed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub email: String,
    pub comics: Vec<String>,
}

/// All subscriptions, in configuration order.
pub type Subscriptions = Vec<Subscription>;

/// The outcome for one comic key in a digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DigestLine {
    /// Absolute URL of today's strip.
    Image(String),
    /// Key of a comic that does not run today.
    NotPublished(String),
    /// Key of a comic that could not be found, fetched or parsed.
    NotFound(String),
}

impl DigestLine {
    /// Turn a per-comic result into the line the subscriber will see.
    pub fn from_outcome(key: &str, outcome: Result<String, ComicError>) -> Self {
        match outcome {
            Ok(image) => DigestLine::Image(image),
            Err(ComicError::NotPublishedToday { .. }) => DigestLine::NotPublished(key.to_string()),
            Err(
                ComicError::UnknownComic(_)
                | ComicError::FetchFailure { .. }
                | ComicError::ExtractionFailed { .. },
            ) => DigestLine::NotFound(key.to_string()),
        }
    }

    /// Body paragraph for this line.
    ///
    /// Image URLs come from scraped pages and keys from user configuration,
    /// so both are escaped before they reach the markup.
    pub fn to_html(&self) -> String {
        match self {
            DigestLine::Image(url) => format!("<p><img src=\"{}\"></p>", html_escape(url)),
            other => format!("<p>{}</p>", html_escape(&other.to_string())),
        }
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl fmt::Display for DigestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestLine::Image(url) => f.write_str(url),
            DigestLine::NotPublished(key) => write!(f, "Comic {key} wasn't published today."),
            DigestLine::NotFound(key) => write!(f, "Couldn't find comic for {key}."),
        }
    }
}

/// One subscriber's digest, built up comic by comic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Digest {
    pub recipient: String,
    pub lines: Vec<DigestLine>,
}

impl Digest {
    pub fn new(recipient: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            lines: Vec::new(),
        }
    }

    pub fn push(&mut self, line: DigestLine) {
        self.lines.push(line);
    }

    /// Number of lines that carry an image.
    pub fn image_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|line| matches!(line, DigestLine::Image(_)))
            .count()
    }

    /// Concatenate the lines into a message body, one paragraph per line.
    pub fn body(&self) -> String {
        self.lines
            .iter()
            .map(DigestLine::to_html)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A finished digest email. Never modified after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    sender: String,
    recipient: String,
    subject: String,
    body: String,
}

impl OutboundMessage {
    pub fn new(sender: &str, digest: &Digest, date: NaiveDate) -> Self {
        Self {
            sender: sender.to_string(),
            recipient: digest.recipient.clone(),
            subject: subject_for(date),
            body: digest.body(),
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Subject line such as `Comics for Wednesday, June 27, 2018`.
pub fn subject_for(date: NaiveDate) -> String {
    format!("Comics for {}", date.format("%A, %B %-d, %Y"))
}
