//! Subscription parsing and the optional YAML settings file.
//!
//! Subscriptions are written as
//!
//! ```text
//! a@example.com: dilbert, 9chickweedlane; b@example.org: foxtrot
//! ```
//!
//! Entries are separated by `;`, the address from its comics by `:`, and
//! comics by `,`. Order is preserved throughout because it decides the
//! order of messages and of the strips within each message.

use itertools::Itertools;
use lettre::Address;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use crate::error::ConfigError;
use crate::models::{Subscription, Subscriptions};

pub const DEFAULT_SENDER: &str = "comics@blairconrad.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Parse subscription text into subscribers and their comic keys.
///
/// Blank entries and blank keys are ignored, keys are lowercased, and a
/// key listed twice by the same subscriber is kept once. An address that
/// appears in several entries gets all of their keys, in order.
///
/// # Arguments
///
/// * `text` - Subscription text in the `address: key, key; address: key` form
///
/// # Returns
///
/// The subscribers in the order they first appear. An address with no
/// keys is kept and will receive an empty digest.
///
/// # Errors
///
/// Returns a [`ConfigError`] for an entry without `:`, an empty address,
/// or an address that is not a valid mailbox.
#[instrument(level = "info", skip_all)]
pub fn parse_subscriptions(text: &str) -> Result<Subscriptions, ConfigError> {
    let mut subscriptions: Subscriptions = Vec::new();

    for entry in text.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        let (address, comics) = entry
            .split_once(':')
            .ok_or_else(|| ConfigError::MissingSeparator(entry.to_string()))?;

        let address = address.trim();
        if address.is_empty() {
            return Err(ConfigError::MissingAddress(entry.to_string()));
        }
        address
            .parse::<Address>()
            .map_err(|source| ConfigError::InvalidAddress {
                address: address.to_string(),
                source,
            })?;

        let keys = comics
            .split(',')
            .map(|key| key.trim().to_lowercase())
            .filter(|key| !key.is_empty());

        match subscriptions.iter_mut().find(|s| s.email == address) {
            Some(existing) => {
                warn!(%address, "Address listed more than once; merging its comics");
                existing.comics.extend(keys);
                existing.comics = std::mem::take(&mut existing.comics)
                    .into_iter()
                    .unique()
                    .collect();
            }
            None => subscriptions.push(Subscription {
                email: address.to_string(),
                comics: keys.unique().collect(),
            }),
        }
    }

    debug!(?subscriptions, "Parsed subscriptions");
    info!(subscribers = subscriptions.len(), "Loaded subscriptions");
    Ok(subscriptions)
}

/// SMTP relay settings from the settings file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl SmtpSettings {
    /// Fill any unset field from `fallback`.
    pub fn or(self, fallback: SmtpSettings) -> SmtpSettings {
        SmtpSettings {
            host: self.host.or(fallback.host),
            port: self.port.or(fallback.port),
            username: self.username.or(fallback.username),
            password: self.password.or(fallback.password),
        }
    }
}

/// Contents of the optional `--config` YAML file.
///
/// ```yaml
/// sender: comics@example.com
/// subscriptions: "a@example.com: dilbert, foxtrot; b@example.org: blondie"
/// smtp:
///   host: smtp.example.com
///   port: 587
///   username: comics@example.com
///   password: hunter2
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub sender: Option<String>,
    pub subscriptions: Option<String>,
    pub smtp: SmtpSettings,
}

impl Settings {
    /// Read settings from a YAML file.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(raw)
    }
}
