//! # Send Comics
//!
//! Mails each subscriber a digest of today's strips for the comics they
//! follow.
//!
//! ## Usage
//!
//! ```sh
//! send_comics -s "a@example.com: dilbert, 9chickweedlane; b@example.org: foxtrot" --dry-run
//! ```
//!
//! ## Architecture
//!
//! The application runs as a single sequential batch:
//! 1. **Configuration**: Parse subscriptions from the CLI, environment or settings file
//! 2. **Digests**: For each subscriber, fetch and scrape every comic they follow
//! 3. **Delivery**: Send one message per subscriber over SMTP (or print them)
//! 4. **Summary**: Optionally write a JSON record of the run

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod comics;
mod config;
mod digest;
mod error;
mod fetch;
mod models;
mod outputs;
mod utils;

use cli::Cli;
use comics::registry;
use config::{DEFAULT_SENDER, Settings, SmtpSettings, parse_subscriptions};
use digest::DigestBuilder;
use error::ConfigError;
use fetch::{RetryFetch, WebComicFetcher};
use outputs::mail::{DryRunMailer, SmtpConfig, SmtpMailer, send_all};
use outputs::json;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("send_comics starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.date, args.dry_run, "Parsed CLI arguments");

    if args.list_comics {
        for key in registry::keys() {
            println!("{key}");
        }
        return Ok(());
    }

    // ---- Load settings & subscriptions ----
    let settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let subscription_text = args
        .subscriptions
        .clone()
        .or(settings.subscriptions.clone())
        .ok_or(ConfigError::NoSubscriptions)?;
    let subscriptions = parse_subscriptions(&subscription_text)?;

    let sender = args
        .sender
        .clone()
        .or(settings.sender.clone())
        .unwrap_or_else(|| DEFAULT_SENDER.to_string());
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    info!(%date, %sender, subscribers = subscriptions.len(), "Building digests");

    // Early check: a summary we can't write should fail before any mail goes out
    if let Some(dir) = &args.summary_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Summary directory is not writable");
            return Err(e);
        }
    }

    // ---- Build digests ----
    let web = WebComicFetcher::new(Duration::from_secs(args.fetch_timeout))?;
    let fetcher = RetryFetch::new(web, args.fetch_retries, Duration::from_secs(1));
    let messages = DigestBuilder::new(date, &sender, &fetcher)
        .build_digests(&subscriptions)
        .await;

    // ---- Deliver ----
    let delivered = if args.dry_run {
        send_all(&DryRunMailer, &messages).await
    } else {
        let smtp = SmtpSettings {
            host: args.smtp_host.clone(),
            port: args.smtp_port,
            username: args.smtp_username.clone(),
            password: args.smtp_password.clone(),
        }
        .or(settings.smtp.clone());
        let mailer = SmtpMailer::new(&SmtpConfig::try_from(smtp)?)?;
        send_all(&mailer, &messages).await
    };

    // ---- Summary ----
    if let Some(dir) = &args.summary_dir {
        if let Err(e) = json::write_summary(&messages, delivered, date, dir).await {
            error!(error = %e, "Failed to write run summary");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        messages = messages.len(),
        delivered,
        "Execution complete"
    );

    Ok(())
}
