//! JSON summary of a run.
//!
//! Written when `--summary-dir` is given, one file per reference date:
//! ```text
//! summary_dir/
//! └── 2018-06-27.json
//! ```
//! Re-running for the same date overwrites the previous summary.

use chrono::NaiveDate;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

use crate::models::OutboundMessage;

#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    date: NaiveDate,
    delivered: usize,
    messages: &'a [OutboundMessage],
}

/// Write the messages built for `date` to `{summary_dir}/{date}.json`.
///
/// # Arguments
///
/// * `messages` - Every message built this run, delivered or not
/// * `delivered` - How many of them the mailer accepted
/// * `date` - The reference date; names the file
/// * `summary_dir` - Directory to write into, created if missing
///
/// # Returns
///
/// The path of the written summary.
///
/// # Errors
///
/// Fails if the directory cannot be created or the file cannot be written.
#[instrument(level = "info", skip_all, fields(summary_dir = %summary_dir, %date))]
pub async fn write_summary(
    messages: &[OutboundMessage],
    delivered: usize,
    date: NaiveDate,
    summary_dir: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let summary = RunSummary {
        date,
        delivered,
        messages,
    };
    let json = serde_json::to_string_pretty(&summary)?;

    if let Err(e) = fs::create_dir_all(summary_dir).await {
        error!(%summary_dir, error = %e, "Failed to create summary dir");
        return Err(e.into());
    }

    let path = PathBuf::from(summary_dir).join(format!("{date}.json"));
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote run summary");

    Ok(path)
}
