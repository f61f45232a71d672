//! Command-line interface definitions for Send Comics.
//!
//! Every option can also come from an environment variable or the YAML
//! settings file given with `--config`. Command-line values win over the
//! environment, which wins over the file.

use chrono::NaiveDate;
use clap::Parser;

/// Command-line arguments for the Send Comics application.
///
/// # Examples
///
/// ```sh
/// # Print today's digests instead of mailing them
/// send_comics -s "a@example.com: dilbert, foxtrot" --dry-run
///
/// # Mail the digests for a particular day through an SMTP relay
/// send_comics -c settings.yaml -d 2018-06-27 --smtp-host smtp.example.com
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML settings file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Subscriptions, e.g. "a@example.com: dilbert, 9chickweedlane; b@example.org: foxtrot"
    #[arg(short, long, env = "COMIC_SUBSCRIPTIONS")]
    pub subscriptions: Option<String>,

    /// Reference date (YYYY-MM-DD); defaults to today in local time
    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    /// Address the digests are sent from
    #[arg(long, env = "COMICS_SENDER")]
    pub sender: Option<String>,

    /// SMTP relay host
    #[arg(long, env = "SMTP_HOST")]
    pub smtp_host: Option<String>,

    /// SMTP relay port
    #[arg(long, env = "SMTP_PORT")]
    pub smtp_port: Option<u16>,

    /// SMTP username
    #[arg(long, env = "SMTP_USERNAME")]
    pub smtp_username: Option<String>,

    /// SMTP password
    #[arg(long, env = "SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,

    /// Seconds to wait for each comic page
    #[arg(long, default_value_t = 20)]
    pub fetch_timeout: u64,

    /// Retries for each failed page fetch
    #[arg(long, default_value_t = 3)]
    pub fetch_retries: usize,

    /// Directory for a JSON summary of the run
    #[arg(long)]
    pub summary_dir: Option<String>,

    /// Print the digests instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// List the available comic keys and exit
    #[arg(long)]
    pub list_comics: bool,
}
