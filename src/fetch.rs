//! Page retrieval for comic sources, with exponential backoff retry logic.
//!
//! # Architecture
//!
//! - [`ComicFetcher`]: the seam the digest builder talks to
//! - [`WebComicFetcher`]: plain HTTP GET via `reqwest`
//! - [`RetryFetch`]: decorator that adds retry logic to any `ComicFetcher`
//!
//! # Retry Strategy
//!
//! - Maximum 3 retry attempts
//! - Exponential backoff starting at 1 second
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to each delay

use rand::{Rng, rng};
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

use crate::error::FetchError;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Retrieves the raw page content for a URL.
pub trait ComicFetcher {
    /// Fetch `url` and return its body as text.
    async fn get_content(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches pages over HTTP.
#[derive(Debug, Clone)]
pub struct WebComicFetcher {
    client: reqwest::Client,
}

impl WebComicFetcher {
    /// Build a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: StdDuration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

impl ComicFetcher for WebComicFetcher {
    #[instrument(level = "info", skip(self))]
    async fn get_content(&self, url: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let request_error = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(request_error)?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`ComicFetcher`].
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: ComicFetcher,
{
    /// Wrap `inner`, retrying each failed fetch up to `max_retries` times.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let web = WebComicFetcher::new(Duration::from_secs(20))?;
    /// let fetcher = RetryFetch::new(web, 3, Duration::from_secs(1));
    /// ```
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> ComicFetcher for RetryFetch<T>
where
    T: ComicFetcher,
{
    #[instrument(level = "info", skip(self))]
    async fn get_content(&self, url: &str) -> Result<String, FetchError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.get_content(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    // A 4xx will not get better by asking again.
                    let permanent = matches!(e, FetchError::Status { status, .. } if (400..500).contains(&status));

                    if permanent || attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "get_content() giving up"
                        );
                        return Err(e);
                    }

                    let mut delay = self.base_delay.saturating_mul(1 << (attempt - 1));
                    if delay > self.max_delay {
                        delay = self.max_delay;
                    }
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "get_content() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
