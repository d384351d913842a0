// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Rate-limit aware retry for API calls.
//!
//! A request answered with HTTP 403 and an exhausted
//! `X-RateLimit-Remaining` header is retried after waiting for the window
//! advertised by `X-RateLimit-Reset`. Time is read and spent through the
//! [`Clock`] trait so tests can drive the loop without real delays.

use std::{
    future::Future,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{client::ApiResponse, error::Error};

/// Source of wall-clock time and suspension used by the retry loop.
pub trait Clock
{
    /// Current time as seconds since the Unix epoch.
    fn now_epoch_secs(&self,) -> u64;

    /// Suspends the caller for `duration`.
    fn sleep(&self, duration: Duration,) -> impl Future<Output = (),>;
}

/// [`Clock`] backed by the system time and the tokio timer.
#[derive(Debug, Clone, Copy, Default,)]
pub struct SystemClock;

impl Clock for SystemClock
{
    fn now_epoch_secs(&self,) -> u64
    {
        SystemTime::now().duration_since(UNIX_EPOCH,).map(|elapsed| elapsed.as_secs(),).unwrap_or(0,)
    }

    async fn sleep(&self, duration: Duration,)
    {
        sleep(duration,).await;
    }
}

/// Configuration for rate-limit retries.
#[derive(Debug, Clone, PartialEq, Eq,)]
pub struct RetryConfig
{
    /// Maximum number of attempts per request, including the first one
    /// (default: 3).
    pub max_attempts: u32,
    /// Extra time waited past the advertised reset (default: 1s).
    pub reset_margin: Duration,
}

impl Default for RetryConfig
{
    fn default() -> Self
    {
        Self {
            max_attempts: 3, reset_margin: Duration::from_secs(1,),
        }
    }
}

/// Computes how long to wait before retrying a rate-limited request.
///
/// The wait is the time left until `reset_epoch` (never negative) plus
/// `margin`. A missing reset waits only the margin.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use top_langs::retry::rate_limit_wait;
///
/// let wait = rate_limit_wait(Some(1_005,), 1_000, Duration::from_secs(1,),);
/// assert_eq!(wait, Duration::from_secs(6,));
/// ```
pub fn rate_limit_wait(reset_epoch: Option<u64,>, now_epoch: u64, margin: Duration,) -> Duration
{
    let remaining = reset_epoch.map_or(0, |reset| reset.saturating_sub(now_epoch,),);
    Duration::from_secs(remaining,) + margin
}

/// Sends a request, retrying while the API reports an exhausted rate limit.
///
/// Any response that is not a rate-limit signal, successful or not, is
/// returned to the caller unchanged. Transport errors returned by `send` are
/// propagated immediately.
///
/// # Errors
///
/// Returns [`Error::RateLimited`] when the final allowed attempt is still
/// rate limited, or the error produced by `send`.
pub async fn retry_rate_limited<C, F, Fut,>(
    config: &RetryConfig,
    clock: &C,
    url: &str,
    mut send: F,
) -> Result<ApiResponse, Error,>
where
    C: Clock,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<ApiResponse, Error,>,>,
{
    let mut attempt = 1;

    loop {
        let response = send().await?;

        if !response.is_rate_limited() {
            if attempt > 1 {
                debug!("GET {} succeeded on attempt {}", url, attempt);
            }
            return Ok(response,);
        }

        if attempt >= config.max_attempts {
            warn!("GET {} still rate limited after {} attempts", url, attempt);
            return Err(Error::RateLimited {
                url: url.to_owned(), status: response.status, attempts: attempt,
            },);
        }

        let wait =
            rate_limit_wait(response.rate_limit_reset, clock.now_epoch_secs(), config.reset_margin,);
        warn!(
            "GET {} rate limited on attempt {}/{}. Retrying in {}s...",
            url,
            attempt,
            config.max_attempts,
            wait.as_secs()
        );

        clock.sleep(wait,).await;
        attempt += 1;
    }
}
