//! Polling with exponential backoff and cancellation support.
//!
//! Provides a generic abstraction for waiting on an AWS condition (or any
//! async check) to settle, with configurable exponential backoff, jitter,
//! a total timeout and cancellation.

use backon::{BackoffBuilder, ExponentialBackoff, ExponentialBuilder};
use cloudmap_common::defaults::{
    DEFAULT_OPERATION_TIMEOUT_SECS, OPERATION_POLL_INITIAL_DELAY_MS, OPERATION_POLL_MAX_DELAY_SECS,
};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Configuration for waiting with exponential backoff.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Initial delay between checks
    pub initial_delay: Duration,
    /// Maximum delay between checks (cap for exponential growth)
    pub max_delay: Duration,
    /// Maximum total time to wait before timeout
    pub timeout: Duration,
    /// Randomize delays to spread out concurrent pollers
    pub jitter: bool,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(OPERATION_POLL_INITIAL_DELAY_MS),
            max_delay: Duration::from_secs(OPERATION_POLL_MAX_DELAY_SECS),
            timeout: Duration::from_secs(DEFAULT_OPERATION_TIMEOUT_SECS),
            jitter: true,
        }
    }
}

impl WaitConfig {
    /// Create a new WaitConfig with the given timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }
}

/// Delays between checks. Unbounded in count; the timeout ends the wait.
fn backoff(config: &WaitConfig) -> ExponentialBackoff {
    let builder = ExponentialBuilder::default()
        .with_min_delay(config.initial_delay)
        .with_max_delay(config.max_delay)
        .with_factor(2.0)
        .without_max_times();
    if config.jitter {
        builder.with_jitter().build()
    } else {
        builder.build()
    }
}

/// Why a wait ended without a result
#[derive(Debug, Error)]
pub enum WaitError<E> {
    #[error("Timeout waiting for {resource} after {timeout:?} ({attempts} attempts)")]
    Timeout {
        resource: String,
        timeout: Duration,
        attempts: u32,
    },

    #[error("Wait for {resource} cancelled")]
    Cancelled { resource: String },

    /// The check itself returned an error
    #[error("Check for {resource} failed: {error}")]
    Check { resource: String, error: E },
}

/// Poll `check` until it yields a value.
///
/// `check` returns `Ok(Some(value))` when done, `Ok(None)` to poll again
/// after the next backoff delay, or `Err` to stop immediately.
///
/// # Example
/// ```ignore
/// let op = wait_for(
///     WaitConfig::default(),
///     Some(&cancel_token),
///     || async { Ok::<_, AwsError>(client.get_operation(id).await?.filter(done)) },
///     "operation",
/// ).await?;
/// ```
pub async fn wait_for<T, E, F, Fut>(
    config: WaitConfig,
    cancel: Option<&CancellationToken>,
    check: F,
    resource_name: &str,
) -> Result<T, WaitError<E>>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
    E: Display,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    let mut delays = backoff(&config);

    loop {
        attempts += 1;

        if cancel.is_some_and(|token| token.is_cancelled()) {
            return Err(WaitError::Cancelled {
                resource: resource_name.to_string(),
            });
        }

        match check().await {
            Ok(Some(value)) => {
                debug!(resource = %resource_name, attempts, "Wait complete");
                return Ok(value);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(resource = %resource_name, error = %e, "Wait check failed");
                return Err(WaitError::Check {
                    resource: resource_name.to_string(),
                    error: e,
                });
            }
        }

        let elapsed = start.elapsed();
        if elapsed >= config.timeout {
            return Err(WaitError::Timeout {
                resource: resource_name.to_string(),
                timeout: config.timeout,
                attempts,
            });
        }

        // Never sleep past the deadline; the final check happens at the deadline.
        let delay = delays
            .next()
            .unwrap_or(config.max_delay)
            .min(config.timeout - elapsed);
        debug!(
            resource = %resource_name,
            attempt = attempts,
            delay_ms = delay.as_millis(),
            "Not ready, retrying"
        );

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = async {
                match cancel {
                    Some(token) => token.cancelled().await,
                    None => std::future::pending::<()>().await,
                }
            } => {
                return Err(WaitError::Cancelled {
                    resource: resource_name.to_string(),
                });
            }
        }
    }
}
