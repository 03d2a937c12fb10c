//! Exponential-backoff connection logic for the startup database pool.
//!
//! Transient failures (database still booting, network blips) are retried
//! with increasing delays until the pool connects, the attempt budget runs
//! out, or the [`CancellationToken`] fires. Configuration errors such as a
//! malformed URL fail immediately.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{create_pool, DbPool};

/// Tunable parameters for the exponential-backoff strategy.
#[derive(Debug, Clone)]
pub struct ConnectRetryConfig {
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Upper bound on the delay between attempts.
    pub max_delay: Duration,
    /// Factor by which the delay grows after each failure.
    pub multiplier: f64,
    /// Total number of attempts, including the first.
    pub max_attempts: u32,
}

impl Default for ConnectRetryConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            max_attempts: 8,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Database connection cancelled")]
    Cancelled,

    #[error("Database connection failed after {attempts} attempt(s): {source}")]
    Failed {
        attempts: u32,
        #[source]
        source: sqlx::Error,
    },
}

/// Calculate the next backoff delay from the current delay and config.
///
/// The result is clamped to [`ConnectRetryConfig::max_delay`].
pub fn next_delay(current: Duration, config: &ConnectRetryConfig) -> Duration {
    let next_ms = (current.as_millis() as f64 * config.multiplier) as u64;
    Duration::from_millis(next_ms).min(config.max_delay)
}

/// Whether a connection error is worth retrying.
pub fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        // Class 57: operator intervention (e.g. 57P03 cannot_connect_now).
        sqlx::Error::Database(db_err) => db_err
            .code()
            .is_some_and(|code| code.starts_with("57")),
        _ => false,
    }
}

/// Connect to the database, retrying transient failures with backoff.
pub async fn connect_with_retry(
    database_url: &str,
    max_connections: u32,
    config: &ConnectRetryConfig,
    cancel: &CancellationToken,
) -> Result<DbPool, ConnectError> {
    let mut delay = config.initial_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ConnectError::Cancelled),
            result = create_pool(database_url, max_connections) => result,
        };

        let err = match result {
            Ok(pool) => {
                if attempt > 1 {
                    tracing::info!(attempt, "Connected to database after retry");
                }
                return Ok(pool);
            }
            Err(err) => err,
        };

        if !is_transient(&err) || attempt >= config.max_attempts {
            return Err(ConnectError::Failed {
                attempts: attempt,
                source: err,
            });
        }

        tracing::warn!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Database connection attempt failed, retrying",
        );

        tokio::select! {
            _ = cancel.cancelled() => return Err(ConnectError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }

        delay = next_delay(delay, config);
    }
}
