// crates/dummy-forge-server/src/retry.rs
// ============================================================================
// Module: Retry Policy
// Description: Bounded exponential backoff for backend calls.
// Purpose: Retry transient provider failures a fixed number of times.
// Dependencies: dummy-forge-config, dummy-forge-providers, tokio
// ============================================================================

//! ## Overview
//! A [`RetryPolicy`] is a plain value injected into the orchestrator. Only
//! [`BackendError::Transient`] failures are retried. Delays double from
//! `initial_backoff` and are capped at `max_backoff`.

use std::future::Future;
use std::time::Duration;

use dummy_forge_config::GenerationConfig;
use dummy_forge_config::MAX_RETRIES_LIMIT;
use dummy_forge_providers::BackendError;

/// Retry policy for backend calls.
///
/// # Invariants
/// - `max_retries <= MAX_RETRIES_LIMIT`; attempts never exceed
///   `1 + max_retries`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    max_retries: u32,
    /// Delay before the first retry.
    initial_backoff: Duration,
    /// Upper bound for any delay.
    max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAX_RETRIES_LIMIT, Duration::from_millis(250), Duration::from_secs(2))
    }
}

impl RetryPolicy {
    /// Creates a policy; `max_retries` is capped at [`MAX_RETRIES_LIMIT`].
    #[must_use]
    pub fn new(max_retries: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_retries: max_retries.min(MAX_RETRIES_LIMIT),
            initial_backoff,
            max_backoff,
        }
    }

    /// Builds a policy from generation settings.
    #[must_use]
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.initial_backoff_ms),
            Duration::from_millis(config.max_backoff_ms),
        )
    }

    /// Policy that never retries.
    #[must_use]
    pub fn no_retries() -> Self {
        Self::new(0, Duration::ZERO, Duration::ZERO)
    }

    /// Returns the retry budget.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the maximum number of attempts.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Returns the delay before retry number `retry` (zero-based).
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2_u32.saturating_pow(retry);
        self.initial_backoff.saturating_mul(factor).min(self.max_backoff)
    }

    /// Runs `operation` until it succeeds, fails permanently, or the budget
    /// is spent. Returns the final result and the number of attempts made.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> (Result<T, BackendError>, u32)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match operation().await {
                Err(err) if err.is_transient() && attempts <= self.max_retries => {
                    let delay = self.delay_for(attempts - 1);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                result => return (result, attempts),
            }
        }
    }
}
