//! Retry policies for page fetches.
//!
//! A policy only decides; the orchestrator does the sleeping so that the
//! wait can be cut short by cancellation. Errors that are not transient
//! ([`ScraperError::is_transient`]) are never retried by the policies here:
//! a 404, a page that does not match its shape or a record missing a
//! required field will not change on a second attempt.

use std::time::Duration;

use crate::error::{ScraperError, TransportError};

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Re-issue the same request after the delay.
    Retry(Duration),
    Abort,
}

pub trait RetryPolicy: Send + Sync {
    /// `attempt` is the number of failed attempts so far, starting at 1.
    fn decide(&self, err: &ScraperError, attempt: u32) -> RetryDecision;
}

/// Never retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl RetryPolicy for NoRetry {
    fn decide(&self, _err: &ScraperError, _attempt: u32) -> RetryDecision {
        RetryDecision::Abort
    }
}

/// `base_ms × 2^(attempt-1)`, capped at `max_delay_ms`, with ±25 % jitter.
///
/// | Attempt | Delay with `base_ms = 500` |
/// |---------|----------------------------|
/// | 1       | 500 ms ± 25 %              |
/// | 2       | 1 000 ms ± 25 %            |
/// | 3       | 2 000 ms ± 25 %            |
///
/// A 429 carrying `Retry-After` waits at least that long (still capped).
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    pub max_retries: u32,
    pub base_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: bool,
}

impl ExponentialBackoff {
    pub const DEFAULT_MAX_DELAY_MS: u64 = 60_000;

    #[must_use]
    pub fn new(max_retries: u32, base_ms: u64) -> Self {
        Self {
            max_retries,
            base_ms,
            max_delay_ms: Self::DEFAULT_MAX_DELAY_MS,
            jitter: true,
        }
    }

    /// Same schedule without randomness.
    #[must_use]
    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    fn delay_ms(&self, err: &ScraperError, attempt: u32) -> u64 {
        let exponent = attempt.saturating_sub(1).min(20);
        let computed = self.base_ms.saturating_mul(1u64 << exponent);
        let capped = computed.min(self.max_delay_ms);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let jittered = if self.jitter {
            (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64
        } else {
            capped
        };
        match err {
            ScraperError::Transport(TransportError::RateLimited {
                retry_after_secs: Some(secs),
                ..
            }) => jittered
                .max(secs.saturating_mul(1_000))
                .min(self.max_delay_ms),
            _ => jittered,
        }
    }
}

impl RetryPolicy for ExponentialBackoff {
    fn decide(&self, err: &ScraperError, attempt: u32) -> RetryDecision {
        if !err.is_transient() || attempt > self.max_retries {
            return RetryDecision::Abort;
        }
        RetryDecision::Retry(Duration::from_millis(self.delay_ms(err, attempt)))
    }
}
