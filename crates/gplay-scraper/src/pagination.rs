//! Continuation-token pagination state machine.
//!
//! ```text
//! Start ──► Fetching ──► HasMore ──► Fetching ──► … ──► Exhausted
//!              │  ▲                     │  ▲
//!              │  └─ retry ─┘           │  └─ retry
//!              └──────────► Failed ◄────┘
//! ```
//!
//! The driver owns the token between pages and does no I/O itself: the
//! orchestrator asks it for the token to send, reports what came back and
//! follows its verdict. Records are never deduplicated here; overlapping
//! pages at the tail of a result set are passed through as sent.

use std::time::Duration;

use crate::error::ScraperError;
use crate::retry::{RetryDecision, RetryPolicy};
use crate::types::ContinuationToken;

/// Where a chain currently stands.
#[derive(Debug, PartialEq, Eq)]
pub enum ChainState {
    Start,
    /// A request is in flight. `token` is `None` for the first page;
    /// `attempt` counts failures of this same request.
    Fetching {
        token: Option<ContinuationToken>,
        attempt: u32,
    },
    HasMore {
        token: ContinuationToken,
    },
    /// No further pages will be requested. `truncated` is set when the
    /// limit cut the chain short of what the store had.
    Exhausted {
        truncated: bool,
    },
    Failed,
    Cancelled,
}

/// Verdict after a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorStep {
    /// Re-send the same request (same token) after the delay.
    Retry(Duration),
    /// The chain is over.
    Fail,
}

#[derive(Debug)]
pub struct PaginationDriver {
    context: String,
    state: ChainState,
    limit: Option<usize>,
    max_pages: usize,
    max_empty_pages: usize,
    collected: usize,
    pages: usize,
    empty_run: usize,
}

impl PaginationDriver {
    /// Consecutive empty pages that still carried a token before the chain
    /// is treated as exhausted.
    pub const DEFAULT_MAX_EMPTY_PAGES: usize = 3;

    /// `limit` of `None` or `Some(0)` takes everything the store returns.
    #[must_use]
    pub fn new(context: impl Into<String>, limit: Option<usize>, max_pages: usize) -> Self {
        Self {
            context: context.into(),
            state: ChainState::Start,
            limit: limit.filter(|l| *l > 0),
            max_pages,
            max_empty_pages: Self::DEFAULT_MAX_EMPTY_PAGES,
            collected: 0,
            pages: 0,
            empty_run: 0,
        }
    }

    #[must_use]
    pub fn with_max_empty_pages(mut self, max_empty_pages: usize) -> Self {
        self.max_empty_pages = max_empty_pages.max(1);
        self
    }

    #[must_use]
    pub fn state(&self) -> &ChainState {
        &self.state
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            ChainState::Exhausted { .. } | ChainState::Failed | ChainState::Cancelled
        )
    }

    /// Records accepted so far.
    #[must_use]
    pub fn collected(&self) -> usize {
        self.collected
    }

    /// Pages successfully accepted so far.
    #[must_use]
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Moves from `Start` or `HasMore` into `Fetching`, taking ownership of
    /// the pending token. Returns `Ok(false)` if the chain is already
    /// terminal and nothing should be fetched.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::PaginationLimit`] and fails the chain when
    /// another page would exceed `max_pages`.
    pub fn begin_fetch(&mut self) -> Result<bool, ScraperError> {
        let token = match std::mem::replace(&mut self.state, ChainState::Failed) {
            ChainState::Start => None,
            ChainState::HasMore { token } => Some(token),
            other @ ChainState::Fetching { .. } => {
                // Already in flight: keep waiting on the same request.
                self.state = other;
                return Ok(true);
            }
            terminal => {
                self.state = terminal;
                return Ok(false);
            }
        };
        if self.pages >= self.max_pages {
            tracing::warn!(
                context = %self.context,
                max_pages = self.max_pages,
                "pagination limit reached"
            );
            return Err(ScraperError::PaginationLimit {
                context: self.context.clone(),
                max_pages: self.max_pages,
            });
        }
        self.state = ChainState::Fetching { token, attempt: 0 };
        Ok(true)
    }

    /// Token for the request in flight; `None` on the first page.
    #[must_use]
    pub fn current_token(&self) -> Option<&ContinuationToken> {
        match &self.state {
            ChainState::Fetching { token, .. } => token.as_ref(),
            _ => None,
        }
    }

    /// Accepts a fetched page with `records` entries and the token it
    /// carried, and returns how many of those records to keep.
    ///
    /// The spent token is dropped here. When the limit is reached the
    /// returned count cuts the page so that exactly `limit` records are
    /// kept in total, and any remaining token is discarded.
    pub fn accept_page(&mut self, records: usize, next_token: Option<ContinuationToken>) -> usize {
        if !matches!(self.state, ChainState::Fetching { .. }) {
            return 0;
        }
        self.pages += 1;
        let keep = self
            .limit
            .map_or(records, |limit| records.min(limit.saturating_sub(self.collected)));
        self.collected += keep;

        self.state = match (self.limit, next_token) {
            (Some(limit), token) if self.collected >= limit => ChainState::Exhausted {
                truncated: token.is_some() || keep < records,
            },
            (_, None) => ChainState::Exhausted { truncated: false },
            (_, Some(token)) if records == 0 => {
                self.empty_run += 1;
                if self.empty_run >= self.max_empty_pages {
                    tracing::warn!(
                        context = %self.context,
                        empty_pages = self.empty_run,
                        "token kept coming back with empty pages; stopping"
                    );
                    ChainState::Exhausted { truncated: false }
                } else {
                    ChainState::HasMore { token }
                }
            }
            (_, Some(token)) => {
                self.empty_run = 0;
                ChainState::HasMore { token }
            }
        };
        keep
    }

    /// Records a failed attempt of the request in flight and asks `policy`
    /// whether to re-send it.
    pub fn on_error(&mut self, err: &ScraperError, policy: &dyn RetryPolicy) -> ErrorStep {
        let ChainState::Fetching { attempt, .. } = &mut self.state else {
            if !self.is_terminal() {
                self.state = ChainState::Failed;
            }
            return ErrorStep::Fail;
        };
        *attempt += 1;
        let attempt = *attempt;
        match policy.decide(err, attempt) {
            RetryDecision::Retry(delay) => {
                tracing::warn!(
                    context = %self.context,
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "page fetch failed; retrying after backoff"
                );
                ErrorStep::Retry(delay)
            }
            RetryDecision::Abort => {
                tracing::warn!(
                    context = %self.context,
                    attempt,
                    pages = self.pages,
                    error = %err,
                    "page fetch failed; giving up on chain"
                );
                self.state = ChainState::Failed;
                ErrorStep::Fail
            }
        }
    }

    /// Stops the chain where it is. Any pending token is dropped.
    pub fn cancel(&mut self) {
        if !self.is_terminal() {
            self.state = ChainState::Cancelled;
        }
    }
}

#[cfg(test)]
#[path = "pagination_test.rs"]
mod tests;
