use tokio_util::sync::CancellationToken;

use crate::endpoints::{EntityEndpoint, ListEndpoint, Parsed, ParsedPage};
use crate::error::ScraperError;
use crate::locator::Page;
use crate::pagination::{ChainState, ErrorStep, PaginationDriver};
use crate::request::{PlayRequest, RequestContext};
use crate::retry::RetryDecision;
use crate::transport::Transport;
use crate::types::{ContinuationToken, PageResult, SkippedRecord};

use super::PlayClient;

/// How a chain ended.
#[derive(Debug)]
pub enum ChainOutcome {
    /// The store ran out of pages, or the limit was reached (`truncated`).
    Exhausted { truncated: bool },
    /// A page after the first failed for good; earlier records are kept.
    Failed(ScraperError),
    /// Stopped by the caller; records gathered so far are kept.
    Cancelled,
}

/// Everything a chain produced.
#[derive(Debug)]
pub struct Extraction<T> {
    /// In store order, across pages, with no deduplication.
    pub records: Vec<T>,
    pub outcome: ChainOutcome,
    /// List elements dropped for missing required fields.
    pub skipped: Vec<SkippedRecord>,
    /// Pages successfully fetched and parsed.
    pub pages: usize,
}

impl<T> Extraction<T> {
    /// `true` when the chain ran to its natural end or to the limit.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.outcome, ChainOutcome::Exhausted { .. })
    }
}

impl<T: Transport> PlayClient<T> {
    /// Runs one list chain to completion.
    ///
    /// `limit` of `None` or `Some(0)` takes everything. Pages are strictly
    /// sequential; each token feeds exactly one follow-up request (retries
    /// of that request aside).
    ///
    /// # Errors
    ///
    /// Returns the error if the *first* page cannot be fetched and parsed.
    /// Once a page has succeeded, later failures are returned as
    /// `Ok` with [`ChainOutcome::Failed`]. Cancellation is never an error
    /// here: it yields [`ChainOutcome::Cancelled`].
    pub async fn extract<E: ListEndpoint>(
        &self,
        ctx: &RequestContext,
        endpoint: &E,
        limit: Option<usize>,
        cancel: &CancellationToken,
    ) -> Result<Extraction<E::Item>, ScraperError> {
        let context = endpoint.context();
        let mut driver = PaginationDriver::new(context.clone(), limit, self.options.max_pages)
            .with_max_empty_pages(self.options.max_empty_pages);
        let mut records = Vec::new();
        let mut skipped = Vec::new();
        let mut failure = None;
        let mut pause_before_fetch = false;

        tracing::info!(context = %context, limit = ?limit, "starting extraction chain");

        loop {
            match driver.begin_fetch() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }

            if pause_before_fetch && !self.options.inter_request_delay.is_zero() {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        driver.cancel();
                        break;
                    }
                    () = tokio::time::sleep(self.options.inter_request_delay) => {}
                }
            }
            pause_before_fetch = false;

            let first = driver.current_token().is_none();
            let request = match driver.current_token() {
                None => endpoint.first_request(ctx),
                Some(token) => endpoint.next_request(ctx, token),
            };
            let request = match request {
                Ok(request) => request,
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            };

            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    driver.cancel();
                    break;
                }
                result = self.fetch_parsed(endpoint, &request, first, &context) => result,
            };

            match result {
                Ok(ParsedPage {
                    records: mut page_records,
                    next_token,
                    skipped: page_skipped,
                }) => {
                    let page_index = driver.pages();
                    let received = page_records.len();
                    let keep = driver.accept_page(received, next_token);
                    let page_skipped = if keep < received {
                        before_cut(page_skipped, keep)
                    } else {
                        page_skipped
                    };
                    page_records.truncate(keep);
                    records.append(&mut page_records);
                    skipped.extend(page_skipped.into_iter().map(|mut s| {
                        s.page = page_index;
                        s
                    }));
                    tracing::debug!(
                        context = %context,
                        page = page_index,
                        received,
                        kept = keep,
                        total = records.len(),
                        "page accepted"
                    );
                    pause_before_fetch = true;
                }
                Err(err) => match driver.on_error(&err, self.retry.as_ref()) {
                    ErrorStep::Retry(delay) => {
                        tokio::select! {
                            biased;
                            () = cancel.cancelled() => {
                                driver.cancel();
                                break;
                            }
                            () = tokio::time::sleep(delay) => {}
                        }
                    }
                    ErrorStep::Fail => {
                        failure = Some(err);
                        break;
                    }
                },
            }
        }

        let pages = driver.pages();
        let outcome = match (driver.state(), failure) {
            (ChainState::Cancelled, _) => ChainOutcome::Cancelled,
            (_, Some(err)) if pages == 0 => return Err(err),
            (_, Some(err)) => ChainOutcome::Failed(err),
            (ChainState::Exhausted { truncated }, None) => ChainOutcome::Exhausted {
                truncated: *truncated,
            },
            (_, None) => ChainOutcome::Exhausted { truncated: false },
        };

        tracing::info!(
            context = %context,
            records = records.len(),
            pages,
            skipped = skipped.len(),
            outcome = ?outcome,
            "extraction chain finished"
        );

        Ok(Extraction {
            records,
            outcome,
            skipped,
            pages,
        })
    }

    /// Fetches a single page by hand. `None` requests the first page.
    ///
    /// The token is consumed: the returned [`PageResult::next_token`] is
    /// the only way to continue. Transient failures are retried per the
    /// client's policy.
    ///
    /// # Errors
    ///
    /// Any [`ScraperError`] left after retries, or
    /// [`ScraperError::Cancelled`] if `cancel` fires first.
    pub async fn fetch_page<E: ListEndpoint>(
        &self,
        ctx: &RequestContext,
        endpoint: &E,
        token: Option<ContinuationToken>,
        cancel: &CancellationToken,
    ) -> Result<PageResult<E::Item>, ScraperError> {
        let context = endpoint.context();
        let first = token.is_none();
        let request = match token {
            None => endpoint.first_request(ctx)?,
            Some(token) => endpoint.next_request(ctx, &token)?,
        };
        let mut attempt = 0u32;
        loop {
            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(ScraperError::Cancelled),
                result = self.fetch_parsed(endpoint, &request, first, &context) => result,
            };
            let err = match result {
                Ok(page) => {
                    return Ok(PageResult {
                        has_more: page.next_token.is_some(),
                        records: page.records,
                        next_token: page.next_token,
                    })
                }
                Err(err) => err,
            };
            attempt += 1;
            match self.retry.decide(&err, attempt) {
                RetryDecision::Retry(delay) => {
                    tracing::warn!(
                        context = %context,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "page fetch failed; retrying after backoff"
                    );
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(ScraperError::Cancelled),
                        () = tokio::time::sleep(delay) => {}
                    }
                }
                RetryDecision::Abort => return Err(err),
            }
        }
    }

    /// Fetches and parses a single-entity endpoint, retrying transient
    /// failures.
    ///
    /// Sub-records dropped while mapping (an unnamed permission group, a
    /// data-safety entry without a type) come back in [`Parsed::skipped`].
    ///
    /// # Errors
    ///
    /// Any [`ScraperError`] left after retries, or
    /// [`ScraperError::Cancelled`] if `cancel` fires first.
    pub async fn fetch_entity<E: EntityEndpoint>(
        &self,
        ctx: &RequestContext,
        endpoint: &E,
        cancel: &CancellationToken,
    ) -> Result<Parsed<E::Output>, ScraperError> {
        let context = endpoint.context();
        let request = endpoint.request(ctx)?;
        let mut attempt = 0u32;
        loop {
            let result = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(ScraperError::Cancelled),
                body = self.transport.send(&request) => body,
            };
            let result = result.map_err(ScraperError::from).and_then(|body| {
                let page = Page::new(&body, &context);
                endpoint.parse(&request, &page, self.options.strictness)
            });
            let err = match result {
                Ok(parsed) => {
                    if !parsed.skipped.is_empty() {
                        tracing::warn!(
                            context = %context,
                            skipped = parsed.skipped.len(),
                            "entity mapped with skipped sub-records"
                        );
                    }
                    return Ok(parsed);
                }
                Err(err) => err,
            };
            attempt += 1;
            match self.retry.decide(&err, attempt) {
                RetryDecision::Retry(delay) => {
                    tracing::warn!(
                        context = %context,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "fetch failed; retrying after backoff"
                    );
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(ScraperError::Cancelled),
                        () = tokio::time::sleep(delay) => {}
                    }
                }
                RetryDecision::Abort => return Err(err),
            }
        }
    }

    async fn fetch_parsed<E: ListEndpoint>(
        &self,
        endpoint: &E,
        request: &PlayRequest,
        first: bool,
        context: &str,
    ) -> Result<ParsedPage<E::Item>, ScraperError> {
        let body = self.transport.send(request).await?;
        let page = Page::new(&body, context);
        endpoint.parse_page(&page, first, self.options.strictness)
    }
}

/// Keeps the skipped elements that sat before the first record cut by the
/// limit. `skipped` is in element order and `keep` counts mapped records.
fn before_cut(skipped: Vec<SkippedRecord>, keep: usize) -> Vec<SkippedRecord> {
    skipped
        .into_iter()
        .enumerate()
        .filter(|(earlier, s)| s.index.saturating_sub(*earlier) < keep)
        .map(|(_, s)| s)
        .collect()
}
