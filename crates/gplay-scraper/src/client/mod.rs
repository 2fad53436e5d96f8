//! Extraction orchestrator.
//!
//! [`PlayClient`] wires a [`Transport`], a [`RetryPolicy`] and the
//! endpoints together: it sends the request, runs the body through the
//! locator and mapper, and for list endpoints loops under a
//! [`crate::pagination::PaginationDriver`] until the chain ends.

mod chain;
mod many;

use std::sync::Arc;
use std::time::Duration;

use gplay_core::AppConfig;

use crate::endpoints::{
    AppDetailsEndpoint, DataSafetyEndpoint, Parsed, PermissionsEndpoint, ReviewsEndpoint,
    SearchEndpoint, SimilarAppsEndpoint,
};
use crate::error::ScraperError;
use crate::mapper::Strictness;
use crate::pagination::PaginationDriver;
use crate::request::RequestContext;
use crate::retry::{ExponentialBackoff, RetryPolicy};
use crate::transport::{HttpTransport, Transport};
use crate::types::{AppDetails, DataSafety, Permission, Review, SearchResult, SimilarApp};

pub use chain::{ChainOutcome, Extraction};

/// Maximum number of pages per chain before [`ScraperError::PaginationLimit`].
pub const DEFAULT_MAX_PAGES: usize = 200;

/// Knobs for every chain run by a client.
#[derive(Debug, Clone, Copy)]
pub struct ChainOptions {
    pub max_pages: usize,
    pub max_empty_pages: usize,
    /// Pause between consecutive pages of one chain. Not applied before the
    /// first page or before retries (those use the retry delay).
    pub inter_request_delay: Duration,
    pub strictness: Strictness,
    /// Suggested `budget` for [`PlayClient::extract_many`].
    pub max_concurrent_chains: usize,
}

impl Default for ChainOptions {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            max_empty_pages: PaginationDriver::DEFAULT_MAX_EMPTY_PAGES,
            inter_request_delay: Duration::ZERO,
            strictness: Strictness::Skip,
            max_concurrent_chains: 4,
        }
    }
}

impl ChainOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            inter_request_delay: Duration::from_millis(config.inter_request_delay_ms),
            strictness: if config.strict_records {
                Strictness::Abort
            } else {
                Strictness::Skip
            },
            max_concurrent_chains: config.max_concurrent_chains,
            ..Self::default()
        }
    }
}

pub struct PlayClient<T: Transport = HttpTransport> {
    transport: T,
    context: RequestContext,
    retry: Arc<dyn RetryPolicy>,
    options: ChainOptions,
}

impl PlayClient<HttpTransport> {
    /// Builds an HTTP-backed client with timeout, user agent, locale, retry
    /// schedule and chain limits taken from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Transport`] if the HTTP client cannot be
    /// constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::new(transport, RequestContext::from_config(config))
            .with_retry_policy(ExponentialBackoff::new(
                config.max_retries,
                config.retry_backoff_base_ms,
            ))
            .with_options(ChainOptions::from_config(config)))
    }
}

impl<T: Transport> PlayClient<T> {
    /// A client with default options and three jittered retries from 500 ms.
    #[must_use]
    pub fn new(transport: T, context: RequestContext) -> Self {
        Self {
            transport,
            context,
            retry: Arc::new(ExponentialBackoff::new(3, 500)),
            options: ChainOptions::default(),
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, policy: impl RetryPolicy + 'static) -> Self {
        self.retry = Arc::new(policy);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: ChainOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    #[must_use]
    pub fn options(&self) -> &ChainOptions {
        &self.options
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// # Errors
    ///
    /// Any [`ScraperError`] from the single fetch.
    pub async fn app_details(&self, app_id: &str) -> Result<AppDetails, ScraperError> {
        self.fetch_entity(&self.context, &AppDetailsEndpoint::new(app_id), &never())
            .await
            .map(|parsed| parsed.value)
    }

    /// # Errors
    ///
    /// Returns an error only if the first page fails; later failures are
    /// reported in [`Extraction::outcome`].
    pub async fn search(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Extraction<SearchResult>, ScraperError> {
        self.extract(&self.context, &SearchEndpoint::new(query), limit, &never())
            .await
    }

    /// # Errors
    ///
    /// Returns an error only if the first page fails.
    pub async fn reviews(
        &self,
        endpoint: &ReviewsEndpoint,
        limit: Option<usize>,
    ) -> Result<Extraction<Review>, ScraperError> {
        self.extract(&self.context, endpoint, limit, &never()).await
    }

    /// Permissions plus any unnamed groups that were skipped.
    ///
    /// # Errors
    ///
    /// Any [`ScraperError`] from the single fetch.
    pub async fn permissions(
        &self,
        app_id: &str,
    ) -> Result<Parsed<Vec<Permission>>, ScraperError> {
        self.fetch_entity(&self.context, &PermissionsEndpoint::new(app_id), &never())
            .await
    }

    /// # Errors
    ///
    /// Any [`ScraperError`] from the single fetch.
    pub async fn data_safety(&self, app_id: &str) -> Result<Parsed<DataSafety>, ScraperError> {
        self.fetch_entity(&self.context, &DataSafetyEndpoint::new(app_id), &never())
            .await
    }

    /// # Errors
    ///
    /// Returns an error only if the first page fails.
    pub async fn similar_apps(
        &self,
        app_id: &str,
        limit: Option<usize>,
    ) -> Result<Extraction<SimilarApp>, ScraperError> {
        self.extract(&self.context, &SimilarAppsEndpoint::new(app_id), limit, &never())
            .await
    }
}

/// A token nobody cancels, for the convenience methods.
fn never() -> tokio_util::sync::CancellationToken {
    tokio_util::sync::CancellationToken::new()
}
