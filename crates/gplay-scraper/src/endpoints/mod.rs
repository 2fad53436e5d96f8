//! Per-endpoint request building and page parsing.
//!
//! An endpoint knows which request to send, which [`Selector`] and
//! [`crate::locator::Shape`] find its blob, and which field tables map it.
//! It never performs I/O; the orchestrator in [`crate::client`] feeds it
//! bodies.

mod cluster;
mod data_safety;
mod details;
mod permissions;
mod reviews;
mod search;
mod similar;

use serde_json::Value;

use crate::error::ScraperError;
use crate::locator::Page;
use crate::mapper::{walk, FieldPath, FieldTable, MappedItems, Record, Strictness};
use crate::request::{PlayRequest, RequestContext};
use crate::types::{ContinuationToken, SkippedRecord};

pub use data_safety::DataSafetyEndpoint;
pub use details::AppDetailsEndpoint;
pub use permissions::PermissionsEndpoint;
pub use reviews::{ReviewSort, ReviewsEndpoint};
pub use search::SearchEndpoint;
pub use similar::SimilarAppsEndpoint;

/// Records and token read from one page of a list endpoint.
#[derive(Debug)]
pub struct ParsedPage<T> {
    pub records: Vec<T>,
    pub next_token: Option<ContinuationToken>,
    pub skipped: Vec<SkippedRecord>,
}

impl<T> ParsedPage<T> {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            next_token: None,
            skipped: Vec::new(),
        }
    }
}

/// A single-entity result plus any sub-records dropped while mapping it.
#[derive(Debug)]
pub struct Parsed<T> {
    pub value: T,
    pub skipped: Vec<SkippedRecord>,
}

/// An endpoint whose results come in token-linked pages.
pub trait ListEndpoint: Send + Sync {
    type Item: Send;

    /// Human-readable label for logs and errors, e.g. `search "maps"`.
    fn context(&self) -> String;

    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidRequest`] for bad parameters.
    fn first_request(&self, ctx: &RequestContext) -> Result<PlayRequest, ScraperError>;

    /// The request for the page behind `token`. The token is placed in the
    /// request as-is.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidRequest`] for bad parameters.
    fn next_request(
        &self,
        ctx: &RequestContext,
        token: &ContinuationToken,
    ) -> Result<PlayRequest, ScraperError>;

    /// Parses one page. `first` tells the initial page apart from
    /// continuation pages, which often use a different response format.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::MalformedPage`] when the page has no usable
    /// blob, or [`ScraperError::IncompleteRecord`] under
    /// [`Strictness::Abort`].
    fn parse_page(
        &self,
        page: &Page<'_>,
        first: bool,
        strictness: Strictness,
    ) -> Result<ParsedPage<Self::Item>, ScraperError>;
}

/// An endpoint answered by exactly one request.
pub trait EntityEndpoint: Send + Sync {
    type Output: Send;

    fn context(&self) -> String;

    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidRequest`] for bad parameters.
    fn request(&self, ctx: &RequestContext) -> Result<PlayRequest, ScraperError>;

    /// # Errors
    ///
    /// Returns [`ScraperError::MalformedPage`] or
    /// [`ScraperError::IncompleteRecord`].
    fn parse(
        &self,
        request: &PlayRequest,
        page: &Page<'_>,
        strictness: Strictness,
    ) -> Result<Parsed<Self::Output>, ScraperError>;
}

/// Reads a continuation token at `path`; blank or non-string reads as none.
pub(crate) fn token_at(blob: &Value, path: FieldPath) -> Option<ContinuationToken> {
    walk(blob, path)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(ContinuationToken::new)
}

/// Maps the item array at `items` and reads the token at `token`.
pub(crate) fn list_page<R: Record>(
    blob: &Value,
    items: FieldPath,
    token: FieldPath,
    table: &FieldTable,
    strictness: Strictness,
) -> Result<ParsedPage<R>, ScraperError> {
    let MappedItems { records, skipped } =
        crate::mapper::map_items(walk(blob, items), table, strictness)?;
    Ok(ParsedPage {
        records,
        next_token: token_at(blob, token),
        skipped,
    })
}

pub(crate) fn require_app_id(app_id: &str) -> Result<(), ScraperError> {
    if app_id.trim().is_empty() {
        return Err(ScraperError::InvalidRequest {
            reason: "app id must not be empty".to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "endpoints_test.rs"]
mod tests;
