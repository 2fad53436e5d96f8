use serde_json::Value;

use crate::error::ScraperError;
use crate::locator::{Page, Selector};
use crate::mapper::tables::search;
use crate::mapper::{walk, Strictness};
use crate::request::{PlayRequest, RequestContext};
use crate::types::{ContinuationToken, SearchResult};

use super::{cluster, list_page, ListEndpoint, ParsedPage};

const SEARCH_PATH: &str = "/store/search";

/// Apps matching a free-text query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEndpoint {
    pub query: String,
}

impl SearchEndpoint {
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

impl ListEndpoint for SearchEndpoint {
    type Item = SearchResult;

    fn context(&self) -> String {
        format!("search {:?}", self.query)
    }

    fn first_request(&self, ctx: &RequestContext) -> Result<PlayRequest, ScraperError> {
        if self.query.trim().is_empty() {
            return Err(ScraperError::InvalidRequest {
                reason: "search query must not be empty".to_owned(),
            });
        }
        ctx.page(SEARCH_PATH, &[("q", &self.query), ("c", "apps")])
    }

    fn next_request(
        &self,
        ctx: &RequestContext,
        token: &ContinuationToken,
    ) -> Result<PlayRequest, ScraperError> {
        cluster::next_request(ctx, token)
    }

    fn parse_page(
        &self,
        page: &Page<'_>,
        first: bool,
        strictness: Strictness,
    ) -> Result<ParsedPage<SearchResult>, ScraperError> {
        if !first {
            return cluster::parse_page(page, &search::TABLE, strictness);
        }
        let blob = page.select(&Selector::CallbackIslands, &search::SHAPE)?;
        // The result list is whichever section actually carries items; a
        // query with no hits has none and ends the chain.
        let section = walk(&blob, search::SECTIONS)
            .and_then(Value::as_array)
            .and_then(|sections| {
                sections.iter().find(|s| {
                    walk(s, search::SECTION_ITEMS)
                        .and_then(Value::as_array)
                        .is_some_and(|items| !items.is_empty())
                })
            });
        match section {
            Some(section) => list_page(
                section,
                search::SECTION_ITEMS,
                search::SECTION_TOKEN,
                &search::TABLE,
                strictness,
            ),
            None => Ok(ParsedPage::empty()),
        }
    }
}
