use serde_json::{json, Value};

use crate::error::ScraperError;
use crate::locator::Page;
use crate::mapper::tables::reviews;
use crate::mapper::Strictness;
use crate::request::{PlayRequest, RequestContext};
use crate::types::{ContinuationToken, Review};

use super::{list_page, require_app_id, ListEndpoint, ParsedPage};

/// Review ordering understood by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewSort {
    MostRelevant,
    #[default]
    Newest,
    Rating,
}

impl ReviewSort {
    fn code(self) -> u8 {
        match self {
            Self::MostRelevant => 1,
            Self::Newest => 2,
            Self::Rating => 3,
        }
    }
}

/// User reviews of one app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewsEndpoint {
    pub app_id: String,
    pub sort: ReviewSort,
    /// Reviews requested per page, `1..=MAX_PAGE_SIZE`.
    pub page_size: u16,
    /// Only reviews with this star rating (1–5).
    pub filter_score: Option<u8>,
}

impl ReviewsEndpoint {
    pub const DEFAULT_PAGE_SIZE: u16 = 150;
    pub const MAX_PAGE_SIZE: u16 = 199;

    #[must_use]
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            sort: ReviewSort::default(),
            page_size: Self::DEFAULT_PAGE_SIZE,
            filter_score: None,
        }
    }

    #[must_use]
    pub fn sort(mut self, sort: ReviewSort) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub fn page_size(mut self, page_size: u16) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn filter_score(mut self, score: Option<u8>) -> Self {
        self.filter_score = score;
        self
    }

    fn validate(&self) -> Result<(), ScraperError> {
        require_app_id(&self.app_id)?;
        if !(1..=Self::MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(ScraperError::InvalidRequest {
                reason: format!(
                    "review page size must be between 1 and {}, got {}",
                    Self::MAX_PAGE_SIZE,
                    self.page_size
                ),
            });
        }
        if let Some(score) = self.filter_score {
            if !(1..=5).contains(&score) {
                return Err(ScraperError::InvalidRequest {
                    reason: format!("review score filter must be 1-5, got {score}"),
                });
            }
        }
        Ok(())
    }

    /// `[null, null, [2, sort, [size, null, token], null, [null, score]], [app_id, 7]]`
    fn request(
        &self,
        ctx: &RequestContext,
        token: Option<&ContinuationToken>,
    ) -> Result<PlayRequest, ScraperError> {
        self.validate()?;
        let token = token.map_or(Value::Null, |t| Value::from(t.as_str()));
        let filter = self
            .filter_score
            .map_or_else(|| json!([]), |score| json!([Value::Null, score]));
        let inner = json!([
            Value::Null,
            Value::Null,
            [2, self.sort.code(), [self.page_size, Value::Null, token], Value::Null, filter],
            [self.app_id, 7]
        ]);
        ctx.batch(reviews::RPC_ID, &inner, "generic")
    }
}

impl ListEndpoint for ReviewsEndpoint {
    type Item = Review;

    fn context(&self) -> String {
        format!("reviews {}", self.app_id)
    }

    fn first_request(&self, ctx: &RequestContext) -> Result<PlayRequest, ScraperError> {
        self.request(ctx, None)
    }

    fn next_request(
        &self,
        ctx: &RequestContext,
        token: &ContinuationToken,
    ) -> Result<PlayRequest, ScraperError> {
        self.request(ctx, Some(token))
    }

    fn parse_page(
        &self,
        page: &Page<'_>,
        _first: bool,
        strictness: Strictness,
    ) -> Result<ParsedPage<Review>, ScraperError> {
        let Some(blob) = page.select_frames(reviews::RPC_ID, &reviews::SHAPE)? else {
            return Ok(ParsedPage::empty());
        };
        list_page(
            &blob,
            reviews::ITEMS,
            reviews::TOKEN,
            &reviews::TABLE,
            strictness,
        )
    }
}
