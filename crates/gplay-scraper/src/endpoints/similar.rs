use serde_json::Value;

use crate::error::ScraperError;
use crate::locator::{Page, Selector};
use crate::mapper::tables::similar;
use crate::mapper::{walk, Strictness};
use crate::request::{PlayRequest, RequestContext};
use crate::types::{ContinuationToken, SimilarApp};

use super::details::DETAILS_PATH;
use super::{cluster, list_page, require_app_id, ListEndpoint, ParsedPage};

/// Apps the store lists as related to one app, read from the cluster on its
/// details page and continued through cluster pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarAppsEndpoint {
    pub app_id: String,
}

impl SimilarAppsEndpoint {
    #[must_use]
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
        }
    }
}

impl ListEndpoint for SimilarAppsEndpoint {
    type Item = SimilarApp;

    fn context(&self) -> String {
        format!("similar {}", self.app_id)
    }

    fn first_request(&self, ctx: &RequestContext) -> Result<PlayRequest, ScraperError> {
        require_app_id(&self.app_id)?;
        ctx.page(DETAILS_PATH, &[("id", &self.app_id)])
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
    ) -> Result<ParsedPage<SimilarApp>, ScraperError> {
        if !first {
            return cluster::parse_page(page, &similar::TABLE, strictness);
        }
        let blob = page.select(&Selector::CallbackIslands, &similar::SHAPE)?;
        let cluster = walk(&blob, similar::CLUSTERS)
            .and_then(Value::as_array)
            .and_then(|clusters| {
                clusters.iter().find(|c| {
                    walk(c, similar::CLUSTER_ITEMS)
                        .and_then(Value::as_array)
                        .is_some_and(|items| !items.is_empty())
                })
            });
        match cluster {
            Some(cluster) => list_page(
                cluster,
                similar::CLUSTER_ITEMS,
                similar::CLUSTER_TOKEN,
                &similar::TABLE,
                strictness,
            ),
            None => Ok(ParsedPage::empty()),
        }
    }
}
