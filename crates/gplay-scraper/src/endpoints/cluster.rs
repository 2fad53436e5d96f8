//! Continuation pages shared by app clusters (search results, similar apps).

use serde_json::{json, Value};

use crate::error::ScraperError;
use crate::locator::Page;
use crate::mapper::tables::cluster;
use crate::mapper::{FieldTable, Record, Strictness};
use crate::request::{PlayRequest, RequestContext};
use crate::types::ContinuationToken;

use super::{list_page, ParsedPage};

/// `[[null, [[10, [10, 50]], true, null, [mask…]], null, "<token>"]]`
pub(crate) fn next_request(
    ctx: &RequestContext,
    token: &ContinuationToken,
) -> Result<PlayRequest, ScraperError> {
    let (outer, lo, hi) = cluster::PAGE_GEOMETRY;
    let inner = json!([[
        Value::Null,
        [[outer, [lo, hi]], true, Value::Null, [cluster::FIELD_MASK]],
        Value::Null,
        token.as_str()
    ]]);
    ctx.batch(cluster::RPC_ID, &inner, "generic")
}

pub(crate) fn parse_page<R: Record>(
    page: &Page<'_>,
    table: &FieldTable,
    strictness: Strictness,
) -> Result<ParsedPage<R>, ScraperError> {
    let Some(blob) = page.select_frames(cluster::RPC_ID, &cluster::SHAPE)? else {
        return Ok(ParsedPage::empty());
    };
    list_page(&blob, cluster::ITEMS, cluster::TOKEN, table, strictness)
}
