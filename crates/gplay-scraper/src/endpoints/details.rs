use crate::error::ScraperError;
use crate::locator::{Page, Selector};
use crate::mapper::tables::details;
use crate::mapper::{map_record, Strictness};
use crate::request::{PlayRequest, RequestContext};
use crate::types::AppDetails;

use super::{require_app_id, EntityEndpoint, Parsed};

pub(crate) const DETAILS_PATH: &str = "/store/apps/details";

/// Full listing of one app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDetailsEndpoint {
    pub app_id: String,
}

impl AppDetailsEndpoint {
    #[must_use]
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
        }
    }
}

impl EntityEndpoint for AppDetailsEndpoint {
    type Output = AppDetails;

    fn context(&self) -> String {
        format!("details {}", self.app_id)
    }

    fn request(&self, ctx: &RequestContext) -> Result<PlayRequest, ScraperError> {
        require_app_id(&self.app_id)?;
        ctx.page(DETAILS_PATH, &[("id", &self.app_id)])
    }

    fn parse(
        &self,
        request: &PlayRequest,
        page: &Page<'_>,
        _strictness: Strictness,
    ) -> Result<Parsed<AppDetails>, ScraperError> {
        let blob = page.select(&Selector::CallbackIslands, &details::SHAPE)?;
        let mut app: AppDetails = map_record(&blob, &details::TABLE)?;
        app.url = Some(request.url.clone());
        Ok(Parsed {
            value: app,
            skipped: Vec::new(),
        })
    }
}
