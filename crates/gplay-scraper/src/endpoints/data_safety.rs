use serde_json::Value;

use crate::error::ScraperError;
use crate::locator::{Page, Selector};
use crate::mapper::tables::data_safety;
use crate::mapper::{coerce, map, map_items, walk, FieldPath, MappedItems, Strictness};
use crate::request::{PlayRequest, RequestContext};
use crate::types::{DataSafety, DataSafetyEntry, SecurityPractice, SkippedRecord};

use super::{require_app_id, EntityEndpoint, Parsed};

const DATA_SAFETY_PATH: &str = "/store/apps/datasafety";

/// The data-safety disclosure of one app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSafetyEndpoint {
    pub app_id: String,
}

impl DataSafetyEndpoint {
    #[must_use]
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
        }
    }
}

impl EntityEndpoint for DataSafetyEndpoint {
    type Output = DataSafety;

    fn context(&self) -> String {
        format!("data safety {}", self.app_id)
    }

    fn request(&self, ctx: &RequestContext) -> Result<PlayRequest, ScraperError> {
        require_app_id(&self.app_id)?;
        ctx.page(DATA_SAFETY_PATH, &[("id", &self.app_id)])
    }

    fn parse(
        &self,
        _request: &PlayRequest,
        page: &Page<'_>,
        strictness: Strictness,
    ) -> Result<Parsed<DataSafety>, ScraperError> {
        let blob = page.select(&Selector::CallbackIslands, &data_safety::SHAPE)?;
        let mut skipped = Vec::new();

        let shared_data = entries(&blob, data_safety::SHARED, strictness, &mut skipped)?;
        let collected_data = entries(&blob, data_safety::COLLECTED, strictness, &mut skipped)?;
        let MappedItems {
            records: security_practices,
            skipped: practice_skips,
        } = map_items::<SecurityPractice>(
            walk(&blob, data_safety::SECURITY),
            &data_safety::PRACTICE_TABLE,
            strictness,
        )?;
        skipped.extend(practice_skips);

        Ok(Parsed {
            value: DataSafety {
                shared_data,
                collected_data,
                security_practices,
                privacy_policy_url: walk(&blob, data_safety::PRIVACY_POLICY)
                    .and_then(coerce::string),
            },
            skipped,
        })
    }
}

/// Flattens the category groups at `path` into entries tagged with their
/// category name.
fn entries(
    blob: &Value,
    path: FieldPath,
    strictness: Strictness,
    skipped: &mut Vec<SkippedRecord>,
) -> Result<Vec<DataSafetyEntry>, ScraperError> {
    let Some(groups) = walk(blob, path).and_then(Value::as_array) else {
        return Ok(Vec::new());
    };
    let mut out = Vec::new();
    for group in groups {
        let category = map(group, &data_safety::CATEGORY_TABLE)?.str("category");
        let mapped = map_items::<DataSafetyEntry>(
            walk(group, data_safety::CATEGORY_ENTRIES),
            &data_safety::ENTRY_TABLE,
            strictness,
        )?;
        skipped.extend(mapped.skipped);
        out.extend(mapped.records.into_iter().map(|mut entry| {
            entry.category.clone_from(&category);
            entry
        }));
    }
    Ok(out)
}
