use serde_json::{json, Value};

use crate::error::ScraperError;
use crate::locator::Page;
use crate::mapper::tables::permissions;
use crate::mapper::{map, walk, Strictness};
use crate::request::{PlayRequest, RequestContext};
use crate::types::{Permission, SkippedRecord};

use super::{require_app_id, EntityEndpoint, Parsed};

/// Permissions an app requests, flattened to `(group, name)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionsEndpoint {
    pub app_id: String,
}

impl PermissionsEndpoint {
    #[must_use]
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
        }
    }
}

impl EntityEndpoint for PermissionsEndpoint {
    type Output = Vec<Permission>;

    fn context(&self) -> String {
        format!("permissions {}", self.app_id)
    }

    fn request(&self, ctx: &RequestContext) -> Result<PlayRequest, ScraperError> {
        require_app_id(&self.app_id)?;
        let inner = json!([[Value::Null, [self.app_id, 7], []]]);
        ctx.batch(permissions::RPC_ID, &inner, "1")
    }

    fn parse(
        &self,
        _request: &PlayRequest,
        page: &Page<'_>,
        strictness: Strictness,
    ) -> Result<Parsed<Vec<Permission>>, ScraperError> {
        let Some(blob) = page.select_frames(permissions::RPC_ID, &permissions::SHAPE)? else {
            return Ok(Parsed {
                value: Vec::new(),
                skipped: Vec::new(),
            });
        };
        let mut out = Vec::new();
        let mut skipped = Vec::new();
        let sections = blob.as_array().map(Vec::as_slice).unwrap_or_default();

        for section in sections {
            let Some(entries) = section.as_array().filter(|e| !e.is_empty()) else {
                continue;
            };
            let bare = entries[0]
                .as_array()
                .is_some_and(|first| first.len() == permissions::BARE_ROW_ARITY);
            if bare {
                out.extend(entries.iter().filter_map(|row| {
                    let name = walk(row, permissions::BARE_ROW_NAME)?.as_str()?;
                    Some(Permission {
                        group: permissions::BARE_ROW_GROUP.to_owned(),
                        name: name.to_owned(),
                    })
                }));
                continue;
            }
            for (index, entry) in entries.iter().enumerate() {
                if entry.is_null() {
                    continue;
                }
                match map(entry, &permissions::GROUP_TABLE) {
                    Ok(group) => {
                        let name = group.str("group").unwrap_or_default();
                        out.extend(group.list("permissions").into_iter().map(|perm| Permission {
                            group: name.clone(),
                            name: perm,
                        }));
                    }
                    Err(ScraperError::IncompleteRecord { record, field, .. })
                        if strictness == Strictness::Skip =>
                    {
                        tracing::warn!(record, field, index, "skipping unnamed permission group");
                        skipped.push(SkippedRecord {
                            record,
                            field,
                            index,
                            page: 0,
                        });
                    }
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(Parsed {
            value: out,
            skipped,
        })
    }
}
