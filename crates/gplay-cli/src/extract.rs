//! Command handlers for the CLI.
//!
//! Each handler runs one extraction against the configured client and
//! returns the JSON document `main` prints. A chain that fails after its
//! first page still prints what it gathered; the failure is logged and
//! carried in the report's `error` field.

use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use gplay_scraper::{
    AppDetailsEndpoint, ChainOutcome, DataSafetyEndpoint, Extraction, Parsed,
    PermissionsEndpoint, PlayClient, ReviewsEndpoint, SearchEndpoint, SimilarAppsEndpoint,
    SkippedRecord,
};

/// Printable summary of one pagination chain.
#[derive(Debug, Serialize)]
pub(crate) struct ChainReport<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    pub outcome: &'static str,
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub pages: usize,
    pub skipped: Vec<SkippedRecord>,
    pub records: Vec<T>,
}

impl<T> ChainReport<T> {
    pub(crate) fn from_extraction(extraction: Extraction<T>) -> Self {
        let (outcome, truncated, error) = match extraction.outcome {
            ChainOutcome::Exhausted { truncated } => ("exhausted", truncated, None),
            ChainOutcome::Failed(err) => {
                tracing::warn!(error = %err, "chain ended early; printing partial results");
                ("failed", false, Some(err.to_string()))
            }
            ChainOutcome::Cancelled => ("cancelled", false, None),
        };
        Self {
            app_id: None,
            outcome,
            truncated,
            error,
            pages: extraction.pages,
            skipped: extraction.skipped,
            records: extraction.records,
        }
    }
}

/// `{"value": …, "skipped": […]}` for an entity whose sub-records may have
/// been dropped.
pub(crate) fn entity_json<T: Serialize>(parsed: Parsed<T>) -> anyhow::Result<Value> {
    Ok(serde_json::json!({
        "value": serde_json::to_value(parsed.value)?,
        "skipped": serde_json::to_value(parsed.skipped)?,
    }))
}

pub(crate) async fn details(
    client: &PlayClient,
    app_id: &str,
    cancel: &CancellationToken,
) -> anyhow::Result<Value> {
    let parsed = client
        .fetch_entity(client.context(), &AppDetailsEndpoint::new(app_id), cancel)
        .await?;
    Ok(serde_json::to_value(parsed.value)?)
}

pub(crate) async fn permissions(
    client: &PlayClient,
    app_id: &str,
    cancel: &CancellationToken,
) -> anyhow::Result<Value> {
    let parsed = client
        .fetch_entity(client.context(), &PermissionsEndpoint::new(app_id), cancel)
        .await?;
    entity_json(parsed)
}

pub(crate) async fn data_safety(
    client: &PlayClient,
    app_id: &str,
    cancel: &CancellationToken,
) -> anyhow::Result<Value> {
    let parsed = client
        .fetch_entity(client.context(), &DataSafetyEndpoint::new(app_id), cancel)
        .await?;
    entity_json(parsed)
}

pub(crate) async fn search(
    client: &PlayClient,
    query: &str,
    limit: Option<usize>,
    cancel: &CancellationToken,
) -> anyhow::Result<Value> {
    let extraction = client
        .extract(client.context(), &SearchEndpoint::new(query), limit, cancel)
        .await?;
    Ok(serde_json::to_value(ChainReport::from_extraction(extraction))?)
}

pub(crate) async fn similar(
    client: &PlayClient,
    app_id: &str,
    limit: Option<usize>,
    cancel: &CancellationToken,
) -> anyhow::Result<Value> {
    let extraction = client
        .extract(client.context(), &SimilarAppsEndpoint::new(app_id), limit, cancel)
        .await?;
    Ok(serde_json::to_value(ChainReport::from_extraction(extraction))?)
}

/// Reviews for every app id, one chain per app, run concurrently.
///
/// An app whose first page fails is reported with `outcome: "error"` and
/// does not stop the others.
pub(crate) async fn reviews(
    client: &PlayClient,
    endpoints: &[ReviewsEndpoint],
    limit: Option<usize>,
    cancel: &CancellationToken,
) -> anyhow::Result<Value> {
    let budget = client.options().max_concurrent_chains;
    let results = client
        .extract_many(client.context(), endpoints, limit, budget, cancel)
        .await;

    let mut reports = Vec::with_capacity(results.len());
    for (endpoint, result) in endpoints.iter().zip(results) {
        let report = match result {
            Ok(extraction) => {
                let mut report = ChainReport::from_extraction(extraction);
                report.app_id = Some(endpoint.app_id.clone());
                serde_json::to_value(report)?
            }
            Err(err) => {
                tracing::warn!(app_id = %endpoint.app_id, error = %err, "review extraction failed");
                serde_json::json!({
                    "app_id": endpoint.app_id,
                    "outcome": "error",
                    "error": err.to_string(),
                })
            }
        };
        reports.push(report);
    }
    Ok(Value::Array(reports))
}
