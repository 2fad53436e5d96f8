//! Output records produced by the extraction engine.
//!
//! Every record is a plain owned value; nothing here borrows from the page
//! it was mapped from. Fields are `Option` unless the store reliably sends
//! them (package id, title, review id). List fields are empty when absent.
//!
//! ### Prices
//! The store encodes prices as integer micros (`1_990_000` for 1.99). They
//! are converted to units during mapping. `free` is derived from the price
//! when the price position is present and left `None` otherwise.
//!
//! ### Duplicates
//! Records are returned in the order the store sent them. Pages near the end
//! of a result set sometimes overlap; no deduplication is applied.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque cursor for the next page of a list endpoint.
///
/// Deliberately not `Clone`: handing a token to the next request moves it,
/// so each token feeds exactly one follow-up fetch.
#[derive(Debug, PartialEq, Eq)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One page of a list endpoint.
#[derive(Debug)]
pub struct PageResult<T> {
    pub records: Vec<T>,
    pub next_token: Option<ContinuationToken>,
    /// `true` when the store handed back a token for another page.
    pub has_more: bool,
}

/// A list element dropped because a required field was missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub record: &'static str,
    pub field: &'static str,
    /// Zero-based position of the element within its page.
    pub index: usize,
    /// Zero-based page number within the chain.
    pub page: usize,
}

/// Full listing of one app, from the details page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppDetails {
    /// Package name, e.g. `"com.spotify.music"`.
    pub app_id: String,
    pub title: String,
    /// Plain-text description with markup stripped.
    pub description: Option<String>,
    pub description_html: Option<String>,
    pub summary: Option<String>,
    /// Display bucket such as `"1,000,000+"`.
    pub installs: Option<String>,
    pub min_installs: Option<u64>,
    pub real_installs: Option<u64>,
    pub score: Option<f64>,
    pub ratings: Option<u64>,
    pub reviews: Option<u64>,
    /// Rating counts for one through five stars.
    pub histogram: [Option<u64>; 5],
    pub price: Option<f64>,
    pub free: Option<bool>,
    pub currency: Option<String>,
    pub offers_iap: bool,
    pub iap_range: Option<String>,
    pub developer: Option<String>,
    pub developer_id: Option<String>,
    pub developer_email: Option<String>,
    pub developer_website: Option<String>,
    pub developer_address: Option<String>,
    pub privacy_policy: Option<String>,
    pub genre: Option<String>,
    pub genre_id: Option<String>,
    pub icon: Option<String>,
    pub header_image: Option<String>,
    pub screenshots: Vec<String>,
    pub video: Option<String>,
    pub video_image: Option<String>,
    pub content_rating: Option<String>,
    pub content_rating_description: Option<String>,
    pub ad_supported: bool,
    pub released: Option<String>,
    pub updated: Option<DateTime<Utc>>,
    pub version: Option<String>,
    pub android_version: Option<String>,
    pub recent_changes: Option<String>,
    /// Canonical listing URL for the locale the page was fetched with.
    pub url: Option<String>,
}

/// One hit from a search results page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub app_id: String,
    pub title: String,
    pub icon: Option<String>,
    pub screenshots: Vec<String>,
    pub score: Option<f64>,
    pub genre: Option<String>,
    pub price: Option<f64>,
    pub free: Option<bool>,
    pub currency: Option<String>,
    pub video: Option<String>,
    pub video_image: Option<String>,
    pub description: Option<String>,
    pub description_html: Option<String>,
    pub developer: Option<String>,
    pub installs: Option<String>,
}

/// A user review with the developer reply, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub review_id: String,
    pub user_name: Option<String>,
    pub user_image: Option<String>,
    pub content: Option<String>,
    /// Star rating, 1 through 5.
    pub score: Option<u8>,
    pub thumbs_up_count: Option<u64>,
    pub review_created_version: Option<String>,
    pub at: Option<DateTime<Utc>>,
    pub reply_content: Option<String>,
    pub replied_at: Option<DateTime<Utc>>,
    pub app_version: Option<String>,
}

/// A single declared permission and the group the store files it under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Group heading, e.g. `"Location"`. Ungrouped permissions use
    /// `"Uncategorized"`.
    pub group: String,
    pub name: String,
}

/// One row of a data-safety disclosure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSafetyEntry {
    /// Section heading, e.g. `"Personal info"`.
    pub category: Option<String>,
    /// Data type, e.g. `"Email address"`.
    pub data_type: String,
    pub optional: bool,
    /// Comma-separated purposes as shown by the store.
    pub purpose: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityPractice {
    pub practice: String,
    pub description: Option<String>,
}

/// The data-safety page of one app.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DataSafety {
    pub shared_data: Vec<DataSafetyEntry>,
    pub collected_data: Vec<DataSafetyEntry>,
    pub security_practices: Vec<SecurityPractice>,
    pub privacy_policy_url: Option<String>,
}

/// An entry of the "similar apps" cluster on a details page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarApp {
    pub app_id: String,
    pub title: Option<String>,
    pub icon: Option<String>,
    pub developer: Option<String>,
    pub score: Option<f64>,
    pub price: Option<f64>,
    pub free: Option<bool>,
    pub currency: Option<String>,
    pub description: Option<String>,
}
