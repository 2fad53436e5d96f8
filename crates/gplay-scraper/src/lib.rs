pub mod client;
pub mod endpoints;
pub mod error;
pub mod locator;
pub mod mapper;
pub mod pagination;
pub mod request;
pub mod retry;
pub mod transport;
pub mod types;

pub use client::{ChainOptions, ChainOutcome, Extraction, PlayClient};
pub use endpoints::{
    AppDetailsEndpoint, DataSafetyEndpoint, EntityEndpoint, ListEndpoint, Parsed, ParsedPage,
    PermissionsEndpoint, ReviewSort, ReviewsEndpoint, SearchEndpoint, SimilarAppsEndpoint,
};
pub use error::{MalformedReason, ScraperError, TransportError};
pub use mapper::Strictness;
pub use request::{Method, PlayRequest, RequestContext};
pub use retry::{ExponentialBackoff, NoRetry, RetryDecision, RetryPolicy};
pub use transport::{HttpTransport, Transport};
pub use types::{
    AppDetails, ContinuationToken, DataSafety, DataSafetyEntry, PageResult, Permission, Review,
    SearchResult, SecurityPractice, SimilarApp, SkippedRecord,
};
