//! Integration tests for `PlayClient::extract`, `fetch_page`, `fetch_entity`
//! and `extract_many`.
//!
//! A scripted in-memory transport replays canned bodies and errors so the
//! chain logic (limits, termination, partial failure, retries, cancellation)
//! is exercised without any network.

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use gplay_core::Locale;
use gplay_scraper::{
    AppDetailsEndpoint, ChainOptions, ChainOutcome, ContinuationToken, ExponentialBackoff,
    NoRetry, PlayClient, PlayRequest, RequestContext, Review, ReviewsEndpoint, ScraperError,
    SkippedRecord, Transport, TransportError,
};

type Reply = Result<String, TransportError>;

/// Replays queued replies. Each route pops from its own queue when its
/// needle occurs in the request URL or form body; the empty needle matches
/// everything.
#[derive(Default)]
struct ScriptedTransport {
    routes: Mutex<Vec<(String, VecDeque<Reply>)>>,
    requests: Mutex<Vec<PlayRequest>>,
    cancel_on_call: Mutex<Option<(usize, CancellationToken)>>,
}

impl ScriptedTransport {
    fn new(replies: Vec<Reply>) -> Self {
        let transport = Self::default();
        transport.route("", replies);
        transport
    }

    fn route(&self, needle: &str, replies: Vec<Reply>) {
        self.routes
            .lock()
            .unwrap()
            .push((needle.to_owned(), replies.into_iter().collect()));
    }

    /// Cancels `token` while serving the `call`-th request (1-based).
    fn cancel_during_call(&self, call: usize, token: CancellationToken) {
        *self.cancel_on_call.lock().unwrap() = Some((call, token));
    }

    fn requests(&self) -> Vec<PlayRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: &PlayRequest) -> Result<String, TransportError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };
        if let Some((at, token)) = self.cancel_on_call.lock().unwrap().as_ref() {
            if *at == call {
                token.cancel();
            }
        }
        let haystack = format!("{} {}", request.url, request.form_value("f.req").unwrap_or(""));
        let mut routes = self.routes.lock().unwrap();
        let queue = routes
            .iter_mut()
            .find(|(needle, _)| haystack.contains(needle.as_str()))
            .map(|(_, queue)| queue)
            .expect("no route for request");
        queue.pop_front().expect("script ran out of replies")
    }
}

fn ctx() -> RequestContext {
    RequestContext::new("https://play.google.com", Locale::default())
}

fn client(transport: ScriptedTransport) -> PlayClient<ScriptedTransport> {
    PlayClient::new(transport, ctx()).with_retry_policy(NoRetry)
}

/// A reviews batch response with `count` reviews whose ids start at `first_id`.
fn reviews_body(first_id: usize, count: usize, token: Option<&str>) -> Reply {
    let items: Vec<Value> = (first_id..first_id + count)
        .map(|i| json!([format!("gp:{i}"), [format!("user {i}")], 4]))
        .collect();
    let payload = json!([items, [null, token]]);
    let frame = json!([["wrb.fr", "UsvDTd", payload.to_string(), null, null, null, "generic"]]);
    Ok(format!(")]}}'\n\n{frame}"))
}

/// A reviews batch response whose frame carries no payload, as sent for an
/// app without (further) reviews.
fn no_reviews_body() -> Reply {
    Ok(r#")]}'

[["wrb.fr","UsvDTd",null,null,null,[5],"generic"],["di",31],["af.httprm",30,"-1",7]]"#
        .to_owned())
}

fn review_ids(records: &[Review]) -> Vec<&str> {
    records.iter().map(|r| r.review_id.as_str()).collect()
}

fn sent_token(request: &PlayRequest) -> Value {
    let f_req: Value = serde_json::from_str(request.form_value("f.req").unwrap()).unwrap();
    let inner: Value = serde_json::from_str(f_req[0][0][1].as_str().unwrap()).unwrap();
    inner[2][2][2].clone()
}

// ---------------------------------------------------------------------------
// Test 1 – limit truncation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn limit_returns_exactly_limit_records_and_marks_truncated() {
    let transport = ScriptedTransport::new(vec![
        reviews_body(0, 40, Some("p2")),
        reviews_body(40, 40, Some("p3")),
        reviews_body(80, 40, None),
    ]);
    let client = client(transport);

    let out = client
        .extract(&ctx(), &ReviewsEndpoint::new("com.example"), Some(50), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(out.records.len(), 50);
    assert_eq!(out.records[49].review_id, "gp:49");
    assert!(matches!(out.outcome, ChainOutcome::Exhausted { truncated: true }));
    assert_eq!(client.transport().requests().len(), 2, "third page must not be fetched");
}

// ---------------------------------------------------------------------------
// Test 2 – natural termination
// ---------------------------------------------------------------------------

#[tokio::test]
async fn chain_stops_when_token_is_absent() {
    let transport = ScriptedTransport::new(vec![
        reviews_body(0, 3, Some("p2")),
        reviews_body(3, 2, None),
    ]);
    let client = client(transport);

    let out = client
        .extract(&ctx(), &ReviewsEndpoint::new("com.example"), None, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(review_ids(&out.records), ["gp:0", "gp:1", "gp:2", "gp:3", "gp:4"]);
    assert!(matches!(out.outcome, ChainOutcome::Exhausted { truncated: false }));
    assert_eq!(out.pages, 2);
    assert!(out.is_complete());

    let requests = client.transport().requests();
    assert_eq!(sent_token(&requests[0]), Value::Null);
    assert_eq!(sent_token(&requests[1]), json!("p2"));
}

// ---------------------------------------------------------------------------
// Test 3 – partial failure keeps earlier pages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failure_on_third_page_returns_first_two_pages() {
    let transport = ScriptedTransport::new(vec![
        reviews_body(0, 10, Some("p2")),
        reviews_body(10, 10, Some("p3")),
        Err(TransportError::Status {
            status: 403,
            url: "https://play.google.com/_/PlayStoreUi/data/batchexecute".to_owned(),
        }),
    ]);
    let client = client(transport);

    let out = client
        .extract(&ctx(), &ReviewsEndpoint::new("com.example"), None, &CancellationToken::new())
        .await
        .expect("partial results must be Ok");

    assert_eq!(out.records.len(), 20);
    assert_eq!(out.pages, 2);
    match &out.outcome {
        ChainOutcome::Failed(ScraperError::Transport(TransportError::Status { status, .. })) => {
            assert_eq!(*status, 403);
        }
        other => panic!("expected Failed(Status 403), got: {other:?}"),
    }
    assert!(!out.is_complete());
}

// ---------------------------------------------------------------------------
// Test 4 – failure on the first page is an error
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failure_on_first_page_is_err() {
    let transport = ScriptedTransport::new(vec![Ok("<html>captcha</html>".to_owned())]);
    let client = client(transport);

    let err = client
        .extract(&ctx(), &ReviewsEndpoint::new("com.example"), None, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(
        matches!(err, ScraperError::MalformedPage { .. }),
        "expected MalformedPage, got: {err:?}"
    );
}

// ---------------------------------------------------------------------------
// Test 5 – transient failure retried with the same token
// ---------------------------------------------------------------------------

#[tokio::test]
async fn transient_failure_is_retried_with_same_token() {
    let transport = ScriptedTransport::new(vec![
        reviews_body(0, 2, Some("p2")),
        Err(TransportError::Status {
            status: 503,
            url: "https://play.google.com".to_owned(),
        }),
        Ok("   ".to_owned()),
        reviews_body(2, 2, None),
    ]);
    let client = PlayClient::new(transport, ctx())
        .with_retry_policy(ExponentialBackoff::new(3, 0).without_jitter());

    let out = client
        .extract(&ctx(), &ReviewsEndpoint::new("com.example"), None, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(out.records.len(), 4);
    assert!(out.is_complete());
    let tokens: Vec<Value> = client.transport().requests().iter().map(sent_token).collect();
    assert_eq!(tokens, [Value::Null, json!("p2"), json!("p2"), json!("p2")]);
}

// ---------------------------------------------------------------------------
// Test 6 – cancellation keeps accumulated records
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancellation_mid_chain_returns_partial_records() {
    let cancel = CancellationToken::new();
    let transport = ScriptedTransport::new(vec![
        reviews_body(0, 5, Some("p2")),
        reviews_body(5, 5, Some("p3")),
        reviews_body(10, 5, None),
    ]);
    transport.cancel_during_call(2, cancel.clone());
    let client = client(transport);

    let out = client
        .extract(&ctx(), &ReviewsEndpoint::new("com.example"), None, &cancel)
        .await
        .expect("cancellation is not an error");

    assert!(matches!(out.outcome, ChainOutcome::Cancelled));
    assert_eq!(out.records.len(), 10);
    assert_eq!(client.transport().requests().len(), 2);
}

#[tokio::test]
async fn cancelled_before_start_fetches_nothing() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let client = client(ScriptedTransport::new(vec![]));

    let out = client
        .extract(&ctx(), &ReviewsEndpoint::new("com.example"), None, &cancel)
        .await
        .unwrap();

    assert!(matches!(out.outcome, ChainOutcome::Cancelled));
    assert!(out.records.is_empty());
    assert!(client.transport().requests().is_empty());
}

// ---------------------------------------------------------------------------
// Test 7 – page cap guards against cycling tokens
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cycling_token_hits_page_cap() {
    let transport = ScriptedTransport::new(vec![
        reviews_body(0, 1, Some("same")),
        reviews_body(1, 1, Some("same")),
        reviews_body(2, 1, Some("same")),
    ]);
    let client = client(transport).with_options(ChainOptions {
        max_pages: 3,
        ..ChainOptions::default()
    });

    let out = client
        .extract(&ctx(), &ReviewsEndpoint::new("com.example"), None, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(out.records.len(), 3);
    assert!(matches!(
        out.outcome,
        ChainOutcome::Failed(ScraperError::PaginationLimit { max_pages: 3, .. })
    ));
}

// ---------------------------------------------------------------------------
// Test 8 – skipped records are reported with their page
// ---------------------------------------------------------------------------

#[tokio::test]
async fn skipped_records_carry_page_index() {
    let payload = json!([[["gp:a", ["A"]], [null, ["no id"]]], [null, null]]);
    let frame = json!([["wrb.fr", "UsvDTd", payload.to_string(), null, null, null, "generic"]]);
    let transport = ScriptedTransport::new(vec![
        reviews_body(100, 1, Some("p2")),
        Ok(format!(")]}}'\n{frame}")),
    ]);
    let client = client(transport);

    let out = client
        .extract(&ctx(), &ReviewsEndpoint::new("com.example"), None, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(review_ids(&out.records), ["gp:100", "gp:a"]);
    assert_eq!(out.skipped.len(), 1);
    assert_eq!(out.skipped[0].page, 1);
    assert_eq!(out.skipped[0].index, 1);
}

// ---------------------------------------------------------------------------
// Test 9 – manual page stepping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_page_steps_one_token_at_a_time() {
    let transport = ScriptedTransport::new(vec![
        reviews_body(0, 2, Some("next")),
        reviews_body(2, 2, None),
    ]);
    let client = client(transport);
    let endpoint = ReviewsEndpoint::new("com.example");

    let cancel = CancellationToken::new();

    let first = client.fetch_page(&ctx(), &endpoint, None, &cancel).await.unwrap();
    assert!(first.has_more);
    let token = first.next_token.expect("first page has a token");
    assert_eq!(token, ContinuationToken::new("next"));

    let second = client
        .fetch_page(&ctx(), &endpoint, Some(token), &cancel)
        .await
        .unwrap();
    assert!(!second.has_more);
    assert!(second.next_token.is_none());
    assert_eq!(second.records[0].review_id, "gp:2");
}

#[tokio::test]
async fn fetch_page_cancelled_before_send_is_cancelled_error() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let client = client(ScriptedTransport::new(vec![]));

    let err = client
        .fetch_page(&ctx(), &ReviewsEndpoint::new("com.example"), None, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, ScraperError::Cancelled));
    assert!(client.transport().requests().is_empty());
}

#[tokio::test]
async fn fetch_page_backoff_sleep_is_cancellable() {
    let cancel = CancellationToken::new();
    let transport = ScriptedTransport::new(vec![Err(TransportError::Status {
        status: 503,
        url: "https://play.google.com".to_owned(),
    })]);
    transport.cancel_during_call(1, cancel.clone());
    let client = PlayClient::new(transport, ctx())
        .with_retry_policy(ExponentialBackoff::new(3, 600_000).without_jitter());

    let err = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        client.fetch_page(&ctx(), &ReviewsEndpoint::new("com.example"), None, &cancel),
    )
    .await
    .expect("cancellation must interrupt the backoff sleep")
    .unwrap_err();

    assert!(matches!(err, ScraperError::Cancelled));
    assert_eq!(client.transport().requests().len(), 1);
}

// ---------------------------------------------------------------------------
// Test 10 – single entity fetch and cancellation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_entity_cancelled_is_cancelled_error() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let client = client(ScriptedTransport::new(vec![]));

    let err = client
        .fetch_entity(&ctx(), &AppDetailsEndpoint::new("com.example"), &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::Cancelled));
}

#[tokio::test]
async fn fetch_entity_does_not_retry_not_found() {
    let transport = ScriptedTransport::new(vec![Err(TransportError::NotFound {
        url: "https://play.google.com/store/apps/details?id=gone".to_owned(),
    })]);
    let client = PlayClient::new(transport, ctx()).with_retry_policy(ExponentialBackoff::new(3, 0));

    let err = client.app_details("gone").await.unwrap_err();
    assert!(matches!(err, ScraperError::Transport(TransportError::NotFound { .. })));
    assert_eq!(client.transport().requests().len(), 1);
}

// ---------------------------------------------------------------------------
// Test 11 – independent chains run concurrently
// ---------------------------------------------------------------------------

#[tokio::test]
async fn extract_many_keeps_chains_independent_and_ordered() {
    let transport = ScriptedTransport::default();
    transport.route(
        "com.alpha",
        vec![reviews_body(0, 2, Some("a2")), reviews_body(2, 1, None)],
    );
    transport.route(
        "com.beta",
        vec![Err(TransportError::NotFound {
            url: "https://play.google.com".to_owned(),
        })],
    );
    transport.route("com.gamma", vec![reviews_body(50, 3, None)]);
    let client = client(transport);

    let endpoints = [
        ReviewsEndpoint::new("com.alpha"),
        ReviewsEndpoint::new("com.beta"),
        ReviewsEndpoint::new("com.gamma"),
    ];
    let results = client
        .extract_many(&ctx(), &endpoints, None, 2, &CancellationToken::new())
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().records.len(), 3);
    assert!(matches!(results[1], Err(ScraperError::Transport(_))));
    assert_eq!(results[2].as_ref().unwrap().records[0].review_id, "gp:50");
}

// ---------------------------------------------------------------------------
// Test 12 – store answers with no payload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn app_without_reviews_is_empty_and_exhausted() {
    let client = client(ScriptedTransport::new(vec![no_reviews_body()]));

    let out = client
        .extract(&ctx(), &ReviewsEndpoint::new("com.noreviews"), None, &CancellationToken::new())
        .await
        .expect("an app with no reviews is not an error");

    assert!(out.records.is_empty());
    assert!(matches!(out.outcome, ChainOutcome::Exhausted { truncated: false }));
    assert_eq!(out.pages, 1);
}

#[tokio::test]
async fn payloadless_final_page_ends_chain_as_exhausted() {
    let transport = ScriptedTransport::new(vec![reviews_body(0, 1, Some("p2")), no_reviews_body()]);
    let client = client(transport);

    let out = client
        .extract(&ctx(), &ReviewsEndpoint::new("com.example"), None, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(review_ids(&out.records), ["gp:0"]);
    assert!(matches!(out.outcome, ChainOutcome::Exhausted { truncated: false }));
    assert_eq!(out.pages, 2);
}

// ---------------------------------------------------------------------------
// Test 13 – skipped records past the limit are not reported
// ---------------------------------------------------------------------------

#[tokio::test]
async fn skips_beyond_the_limit_cut_are_dropped() {
    let payload = json!([
        [
            ["gp:a", ["A"]],
            [null, ["no id 1"]],
            ["gp:b", ["B"]],
            [null, ["no id 3"]],
            ["gp:c", ["C"]]
        ],
        [null, "p2"]
    ]);
    let frame = json!([["wrb.fr", "UsvDTd", payload.to_string(), null, null, null, "generic"]]);
    let client = client(ScriptedTransport::new(vec![Ok(format!(")]}}'\n{frame}"))]));

    let out = client
        .extract(&ctx(), &ReviewsEndpoint::new("com.example"), Some(2), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(review_ids(&out.records), ["gp:a", "gp:b"]);
    assert!(matches!(out.outcome, ChainOutcome::Exhausted { truncated: true }));
    assert_eq!(
        out.skipped,
        [SkippedRecord {
            record: "review",
            field: "review_id",
            index: 1,
            page: 0,
        }]
    );
}

// ---------------------------------------------------------------------------
// Test 14 – entity sub-records dropped while mapping reach the caller
// ---------------------------------------------------------------------------

#[tokio::test]
async fn permissions_report_unnamed_groups_as_skipped() {
    let payload = json!([[
        ["Camera", null, [[null, "take pictures"]], null],
        [null, null, [[null, "hidden perm"]], null]
    ]]);
    let frame = json!([["wrb.fr", "xdSrCf", payload.to_string(), null, null, null, "1"]]);
    let client = client(ScriptedTransport::new(vec![Ok(format!(")]}}'\n{frame}"))]));

    let parsed = client.permissions("com.x").await.unwrap();

    assert_eq!(parsed.value.len(), 1);
    assert_eq!(parsed.value[0].group, "Camera");
    assert_eq!(parsed.skipped.len(), 1);
    assert_eq!(parsed.skipped[0].record, "permission group");
    assert_eq!(parsed.skipped[0].field, "group");
    assert_eq!(parsed.skipped[0].index, 1);
}

#[tokio::test]
async fn permissions_without_payload_are_empty() {
    let body = r#")]}'
[["wrb.fr","xdSrCf",null,null,null,null,"1"]]"#;
    let client = client(ScriptedTransport::new(vec![Ok(body.to_owned())]));

    let parsed = client.permissions("com.bare").await.unwrap();

    assert!(parsed.value.is_empty());
    assert!(parsed.skipped.is_empty());
}
