use gplay_core::Locale;
use serde_json::{json, Value};

use super::*;
use crate::request::Method;

fn ctx() -> RequestContext {
    RequestContext::new("https://play.google.com", Locale::new("en", "us"))
}

/// Writes `value` at `path`, growing arrays with `null` as needed.
fn put(blob: &mut Value, path: &[usize], value: Value) {
    let mut current = blob;
    for &i in path {
        if !current.is_array() {
            *current = Value::Array(Vec::new());
        }
        let arr = current.as_array_mut().unwrap();
        if arr.len() <= i {
            arr.resize(i + 1, Value::Null);
        }
        current = &mut arr[i];
    }
    *current = value;
}

fn island_page(key: &str, data: &Value) -> String {
    format!(
        "<html><script>AF_initDataCallback({{key: '{key}', hash: '3', data:{data}, sideChannel: {{}}}});</script></html>"
    )
}

fn batch_body(rpc_id: &str, payload: &Value) -> String {
    let frame = json!([["wrb.fr", rpc_id, payload.to_string(), null, null, null, "generic"]]);
    format!(")]}}'\n\n{frame}")
}

fn inner_of(req: &PlayRequest) -> Value {
    let f_req: Value = serde_json::from_str(req.form_value("f.req").unwrap()).unwrap();
    serde_json::from_str(f_req[0][0][1].as_str().unwrap()).unwrap()
}

fn search_item(id: &str, title: &str) -> Value {
    let mut item = Value::Null;
    put(&mut item, &[0, 0, 0], json!(id));
    put(&mut item, &[0, 3], json!(title));
    put(&mut item, &[0, 14], json!("Dev"));
    item
}

fn similar_item(id: &str) -> Value {
    let mut item = Value::Null;
    put(&mut item, &[0, 0], json!(id));
    put(&mut item, &[3], json!(format!("Title {id}")));
    item
}

// ---- details ----

#[test]
fn details_request_targets_listing_page() {
    let req = AppDetailsEndpoint::new("com.example.maps").request(&ctx()).unwrap();
    assert_eq!(req.method, Method::Get);
    assert_eq!(
        req.url,
        "https://play.google.com/store/apps/details?id=com.example.maps&hl=en&gl=us"
    );
}

#[test]
fn blank_app_id_is_invalid_request() {
    let err = AppDetailsEndpoint::new("  ").request(&ctx()).unwrap_err();
    assert!(matches!(err, ScraperError::InvalidRequest { .. }));
}

#[test]
fn details_parse_fills_url_from_request() {
    let endpoint = AppDetailsEndpoint::new("com.example.maps");
    let req = endpoint.request(&ctx()).unwrap();
    let mut blob = Value::Null;
    put(&mut blob, &[1, 2, 0, 0], json!("Maps Pro"));
    put(&mut blob, &[1, 2, 77, 0], json!("com.example.maps"));
    let body = island_page("ds:5", &blob);

    let parsed = endpoint
        .parse(&req, &Page::new(&body, "details"), Strictness::Skip)
        .unwrap();
    assert_eq!(parsed.value.title, "Maps Pro");
    assert_eq!(parsed.value.url.as_deref(), Some(req.url.as_str()));
}

// ---- search ----

#[test]
fn search_first_page_uses_section_with_items() {
    let mut blob = Value::Null;
    // Section 0 is a header strip without items; section 1 has the hits.
    put(&mut blob, &[0, 1, 0, 22, 0], json!([]));
    put(
        &mut blob,
        &[0, 1, 1, 22, 0],
        json!([search_item("a.one", "One"), search_item("a.two", "Two")]),
    );
    put(&mut blob, &[0, 1, 1, 22, 1, 3, 1], json!("CONT"));
    let body = island_page("ds:4", &blob);

    let page = SearchEndpoint::new("maps")
        .parse_page(&Page::new(&body, "search"), true, Strictness::Skip)
        .unwrap();
    let ids: Vec<_> = page.records.iter().map(|r| r.app_id.as_str()).collect();
    assert_eq!(ids, ["a.one", "a.two"]);
    assert_eq!(page.next_token.as_ref().map(ContinuationToken::as_str), Some("CONT"));
}

#[test]
fn search_without_hits_is_empty_final_page() {
    let mut blob = Value::Null;
    put(&mut blob, &[0, 1, 0, 22, 0], json!([]));
    let body = island_page("ds:4", &blob);
    let page = SearchEndpoint::new("zzzz")
        .parse_page(&Page::new(&body, "search"), true, Strictness::Skip)
        .unwrap();
    assert!(page.records.is_empty());
    assert!(page.next_token.is_none());
}

#[test]
fn search_continuation_reads_cluster_frame() {
    let mut payload = Value::Null;
    put(&mut payload, &[0, 0, 0], json!([search_item("b.three", "Three")]));
    let body = batch_body("qnKhOb", &payload);
    let page = SearchEndpoint::new("maps")
        .parse_page(&Page::new(&body, "search"), false, Strictness::Skip)
        .unwrap();
    assert_eq!(page.records.len(), 1);
    assert_eq!(page.records[0].title, "Three");
    assert!(page.next_token.is_none());
}

#[test]
fn search_continuation_without_payload_is_last_page() {
    let body = r#")]}'
[["wrb.fr","qnKhOb",null,null,null,null,"generic"]]"#;
    let page = SearchEndpoint::new("maps")
        .parse_page(&Page::new(body, "search"), false, Strictness::Skip)
        .unwrap();
    assert!(page.records.is_empty());
    assert!(page.next_token.is_none());
}

#[test]
fn empty_query_is_invalid_request() {
    assert!(matches!(
        SearchEndpoint::new("").first_request(&ctx()),
        Err(ScraperError::InvalidRequest { .. })
    ));
}

// ---- reviews ----

#[test]
fn reviews_request_encodes_sort_size_filter_and_token() {
    let endpoint = ReviewsEndpoint::new("com.example")
        .sort(ReviewSort::Rating)
        .page_size(40)
        .filter_score(Some(5));
    let first = inner_of(&endpoint.first_request(&ctx()).unwrap());
    assert_eq!(first[2], json!([2, 3, [40, null, null], null, [null, 5]]));
    assert_eq!(first[3], json!(["com.example", 7]));

    let next = inner_of(
        &endpoint
            .next_request(&ctx(), &ContinuationToken::new("TOK"))
            .unwrap(),
    );
    assert_eq!(next[2][2], json!([40, null, "TOK"]));
}

#[test]
fn reviews_without_filter_send_empty_filter_slot() {
    let inner = inner_of(&ReviewsEndpoint::new("com.example").first_request(&ctx()).unwrap());
    assert_eq!(inner[2][1], json!(2), "newest is the default sort");
    assert_eq!(inner[2][4], json!([]));
}

#[test]
fn reviews_reject_out_of_range_parameters() {
    let bad_score = ReviewsEndpoint::new("com.example").filter_score(Some(6));
    let bad_size = ReviewsEndpoint::new("com.example").page_size(0);
    assert!(matches!(
        bad_score.first_request(&ctx()),
        Err(ScraperError::InvalidRequest { .. })
    ));
    assert!(matches!(
        bad_size.first_request(&ctx()),
        Err(ScraperError::InvalidRequest { .. })
    ));
}

#[test]
fn reviews_page_reads_items_and_token() {
    let payload = json!([
        [["gp:1", ["Ada"], 5], ["gp:2", ["Bo"], 1]],
        [null, "NEXT"]
    ]);
    let body = batch_body("UsvDTd", &payload);
    let page = ReviewsEndpoint::new("com.example")
        .parse_page(&Page::new(&body, "reviews"), true, Strictness::Skip)
        .unwrap();
    assert_eq!(page.records.len(), 2);
    assert_eq!(page.records[1].user_name.as_deref(), Some("Bo"));
    assert_eq!(page.next_token.as_ref().map(ContinuationToken::as_str), Some("NEXT"));
}

// ---- permissions ----

#[test]
fn permissions_flatten_groups_and_bare_rows() {
    let payload = json!([
        [
            ["Location", null, [[null, "precise location"], [null, "approximate location"]], null],
            ["Camera", null, [[null, "take pictures"]], null]
        ],
        [[null, "view network connections"], [null, "full network access"]]
    ]);
    let body = batch_body("xdSrCf", &payload);
    let endpoint = PermissionsEndpoint::new("com.example");
    let req = endpoint.request(&ctx()).unwrap();
    let parsed = endpoint
        .parse(&req, &Page::new(&body, "permissions"), Strictness::Skip)
        .unwrap();
    let pairs: Vec<_> = parsed
        .value
        .iter()
        .map(|p| (p.group.as_str(), p.name.as_str()))
        .collect();
    assert_eq!(
        pairs,
        [
            ("Location", "precise location"),
            ("Location", "approximate location"),
            ("Camera", "take pictures"),
            ("Uncategorized", "view network connections"),
            ("Uncategorized", "full network access"),
        ]
    );
    assert!(parsed.skipped.is_empty());
}

#[test]
fn unnamed_permission_group_is_skipped() {
    let payload = json!([[[null, null, [[null, "x"]], null], ["Phone", null, [[null, "y"]], null]]]);
    let body = batch_body("xdSrCf", &payload);
    let endpoint = PermissionsEndpoint::new("com.example");
    let req = endpoint.request(&ctx()).unwrap();
    let parsed = endpoint
        .parse(&req, &Page::new(&body, "permissions"), Strictness::Skip)
        .unwrap();
    assert_eq!(parsed.value.len(), 1);
    assert_eq!(parsed.skipped.len(), 1);
    assert_eq!(parsed.skipped[0].index, 0);
}

#[test]
fn permissions_request_wraps_app_id() {
    let inner = inner_of(&PermissionsEndpoint::new("com.example").request(&ctx()).unwrap());
    assert_eq!(inner, json!([[null, ["com.example", 7], []]]));
}

// ---- data safety ----

#[test]
fn data_safety_reads_sections_and_policy() {
    let mut blob = Value::Null;
    put(
        &mut blob,
        &[1, 2, 137, 4, 0, 0],
        json!([[[null, "Location"], null, null, null, [["Approximate location", "Analytics", false]]]]),
    );
    put(
        &mut blob,
        &[1, 2, 137, 4, 1, 0],
        json!([[
            [null, "Personal info"],
            null,
            null,
            null,
            [["Email address", "Account management", true], [null, "no type"]]
        ]]),
    );
    put(
        &mut blob,
        &[1, 2, 137, 9, 2],
        json!([[null, "Data is encrypted in transit", [null, "Your data is <b>encrypted</b>"]]]),
    );
    put(&mut blob, &[1, 2, 99, 0, 5, 2], json!("https://example.com/privacy"));
    let body = island_page("ds:3", &blob);

    let endpoint = DataSafetyEndpoint::new("com.example");
    let req = endpoint.request(&ctx()).unwrap();
    assert!(req.url.contains("/store/apps/datasafety?id=com.example"));
    let parsed = endpoint
        .parse(&req, &Page::new(&body, "data safety"), Strictness::Skip)
        .unwrap();
    let safety = parsed.value;

    assert_eq!(safety.shared_data.len(), 1);
    assert_eq!(safety.shared_data[0].category.as_deref(), Some("Location"));
    assert!(!safety.shared_data[0].optional);
    assert_eq!(safety.collected_data.len(), 1);
    assert_eq!(safety.collected_data[0].data_type, "Email address");
    assert!(safety.collected_data[0].optional);
    assert_eq!(safety.security_practices[0].description.as_deref(), Some("Your data is encrypted"));
    assert_eq!(safety.privacy_policy_url.as_deref(), Some("https://example.com/privacy"));
    assert_eq!(parsed.skipped.len(), 1, "entry without a data type is skipped");
}

// ---- similar ----

#[test]
fn similar_first_page_reads_cluster_on_details_page() {
    let mut blob = Value::Null;
    put(&mut blob, &[1, 1, 0, 21, 0], json!([similar_item("c.one"), similar_item("c.two")]));
    put(&mut blob, &[1, 1, 0, 21, 1, 3, 1], json!("MORE"));
    let body = island_page("ds:7", &blob);

    let endpoint = SimilarAppsEndpoint::new("com.example");
    let req = endpoint.first_request(&ctx()).unwrap();
    assert!(req.url.contains("/store/apps/details?id=com.example"));
    let page = endpoint
        .parse_page(&Page::new(&body, "similar"), true, Strictness::Skip)
        .unwrap();
    let ids: Vec<_> = page.records.iter().map(|r| r.app_id.as_str()).collect();
    assert_eq!(ids, ["c.one", "c.two"]);
    assert_eq!(page.records[0].title.as_deref(), Some("Title c.one"));
    assert_eq!(page.next_token.as_ref().map(ContinuationToken::as_str), Some("MORE"));
}

#[test]
fn similar_continuation_uses_cluster_rpc() {
    let req = SimilarAppsEndpoint::new("com.example")
        .next_request(&ctx(), &ContinuationToken::new("MORE"))
        .unwrap();
    assert_eq!(req.method, Method::Post);
    assert!(req.url.contains("rpcids=qnKhOb"));
}
