//! Batch RPC responses.
//!
//! A response starts with the anti-XSSI guard `)]}'` and then carries one or
//! more JSON arrays, optionally preceded by decimal length lines (the chunked
//! form). Data frames look like
//! `["wrb.fr", "<rpc id>", "<payload json>", null, null, null, "<tag>"]`; the
//! payload is itself a JSON document encoded as a string.

use std::borrow::Cow;

use serde_json::Value;

use super::scan::balanced_literal;
use super::Candidate;

const XSSI_GUARD: &str = ")]}'";
const DATA_FRAME: &str = "wrb.fr";

/// Every `wrb.fr` frame for `rpc_id`, in response order.
pub(crate) fn frames<'a>(body: &str, rpc_id: &str) -> Vec<Candidate<'a>> {
    let trimmed = body.trim_start();
    let mut rest = trimmed.strip_prefix(XSSI_GUARD).unwrap_or(trimmed);
    let mut out = Vec::new();

    while let Some(open) = rest.find('[') {
        rest = &rest[open..];
        let Some(chunk) = balanced_literal(rest) else {
            break;
        };
        match serde_json::from_str::<Value>(chunk) {
            Ok(value) => {
                collect_frames(&value, rpc_id, &mut out);
                rest = &rest[chunk.len()..];
            }
            Err(_) => rest = &rest[1..],
        }
    }
    out
}

fn collect_frames<'a>(value: &Value, rpc_id: &str, out: &mut Vec<Candidate<'a>>) {
    let Some(items) = value.as_array() else {
        return;
    };
    if is_frame(items, rpc_id) {
        let payload = items.get(2).and_then(Value::as_str).map(str::to_owned);
        let tag = items
            .get(6)
            .and_then(Value::as_str)
            .unwrap_or(rpc_id)
            .to_owned();
        let empty = items.get(2).is_none_or(Value::is_null);
        if empty {
            if let Some(code) = items.get(5).filter(|c| !c.is_null()) {
                tracing::debug!(rpc_id, code = %code, "batch frame without payload");
            }
        }
        out.push(Candidate {
            order: out.len(),
            key: Some(tag),
            literal: payload.map(Cow::Owned),
            empty,
        });
        return;
    }
    for item in items {
        if let Some(inner) = item.as_array() {
            if is_frame(inner, rpc_id) {
                collect_frames(item, rpc_id, out);
            }
        }
    }
}

fn is_frame(items: &[Value], rpc_id: &str) -> bool {
    items.first().and_then(Value::as_str) == Some(DATA_FRAME)
        && items.get(1).and_then(Value::as_str) == Some(rpc_id)
}
