//! Literals embedded in HTML script blocks.

use std::borrow::Cow;

use super::scan::{balanced_literal, quoted_prefix, top_level_property};
use super::Candidate;

const CALLBACK: &str = "AF_initDataCallback(";

/// Every `AF_initDataCallback({key: 'ds:N', …, data: <literal>, …})` block,
/// in document order.
///
/// The callback argument is scanned as a whole first so that properties are
/// read from the object structurally, not by byte offset. A block whose
/// object or `data` literal never closes still yields a candidate, so it
/// counts as undecodable rather than missing.
pub(crate) fn callback_islands(body: &str) -> Vec<Candidate<'_>> {
    let mut out = Vec::new();
    for (start, _) in body.match_indices(CALLBACK) {
        let arg = body[start + CALLBACK.len()..].trim_start();
        let order = out.len();
        let Some(object) = balanced_literal(arg) else {
            out.push(Candidate::unterminated(order, None));
            continue;
        };
        let key = top_level_property(object, "key")
            .and_then(|at| quoted_prefix(&object[at..]))
            .map(str::to_owned);
        let literal = top_level_property(object, "data")
            .and_then(|at| balanced_literal(&object[at..]))
            .map(Cow::Borrowed);
        out.push(Candidate {
            order,
            key,
            literal,
            empty: false,
        });
    }
    out
}

/// Every `NAME = <literal>` assignment, with or without `var`, in document
/// order. Occurrences where `NAME` is only a suffix of a longer identifier
/// are ignored.
pub(crate) fn assignments<'a>(body: &'a str, name: &str) -> Vec<Candidate<'a>> {
    let mut out = Vec::new();
    for (start, _) in body.match_indices(name) {
        let preceded_by_ident = body[..start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '.');
        if preceded_by_ident {
            continue;
        }
        let after = body[start + name.len()..].trim_start();
        let Some(rhs) = after.strip_prefix('=') else {
            continue;
        };
        // `==` is a comparison, not an assignment.
        if rhs.starts_with('=') {
            continue;
        }
        let rhs = rhs.trim_start();
        if !rhs.starts_with(['[', '{']) {
            continue;
        }
        out.push(Candidate {
            order: out.len(),
            key: Some(name.to_owned()),
            literal: balanced_literal(rhs).map(Cow::Borrowed),
            empty: false,
        });
    }
    out
}
