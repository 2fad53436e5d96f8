//! Fixed coercion rules applied to leaf values found by a field path.
//!
//! Each function returns `None` when the value cannot be read as the target
//! type; the caller treats that exactly like a missing position.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;

static BREAK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>|</p\s*>").expect("valid regex"));
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));
static NUMERIC_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("valid regex"));

/// Strings pass through; numbers are rendered without a trailing `.0`.
/// Blank strings count as absent.
pub(crate) fn string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(
            n.as_i64()
                .map(|i| i.to_string())
                .or_else(|| n.as_u64().map(|u| u.to_string()))
                .unwrap_or_else(|| n.to_string()),
        ),
        _ => None,
    }
}

/// Numbers pass through; strings are trimmed and parsed.
pub(crate) fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Integral numbers pass through; floats with a fractional part do not.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Accepts JSON booleans, `0`/`1`, and the strings `"true"`, `"false"`,
/// `"0"`, `"1"`.
pub(crate) fn boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Integer micros to currency units: `1_990_000` becomes `1.99`.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn micros(value: &Value) -> Option<f64> {
    integer(value).map(|m| m as f64 / 1_000_000.0)
}

/// Epoch seconds to a UTC timestamp.
pub(crate) fn timestamp(value: &Value) -> Option<DateTime<Utc>> {
    integer(value).and_then(|secs| DateTime::from_timestamp(secs, 0))
}

/// Reads `param` from the query string of a link such as
/// `/store/apps/dev?id=5700313618786177705`.
pub(crate) fn url_param(value: &Value, param: &str) -> Option<String> {
    let link = string(value)?;
    let query = link.split_once('?')?.1;
    let query = query.split('#').next().unwrap_or(query);
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == param && !v.is_empty()).then(|| v.to_owned())
    })
}

/// Description markup to plain text: line breaks become newlines, other tags
/// are dropped and entities decoded.
pub(crate) fn html_to_text(html: &str) -> String {
    let with_breaks = BREAK_TAG.replace_all(html, "\n");
    let stripped = ANY_TAG.replace_all(&with_breaks, "");
    let numeric = NUMERIC_ENTITY.replace_all(&stripped, |caps: &regex::Captures<'_>| {
        let raw = &caps[1];
        let code = raw
            .strip_prefix('x')
            .map_or_else(|| raw.parse::<u32>().ok(), |hex| u32::from_str_radix(hex, 16).ok());
        code.and_then(char::from_u32)
            .map_or_else(|| caps[0].to_owned(), String::from)
    });
    numeric
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
        .trim()
        .to_owned()
}
