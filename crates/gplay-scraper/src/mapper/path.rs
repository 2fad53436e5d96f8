use serde_json::Value;

/// One hop of a [`FieldPath`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Index(usize),
    Key(&'static str),
}

/// Route from the root of a blob to one logical field.
pub type FieldPath = &'static [Step];

/// Follows `path` through `blob`.
///
/// Any out-of-range index, missing key, type mismatch or JSON `null` along
/// the way yields `None`. An empty path returns the blob itself.
#[must_use]
pub fn walk<'a>(blob: &'a Value, path: &[Step]) -> Option<&'a Value> {
    let mut current = blob;
    for step in path {
        current = match (step, current) {
            (Step::Index(i), Value::Array(items)) => items.get(*i)?,
            (Step::Key(k), Value::Object(map)) => map.get(*k)?,
            _ => return None,
        };
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Renders a path as `[1][2]["key"]` for log fields.
#[must_use]
pub fn describe(path: &[Step]) -> String {
    path.iter()
        .map(|step| match step {
            Step::Index(i) => format!("[{i}]"),
            Step::Key(k) => format!("[\"{k}\"]"),
        })
        .collect()
}
