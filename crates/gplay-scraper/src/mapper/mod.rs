//! Positional blob → typed record mapping.
//!
//! The store ships data as deeply nested arrays with no field names. All
//! knowledge of *where* a field lives is kept in [`FieldTable`]s (see
//! [`tables`]); the code here only walks paths and applies the coercion rule
//! attached to each field. A layout change upstream is therefore a table
//! edit plus a fixture, never a change to this module.
//!
//! Mapping is pure: same blob and table in, same record out.

pub(crate) mod coerce;
pub mod path;
mod records;
pub mod tables;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::ScraperError;
use crate::types::SkippedRecord;

pub use path::{walk, FieldPath, Step};

/// How a leaf value is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    /// HTML rendered to plain text.
    Text,
    Num,
    Int,
    Bool,
    /// Integer micros, converted to units.
    Micros,
    /// Epoch seconds.
    Timestamp,
    /// A named query parameter pulled out of a link.
    UrlParam(&'static str),
    /// An array whose elements are each walked with `item` and read as strings.
    StrList { item: FieldPath },
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub path: FieldPath,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    #[must_use]
    pub const fn required(name: &'static str, path: FieldPath, kind: FieldKind) -> Self {
        Self {
            name,
            path,
            kind,
            required: true,
        }
    }

    #[must_use]
    pub const fn optional(name: &'static str, path: FieldPath, kind: FieldKind) -> Self {
        Self {
            name,
            path,
            kind,
            required: false,
        }
    }
}

/// The full layout of one record type for one upstream format revision.
#[derive(Debug, Clone, Copy)]
pub struct FieldTable {
    /// Record kind used in errors and logs, e.g. `"review"`.
    pub record: &'static str,
    /// Layout revision label; bump when positions change.
    pub version: &'static str,
    pub fields: &'static [FieldSpec],
}

impl FieldTable {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Num(f64),
    Int(i64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    List(Vec<String>),
}

/// Field values resolved from one blob. Absent fields have no entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRecord<'a> {
    record: &'static str,
    values: HashMap<&'static str, FieldValue>,
    blob: &'a Value,
}

impl MappedRecord<'_> {
    #[must_use]
    pub fn record(&self) -> &'static str {
        self.record
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    #[must_use]
    pub fn str(&self, name: &str) -> Option<String> {
        match self.values.get(name)? {
            FieldValue::Str(s) => Some(s.clone()),
            _ => None,
        }
    }

    #[must_use]
    pub fn num(&self, name: &str) -> Option<f64> {
        match self.values.get(name)? {
            FieldValue::Num(n) => Some(*n),
            #[allow(clippy::cast_precision_loss)]
            FieldValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.values.get(name)? {
            FieldValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Non-negative integer field; negative values read as absent.
    #[must_use]
    pub fn count(&self, name: &str) -> Option<u64> {
        self.int(name).and_then(|i| u64::try_from(i).ok())
    }

    #[must_use]
    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name)? {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn timestamp(&self, name: &str) -> Option<DateTime<Utc>> {
        match self.values.get(name)? {
            FieldValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// List field; absent reads as empty.
    #[must_use]
    pub fn list(&self, name: &str) -> Vec<String> {
        match self.values.get(name) {
            Some(FieldValue::List(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    /// String field that the record cannot exist without.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::IncompleteRecord`] when the field is absent.
    pub fn required_str(&self, name: &'static str) -> Result<String, ScraperError> {
        self.str(name).ok_or_else(|| self.incomplete(name))
    }

    fn incomplete(&self, field: &'static str) -> ScraperError {
        ScraperError::IncompleteRecord {
            record: self.record,
            field,
            blob: Box::new(self.blob.clone()),
        }
    }
}

/// Resolves every field of `table` against `blob`.
///
/// # Errors
///
/// Returns [`ScraperError::IncompleteRecord`] for the first required field
/// that is absent after coercion. Optional fields never cause an error.
pub fn map<'a>(blob: &'a Value, table: &FieldTable) -> Result<MappedRecord<'a>, ScraperError> {
    let mut values = HashMap::with_capacity(table.fields.len());
    for spec in table.fields {
        match resolve(blob, spec) {
            Some(value) => {
                values.insert(spec.name, value);
            }
            None if spec.required => {
                return Err(ScraperError::IncompleteRecord {
                    record: table.record,
                    field: spec.name,
                    blob: Box::new(blob.clone()),
                });
            }
            None => {}
        }
    }
    Ok(MappedRecord {
        record: table.record,
        values,
        blob,
    })
}

fn resolve(blob: &Value, spec: &FieldSpec) -> Option<FieldValue> {
    let leaf = walk(blob, spec.path);
    match spec.kind {
        FieldKind::Str => leaf.and_then(coerce::string).map(FieldValue::Str),
        FieldKind::Text => leaf
            .and_then(coerce::string)
            .map(|html| FieldValue::Str(coerce::html_to_text(&html))),
        FieldKind::Num => leaf.and_then(coerce::number).map(FieldValue::Num),
        FieldKind::Int => leaf.and_then(coerce::integer).map(FieldValue::Int),
        FieldKind::Bool => leaf.and_then(coerce::boolean).map(FieldValue::Bool),
        FieldKind::Micros => leaf.and_then(coerce::micros).map(FieldValue::Num),
        FieldKind::Timestamp => leaf.and_then(coerce::timestamp).map(FieldValue::Timestamp),
        FieldKind::UrlParam(param) => leaf
            .and_then(|v| coerce::url_param(v, param))
            .map(FieldValue::Str),
        FieldKind::StrList { item } => {
            let items = leaf
                .and_then(Value::as_array)
                .map(|arr| {
                    arr.iter()
                        .filter_map(|el| walk(el, item).and_then(coerce::string))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            if items.is_empty() && spec.required {
                None
            } else {
                Some(FieldValue::List(items))
            }
        }
    }
}

/// A typed record that can be built from a [`MappedRecord`].
pub trait Record: Sized {
    fn from_fields(fields: &MappedRecord<'_>) -> Result<Self, ScraperError>;
}

/// Maps `blob` with `table` and builds `R` from the result.
///
/// # Errors
///
/// Returns [`ScraperError::IncompleteRecord`] if a required field is absent.
pub fn map_record<R: Record>(blob: &Value, table: &FieldTable) -> Result<R, ScraperError> {
    R::from_fields(&map(blob, table)?)
}

/// What to do with a list element that is missing a required field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Drop the element, note it as a [`SkippedRecord`], keep its siblings.
    #[default]
    Skip,
    /// Fail the whole page.
    Abort,
}

#[derive(Debug)]
pub struct MappedItems<R> {
    pub records: Vec<R>,
    pub skipped: Vec<SkippedRecord>,
}

impl<R> Default for MappedItems<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Maps every element of the array `container` with `table`.
///
/// An absent or non-array container yields no records. Elements that fail
/// with [`ScraperError::IncompleteRecord`] are skipped or abort the call
/// depending on `strictness`.
///
/// # Errors
///
/// Returns the first [`ScraperError::IncompleteRecord`] under
/// [`Strictness::Abort`].
pub fn map_items<R: Record>(
    container: Option<&Value>,
    table: &FieldTable,
    strictness: Strictness,
) -> Result<MappedItems<R>, ScraperError> {
    let Some(items) = container.and_then(Value::as_array) else {
        return Ok(MappedItems::default());
    };

    let mut out = MappedItems {
        records: Vec::with_capacity(items.len()),
        skipped: Vec::new(),
    };
    for (index, item) in items.iter().enumerate() {
        match map_record::<R>(item, table) {
            Ok(record) => out.records.push(record),
            Err(ScraperError::IncompleteRecord { record, field, .. })
                if strictness == Strictness::Skip =>
            {
                tracing::warn!(
                    record,
                    field,
                    index,
                    table_version = table.version,
                    "skipping list element missing a required field"
                );
                out.skipped.push(SkippedRecord {
                    record,
                    field,
                    index,
                    page: 0,
                });
            }
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "mapper_test.rs"]
mod tests;
