use crate::locator::shape::{Expect, Shape};
use crate::mapper::FieldKind::{Bool, Str, Text};
use crate::mapper::Step::Index as I;
use crate::mapper::{FieldPath, FieldSpec, FieldTable};

pub const SHAPE: Shape = Shape {
    name: "data safety",
    checks: &[(&[I(1), I(2), I(137)], Expect::Array { min_len: 1 })],
};

pub const SHARED: FieldPath = &[I(1), I(2), I(137), I(4), I(0), I(0)];
pub const COLLECTED: FieldPath = &[I(1), I(2), I(137), I(4), I(1), I(0)];
pub const SECURITY: FieldPath = &[I(1), I(2), I(137), I(9), I(2)];
pub const PRIVACY_POLICY: FieldPath = &[I(1), I(2), I(99), I(0), I(5), I(2)];

/// Entries inside one category group.
pub const CATEGORY_ENTRIES: FieldPath = &[I(4)];

pub const CATEGORY_TABLE: FieldTable = FieldTable {
    record: "data safety category",
    version: "2024-05",
    fields: &[FieldSpec::optional("category", &[I(0), I(1)], Str)],
};

pub const ENTRY_TABLE: FieldTable = FieldTable {
    record: "data safety entry",
    version: "2024-05",
    fields: &[
        FieldSpec::required("data_type", &[I(0)], Str),
        FieldSpec::optional("purpose", &[I(1)], Str),
        FieldSpec::optional("optional", &[I(2)], Bool),
    ],
};

pub const PRACTICE_TABLE: FieldTable = FieldTable {
    record: "security practice",
    version: "2024-05",
    fields: &[
        FieldSpec::required("practice", &[I(1)], Str),
        FieldSpec::optional("description", &[I(2), I(1)], Text),
    ],
};
