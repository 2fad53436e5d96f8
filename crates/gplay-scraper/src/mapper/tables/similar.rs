use crate::locator::shape::{Expect, Shape};
use crate::mapper::FieldKind::{Micros, Num, Str, Text};
use crate::mapper::Step::Index as I;
use crate::mapper::{FieldPath, FieldSpec, FieldTable};

/// Details-page island holding the related-app clusters under `[1][1]`.
pub const SHAPE: Shape = Shape {
    name: "similar apps",
    checks: &[(&[I(1), I(1), I(0), I(21)], Expect::Array { min_len: 1 })],
};

pub const CLUSTERS: FieldPath = &[I(1), I(1)];
pub const CLUSTER_ITEMS: FieldPath = &[I(21), I(0)];
pub const CLUSTER_TOKEN: FieldPath = &[I(21), I(1), I(3), I(1)];

pub const TABLE: FieldTable = FieldTable {
    record: "similar app",
    version: "2024-05",
    fields: &[
        FieldSpec::required("app_id", &[I(0), I(0)], Str),
        FieldSpec::optional("title", &[I(3)], Str),
        FieldSpec::optional("icon", &[I(1), I(3), I(2)], Str),
        FieldSpec::optional("developer", &[I(14)], Str),
        FieldSpec::optional("score", &[I(4), I(1)], Num),
        FieldSpec::optional("price", &[I(8), I(1), I(0), I(0)], Micros),
        FieldSpec::optional("currency", &[I(8), I(1), I(0), I(1)], Str),
        FieldSpec::optional("description", &[I(13), I(1)], Text),
    ],
};
