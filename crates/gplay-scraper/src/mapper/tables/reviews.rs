use crate::locator::shape::{Expect, Shape};
use crate::mapper::FieldKind::{Int, Str, Timestamp};
use crate::mapper::Step::Index as I;
use crate::mapper::{FieldPath, FieldSpec, FieldTable};

pub const RPC_ID: &str = "UsvDTd";

pub const SHAPE: Shape = Shape {
    name: "reviews",
    checks: &[(&[], Expect::Array { min_len: 1 })],
};

pub const ITEMS: FieldPath = &[I(0)];
pub const TOKEN: FieldPath = &[I(1), I(1)];

pub const TABLE: FieldTable = FieldTable {
    record: "review",
    version: "2024-05",
    fields: &[
        FieldSpec::required("review_id", &[I(0)], Str),
        FieldSpec::optional("user_name", &[I(1), I(0)], Str),
        FieldSpec::optional("user_image", &[I(1), I(1), I(3), I(2)], Str),
        FieldSpec::optional("content", &[I(4)], Str),
        FieldSpec::optional("score", &[I(2)], Int),
        FieldSpec::optional("thumbs_up_count", &[I(6)], Int),
        FieldSpec::optional("review_created_version", &[I(10)], Str),
        FieldSpec::optional("at", &[I(5), I(0)], Timestamp),
        FieldSpec::optional("reply_content", &[I(7), I(1)], Str),
        FieldSpec::optional("replied_at", &[I(7), I(2), I(0)], Timestamp),
        FieldSpec::optional("app_version", &[I(10)], Str),
    ],
};
