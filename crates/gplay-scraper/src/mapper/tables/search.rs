use crate::locator::shape::{Expect, Shape};
use crate::mapper::FieldKind::{Micros, Num, Str, StrList, Text};
use crate::mapper::Step::Index as I;
use crate::mapper::{FieldPath, FieldSpec, FieldTable};

/// Search results sit in one of the sections under `[0][1]`; which one
/// depends on locale, so sections are tried in order.
pub const SHAPE: Shape = Shape {
    name: "search results",
    checks: &[(&[I(0), I(1)], Expect::Array { min_len: 1 })],
};

pub const SECTIONS: FieldPath = &[I(0), I(1)];
pub const SECTION_ITEMS: FieldPath = &[I(22), I(0)];
pub const SECTION_TOKEN: FieldPath = &[I(22), I(1), I(3), I(1)];

pub const TABLE: FieldTable = FieldTable {
    record: "search result",
    version: "2024-05",
    fields: &[
        FieldSpec::required("app_id", &[I(0), I(0), I(0)], Str),
        FieldSpec::required("title", &[I(0), I(3)], Str),
        FieldSpec::optional("icon", &[I(0), I(1), I(3), I(2)], Str),
        FieldSpec::optional("screenshots", &[I(0), I(2)], StrList { item: &[I(3), I(2)] }),
        FieldSpec::optional("score", &[I(0), I(4), I(0)], Num),
        FieldSpec::optional("genre", &[I(0), I(5)], Str),
        FieldSpec::optional("price", &[I(0), I(8), I(1), I(0), I(0)], Micros),
        FieldSpec::optional("currency", &[I(0), I(8), I(1), I(0), I(1)], Str),
        FieldSpec::optional("video", &[I(0), I(12), I(0), I(0), I(3), I(2)], Str),
        FieldSpec::optional("video_image", &[I(0), I(12), I(0), I(3), I(3), I(2)], Str),
        FieldSpec::optional("description", &[I(0), I(13), I(1)], Text),
        FieldSpec::optional("description_html", &[I(0), I(13), I(1)], Str),
        FieldSpec::optional("developer", &[I(0), I(14)], Str),
        FieldSpec::optional("installs", &[I(0), I(15)], Str),
    ],
};
