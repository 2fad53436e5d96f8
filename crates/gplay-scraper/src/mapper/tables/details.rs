use crate::locator::shape::{Expect, Shape};
use crate::mapper::FieldKind::{Bool, Int, Micros, Num, Str, StrList, Text, Timestamp, UrlParam};
use crate::mapper::Step::Index as I;
use crate::mapper::{FieldSpec, FieldTable};

/// The details island carries the listing under `[1][2]`, title first.
pub const SHAPE: Shape = Shape {
    name: "app details",
    checks: &[
        (&[I(1), I(2)], Expect::Array { min_len: 1 }),
        (&[I(1), I(2), I(0), I(0)], Expect::String),
    ],
};

pub const TABLE: FieldTable = FieldTable {
    record: "app details",
    version: "2024-05",
    fields: &[
        FieldSpec::required("app_id", &[I(1), I(2), I(77), I(0)], Str),
        FieldSpec::required("title", &[I(1), I(2), I(0), I(0)], Str),
        FieldSpec::optional("description", &[I(1), I(2), I(72), I(0), I(1)], Text),
        FieldSpec::optional("description_html", &[I(1), I(2), I(72), I(0), I(1)], Str),
        FieldSpec::optional("summary", &[I(1), I(2), I(73), I(0), I(1)], Str),
        FieldSpec::optional("installs", &[I(1), I(2), I(13), I(0)], Str),
        FieldSpec::optional("min_installs", &[I(1), I(2), I(13), I(1)], Int),
        FieldSpec::optional("real_installs", &[I(1), I(2), I(13), I(2)], Int),
        FieldSpec::optional("score", &[I(1), I(2), I(51), I(0), I(1)], Num),
        FieldSpec::optional("ratings", &[I(1), I(2), I(51), I(2), I(1)], Int),
        FieldSpec::optional("reviews", &[I(1), I(2), I(51), I(3), I(1)], Int),
        FieldSpec::optional("histogram_1", &[I(1), I(2), I(51), I(1), I(1), I(1)], Int),
        FieldSpec::optional("histogram_2", &[I(1), I(2), I(51), I(1), I(2), I(1)], Int),
        FieldSpec::optional("histogram_3", &[I(1), I(2), I(51), I(1), I(3), I(1)], Int),
        FieldSpec::optional("histogram_4", &[I(1), I(2), I(51), I(1), I(4), I(1)], Int),
        FieldSpec::optional("histogram_5", &[I(1), I(2), I(51), I(1), I(5), I(1)], Int),
        FieldSpec::optional(
            "price",
            &[I(1), I(2), I(57), I(0), I(0), I(0), I(0), I(1), I(0), I(0)],
            Micros,
        ),
        FieldSpec::optional(
            "currency",
            &[I(1), I(2), I(57), I(0), I(0), I(0), I(0), I(1), I(0), I(1)],
            Str,
        ),
        FieldSpec::optional("iap_range", &[I(1), I(2), I(19), I(0)], Str),
        FieldSpec::optional("developer", &[I(1), I(2), I(68), I(0)], Str),
        FieldSpec::optional(
            "developer_id",
            &[I(1), I(2), I(68), I(1), I(4), I(2)],
            UrlParam("id"),
        ),
        FieldSpec::optional("developer_email", &[I(1), I(2), I(69), I(1), I(0)], Str),
        FieldSpec::optional(
            "developer_website",
            &[I(1), I(2), I(69), I(0), I(5), I(2)],
            Str,
        ),
        FieldSpec::optional("developer_address", &[I(1), I(2), I(69), I(2), I(0)], Str),
        FieldSpec::optional("privacy_policy", &[I(1), I(2), I(99), I(0), I(5), I(2)], Str),
        FieldSpec::optional("genre", &[I(1), I(2), I(79), I(0), I(0), I(0)], Str),
        FieldSpec::optional("genre_id", &[I(1), I(2), I(79), I(0), I(0), I(2)], Str),
        FieldSpec::optional("icon", &[I(1), I(2), I(95), I(0), I(3), I(2)], Str),
        FieldSpec::optional("header_image", &[I(1), I(2), I(96), I(0), I(3), I(2)], Str),
        FieldSpec::optional(
            "screenshots",
            &[I(1), I(2), I(78), I(0)],
            StrList { item: &[I(3), I(2)] },
        ),
        FieldSpec::optional("video", &[I(1), I(2), I(100), I(0), I(0), I(3), I(2)], Str),
        FieldSpec::optional(
            "video_image",
            &[I(1), I(2), I(100), I(1), I(0), I(3), I(2)],
            Str,
        ),
        FieldSpec::optional("content_rating", &[I(1), I(2), I(9), I(0)], Str),
        FieldSpec::optional(
            "content_rating_description",
            &[I(1), I(2), I(9), I(2), I(1)],
            Str,
        ),
        FieldSpec::optional("ad_supported", &[I(1), I(2), I(48)], Bool),
        FieldSpec::optional("released", &[I(1), I(2), I(10), I(0)], Str),
        FieldSpec::optional("updated", &[I(1), I(2), I(145), I(0), I(1), I(0)], Timestamp),
        FieldSpec::optional("version", &[I(1), I(2), I(140), I(0), I(0), I(0)], Str),
        FieldSpec::optional(
            "android_version",
            &[I(1), I(2), I(140), I(1), I(1), I(0), I(0), I(1)],
            Str,
        ),
        FieldSpec::optional("recent_changes", &[I(1), I(2), I(144), I(1), I(1)], Text),
    ],
};
