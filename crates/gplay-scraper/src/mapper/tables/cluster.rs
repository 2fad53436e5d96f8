//! Batch RPC used to page through app clusters (search hits, similar apps).

use crate::locator::shape::{Expect, Shape};
use crate::mapper::FieldPath;
use crate::mapper::Step::Index as I;

pub const RPC_ID: &str = "qnKhOb";

/// Field-selection mask the front end sends with every cluster page request.
pub const FIELD_MASK: &[u32] = &[
    96, 27, 4, 8, 57, 30, 110, 79, 11, 16, 49, 1, 3, 9, 12, 104, 55, 56, 51, 10, 34, 77,
];

/// Requested page geometry: `[10, [10, 50]]`.
pub const PAGE_GEOMETRY: (u32, u32, u32) = (10, 10, 50);

pub const SHAPE: Shape = Shape {
    name: "cluster page",
    checks: &[(&[I(0), I(0)], Expect::Array { min_len: 1 })],
};

pub const ITEMS: FieldPath = &[I(0), I(0), I(0)];
pub const TOKEN: FieldPath = &[I(0), I(0), I(7), I(1)];
