use crate::locator::shape::{Expect, Shape};
use crate::mapper::FieldKind::{Str, StrList};
use crate::mapper::Step::Index as I;
use crate::mapper::{FieldPath, FieldSpec, FieldTable};

pub const RPC_ID: &str = "xdSrCf";

pub const SHAPE: Shape = Shape {
    name: "permissions",
    checks: &[(&[], Expect::Array { min_len: 0 })],
};

/// Sections whose first element has this many slots are bare permission
/// rows without a group header.
pub const BARE_ROW_ARITY: usize = 2;
pub const BARE_ROW_GROUP: &str = "Uncategorized";
pub const BARE_ROW_NAME: FieldPath = &[I(1)];
/// Where the rows sit inside a group entry.
pub const GROUP_ROWS: FieldPath = &[I(2)];

pub const GROUP_TABLE: FieldTable = FieldTable {
    record: "permission group",
    version: "2024-05",
    fields: &[
        FieldSpec::required("group", &[I(0)], Str),
        FieldSpec::optional("permissions", &[I(2)], StrList { item: &[I(1)] }),
    ],
};
