//! Structural discriminators used to pick the right blob out of a page.

use serde_json::Value;

use crate::mapper::{walk, FieldPath};

/// What must be found at one position for a blob to qualify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    Array { min_len: usize },
    String,
    Number,
    /// Any non-null value.
    Present,
}

impl Expect {
    fn holds(self, value: Option<&Value>) -> bool {
        match (self, value) {
            (Self::Array { min_len }, Some(Value::Array(items))) => items.len() >= min_len,
            (Self::String, Some(Value::String(_))) | (Self::Number, Some(Value::Number(_))) => {
                true
            }
            (Self::Present, Some(_)) => true,
            _ => false,
        }
    }
}

/// A named set of positional checks; a blob matches when all of them hold.
#[derive(Debug, Clone, Copy)]
pub struct Shape {
    pub name: &'static str,
    pub checks: &'static [(FieldPath, Expect)],
}

impl Shape {
    #[must_use]
    pub fn matches(&self, blob: &Value) -> bool {
        self.checks
            .iter()
            .all(|(path, expect)| expect.holds(walk(blob, path)))
    }
}
