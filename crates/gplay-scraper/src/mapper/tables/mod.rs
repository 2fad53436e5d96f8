//! Upstream layout tables, one module per page family.
//!
//! Every index the engine knows about lives in this directory: blob shapes
//! used to pick the right data island, container and token paths, and the
//! per-record field tables. When the store reshuffles a page, the fix goes
//! here together with a refreshed fixture.

pub mod cluster;
pub mod data_safety;
pub mod details;
pub mod permissions;
pub mod reviews;
pub mod search;
pub mod similar;
