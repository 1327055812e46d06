//! # billsplit-store
//!
//! Document storage for bills, backed by SQLite.
//!
//! Each bill is one row. The nested collections (users, tags, line items,
//! proportional charges) live together in a JSON document column and the
//! images in a second JSON column, so a bill can be read without paying
//! for its image payloads. Every mutation is a read-modify-write of a
//! single row inside an immediate transaction, which makes each operation
//! atomic per bill.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed helpers for every operation.

pub mod bills;
pub mod charges;
pub mod database;
pub mod images;
pub mod line_items;
pub mod members;
pub mod migrations;

mod document;
mod error;

pub use database::Database;
pub use error::{Result, StoreError};
