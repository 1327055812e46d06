//! Session operations.
//!
//! Each sub-module groups related operations by domain. Fetches put the
//! resource in `Loading` first; mutations move the cached resource straight
//! to its new loaded value, so in-place edits never flash a loading state.
//! Unexpected failures are reported through the session's toaster.

pub mod bills;
pub mod charges;
pub mod images;
pub mod line_items;
pub mod members;
