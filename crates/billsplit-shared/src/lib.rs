//! # billsplit-shared
//!
//! Types shared by every part of the bill splitter: the bill aggregate and
//! its nested entities, the RPC procedure catalogue with its input/output
//! shapes, structural input validation, and the per-user split calculation.

pub mod constants;
pub mod error;
pub mod rpc;
pub mod split;
pub mod types;
pub mod validate;

pub use error::ValidationError;
pub use types::*;
