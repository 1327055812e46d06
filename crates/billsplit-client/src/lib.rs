//! # billsplit-client
//!
//! Headless client for the bill split API: an RPC client, a reducer-style
//! cache of fetched bills, the debounced line item editor and the toast
//! channel a UI renders from.

pub mod commands;
pub mod debounce;
pub mod error;
pub mod resource;
pub mod rpc;
pub mod session;
pub mod state;
pub mod toasts;

#[cfg(test)]
mod testing;

pub use error::ClientError;
pub use resource::{Fetched, Resource};
pub use session::BillSession;

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber for an embedding application.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("billsplit_client=debug,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
