/// Application name
pub const APP_NAME: &str = "Bill Split";

/// Default HTTP API port (server)
pub const DEFAULT_API_PORT: u16 = 8000;

/// Maximum length of any user-facing name (bill, user, tag, item, charge)
pub const MAX_NAME_LEN: usize = 256;

/// Largest accepted line item price, in major units. Keeps every cent
/// total of a bill well inside `i64`.
pub const MAX_PRICE: f64 = 1_000_000_000.0;

/// Maximum decoded size of a single uploaded image (10 MiB)
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Default cap on the number of images attached to one bill
pub const DEFAULT_MAX_IMAGES_PER_BILL: usize = 32;

/// Slack allowed when checking that split proportions do not exceed 1.0
pub const PROPORTION_EPSILON: f64 = 1e-9;

/// Minor currency units per major unit (cents)
pub const MINOR_UNITS: f64 = 100.0;

/// Delay before a line item edit is sent to the server
pub const EDIT_DEBOUNCE_MS: u64 = 500;

/// Default lifetime of an auto-hiding toast
pub const TOAST_AUTO_HIDE_MS: u64 = 5_000;
