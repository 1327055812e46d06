use thiserror::Error;

/// Errors produced by the store layer.
///
/// A missing bill or nested entity is not an error: operations report it
/// as `Ok(None)`.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// UUID parsing error on a stored ID.
    #[error("UUID error: {0}")]
    Uuid(#[from] uuid::Error),

    /// A stored document could not be (de)serialized.
    #[error("Document error: {0}")]
    Document(#[from] serde_json::Error),

    /// An ID that must be unique within its list is not.
    #[error("Integrity violation: {0}")]
    Integrity(String),

    /// A write referenced a user or tag the bill does not have.
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Appending would exceed the per-bill image cap.
    #[error("Bill would hold {count} images (max {limit})")]
    ImageLimit { count: usize, limit: usize },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
