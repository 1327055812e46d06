use thiserror::Error;

/// Structural problems with a procedure input. Raised before any store
/// access so a rejected request never leaves a partial mutation behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Malformed input: {0}")]
    Malformed(String),

    #[error("{field} must not be blank")]
    BlankName { field: &'static str },

    #[error("{field} is {len} characters (max {max})")]
    NameTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("Price must be a finite, non-negative number, got {0}")]
    InvalidPrice(f64),

    #[error("Price {price} exceeds the maximum of {max}")]
    PriceTooLarge { price: f64, max: f64 },

    #[error("Proportion must be within [0, 1], got {0}")]
    InvalidProportion(f64),

    #[error("User {0} appears more than once in the split")]
    DuplicateSplitUser(String),

    #[error("Split ID {0} appears more than once")]
    DuplicateSplitId(String),

    #[error("Tag {0} appears more than once")]
    DuplicateTag(String),

    #[error("Split proportions sum to {0}, which exceeds 1")]
    SplitExceedsWhole(f64),

    #[error("Unsupported MIME type: {0}")]
    InvalidMimeType(String),

    #[error("Image data is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("Image data is empty")]
    EmptyImage,

    #[error("Image too large: {size} bytes (max {max})")]
    ImageTooLarge { size: usize, max: usize },
}
