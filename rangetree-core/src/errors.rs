use thiserror::Error;

/// Error type for range tree operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeTreeError {
    /// An insertion was attempted with `start >= end`.
    #[error("invalid range: start ({start}) must be less than end ({end})")]
    InvalidRange { start: u32, end: u32 },

    /// A merge collided with an existing value and no merge function was
    /// supplied to combine the two.
    #[error("range [{start}, {end}) already carries a value and no merge function was supplied")]
    DuplicateValue { start: u32, end: u32 },
}

/// Result type alias for rangetree-core operations.
pub type Result<T> = std::result::Result<T, RangeTreeError>;
