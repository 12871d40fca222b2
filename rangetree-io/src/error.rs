use std::io;

use rangetree_core::RangeTreeError;
use thiserror::Error;

/// Error type for rangetree-io operations.
#[derive(Error, Debug)]
pub enum RangeFileError {
    /// IO error occurred during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Valued records can only be loaded into an empty tree.
    #[error("tree already contains {0} ranges; use read_nodes_with_val_merge")]
    AlreadyPopulated(usize),

    /// A range without a value was written where every range needs one.
    #[error("range [{start}, {end}) carries no value")]
    MissingValue { start: u32, end: u32 },

    /// Records that must be disjoint overlap.
    #[error("overlapping records on {chrom}: record starting at {start} before previous end {prev_end}")]
    OverlappingRecords {
        chrom: String,
        prev_end: u32,
        start: u32,
    },

    /// An operation on the underlying range tree failed.
    #[error(transparent)]
    Tree(#[from] RangeTreeError),
}

/// Result type alias for rangetree-io operations.
pub type Result<T> = std::result::Result<T, RangeFileError>;
