//! # Serialization and set algebra for range trees.
//!
//! This crate reads and writes the binary (start, size) range-set format
//! and combines serialized range arrays without rebuilding trees. Range
//! sets written by one machine load on machines of either byte order via
//! the `is_swapped` flag, the arrays union and intersect in a single
//! linear pass, and results can go back out as binary records or BED
//! lines. BED files (plain or gzipped) load directly into the
//! per-chromosome trees from `rangetree-core`.
//!
pub mod bed;
pub mod codec;
pub mod error;
pub mod raw;
pub mod setops;

// re-expose core functions
pub use bed::*;
pub use codec::*;
pub use error::*;
pub use raw::*;
pub use setops::*;
