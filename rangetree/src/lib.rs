//! Genomic range trees: interval sets that merge as you build them.
//!
//! This is the umbrella crate for the rangetree project. Each piece of
//! functionality lives in its own crate and is re-exported here behind a
//! feature flag, on by default:
//!
//! - [`core`]: the merging interval tree, valued ranges, coverage
//!   profiles, and per-chromosome genome maps
//! - [`io`]: the binary (start, size) serialization format, set algebra
//!   over serialized arrays, and BED input/output

#[cfg(feature = "core")]
#[doc(inline)]
pub use rangetree_core as core;

#[cfg(feature = "io")]
#[doc(inline)]
pub use rangetree_io as io;
