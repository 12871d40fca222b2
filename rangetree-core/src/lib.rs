//! Self-balancing interval trees that merge overlapping ranges on insert.
//!
//! This crate provides the core data structures for collecting genomic
//! intervals into a minimal set of disjoint ranges. It is part of the
//! [rangetree](https://github.com/databio/rangetree) project, which provides
//! tools for building, querying, and serializing genomic range sets in Rust.
//!
//! ## Features
//!
//! - **Merge on insert**: adding a range that overlaps existing ranges
//!   collapses them all into one spanning range, so the tree always holds
//!   the minimal disjoint cover of everything added
//! - **Value association**: each range may carry a value, with caller-chosen
//!   merge semantics when ranges coalesce
//! - **Coverage profiles**: a splitting insert mode that tracks how many
//!   intervals cover each position
//! - **Genome-wide maps**: one tree per chromosome under a single handle
//!
//! ## Quick Start
//!
//! ```rust
//! use rangetree_core::RangeTree;
//!
//! let mut tree = RangeTree::<()>::new();
//!
//! // overlapping adds merge into one range
//! tree.add(100, 200)?;
//! tree.add(150, 300)?;
//! assert_eq!(tree.len(), 1);
//! assert!(tree.find(100, 300).is_some());
//!
//! // touching ranges stay separate
//! tree.add(300, 400)?;
//! assert_eq!(tree.len(), 2);
//!
//! // query coverage of a window
//! assert_eq!(tree.overlap_size(250, 350), 100);
//! # Ok::<(), rangetree_core::RangeTreeError>(())
//! ```
//!
//! The trees are built on a red-black tree specialized for interval keys:
//! the ordering treats any two overlapping ranges as equal, which is what
//! lets insertion find every range the new one must absorb. The underlying
//! [`RbTree`] is exposed for callers that need an ordered collection with
//! a custom comparator.

pub mod errors;
pub mod genome;
pub mod range;
pub mod rbtree;
pub mod tree;

pub use self::errors::{RangeTreeError, Result};
pub use self::genome::GenomeRangeTree;
pub use self::range::Range;
pub use self::rbtree::RbTree;
pub use self::tree::RangeTree;
