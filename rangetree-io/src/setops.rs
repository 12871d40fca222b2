//! Union and intersection over serialized range arrays.
//!
//! These operate directly on sorted arrays of (start, size) records,
//! the way range sets sit on disk, without building trees. Both
//! inputs must be sorted by start and internally non-overlapping;
//! that is what tree serialization produces. Touching records are
//! legal input and pass through union unmerged, mirroring how the
//! trees keep touching ranges separate.
//!
//! The iterators walk both inputs once, so whole-genome arrays
//! combine in linear time and constant memory. The array functions
//! collect the result, and [`write_union`] streams it record by
//! record to a writer.

use std::io::Write;
use std::slice;

use crate::codec::write_one;
use crate::error::Result;
use crate::raw::RawRange;

/// Merging iterator over the union of two sorted record arrays.
///
/// A record overlapping records from the other side absorbs them,
/// extending left as needed; the merged record is emitted once
/// nothing further overlaps it.
pub struct UnionIter<'a> {
    r1: slice::Iter<'a, RawRange>,
    r2: slice::Iter<'a, RawRange>,
    head1: Option<RawRange>,
    head2: Option<RawRange>,
}

impl<'a> UnionIter<'a> {
    pub fn new(r1: &'a [RawRange], r2: &'a [RawRange]) -> Self {
        let mut r1 = r1.iter();
        let mut r2 = r2.iter();
        let head1 = r1.next().copied();
        let head2 = r2.next().copied();
        UnionIter { r1, r2, head1, head2 }
    }
}

impl Iterator for UnionIter<'_> {
    type Item = RawRange;

    fn next(&mut self) -> Option<RawRange> {
        loop {
            let (h1, h2) = match (self.head1, self.head2) {
                (Some(h1), Some(h2)) => (h1, h2),
                (Some(h1), None) => {
                    self.head1 = self.r1.next().copied();
                    return Some(h1);
                }
                (None, Some(h2)) => {
                    self.head2 = self.r2.next().copied();
                    return Some(h2);
                }
                (None, None) => return None,
            };
            let end1 = h1.end();
            let end2 = h2.end();
            if end1 <= h2.start {
                // h1 is wholly upstream.
                self.head1 = self.r1.next().copied();
                return Some(h1);
            } else if end2 <= h1.start {
                self.head2 = self.r2.next().copied();
                return Some(h2);
            } else if end1 > end2 {
                // h1 ends rightmost: absorb h2, extending left if need
                // be. Whatever follows h2 may still overlap h1.
                if h2.start < h1.start {
                    self.head1 = Some(RawRange {
                        start: h2.start,
                        size: end1.wrapping_sub(h2.start),
                    });
                }
                self.head2 = self.r2.next().copied();
            } else if end2 > end1 {
                if h1.start < h2.start {
                    self.head2 = Some(RawRange {
                        start: h1.start,
                        size: end2.wrapping_sub(h1.start),
                    });
                }
                self.head1 = self.r1.next().copied();
            } else {
                // Equal ends: the leftmost-starting record covers both.
                self.head1 = self.r1.next().copied();
                self.head2 = self.r2.next().copied();
                return Some(if h1.start <= h2.start { h1 } else { h2 });
            }
        }
    }
}

/// Iterator over the intersection of two sorted record arrays.
///
/// Emits one record per overlapping pair, clipped to the overlap;
/// the side ending first moves on, so a long record intersects each
/// record it spans.
pub struct IntersectionIter<'a> {
    r1: slice::Iter<'a, RawRange>,
    r2: slice::Iter<'a, RawRange>,
    head1: Option<RawRange>,
    head2: Option<RawRange>,
}

impl<'a> IntersectionIter<'a> {
    pub fn new(r1: &'a [RawRange], r2: &'a [RawRange]) -> Self {
        let mut r1 = r1.iter();
        let mut r2 = r2.iter();
        let head1 = r1.next().copied();
        let head2 = r2.next().copied();
        IntersectionIter { r1, r2, head1, head2 }
    }
}

impl Iterator for IntersectionIter<'_> {
    type Item = RawRange;

    fn next(&mut self) -> Option<RawRange> {
        loop {
            let (h1, h2) = match (self.head1, self.head2) {
                (Some(h1), Some(h2)) => (h1, h2),
                _ => return None,
            };
            let end1 = h1.end();
            let end2 = h2.end();
            if end1 <= h2.start {
                self.head1 = self.r1.next().copied();
            } else if end2 <= h1.start {
                self.head2 = self.r2.next().copied();
            } else {
                let start = h1.start.max(h2.start);
                let end = end1.min(end2);
                if end1 > end2 {
                    self.head2 = self.r2.next().copied();
                } else if end2 > end1 {
                    self.head1 = self.r1.next().copied();
                } else {
                    self.head1 = self.r1.next().copied();
                    self.head2 = self.r2.next().copied();
                }
                return Some(RawRange {
                    start,
                    size: end.wrapping_sub(start),
                });
            }
        }
    }
}

/// Union of two record arrays. Returns the merged records and their
/// total size.
///
/// With `save_mem`, the result is shrunk when it came out under half
/// the up-front estimate, for callers holding many results at once.
pub fn union_array(r1: &[RawRange], r2: &[RawRange], save_mem: bool) -> (Vec<RawRange>, u64) {
    let cap = r1.len() + r2.len();
    let mut out = Vec::with_capacity(cap);
    let mut size = 0u64;
    for r in UnionIter::new(r1, r2) {
        size += u64::from(r.size);
        out.push(r);
    }
    if save_mem && out.len() < cap / 2 {
        out.shrink_to_fit();
    }
    (out, size)
}

/// Intersection of two record arrays. Returns the overlap records and
/// their total size.
pub fn intersection_array(
    r1: &[RawRange],
    r2: &[RawRange],
    save_mem: bool,
) -> (Vec<RawRange>, u64) {
    // Estimate only: heavily interleaved inputs can emit more than
    // max(n1, n2) records, and the vec grows to hold them.
    let cap = r1.len().max(r2.len());
    let mut out = Vec::with_capacity(cap);
    let mut size = 0u64;
    for r in IntersectionIter::new(r1, r2) {
        size += u64::from(r.size);
        out.push(r);
    }
    if save_mem && out.len() < cap / 2 {
        out.shrink_to_fit();
    }
    (out, size)
}

/// Total size of the union without materializing it.
pub fn union_size(r1: &[RawRange], r2: &[RawRange]) -> u64 {
    UnionIter::new(r1, r2).map(|r| u64::from(r.size)).sum()
}

/// Total size of the intersection without materializing it.
pub fn intersection_size(r1: &[RawRange], r2: &[RawRange]) -> u64 {
    IntersectionIter::new(r1, r2)
        .map(|r| u64::from(r.size))
        .sum()
}

/// Stream the union of two record arrays to `writer`, one record at a
/// time. Returns the number of records written and their total size.
pub fn write_union<W: Write>(
    writer: &mut W,
    r1: &[RawRange],
    r2: &[RawRange],
) -> Result<(usize, u64)> {
    let mut n = 0usize;
    let mut size = 0u64;
    for r in UnionIter::new(r1, r2) {
        write_one(writer, r)?;
        n += 1;
        size += u64::from(r.size);
    }
    Ok((n, size))
}
