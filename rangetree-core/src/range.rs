use std::cmp::Ordering;
use std::fmt::{self, Display};

/// A half-open genomic range `[start, end)` with an optional payload.
///
/// Inclusive of start, exclusive of end. The payload is whatever the
/// caller wants to hang off the range: a score, a depth count, a list of
/// contributing records. Ranges held by a [`RangeTree`](crate::RangeTree)
/// keep `start < end` at all times.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Range<V> {
    pub start: u32,
    pub end: u32,
    pub val: Option<V>,
}

impl<V> Range<V> {
    /// Create a range with no payload.
    pub fn new(start: u32, end: u32) -> Self {
        Range {
            start,
            end,
            val: None,
        }
    }

    /// Create a range carrying `val`.
    pub fn with_val(start: u32, end: u32, val: V) -> Self {
        Range {
            start,
            end,
            val: Some(val),
        }
    }

    /// Width of the range: `end - start`.
    #[inline]
    pub fn size(&self) -> u32 {
        self.end - self.start
    }

    /// Check whether this range overlaps `[start, end)`.
    ///
    /// Touching ranges (`self.end == start`) do not overlap.
    #[inline]
    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        self.start < end && start < self.end
    }

    /// Check whether this range fully contains `[start, end)`.
    #[inline]
    pub fn encloses(&self, start: u32, end: u32) -> bool {
        self.start <= start && end <= self.end
    }

    /// Length of the intersection with `[start, end)`, zero when disjoint.
    #[inline]
    pub fn intersect(&self, start: u32, end: u32) -> u32 {
        std::cmp::min(self.end, end)
            .checked_sub(std::cmp::max(self.start, start))
            .unwrap_or(0)
    }
}

impl<V> Display for Range<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Ordering used by the tree: two ranges are `Equal` exactly when they
/// overlap. Touching ranges order before/after each other.
///
/// This is not a total order over arbitrary ranges (overlap is not
/// transitive), which is why `Range` deliberately does not implement
/// `Ord`. It is consistent over the pairwise-disjoint ranges a tree
/// maintains.
#[inline]
pub(crate) fn range_cmp<V>(a: &Range<V>, b: &Range<V>) -> Ordering {
    if a.end <= b.start {
        Ordering::Less
    } else if b.end <= a.start {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}
