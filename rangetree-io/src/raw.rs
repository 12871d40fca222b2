//! The on-disk shape of a range.

/// A range as stored on disk: start position and size rather than
/// start and end.
///
/// Eight bytes per record, no padding. Arrays of these are what the
/// binary range-set files hold, sorted by start with no overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRange {
    pub start: u32,
    pub size: u32,
}

impl RawRange {
    pub fn new(start: u32, size: u32) -> Self {
        RawRange { start, size }
    }

    /// Build a record from half-open `[start, end)` bounds.
    pub fn from_bounds(start: u32, end: u32) -> Self {
        RawRange {
            start,
            size: end - start,
        }
    }

    /// The half-open end position. Wraps on overflow, so corrupt
    /// records decode to garbage bounds rather than failing here.
    pub fn end(&self) -> u32 {
        self.start.wrapping_add(self.size)
    }
}

/// Total positions covered by an array of records, assuming they are
/// disjoint.
pub fn array_size(ranges: &[RawRange]) -> u64 {
    ranges.iter().map(|r| u64::from(r.size)).sum()
}
