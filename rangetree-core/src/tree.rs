//! An interval tree that coalesces overlapping ranges as they are added.
//!
//! [`RangeTree`] keeps a set of disjoint half-open ranges, ordered by
//! position. Adding a range that overlaps existing ones replaces them all
//! with a single range spanning their union, so after any sequence of
//! inserts the tree holds the minimal disjoint cover of everything added.
//! Ranges that merely touch (one ends where the next starts) are kept
//! separate.
//!
//! Each range may carry a value. How values combine when ranges merge is
//! up to the caller: [`RangeTree::add_val_merge`] takes a merge function,
//! while [`RangeTree::add_val`] refuses to silently drop a value and
//! reports [`RangeTreeError::DuplicateValue`](crate::errors::RangeTreeError)
//! instead. On top of that sit two specialized builders:
//! [`RangeTree::add_val_count`] for per-range hit counts and
//! [`RangeTree::add_to_coverage_depth`] for base-level coverage, which
//! splits ranges so every position's value is the number of intervals
//! covering it.

use crate::errors::{RangeTreeError, Result};
use crate::range::{Range, range_cmp};
use crate::rbtree::{InOrder, RbTree};

/// A self-balancing tree of disjoint half-open ranges over `u32`
/// coordinates, each optionally carrying a value of type `V`.
#[derive(Debug)]
pub struct RangeTree<V> {
    rb: RbTree<Range<V>>,
}

impl<V> RangeTree<V> {
    pub fn new() -> Self {
        RangeTree {
            rb: RbTree::new(range_cmp::<V>),
        }
    }

    /// Number of disjoint ranges currently stored.
    pub fn len(&self) -> usize {
        self.rb.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rb.is_empty()
    }

    /// Remove all ranges, keeping allocated capacity for reuse.
    pub fn clear(&mut self) {
        self.rb.clear();
    }

    /// Add `[start, end)`, merging it with any ranges it overlaps.
    ///
    /// All overlapped ranges are removed and replaced by one range
    /// spanning their union with the new range. At most one of the
    /// merged ranges may carry a value; it is kept on the result.
    /// Returns the bounds of the range that covers the insertion
    /// after merging.
    pub fn add(&mut self, start: u32, end: u32) -> Result<(u32, u32)> {
        self.merge_insert(start, end, None, None)
    }

    /// Add `[start, end)` carrying `val`, merging as [`add`](Self::add)
    /// does. If the new value would collide with a value already present
    /// on an overlapped range, the tree is left unchanged and
    /// `DuplicateValue` is returned.
    pub fn add_val(&mut self, start: u32, end: u32, val: V) -> Result<(u32, u32)> {
        self.merge_insert(start, end, Some(val), None)
    }

    /// Add `[start, end)` carrying `val`, combining colliding values
    /// with `merge`. `merge` is called once per overlapped range that
    /// carries a value, with the overlapped range's value first and the
    /// value accumulated so far second.
    pub fn add_val_merge<F>(&mut self, start: u32, end: u32, val: V, mut merge: F) -> Result<(u32, u32)>
    where
        F: FnMut(V, V) -> V,
    {
        self.merge_insert(start, end, Some(val), Some(&mut merge))
    }

    fn merge_insert(
        &mut self,
        start: u32,
        end: u32,
        val: Option<V>,
        mut merge: Option<&mut dyn FnMut(V, V) -> V>,
    ) -> Result<(u32, u32)> {
        if start >= end {
            return Err(RangeTreeError::InvalidRange { start, end });
        }
        // Without a merge function at most one value may survive.
        // Check up front so a failed add leaves the tree untouched.
        if merge.is_none() {
            let mut have_val = val.is_some();
            for existing in self.all_overlapping(start, end) {
                if existing.val.is_some() {
                    if have_val {
                        return Err(RangeTreeError::DuplicateValue {
                            start: existing.start,
                            end: existing.end,
                        });
                    }
                    have_val = true;
                }
            }
        }
        let mut merged = Range { start, end, val };
        while let Some(existing) = self.rb.remove(&merged) {
            merged.start = merged.start.min(existing.start);
            merged.end = merged.end.max(existing.end);
            merged.val = match (existing.val, merged.val.take()) {
                (Some(a), Some(b)) => match merge.as_mut() {
                    Some(f) => Some(f(a, b)),
                    // Unreachable after the check above, but losing a
                    // value silently would be worse than reporting late.
                    None => {
                        return Err(RangeTreeError::DuplicateValue {
                            start: existing.start,
                            end: existing.end,
                        });
                    }
                },
                (a, b) => a.or(b),
            };
        }
        let bounds = (merged.start, merged.end);
        let rejected = self.rb.add(merged);
        debug_assert!(rejected.is_none());
        Ok(bounds)
    }

    /// Does any stored range overlap `[start, end)`?
    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        self.rb.find(&Range::new(start, end)).is_some()
    }

    /// Look up the range whose bounds are exactly `[start, end)`.
    pub fn find(&self, start: u32, end: u32) -> Option<&Range<V>> {
        self.rb
            .find(&Range::new(start, end))
            .filter(|r| r.start == start && r.end == end)
    }

    /// Look up the stored range that entirely contains `[start, end)`.
    ///
    /// Since stored ranges are disjoint, a range containing `start` with
    /// room for the whole query is the only candidate; a range that
    /// merely overlaps the query does not qualify.
    pub fn find_enclosing(&self, start: u32, end: u32) -> Option<&Range<V>> {
        self.rb
            .find(&Range::new(start, end))
            .filter(|r| r.encloses(start, end))
    }

    /// All stored ranges overlapping `[start, end)`, in position order.
    pub fn all_overlapping(&self, start: u32, end: u32) -> Vec<&Range<V>> {
        let probe = Range::new(start, end);
        let mut hits = Vec::new();
        self.rb.traverse_range(&probe, &probe, |r| hits.push(r));
        hits
    }

    /// The overlapping range with the largest intersection with
    /// `[start, end)`. Ties keep the leftmost.
    pub fn max_overlapping(&self, start: u32, end: u32) -> Option<&Range<V>> {
        let mut best: Option<&Range<V>> = None;
        let mut best_size = 0;
        for r in self.all_overlapping(start, end) {
            let size = r.intersect(start, end);
            if size > best_size {
                best_size = size;
                best = Some(r);
            }
        }
        best
    }

    /// Total number of positions in `[start, end)` covered by stored
    /// ranges. Disjointness means no position is counted twice.
    pub fn overlap_size(&self, start: u32, end: u32) -> u64 {
        let probe = Range::new(start, end);
        let mut total = 0u64;
        self.rb
            .traverse_range(&probe, &probe, |r| total += u64::from(r.intersect(start, end)));
        total
    }

    /// Total number of positions covered by any stored range.
    pub fn total_size(&self) -> u64 {
        let mut total = 0u64;
        self.rb.traverse(|r| total += u64::from(r.size()));
        total
    }

    /// All stored ranges in ascending position order.
    pub fn list(&self) -> Vec<&Range<V>> {
        self.iter().collect()
    }

    /// Iterate over stored ranges in ascending position order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.rb.iter(),
        }
    }
}

impl<V> Default for RangeTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, V> IntoIterator for &'a RangeTree<V> {
    type Item = &'a Range<V>;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl RangeTree<u32> {
    /// Add `[start, end)` keeping a count of how many added ranges were
    /// folded into each stored range. A fresh range starts at 1; merging
    /// sums the counts of everything merged plus the new insert.
    pub fn add_val_count(&mut self, start: u32, end: u32) -> Result<(u32, u32)> {
        self.add_val_merge(start, end, 1, |a, b| a + b)
    }

    /// Add `[start, end)` to a coverage profile.
    ///
    /// Unlike [`add`](Self::add), overlapping ranges are not unioned:
    /// they are split so that after the add, each stored range's value
    /// is the exact number of added intervals covering its positions.
    /// Uncovered parts of the new interval come in at depth 1; covered
    /// parts have their depth raised by 1, fragmenting stored ranges at
    /// the boundaries. The tree stays disjoint with adjacent ranges
    /// differing in depth.
    ///
    /// Use on trees built only by this method (and
    /// [`clear`](Self::clear)); ranges added by the merging inserts do
    /// not carry depths.
    pub fn add_to_coverage_depth(&mut self, start: u32, end: u32) -> Result<()> {
        if start >= end {
            return Err(RangeTreeError::InvalidRange { start, end });
        }
        let pieces: Vec<(u32, u32, u32)> = self
            .all_overlapping(start, end)
            .into_iter()
            .map(|r| (r.start, r.end, r.val.unwrap_or(0)))
            .collect();
        let mut cur = start;
        for (piece_start, piece_end, depth) in pieces {
            if cur < piece_start {
                // Gap before this piece: new coverage at depth 1.
                self.insert_depth(cur, piece_start, 1);
                cur = piece_start;
            }
            self.rb.remove(&Range::new(piece_start, piece_end));
            if piece_start < cur {
                // Piece sticks out to the left of the added interval.
                self.insert_depth(piece_start, cur, depth);
            }
            let covered_end = piece_end.min(end);
            self.insert_depth(cur, covered_end, depth + 1);
            if end < piece_end {
                // Piece sticks out to the right.
                self.insert_depth(end, piece_end, depth);
            }
            cur = covered_end;
        }
        if cur < end {
            self.insert_depth(cur, end, 1);
        }
        Ok(())
    }

    fn insert_depth(&mut self, start: u32, end: u32, depth: u32) {
        let rejected = self.rb.add(Range::with_val(start, end, depth));
        debug_assert!(rejected.is_none());
    }
}

impl<T> RangeTree<Vec<T>> {
    /// Add `[start, end)` accumulating `val` onto the stored range's
    /// list. Merging concatenates lists, earlier inserts first.
    pub fn add_val_list(&mut self, start: u32, end: u32, val: T) -> Result<(u32, u32)> {
        self.add_val_merge(start, end, vec![val], |mut existing, acc| {
            existing.extend(acc);
            existing
        })
    }
}

/// In-order iterator over a tree's ranges.
pub struct Iter<'a, V> {
    inner: InOrder<'a, Range<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a Range<V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::rstest;

    fn bounds<V>(tree: &RangeTree<V>) -> Vec<(u32, u32)> {
        tree.iter().map(|r| (r.start, r.end)).collect()
    }

    fn depths(tree: &RangeTree<u32>) -> Vec<(u32, u32, u32)> {
        tree.iter()
            .map(|r| (r.start, r.end, r.val.unwrap_or(0)))
            .collect()
    }

    #[test]
    fn overlapping_adds_merge_into_one_range() {
        let mut tree = RangeTree::<()>::new();
        tree.add(10, 20).unwrap();
        tree.add(15, 25).unwrap();
        assert_eq!(bounds(&tree), vec![(10, 25)]);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn touching_ranges_stay_separate() {
        let mut tree = RangeTree::<()>::new();
        tree.add(10, 20).unwrap();
        tree.add(20, 30).unwrap();
        assert_eq!(bounds(&tree), vec![(10, 20), (20, 30)]);
    }

    #[test]
    fn one_add_can_swallow_many_ranges() {
        let mut tree = RangeTree::<()>::new();
        tree.add(0, 5).unwrap();
        tree.add(10, 15).unwrap();
        tree.add(20, 25).unwrap();
        tree.add(30, 35).unwrap();
        let merged = tree.add(4, 21).unwrap();
        assert_eq!(merged, (0, 25));
        assert_eq!(bounds(&tree), vec![(0, 25), (30, 35)]);
    }

    #[test]
    fn adding_the_same_range_twice_is_idempotent() {
        let mut tree = RangeTree::<()>::new();
        tree.add(10, 20).unwrap();
        tree.add(10, 20).unwrap();
        assert_eq!(bounds(&tree), vec![(10, 20)]);
    }

    #[rstest]
    #[case(5, 5)]
    #[case(10, 3)]
    #[case(u32::MAX, 0)]
    fn degenerate_ranges_are_rejected(#[case] start: u32, #[case] end: u32) {
        let mut tree = RangeTree::<()>::new();
        assert_eq!(
            tree.add(start, end),
            Err(RangeTreeError::InvalidRange { start, end })
        );
        assert!(tree.is_empty());
    }

    #[test]
    fn ranges_stay_sorted_and_disjoint() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut tree = RangeTree::<()>::new();
        for _ in 0..500 {
            let start = rng.random_range(0..10_000u32);
            let len = rng.random_range(1..200u32);
            tree.add(start, start + len).unwrap();
        }
        let list = bounds(&tree);
        for pair in list.windows(2) {
            assert!(pair[0].1 <= pair[1].0, "out of order or overlapping: {pair:?}");
        }
        assert_eq!(tree.len(), list.len());
    }

    #[test]
    fn find_is_exact() {
        let mut tree = RangeTree::<()>::new();
        tree.add(10, 20).unwrap();
        assert!(tree.find(10, 20).is_some());
        assert!(tree.find(10, 19).is_none());
        assert!(tree.find(11, 20).is_none());
        assert!(tree.find(30, 40).is_none());
    }

    #[test]
    fn find_enclosing_requires_containment() {
        let mut tree = RangeTree::<()>::new();
        tree.add(10, 20).unwrap();
        tree.add(30, 40).unwrap();
        let hit = tree.find_enclosing(12, 18).unwrap();
        assert_eq!((hit.start, hit.end), (10, 20));
        assert!(tree.find_enclosing(12, 22).is_none());
        assert!(tree.find_enclosing(10, 20).is_some());
        assert!(tree.find_enclosing(9, 20).is_none());
    }

    #[test]
    fn overlap_queries_against_linear_scan() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut tree = RangeTree::<()>::new();
        for _ in 0..300 {
            let start = rng.random_range(0..5_000u32);
            let len = rng.random_range(1..100u32);
            tree.add(start, start + len).unwrap();
        }
        let stored: Vec<(u32, u32)> = bounds(&tree);
        for _ in 0..200 {
            let qs = rng.random_range(0..5_100u32);
            let qe = qs + rng.random_range(1..300u32);
            let expected: Vec<(u32, u32)> = stored
                .iter()
                .copied()
                .filter(|&(s, e)| s < qe && qs < e)
                .collect();
            let got: Vec<(u32, u32)> = tree
                .all_overlapping(qs, qe)
                .iter()
                .map(|r| (r.start, r.end))
                .collect();
            assert_eq!(got, expected, "query [{qs}, {qe})");
            let expected_size: u64 = expected
                .iter()
                .map(|&(s, e)| u64::from(e.min(qe) - s.max(qs)))
                .sum();
            assert_eq!(tree.overlap_size(qs, qe), expected_size);
            assert_eq!(tree.overlaps(qs, qe), !expected.is_empty());
        }
    }

    #[test]
    fn max_overlapping_picks_largest_intersection() {
        let mut tree = RangeTree::<()>::new();
        tree.add(0, 10).unwrap();
        tree.add(20, 100).unwrap();
        tree.add(150, 160).unwrap();
        let best = tree.max_overlapping(5, 155).unwrap();
        assert_eq!((best.start, best.end), (20, 100));
        assert!(tree.max_overlapping(200, 300).is_none());
    }

    #[test]
    fn total_size_sums_disjoint_ranges() {
        let mut tree = RangeTree::<()>::new();
        tree.add(0, 10).unwrap();
        tree.add(20, 25).unwrap();
        assert_eq!(tree.total_size(), 15);
        tree.add(5, 22).unwrap();
        assert_eq!(tree.total_size(), 25);
    }

    #[test]
    fn value_survives_merging_with_bare_ranges() {
        let mut tree = RangeTree::new();
        tree.add_val(10, 20, "exon").unwrap();
        tree.add(15, 25).unwrap();
        let r = tree.find(10, 25).unwrap();
        assert_eq!(r.val, Some("exon"));
    }

    #[test]
    fn colliding_values_without_merge_fn_fail_and_leave_tree_intact() {
        let mut tree = RangeTree::new();
        tree.add_val(10, 20, "a").unwrap();
        let err = tree.add_val(15, 25, "b").unwrap_err();
        assert_eq!(err, RangeTreeError::DuplicateValue { start: 10, end: 20 });
        assert_eq!(bounds(&tree), vec![(10, 20)]);
        assert_eq!(tree.find(10, 20).unwrap().val, Some("a"));
    }

    #[test]
    fn bare_add_cannot_join_two_valued_ranges() {
        let mut tree = RangeTree::new();
        tree.add_val(10, 20, "a").unwrap();
        tree.add_val(30, 40, "b").unwrap();
        let err = tree.add(0, 50).unwrap_err();
        assert_eq!(err, RangeTreeError::DuplicateValue { start: 30, end: 40 });
        assert_eq!(bounds(&tree), vec![(10, 20), (30, 40)]);
    }

    #[test]
    fn add_val_merge_passes_existing_value_first() {
        let mut tree = RangeTree::new();
        tree.add_val(10, 20, String::from("old")).unwrap();
        tree.add_val_merge(15, 25, String::from("new"), |a, b| format!("{a}|{b}"))
            .unwrap();
        let r = tree.find(10, 25).unwrap();
        assert_eq!(r.val.as_deref(), Some("old|new"));
    }

    #[test]
    fn add_val_merge_folds_every_swallowed_value() {
        let mut tree = RangeTree::<u32>::new();
        tree.add_val(10, 20, 2).unwrap();
        tree.add_val(30, 40, 3).unwrap();
        tree.add_val_merge(15, 35, 5, |a, b| a + b).unwrap();
        let r = tree.find(10, 40).unwrap();
        assert_eq!(r.val, Some(10));
    }

    #[test]
    fn add_val_count_tracks_merged_inserts() {
        let mut tree = RangeTree::<u32>::new();
        tree.add_val_count(10, 20).unwrap();
        tree.add_val_count(15, 25).unwrap();
        tree.add_val_count(18, 30).unwrap();
        tree.add_val_count(100, 110).unwrap();
        assert_eq!(depths(&tree), vec![(10, 30, 3), (100, 110, 1)]);
    }

    #[test]
    fn add_val_list_keeps_insert_order() {
        let mut tree = RangeTree::<Vec<&str>>::new();
        tree.add_val_list(10, 20, "first").unwrap();
        tree.add_val_list(15, 25, "second").unwrap();
        tree.add_val_list(5, 12, "third").unwrap();
        let r = tree.find(5, 25).unwrap();
        assert_eq!(r.val.as_deref(), Some(&["first", "second", "third"][..]));
    }

    #[test]
    fn coverage_depth_splits_at_boundaries() {
        let mut tree = RangeTree::<u32>::new();
        tree.add_to_coverage_depth(0, 10).unwrap();
        tree.add_to_coverage_depth(5, 15).unwrap();
        tree.add_to_coverage_depth(8, 12).unwrap();
        assert_eq!(
            depths(&tree),
            vec![(0, 5, 1), (5, 8, 2), (8, 10, 3), (10, 12, 2), (12, 15, 1)]
        );
    }

    #[test]
    fn coverage_depth_of_disjoint_adds_is_one() {
        let mut tree = RangeTree::<u32>::new();
        tree.add_to_coverage_depth(10, 20).unwrap();
        tree.add_to_coverage_depth(30, 40).unwrap();
        assert_eq!(depths(&tree), vec![(10, 20, 1), (30, 40, 1)]);
    }

    #[test]
    fn coverage_depth_matches_per_position_counts() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut tree = RangeTree::<u32>::new();
        let mut expected = [0u32; 512];
        for _ in 0..120 {
            let start = rng.random_range(0..500u32);
            let end = start + rng.random_range(1..12u32);
            tree.add_to_coverage_depth(start, end).unwrap();
            for slot in &mut expected[start as usize..end as usize] {
                *slot += 1;
            }
        }
        let mut got = [0u32; 512];
        for r in tree.iter() {
            let depth = r.val.unwrap();
            assert!(depth > 0);
            for slot in &mut got[r.start as usize..r.end as usize] {
                assert_eq!(*slot, 0, "ranges overlap at [{}, {})", r.start, r.end);
                *slot = depth;
            }
        }
        assert_eq!(got, expected);
    }

    #[test]
    fn clear_empties_the_tree() {
        let mut tree = RangeTree::<()>::new();
        tree.add(10, 20).unwrap();
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.total_size(), 0);
        tree.add(1, 2).unwrap();
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn queries_on_empty_tree() {
        let tree = RangeTree::<()>::new();
        assert!(!tree.overlaps(0, 100));
        assert!(tree.find(0, 100).is_none());
        assert!(tree.find_enclosing(0, 100).is_none());
        assert!(tree.all_overlapping(0, 100).is_empty());
        assert_eq!(tree.overlap_size(0, 100), 0);
        assert!(tree.list().is_empty());
    }
}
