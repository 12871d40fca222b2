//! A collection of range trees keyed by chromosome name.

use std::collections::HashMap;

use crate::errors::Result;
use crate::range::Range;
use crate::tree::RangeTree;

/// One [`RangeTree`] per chromosome, created on demand.
///
/// Ranges on different chromosomes never interact: adds merge only
/// within a chromosome, and queries against a chromosome that was
/// never added to come back empty.
#[derive(Debug)]
pub struct GenomeRangeTree<V> {
    chroms: HashMap<String, RangeTree<V>>,
}

impl<V> GenomeRangeTree<V> {
    pub fn new() -> Self {
        GenomeRangeTree {
            chroms: HashMap::new(),
        }
    }

    /// Number of chromosomes with a tree, empty trees included.
    pub fn chrom_count(&self) -> usize {
        self.chroms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chroms.is_empty()
    }

    /// The tree for `chrom`, if one was ever created.
    pub fn get(&self, chrom: &str) -> Option<&RangeTree<V>> {
        self.chroms.get(chrom)
    }

    /// The tree for `chrom`, creating an empty one if needed.
    pub fn find_or_add(&mut self, chrom: &str) -> &mut RangeTree<V> {
        self.chroms.entry(chrom.to_string()).or_default()
    }

    /// Add `[start, end)` on `chrom`, merging overlaps as
    /// [`RangeTree::add`] does.
    pub fn add(&mut self, chrom: &str, start: u32, end: u32) -> Result<(u32, u32)> {
        self.find_or_add(chrom).add(start, end)
    }

    /// Add `[start, end)` on `chrom` carrying `val`, merging as
    /// [`RangeTree::add_val`] does.
    pub fn add_val(&mut self, chrom: &str, start: u32, end: u32, val: V) -> Result<(u32, u32)> {
        self.find_or_add(chrom).add_val(start, end, val)
    }

    /// Does any range on `chrom` overlap `[start, end)`?
    pub fn overlaps(&self, chrom: &str, start: u32, end: u32) -> bool {
        self.chroms
            .get(chrom)
            .is_some_and(|t| t.overlaps(start, end))
    }

    /// The range on `chrom` entirely containing `[start, end)`, if any.
    pub fn find_enclosing(&self, chrom: &str, start: u32, end: u32) -> Option<&Range<V>> {
        self.chroms.get(chrom)?.find_enclosing(start, end)
    }

    /// All ranges on `chrom` overlapping `[start, end)`, in position
    /// order.
    pub fn all_overlapping(&self, chrom: &str, start: u32, end: u32) -> Vec<&Range<V>> {
        self.chroms
            .get(chrom)
            .map_or_else(Vec::new, |t| t.all_overlapping(start, end))
    }

    /// Number of positions in `[start, end)` on `chrom` covered by
    /// stored ranges.
    pub fn overlap_size(&self, chrom: &str, start: u32, end: u32) -> u64 {
        self.chroms
            .get(chrom)
            .map_or(0, |t| t.overlap_size(start, end))
    }

    /// Total covered positions across all chromosomes.
    pub fn total_size(&self) -> u64 {
        self.chroms.values().map(RangeTree::total_size).sum()
    }

    /// Chromosome names in lexicographic order.
    pub fn chrom_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.chroms.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Iterate over `(chrom, tree)` pairs in chromosome name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RangeTree<V>)> {
        let mut entries: Vec<(&str, &RangeTree<V>)> = self
            .chroms
            .iter()
            .map(|(name, tree)| (name.as_str(), tree))
            .collect();
        entries.sort_unstable_by_key(|&(name, _)| name);
        entries.into_iter()
    }
}

impl<V> Default for GenomeRangeTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl GenomeRangeTree<u32> {
    /// Add `[start, end)` on `chrom` to a coverage profile, as
    /// [`RangeTree::add_to_coverage_depth`] does.
    pub fn add_to_coverage_depth(&mut self, chrom: &str, start: u32, end: u32) -> Result<()> {
        self.find_or_add(chrom).add_to_coverage_depth(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn chromosomes_do_not_interact() {
        let mut genome = GenomeRangeTree::<()>::new();
        genome.add("chr1", 10, 20).unwrap();
        genome.add("chr2", 15, 25).unwrap();
        assert_eq!(genome.chrom_count(), 2);
        assert_eq!(genome.get("chr1").unwrap().len(), 1);
        assert_eq!(genome.get("chr2").unwrap().len(), 1);
        assert!(genome.overlaps("chr1", 15, 25));
        assert!(!genome.overlaps("chr1", 20, 25));
    }

    #[test]
    fn adds_merge_within_a_chromosome() {
        let mut genome = GenomeRangeTree::<()>::new();
        genome.add("chr1", 10, 20).unwrap();
        genome.add("chr1", 15, 25).unwrap();
        let tree = genome.get("chr1").unwrap();
        assert_eq!(tree.len(), 1);
        assert!(tree.find(10, 25).is_some());
    }

    #[test]
    fn queries_on_unknown_chromosomes_come_back_empty() {
        let genome = GenomeRangeTree::<()>::new();
        assert!(!genome.overlaps("chrX", 0, 100));
        assert_eq!(genome.overlap_size("chrX", 0, 100), 0);
        assert!(genome.find_enclosing("chrX", 0, 100).is_none());
        assert!(genome.all_overlapping("chrX", 0, 100).is_empty());
        assert!(genome.get("chrX").is_none());
    }

    #[test]
    fn find_or_add_reuses_the_same_tree() {
        let mut genome = GenomeRangeTree::<()>::new();
        genome.find_or_add("chr1").add(10, 20).unwrap();
        genome.find_or_add("chr1").add(30, 40).unwrap();
        assert_eq!(genome.chrom_count(), 1);
        assert_eq!(genome.get("chr1").unwrap().len(), 2);
    }

    #[test]
    fn chrom_names_are_sorted() {
        let mut genome = GenomeRangeTree::<()>::new();
        for chrom in ["chr3", "chr1", "chrX", "chr2"] {
            genome.add(chrom, 0, 10).unwrap();
        }
        assert_eq!(genome.chrom_names(), vec!["chr1", "chr2", "chr3", "chrX"]);
        let iterated: Vec<&str> = genome.iter().map(|(name, _)| name).collect();
        assert_eq!(iterated, vec!["chr1", "chr2", "chr3", "chrX"]);
    }

    #[test]
    fn total_size_spans_chromosomes() {
        let mut genome = GenomeRangeTree::<()>::new();
        genome.add("chr1", 0, 10).unwrap();
        genome.add("chr2", 100, 150).unwrap();
        assert_eq!(genome.total_size(), 60);
    }

    #[test]
    fn coverage_depth_is_tracked_per_chromosome() {
        let mut genome = GenomeRangeTree::<u32>::new();
        genome.add_to_coverage_depth("chr1", 0, 10).unwrap();
        genome.add_to_coverage_depth("chr1", 5, 15).unwrap();
        genome.add_to_coverage_depth("chr2", 0, 10).unwrap();
        let chr1: Vec<(u32, u32, u32)> = genome
            .get("chr1")
            .unwrap()
            .iter()
            .map(|r| (r.start, r.end, r.val.unwrap()))
            .collect();
        assert_eq!(chr1, vec![(0, 5, 1), (5, 10, 2), (10, 15, 1)]);
        assert_eq!(genome.get("chr2").unwrap().len(), 1);
    }
}
