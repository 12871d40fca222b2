//! BED-format output and loading.
//!
//! Serialized range arrays can be dumped as BED lines for use with
//! standard genomics tooling, and BED files (plain or gzipped) can be
//! loaded straight into genome range trees.

use std::ffi::OsStr;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use anyhow::{Context, bail};
use flate2::read::MultiGzDecoder;
use rangetree_core::GenomeRangeTree;

use crate::error::{RangeFileError, Result};
use crate::raw::RawRange;
use crate::setops::{IntersectionIter, UnionIter};

/// One BED line: chromosome, half-open bounds, optional name field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BedRecord {
    pub chrom: String,
    pub start: u32,
    pub end: u32,
    pub name: Option<String>,
}

impl BedRecord {
    pub fn new(chrom: &str, start: u32, end: u32) -> Self {
        BedRecord {
            chrom: chrom.to_string(),
            start,
            end,
            name: None,
        }
    }
}

impl fmt::Display for BedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.chrom, self.start, self.end)?;
        if let Some(name) = &self.name {
            write!(f, "\t{name}")?;
        }
        Ok(())
    }
}

/// Write a sorted record array as BED lines on `chrom`.
///
/// With `with_id` each line gets a name field `chrom.N`, numbering
/// emitted lines from 1. With `merge_adjacent`, records that touch
/// end-to-start fold into a single line. Records that overlap are an
/// error. Returns the number of lines written.
pub fn write_array_to_bed<W: Write>(
    writer: &mut W,
    chrom: &str,
    ranges: &[RawRange],
    with_id: bool,
    merge_adjacent: bool,
) -> Result<usize> {
    let Some(first) = ranges.first() else {
        return Ok(0);
    };
    let mut start = first.start;
    let mut end = first.end();
    let mut id = 0usize;
    for r in &ranges[1..] {
        if end > r.start {
            return Err(RangeFileError::OverlappingRecords {
                chrom: chrom.to_string(),
                prev_end: end,
                start: r.start,
            });
        }
        if merge_adjacent && end == r.start {
            end = r.end();
        } else {
            id += 1;
            write_bed_line(writer, chrom, start, end, with_id, id)?;
            start = r.start;
            end = r.end();
        }
    }
    id += 1;
    write_bed_line(writer, chrom, start, end, with_id, id)?;
    Ok(id)
}

fn write_bed_line<W: Write>(
    writer: &mut W,
    chrom: &str,
    start: u32,
    end: u32,
    with_id: bool,
    id: usize,
) -> Result<()> {
    if with_id {
        writeln!(writer, "{chrom}\t{start}\t{end}\t{chrom}.{id}")?;
    } else {
        writeln!(writer, "{chrom}\t{start}\t{end}")?;
    }
    Ok(())
}

/// Union of two record arrays as BED records on `chrom`.
pub fn union_beds(chrom: &str, r1: &[RawRange], r2: &[RawRange]) -> Vec<BedRecord> {
    UnionIter::new(r1, r2)
        .map(|r| BedRecord::new(chrom, r.start, r.end()))
        .collect()
}

/// Intersection of two record arrays as BED records on `chrom`.
pub fn intersection_beds(chrom: &str, r1: &[RawRange], r2: &[RawRange]) -> Vec<BedRecord> {
    IntersectionIter::new(r1, r2)
        .map(|r| BedRecord::new(chrom, r.start, r.end()))
        .collect()
}

fn dynamic_reader(path: &Path) -> anyhow::Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).with_context(|| format!("Failed to open file: {path:?}"))?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };
    Ok(BufReader::new(file))
}

fn parse_bed_fields(line: &str, lineno: usize) -> anyhow::Result<Option<(String, u32, u32)>> {
    if line.is_empty()
        || line.starts_with("browser")
        || line.starts_with("track")
        || line.starts_with('#')
    {
        return Ok(None);
    }
    let mut fields = line.split('\t');
    let (Some(chrom), Some(start), Some(end)) = (fields.next(), fields.next(), fields.next())
    else {
        bail!("line {lineno}: expected at least 3 tab-separated fields: {line}");
    };
    let start: u32 = start
        .parse()
        .with_context(|| format!("line {lineno}: bad start position: {start}"))?;
    let end: u32 = end
        .parse()
        .with_context(|| format!("line {lineno}: bad end position: {end}"))?;
    Ok(Some((chrom.to_string(), start, end)))
}

/// Load a BED file (gzipped if the name ends in .gz) into a genome
/// range tree, merging overlapping lines per chromosome.
///
/// Header lines (`browser`, `track`, `#`) and blank lines are
/// skipped. Lines whose start is not below their end are an error.
pub fn read_bed_into_genome_tree<P: AsRef<Path>>(path: P) -> anyhow::Result<GenomeRangeTree<()>> {
    let path = path.as_ref();
    let reader = dynamic_reader(path)?;
    let mut genome = GenomeRangeTree::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed reading {path:?}"))?;
        if let Some((chrom, start, end)) = parse_bed_fields(&line, i + 1)? {
            genome
                .add(&chrom, start, end)
                .with_context(|| format!("line {}: bad range in {path:?}", i + 1))?;
        }
    }
    Ok(genome)
}

/// Load a BED file into a per-chromosome coverage profile: each
/// stored range's value is the number of BED lines covering it.
pub fn coverage_from_bed<P: AsRef<Path>>(path: P) -> anyhow::Result<GenomeRangeTree<u32>> {
    let path = path.as_ref();
    let reader = dynamic_reader(path)?;
    let mut genome = GenomeRangeTree::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed reading {path:?}"))?;
        if let Some((chrom, start, end)) = parse_bed_fields(&line, i + 1)? {
            genome
                .add_to_coverage_depth(&chrom, start, end)
                .with_context(|| format!("line {}: bad range in {path:?}", i + 1))?;
        }
    }
    Ok(genome)
}
