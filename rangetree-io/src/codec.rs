//! Reading and writing range sets in the binary (start, size) format.
//!
//! A serialized range set is a bare sequence of 8-byte records, each a
//! `u32` start followed by a `u32` size, written in the byte order of
//! the machine that produced the file. There is no header, magic, or
//! checksum; containers embedding these arrays keep the record count
//! and a byte-order flag themselves. Readers take an `is_swapped` flag
//! saying whether the file's byte order is opposite to the running
//! machine's.
//!
//! Trees serialize through in-order traversal, so records come out
//! sorted by start and non-overlapping. Reading goes through the
//! tree's merging insert, which also makes loading into a non-empty
//! tree well defined.

use std::io::{Read, Write};

use byteorder::{NativeEndian, ReadBytesExt, WriteBytesExt};
use rangetree_core::RangeTree;

use crate::error::{RangeFileError, Result};
use crate::raw::RawRange;

/// Read one (start, size) record.
pub fn read_one<R: Read>(reader: &mut R, is_swapped: bool) -> Result<RawRange> {
    let mut start = reader.read_u32::<NativeEndian>()?;
    let mut size = reader.read_u32::<NativeEndian>()?;
    if is_swapped {
        start = start.swap_bytes();
        size = size.swap_bytes();
    }
    Ok(RawRange { start, size })
}

/// Write one (start, size) record in native byte order.
pub fn write_one<W: Write>(writer: &mut W, range: RawRange) -> Result<()> {
    writer.write_u32::<NativeEndian>(range.start)?;
    writer.write_u32::<NativeEndian>(range.size)?;
    Ok(())
}

/// Read `n` records into a vector.
pub fn read_array<R: Read>(reader: &mut R, n: usize, is_swapped: bool) -> Result<Vec<RawRange>> {
    let mut ranges = Vec::with_capacity(n);
    for _ in 0..n {
        ranges.push(read_one(reader, is_swapped)?);
    }
    Ok(ranges)
}

/// Write an array of records in native byte order.
pub fn write_array<W: Write>(writer: &mut W, ranges: &[RawRange]) -> Result<()> {
    for r in ranges {
        write_one(writer, *r)?;
    }
    Ok(())
}

/// Copy `n` records from `reader` to `writer` one at a time,
/// rewriting them in the running machine's byte order.
pub fn read_write_n<R: Read, W: Write>(
    reader: &mut R,
    n: usize,
    is_swapped: bool,
    writer: &mut W,
) -> Result<()> {
    for _ in 0..n {
        let r = read_one(reader, is_swapped)?;
        write_one(writer, r)?;
    }
    Ok(())
}

/// A value that can ride along with each (start, size) record.
///
/// Implementations define their own fixed-layout encoding; the range
/// file format stores the value bytes directly after the record they
/// belong to.
pub trait RangeVal: Sized {
    fn read_from<R: Read>(reader: &mut R, is_swapped: bool) -> Result<Self>;
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()>;
    /// Encoded size in bytes.
    fn size_in_file(&self) -> u64;
}

impl RangeVal for u32 {
    fn read_from<R: Read>(reader: &mut R, is_swapped: bool) -> Result<Self> {
        let v = reader.read_u32::<NativeEndian>()?;
        Ok(if is_swapped { v.swap_bytes() } else { v })
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<NativeEndian>(*self)?;
        Ok(())
    }

    fn size_in_file(&self) -> u64 {
        4
    }
}

impl RangeVal for f32 {
    fn read_from<R: Read>(reader: &mut R, is_swapped: bool) -> Result<Self> {
        let bits = u32::read_from(reader, is_swapped)?;
        Ok(f32::from_bits(bits))
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.to_bits().write_to(writer)
    }

    fn size_in_file(&self) -> u64 {
        4
    }
}

/// Read one record followed by its value.
pub fn read_one_with_val<V: RangeVal, R: Read>(
    reader: &mut R,
    is_swapped: bool,
) -> Result<(RawRange, V)> {
    let r = read_one(reader, is_swapped)?;
    let val = V::read_from(reader, is_swapped)?;
    Ok((r, val))
}

/// Write one record followed by its value.
pub fn write_one_with_val<V: RangeVal, W: Write>(
    writer: &mut W,
    range: RawRange,
    val: &V,
) -> Result<()> {
    write_one(writer, range)?;
    val.write_to(writer)
}

/// Read `n` records and add each to `tree`, merging overlaps. Values
/// are not read; records on disk that overlap ranges already in the
/// tree simply widen them.
pub fn read_nodes<V, R: Read>(
    reader: &mut R,
    tree: &mut RangeTree<V>,
    n: usize,
    is_swapped: bool,
) -> Result<()> {
    for _ in 0..n {
        let r = read_one(reader, is_swapped)?;
        tree.add(r.start, r.end())?;
    }
    Ok(())
}

/// Write every range in `tree` as a (start, size) record, in start
/// order. Values are not written.
pub fn write_nodes<V, W: Write>(tree: &RangeTree<V>, writer: &mut W) -> Result<()> {
    for r in tree.iter() {
        write_one(writer, RawRange::from_bounds(r.start, r.end))?;
    }
    Ok(())
}

/// Read `n` valued records into an empty tree.
///
/// Serialized trees hold disjoint ranges, so loading into an empty
/// tree never needs to combine values; a tree that already has ranges
/// is refused with `AlreadyPopulated`. Use
/// [`read_nodes_with_val_merge`] to fold records into existing data.
pub fn read_nodes_with_val<V: RangeVal, R: Read>(
    reader: &mut R,
    tree: &mut RangeTree<V>,
    n: usize,
    is_swapped: bool,
) -> Result<()> {
    if !tree.is_empty() {
        return Err(RangeFileError::AlreadyPopulated(tree.len()));
    }
    for _ in 0..n {
        let (r, val) = read_one_with_val(reader, is_swapped)?;
        tree.add_val(r.start, r.end(), val)?;
    }
    Ok(())
}

/// Read `n` valued records into `tree`, combining values with `merge`
/// wherever a record overlaps ranges already present.
pub fn read_nodes_with_val_merge<V, R, F>(
    reader: &mut R,
    tree: &mut RangeTree<V>,
    n: usize,
    is_swapped: bool,
    mut merge: F,
) -> Result<()>
where
    V: RangeVal,
    R: Read,
    F: FnMut(V, V) -> V,
{
    for _ in 0..n {
        let (r, val) = read_one_with_val(reader, is_swapped)?;
        tree.add_val_merge(r.start, r.end(), val, &mut merge)?;
    }
    Ok(())
}

/// Write every range in `tree` as a record followed by its encoded
/// value. A range without a value fails with `MissingValue`.
pub fn write_nodes_with_val<V: RangeVal, W: Write>(
    tree: &RangeTree<V>,
    writer: &mut W,
) -> Result<()> {
    for r in tree.iter() {
        match &r.val {
            Some(v) => write_one_with_val(writer, RawRange::from_bounds(r.start, r.end), v)?,
            None => {
                return Err(RangeFileError::MissingValue {
                    start: r.start,
                    end: r.end,
                });
            }
        }
    }
    Ok(())
}

/// Bytes [`write_nodes`] would produce for `tree`: 8 per range.
pub fn size_in_file<V>(tree: &RangeTree<V>) -> u64 {
    8 * tree.len() as u64
}

/// Bytes [`write_nodes_with_val`] would produce for `tree`.
pub fn size_in_file_with_val<V: RangeVal>(tree: &RangeTree<V>) -> Result<u64> {
    let mut total = size_in_file(tree);
    for r in tree.iter() {
        match &r.val {
            Some(v) => total += v.size_in_file(),
            None => {
                return Err(RangeFileError::MissingValue {
                    start: r.start,
                    end: r.end,
                });
            }
        }
    }
    Ok(total)
}
