use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use sadb_core::{Result, SaError};

///
/// One flushed block: which coordinates it covers and where its bytes live.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub chromosome_index: u16,
    pub first_position: i32,
    pub last_position: i32,
    pub file_offset: u64,
    pub byte_length: u32,
}

impl IndexEntry {
    /// Bytes taken by one serialized entry.
    pub const SIZE: usize = 22;

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u16::<LittleEndian>(self.chromosome_index)?;
        writer.write_i32::<LittleEndian>(self.first_position)?;
        writer.write_i32::<LittleEndian>(self.last_position)?;
        writer.write_u64::<LittleEndian>(self.file_offset)?;
        writer.write_u32::<LittleEndian>(self.byte_length)?;
        Ok(())
    }

    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(IndexEntry {
            chromosome_index: reader.read_u16::<LittleEndian>()?,
            first_position: reader.read_i32::<LittleEndian>()?,
            last_position: reader.read_i32::<LittleEndian>()?,
            file_offset: reader.read_u64::<LittleEndian>()?,
            byte_length: reader.read_u32::<LittleEndian>()?,
        })
    }

    pub fn contains(&self, position: i32) -> bool {
        self.first_position <= position && position <= self.last_position
    }

    /// Where this entry sits relative to `position`: `Less` if the whole range lies before it.
    fn cmp_position(&self, position: i32) -> Ordering {
        if position < self.first_position {
            Ordering::Greater
        } else if position > self.last_position {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    }
}

///
/// Sparse index over the blocks of a positional store, grouped by chromosome.
///
/// On disk it is a flat run of [`IndexEntry`] records with no header; the entry count is the
/// file length divided by [`IndexEntry::SIZE`].
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkedIndex {
    chunks: BTreeMap<u16, Vec<IndexEntry>>,
}

impl ChunkedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: IndexEntry) {
        self.chunks
            .entry(entry.chromosome_index)
            .or_default()
            .push(entry);
    }

    pub fn entries(&self, chromosome_index: u16) -> &[IndexEntry] {
        self.chunks
            .get(&chromosome_index)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn chromosomes(&self) -> impl Iterator<Item = u16> + '_ {
        self.chunks.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.chunks.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        for entry in self.chunks.values().flatten() {
            entry.write(writer)?;
        }
        Ok(())
    }

    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        if buffer.len() % IndexEntry::SIZE != 0 {
            return Err(SaError::CorruptRecord(format!(
                "index length {} is not a multiple of the entry size {}",
                buffer.len(),
                IndexEntry::SIZE
            )));
        }

        let count = buffer.len() / IndexEntry::SIZE;
        let mut cursor = Cursor::new(buffer);
        let mut index = ChunkedIndex::new();
        for _ in 0..count {
            index.add(IndexEntry::read(&mut cursor)?);
        }
        Ok(index)
    }

    fn search(chunks: &[IndexEntry], position: i32) -> std::result::Result<usize, usize> {
        chunks.binary_search_by(|chunk| chunk.cmp_position(position))
    }

    ///
    /// The block holding `position`, if any block covers it.
    ///
    pub fn entry_for(&self, chromosome_index: u16, position: i32) -> Option<&IndexEntry> {
        let chunks = self.chunks.get(&chromosome_index)?;
        Self::search(chunks, position).ok().map(|i| &chunks[i])
    }

    ///
    /// File offset of the block holding `position`.
    ///
    pub fn file_location(&self, chromosome_index: u16, position: i32) -> Option<u64> {
        self.entry_for(chromosome_index, position)
            .map(|entry| entry.file_offset)
    }

    ///
    /// File offset of the first block overlapping `[start, end]` and the number of consecutive
    /// blocks to read from there.
    ///
    /// A start falling between blocks snaps to the next block to the right, an end falling
    /// between blocks snaps to the previous one. If both fall in the same gap, nothing overlaps.
    ///
    pub fn file_range(&self, chromosome_index: u16, start: i32, end: i32) -> Option<(u64, usize)> {
        let chunks = self.chunks.get(&chromosome_index)?;

        let start_index = match Self::search(chunks, start) {
            Ok(i) | Err(i) => i,
        };
        if start_index == chunks.len() {
            return None;
        }

        let end_index = match Self::search(chunks, end) {
            Ok(i) => i,
            Err(0) => return None,
            Err(i) => i - 1,
        };
        if end_index < start_index {
            return None;
        }

        Some((chunks[start_index].file_offset, end_index - start_index + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn entry(chromosome_index: u16, first: i32, last: i32, offset: u64) -> IndexEntry {
        IndexEntry {
            chromosome_index,
            first_position: first,
            last_position: last,
            file_offset: offset,
            byte_length: 100,
        }
    }

    #[fixture]
    fn index() -> ChunkedIndex {
        let mut index = ChunkedIndex::new();
        index.add(entry(0, 100, 200, 50));
        index.add(entry(0, 300, 400, 150));
        index.add(entry(0, 500, 600, 250));
        index.add(entry(1, 10, 20, 350));
        index
    }

    #[rstest]
    fn test_entry_is_22_bytes() {
        let mut buffer = Vec::new();
        entry(3, 1, 2, 3).write(&mut buffer).unwrap();
        assert_eq!(buffer.len(), IndexEntry::SIZE);
    }

    #[rstest]
    fn test_write_read(index: ChunkedIndex) {
        let mut buffer = Vec::new();
        index.write(&mut buffer).unwrap();
        assert_eq!(buffer.len(), 4 * IndexEntry::SIZE);

        let read = ChunkedIndex::read(&mut buffer.as_slice()).unwrap();
        assert_eq!(read, index);
        assert_eq!(read.len(), 4);
    }

    #[rstest]
    fn test_truncated_index() {
        let buffer = vec![0u8; IndexEntry::SIZE + 3];
        let result = ChunkedIndex::read(&mut buffer.as_slice());
        assert!(matches!(result, Err(SaError::CorruptRecord(_))));
    }

    #[rstest]
    #[case(0, 100, Some(50))]
    #[case(0, 450, None)]
    #[case(0, 600, Some(250))]
    #[case(1, 15, Some(350))]
    #[case(2, 15, None)]
    fn test_file_location(
        index: ChunkedIndex,
        #[case] chrom: u16,
        #[case] position: i32,
        #[case] expected: Option<u64>,
    ) {
        assert_eq!(index.file_location(chrom, position), expected);
    }

    #[rstest]
    #[case(150, 350, Some((50, 2)))]
    #[case(250, 550, Some((150, 2)))]
    #[case(50, 700, Some((50, 3)))]
    #[case(210, 290, None)]
    #[case(700, 800, None)]
    #[case(10, 90, None)]
    #[case(350, 350, Some((150, 1)))]
    fn test_file_range(
        index: ChunkedIndex,
        #[case] start: i32,
        #[case] end: i32,
        #[case] expected: Option<(u64, usize)>,
    ) {
        assert_eq!(index.file_range(0, start, end), expected);
    }
}
