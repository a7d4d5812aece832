use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use sadb_core::utils::opt_len;
use sadb_core::{Result, SaError};

use crate::binary::{ReadSaExt, WriteSaExt, checked_count};

/// Upper bound on the bytes a varint-encoded position takes.
const MAX_POSITION_BYTES: usize = 5;

/// What a flushed block covered and how much of the output stream it took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockStats {
    pub first_position: i32,
    pub last_position: i32,
    /// Length prefix plus the compressed bytes.
    pub num_bytes: u32,
}

///
/// Accumulates encoded per-position records until the configured size is reached.
///
/// Each record is stored as `varint position · varint length · bytes`. On [`SaWriteBlock::write`]
/// the record count and records are compressed as one gzip member and written after a
/// little-endian `u32` holding the compressed length.
///
#[derive(Debug)]
pub struct SaWriteBlock {
    buffer: Vec<u8>,
    capacity: usize,
    range: Option<(i32, i32)>,
    record_count: usize,
}

impl SaWriteBlock {
    pub fn new(capacity: usize) -> Self {
        SaWriteBlock {
            buffer: Vec::with_capacity(capacity),
            capacity,
            range: None,
            record_count: 0,
        }
    }

    ///
    /// Whether a record of `num_bytes` fits in the remaining space.
    ///
    pub fn has_space(&self, num_bytes: usize) -> bool {
        let needed = MAX_POSITION_BYTES + opt_len(num_bytes as u64) + num_bytes;
        self.buffer.len() + needed <= self.capacity
    }

    ///
    /// Append an encoded record. A record larger than the capacity is still accepted into an
    /// empty block; callers flush first when [`SaWriteBlock::has_space`] says no.
    ///
    pub fn add(&mut self, record: &[u8], position: i32) -> Result<()> {
        self.buffer.write_opt_i32(position)?;
        self.buffer.write_opt_usize(record.len())?;
        self.buffer.extend_from_slice(record);

        self.range = Some(match self.range {
            Some((first, last)) => (first.min(position), last.max(position)),
            None => (position, position),
        });
        self.record_count += 1;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    pub fn first_position(&self) -> Option<i32> {
        self.range.map(|(first, _)| first)
    }

    pub fn last_position(&self) -> Option<i32> {
        self.range.map(|(_, last)| last)
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    ///
    /// Compress the buffered records, write them out and reset the block.
    ///
    /// Returns `None` without touching the writer if the block is empty.
    ///
    pub fn write<W: Write>(&mut self, writer: &mut W) -> Result<Option<BlockStats>> {
        let Some((first_position, last_position)) = self.range else {
            return Ok(None);
        };

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_opt_usize(self.record_count)?;
        encoder.write_all(&self.buffer)?;
        let compressed = encoder.finish()?;

        let compressed_len = u32::try_from(compressed.len()).map_err(|_| {
            SaError::CorruptRecord(format!(
                "compressed block of {} bytes exceeds the 4 GiB limit",
                compressed.len()
            ))
        })?;
        writer.write_u32::<LittleEndian>(compressed_len)?;
        writer.write_all(&compressed)?;

        let stats = BlockStats {
            first_position,
            last_position,
            num_bytes: compressed_len + 4,
        };

        self.buffer.clear();
        self.range = None;
        self.record_count = 0;

        Ok(Some(stats))
    }
}

/// One decoded per-position record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRecord {
    pub position: i32,
    pub data: Vec<u8>,
}

///
/// Read one block written by [`SaWriteBlock::write`] from the current stream position.
///
pub fn read_block<R: Read>(reader: &mut R) -> Result<Vec<BlockRecord>> {
    let compressed_len = reader.read_u32::<LittleEndian>()? as u64;
    let mut compressed = Vec::new();
    reader.take(compressed_len).read_to_end(&mut compressed)?;
    if compressed.len() as u64 != compressed_len {
        return Err(SaError::CorruptRecord(format!(
            "block of {compressed_len} bytes ends after {}",
            compressed.len()
        )));
    }

    let mut body = Vec::new();
    GzDecoder::new(compressed.as_slice()).read_to_end(&mut body)?;
    let mut body = body.as_slice();

    // every record takes at least a position byte and a length byte
    let count = checked_count(body.read_opt_usize()?, body.len(), 2)?;
    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        let position = body.read_opt_i32()?;
        let len = body.read_opt_usize()?;
        if len > body.len() {
            return Err(SaError::CorruptRecord(format!(
                "truncated record at position {position}"
            )));
        }
        let (data, rest) = body.split_at(len);
        records.push(BlockRecord {
            position,
            data: data.to_vec(),
        });
        body = rest;
    }

    Ok(records)
}
