use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use sadb_core::{Chromosome, Result, SaError};
use sadb_io::{
    BlockRecord, ChunkedIndex, IndexEntry, ReadSaExt, SaHeader, StoreKind, checked_count,
    read_block,
};

use crate::writer::nsa_paths;

/// One `(ref, alt, json)` triple from an array record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlleleAnnotation {
    pub ref_allele: String,
    pub alt_allele: String,
    pub json: String,
}

/// Decoded contents of one coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationRecord {
    Positional(String),
    Alleles(Vec<AlleleAnnotation>),
}

///
/// Decode a record body according to the layout announced in the header.
///
pub fn decode_record(mut data: &[u8], is_array: bool) -> Result<AnnotationRecord> {
    let record = match is_array {
        false => AnnotationRecord::Positional(data.read_opt_string()?),
        true => {
            // three length prefixes per triple
            let count = checked_count(data.read_opt_usize()?, data.len(), 3)?;
            let mut alleles = Vec::with_capacity(count);
            for _ in 0..count {
                alleles.push(AlleleAnnotation {
                    ref_allele: data.read_opt_string()?,
                    alt_allele: data.read_opt_string()?,
                    json: data.read_opt_string()?,
                });
            }
            AnnotationRecord::Alleles(alleles)
        }
    };

    if !data.is_empty() {
        return Err(SaError::CorruptRecord(format!(
            "{} unread bytes after record",
            data.len()
        )));
    }
    Ok(record)
}

///
/// Random access to a position-keyed store through its chunked index.
///
/// The most recently decompressed block is kept, so lookups that walk along a chromosome only
/// decompress each block once.
///
pub struct NsaReader<R: Read + Seek> {
    reader: R,
    header: SaHeader,
    index: ChunkedIndex,
    cache: Option<(u64, Vec<BlockRecord>)>,
}

impl NsaReader<BufReader<File>> {
    /// Open `<prefix>.nsa` together with `<prefix>.nsa.idx`.
    pub fn open<T: AsRef<Path>>(prefix: T) -> Result<Self> {
        let (data_path, index_path) = nsa_paths(prefix);
        let reader = BufReader::new(File::open(data_path)?);
        let index_reader = BufReader::new(File::open(index_path)?);
        Self::new(reader, index_reader)
    }
}

impl<R: Read + Seek> NsaReader<R> {
    pub fn new<I: Read>(mut reader: R, mut index_reader: I) -> Result<Self> {
        let header = SaHeader::read_expecting(&mut reader, StoreKind::Positional)?;
        let index = ChunkedIndex::read(&mut index_reader)?;

        Ok(NsaReader {
            reader,
            header,
            index,
            cache: None,
        })
    }

    pub fn header(&self) -> &SaHeader {
        &self.header
    }

    pub fn index(&self) -> &ChunkedIndex {
        &self.index
    }

    ///
    /// Annotations stored for one coordinate, or `None` if nothing was written there.
    ///
    pub fn annotations(
        &mut self,
        chromosome: &Chromosome,
        position: i32,
    ) -> Result<Option<AnnotationRecord>> {
        let Some(entry) = self.index.entry_for(chromosome.index, position).copied() else {
            return Ok(None);
        };

        let is_array = self.header.is_array;
        let records = self.load_block(&entry)?;
        let Ok(i) = records.binary_search_by_key(&position, |record| record.position) else {
            return Ok(None);
        };

        decode_record(&records[i].data, is_array).map(Some)
    }

    fn load_block(&mut self, entry: &IndexEntry) -> Result<&[BlockRecord]> {
        let cached = matches!(&self.cache, Some((offset, _)) if *offset == entry.file_offset);
        if !cached {
            self.reader.seek(SeekFrom::Start(entry.file_offset))?;
            let records = read_block(&mut self.reader)?;
            self.cache = Some((entry.file_offset, records));
        }

        Ok(self
            .cache
            .as_ref()
            .map(|(_, records)| records.as_slice())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use sadb_io::WriteSaExt;

    #[rstest]
    fn test_decode_positional() {
        let mut data = Vec::new();
        data.write_opt_string("\"A\"").unwrap();

        assert_eq!(
            decode_record(&data, false).unwrap(),
            AnnotationRecord::Positional("\"A\"".to_string())
        );
    }

    #[rstest]
    fn test_decode_array() {
        let mut data = Vec::new();
        data.write_opt_usize(1).unwrap();
        data.write_opt_string("A").unwrap();
        data.write_opt_string("").unwrap();
        data.write_opt_string("{}").unwrap();

        assert_eq!(
            decode_record(&data, true).unwrap(),
            AnnotationRecord::Alleles(vec![AlleleAnnotation {
                ref_allele: "A".to_string(),
                alt_allele: String::new(),
                json: "{}".to_string(),
            }])
        );
    }

    #[rstest]
    fn test_decode_huge_allele_count() {
        let mut data = Vec::new();
        data.write_opt_u64(u64::MAX).unwrap();
        data.write_opt_string("").unwrap();

        assert!(matches!(
            decode_record(&data, true),
            Err(SaError::CorruptRecord(_))
        ));
    }

    #[rstest]
    fn test_decode_string_longer_than_record() {
        let mut data = Vec::new();
        data.write_opt_u64(u64::MAX).unwrap();
        data.extend_from_slice(b"0.5");

        assert!(decode_record(&data, false).is_err());
    }

    #[rstest]
    fn test_decode_trailing_bytes() {
        let mut data = Vec::new();
        data.write_opt_string("1.5").unwrap();
        data.push(0);

        assert!(matches!(
            decode_record(&data, false),
            Err(SaError::CorruptRecord(_))
        ));
    }
}
