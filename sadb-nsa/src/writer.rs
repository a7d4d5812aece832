use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use sadb_core::consts::{NSA_FILE_EXTENSION, NSA_INDEX_EXTENSION};
use sadb_core::reference::SequenceProvider;
use sadb_core::trim::{AlleleTrimmer, BiDirectionalTrimmer};
use sadb_core::utils::compare_items;
use sadb_core::{AnnotationItem, Chromosome, DataSourceVersion, JsonRender, Result, SaError};
use sadb_io::{
    ChunkedIndex, IndexEntry, PositionTracker, SaHeader, SaWriteBlock, StoreKind, WriteSaExt,
};

use crate::arbitration::{positional_annotation, remove_conflicting_alleles};
use crate::config::WriterConfig;
use crate::heap::MinHeap;
use crate::observer::{LogObserver, SkipReason, WriteObserver};

type ItemOrder = fn(&AnnotationItem, &AnnotationItem) -> Ordering;
type ItemHeap = MinHeap<AnnotationItem, ItemOrder>;

/// What a finished write produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub items_written: usize,
    pub blocks_written: usize,
    pub items_skipped: usize,
}

///
/// Paths of the data file and index file for a store named by `prefix`.
///
pub fn nsa_paths<P: AsRef<Path>>(prefix: P) -> (PathBuf, PathBuf) {
    let prefix = prefix.as_ref().as_os_str().to_owned();

    let mut data = prefix.clone();
    data.push(NSA_FILE_EXTENSION);
    let mut index = data.clone();
    index.push(NSA_INDEX_EXTENSION);

    (PathBuf::from(data), PathBuf::from(index))
}

///
/// Writes a position-keyed store and its chunked index.
///
/// Items must arrive sorted by chromosome and then by their untrimmed position. Each item is
/// checked against the reference, trimmed and parked in a min-heap; once the stream has moved
/// `upstream_slack` bases past a coordinate, nothing can land there anymore and the coordinate
/// is encoded into the active block.
///
/// The writer is consumed by [`NsaWriter::write`]. If that call fails the output is incomplete
/// and should be discarded.
///
pub struct NsaWriter<W: Write, I: Write, P: SequenceProvider> {
    writer: PositionTracker<W>,
    index_writer: I,
    reference: P,
    config: WriterConfig,
    trimmer: Box<dyn AlleleTrimmer>,
    observer: Box<dyn WriteObserver>,
    block: SaWriteBlock,
    index: ChunkedIndex,
    summary: WriteSummary,
}

impl<P: SequenceProvider> NsaWriter<BufWriter<File>, BufWriter<File>, P> {
    ///
    /// Create `<prefix>.nsa` and `<prefix>.nsa.idx` and write the header.
    ///
    pub fn create<T: AsRef<Path>>(
        prefix: T,
        version: DataSourceVersion,
        reference: P,
        config: WriterConfig,
    ) -> Result<Self> {
        let (data_path, index_path) = nsa_paths(prefix);
        if let Some(parent) = data_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let writer = BufWriter::new(File::create(data_path)?);
        let index_writer = BufWriter::new(File::create(index_path)?);
        Self::new(writer, index_writer, version, reference, config)
    }
}

impl<W: Write, I: Write, P: SequenceProvider> NsaWriter<W, I, P> {
    ///
    /// Wrap the output streams and write the header.
    ///
    /// # Arguments
    /// - writer: receives the header and the compressed blocks
    /// - index_writer: receives the chunked index once all blocks are written
    /// - version: description of the data source
    /// - reference: sequences used to validate reference alleles
    /// - config: encoding and validation settings
    ///
    pub fn new(
        writer: W,
        index_writer: I,
        version: DataSourceVersion,
        reference: P,
        config: WriterConfig,
    ) -> Result<Self> {
        let mut writer = PositionTracker::new(writer);
        let header = SaHeader {
            kind: StoreKind::Positional,
            version,
            json_key: config.json_key.clone(),
            is_array: !config.is_positional,
            schema_version: config.schema_version,
        };
        header.write(&mut writer)?;

        Ok(NsaWriter {
            writer,
            index_writer,
            reference,
            block: SaWriteBlock::new(config.block_size),
            config,
            trimmer: Box::new(BiDirectionalTrimmer),
            observer: Box::new(LogObserver),
            index: ChunkedIndex::new(),
            summary: WriteSummary::default(),
        })
    }

    pub fn with_trimmer<T: AlleleTrimmer + 'static>(mut self, trimmer: T) -> Self {
        self.trimmer = Box::new(trimmer);
        self
    }

    pub fn with_observer<O: WriteObserver + 'static>(mut self, observer: O) -> Self {
        self.observer = Box::new(observer);
        self
    }

    ///
    /// Consume the item stream, write every block and finally the index.
    ///
    pub fn write<T>(mut self, items: T) -> Result<WriteSummary>
    where
        T: IntoIterator<Item = AnnotationItem>,
    {
        let mut heap: ItemHeap = MinHeap::new(compare_items as ItemOrder);
        let mut current: Option<Arc<Chromosome>> = None;
        let mut started = Instant::now();
        let mut written_before = 0;

        for mut item in items {
            if current.as_ref().map(|c| c.index) != Some(item.chromosome.index) {
                if let Some(chromosome) = current.take() {
                    self.finish_chromosome(&mut heap, &chromosome, written_before, started)?;
                }
                self.reference.load_chromosome(&item.chromosome)?;
                self.observer.chromosome_started(&item.chromosome);
                started = Instant::now();
                written_before = self.summary.items_written;
                current = Some(item.chromosome.clone());
            }

            if !self.has_valid_reference(&item)? {
                continue;
            }

            // a later item never normalizes more than `upstream_slack` bases upstream
            let arrival = item.position;
            item.trim(self.trimmer.as_ref());
            heap.push(item);
            self.write_up_to(&mut heap, arrival.saturating_sub(self.config.upstream_slack))?;
        }

        if let Some(chromosome) = current.take() {
            self.finish_chromosome(&mut heap, &chromosome, written_before, started)?;
        }

        self.writer.flush()?;
        self.index.write(&mut self.index_writer)?;
        self.index_writer.flush()?;

        Ok(self.summary)
    }

    fn finish_chromosome(
        &mut self,
        heap: &mut ItemHeap,
        chromosome: &Chromosome,
        written_before: usize,
        started: Instant,
    ) -> Result<()> {
        self.write_up_to(heap, i32::MAX)?;
        self.flush(chromosome.index)?;
        self.observer.chromosome_completed(
            chromosome,
            self.summary.items_written - written_before,
            started.elapsed(),
        );
        Ok(())
    }

    fn has_valid_reference(&mut self, item: &AnnotationItem) -> Result<bool> {
        let expected = item.ref_allele();
        if expected.is_empty() {
            return Ok(true);
        }

        let actual = usize::try_from(item.position - 1)
            .ok()
            .and_then(|start| self.reference.substring(start, expected.len()));
        if actual == Some(expected) {
            return Ok(true);
        }

        let actual = actual.unwrap_or_default().to_string();
        if !self.config.skip_incorrect_ref_entries {
            return Err(SaError::ReferenceMismatch {
                chromosome: item.chromosome.ucsc_name.clone(),
                position: item.position,
                expected: expected.to_string(),
                actual,
            });
        }

        let reason = SkipReason::ReferenceMismatch {
            expected: expected.to_string(),
            actual,
        };
        self.observer
            .item_skipped(&item.chromosome, item.position, &reason);
        self.summary.items_skipped += 1;
        Ok(false)
    }

    ///
    /// Encode every coordinate strictly before `boundary`, one coordinate at a time.
    ///
    fn write_up_to(&mut self, heap: &mut ItemHeap, boundary: i32) -> Result<()> {
        while heap.peek().is_some_and(|min| min.position < boundary) {
            let Some(first) = heap.pop() else {
                break;
            };
            let mut items = vec![first];
            while heap
                .peek()
                .is_some_and(|next| compare_items(next, &items[0]).is_eq())
            {
                if let Some(next) = heap.pop() {
                    items.push(next);
                }
            }
            self.write_position(items)?;
        }
        Ok(())
    }

    fn write_position(&mut self, items: Vec<AnnotationItem>) -> Result<()> {
        let chromosome = items[0].chromosome.clone();
        let position = items[0].position;

        let mut record = Vec::new();
        let count = if self.config.is_positional {
            let Some(winner) = positional_annotation(&items) else {
                self.observer
                    .item_skipped(&chromosome, position, &SkipReason::NoConsensus);
                self.summary.items_skipped += items.len();
                return Ok(());
            };
            record.write_opt_string(&winner.json_string())?;
            items.len()
        } else {
            let items = self.filter_conflicts(items)?;
            if items.is_empty() {
                return Ok(());
            }
            record.write_opt_usize(items.len())?;
            for item in &items {
                record.write_opt_string(item.ref_allele())?;
                record.write_opt_string(item.alt_allele())?;
                record.write_opt_string(&item.json_string())?;
            }
            items.len()
        };

        if !self.block.has_space(record.len()) {
            self.flush(chromosome.index)?;
        }
        self.block.add(&record, position)?;
        self.summary.items_written += count;
        Ok(())
    }

    fn filter_conflicts(&mut self, items: Vec<AnnotationItem>) -> Result<Vec<AnnotationItem>> {
        if !self.config.filters_conflicts() {
            return Ok(items);
        }

        let candidates: Vec<(String, String)> = items
            .iter()
            .map(|item| (item.ref_allele().to_string(), item.alt_allele().to_string()))
            .collect();
        let chromosome = items[0].chromosome.clone();
        let position = items[0].position;

        let kept = remove_conflicting_alleles(items, self.config.throw_on_conflicts)?;

        // each kept item accounts for one candidate with its alleles, the rest were dropped
        let mut survivors: HashMap<(String, String), usize> = HashMap::new();
        for item in &kept {
            let key = (item.ref_allele().to_string(), item.alt_allele().to_string());
            *survivors.entry(key).or_default() += 1;
        }
        for key in candidates {
            let reason = match survivors.get_mut(&key) {
                Some(0) => SkipReason::DuplicateEntry {
                    ref_allele: key.0,
                    alt_allele: key.1,
                },
                Some(remaining) => {
                    *remaining -= 1;
                    continue;
                }
                None => SkipReason::ConflictingAlleles {
                    ref_allele: key.0,
                    alt_allele: key.1,
                },
            };
            self.observer.item_skipped(&chromosome, position, &reason);
            self.summary.items_skipped += 1;
        }

        Ok(kept)
    }

    fn flush(&mut self, chromosome_index: u16) -> Result<()> {
        let file_offset = self.writer.position();
        let Some(stats) = self.block.write(&mut self.writer)? else {
            return Ok(());
        };

        let entry = IndexEntry {
            chromosome_index,
            first_position: stats.first_position,
            last_position: stats.last_position,
            file_offset,
            byte_length: stats.num_bytes,
        };
        self.index.add(entry);
        self.observer.block_flushed(&entry);
        self.summary.blocks_written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use sadb_core::Payload;
    use sadb_core::models::CustomAnnotation;
    use sadb_core::reference::InMemorySequenceProvider;

    #[fixture]
    fn chrom1() -> Arc<Chromosome> {
        Arc::new(Chromosome::new("chr1", "1", 0))
    }

    #[fixture]
    fn reference() -> InMemorySequenceProvider {
        InMemorySequenceProvider::new().with_sequence("chr1", &"ACGT".repeat(50))
    }

    fn version() -> DataSourceVersion {
        DataSourceVersion::new("test", "1", 0, "")
    }

    fn item(chrom: &Arc<Chromosome>, position: i32, ref_allele: &str, alt: &str) -> AnnotationItem {
        AnnotationItem::new(
            chrom.clone(),
            position,
            Some(ref_allele),
            Some(alt),
            Payload::Custom(CustomAnnotation::new().with_field("alt", alt)),
        )
    }

    #[rstest]
    #[case("out/clinvar", "out/clinvar.nsa", "out/clinvar.nsa.idx")]
    #[case("db", "db.nsa", "db.nsa.idx")]
    fn test_nsa_paths(#[case] prefix: &str, #[case] data: &str, #[case] index: &str) {
        let (data_path, index_path) = nsa_paths(prefix);
        assert_eq!(data_path, PathBuf::from(data));
        assert_eq!(index_path, PathBuf::from(index));
    }

    #[rstest]
    fn test_reference_mismatch_is_skipped(
        chrom1: Arc<Chromosome>,
        reference: InMemorySequenceProvider,
    ) {
        let mut data = Vec::new();
        let mut index = Vec::new();
        let writer = NsaWriter::new(
            &mut data,
            &mut index,
            version(),
            reference,
            WriterConfig::new("test"),
        )
        .unwrap();

        // position 1 holds A, position 2 holds C
        let summary = writer
            .write(vec![item(&chrom1, 1, "A", "T"), item(&chrom1, 2, "G", "T")])
            .unwrap();

        assert_eq!(summary.items_written, 1);
        assert_eq!(summary.items_skipped, 1);
        assert_eq!(summary.blocks_written, 1);
        assert_eq!(index.len(), IndexEntry::SIZE);
    }

    #[rstest]
    fn test_reference_mismatch_is_fatal(
        chrom1: Arc<Chromosome>,
        reference: InMemorySequenceProvider,
    ) {
        let config = WriterConfig {
            skip_incorrect_ref_entries: false,
            ..WriterConfig::new("test")
        };
        let mut data = Vec::new();
        let mut index = Vec::new();
        let writer = NsaWriter::new(&mut data, &mut index, version(), reference, config).unwrap();

        let result = writer.write(vec![item(&chrom1, 2, "G", "T")]);
        assert!(matches!(
            result,
            Err(SaError::ReferenceMismatch { position: 2, ref expected, ref actual, .. })
                if expected == "G" && actual == "C"
        ));
    }

    #[rstest]
    fn test_reference_past_the_end(chrom1: Arc<Chromosome>, reference: InMemorySequenceProvider) {
        let mut data = Vec::new();
        let mut index = Vec::new();
        let writer = NsaWriter::new(
            &mut data,
            &mut index,
            version(),
            reference,
            WriterConfig::new("test"),
        )
        .unwrap();

        let summary = writer.write(vec![item(&chrom1, 200, "TA", "T")]).unwrap();
        assert_eq!(summary.items_skipped, 1);
        assert_eq!(summary.blocks_written, 0);
        assert!(index.is_empty());
    }

    #[rstest]
    fn test_repeated_entries_count_as_skipped(
        chrom1: Arc<Chromosome>,
        reference: InMemorySequenceProvider,
    ) {
        let mut data = Vec::new();
        let mut index = Vec::new();
        let writer = NsaWriter::new(
            &mut data,
            &mut index,
            version(),
            reference,
            WriterConfig::new("test"),
        )
        .unwrap();

        // position 1 holds A; two identical A>T entries and a single A>C
        let items = vec![
            item(&chrom1, 1, "A", "T"),
            item(&chrom1, 1, "A", "C"),
            item(&chrom1, 1, "A", "T"),
        ];
        let summary = writer.write(items).unwrap();

        assert_eq!(summary.items_written, 2);
        assert_eq!(summary.items_skipped, 1);
        assert_eq!(summary.items_written + summary.items_skipped, 3);
    }

    #[rstest]
    fn test_unknown_chromosome_is_fatal(reference: InMemorySequenceProvider) {
        let chrom2 = Arc::new(Chromosome::new("chr2", "2", 1));
        let mut data = Vec::new();
        let mut index = Vec::new();
        let writer = NsaWriter::new(
            &mut data,
            &mut index,
            version(),
            reference,
            WriterConfig::new("test"),
        )
        .unwrap();

        let result = writer.write(vec![item(&chrom2, 1, "A", "T")]);
        assert!(matches!(result, Err(SaError::UnknownChromosome(_))));
    }
}
