use std::fmt::{self, Display};
use std::time::Duration;

use log::{debug, info};

use sadb_core::Chromosome;
use sadb_io::IndexEntry;

/// Why an item never made it into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Reference allele differs from the reference sequence (or runs past its end).
    ReferenceMismatch { expected: String, actual: String },
    /// Another item for the same allele pair carried a different annotation.
    ConflictingAlleles { ref_allele: String, alt_allele: String },
    /// Exact repeat of an entry already kept for the same allele pair.
    DuplicateEntry { ref_allele: String, alt_allele: String },
    /// Arbitration found no single value for the coordinate.
    NoConsensus,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ReferenceMismatch { expected, actual } => {
                write!(f, "reference mismatch (expected {expected}, found {actual})")
            }
            SkipReason::ConflictingAlleles {
                ref_allele,
                alt_allele,
            } => write!(f, "conflicting entries for {ref_allele} > {alt_allele}"),
            SkipReason::DuplicateEntry {
                ref_allele,
                alt_allele,
            } => write!(f, "repeated entry for {ref_allele} > {alt_allele}"),
            SkipReason::NoConsensus => write!(f, "no consensus"),
        }
    }
}

///
/// Receives progress from the writers. All methods default to doing nothing.
///
pub trait WriteObserver {
    fn chromosome_started(&mut self, _chromosome: &Chromosome) {}

    fn chromosome_completed(
        &mut self,
        _chromosome: &Chromosome,
        _items_written: usize,
        _elapsed: Duration,
    ) {
    }

    fn item_skipped(&mut self, _chromosome: &Chromosome, _position: i32, _reason: &SkipReason) {}

    fn block_flushed(&mut self, _entry: &IndexEntry) {}
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl WriteObserver for NullObserver {}

/// Reports through the `log` facade: chromosome progress at info level, the rest at debug.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl WriteObserver for LogObserver {
    fn chromosome_started(&mut self, chromosome: &Chromosome) {
        debug!("Starting chromosome {}", chromosome.ensembl_name);
    }

    fn chromosome_completed(
        &mut self,
        chromosome: &Chromosome,
        items_written: usize,
        elapsed: Duration,
    ) {
        info!(
            "Chromosome {} completed in {:.2?} ({} items)",
            chromosome.ensembl_name, elapsed, items_written
        );
    }

    fn item_skipped(&mut self, chromosome: &Chromosome, position: i32, reason: &SkipReason) {
        debug!("Skipping item at {chromosome}:{position}: {reason}");
    }

    fn block_flushed(&mut self, entry: &IndexEntry) {
        debug!(
            "Flushed block [{}, {}] for chromosome index {}: {} bytes at offset {}",
            entry.first_position,
            entry.last_position,
            entry.chromosome_index,
            entry.byte_length,
            entry.file_offset
        );
    }
}
