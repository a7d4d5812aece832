//! # Supplementary annotation database writers
//!
//! Turns a stream of [`AnnotationItem`](sadb_core::AnnotationItem)s, sorted by chromosome and
//! untrimmed position, into a block-compressed position-keyed store (`.nsa`) with a chunked index
//! (`.nsa.idx`). Gene-keyed annotations go into a simpler `.nga` store.
//!
//! ```no_run
//! use sadb_core::reference::FastaSequenceProvider;
//! use sadb_core::DataSourceVersion;
//! use sadb_nsa::{NsaWriter, WriterConfig};
//!
//! # fn main() -> sadb_core::Result<()> {
//! let reference = FastaSequenceProvider::new("GRCh38.fa.gz");
//! let version = DataSourceVersion::new("ClinVar", "20240101", 1704067200, "clinical");
//! let config = WriterConfig::new("clinvar");
//! let writer = NsaWriter::create("out/clinvar", version, reference, config)?;
//! writer.write(Vec::new())?;
//! # Ok(())
//! # }
//! ```
//!
pub mod arbitration;
pub mod config;
pub mod gene;
pub mod heap;
pub mod observer;
pub mod reader;
pub mod writer;

// re-export for cleaner imports
pub use config::{DatabaseConfig, WriterConfig, WriterConfigError};
pub use gene::{GeneStore, NgaWriter, read_gene_store};
pub use heap::MinHeap;
pub use observer::{LogObserver, NullObserver, SkipReason, WriteObserver};
pub use reader::{AlleleAnnotation, AnnotationRecord, NsaReader};
pub use writer::{NsaWriter, WriteSummary};
