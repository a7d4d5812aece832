use thiserror::Error;

/// Error type shared by the `sadb` crates.
#[derive(Error, Debug)]
pub enum SaError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Can't read FASTA file: {0}")]
    Fasta(String),

    #[error(
        "Reference allele mismatch at {chromosome}:{position}. Expected: {expected}, found in reference: {actual}"
    )]
    ReferenceMismatch {
        chromosome: String,
        position: i32,
        expected: String,
        actual: String,
    },

    #[error("Conflicting entries for items at {chromosome}:{position} for alleles {ref_allele} > {alt_allele}")]
    ConflictingAlleles {
        chromosome: String,
        position: i32,
        ref_allele: String,
        alt_allele: String,
    },

    #[error("Tag '{0}' was seen more than once. Input must be sorted by tag, out of order or duplicate tag found")]
    DuplicateTag(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Expected a guard integer ({expected}), but found another value: ({found})")]
    GuardMismatch { expected: u32, found: u32 },

    #[error("Corrupted record: {0}")]
    CorruptRecord(String),

    #[error("Chromosome not found in the reference sequence: {0}")]
    UnknownChromosome(String),
}

/// Result type alias for `sadb` operations.
pub type Result<T> = std::result::Result<T, SaError>;
