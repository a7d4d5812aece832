//! # Core models for supplementary annotation databases
//!
//! This crate holds the pieces every other `sadb` crate builds on: chromosomes, the
//! [`AnnotationItem`](models::AnnotationItem) that flows from source readers into the writers,
//! the per-source payload variants and their JSON rendering, allele trimming, the item ordering
//! function and the reference-sequence provider used to cross-validate reference alleles.
//!
pub mod consts;
pub mod errors;
pub mod models;
pub mod reference;
pub mod trim;
pub mod utils;

// re-export for cleaner imports
pub use errors::{Result, SaError};
pub use models::{AnnotationItem, Chromosome, DataSourceVersion, JsonRender, Payload};
