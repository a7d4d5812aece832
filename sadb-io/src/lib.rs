//! # Binary codecs for supplementary annotation databases
//!
//! Everything that touches the on-disk layout lives here: the variable length integer and
//! string primitives, the shared file header, the compressed block buffer, the chunked index
//! written next to every positional store and the tag index kept alongside sorted text files.
//!
pub mod binary;
pub mod block;
pub mod chunked_index;
pub mod header;
pub mod position;
pub mod tag_index;

// re-expose core functions
pub use binary::*;
pub use block::*;
pub use chunked_index::*;
pub use header::*;
pub use position::*;
pub use tag_index::*;
