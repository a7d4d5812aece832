#[cfg(feature = "core")]
#[doc(inline)]
pub use sadb_core as core;

#[cfg(feature = "io")]
#[doc(inline)]
pub use sadb_io as io;

#[cfg(feature = "nsa")]
#[doc(inline)]
pub use sadb_nsa as nsa;
