/// Written after every header. A different value on read means the file is truncated or corrupt.
pub const GUARD_INT: u32 = 4_041_327_495;

/// Current layout version of the stores written by this workspace.
pub const SCHEMA_VERSION: u16 = 22;

/// Uncompressed bytes buffered per block before it is compressed and flushed.
pub const DEFAULT_BLOCK_SIZE: usize = 8 * 1024 * 1024;

/// How far (in bases) trimming may move an item to the left of the position it arrived at.
pub const MAX_UPSTREAM_LENGTH: i32 = 500;

pub const NSA_MAGIC: &[u8; 8] = b"SADBNSA1";
pub const NGA_MAGIC: &[u8; 8] = b"SADBNGA1";

pub const NSA_FILE_EXTENSION: &str = ".nsa";
pub const NSA_INDEX_EXTENSION: &str = ".idx";
pub const NGA_FILE_EXTENSION: &str = ".nga";
