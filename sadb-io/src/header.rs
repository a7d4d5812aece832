use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use sadb_core::consts::{GUARD_INT, NGA_MAGIC, NSA_MAGIC};
use sadb_core::{DataSourceVersion, Result, SaError};

use crate::binary::{ReadSaExt, WriteSaExt};

/// Which kind of store a header opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Position-keyed store with a chunked index.
    Positional,
    /// Gene-keyed store.
    Gene,
}

impl StoreKind {
    pub fn magic(&self) -> &'static [u8; 8] {
        match self {
            StoreKind::Positional => NSA_MAGIC,
            StoreKind::Gene => NGA_MAGIC,
        }
    }

    fn from_magic(magic: &[u8; 8]) -> Option<Self> {
        match magic {
            m if m == NSA_MAGIC => Some(StoreKind::Positional),
            m if m == NGA_MAGIC => Some(StoreKind::Gene),
            _ => None,
        }
    }
}

///
/// The preamble shared by both stores.
///
/// `is_array` records the layout of the per-position records: `true` when each record holds a
/// count followed by `(ref, alt, json)` triples, `false` when it holds a single JSON payload.
///
#[derive(Debug, Clone, PartialEq)]
pub struct SaHeader {
    pub kind: StoreKind,
    pub version: DataSourceVersion,
    pub json_key: String,
    pub is_array: bool,
    pub schema_version: u16,
}

impl SaHeader {
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(self.kind.magic())?;
        write_version(writer, &self.version)?;
        writer.write_opt_string(&self.json_key)?;
        writer.write_bool(self.is_array)?;
        writer.write_u16::<LittleEndian>(self.schema_version)?;
        writer.write_u32::<LittleEndian>(GUARD_INT)?;
        Ok(())
    }

    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 8];
        reader.read_exact(&mut magic)?;
        let kind = StoreKind::from_magic(&magic).ok_or_else(|| {
            SaError::InvalidHeader(format!(
                "unrecognized identifier {:?}",
                String::from_utf8_lossy(&magic)
            ))
        })?;

        let version = read_version(reader)?;
        let json_key = reader.read_opt_string()?;
        let is_array = reader.read_bool()?;
        let schema_version = reader.read_u16::<LittleEndian>()?;

        let guard = reader.read_u32::<LittleEndian>()?;
        if guard != GUARD_INT {
            return Err(SaError::GuardMismatch {
                expected: GUARD_INT,
                found: guard,
            });
        }

        Ok(SaHeader {
            kind,
            version,
            json_key,
            is_array,
            schema_version,
        })
    }

    ///
    /// Read a header and make sure it opens the expected kind of store.
    ///
    pub fn read_expecting<R: Read>(reader: &mut R, kind: StoreKind) -> Result<Self> {
        let header = Self::read(reader)?;
        if header.kind != kind {
            return Err(SaError::InvalidHeader(format!(
                "expected a {:?} store, found a {:?} store",
                kind, header.kind
            )));
        }
        Ok(header)
    }
}

pub fn write_version<W: Write>(writer: &mut W, version: &DataSourceVersion) -> Result<()> {
    writer.write_opt_string(&version.name)?;
    writer.write_opt_string(&version.version)?;
    writer.write_opt_i64(version.release_date)?;
    writer.write_opt_string(&version.description)?;
    Ok(())
}

pub fn read_version<R: Read>(reader: &mut R) -> Result<DataSourceVersion> {
    let name = reader.read_opt_string()?;
    let version = reader.read_opt_string()?;
    let release_date = reader.read_opt_i64()?;
    let description = reader.read_opt_string()?;

    Ok(DataSourceVersion {
        name,
        version,
        release_date,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn header() -> SaHeader {
        SaHeader {
            kind: StoreKind::Positional,
            version: DataSourceVersion::new("gnomAD", "2.1", 1_546_300_800, "genome frequencies"),
            json_key: "gnomad".to_string(),
            is_array: true,
            schema_version: 22,
        }
    }

    #[rstest]
    fn test_header_layout(header: SaHeader) {
        let mut buffer = Vec::new();
        header.write(&mut buffer).unwrap();

        assert_eq!(&buffer[..8], b"SADBNSA1");
        // schema version then guard close the header
        let tail = &buffer[buffer.len() - 6..];
        assert_eq!(tail[..2], 22u16.to_le_bytes());
        assert_eq!(tail[2..], GUARD_INT.to_le_bytes());

        let read = SaHeader::read(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(read, header);
    }

    #[rstest]
    fn test_bad_magic(header: SaHeader) {
        let mut buffer = Vec::new();
        header.write(&mut buffer).unwrap();
        buffer[0] = b'X';

        let result = SaHeader::read(&mut Cursor::new(buffer));
        assert!(matches!(result, Err(SaError::InvalidHeader(_))));
    }

    #[rstest]
    fn test_corrupt_guard(header: SaHeader) {
        let mut buffer = Vec::new();
        header.write(&mut buffer).unwrap();
        let last = buffer.len() - 1;
        buffer[last] ^= 0xff;

        let result = SaHeader::read(&mut Cursor::new(buffer));
        assert!(matches!(
            result,
            Err(SaError::GuardMismatch { expected: GUARD_INT, .. })
        ));
    }

    #[rstest]
    fn test_wrong_store_kind(header: SaHeader) {
        let mut buffer = Vec::new();
        header.write(&mut buffer).unwrap();

        let result = SaHeader::read_expecting(&mut Cursor::new(buffer), StoreKind::Gene);
        assert!(matches!(result, Err(SaError::InvalidHeader(_))));
    }
}
