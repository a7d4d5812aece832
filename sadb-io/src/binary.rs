use std::io::{self, Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};

use sadb_core::{Result, SaError};

/// A u64 never takes more than ten 7-bit groups.
const MAX_OPT_BYTES: usize = 10;

fn invalid_data(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.to_string())
}

///
/// Writes the primitives shared by every store: 7-bit variable length integers ("opt"
/// encoding) and strings prefixed with their byte length.
///
/// Signed values are written as their two's complement bit pattern, so negative numbers take
/// the full width.
///
pub trait WriteSaExt: Write {
    fn write_opt_u64(&mut self, mut value: u64) -> io::Result<()> {
        while value >= 0x80 {
            self.write_u8((value as u8) | 0x80)?;
            value >>= 7;
        }
        self.write_u8(value as u8)
    }

    fn write_opt_u32(&mut self, value: u32) -> io::Result<()> {
        self.write_opt_u64(value as u64)
    }

    fn write_opt_i32(&mut self, value: i32) -> io::Result<()> {
        self.write_opt_u64(value as u32 as u64)
    }

    fn write_opt_i64(&mut self, value: i64) -> io::Result<()> {
        self.write_opt_u64(value as u64)
    }

    fn write_opt_usize(&mut self, value: usize) -> io::Result<()> {
        self.write_opt_u64(value as u64)
    }

    fn write_opt_string(&mut self, value: &str) -> io::Result<()> {
        self.write_opt_usize(value.len())?;
        self.write_all(value.as_bytes())
    }

    fn write_bool(&mut self, value: bool) -> io::Result<()> {
        self.write_u8(value as u8)
    }
}

impl<W: Write + ?Sized> WriteSaExt for W {}

///
/// Reading counterpart of [`WriteSaExt`].
///
pub trait ReadSaExt: Read {
    fn read_opt_u64(&mut self) -> io::Result<u64> {
        let mut value = 0u64;
        for i in 0..MAX_OPT_BYTES {
            let byte = self.read_u8()?;
            value |= ((byte & 0x7f) as u64) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(invalid_data("Variable length integer is longer than ten bytes"))
    }

    fn read_opt_u32(&mut self) -> io::Result<u32> {
        u32::try_from(self.read_opt_u64()?)
            .map_err(|_| invalid_data("Variable length integer does not fit in 32 bits"))
    }

    fn read_opt_i32(&mut self) -> io::Result<i32> {
        Ok(self.read_opt_u32()? as i32)
    }

    fn read_opt_i64(&mut self) -> io::Result<i64> {
        Ok(self.read_opt_u64()? as i64)
    }

    fn read_opt_usize(&mut self) -> io::Result<usize> {
        usize::try_from(self.read_opt_u64()?)
            .map_err(|_| invalid_data("Variable length integer does not fit in usize"))
    }

    fn read_opt_string(&mut self) -> io::Result<String> {
        let len = self.read_opt_u64()?;
        let mut buffer = Vec::new();
        self.take(len).read_to_end(&mut buffer)?;
        if buffer.len() as u64 != len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("String of {len} bytes ends after {}", buffer.len()),
            ));
        }
        String::from_utf8(buffer).map_err(|_| invalid_data("String is not valid UTF-8"))
    }

    fn read_bool(&mut self) -> io::Result<bool> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(invalid_data(&format!("Invalid boolean byte: {other:#x}"))),
        }
    }
}

impl<R: Read + ?Sized> ReadSaExt for R {}

///
/// Check a record count read from a file against the bytes left to hold the records.
///
/// `min_bytes` is the smallest encoding of one record.
///
pub fn checked_count(count: usize, remaining: usize, min_bytes: usize) -> Result<usize> {
    if count > remaining / min_bytes.max(1) {
        return Err(SaError::CorruptRecord(format!(
            "{count} records can't fit in {remaining} bytes"
        )));
    }
    Ok(count)
}
