use std::io::{self, Write};

///
/// Pass-through writer that counts the bytes written through it.
///
/// The count starts at the given offset, so wrapping a stream that already holds data keeps
/// positions absolute.
///
#[derive(Debug)]
pub struct PositionTracker<W: Write> {
    inner: W,
    position: u64,
}

impl<W: Write> PositionTracker<W> {
    pub fn new(inner: W) -> Self {
        Self::with_offset(inner, 0)
    }

    pub fn with_offset(inner: W, position: u64) -> Self {
        PositionTracker { inner, position }
    }

    /// Bytes written so far, i.e. where the next write lands.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for PositionTracker<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.position += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
