//! Little-endian byte-stream reading shared by the model loaders.

use std::io::{self, Read};

/// Thin reader with the primitive reads the voxel formats need.
pub(crate) struct ByteReader<R> {
    inner: R,
}

impl<R: Read> ByteReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Reads a 4-byte tag.
    pub(crate) fn read_tag(&mut self) -> io::Result<[u8; 4]> {
        let mut tag = [0u8; 4];
        self.inner.read_exact(&mut tag)?;
        Ok(tag)
    }

    /// Reads a little-endian `u32`.
    pub(crate) fn read_u32(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Reads a little-endian `u16`.
    pub(crate) fn read_u16(&mut self) -> io::Result<u16> {
        let mut buf = [0u8; 2];
        self.inner.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Reads exactly `buf.len()` bytes.
    pub(crate) fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.inner.read_exact(buf)
    }

    /// Discards `count` bytes, failing if the stream ends first.
    pub(crate) fn skip(&mut self, count: u64) -> io::Result<()> {
        let copied = io::copy(&mut self.inner.by_ref().take(count), &mut io::sink())?;
        if copied != count {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        Ok(())
    }
}
