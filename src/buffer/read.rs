//! Read side of the message buffers
//!
//! Every integer on the wire is big-endian. Reads never move the position
//! past the end: a short read fails with [`Error::BufferUnderflow`] and
//! leaves the position where it was.

use bytes::Bytes;

use crate::error::{Error, Result};

/// Cursor over one received message
#[derive(Debug, Clone)]
pub struct ReadBuffer {
    data: Bytes,
    pos: usize,
}

impl ReadBuffer {
    /// Read from `data`, starting at offset 0
    pub fn new(data: Bytes) -> Self {
        Self { data, pos: 0 }
    }

    /// Read from a copy of `data`
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Current offset into the message
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Length of the whole message
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True for a zero-length message
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left after the current offset
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Move to an absolute offset
    pub fn set_position(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(Error::BufferUnderflow {
                needed: pos,
                available: self.data.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    /// Advance `n` bytes without reading them
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.check(n)?;
        self.pos += n;
        Ok(())
    }

    #[inline]
    fn check(&self, n: usize) -> Result<()> {
        let available = self.remaining();
        if available < n {
            return Err(Error::BufferUnderflow {
                needed: n,
                available,
            });
        }
        Ok(())
    }

    #[inline]
    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.check(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> Result<u8> {
        self.take::<1>().map(|[b]| b)
    }

    /// Fill `buf` from the message
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        let n = buf.len();
        self.check(n)?;
        buf.copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(())
    }

    /// Take `n` bytes as a shared slice of the message
    pub fn read_bytes_owned(&mut self, n: usize) -> Result<Bytes> {
        self.check(n)?;
        let bytes = self.data.slice(self.pos..self.pos + n);
        self.pos += n;
        Ok(bytes)
    }

    /// Read a big-endian u16
    pub fn read_u16_be(&mut self) -> Result<u16> {
        self.take().map(u16::from_be_bytes)
    }

    /// Read a big-endian u32
    pub fn read_u32_be(&mut self) -> Result<u32> {
        self.take().map(u32::from_be_bytes)
    }

    /// Read a big-endian i32
    pub fn read_i32_be(&mut self) -> Result<i32> {
        self.take().map(i32::from_be_bytes)
    }

    /// Look at the next byte without consuming it
    pub fn peek_u8(&self) -> Result<u8> {
        self.peek_bytes(1).map(|b| b[0])
    }

    /// Look at the next `n` bytes without consuming them
    pub fn peek_bytes(&self, n: usize) -> Result<&[u8]> {
        self.check(n)?;
        Ok(&self.data[self.pos..self.pos + n])
    }
}

impl From<Bytes> for ReadBuffer {
    fn from(data: Bytes) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for ReadBuffer {
    fn from(data: &[u8]) -> Self {
        Self::from_slice(data)
    }
}
