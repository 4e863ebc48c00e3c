//! Write side of the message buffers
//!
//! Requests are written front to back in one pass; the encoder computes the
//! total length before the header goes out, so nothing is patched later.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};

/// Growable buffer a request is written into
#[derive(Debug, Default)]
pub struct WriteBuffer {
    data: BytesMut,
    limit: Option<usize>,
}

impl WriteBuffer {
    /// Empty buffer without a size limit
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty buffer with room for `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
            limit: None,
        }
    }

    /// Buffer that refuses to grow past `max_capacity` bytes
    pub fn with_max_capacity(capacity: usize, max_capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
            limit: Some(max_capacity),
        }
    }

    /// Bytes written so far
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True before anything is written
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Drop everything written
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Bytes written so far
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Finish writing
    pub fn freeze(self) -> Bytes {
        self.data.freeze()
    }

    #[inline]
    fn reserve(&mut self, n: usize) -> Result<&mut BytesMut> {
        if let Some(max) = self.limit {
            let available = max.saturating_sub(self.data.len());
            if n > available {
                return Err(Error::BufferOverflow {
                    needed: n,
                    available,
                });
            }
        }
        Ok(&mut self.data)
    }

    /// Write one byte
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.reserve(1)?.put_u8(value);
        Ok(())
    }

    /// Write raw bytes
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve(bytes.len())?.put_slice(bytes);
        Ok(())
    }

    /// Write `n` zero bytes
    pub fn write_zeros(&mut self, n: usize) -> Result<()> {
        self.reserve(n)?.put_bytes(0, n);
        Ok(())
    }

    /// Write a big-endian u16
    pub fn write_u16_be(&mut self, value: u16) -> Result<()> {
        self.reserve(2)?.put_u16(value);
        Ok(())
    }

    /// Write a big-endian u32
    pub fn write_u32_be(&mut self, value: u32) -> Result<()> {
        self.reserve(4)?.put_u32(value);
        Ok(())
    }

    /// Write a big-endian i32
    pub fn write_i32_be(&mut self, value: i32) -> Result<()> {
        self.reserve(4)?.put_i32(value);
        Ok(())
    }
}

impl AsRef<[u8]> for WriteBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
