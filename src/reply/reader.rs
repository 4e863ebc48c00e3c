//! Reply byte reader with RLE support
//!
//! [`ReplyReader`] tracks two positions: the physical position in the
//! received message and the logical number of bytes handed to parsers. They
//! advance together until a compressed block is activated; from then on every
//! read goes through the run-length decoder and only the logical count moves
//! one byte per byte delivered.

use bytes::Bytes;

use crate::buffer::ReadBuffer;
use crate::error::{Error, Result};
use crate::rle::RleDecoder;

#[derive(Debug)]
struct Compression {
    decoder: RleDecoder,
    /// Physical end of the compressed block
    limit: usize,
}

/// Reader over one reply message
#[derive(Debug)]
pub struct ReplyReader {
    buf: ReadBuffer,
    rle: Option<Compression>,
    logical: usize,
}

impl ReplyReader {
    /// Create a reader over `data`, starting at physical offset `start`
    pub fn new(data: Bytes, start: usize) -> Result<Self> {
        let mut buf = ReadBuffer::new(data);
        buf.set_position(start)?;
        Ok(Self {
            buf,
            rle: None,
            logical: 0,
        })
    }

    /// Create a reader over a standalone uncompressed block
    pub fn from_slice(data: &[u8]) -> Self {
        Self {
            buf: ReadBuffer::from_slice(data),
            rle: None,
            logical: 0,
        }
    }

    /// Physical bytes taken from the message so far
    #[inline]
    pub fn physical(&self) -> usize {
        self.buf.position()
    }

    /// Logical bytes delivered so far
    #[inline]
    pub fn logical(&self) -> usize {
        self.logical
    }

    /// Total physical length of the message
    pub fn physical_len(&self) -> usize {
        self.buf.len()
    }

    /// Whether reads currently go through the RLE decoder
    pub fn is_compressed(&self) -> bool {
        self.rle.is_some()
    }

    /// Route the next `compressed_len` physical bytes through the decoder
    pub fn activate_compression(&mut self, compressed_len: usize) -> Result<()> {
        if self.rle.is_some() {
            return Err(Error::framing("nested RLE compressed block"));
        }
        let limit = self.buf.position() + compressed_len;
        if limit > self.buf.len() {
            return Err(Error::framing(format!(
                "compressed block of {} bytes runs past the message end",
                compressed_len
            )));
        }
        self.rle = Some(Compression {
            decoder: RleDecoder::new(),
            limit,
        });
        Ok(())
    }

    /// Whether the decoder has no run pending
    pub fn is_idle(&self) -> bool {
        self.rle.as_ref().map_or(true, |c| c.decoder.is_idle())
    }

    /// Physical bytes of the compressed block not yet consumed
    pub fn compressed_remaining(&self) -> usize {
        self.rle
            .as_ref()
            .map_or(0, |c| c.limit.saturating_sub(self.buf.position()))
    }

    /// Skip physical bytes without decoding them
    pub fn skip_physical(&mut self, n: usize) -> Result<()> {
        self.buf.skip(n)
    }

    // =========================================================================
    // Logical reads
    // =========================================================================

    /// Read one logical byte
    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = match &mut self.rle {
            Some(c) => c.decoder.next_byte(&mut self.buf, c.limit)?,
            None => self.buf.read_u8()?,
        };
        self.logical += 1;
        Ok(byte)
    }

    /// Fill `dst` with logical bytes
    pub fn read_into(&mut self, dst: &mut [u8]) -> Result<()> {
        match &mut self.rle {
            Some(c) => c.decoder.read_into(&mut self.buf, c.limit, dst)?,
            None => self.buf.read_bytes(dst)?,
        }
        self.logical += dst.len();
        Ok(())
    }

    /// Read `n` logical bytes into a new vector
    pub fn read_vec(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; n];
        self.read_into(&mut out)?;
        Ok(out)
    }

    /// Skip `n` logical bytes
    pub fn skip(&mut self, n: usize) -> Result<()> {
        match &mut self.rle {
            Some(c) => {
                for _ in 0..n {
                    c.decoder.next_byte(&mut self.buf, c.limit)?;
                }
            }
            None => self.buf.skip(n)?,
        }
        self.logical += n;
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        self.read_into(&mut out)?;
        Ok(out)
    }

    /// Read a big-endian u16
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_be_bytes)
    }

    /// Read a big-endian i16
    pub fn read_i16(&mut self) -> Result<i16> {
        self.read_array().map(i16::from_be_bytes)
    }

    /// Read a big-endian u32
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_be_bytes)
    }

    /// Read a big-endian i32
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_array().map(i32::from_be_bytes)
    }

    /// Read a big-endian u64
    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_array().map(u64::from_be_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncompressed_positions_move_together() {
        let mut reader = ReplyReader::from_slice(&[0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0xFF]);
        assert_eq!(reader.read_u16().unwrap(), 1);
        assert_eq!(reader.read_u32().unwrap(), 2);
        assert_eq!(reader.physical(), 6);
        assert_eq!(reader.logical(), 6);
        reader.skip(1).unwrap();
        assert!(reader.read_u8().unwrap_err().is_framing());
    }

    #[test]
    fn test_compressed_positions_diverge() {
        // 2 plain bytes, then a 5 byte run record expanding to 8 bytes
        let data = [0xAA, 0xBB, 0x1B, 0x00, 0x01, 0x00, 0x04];
        let mut reader = ReplyReader::new(Bytes::copy_from_slice(&data), 0).unwrap();
        assert_eq!(reader.read_u16().unwrap(), 0xAABB);
        reader.activate_compression(5).unwrap();
        assert_eq!(reader.read_u32().unwrap(), 0x0001_0001);
        assert!(!reader.is_idle());
        assert_eq!(reader.read_u32().unwrap(), 0x0001_0001);
        assert!(reader.is_idle());
        assert_eq!(reader.logical(), 10);
        assert_eq!(reader.physical(), 7);
        assert_eq!(reader.compressed_remaining(), 0);
        assert!(reader.read_u8().is_err());
    }

    #[test]
    fn test_activation_rules() {
        let mut reader = ReplyReader::from_slice(&[0; 8]);
        assert!(reader.activate_compression(9).unwrap_err().is_framing());
        reader.activate_compression(8).unwrap();
        assert!(reader.activate_compression(1).unwrap_err().is_framing());
    }
}
