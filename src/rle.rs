//! Run-length decoding of compressed reply bodies
//!
//! The server may compress the parameter area of a reply. The scheme works
//! byte by byte with `0x1B` as the escape byte:
//!
//! ```text
//! b1 != 1B             literal b1
//! 1B 1B                literal 1B
//! 1B v1 v2 nn nn       v1 v2 repeated nnnn times (2 * nnnn bytes)
//! ```
//!
//! A run record with a zero pair count, or an escape cut off by the end of
//! the compressed area, is a framing error. The decoder keeps the pending run
//! between calls, so multi-byte reads are just repeated single-byte reads.

use crate::buffer::ReadBuffer;
use crate::constants::RLE_ESCAPE;
use crate::error::{Error, Result};

/// Stateful decoder for one compressed reply body
#[derive(Debug, Clone, Default)]
pub struct RleDecoder {
    value1: u8,
    value2: u8,
    /// Logical bytes still owed by the current run
    remaining: u32,
}

impl RleDecoder {
    /// Create an idle decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no run is partially emitted
    pub fn is_idle(&self) -> bool {
        self.remaining == 0
    }

    /// Logical bytes still pending from the current run
    pub fn pending(&self) -> u32 {
        self.remaining
    }

    /// Drop any pending run
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Produce the next logical byte
    ///
    /// Physical bytes are taken from `src`, which must not be read past
    /// `limit` (the end of the compressed area).
    pub fn next_byte(&mut self, src: &mut ReadBuffer, limit: usize) -> Result<u8> {
        if self.remaining > 0 {
            return Ok(self.emit());
        }

        let b1 = Self::take(src, limit, false)?;
        if b1 != RLE_ESCAPE {
            return Ok(b1);
        }

        let b2 = Self::take(src, limit, true)?;
        if b2 == RLE_ESCAPE {
            return Ok(RLE_ESCAPE);
        }

        let b3 = Self::take(src, limit, true)?;
        let hi = Self::take(src, limit, true)?;
        let lo = Self::take(src, limit, true)?;
        let count = u16::from_be_bytes([hi, lo]);
        if count == 0 {
            return Err(Error::MalformedRun(format!(
                "zero pair count for run {:#04x} {:#04x}",
                b2, b3
            )));
        }

        self.value1 = b2;
        self.value2 = b3;
        self.remaining = u32::from(count) * 2;
        Ok(self.emit())
    }

    /// Fill `dst` with logical bytes
    pub fn read_into(&mut self, src: &mut ReadBuffer, limit: usize, dst: &mut [u8]) -> Result<()> {
        for slot in dst.iter_mut() {
            *slot = self.next_byte(src, limit)?;
        }
        Ok(())
    }

    /// True when both the pending run and the physical input are used up
    pub fn is_exhausted(&self, src: &ReadBuffer, limit: usize) -> bool {
        self.remaining == 0 && src.position() >= limit
    }

    #[inline]
    fn emit(&mut self) -> u8 {
        // The run has an even length and starts with value1
        let byte = if self.remaining % 2 == 0 {
            self.value1
        } else {
            self.value2
        };
        self.remaining -= 1;
        byte
    }

    fn take(src: &mut ReadBuffer, limit: usize, in_record: bool) -> Result<u8> {
        if src.position() >= limit {
            return Err(if in_record {
                Error::MalformedRun("escape sequence truncated by end of data".to_string())
            } else {
                Error::framing("compressed data exhausted")
            });
        }
        src.read_u8()
    }
}

/// Decode a complete compressed buffer
pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut src = ReadBuffer::from_slice(data);
    let limit = data.len();
    let mut decoder = RleDecoder::new();
    let mut out = Vec::with_capacity(data.len());
    while !decoder.is_exhausted(&src, limit) {
        out.push(decoder.next_byte(&mut src, limit)?);
    }
    Ok(out)
}
