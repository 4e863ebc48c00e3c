//! Message header encoding/decoding
//!
//! Every request and reply starts with the same 20-byte header:
//!
//! ```text
//! +-------------------+---------+---------+-------------------+
//! | Length (4)        | HdrId(2)| SrvId(2)| CS Instance (4)   |
//! +-------------------+---------+---------+-------------------+
//! | Correlation (4)   | TplLen(2)| ReqRep(2)|
//! +-------------------+---------+---------+
//! ```

use bytes::Bytes;

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::constants::{DATABASE_SERVER_ID, HEADER_LENGTH, TEMPLATE_LENGTH};
use crate::error::{Error, Result};

/// Fixed message header (20 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageHeader {
    /// Total message length including this header
    pub length: u32,
    /// Header id (0 on requests)
    pub header_id: u16,
    /// Server id (`0xE004` for the database server)
    pub server_id: u16,
    /// Client/server instance (0)
    pub cs_instance: u32,
    /// Correlation id shared by a request and its reply
    pub correlation_id: u32,
    /// Length of the template following the header
    pub template_length: u16,
    /// Function id on requests, reply id on replies
    pub req_rep_id: u16,
}

impl MessageHeader {
    /// Create a request header for the database server
    pub fn request(req_rep_id: u16, correlation_id: u32, length: u32) -> Self {
        Self {
            length,
            header_id: 0,
            server_id: DATABASE_SERVER_ID,
            cs_instance: 0,
            correlation_id,
            template_length: TEMPLATE_LENGTH as u16,
            req_rep_id,
        }
    }

    /// Parse a header from raw bytes
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LENGTH {
            return Err(Error::framing(format!(
                "message too short for header: {} bytes",
                data.len()
            )));
        }
        let mut buf = ReadBuffer::from_slice(&data[..HEADER_LENGTH]);
        Self::read(&mut buf)
    }

    /// Read a header from a buffer
    pub fn read(buf: &mut ReadBuffer) -> Result<Self> {
        Ok(Self {
            length: buf.read_u32_be()?,
            header_id: buf.read_u16_be()?,
            server_id: buf.read_u16_be()?,
            cs_instance: buf.read_u32_be()?,
            correlation_id: buf.read_u32_be()?,
            template_length: buf.read_u16_be()?,
            req_rep_id: buf.read_u16_be()?,
        })
    }

    /// Write the header to a buffer
    pub fn write(&self, buf: &mut WriteBuffer) -> Result<()> {
        buf.write_u32_be(self.length)?;
        buf.write_u16_be(self.header_id)?;
        buf.write_u16_be(self.server_id)?;
        buf.write_u32_be(self.cs_instance)?;
        buf.write_u32_be(self.correlation_id)?;
        buf.write_u16_be(self.template_length)?;
        buf.write_u16_be(self.req_rep_id)?;
        Ok(())
    }

    /// Encode the header to bytes
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = WriteBuffer::with_capacity(HEADER_LENGTH);
        self.write(&mut buf)?;
        Ok(buf.freeze())
    }
}
