//! Codepoint-tagged parameters (LL/CP/data)
//!
//! Each parameter is `ll:u32`, `codepoint:u16` and `ll - 6` bytes of
//! payload. Request parameters are built through [`ParameterList`], which
//! only records attributes that are actually set. Parameters read back from
//! the wire are kept as [`RawParameter`] with typed accessors.

use bytes::Bytes;

use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::constants::{ccsid, PARAMETER_HEADER_LENGTH};
use crate::error::{Error, Result};
use crate::text::{self, TextConverter};

/// EBCDIC `'1'`, used for boolean options
pub const FLAG_ON: u8 = 0xF1;

/// EBCDIC `'0'`, used for boolean options
pub const FLAG_OFF: u8 = 0xF0;

/// Payload of a request parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    /// One byte
    Byte(u8),
    /// Two bytes
    Short(u16),
    /// Four bytes
    Int(u32),
    /// CCSID followed by already encoded text
    Text {
        /// CCSID of `bytes`
        ccsid: u16,
        /// Encoded text
        bytes: Vec<u8>,
    },
    /// CCSID, u32 byte length, then UTF-16 text
    WideText {
        /// CCSID of `bytes`
        ccsid: u16,
        /// Big-endian UTF-16 bytes
        bytes: Vec<u8>,
    },
    /// Raw bytes, no CCSID
    Binary(Vec<u8>),
    /// Scroll orientation with an optional distance
    Scroll {
        /// Orientation code
        orientation: u16,
        /// Distance for relative and absolute positioning
        distance: Option<i32>,
    },
}

impl ParameterValue {
    /// Number of payload bytes
    pub fn payload_len(&self) -> usize {
        match self {
            ParameterValue::Byte(_) => 1,
            ParameterValue::Short(_) => 2,
            ParameterValue::Int(_) => 4,
            ParameterValue::Text { bytes, .. } => 2 + bytes.len(),
            ParameterValue::WideText { bytes, .. } => 6 + bytes.len(),
            ParameterValue::Binary(bytes) => bytes.len(),
            ParameterValue::Scroll { distance, .. } => 2 + if distance.is_some() { 4 } else { 0 },
        }
    }
}

/// A request parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Codepoint identifying the parameter
    pub codepoint: u16,
    /// Payload
    pub value: ParameterValue,
}

impl Parameter {
    /// Create a new parameter
    pub fn new(codepoint: u16, value: ParameterValue) -> Self {
        Self { codepoint, value }
    }

    /// Total encoded length, header included
    pub fn ll(&self) -> usize {
        PARAMETER_HEADER_LENGTH + self.value.payload_len()
    }

    /// Write the parameter to a buffer
    pub fn write(&self, buf: &mut WriteBuffer) -> Result<()> {
        let ll = u32::try_from(self.ll()).map_err(|_| {
            Error::invalid("encode", format!("parameter {:#06x} too large", self.codepoint))
        })?;
        buf.write_u32_be(ll)?;
        buf.write_u16_be(self.codepoint)?;
        match &self.value {
            ParameterValue::Byte(v) => buf.write_u8(*v),
            ParameterValue::Short(v) => buf.write_u16_be(*v),
            ParameterValue::Int(v) => buf.write_u32_be(*v),
            ParameterValue::Text { ccsid, bytes } => {
                buf.write_u16_be(*ccsid)?;
                buf.write_bytes(bytes)
            }
            ParameterValue::WideText { ccsid, bytes } => {
                let len = u32::try_from(bytes.len()).map_err(|_| {
                    Error::invalid("encode", format!("parameter {:#06x} too large", self.codepoint))
                })?;
                buf.write_u16_be(*ccsid)?;
                buf.write_u32_be(len)?;
                buf.write_bytes(bytes)
            }
            ParameterValue::Binary(bytes) => buf.write_bytes(bytes),
            ParameterValue::Scroll {
                orientation,
                distance,
            } => {
                buf.write_u16_be(*orientation)?;
                match distance {
                    Some(d) => buf.write_i32_be(*d),
                    None => Ok(()),
                }
            }
        }
    }
}

/// Ordered list of the parameters of one request
#[derive(Debug, Clone, Default)]
pub struct ParameterList {
    params: Vec<Parameter>,
}

impl ParameterList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter
    pub fn push(&mut self, parameter: Parameter) {
        self.params.push(parameter);
    }

    /// Append a one-byte parameter if set
    pub fn push_byte(&mut self, codepoint: u16, value: Option<u8>) {
        if let Some(v) = value {
            self.push(Parameter::new(codepoint, ParameterValue::Byte(v)));
        }
    }

    /// Append a boolean option if set
    pub fn push_flag(&mut self, codepoint: u16, value: Option<bool>) {
        self.push_byte(codepoint, value.map(|on| if on { FLAG_ON } else { FLAG_OFF }));
    }

    /// Append a two-byte parameter if set
    pub fn push_short(&mut self, codepoint: u16, value: Option<u16>) {
        if let Some(v) = value {
            self.push(Parameter::new(codepoint, ParameterValue::Short(v)));
        }
    }

    /// Append a four-byte parameter if set
    pub fn push_int(&mut self, codepoint: u16, value: Option<u32>) {
        if let Some(v) = value {
            self.push(Parameter::new(codepoint, ParameterValue::Int(v)));
        }
    }

    /// Append single-byte text in the converter's CCSID if set
    pub fn push_text(
        &mut self,
        codepoint: u16,
        value: Option<&str>,
        converter: &dyn TextConverter,
    ) -> Result<()> {
        if let Some(v) = value {
            let bytes = converter.encode(v)?;
            self.push(Parameter::new(
                codepoint,
                ParameterValue::Text {
                    ccsid: converter.ccsid(),
                    bytes,
                },
            ));
        }
        Ok(())
    }

    /// Append UTF-16 text if set, with its byte length after the CCSID
    pub fn push_wide_text(&mut self, codepoint: u16, value: Option<&str>) {
        if let Some(v) = value {
            self.push(Parameter::new(
                codepoint,
                ParameterValue::WideText {
                    ccsid: ccsid::UCS2,
                    bytes: text::encode_utf16(v),
                },
            ));
        }
    }

    /// Append raw bytes if set
    pub fn push_binary(&mut self, codepoint: u16, value: Option<&[u8]>) {
        if let Some(v) = value {
            self.push(Parameter::new(codepoint, ParameterValue::Binary(v.to_vec())));
        }
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Sum of the `ll` of every parameter
    pub fn total_length(&self) -> usize {
        self.params.iter().map(Parameter::ll).sum()
    }

    /// Iterate over the parameters in emission order
    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.params.iter()
    }

    /// Write every parameter to a buffer
    pub fn write(&self, buf: &mut WriteBuffer) -> Result<()> {
        for param in &self.params {
            param.write(buf)?;
        }
        Ok(())
    }
}

/// A parameter as read back from a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParameter {
    /// Codepoint
    pub codepoint: u16,
    /// Payload (`ll - 6` bytes)
    pub payload: Bytes,
}

impl RawParameter {
    /// Read one LL/CP/data entry
    pub fn read(buf: &mut ReadBuffer) -> Result<Self> {
        let ll = buf.read_u32_be()? as usize;
        if ll < PARAMETER_HEADER_LENGTH {
            return Err(Error::framing(format!("parameter length {} below minimum", ll)));
        }
        let codepoint = buf.read_u16_be()?;
        let payload = buf.read_bytes_owned(ll - PARAMETER_HEADER_LENGTH)?;
        Ok(Self { codepoint, payload })
    }

    /// Total encoded length, header included
    pub fn ll(&self) -> usize {
        PARAMETER_HEADER_LENGTH + self.payload.len()
    }

    /// Payload as a single byte
    pub fn as_u8(&self) -> Result<u8> {
        self.fixed::<1>().map(|b| b[0])
    }

    /// Payload as a big-endian u16
    pub fn as_u16(&self) -> Result<u16> {
        self.fixed::<2>().map(u16::from_be_bytes)
    }

    /// Payload as a big-endian u32
    pub fn as_u32(&self) -> Result<u32> {
        self.fixed::<4>().map(u32::from_be_bytes)
    }

    /// Raw payload bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }

    /// CCSID prefix of a text payload
    pub fn ccsid(&self) -> Result<u16> {
        if self.payload.len() < 2 {
            return Err(self.conversion("missing CCSID"));
        }
        Ok(u16::from_be_bytes([self.payload[0], self.payload[1]]))
    }

    /// Decode a CCSID-prefixed text payload
    pub fn as_text(&self, converter: &dyn TextConverter) -> Result<String> {
        let ccsid = self.ccsid()?;
        converter.decode(ccsid, &self.payload[2..])
    }

    /// Decode a wide-text payload: CCSID, u32 byte length, UTF-16 text
    pub fn as_wide_text(&self) -> Result<String> {
        let ccsid = self.ccsid()?;
        let len = self.wide_text_length()? as usize;
        let text = &self.payload[6..];
        if text.len() != len {
            return Err(self.conversion(&format!(
                "wide text declares {} bytes, carries {}",
                len,
                text.len()
            )));
        }
        match ccsid {
            ccsid::UCS2 | ccsid::UTF16 => text::decode_utf16(text),
            other => Err(self.conversion(&format!("wide text tagged CCSID {}", other))),
        }
    }

    /// Byte length field of a wide-text payload
    pub fn wide_text_length(&self) -> Result<u32> {
        if self.payload.len() < 6 {
            return Err(self.conversion("missing wide text length"));
        }
        Ok(u32::from_be_bytes([
            self.payload[2],
            self.payload[3],
            self.payload[4],
            self.payload[5],
        ]))
    }

    /// Payload as a scroll orientation and optional distance
    pub fn as_scroll(&self) -> Result<(u16, Option<i32>)> {
        match self.payload.len() {
            2 => Ok((u16::from_be_bytes([self.payload[0], self.payload[1]]), None)),
            6 => Ok((
                u16::from_be_bytes([self.payload[0], self.payload[1]]),
                Some(i32::from_be_bytes([
                    self.payload[2],
                    self.payload[3],
                    self.payload[4],
                    self.payload[5],
                ])),
            )),
            n => Err(self.conversion(&format!("scroll option of {} bytes", n))),
        }
    }

    fn fixed<const N: usize>(&self) -> Result<[u8; N]> {
        <[u8; N]>::try_from(&self.payload[..]).map_err(|_| {
            self.conversion(&format!("expected {} bytes, got {}", N, self.payload.len()))
        })
    }

    fn conversion(&self, what: &str) -> Error {
        Error::DataConversionError(format!("parameter {:#06x}: {}", self.codepoint, what))
    }
}
