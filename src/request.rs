//! Request encoding
//!
//! [`RequestEncoder`] turns a function id and an attribute set into one
//! complete request message. The message length is known before anything is
//! written: header, template and the sum of every parameter's `ll`.

use bytes::Bytes;
use tracing::trace;

use crate::attributes::RequestAttributes;
use crate::buffer::{ReadBuffer, WriteBuffer};
use crate::constants::{ors, FunctionId, MAX_CORRELATION_ID, MIN_MESSAGE_LENGTH};
use crate::error::{Error, Result};
use crate::message::{MessageHeader, ParameterList, RawParameter, RequestTemplate};
use crate::text::TextConverter;

/// Correlation id allocator
///
/// Ids start at 1, grow by one per request and wrap from `0x7FFFFFFF` back
/// to 1. Zero is never handed out.
#[derive(Debug, Clone)]
pub struct CorrelationIds {
    next: u32,
}

impl CorrelationIds {
    /// Start at 1
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Start at `first` (clamped into the valid range)
    pub fn starting_at(first: u32) -> Self {
        let next = if first == 0 || first > MAX_CORRELATION_ID {
            1
        } else {
            first
        };
        Self { next }
    }

    /// Id the next request will get
    pub fn peek(&self) -> u32 {
        self.next
    }

    /// Hand out the next id
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next = if id >= MAX_CORRELATION_ID { 1 } else { id + 1 };
        id
    }
}

impl Default for CorrelationIds {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-request values owned by the session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Request parameter block the request runs against (0 = none)
    pub rpb_handle: u16,
    /// ORS bits every request carries (reply immediately, SQLCA, compression,
    /// message information)
    pub base_ors: u32,
}

/// An encoded request ready to be sent
#[derive(Debug, Clone)]
pub struct Request {
    /// Function the request performs
    pub function: FunctionId,
    /// Correlation id the reply must echo
    pub correlation_id: u32,
    /// Complete message bytes
    pub bytes: Bytes,
}

/// Builds request messages and allocates their correlation ids
#[derive(Debug, Default)]
pub struct RequestEncoder {
    ids: CorrelationIds,
}

impl RequestEncoder {
    /// Create an encoder whose first request gets correlation id 1
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder with a preset correlation id allocator
    pub fn with_ids(ids: CorrelationIds) -> Self {
        Self { ids }
    }

    /// Correlation id the next request will get
    pub fn next_correlation_id(&self) -> u32 {
        self.ids.peek()
    }

    /// Encode one request
    ///
    /// Attributes are validated before a correlation id is allocated, so a
    /// rejected request leaves the sequence untouched.
    pub fn encode<A: RequestAttributes + ?Sized>(
        &mut self,
        function: FunctionId,
        attrs: &A,
        ctx: &RequestContext,
        converter: &dyn TextConverter,
    ) -> Result<Request> {
        attrs.validate(function.name())?;

        let mut params = ParameterList::new();
        attrs.write_parameters(&mut params, converter)?;

        let length = MIN_MESSAGE_LENGTH + params.total_length();
        let length_u32 = u32::try_from(length)
            .map_err(|_| Error::invalid(function.name(), "request exceeds 4 GiB"))?;
        let parameter_count = u16::try_from(params.len())
            .map_err(|_| Error::invalid(function.name(), "too many parameters"))?;

        let correlation_id = self.ids.next_id();
        let header = MessageHeader::request(function as u16, correlation_id, length_u32);
        let template = RequestTemplate {
            ors_bitmap: ctx.base_ors | operation_ors(function, attrs),
            return_ors_handle: ctx.rpb_handle,
            fill_ors_handle: ctx.rpb_handle,
            based_on_ors_handle: 0,
            rpb_handle: ctx.rpb_handle,
            pm_descriptor_handle: attrs.descriptor_handle(),
            parameter_count,
        };

        let mut buf = WriteBuffer::with_capacity(length);
        header.write(&mut buf)?;
        template.write(&mut buf)?;
        params.write(&mut buf)?;
        if buf.len() != length {
            return Err(Error::Internal(format!(
                "{} encoded {} bytes, expected {}",
                function.name(),
                buf.len(),
                length
            )));
        }

        trace!(
            function = function.name(),
            correlation_id,
            length,
            parameters = parameter_count,
            ors = format_args!("{:#010x}", template.ors_bitmap),
            "encoded request"
        );

        Ok(Request {
            function,
            correlation_id,
            bytes: buf.freeze(),
        })
    }
}

/// ORS bits an operation asks for on top of the session's base bits
pub fn operation_ors<A: RequestAttributes + ?Sized>(function: FunctionId, attrs: &A) -> u32 {
    let ecd = if attrs.extended_column_descriptors() {
        ors::EXTENDED_COLUMN_DESCRIPTORS
    } else {
        0
    };
    match function {
        FunctionId::Describe | FunctionId::OpenAndDescribe => ors::DATA_FORMAT | ecd,
        FunctionId::PrepareAndDescribe => {
            let markers = match attrs.statement_text() {
                Some(text) if has_parameter_markers(text) => ors::PARAMETER_MARKER_FORMAT,
                _ => 0,
            };
            ors::DATA_FORMAT | markers | ecd
        }
        FunctionId::ExecuteOrOpenAndDescribe | FunctionId::OpenDescribeFetch => {
            ors::DATA_FORMAT | ors::RESULT_DATA | ecd
        }
        FunctionId::Fetch | FunctionId::StreamFetch | FunctionId::RetrieveLobData => {
            ors::RESULT_DATA
        }
        FunctionId::DescribeParameterMarker => ors::PARAMETER_MARKER_FORMAT,
        FunctionId::RetrievePackage => ors::PACKAGE_INFORMATION,
        FunctionId::SetServerAttributes => ors::SERVER_ATTRIBUTES,
        _ => 0,
    }
}

/// Whether SQL text contains a `?` parameter marker
///
/// Markers inside string literals, delimited identifiers and comments do not
/// count.
pub fn has_parameter_markers(sql: &str) -> bool {
    #[derive(PartialEq)]
    enum State {
        Code,
        Quoted(char),
        LineComment,
        BlockComment,
    }

    let mut state = State::Code;
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '?' => return true,
                '\'' | '"' => state = State::Quoted(c),
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                }
                _ => {}
            },
            // A doubled quote closes and reopens the literal
            State::Quoted(q) if c == q => state = State::Code,
            State::Quoted(_) => {}
            State::LineComment if c == '\n' => state = State::Code,
            State::LineComment => {}
            State::BlockComment if c == '*' && chars.peek() == Some(&'/') => {
                chars.next();
                state = State::Code;
            }
            State::BlockComment => {}
        }
    }
    false
}

/// A request parsed back from its bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMessage {
    /// Header
    pub header: MessageHeader,
    /// Template
    pub template: RequestTemplate,
    /// Parameters in wire order
    pub parameters: Vec<RawParameter>,
}

impl RequestMessage {
    /// Parse a complete request message
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = MessageHeader::parse(data)?;
        if header.length as usize != data.len() {
            return Err(Error::framing(format!(
                "declared length {} but {} bytes present",
                header.length,
                data.len()
            )));
        }
        let mut buf = ReadBuffer::from_slice(data);
        buf.skip(crate::constants::HEADER_LENGTH)?;
        let template = RequestTemplate::read(&mut buf)?;
        let mut parameters = Vec::with_capacity(template.parameter_count as usize);
        for _ in 0..template.parameter_count {
            parameters.push(RawParameter::read(&mut buf)?);
        }
        if buf.remaining() > 0 {
            return Err(Error::framing(format!(
                "{} bytes after the last parameter",
                buf.remaining()
            )));
        }
        Ok(Self {
            header,
            template,
            parameters,
        })
    }

    /// Function id of the request
    pub fn function(&self) -> Result<FunctionId> {
        FunctionId::try_from(self.header.req_rep_id)
    }

    /// First parameter with `codepoint`
    pub fn parameter(&self, codepoint: u16) -> Option<&RawParameter> {
        self.parameters.iter().find(|p| p.codepoint == codepoint)
    }
}
