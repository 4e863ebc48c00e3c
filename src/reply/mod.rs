//! Reply decoding and dispatch
//!
//! [`decode_reply`] checks a received message against the request it
//! answers, classifies the outcome from the reply template and walks the
//! codepoint-tagged parameters. Each known codepoint is parsed and handed to
//! the matching callback; unknown ones are skipped. A compressed block
//! (codepoint `0x3832`) switches the rest of the reply to RLE decoding.

mod columns;
mod data;
pub(crate) mod format;
mod package;
mod reader;
mod server_attributes;
mod sqlca;

pub use columns::{parse_column_descriptors, ExtendedColumnDescriptor, ExtendedColumnDescriptors};
pub use data::{read_lob_data, read_lob_length, read_result_data, ResultDataHeader};
pub use format::{parse_data_format, DataFormat, FieldDescription, LayoutAccounting};
pub use package::{parse_package, PackageInfo, PackageStatement};
pub use reader::ReplyReader;
pub use server_attributes::{parse_server_attributes, ServerAttributes, ServerJob};
pub use sqlca::{parse_sqlca, Sqlca, SQLCA_LENGTH};

#[cfg(test)]
pub(crate) use server_attributes::test_support as server_attributes_support;
#[cfg(test)]
pub(crate) use sqlca::test_support as sqlca_support;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::buffer::ReadBuffer;
use crate::callback::{
    DescribeCallback, FetchCallback, LobDataCallback, PackageCallback, ParameterMarkerCallback,
    SqlcaCallback, WarningCallback,
};
use crate::constants::{
    codepoint, HEADER_LENGTH, MIN_MESSAGE_LENGTH, PARAMETER_HEADER_LENGTH, REPLY_ID,
    TEMPLATE_LENGTH,
};
use crate::error::{Error, Result, ServerError};
use crate::message::{MessageHeader, ReplyTemplate};
use crate::text::TextConverter;

/// Default LOB segment size
pub const DEFAULT_LOB_SEGMENT_SIZE: usize = 32 * 1024;

/// Summary of a decoded reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    /// Correlation id of the reply
    pub correlation_id: u32,
    /// Reply template
    pub template: ReplyTemplate,
    /// Message id, when the reply carried one
    pub message_id: Option<String>,
    /// First-level message text
    pub message_text: Option<String>,
    /// Second-level message text
    pub second_level_text: Option<String>,
    /// SQL communications area
    pub sqlca: Option<Sqlca>,
    /// Server attributes
    pub server_attributes: Option<ServerAttributes>,
    /// Current LOB length
    pub lob_length: Option<u64>,
    /// Rows delivered to the fetch callback
    pub rows_received: u64,
    /// Codepoints that were not understood and skipped
    pub skipped_codepoints: Vec<u16>,
}

impl Reply {
    /// Rows affected, from the SQLCA
    pub fn update_count(&self) -> Option<i32> {
        self.sqlca.as_ref().map(Sqlca::update_count)
    }

    /// Whether the reply reports end of data
    pub fn is_end_of_data(&self) -> bool {
        self.template.is_end_of_data()
    }

    /// Whether the reply carries a warning
    pub fn is_warning(&self) -> bool {
        self.template.is_warning()
    }
}

/// Buffers reused across replies
#[derive(Debug, Clone)]
pub struct ScratchBuffers {
    /// One result row
    pub row: Vec<u8>,
    /// One LOB segment, sized on first use
    pub lob: Vec<u8>,
    /// Segment size when the LOB callback has no preference
    pub lob_segment_size: usize,
}

impl ScratchBuffers {
    /// Create empty buffers
    pub fn new(lob_segment_size: usize) -> Self {
        Self {
            row: Vec::new(),
            lob: Vec::new(),
            lob_segment_size: lob_segment_size.max(1),
        }
    }
}

impl Default for ScratchBuffers {
    fn default() -> Self {
        Self::new(DEFAULT_LOB_SEGMENT_SIZE)
    }
}

/// Callbacks the decoder may deliver to
#[derive(Default)]
pub struct ReplyHandlers<'a> {
    /// Warnings and message information
    pub warning: Option<&'a mut dyn WarningCallback>,
    /// SQLCA
    pub sqlca: Option<&'a mut dyn SqlcaCallback>,
    /// Data formats and column descriptors
    pub describe: Option<&'a mut dyn DescribeCallback>,
    /// Parameter marker formats
    pub parameter_marker: Option<&'a mut dyn ParameterMarkerCallback>,
    /// Result rows
    pub fetch: Option<&'a mut dyn FetchCallback>,
    /// Package contents
    pub package: Option<&'a mut dyn PackageCallback>,
    /// LOB data
    pub lob: Option<&'a mut dyn LobDataCallback>,
}

/// Check and decode one reply
///
/// `bytes` must be the complete message as received. Framing problems are
/// returned as framing errors; a reply with a negative return code becomes
/// [`Error::Server`] after its message and SQLCA information is collected.
pub fn decode_reply(
    bytes: Bytes,
    expected_correlation: u32,
    converter: &dyn TextConverter,
    scratch: &mut ScratchBuffers,
    handlers: &mut ReplyHandlers<'_>,
) -> Result<Reply> {
    let header = MessageHeader::parse(&bytes)?;
    let declared = header.length as usize;
    if declared < MIN_MESSAGE_LENGTH {
        return Err(Error::framing(format!("reply length {} below minimum", declared)));
    }
    if declared != bytes.len() {
        return Err(Error::framing(format!(
            "reply declares {} bytes but {} were received",
            declared,
            bytes.len()
        )));
    }
    if header.req_rep_id != REPLY_ID {
        return Err(Error::UnexpectedReply {
            expected: REPLY_ID,
            actual: header.req_rep_id,
        });
    }
    if header.correlation_id != expected_correlation {
        return Err(Error::CorrelationMismatch {
            expected: expected_correlation,
            actual: header.correlation_id,
        });
    }
    let template_length = header.template_length as usize;
    if template_length < TEMPLATE_LENGTH || HEADER_LENGTH + template_length > declared {
        return Err(Error::framing(format!(
            "reply template length {}",
            template_length
        )));
    }

    let template = ReplyTemplate::read(&mut ReadBuffer::from_slice(
        &bytes[HEADER_LENGTH..HEADER_LENGTH + TEMPLATE_LENGTH],
    ))?;
    let failed = template.is_error();

    trace!(
        correlation_id = header.correlation_id,
        length = declared,
        rc_class = template.rc_class,
        return_code = template.return_code,
        compressed = template.is_compressed(),
        "decoding reply"
    );

    if !failed {
        if let Some(cb) = handlers.warning.as_deref_mut() {
            if template.is_warning() {
                cb.new_warning(template.rc_class, template.return_code);
            } else if template.rc_class == 0 {
                cb.no_warnings();
            }
        }
        if template.is_warning() {
            debug!(
                rc_class = template.rc_class,
                return_code = template.return_code,
                "reply warning"
            );
        }
    }

    let mut reply = Reply {
        correlation_id: header.correlation_id,
        template,
        ..Default::default()
    };

    let mut reader = ReplyReader::new(bytes, HEADER_LENGTH + template_length)?;
    let mut logical_end: Option<usize> = None;

    loop {
        let done = match logical_end {
            Some(end) => reader.logical() >= end,
            None => reader.physical() + PARAMETER_HEADER_LENGTH > declared,
        };
        if done {
            break;
        }

        let ll = reader.read_u32()? as usize;
        let cp = reader.read_u16()?;
        if ll < PARAMETER_HEADER_LENGTH {
            return Err(Error::framing(format!(
                "parameter {:#06x} length {} below minimum",
                cp, ll
            )));
        }

        if cp == codepoint::RLE_COMPRESSED_DATA {
            if !template.is_compressed() {
                return Err(Error::framing("compressed block in an uncompressed reply"));
            }
            if logical_end.is_some() || reader.is_compressed() {
                return Err(Error::framing("nested RLE compressed block"));
            }
            if ll < PARAMETER_HEADER_LENGTH + 4 {
                return Err(Error::framing(format!("compressed block length {}", ll)));
            }
            let decompressed = reader.read_u32()? as usize;
            reader.activate_compression(ll - PARAMETER_HEADER_LENGTH - 4)?;
            trace!(
                compressed = ll - PARAMETER_HEADER_LENGTH - 4,
                decompressed,
                "reply body is RLE compressed"
            );
            logical_end = Some(reader.logical() + decompressed);
            continue;
        }

        let payload = ll - PARAMETER_HEADER_LENGTH;
        let start = reader.logical();
        dispatch(
            &mut reader,
            cp,
            payload,
            failed,
            converter,
            scratch,
            handlers,
            &mut reply,
        )?;
        let consumed = reader.logical() - start;
        if consumed > payload {
            return Err(Error::framing(format!(
                "parameter {:#06x} read {} of {} bytes",
                cp, consumed, payload
            )));
        }
        reader.skip(payload - consumed)?;
    }

    if let Some(end) = logical_end {
        if reader.logical() != end {
            return Err(Error::framing(format!(
                "compressed body overran its declared end by {} bytes",
                reader.logical() - end
            )));
        }
        if !reader.is_idle() {
            return Err(Error::framing("compressed body ends inside a run"));
        }
        let leftover = reader.compressed_remaining();
        if leftover > 0 {
            trace!(leftover, "unused compressed bytes after the reply body");
        }
    }
    let trailing = declared - reader.physical();
    if trailing > 0 {
        trace!(trailing, "draining bytes after the last parameter");
        reader.skip_physical(trailing)?;
    }

    if failed {
        let error = ServerError {
            rc_class: reply.template.rc_class,
            return_code: reply.template.return_code,
            message_id: reply.message_id,
            message_text: reply.message_text,
            second_level_text: reply.second_level_text,
            sqlca: reply.sqlca,
        };
        debug!(%error, "server reported an error");
        return Err(error.into());
    }
    Ok(reply)
}

#[allow(clippy::too_many_arguments)]
fn dispatch(
    reader: &mut ReplyReader,
    cp: u16,
    payload: usize,
    failed: bool,
    converter: &dyn TextConverter,
    scratch: &mut ScratchBuffers,
    handlers: &mut ReplyHandlers<'_>,
    reply: &mut Reply,
) -> Result<()> {
    match cp {
        codepoint::MESSAGE_ID | codepoint::FIRST_LEVEL_TEXT | codepoint::SECOND_LEVEL_TEXT => {
            let text = read_text(reader, payload, converter)?;
            if !failed {
                if let Some(cb) = handlers.warning.as_deref_mut() {
                    match cp {
                        codepoint::MESSAGE_ID => cb.new_message_id(&text),
                        codepoint::FIRST_LEVEL_TEXT => cb.new_message_text(&text),
                        _ => cb.new_second_level_text(&text),
                    }
                }
            }
            let slot = match cp {
                codepoint::MESSAGE_ID => &mut reply.message_id,
                codepoint::FIRST_LEVEL_TEXT => &mut reply.message_text,
                _ => &mut reply.second_level_text,
            };
            *slot = Some(text);
        }
        codepoint::SQLCA => {
            let sqlca = parse_sqlca(reader, payload, converter)?;
            if let Some(cb) = handlers.sqlca.as_deref_mut() {
                cb.new_sqlca(&sqlca);
            }
            reply.sqlca = Some(sqlca);
        }
        _ if failed => skip_unknown(reader, cp, payload, reply)?,
        codepoint::SERVER_ATTRIBUTES => {
            reply.server_attributes = Some(parse_server_attributes(reader, payload, converter)?);
        }
        codepoint::SUPER_EXTENDED_DATA_FORMAT => {
            let format = parse_data_format(reader, payload, converter)?;
            if let Some(cb) = handlers.describe.as_deref_mut() {
                cb.data_format(&format);
                for (index, field) in format.fields.iter().enumerate() {
                    cb.field_description(index, field);
                }
            }
        }
        codepoint::SUPER_EXTENDED_PARAMETER_MARKER_FORMAT => {
            let format = parse_data_format(reader, payload, converter)?;
            if let Some(cb) = handlers.parameter_marker.as_deref_mut() {
                cb.parameter_marker_format(&format);
                for (index, field) in format.fields.iter().enumerate() {
                    cb.parameter_marker_field(index, field);
                }
            }
        }
        codepoint::EXTENDED_COLUMN_DESCRIPTORS => {
            let descriptors = parse_column_descriptors(reader, payload, converter)?;
            if let Some(cb) = handlers.describe.as_deref_mut() {
                for (index, column) in descriptors.columns.iter().enumerate() {
                    cb.column_attributes(index, column);
                }
            }
        }
        codepoint::EXTENDED_RESULT_DATA => {
            let rows = read_result_data(
                reader,
                payload,
                &mut scratch.row,
                handlers.fetch.as_deref_mut(),
            )?;
            reply.rows_received += u64::from(rows);
        }
        codepoint::PACKAGE_INFO => {
            let (info, statements) = parse_package(reader, payload, converter)?;
            if let Some(cb) = handlers.package.as_deref_mut() {
                cb.new_package_info(&info);
                for (index, statement) in statements.iter().enumerate() {
                    cb.new_statement(index, statement);
                }
            }
        }
        codepoint::LOB_DATA => {
            read_lob_data(
                reader,
                payload,
                &mut scratch.lob,
                scratch.lob_segment_size,
                handlers.lob.as_deref_mut(),
            )?;
        }
        codepoint::CURRENT_LOB_LENGTH => {
            let length = read_lob_length(reader, payload)?;
            if let Some(cb) = handlers.lob.as_deref_mut() {
                cb.new_lob_length(length);
            }
            reply.lob_length = Some(length);
        }
        _ => skip_unknown(reader, cp, payload, reply)?,
    }
    Ok(())
}

fn skip_unknown(reader: &mut ReplyReader, cp: u16, payload: usize, reply: &mut Reply) -> Result<()> {
    trace!(codepoint = format_args!("{:#06x}", cp), length = payload, "skipping parameter");
    reply.skipped_codepoints.push(cp);
    reader.skip(payload)
}

fn read_text(reader: &mut ReplyReader, payload: usize, converter: &dyn TextConverter) -> Result<String> {
    if payload < 2 {
        return Err(Error::framing(format!("text parameter of {} bytes", payload)));
    }
    let ccsid = reader.read_u16()?;
    let bytes = reader.read_vec(payload - 2)?;
    converter.decode(ccsid, &bytes)
}


#[cfg(test)]
mod tests {
    use super::test_support::{parameter, reply, text_parameter};
    use super::*;
    use crate::callback::{FormatCollector, RowCollector, SqlcaCollector, WarningCollector};
    use crate::reply::format::test_support::{format_block, TestField};
    use crate::text::Cp037Converter;

    fn decode(bytes: Bytes, correlation: u32, handlers: &mut ReplyHandlers<'_>) -> Result<Reply> {
        decode_reply(
            bytes,
            correlation,
            &Cp037Converter,
            &mut ScratchBuffers::default(),
            handlers,
        )
    }

    #[test]
    fn test_clean_reply_notifies_no_warnings() {
        let mut warnings = WarningCollector::default();
        let mut handlers = ReplyHandlers {
            warning: Some(&mut warnings),
            ..Default::default()
        };
        let reply = decode(reply(3, 0, 0, false, &[]), 3, &mut handlers).unwrap();
        assert_eq!(reply.correlation_id, 3);
        assert!(!reply.is_warning());
        assert_eq!(warnings.clean_replies, 1);
        assert!(warnings.warnings.is_empty());
    }

    #[test]
    fn test_warning_reply_with_messages() {
        let mut body = text_parameter(codepoint::MESSAGE_ID, "SQL0100");
        body.extend(text_parameter(codepoint::FIRST_LEVEL_TEXT, "Row not found"));
        let mut warnings = WarningCollector::default();
        let mut handlers = ReplyHandlers {
            warning: Some(&mut warnings),
            ..Default::default()
        };
        let reply = decode(reply(9, 2, 700, false, &body), 9, &mut handlers).unwrap();
        assert!(reply.is_end_of_data());
        assert_eq!(reply.message_id.as_deref(), Some("SQL0100"));
        assert_eq!(warnings.warnings, vec![(2, 700)]);
        assert_eq!(warnings.message_text.as_deref(), Some("Row not found"));
        assert_eq!(warnings.clean_replies, 0);
    }

    #[test]
    fn test_error_reply_becomes_server_error() {
        let mut body = text_parameter(codepoint::MESSAGE_ID, "SQL0204");
        body.extend(parameter(
            codepoint::SQLCA,
            &sqlca_support::sqlca_bytes(-204, "42704", 0, "T1"),
        ));
        body.extend(parameter(codepoint::EXTENDED_RESULT_DATA, &[0u8; 3]));
        let mut warnings = WarningCollector::default();
        let mut sqlca = SqlcaCollector::default();
        let mut handlers = ReplyHandlers {
            warning: Some(&mut warnings),
            sqlca: Some(&mut sqlca),
            ..Default::default()
        };
        let err = decode(reply(4, 2, -204, false, &body), 4, &mut handlers).unwrap_err();
        let server = err.server_error().unwrap();
        assert_eq!(server.message_id.as_deref(), Some("SQL0204"));
        assert_eq!(server.sqlcode(), Some(-204));
        assert_eq!(server.sqlstate(), Some("42704"));
        assert!(!err.is_fatal());
        assert!(warnings.warnings.is_empty());
        assert_eq!(sqlca.last.unwrap().sqlcode, -204);
    }

    #[test]
    fn test_header_checks() {
        let mut handlers = ReplyHandlers::default();
        let err = decode(reply(5, 0, 0, false, &[]), 6, &mut handlers).unwrap_err();
        assert!(matches!(
            err,
            Error::CorrelationMismatch {
                expected: 6,
                actual: 5
            }
        ));

        let mut bytes = reply(5, 0, 0, false, &[]).to_vec();
        bytes[18..20].copy_from_slice(&0x1807u16.to_be_bytes());
        let err = decode(Bytes::from(bytes), 5, &mut handlers).unwrap_err();
        assert!(matches!(err, Error::UnexpectedReply { actual: 0x1807, .. }));

        let mut bytes = reply(5, 0, 0, false, &[]).to_vec();
        bytes.push(0);
        assert!(decode(Bytes::from(bytes), 5, &mut handlers)
            .unwrap_err()
            .is_framing());
    }

    #[test]
    fn test_unknown_codepoint_is_skipped() {
        let mut body = parameter(0x38FF, &[1, 2, 3, 4]);
        body.extend(parameter(
            codepoint::SQLCA,
            &sqlca_support::sqlca_bytes(0, "00000", 3, ""),
        ));
        let mut handlers = ReplyHandlers::default();
        let reply = decode(reply(1, 0, 0, false, &body), 1, &mut handlers).unwrap();
        assert_eq!(reply.skipped_codepoints, vec![0x38FF]);
        assert_eq!(reply.update_count(), Some(3));
    }

    #[test]
    fn test_short_parameter_length_is_framing_error() {
        let body = [0, 0, 0, 4, 0x38, 0x07];
        let mut handlers = ReplyHandlers::default();
        assert!(decode(reply(1, 0, 0, false, &body), 1, &mut handlers)
            .unwrap_err()
            .is_framing());
    }

    #[test]
    fn test_describe_and_rows() {
        let format = format_block(
            &[TestField {
                sql_type: 452,
                length: 3,
                name: Some("CODE"),
            }],
            0,
            0,
        );
        let mut rows = Vec::new();
        rows.extend(0u32.to_be_bytes());
        rows.extend(2u32.to_be_bytes());
        rows.extend(1u16.to_be_bytes());
        rows.extend(0u16.to_be_bytes());
        rows.extend(0u32.to_be_bytes());
        rows.extend(3u32.to_be_bytes());
        rows.extend(b"abcdef");

        let mut body = parameter(codepoint::SUPER_EXTENDED_DATA_FORMAT, &format);
        body.extend(parameter(codepoint::EXTENDED_RESULT_DATA, &rows));

        let mut formats = FormatCollector::default();
        let mut collector = RowCollector::default();
        let mut handlers = ReplyHandlers {
            describe: Some(&mut formats),
            fetch: Some(&mut collector),
            ..Default::default()
        };
        let reply = decode(reply(2, 0, 0, false, &body), 2, &mut handlers).unwrap();
        assert_eq!(reply.rows_received, 2);
        let format = formats.data_format.unwrap();
        assert_eq!(format.fields[0].name.as_deref(), Some("CODE"));
        assert_eq!(collector.rows, vec![b"abc".to_vec(), b"def".to_vec()]);
    }

    #[test]
    fn test_compressed_reply() {
        let sqlca = parameter(
            codepoint::SQLCA,
            &sqlca_support::sqlca_bytes(0, "00000", 1, ""),
        );
        // Encode the SQLCA parameter, turning its zero padding into runs
        let mut compressed = Vec::new();
        let mut i = 0;
        while i < sqlca.len() {
            let zeros = sqlca[i..].iter().take_while(|&&b| b == 0).count() / 2 * 2;
            if zeros >= 6 {
                compressed.extend([0x1B, 0, 0]);
                compressed.extend(((zeros / 2) as u16).to_be_bytes());
                i += zeros;
            } else {
                if sqlca[i] == 0x1B {
                    compressed.push(0x1B);
                }
                compressed.push(sqlca[i]);
                i += 1;
            }
        }
        assert!(compressed.len() < sqlca.len());

        let mut block = (sqlca.len() as u32).to_be_bytes().to_vec();
        block.extend(&compressed);
        let body = parameter(codepoint::RLE_COMPRESSED_DATA, &block);

        let mut handlers = ReplyHandlers::default();
        let reply = decode(reply(8, 0, 0, true, &body), 8, &mut handlers).unwrap();
        assert_eq!(reply.update_count(), Some(1));
        assert_eq!(reply.sqlca.unwrap().sqlstate, "00000");
    }

    #[test]
    fn test_compressed_block_needs_template_flag() {
        let body = parameter(codepoint::RLE_COMPRESSED_DATA, &[0, 0, 0, 1, 0x40]);
        let mut handlers = ReplyHandlers::default();
        assert!(decode(reply(8, 0, 0, false, &body), 8, &mut handlers)
            .unwrap_err()
            .is_framing());
    }
}
