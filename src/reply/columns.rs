//! Extended column descriptors
//!
//! Sent next to a data format when extended column descriptors were asked
//! for. Each column gets a 16-byte block; its names live in a variable
//! section located relative to that block.

use crate::constants::column_codepoint;
use crate::error::{Error, Result};
use crate::text::TextConverter;

use super::format::{read_named_records, visit_sections, LayoutAccounting, VariableSection};
use super::reader::ReplyReader;

const HEADER_LENGTH: usize = 16;
const COLUMN_BLOCK_LENGTH: usize = 16;

/// Extra information about one result column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedColumnDescriptor {
    /// Updateable flag as sent by the server
    pub updateable: u8,
    /// Searchable flag as sent by the server
    pub searchable: u8,
    /// Attribute bitmap
    pub attributes: u16,
    /// Name of the underlying column
    pub base_column_name: Option<String>,
    /// Name of the underlying table
    pub base_table_name: Option<String>,
    /// Column label
    pub column_label: Option<String>,
    /// Schema of the underlying table
    pub base_schema_name: Option<String>,
    /// User-defined type name
    pub udt_name: Option<String>,
}

/// All extended column descriptors of one reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedColumnDescriptors {
    /// Descriptors in column order
    pub columns: Vec<ExtendedColumnDescriptor>,
    /// Byte usage of the block
    pub accounting: LayoutAccounting,
}

/// Parse an extended column descriptor block of `length` bytes
pub fn parse_column_descriptors(
    reader: &mut ReplyReader,
    length: usize,
    converter: &dyn TextConverter,
) -> Result<ExtendedColumnDescriptors> {
    if length < HEADER_LENGTH {
        return Err(Error::framing(format!(
            "extended column descriptors of {} bytes",
            length
        )));
    }
    let base = reader.logical();
    let count = reader.read_u32()? as usize;
    reader.skip(12)?;
    if HEADER_LENGTH + count * COLUMN_BLOCK_LENGTH > length {
        return Err(Error::framing(format!(
            "{} column descriptors do not fit {} bytes",
            count, length
        )));
    }

    let mut accounting = LayoutAccounting {
        header: HEADER_LENGTH,
        fixed: count * COLUMN_BLOCK_LENGTH,
        ..Default::default()
    };
    let mut columns = Vec::with_capacity(count);
    let mut sections = Vec::new();

    for index in 0..count {
        let block_offset = reader.logical() - base;
        let column = ExtendedColumnDescriptor {
            updateable: reader.read_u8()?,
            searchable: reader.read_u8()?,
            attributes: reader.read_u16()?,
            ..Default::default()
        };
        reader.skip(4)?;
        let offset = reader.read_u32()? as usize;
        let var_length = reader.read_u32()? as usize;
        if var_length > 0 {
            sections.push(VariableSection {
                owner: index,
                kind: (),
                offset: block_offset + offset,
                length: var_length,
            });
        }
        columns.push(column);
    }

    visit_sections(reader, base, length, sections, &mut accounting, |reader, section| {
        let column = &mut columns[section.owner];
        read_named_records(reader, section.length, converter, |cp, text| {
            let slot = match cp {
                column_codepoint::BASE_COLUMN_NAME => &mut column.base_column_name,
                column_codepoint::BASE_TABLE_NAME => &mut column.base_table_name,
                column_codepoint::COLUMN_LABEL => &mut column.column_label,
                column_codepoint::BASE_SCHEMA_NAME => &mut column.base_schema_name,
                column_codepoint::UDT_NAME => &mut column.udt_name,
                other => {
                    tracing::trace!(codepoint = other, "skipping column sub-record");
                    return;
                }
            };
            *slot = Some(text);
        })
    })?;

    Ok(ExtendedColumnDescriptors {
        columns,
        accounting,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::WriteBuffer;
    use crate::text::{Cp037Converter, TextConverter};

    fn record(buf: &mut Vec<u8>, cp: u16, text: &str) {
        let bytes = Cp037Converter.encode(text).unwrap();
        buf.extend(((8 + bytes.len()) as u32).to_be_bytes());
        buf.extend(cp.to_be_bytes());
        buf.extend(37u16.to_be_bytes());
        buf.extend(bytes);
    }

    #[test]
    fn test_column_names() {
        let mut names = Vec::new();
        record(&mut names, column_codepoint::BASE_COLUMN_NAME, "EMPNO");
        record(&mut names, column_codepoint::BASE_TABLE_NAME, "EMPLOYEE");
        record(&mut names, 0x39FF, "IGNORED");
        record(&mut names, column_codepoint::BASE_SCHEMA_NAME, "CORPDATA");

        let mut buf = WriteBuffer::new();
        buf.write_u32_be(2).unwrap();
        buf.write_zeros(12).unwrap();
        // column 0 points past both blocks
        buf.write_bytes(&[1, 0]).unwrap();
        buf.write_u16_be(0x8000).unwrap();
        buf.write_u32_be(0).unwrap();
        buf.write_u32_be(32).unwrap();
        buf.write_u32_be(names.len() as u32).unwrap();
        // column 1 has no names
        buf.write_zeros(16).unwrap();
        buf.write_bytes(&names).unwrap();

        let data = buf.as_slice().to_vec();
        let mut reader = ReplyReader::from_slice(&data);
        let parsed = parse_column_descriptors(&mut reader, data.len(), &Cp037Converter).unwrap();
        assert_eq!(parsed.columns.len(), 2);
        let first = &parsed.columns[0];
        assert_eq!(first.updateable, 1);
        assert_eq!(first.attributes, 0x8000);
        assert_eq!(first.base_column_name.as_deref(), Some("EMPNO"));
        assert_eq!(first.base_table_name.as_deref(), Some("EMPLOYEE"));
        assert_eq!(first.base_schema_name.as_deref(), Some("CORPDATA"));
        assert_eq!(first.column_label, None);
        assert_eq!(parsed.columns[1], ExtendedColumnDescriptor::default());
        assert_eq!(parsed.accounting.total(), data.len());
    }
}
