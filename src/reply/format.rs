//! Super-extended data formats
//!
//! Result formats and parameter marker formats share one layout: a 16-byte
//! header, one fixed block per field and variable-length name sections placed
//! anywhere after the fixed blocks. Offsets of the variable sections are
//! relative to the field's own fixed block and are evaluated in logical
//! (decompressed) bytes.
//!
//! ```text
//! +------------------+----------------+----------------+-----+--------------+
//! | header (16)      | field 0 (>=48) | field 1 (>=48) | ... | var sections |
//! +------------------+----------------+----------------+-----+--------------+
//! ```

use crate::constants::{field_codepoint, PARAMETER_HEADER_LENGTH};
use crate::error::{Error, Result};
use crate::text::TextConverter;

use super::reader::ReplyReader;

/// Size of the format header
pub const FORMAT_HEADER_LENGTH: usize = 16;

/// Minimum size of a field's fixed block
pub const FIELD_BLOCK_LENGTH: usize = 48;

/// How the bytes of a block were used
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutAccounting {
    /// Header bytes
    pub header: usize,
    /// Fixed per-entry blocks
    pub fixed: usize,
    /// Variable-length sections
    pub variable: usize,
    /// Bytes between and after sections
    pub gaps: usize,
}

impl LayoutAccounting {
    /// Sum of every part, equal to the block length when well formed
    pub fn total(&self) -> usize {
        self.header + self.fixed + self.variable + self.gaps
    }
}

/// Description of one result column or parameter marker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldDescription {
    /// SQL type code
    pub sql_type: u16,
    /// Length of the field in the row
    pub length: u32,
    /// Scale
    pub scale: u16,
    /// Precision
    pub precision: u16,
    /// CCSID of the field data
    pub ccsid: u16,
    /// Parameter type (input, output, both)
    pub parameter_type: u8,
    /// Join reference position
    pub join_ref: u16,
    /// Attribute bitmap
    pub attributes: u16,
    /// LOB locator
    pub lob_locator: u32,
    /// Maximum LOB size
    pub lob_max_size: u32,
    /// Maximum array cardinality
    pub max_cardinality: u32,
    /// Field name
    pub name: Option<String>,
    /// User-defined type name
    pub udt_name: Option<String>,
}

/// A decoded super-extended data format
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataFormat {
    /// Consistency token
    pub consistency_token: u32,
    /// Date format
    pub date_format: u8,
    /// Time format
    pub time_format: u8,
    /// Date separator
    pub date_separator: u8,
    /// Time separator
    pub time_separator: u8,
    /// Size of one row in bytes
    pub record_size: u32,
    /// Field descriptions in column order
    pub fields: Vec<FieldDescription>,
    /// Byte usage of the block
    pub accounting: LayoutAccounting,
}

// =============================================================================
// Variable sections
// =============================================================================

/// A variable-length section located by offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VariableSection<K> {
    /// Entry the section belongs to
    pub owner: usize,
    /// What the section holds
    pub kind: K,
    /// Offset from the start of the block
    pub offset: usize,
    /// Length in bytes
    pub length: usize,
}

/// Visit `sections` in offset order, skipping the gaps between them
///
/// The reader must be positioned inside the block that starts at logical
/// position `base` and is `total` bytes long. On return the reader sits at
/// the end of the block. Empty sections are ignored.
pub(crate) fn visit_sections<K, F>(
    reader: &mut ReplyReader,
    base: usize,
    total: usize,
    mut sections: Vec<VariableSection<K>>,
    accounting: &mut LayoutAccounting,
    mut visit: F,
) -> Result<()>
where
    F: FnMut(&mut ReplyReader, &VariableSection<K>) -> Result<()>,
{
    sections.retain(|s| s.length > 0);
    sections.sort_by_key(|s| s.offset);

    for section in &sections {
        let cursor = reader.logical() - base;
        if section.offset < cursor {
            return Err(Error::framing(format!(
                "section at offset {} overlaps data ending at {}",
                section.offset, cursor
            )));
        }
        if section.offset + section.length > total {
            return Err(Error::framing(format!(
                "section at offset {} of {} bytes runs past block of {} bytes",
                section.offset, section.length, total
            )));
        }
        let gap = section.offset - cursor;
        reader.skip(gap)?;
        accounting.gaps += gap;

        let start = reader.logical();
        visit(reader, section)?;
        let consumed = reader.logical() - start;
        if consumed > section.length {
            return Err(Error::framing(format!(
                "section at offset {} read {} of {} bytes",
                section.offset, consumed, section.length
            )));
        }
        reader.skip(section.length - consumed)?;
        accounting.variable += section.length;
    }

    let cursor = reader.logical() - base;
    if cursor > total {
        return Err(Error::framing(format!(
            "block of {} bytes overran to {}",
            total, cursor
        )));
    }
    reader.skip(total - cursor)?;
    accounting.gaps += total - cursor;
    Ok(())
}

/// Read the `ll`/codepoint/CCSID/text sub-records of one section
pub(crate) fn read_named_records<F>(
    reader: &mut ReplyReader,
    length: usize,
    converter: &dyn TextConverter,
    mut record: F,
) -> Result<()>
where
    F: FnMut(u16, String),
{
    let start = reader.logical();
    while reader.logical() - start + PARAMETER_HEADER_LENGTH <= length {
        let ll = reader.read_u32()? as usize;
        let cp = reader.read_u16()?;
        let used = reader.logical() - start - PARAMETER_HEADER_LENGTH;
        if ll < PARAMETER_HEADER_LENGTH || used + ll > length {
            return Err(Error::framing(format!(
                "name record {:#06x} of length {} does not fit its section",
                cp, ll
            )));
        }
        let payload = ll - PARAMETER_HEADER_LENGTH;
        if payload < 2 {
            reader.skip(payload)?;
            continue;
        }
        let ccsid = reader.read_u16()?;
        let bytes = reader.read_vec(payload - 2)?;
        record(cp, converter.decode(ccsid, &bytes)?);
    }
    Ok(())
}

// =============================================================================
// Super-extended format
// =============================================================================

/// Parse a super-extended data format of `length` bytes at the reader
pub fn parse_data_format(
    reader: &mut ReplyReader,
    length: usize,
    converter: &dyn TextConverter,
) -> Result<DataFormat> {
    if length < FORMAT_HEADER_LENGTH {
        return Err(Error::framing(format!(
            "data format of {} bytes is shorter than its header",
            length
        )));
    }
    let base = reader.logical();

    let consistency_token = reader.read_u32()?;
    let count = reader.read_u32()? as usize;
    let date_format = reader.read_u8()?;
    let time_format = reader.read_u8()?;
    let date_separator = reader.read_u8()?;
    let time_separator = reader.read_u8()?;
    let record_size = reader.read_u32()?;

    if FORMAT_HEADER_LENGTH + count * FIELD_BLOCK_LENGTH > length {
        return Err(Error::framing(format!(
            "{} fields do not fit a data format of {} bytes",
            count, length
        )));
    }

    let mut accounting = LayoutAccounting {
        header: FORMAT_HEADER_LENGTH,
        ..Default::default()
    };
    let mut fields = Vec::with_capacity(count);
    let mut sections = Vec::new();

    for index in 0..count {
        let block_offset = reader.logical() - base;
        let description_length = reader.read_u16()? as usize;
        if description_length < FIELD_BLOCK_LENGTH {
            return Err(Error::framing(format!(
                "field {} description length {} below {}",
                index, description_length, FIELD_BLOCK_LENGTH
            )));
        }
        let field = FieldDescription {
            sql_type: reader.read_u16()?,
            length: reader.read_u32()?,
            scale: reader.read_u16()?,
            precision: reader.read_u16()?,
            ccsid: reader.read_u16()?,
            parameter_type: reader.read_u8()?,
            join_ref: {
                reader.skip(1)?;
                reader.read_u16()?
            },
            attributes: reader.read_u16()?,
            lob_locator: reader.read_u32()?,
            lob_max_size: reader.read_u32()?,
            max_cardinality: {
                reader.skip(4)?;
                reader.read_u32()?
            },
            name: None,
            udt_name: None,
        };
        let variable_offset = reader.read_u32()? as usize;
        let variable_length = reader.read_u32()? as usize;
        reader.skip(4)?;
        reader.skip(description_length - FIELD_BLOCK_LENGTH)?;
        accounting.fixed += description_length;

        if variable_length > 0 {
            sections.push(VariableSection {
                owner: index,
                kind: (),
                offset: block_offset + variable_offset,
                length: variable_length,
            });
        }
        fields.push(field);
    }

    if reader.logical() - base > length {
        return Err(Error::framing("field descriptions overrun the data format"));
    }

    visit_sections(reader, base, length, sections, &mut accounting, |reader, section| {
        let field = &mut fields[section.owner];
        read_named_records(reader, section.length, converter, |cp, text| match cp {
            field_codepoint::FIELD_NAME => field.name = Some(text),
            field_codepoint::UDT_NAME => field.udt_name = Some(text),
            other => tracing::trace!(codepoint = other, "skipping field sub-record"),
        })
    })?;

    Ok(DataFormat {
        consistency_token,
        date_format,
        time_format,
        date_separator,
        time_separator,
        record_size,
        fields,
        accounting,
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::{format_block, TestField};
    use super::*;
    use crate::text::Cp037Converter;

    #[test]
    fn test_single_field_accounting() {
        let block = format_block(
            &[TestField {
                sql_type: 496,
                length: 4,
                name: None,
            }],
            0,
            0,
        );
        assert_eq!(block.len(), 64);
        let mut reader = ReplyReader::from_slice(&block);
        let format = parse_data_format(&mut reader, block.len(), &Cp037Converter).unwrap();
        assert_eq!(format.fields.len(), 1);
        assert_eq!(format.fields[0].sql_type, 496);
        assert_eq!(format.record_size, 4);
        assert_eq!(
            format.accounting,
            LayoutAccounting {
                header: 16,
                fixed: 48,
                variable: 0,
                gaps: 0
            }
        );
        assert_eq!(reader.logical(), 64);
    }

    #[test]
    fn test_names_gaps_and_trailing_bytes() {
        let fields = [
            TestField {
                sql_type: 452,
                length: 10,
                name: Some("NAME"),
            },
            TestField {
                sql_type: 496,
                length: 4,
                name: Some("ID"),
            },
        ];
        let block = format_block(&fields, 3, 5);
        let mut reader = ReplyReader::from_slice(&block);
        let format = parse_data_format(&mut reader, block.len(), &Cp037Converter).unwrap();
        assert_eq!(format.fields[0].name.as_deref(), Some("NAME"));
        assert_eq!(format.fields[1].name.as_deref(), Some("ID"));
        assert_eq!(format.accounting.gaps, 3 + 3 + 5);
        assert_eq!(format.accounting.variable, (8 + 8) + (8 + 4));
        assert_eq!(format.accounting.total(), block.len());
    }

    #[test]
    fn test_backwards_offset_is_framing_error() {
        let mut block = format_block(
            &[TestField {
                sql_type: 452,
                length: 1,
                name: Some("A"),
            }],
            0,
            0,
        );
        // Point the variable section into the fixed block
        block[16 + 36..16 + 40].copy_from_slice(&8u32.to_be_bytes());
        let mut reader = ReplyReader::from_slice(&block);
        let err = parse_data_format(&mut reader, block.len(), &Cp037Converter).unwrap_err();
        assert!(err.is_framing());
    }

    #[test]
    fn test_short_description_length_rejected() {
        let mut block = format_block(
            &[TestField {
                sql_type: 452,
                length: 1,
                name: None,
            }],
            0,
            0,
        );
        block[16..18].copy_from_slice(&40u16.to_be_bytes());
        let mut reader = ReplyReader::from_slice(&block);
        assert!(parse_data_format(&mut reader, block.len(), &Cp037Converter)
            .unwrap_err()
            .is_framing());
    }
}
