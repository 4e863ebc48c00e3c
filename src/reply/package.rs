//! SQL package information
//!
//! A package block is a 42-byte header, one 64-byte entry per statement and
//! the statements' formats and texts, located by offsets from the start of
//! the block.

use crate::error::{Error, Result};
use crate::text::TextConverter;

use super::format::{parse_data_format, visit_sections, DataFormat, LayoutAccounting, VariableSection};
use super::reader::ReplyReader;

const HEADER_LENGTH: usize = 42;
const STATEMENT_LENGTH: usize = 64;

/// Package header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageInfo {
    /// Total length announced by the server
    pub total_length: u32,
    /// CCSID of the package texts
    pub ccsid: u16,
    /// Default collection
    pub default_collection: String,
    /// Number of statements
    pub statement_count: u16,
    /// Byte usage of the block
    pub accounting: LayoutAccounting,
}

/// One statement stored in a package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageStatement {
    /// Statement depends on the default collection
    pub needs_default_collection: bool,
    /// Statement type
    pub statement_type: u16,
    /// Statement name
    pub name: String,
    /// Statement text
    pub text: Option<String>,
    /// Result data format
    pub result_format: Option<DataFormat>,
    /// Parameter marker format
    pub parameter_marker_format: Option<DataFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    ResultFormat,
    Text,
    ParameterMarkerFormat,
}

fn fixed_text(
    reader: &mut ReplyReader,
    n: usize,
    ccsid: u16,
    converter: &dyn TextConverter,
) -> Result<String> {
    let bytes = reader.read_vec(n)?;
    Ok(converter.decode(ccsid, &bytes)?.trim_end().to_string())
}

/// Parse a package information block of `length` bytes
pub fn parse_package(
    reader: &mut ReplyReader,
    length: usize,
    converter: &dyn TextConverter,
) -> Result<(PackageInfo, Vec<PackageStatement>)> {
    if length < HEADER_LENGTH {
        return Err(Error::framing(format!("package information of {} bytes", length)));
    }
    let base = reader.logical();

    let total_length = reader.read_u32()?;
    let ccsid = reader.read_u16()?;
    let default_collection = fixed_text(reader, 18, ccsid, converter)?;
    let statement_count = reader.read_u16()?;
    reader.skip(16)?;

    let count = statement_count as usize;
    if HEADER_LENGTH + count * STATEMENT_LENGTH > length {
        return Err(Error::framing(format!(
            "{} package statements do not fit {} bytes",
            count, length
        )));
    }

    let mut accounting = LayoutAccounting {
        header: HEADER_LENGTH,
        fixed: count * STATEMENT_LENGTH,
        ..Default::default()
    };
    let mut statements = Vec::with_capacity(count);
    let mut sections = Vec::new();

    for index in 0..count {
        let needs_default_collection = reader.read_u8()? != 0;
        let statement_type = reader.read_u16()?;
        let name = fixed_text(reader, 18, ccsid, converter)?;
        reader.skip(19)?;
        for kind in [Section::ResultFormat, Section::Text, Section::ParameterMarkerFormat] {
            let offset = reader.read_u32()? as usize;
            let section_length = reader.read_u32()? as usize;
            sections.push(VariableSection {
                owner: index,
                kind,
                offset,
                length: section_length,
            });
        }
        statements.push(PackageStatement {
            needs_default_collection,
            statement_type,
            name,
            ..Default::default()
        });
    }

    visit_sections(reader, base, length, sections, &mut accounting, |reader, section| {
        let statement = &mut statements[section.owner];
        match section.kind {
            Section::ResultFormat => {
                statement.result_format = Some(parse_data_format(reader, section.length, converter)?);
            }
            Section::ParameterMarkerFormat => {
                statement.parameter_marker_format =
                    Some(parse_data_format(reader, section.length, converter)?);
            }
            Section::Text => {
                let bytes = reader.read_vec(section.length)?;
                statement.text = Some(converter.decode(ccsid, &bytes)?);
            }
        }
        Ok(())
    })?;

    let info = PackageInfo {
        total_length,
        ccsid,
        default_collection,
        statement_count,
        accounting,
    };
    Ok((info, statements))
}
