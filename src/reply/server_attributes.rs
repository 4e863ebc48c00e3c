//! Server attributes returned by set-server-attributes

use crate::error::{Error, Result};
use crate::text::TextConverter;

use super::reader::ReplyReader;

/// Bytes every server attributes block carries
pub const SERVER_ATTRIBUTES_MIN_LENGTH: usize = 60;

/// Bytes of a block with the RDB name, default library and job
pub const SERVER_ATTRIBUTES_FULL_LENGTH: usize = 114;

/// Job the server runs the connection in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerJob {
    /// Job name
    pub name: String,
    /// Job user
    pub user: String,
    /// Job number
    pub number: String,
}

/// Attributes the server settled on for the connection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct ServerAttributes {
    pub date_format: u16,
    pub date_separator: u16,
    pub time_format: u16,
    pub time_separator: u16,
    pub decimal_separator: u16,
    pub naming_convention: u16,
    pub ignore_decimal_data_error: u16,
    pub commitment_control_level: u16,
    pub drda_package_size: u16,
    pub translate_indicator: u8,
    /// CCSID the server job runs in
    pub server_ccsid: u16,
    pub nlss_id: u16,
    pub language_id: String,
    pub language_table_name: String,
    pub language_table_library: String,
    pub language_feature_code: String,
    pub functional_level: String,
    pub rdb_name: Option<String>,
    pub default_sql_library: Option<String>,
    pub server_job: Option<ServerJob>,
}

/// Parse a server attributes block of `length` payload bytes
pub fn parse_server_attributes(
    reader: &mut ReplyReader,
    length: usize,
    converter: &dyn TextConverter,
) -> Result<ServerAttributes> {
    if length < SERVER_ATTRIBUTES_MIN_LENGTH {
        return Err(Error::framing(format!(
            "server attributes of {} bytes, expected at least {}",
            length, SERVER_ATTRIBUTES_MIN_LENGTH
        )));
    }

    let mut attrs = ServerAttributes {
        date_format: reader.read_u16()?,
        date_separator: reader.read_u16()?,
        time_format: reader.read_u16()?,
        time_separator: reader.read_u16()?,
        decimal_separator: reader.read_u16()?,
        naming_convention: reader.read_u16()?,
        ignore_decimal_data_error: reader.read_u16()?,
        commitment_control_level: reader.read_u16()?,
        drda_package_size: reader.read_u16()?,
        translate_indicator: reader.read_u8()?,
        server_ccsid: reader.read_u16()?,
        nlss_id: reader.read_u16()?,
        ..Default::default()
    };
    let ccsid = attrs.server_ccsid;
    let text = |reader: &mut ReplyReader, n: usize| -> Result<String> {
        let bytes = reader.read_vec(n)?;
        Ok(converter.decode(ccsid, &bytes)?.trim_end().to_string())
    };

    attrs.language_id = text(reader, 3)?;
    attrs.language_table_name = text(reader, 10)?;
    attrs.language_table_library = text(reader, 10)?;
    attrs.language_feature_code = text(reader, 4)?;
    attrs.functional_level = text(reader, 10)?;

    if length >= SERVER_ATTRIBUTES_MIN_LENGTH + 18 {
        attrs.rdb_name = Some(text(reader, 18)?);
    }
    if length >= SERVER_ATTRIBUTES_MIN_LENGTH + 28 {
        attrs.default_sql_library = Some(text(reader, 10)?);
    }
    if length >= SERVER_ATTRIBUTES_FULL_LENGTH {
        attrs.server_job = Some(ServerJob {
            name: text(reader, 10)?,
            user: text(reader, 10)?,
            number: text(reader, 6)?,
        });
    }
    Ok(attrs)
}


#[cfg(test)]
mod tests {
    use super::test_support::server_attributes_bytes;
    use super::*;
    use crate::text::Cp037Converter;

    #[test]
    fn test_full_block() {
        let data = server_attributes_bytes("S1234567");
        assert_eq!(data.len(), SERVER_ATTRIBUTES_FULL_LENGTH);
        let mut reader = ReplyReader::from_slice(&data);
        let attrs = parse_server_attributes(&mut reader, data.len(), &Cp037Converter).unwrap();
        assert_eq!(attrs.date_format, 5);
        assert_eq!(attrs.naming_convention, 1);
        assert_eq!(attrs.server_ccsid, 37);
        assert_eq!(attrs.language_id, "ENU");
        assert_eq!(attrs.language_table_name, "*HEX");
        assert_eq!(attrs.language_table_library, "");
        assert_eq!(attrs.functional_level, "V7R5M0");
        assert_eq!(attrs.rdb_name.as_deref(), Some("S1234567"));
        assert_eq!(attrs.default_sql_library.as_deref(), Some("QGPL"));
        let job = attrs.server_job.unwrap();
        assert_eq!(job.name, "QZDASOINIT");
        assert_eq!(job.user, "QUSER");
        assert_eq!(job.number, "123456");
    }

    #[test]
    fn test_block_without_job() {
        let data = server_attributes_bytes("S1234567");
        let length = SERVER_ATTRIBUTES_FULL_LENGTH - 1;
        let mut reader = ReplyReader::from_slice(&data[..length]);
        let attrs = parse_server_attributes(&mut reader, length, &Cp037Converter).unwrap();
        assert_eq!(attrs.rdb_name.as_deref(), Some("S1234567"));
        assert_eq!(attrs.default_sql_library.as_deref(), Some("QGPL"));
        assert_eq!(attrs.server_job, None);
        assert_eq!(reader.logical(), SERVER_ATTRIBUTES_MIN_LENGTH + 28);
    }

    #[test]
    fn test_minimal_block() {
        let data = server_attributes_bytes("X");
        let mut reader = ReplyReader::from_slice(&data[..60]);
        let attrs = parse_server_attributes(&mut reader, 60, &Cp037Converter).unwrap();
        assert_eq!(attrs.rdb_name, None);
        assert_eq!(attrs.server_job, None);
        assert_eq!(reader.logical(), 60);
    }
}
