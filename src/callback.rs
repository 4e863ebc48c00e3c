//! Reply event callbacks
//!
//! The reply decoder hands what it finds to callbacks, one trait per event
//! family. Most methods have empty defaults so an implementation only writes
//! the events it cares about. Data borrowed in a callback (row bytes, LOB
//! segments) points into session-owned scratch buffers and is only valid for
//! the duration of the call.
//!
//! The collectors at the bottom of this module cover the common cases of
//! gathering everything into owned values.

use crate::reply::{
    DataFormat, ExtendedColumnDescriptor, FieldDescription, PackageInfo, PackageStatement,
    ResultDataHeader, Sqlca,
};

/// Warnings and message information of a reply
pub trait WarningCallback: Send {
    /// The reply completed without a warning
    fn no_warnings(&mut self) {}

    /// The reply carried a warning (non-zero class, non-negative code)
    fn new_warning(&mut self, rc_class: u16, return_code: i32);

    /// Message id of the reply
    fn new_message_id(&mut self, _message_id: &str) {}

    /// First-level message text
    fn new_message_text(&mut self, _text: &str) {}

    /// Second-level message text
    fn new_second_level_text(&mut self, _text: &str) {}
}

/// SQL communications area of a reply
pub trait SqlcaCallback: Send {
    /// A SQLCA arrived
    fn new_sqlca(&mut self, sqlca: &Sqlca);
}

/// Result column descriptions
pub trait DescribeCallback: Send {
    /// The result data format arrived
    fn data_format(&mut self, format: &DataFormat);

    /// One field of the data format, after [`DescribeCallback::data_format`]
    fn field_description(&mut self, _index: usize, _field: &FieldDescription) {}

    /// Extended descriptor of one column
    fn column_attributes(&mut self, _index: usize, _column: &ExtendedColumnDescriptor) {}
}

/// Parameter marker descriptions
pub trait ParameterMarkerCallback: Send {
    /// The parameter marker format arrived
    fn parameter_marker_format(&mut self, format: &DataFormat);

    /// One marker of the format
    fn parameter_marker_field(&mut self, _index: usize, _field: &FieldDescription) {}
}

/// Result rows
pub trait FetchCallback: Send {
    /// A block of rows starts
    fn new_result_data(&mut self, header: &ResultDataHeader);

    /// Null indicator of one column of one row
    fn new_indicator(&mut self, _row: usize, _column: usize, _value: i16) {}

    /// Raw bytes of one row
    fn new_row_data(&mut self, row: usize, data: &[u8]);
}

/// SQL package contents
pub trait PackageCallback: Send {
    /// Package header
    fn new_package_info(&mut self, info: &PackageInfo);

    /// One statement of the package
    fn new_statement(&mut self, index: usize, statement: &PackageStatement);
}

/// LOB data
pub trait LobDataCallback: Send {
    /// Current length of the LOB
    fn new_lob_length(&mut self, _length: u64) {}

    /// LOB data of `length` bytes in `ccsid` follows
    fn new_lob_data(&mut self, ccsid: u16, length: usize);

    /// Preferred segment size, `None` for the session default
    fn segment_size(&self) -> Option<usize> {
        None
    }

    /// One segment of LOB data starting at `offset`
    fn new_lob_segment(&mut self, offset: usize, data: &[u8]);
}

// =============================================================================
// Collectors
// =============================================================================

/// Collects warnings and message information
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarningCollector {
    /// `(class, return code)` of every warning
    pub warnings: Vec<(u16, i32)>,
    /// Replies without warnings
    pub clean_replies: usize,
    /// Last message id
    pub message_id: Option<String>,
    /// Last first-level text
    pub message_text: Option<String>,
    /// Last second-level text
    pub second_level_text: Option<String>,
}

impl WarningCallback for WarningCollector {
    fn no_warnings(&mut self) {
        self.clean_replies += 1;
    }

    fn new_warning(&mut self, rc_class: u16, return_code: i32) {
        self.warnings.push((rc_class, return_code));
    }

    fn new_message_id(&mut self, message_id: &str) {
        self.message_id = Some(message_id.to_string());
    }

    fn new_message_text(&mut self, text: &str) {
        self.message_text = Some(text.to_string());
    }

    fn new_second_level_text(&mut self, text: &str) {
        self.second_level_text = Some(text.to_string());
    }
}

/// Keeps the most recent SQLCA
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqlcaCollector {
    /// Last SQLCA received
    pub last: Option<Sqlca>,
}

impl SqlcaCallback for SqlcaCollector {
    fn new_sqlca(&mut self, sqlca: &Sqlca) {
        self.last = Some(sqlca.clone());
    }
}

/// Collects data formats and column descriptors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatCollector {
    /// Last result data format
    pub data_format: Option<DataFormat>,
    /// Last parameter marker format
    pub parameter_marker_format: Option<DataFormat>,
    /// Extended column descriptors by column index
    pub columns: Vec<ExtendedColumnDescriptor>,
}

impl DescribeCallback for FormatCollector {
    fn data_format(&mut self, format: &DataFormat) {
        self.data_format = Some(format.clone());
    }

    fn column_attributes(&mut self, index: usize, column: &ExtendedColumnDescriptor) {
        if self.columns.len() <= index {
            self.columns.resize(index + 1, ExtendedColumnDescriptor::default());
        }
        self.columns[index] = column.clone();
    }
}

impl ParameterMarkerCallback for FormatCollector {
    fn parameter_marker_format(&mut self, format: &DataFormat) {
        self.parameter_marker_format = Some(format.clone());
    }
}

/// Collects fetched rows as owned byte vectors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowCollector {
    /// Row bytes in arrival order
    pub rows: Vec<Vec<u8>>,
    /// Null indicators per row
    pub indicators: Vec<Vec<i16>>,
    /// Number of result data blocks seen
    pub blocks: usize,
    base: usize,
}

impl FetchCallback for RowCollector {
    fn new_result_data(&mut self, header: &ResultDataHeader) {
        self.blocks += 1;
        self.base = self.rows.len();
        let columns = header.column_count as usize;
        for _ in 0..header.row_count {
            self.indicators.push(vec![0; columns]);
        }
    }

    fn new_indicator(&mut self, row: usize, column: usize, value: i16) {
        if let Some(slot) = self
            .indicators
            .get_mut(self.base + row)
            .and_then(|r| r.get_mut(column))
        {
            *slot = value;
        }
    }

    fn new_row_data(&mut self, _row: usize, data: &[u8]) {
        self.rows.push(data.to_vec());
    }
}

/// Collects package contents
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageCollector {
    /// Package header
    pub info: Option<PackageInfo>,
    /// Statements in package order
    pub statements: Vec<PackageStatement>,
}

impl PackageCallback for PackageCollector {
    fn new_package_info(&mut self, info: &PackageInfo) {
        self.info = Some(info.clone());
    }

    fn new_statement(&mut self, _index: usize, statement: &PackageStatement) {
        self.statements.push(statement.clone());
    }
}

/// Reassembles LOB segments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LobCollector {
    /// CCSID of the data
    pub ccsid: Option<u16>,
    /// Data received so far
    pub data: Vec<u8>,
    /// Current LOB length, when sent
    pub length: Option<u64>,
    /// Number of segments delivered
    pub segments: usize,
    /// Segment size to ask for
    pub segment_size: Option<usize>,
}

impl LobDataCallback for LobCollector {
    fn new_lob_length(&mut self, length: u64) {
        self.length = Some(length);
    }

    fn new_lob_data(&mut self, ccsid: u16, length: usize) {
        self.ccsid = Some(ccsid);
        self.data.reserve(length);
    }

    fn segment_size(&self) -> Option<usize> {
        self.segment_size
    }

    fn new_lob_segment(&mut self, _offset: usize, data: &[u8]) {
        self.segments += 1;
        self.data.extend_from_slice(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_collector_indicators() {
        let mut rows = RowCollector::default();
        let header = ResultDataHeader {
            row_count: 2,
            column_count: 2,
            indicator_size: 2,
            row_size: 4,
            ..Default::default()
        };
        rows.new_result_data(&header);
        rows.new_indicator(1, 0, -1);
        rows.new_row_data(0, &[1, 2, 3, 4]);
        rows.new_row_data(1, &[5, 6, 7, 8]);
        assert_eq!(rows.indicators, vec![vec![0, 0], vec![-1, 0]]);
        assert_eq!(rows.rows.len(), 2);

        rows.new_result_data(&ResultDataHeader {
            row_count: 1,
            column_count: 2,
            ..header
        });
        rows.new_indicator(0, 1, -1);
        assert_eq!(rows.indicators[2], vec![0, -1]);
    }

    #[test]
    fn test_format_collector_columns() {
        let mut formats = FormatCollector::default();
        let column = ExtendedColumnDescriptor {
            updateable: 1,
            ..Default::default()
        };
        formats.column_attributes(2, &column);
        assert_eq!(formats.columns.len(), 3);
        assert_eq!(formats.columns[2].updateable, 1);
    }

    #[test]
    fn test_lob_collector() {
        let mut lob = LobCollector {
            segment_size: Some(4),
            ..Default::default()
        };
        lob.new_lob_data(65535, 6);
        lob.new_lob_segment(0, &[1, 2, 3, 4]);
        lob.new_lob_segment(4, &[5, 6]);
        assert_eq!(lob.data, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(lob.segments, 2);
        assert_eq!(lob.segment_size(), Some(4));
    }
}
