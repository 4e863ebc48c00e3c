//! Result rows and LOB data
//!
//! Rows and LOB bytes are read through buffers owned by the session so a
//! long fetch does not allocate per row or per segment.

use crate::callback::{FetchCallback, LobDataCallback};
use crate::error::{Error, Result};

use super::reader::ReplyReader;

const RESULT_DATA_HEADER_LENGTH: usize = 20;

/// Header of an extended result data block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultDataHeader {
    /// Consistency token, matches the data format
    pub consistency_token: u32,
    /// Rows in the block
    pub row_count: u32,
    /// Columns per row
    pub column_count: u16,
    /// Size of one null indicator (0 or 2)
    pub indicator_size: u16,
    /// Size of one row
    pub row_size: u32,
}

impl ResultDataHeader {
    /// Bytes each row occupies, null indicators included
    pub fn row_width(&self) -> u64 {
        u64::from(self.column_count) * u64::from(self.indicator_size) + u64::from(self.row_size)
    }

    /// Payload bytes the header announces, saturating at `usize::MAX`
    pub fn data_length(&self) -> usize {
        let total = u64::from(self.row_count)
            .saturating_mul(self.row_width())
            .saturating_add(RESULT_DATA_HEADER_LENGTH as u64);
        usize::try_from(total).unwrap_or(usize::MAX)
    }
}

/// Read an extended result data block and hand its rows to `callback`
///
/// Returns the number of rows in the block.
pub fn read_result_data(
    reader: &mut ReplyReader,
    length: usize,
    row_buffer: &mut Vec<u8>,
    mut callback: Option<&mut (dyn FetchCallback + '_)>,
) -> Result<u32> {
    if length < RESULT_DATA_HEADER_LENGTH {
        return Err(Error::framing(format!("result data of {} bytes", length)));
    }
    let header = ResultDataHeader {
        consistency_token: reader.read_u32()?,
        row_count: reader.read_u32()?,
        column_count: reader.read_u16()?,
        indicator_size: reader.read_u16()?,
        row_size: {
            reader.skip(4)?;
            reader.read_u32()?
        },
    };
    if header.indicator_size != 0 && header.indicator_size != 2 {
        return Err(Error::framing(format!(
            "indicator size {}",
            header.indicator_size
        )));
    }
    if header.row_count > 0 && header.row_width() == 0 {
        return Err(Error::framing(format!(
            "{} rows announced with zero-width rows",
            header.row_count
        )));
    }
    if header.data_length() > length {
        return Err(Error::framing(format!(
            "{} rows of {} bytes do not fit result data of {} bytes",
            header.row_count, header.row_size, length
        )));
    }

    if let Some(cb) = callback.as_deref_mut() {
        cb.new_result_data(&header);
    }

    let rows = header.row_count as usize;
    let columns = header.column_count as usize;
    if header.indicator_size == 2 {
        for row in 0..rows {
            for column in 0..columns {
                let value = reader.read_i16()?;
                if let Some(cb) = callback.as_deref_mut() {
                    cb.new_indicator(row, column, value);
                }
            }
        }
    }

    let row_size = header.row_size as usize;
    if row_buffer.len() < row_size {
        row_buffer.resize(row_size, 0);
    }
    for row in 0..rows {
        let slot = &mut row_buffer[..row_size];
        reader.read_into(slot)?;
        if let Some(cb) = callback.as_deref_mut() {
            cb.new_row_data(row, slot);
        }
    }
    Ok(header.row_count)
}

/// Read a LOB data block and deliver it in segments
pub fn read_lob_data(
    reader: &mut ReplyReader,
    length: usize,
    segment_buffer: &mut Vec<u8>,
    default_segment_size: usize,
    mut callback: Option<&mut (dyn LobDataCallback + '_)>,
) -> Result<usize> {
    if length < 6 {
        return Err(Error::framing(format!("LOB data of {} bytes", length)));
    }
    let ccsid = reader.read_u16()?;
    let data_length = reader.read_u32()? as usize;
    if data_length + 6 > length {
        return Err(Error::framing(format!(
            "LOB data announces {} bytes but carries {}",
            data_length,
            length - 6
        )));
    }

    let Some(cb) = callback.as_deref_mut() else {
        reader.skip(data_length)?;
        return Ok(data_length);
    };
    cb.new_lob_data(ccsid, data_length);

    let segment_size = cb
        .segment_size()
        .unwrap_or(default_segment_size)
        .max(1)
        .min(data_length.max(1));
    if segment_buffer.len() < segment_size {
        segment_buffer.resize(segment_size, 0);
    }

    let mut offset = 0;
    while offset < data_length {
        let n = segment_size.min(data_length - offset);
        let segment = &mut segment_buffer[..n];
        reader.read_into(segment)?;
        cb.new_lob_segment(offset, segment);
        offset += n;
    }
    Ok(data_length)
}

/// Read the current LOB length, four or eight bytes wide
pub fn read_lob_length(reader: &mut ReplyReader, length: usize) -> Result<u64> {
    match length {
        4 => Ok(u64::from(reader.read_u32()?)),
        8 => reader.read_u64(),
        n => Err(Error::framing(format!("current LOB length of {} bytes", n))),
    }
}
