//! SQL communications area

use crate::error::{Error, Result};
use crate::text::TextConverter;

use super::reader::ReplyReader;

/// Size of an SQLCA on the wire
pub const SQLCA_LENGTH: usize = 136;

/// SQL communications area returned with a reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sqlca {
    /// Eye catcher (`SQLCA   `)
    pub sqlcaid: String,
    /// Byte count
    pub sqlcabc: i32,
    /// SQLCODE
    pub sqlcode: i32,
    /// Message tokens, trimmed to the reported length
    pub sqlerrmc: String,
    /// Product id
    pub sqlerrp: String,
    /// Diagnostic values
    pub sqlerrd: [i32; 6],
    /// Warning flags
    pub sqlwarn: String,
    /// SQLSTATE
    pub sqlstate: String,
}

impl Sqlca {
    /// Rows affected by the statement
    pub fn update_count(&self) -> i32 {
        self.sqlerrd[2]
    }

    /// Generated key value, when the statement produced one
    pub fn generated_key(&self) -> Option<&str> {
        if self.sqlcode >= 0 && !self.sqlerrmc.is_empty() {
            Some(&self.sqlerrmc)
        } else {
            None
        }
    }

    /// Warning flag `index` (0 is the summary flag)
    pub fn warning_flag(&self, index: usize) -> Option<char> {
        self.sqlwarn.chars().nth(index)
    }
}

/// Parse an SQLCA of `length` payload bytes
pub fn parse_sqlca(
    reader: &mut ReplyReader,
    length: usize,
    converter: &dyn TextConverter,
) -> Result<Sqlca> {
    if length < SQLCA_LENGTH {
        return Err(Error::framing(format!(
            "SQLCA of {} bytes, expected {}",
            length, SQLCA_LENGTH
        )));
    }
    let ccsid = converter.ccsid();
    let text = |reader: &mut ReplyReader, n: usize| -> Result<String> {
        let bytes = reader.read_vec(n)?;
        converter.decode(ccsid, &bytes)
    };

    let sqlcaid = text(reader, 8)?;
    let sqlcabc = reader.read_i32()?;
    let sqlcode = reader.read_i32()?;
    let sqlerrml = reader.read_i16()?;
    let errmc = reader.read_vec(70)?;
    let used = usize::try_from(sqlerrml).unwrap_or(0).min(errmc.len());
    let sqlerrmc = converter.decode(ccsid, &errmc[..used])?;
    let sqlerrp = text(reader, 8)?;
    let mut sqlerrd = [0i32; 6];
    for slot in sqlerrd.iter_mut() {
        *slot = reader.read_i32()?;
    }
    let sqlwarn = text(reader, 11)?;
    let sqlstate = text(reader, 5)?;

    Ok(Sqlca {
        sqlcaid,
        sqlcabc,
        sqlcode,
        sqlerrmc,
        sqlerrp,
        sqlerrd,
        sqlwarn,
        sqlstate,
    })
}
