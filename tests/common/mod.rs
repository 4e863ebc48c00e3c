//! Shared helpers for the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use hostdb::constants::{codepoint, MIN_MESSAGE_LENGTH, REPLY_ID};
use hostdb::request::RequestMessage;
use hostdb::{Cp037Converter, Error, Result, TextConverter, Transport};

/// One parameter entry
pub fn parameter(cp: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend(((payload.len() + 6) as u32).to_be_bytes());
    out.extend(cp.to_be_bytes());
    out.extend(payload);
    out
}

/// Text parameter in CCSID 37
pub fn text_parameter(cp: u16, text: &str) -> Vec<u8> {
    let mut payload = 37u16.to_be_bytes().to_vec();
    payload.extend(Cp037Converter.encode(text).unwrap());
    parameter(cp, &payload)
}

/// Builder for reply messages
#[derive(Debug, Clone, Default)]
pub struct ReplyBuilder {
    pub correlation_id: u32,
    pub rc_class: u16,
    pub return_code: i32,
    pub compressed: bool,
    pub extra_template: usize,
    pub body: Vec<u8>,
}

impl ReplyBuilder {
    pub fn new(correlation_id: u32) -> Self {
        Self {
            correlation_id,
            ..Default::default()
        }
    }

    pub fn rc(mut self, rc_class: u16, return_code: i32) -> Self {
        self.rc_class = rc_class;
        self.return_code = return_code;
        self
    }

    pub fn param(mut self, cp: u16, payload: &[u8]) -> Self {
        self.body.extend(parameter(cp, payload));
        self
    }

    pub fn text(mut self, cp: u16, text: &str) -> Self {
        self.body.extend(text_parameter(cp, text));
        self
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.body.extend(bytes);
        self
    }

    /// Wrap the body built so far into one RLE compressed block
    pub fn compress(mut self) -> Self {
        let logical = std::mem::take(&mut self.body);
        let mut block = (logical.len() as u32).to_be_bytes().to_vec();
        block.extend(rle_encode(&logical));
        self.compressed = true;
        self.param(codepoint::RLE_COMPRESSED_DATA, &block)
    }

    pub fn build(&self) -> Bytes {
        let template_length = 20 + self.extra_template;
        let length = (MIN_MESSAGE_LENGTH + self.extra_template + self.body.len()) as u32;
        let mut out = Vec::new();
        out.extend(length.to_be_bytes());
        out.extend(0u16.to_be_bytes());
        out.extend(0xE004u16.to_be_bytes());
        out.extend(0u32.to_be_bytes());
        out.extend(self.correlation_id.to_be_bytes());
        out.extend((template_length as u16).to_be_bytes());
        out.extend(REPLY_ID.to_be_bytes());
        out.extend(0u32.to_be_bytes());
        out.extend((self.compressed as u32).to_be_bytes());
        out.extend([0u8; 6]);
        out.extend(self.rc_class.to_be_bytes());
        out.extend(self.return_code.to_be_bytes());
        out.extend(vec![0xEE; self.extra_template]);
        out.extend(&self.body);
        Bytes::from(out)
    }
}

/// Run-length encode: pairs repeated at least three times become runs,
/// everything else is literal with `0x1B` doubled. A pair starting with
/// `0x1B` cannot be a run.
pub fn rle_encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < data.len() {
        if i + 1 < data.len() && data[i] != 0x1B {
            let pair = [data[i], data[i + 1]];
            let mut count = 1;
            while i + 2 * (count + 1) <= data.len()
                && data[i + 2 * count..i + 2 * count + 2] == pair
                && count < u16::MAX as usize
            {
                count += 1;
            }
            if count >= 3 {
                out.extend([0x1B, pair[0], pair[1]]);
                out.extend((count as u16).to_be_bytes());
                i += 2 * count;
                continue;
            }
        }
        if data[i] == 0x1B {
            out.push(0x1B);
        }
        out.push(data[i]);
        i += 1;
    }
    out
}

/// Encode an SQLCA in CCSID 37
pub fn sqlca(sqlcode: i32, sqlstate: &str, update_count: i32) -> Vec<u8> {
    let conv = Cp037Converter;
    let mut out = Vec::with_capacity(136);
    out.extend(conv.encode("SQLCA   ").unwrap());
    out.extend(136i32.to_be_bytes());
    out.extend(sqlcode.to_be_bytes());
    out.extend(0i16.to_be_bytes());
    out.extend(vec![0x40; 70]);
    out.extend(conv.encode("QSQ07050").unwrap());
    for value in [0, 0, update_count, 0, 0, 0] {
        out.extend(i32::to_be_bytes(value));
    }
    out.extend(conv.encode("           ").unwrap());
    out.extend(conv.encode(sqlstate).unwrap());
    out
}

/// Extended result data with fixed-size rows and no indicators
pub fn result_data(rows: &[&[u8]]) -> Vec<u8> {
    let row_size = rows.first().map_or(0, |r| r.len());
    let mut out = Vec::new();
    out.extend(0u32.to_be_bytes());
    out.extend((rows.len() as u32).to_be_bytes());
    out.extend(1u16.to_be_bytes());
    out.extend(0u16.to_be_bytes());
    out.extend(0u32.to_be_bytes());
    out.extend((row_size as u32).to_be_bytes());
    for row in rows {
        out.extend(*row);
    }
    out
}

/// One field of a super-extended format
pub struct Field<'a> {
    pub sql_type: u16,
    pub length: u32,
    pub name: &'a str,
}

/// Super-extended data format; each name sits `gap` bytes after the
/// previous section, and `trailing` filler bytes close the block
pub fn data_format(fields: &[Field<'_>], gap: usize, trailing: usize) -> Vec<u8> {
    let fixed_end = 16 + fields.len() * 48;
    let mut names = Vec::new();
    let mut placements = Vec::new();
    for field in fields {
        names.extend(vec![0u8; gap]);
        let offset = fixed_end + names.len();
        let utf16: Vec<u8> = field.name.encode_utf16().flat_map(|u| u.to_be_bytes()).collect();
        let ll = 8 + utf16.len();
        names.extend((ll as u32).to_be_bytes());
        names.extend(0x3840u16.to_be_bytes());
        names.extend(13488u16.to_be_bytes());
        names.extend(utf16);
        placements.push((offset, ll));
    }

    let mut out = Vec::new();
    out.extend(0x0102_0304u32.to_be_bytes());
    out.extend((fields.len() as u32).to_be_bytes());
    out.extend([1, 2, 3, 4]);
    out.extend(fields.iter().map(|f| f.length).sum::<u32>().to_be_bytes());
    for (i, field) in fields.iter().enumerate() {
        let block_start = 16 + i * 48;
        let (offset, ll) = placements[i];
        out.extend(48u16.to_be_bytes());
        out.extend(field.sql_type.to_be_bytes());
        out.extend(field.length.to_be_bytes());
        out.extend(0u16.to_be_bytes());
        out.extend(0u16.to_be_bytes());
        out.extend(37u16.to_be_bytes());
        out.extend([0u8, 0]);
        out.extend(0u16.to_be_bytes());
        out.extend(0u16.to_be_bytes());
        out.extend([0u8; 16]);
        out.extend(((offset - block_start) as u32).to_be_bytes());
        out.extend((ll as u32).to_be_bytes());
        out.extend(0u32.to_be_bytes());
    }
    out.extend(names);
    out.extend(vec![0u8; trailing]);
    out
}

#[derive(Default)]
struct Wire {
    sent: Vec<Vec<u8>>,
    replies: VecDeque<Bytes>,
}

/// Transport that records requests and answers from a queue
#[derive(Clone, Default)]
pub struct MockTransport {
    wire: Arc<Mutex<Wire>>,
    pub local: bool,
}

impl MockTransport {
    pub fn remote() -> Self {
        Self::default()
    }

    pub fn local() -> Self {
        Self {
            local: true,
            ..Default::default()
        }
    }

    pub fn push(&self, reply: Bytes) {
        self.wire.lock().unwrap().replies.push_back(reply);
    }

    pub fn sent(&self) -> Vec<RequestMessage> {
        self.wire
            .lock()
            .unwrap()
            .sent
            .iter()
            .map(|b| RequestMessage::parse(b).unwrap())
            .collect()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.wire.lock().unwrap().sent.push(data.to_vec());
        Ok(())
    }

    async fn receive(&mut self) -> Result<Bytes> {
        self.wire
            .lock()
            .unwrap()
            .replies
            .pop_front()
            .ok_or(Error::ConnectionClosed)
    }

    fn is_local(&self) -> bool {
        self.local
    }

    fn is_connected(&self) -> bool {
        true
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
