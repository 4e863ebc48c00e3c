//! RLE decompression tests

mod common;

use hostdb::buffer::ReadBuffer;
use hostdb::rle::{decode, RleDecoder};
use hostdb::Error;

#[test]
fn test_decode_escape_forms() {
    // literal, doubled escape, run of three pairs, literal
    let data = [0x40, 0x1B, 0x1B, 0x1B, 0x00, 0x00, 0x00, 0x03, 0x41];
    assert_eq!(
        decode(&data).unwrap(),
        vec![0x40, 0x1B, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x41]
    );
}

#[test]
fn test_doubled_escape_before_run() {
    let out = decode(&[0x1B, 0x1B, 0x1B, 0x00, 0x1B, 0x00, 0x02]).unwrap();
    assert_eq!(out, vec![0x1B, 0x00, 0x1B, 0x00, 0x1B]);
}

#[test]
fn test_zero_count_is_malformed() {
    assert!(matches!(
        decode(&[0x1B, 0x41, 0x42, 0x00, 0x00]),
        Err(Error::MalformedRun(_))
    ));
}

#[test]
fn test_truncated_escape_is_rejected() {
    for data in [&[0x1B][..], &[0x1B, 0x41], &[0x1B, 0x41, 0x42, 0x00]] {
        let err = decode(data).unwrap_err();
        assert!(err.is_framing(), "{:?} gave {:?}", data, err);
    }
}

#[test]
fn test_decoder_keeps_run_across_reads() {
    let data = [0x1B, 0x01, 0x02, 0x00, 0x03, 0x7F];
    let mut src = ReadBuffer::from_slice(&data);
    let mut decoder = RleDecoder::new();

    let mut first = [0u8; 3];
    decoder.read_into(&mut src, data.len(), &mut first).unwrap();
    assert_eq!(first, [0x01, 0x02, 0x01]);
    assert!(!decoder.is_idle());
    assert_eq!(decoder.pending(), 3);

    let mut rest = [0u8; 4];
    decoder.read_into(&mut src, data.len(), &mut rest).unwrap();
    assert_eq!(rest, [0x02, 0x01, 0x02, 0x7F]);
    assert!(decoder.is_exhausted(&src, data.len()));
}

#[test]
fn test_decode_matches_test_encoder() {
    let mut logical = vec![0u8; 40];
    logical.extend(b"SQLCA   ");
    logical.extend([0x1B, 0x1B, 0x1B]);
    logical.extend([0x40; 9]);
    let compressed = common::rle_encode(&logical);
    assert!(compressed.len() < logical.len());
    assert_eq!(decode(&compressed).unwrap(), logical);
}
