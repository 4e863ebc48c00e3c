//! Buffer tests

use hostdb::buffer::{ReadBuffer, WriteBuffer};
use hostdb::Error;

#[test]
fn test_big_endian_roundtrip() {
    let mut buf = WriteBuffer::new();
    buf.write_u16_be(0x3801).unwrap();
    buf.write_u32_be(0x0000_0028).unwrap();
    buf.write_i32_be(-700).unwrap();
    buf.write_u8(0x1B).unwrap();
    assert_eq!(&buf.as_slice()[..6], &[0x38, 0x01, 0x00, 0x00, 0x00, 0x28]);

    let mut read = ReadBuffer::new(buf.freeze());
    assert_eq!(read.read_u16_be().unwrap(), 0x3801);
    assert_eq!(read.read_u32_be().unwrap(), 40);
    assert_eq!(read.read_i32_be().unwrap(), -700);
    assert_eq!(read.read_u8().unwrap(), 0x1B);
    assert_eq!(read.remaining(), 0);
}

#[test]
fn test_read_past_end() {
    let mut read = ReadBuffer::from_slice(&[0x00, 0x01, 0x02]);
    read.skip(2).unwrap();
    match read.read_u16_be() {
        Err(Error::BufferUnderflow { needed, available }) => {
            assert_eq!(needed, 2);
            assert_eq!(available, 1);
        }
        other => panic!("expected underflow, got {:?}", other),
    }
    assert!(read.read_u8().is_ok());
    assert!(read.read_u8().is_err());
}

#[test]
fn test_write_limit() {
    let mut buf = WriteBuffer::with_max_capacity(4, 6);
    buf.write_u32_be(1).unwrap();
    assert!(matches!(
        buf.write_u32_be(2),
        Err(Error::BufferOverflow { .. })
    ));
    buf.write_u16_be(2).unwrap();
    assert_eq!(buf.len(), 6);
}

#[test]
fn test_peek_does_not_advance() {
    let read = ReadBuffer::from_slice(&[0xE0, 0x04]);
    assert_eq!(read.peek_u8().unwrap(), 0xE0);
    assert_eq!(read.peek_bytes(2).unwrap(), &[0xE0, 0x04]);
    assert_eq!(read.position(), 0);
}
